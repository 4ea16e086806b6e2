/// Framing and pool statistics
///
/// `FrameStats` belongs to a single `FrameReader` and is updated through `&mut`.
/// `PoolStats` is shared by every handle of a `BufferPool`, so it uses atomics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::info;

#[derive(Debug, Clone)]
pub struct FrameStats {
    start_time: Option<Instant>,
    total_frames: u64,
    total_bytes: u64,
    max_frame: usize,
    rejected_frames: u32,
}

impl FrameStats {
    pub fn new() -> Self {
        FrameStats {
            start_time: None,
            total_frames: 0,
            total_bytes: 0,
            max_frame: 0,
            rejected_frames: 0,
        }
    }

    /// Record a decoded frame of `size` bytes, header included
    pub fn record_frame(&mut self, size: usize) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
        self.total_frames += 1;
        self.total_bytes += size as u64;
        self.max_frame = self.max_frame.max(size);
    }

    /// Record a frame whose header failed validation
    pub fn record_rejected(&mut self) {
        self.rejected_frames = self.rejected_frames.wrapping_add(1);
    }

    pub fn frames_per_sec(&self) -> f64 {
        match self.start_time {
            None => 0.0,
            Some(start) => {
                let elapsed = start.elapsed().as_secs_f64();
                if elapsed > 0.0 {
                    self.total_frames as f64 / elapsed
                } else {
                    0.0
                }
            }
        }
    }

    pub fn bytes_per_sec(&self) -> f64 {
        match self.start_time {
            None => 0.0,
            Some(start) => {
                let elapsed = start.elapsed().as_secs_f64();
                if elapsed > 0.0 {
                    self.total_bytes as f64 / elapsed
                } else {
                    0.0
                }
            }
        }
    }

    /// Time since the first frame
    pub fn elapsed(&self) -> Option<Duration> {
        self.start_time.map(|st| st.elapsed())
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Largest frame seen, header included
    pub fn max_frame(&self) -> usize {
        self.max_frame
    }

    pub fn rejected_frames(&self) -> u32 {
        self.rejected_frames
    }

    pub fn reset(&mut self) {
        self.start_time = None;
        self.total_frames = 0;
        self.total_bytes = 0;
        self.max_frame = 0;
        self.rejected_frames = 0;
    }

    pub fn log_summary(&self) {
        info!(
            frames = self.total_frames,
            bytes = self.total_bytes,
            max_frame = self.max_frame,
            rejected = self.rejected_frames,
            frames_per_sec = self.frames_per_sec(),
            bytes_per_sec = self.bytes_per_sec(),
            "frame statistics"
        );
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`PoolStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub acquires: u64,
    pub reuses: u64,
    pub allocations: u64,
    pub releases: u64,
    pub discards: u64,
}

impl PoolSnapshot {
    /// Fraction of acquires served from the pool
    pub fn hit_rate(&self) -> f64 {
        if self.acquires == 0 {
            0.0
        } else {
            self.reuses as f64 / self.acquires as f64
        }
    }
}

#[derive(Debug, Default)]
pub struct PoolStats {
    acquires: AtomicU64,
    reuses: AtomicU64,
    allocations: AtomicU64,
    releases: AtomicU64,
    discards: AtomicU64,
}

impl PoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_acquire(&self, reused: bool) {
        self.acquires.fetch_add(1, Ordering::Relaxed);
        if reused {
            self.reuses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.allocations.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// `kept` is false when the buffer was dropped instead of pooled
    pub(crate) fn record_release(&self, kept: bool) {
        if kept {
            self.releases.fetch_add(1, Ordering::Relaxed);
        } else {
            self.discards.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            acquires: self.acquires.load(Ordering::Relaxed),
            reuses: self.reuses.load(Ordering::Relaxed),
            allocations: self.allocations.load(Ordering::Relaxed),
            releases: self.releases.load(Ordering::Relaxed),
            discards: self.discards.load(Ordering::Relaxed),
        }
    }

    pub fn log_summary(&self) {
        let snap = self.snapshot();
        info!(
            acquires = snap.acquires,
            reuses = snap.reuses,
            allocations = snap.allocations,
            releases = snap.releases,
            discards = snap.discards,
            hit_rate = snap.hit_rate(),
            "pool statistics"
        );
    }
}
