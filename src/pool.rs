/// Size-tiered pool of reusable [`ByteBuffer`]s
///
/// Tier `i` holds buffers of `fragment_size * 2 << i` bytes. A request is served
/// from the smallest tier that fits it, falling back to any larger tier with a
/// free buffer before allocating. Requests larger than every tier (or than
/// `max_buffer_size`) get an exact-size buffer that is never pooled.
///
/// A `PooledBuffer` derefs to `ByteBuffer` and is cleared and handed back to its
/// tier when dropped.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::buffer::ByteBuffer;
use crate::config::PoolConfig;
use crate::stats::{PoolSnapshot, PoolStats};

struct Shared {
    tiers: Mutex<Vec<Vec<ByteBuffer>>>,
    stats: PoolStats,
    config: PoolConfig,
}

impl Shared {
    fn tier_size(&self, tier: usize) -> usize {
        self.config.fragment_size.saturating_mul(2) << tier
    }

    fn tier_for(&self, size: usize) -> Option<usize> {
        if size > self.config.max_buffer_size {
            return None;
        }
        (0..self.config.max_tiers).find(|&tier| {
            let tier_size = self.tier_size(tier);
            tier_size >= size && tier_size <= self.config.max_buffer_size
        })
    }

    fn release(&self, tier: usize, mut buffer: ByteBuffer) {
        // Buffers resized by reserve()/truncate() no longer match their tier
        if buffer.capacity() != self.tier_size(tier) {
            debug!(tier, capacity = buffer.capacity(), "resized buffer not returned to pool");
            self.stats.record_release(false);
            return;
        }

        let kept = match self.tiers.lock() {
            Ok(mut tiers) if tiers[tier].len() < self.config.max_buffers_per_tier => {
                buffer.clear();
                tiers[tier].push(buffer);
                true
            }
            _ => false,
        };
        self.stats.record_release(kept);
    }
}

enum Home {
    Tier(usize),
    Unpooled,
    Detached,
}

/// A buffer borrowed from a [`BufferPool`]; returned to its tier when dropped.
pub struct PooledBuffer {
    buffer: ByteBuffer,
    home: Home,
    shared: Arc<Shared>,
}

impl PooledBuffer {
    /// Keep the buffer; it will not go back to the pool.
    pub fn into_inner(mut self) -> ByteBuffer {
        self.home = Home::Detached;
        std::mem::replace(&mut self.buffer, ByteBuffer::new(0))
    }

    /// Tier this buffer returns to, `None` for oversized buffers
    pub fn tier(&self) -> Option<usize> {
        match self.home {
            Home::Tier(tier) => Some(tier),
            _ => None,
        }
    }
}

impl Deref for PooledBuffer {
    type Target = ByteBuffer;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        match self.home {
            Home::Tier(tier) => {
                let buffer = std::mem::replace(&mut self.buffer, ByteBuffer::new(0));
                self.shared.release(tier, buffer);
            }
            Home::Unpooled => self.shared.stats.record_release(false),
            Home::Detached => {}
        }
    }
}

/// Thread-safe, size-tiered buffer pool. Clones share the same buffers.
#[derive(Clone)]
pub struct BufferPool {
    shared: Arc<Shared>,
}

impl BufferPool {
    pub fn new(config: PoolConfig) -> Self {
        let tiers = (0..config.max_tiers).map(|_| Vec::new()).collect();
        BufferPool {
            shared: Arc::new(Shared {
                tiers: Mutex::new(tiers),
                stats: PoolStats::new(),
                config,
            }),
        }
    }

    /// Capacity of buffers in `tier`
    pub fn tier_size(&self, tier: usize) -> usize {
        self.shared.tier_size(tier)
    }

    /// Get a cleared buffer of at least `size` bytes in Write mode.
    pub fn acquire(&self, size: usize) -> PooledBuffer {
        let Some(tier) = self.shared.tier_for(size) else {
            debug!(size, "allocating unpooled buffer");
            self.shared.stats.record_acquire(false);
            return PooledBuffer {
                buffer: ByteBuffer::new(size),
                home: Home::Unpooled,
                shared: Arc::clone(&self.shared),
            };
        };

        let reused = self.shared.tiers.lock().ok().and_then(|mut tiers| {
            (tier..tiers.len()).find_map(|t| tiers[t].pop().map(|buffer| (t, buffer)))
        });

        let (tier, buffer) = match reused {
            Some(found) => {
                self.shared.stats.record_acquire(true);
                found
            }
            None => {
                let tier_size = self.shared.tier_size(tier);
                debug!(size, tier, tier_size, "allocating pooled buffer");
                self.shared.stats.record_acquire(false);
                (tier, ByteBuffer::new(tier_size))
            }
        };

        PooledBuffer {
            buffer,
            home: Home::Tier(tier),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Allocate `count` buffers able to hold `size` bytes ahead of time.
    pub fn prefill(&self, size: usize, count: usize) {
        let Some(tier) = self.shared.tier_for(size) else {
            return;
        };
        let tier_size = self.shared.tier_size(tier);
        if let Ok(mut tiers) = self.shared.tiers.lock() {
            let room = self
                .shared
                .config
                .max_buffers_per_tier
                .saturating_sub(tiers[tier].len());
            for _ in 0..count.min(room) {
                tiers[tier].push(ByteBuffer::new(tier_size));
            }
        }
    }

    /// Free buffers across all tiers
    pub fn available(&self) -> usize {
        self.shared
            .tiers
            .lock()
            .map(|tiers| tiers.iter().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Free buffers in one tier
    pub fn available_in_tier(&self, tier: usize) -> usize {
        self.shared
            .tiers
            .lock()
            .ok()
            .and_then(|tiers| tiers.get(tier).map(Vec::len))
            .unwrap_or(0)
    }

    pub fn stats(&self) -> PoolSnapshot {
        self.shared.stats.snapshot()
    }

    pub fn log_summary(&self) {
        self.shared.stats.log_summary();
    }

    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}
