/// Length-prefixed framing over [`ByteBuffer`]
///
/// Frame layout, all fields network byte order:
///
/// ```text
///   [length: u16][payload: length - 2 bytes]
/// ```
///
/// `length` counts the 2-byte header itself, so an empty payload is encoded as
/// `[0x00, 0x02]`.
///
/// `FrameReader` accumulates bytes as they arrive from a transport and hands out
/// complete payloads; already-consumed bytes are compacted away on the next feed.
/// `FrameWriter` builds one frame at a time and patches the header on `finish()`.

use tracing::{debug, trace};

use crate::buffer::ByteBuffer;
use crate::config::{FrameConfig, MAX_FRAME_SIZE};
use crate::error::{BufferError, BufferResult};
use crate::scalar::NetworkOrder;
use crate::stats::FrameStats;

pub const FRAME_HEADER_SIZE: usize = 2;

/// Builds a single frame. Unlike the raw buffer, writes that would overflow the
/// maximum frame size are reported instead of dropped.
#[derive(Debug)]
pub struct FrameWriter {
    buffer: ByteBuffer,
}

impl FrameWriter {
    /// Writer for frames of at most `config.max_frame_size` bytes.
    ///
    /// The size must leave room for the header and fit the `u16` length field.
    pub fn new(config: &FrameConfig) -> BufferResult<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(BufferError::Config(errors.join("; ")));
        }
        let mut buffer = ByteBuffer::new(config.max_frame_size);
        buffer.write_u16(0);
        Ok(FrameWriter { buffer })
    }

    /// Payload bytes written so far
    pub fn payload_len(&self) -> usize {
        self.buffer.write_position() - FRAME_HEADER_SIZE
    }

    /// Payload bytes that still fit in this frame
    pub fn remaining(&self) -> usize {
        self.buffer.remaining()
    }

    fn ensure_room(&self, count: usize) -> BufferResult<()> {
        if count > self.buffer.remaining() {
            return Err(BufferError::FrameTooLarge {
                size: self.buffer.write_position() + count,
                max: self.buffer.capacity(),
            });
        }
        Ok(())
    }

    pub fn write<T: NetworkOrder>(&mut self, value: T) -> BufferResult<&mut Self> {
        self.ensure_room(T::WIDTH)?;
        self.buffer.write(value);
        Ok(self)
    }

    pub fn put(&mut self, src: &[u8]) -> BufferResult<&mut Self> {
        self.ensure_room(src.len())?;
        self.buffer.put(src);
        Ok(self)
    }

    /// Patch the length header and return the encoded frame. The writer is
    /// ready for the next frame afterwards.
    pub fn finish(&mut self) -> BufferResult<Vec<u8>> {
        let length = self.buffer.write_position();
        let header = u16::try_from(length).map_err(|_| BufferError::FrameTooLarge {
            size: length,
            max: MAX_FRAME_SIZE,
        })?;
        self.buffer.write_u16_at(0, header);
        let frame = self.buffer.written().to_vec();
        trace!(length, "frame encoded");

        self.buffer.rewind();
        self.buffer.write_u16(0);
        Ok(frame)
    }

    /// Encode `payload` as one frame.
    pub fn encode(payload: &[u8], config: &FrameConfig) -> BufferResult<Vec<u8>> {
        let mut writer = FrameWriter::new(config)?;
        writer.put(payload)?;
        writer.finish()
    }
}

/// Reassembles frames from a byte stream delivered in arbitrary chunks.
#[derive(Debug)]
pub struct FrameReader {
    // Kept in Read mode between calls
    buffer: ByteBuffer,
    max_frame_size: usize,
    // Buffer never grows past this
    max_capacity: usize,
    stats: FrameStats,
}

impl FrameReader {
    /// Reader starting with `initial_capacity` bytes of buffer.
    ///
    /// `config.max_frame_size` is clamped to what the `u16` header can express.
    /// The buffer grows up to the larger of `initial_capacity` and that size.
    pub fn new(config: &FrameConfig, initial_capacity: usize) -> Self {
        let max_frame_size = config.max_frame_size.clamp(FRAME_HEADER_SIZE, MAX_FRAME_SIZE);
        let mut buffer = ByteBuffer::new(initial_capacity);
        buffer.flip();
        FrameReader {
            buffer,
            max_frame_size,
            max_capacity: initial_capacity.max(max_frame_size),
            stats: FrameStats::new(),
        }
    }

    /// Bytes received but not yet handed out
    pub fn buffered(&self) -> usize {
        self.buffer.remaining()
    }

    /// Current size of the receive buffer
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Append received bytes, growing the buffer when needed.
    ///
    /// Returns how many bytes were taken. Growth stops at the reader's maximum
    /// capacity; once the buffer is full the caller drains frames and feeds the
    /// rest of `data` again.
    pub fn feed(&mut self, data: &[u8]) -> usize {
        self.buffer.compact();
        let room = self.max_capacity.saturating_sub(self.buffer.write_position());
        let wanted = data.len().min(room);
        if self.buffer.remaining() < wanted {
            self.buffer.reserve(wanted);
        }
        let accepted = self.buffer.put(&data[..wanted]);
        if accepted < data.len() {
            debug!(
                offered = data.len(),
                accepted,
                max_capacity = self.max_capacity,
                "feed clamped to reader capacity"
            );
        }
        // compact() left the unread bytes at offset 0, so flipping keeps them readable
        self.buffer.flip();
        accepted
    }

    /// Next complete payload, borrowed from the reader's buffer.
    ///
    /// Returns `Ok(None)` while the frame is still incomplete. A header declaring
    /// less than its own size or more than the maximum frame size is an error and
    /// the stream should be dropped or [`reset`](Self::reset).
    pub fn next_frame_ref(&mut self) -> BufferResult<Option<&[u8]>> {
        if self.buffer.remaining() < FRAME_HEADER_SIZE {
            return Ok(None);
        }

        let start = self.buffer.read_position();
        let declared = self.buffer.read_u16_at(start)? as usize;
        if declared < FRAME_HEADER_SIZE || declared > self.max_frame_size {
            debug!(declared, max = self.max_frame_size, "invalid frame length");
            self.stats.record_rejected();
            return Err(BufferError::InvalidFrameLength {
                declared,
                max: self.max_frame_size,
            });
        }

        if self.buffer.remaining() < declared {
            return Ok(None);
        }

        self.buffer.advance_read(declared);
        self.stats.record_frame(declared);
        Ok(Some(&self.buffer.contents()[start + FRAME_HEADER_SIZE..start + declared]))
    }

    /// Next complete payload as an owned vector.
    pub fn next_frame(&mut self) -> BufferResult<Option<Vec<u8>>> {
        Ok(self.next_frame_ref()?.map(<[u8]>::to_vec))
    }

    /// Hand every complete frame to `callback` until it returns `false`.
    ///
    /// Returns the number of frames consumed, including the one on which the
    /// callback stopped.
    pub fn decode_stream<F>(&mut self, mut callback: F) -> BufferResult<usize>
    where
        F: FnMut(&[u8]) -> bool,
    {
        let mut count = 0;

        while let Some(payload) = self.next_frame_ref()? {
            count += 1;
            if !callback(payload) {
                break;
            }
        }

        Ok(count)
    }

    /// Drop all buffered bytes.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.buffer.flip();
    }
}
