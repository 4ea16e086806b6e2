/// Typed read/write cursors over a [`ByteBuffer`]
///
/// `WriteCursor` and `ReadCursor` own the same underlying buffer in different
/// states. The Write -> Read transition consumes the writer, so writing while
/// reading is rejected at compile time instead of being silently ignored.
///
/// ```text
///   WriteCursor --freeze()--> ReadCursor
///        ^                        |
///        +--compact() / into_writer()
/// ```

use crate::buffer::{ByteBuffer, Mode};
use crate::error::BufferResult;
use crate::scalar::NetworkOrder;

/// Write half of a buffer. Scalars are encoded in network byte order.
#[derive(Debug, Clone)]
pub struct WriteCursor {
    buffer: ByteBuffer,
}

impl WriteCursor {
    pub fn with_capacity(capacity: usize) -> Self {
        WriteCursor {
            buffer: ByteBuffer::new(capacity),
        }
    }

    /// Take over `buffer` for writing. A buffer in Read mode is compacted first,
    /// so its unread bytes are kept ahead of the new writes.
    pub fn from_buffer(mut buffer: ByteBuffer) -> Self {
        if buffer.mode() == Mode::Read {
            buffer.compact();
        }
        WriteCursor { buffer }
    }

    pub fn position(&self) -> usize {
        self.buffer.write_position()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn remaining(&self) -> usize {
        self.buffer.remaining()
    }

    pub fn limit(&self) -> usize {
        self.buffer.buffer_limit()
    }

    pub fn set_limit(&mut self, limit: usize) -> BufferResult<()> {
        self.buffer.set_limit(limit)
    }

    pub fn clear_limit(&mut self) {
        self.buffer.clear_limit();
    }

    /// Bytes written so far
    pub fn written(&self) -> &[u8] {
        self.buffer.written()
    }

    /// Scalars that do not fit before the limit are dropped.
    #[inline]
    pub fn write<T: NetworkOrder>(&mut self, value: T) -> &mut Self {
        self.buffer.write(value);
        self
    }

    #[inline]
    pub fn write_at<T: NetworkOrder>(&mut self, index: usize, value: T) -> &mut Self {
        self.buffer.write_at(index, value);
        self
    }

    pub fn write_uint(&mut self, value: u64, nbytes: usize) -> BufferResult<&mut Self> {
        self.buffer.write_uint(value, nbytes)?;
        Ok(self)
    }

    /// Returns the number of bytes actually copied.
    pub fn put(&mut self, src: &[u8]) -> usize {
        self.buffer.put(src)
    }

    pub fn reserve(&mut self, count: usize) -> usize {
        self.buffer.reserve(count)
    }

    /// Discard everything written.
    pub fn rewind(&mut self) -> &mut Self {
        self.buffer.rewind();
        self
    }

    /// Finish writing; the written bytes become readable from offset 0.
    pub fn freeze(mut self) -> ReadCursor {
        self.buffer.flip();
        ReadCursor {
            buffer: self.buffer,
        }
    }

    pub fn into_buffer(self) -> ByteBuffer {
        self.buffer
    }
}

/// Read half of a buffer. Every read is bounds-checked against the written bytes.
#[derive(Debug, Clone)]
pub struct ReadCursor {
    buffer: ByteBuffer,
}

impl ReadCursor {
    /// Read `data` from offset 0 without copying.
    pub fn new(data: Vec<u8>) -> Self {
        let mut buffer = ByteBuffer::wrap(data, false);
        buffer.flip();
        ReadCursor { buffer }
    }

    pub fn position(&self) -> usize {
        self.buffer.read_position()
    }

    pub fn remaining(&self) -> usize {
        self.buffer.remaining()
    }

    pub fn has_remaining(&self) -> bool {
        self.buffer.has_remaining()
    }

    /// Bytes not read yet
    pub fn unread(&self) -> &[u8] {
        self.buffer.unread()
    }

    #[inline]
    pub fn read<T: NetworkOrder>(&mut self) -> BufferResult<T> {
        self.buffer.read()
    }

    #[inline]
    pub fn read_at<T: NetworkOrder>(&self, index: usize) -> BufferResult<T> {
        self.buffer.read_at(index)
    }

    pub fn read_uint(&mut self, nbytes: usize) -> BufferResult<u64> {
        self.buffer.read_uint(nbytes)
    }

    pub fn read_bytes_into(
        &mut self,
        dest: &mut [u8],
        dest_offset: usize,
        length: usize,
    ) -> BufferResult<usize> {
        self.buffer.read_bytes_into(dest, dest_offset, length)
    }

    /// Move the read cursor forward by up to `count` bytes. Returns the bytes skipped.
    pub fn skip(&mut self, count: usize) -> usize {
        self.buffer.advance_read(count)
    }

    pub fn rewind(&mut self) -> &mut Self {
        self.buffer.rewind();
        self
    }

    /// Go back to writing, keeping the unread bytes at the front.
    pub fn compact(mut self) -> WriteCursor {
        self.buffer.compact();
        WriteCursor {
            buffer: self.buffer,
        }
    }

    /// Go back to writing from an empty, zeroed buffer of the same capacity.
    pub fn into_writer(mut self) -> WriteCursor {
        self.buffer.clear();
        WriteCursor {
            buffer: self.buffer,
        }
    }

    pub fn into_buffer(self) -> ByteBuffer {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freeze_and_read() {
        let mut writer = WriteCursor::with_capacity(16);
        writer.write(42i32).write(7i16);
        let mut reader = writer.freeze();
        assert_eq!(reader.read::<i32>().unwrap(), 42);
        assert_eq!(reader.read::<i16>().unwrap(), 7);
        assert!(!reader.has_remaining());
    }

    #[test]
    fn test_compact_keeps_tail() {
        let mut writer = WriteCursor::with_capacity(8);
        writer.write(1u16).write(2u16);
        let mut reader = writer.freeze();
        reader.read::<u16>().unwrap();

        let mut writer = reader.compact();
        assert_eq!(writer.position(), 2);
        writer.write(3u16);
        let mut reader = writer.freeze();
        assert_eq!(reader.read::<u16>().unwrap(), 2);
        assert_eq!(reader.read::<u16>().unwrap(), 3);
    }

    #[test]
    fn test_skip_clamps() {
        let mut reader = ReadCursor::new(vec![1, 2, 3]);
        assert_eq!(reader.skip(2), 2);
        assert_eq!(reader.skip(5), 1);
        assert_eq!(reader.position(), 3);
    }

    #[test]
    fn test_from_read_buffer_compacts() {
        let mut buffer = ByteBuffer::from_slice(&[9, 8, 7]);
        buffer.read_u8().unwrap();
        let writer = WriteCursor::from_buffer(buffer);
        assert_eq!(writer.written(), &[8, 7]);
    }
}
