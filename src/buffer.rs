/// Dual-cursor byte buffer
///
/// A single owned byte array with independent read and write cursors. Bytes are
/// accumulated in Write mode, then `flip()` turns "bytes written so far" into
/// "bytes available to read". All scalars are stored in network byte order.
///
/// Cursor invariant, held after every call:
///
/// ```text
///   0 <= read_position <= write_position <= capacity
///
///   [ consumed | unread           | free space        ]
///   0          R                  W                   capacity
/// ```

use std::fmt;
use std::hash::{Hash, Hasher};

use tracing::{debug, trace};

use crate::error::{BufferError, BufferResult};
use crate::scalar::{self, NetworkOrder, MAX_UINT_WIDTH};

/// Number of bytes shown by the `Debug` hex preview
const DEBUG_PREVIEW_LEN: usize = 32;

/// Which cursor `position()` and `buffer_limit()` refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Write,
    Read,
}

/// Byte array with separate read/write cursors and big-endian scalar accessors.
///
/// Not internally synchronized: one thread mutates a buffer at a time.
#[derive(Clone)]
pub struct ByteBuffer {
    data: Vec<u8>,
    read_position: usize,
    write_position: usize,
    // Explicit write-mode ceiling, always <= data.len()
    limit: Option<usize>,
    mode: Mode,
}

/// Generates the named forms of the scalar readers (`read_i32`, `read_i32_at`, ...)
macro_rules! named_reads {
    ($($read:ident, $read_at:ident => $ty:ty;)*) => {
        $(
            #[doc = concat!("Read a big-endian `", stringify!($ty), "` at the read cursor and advance it.")]
            #[inline]
            pub fn $read(&mut self) -> BufferResult<$ty> {
                self.read::<$ty>()
            }

            #[doc = concat!("Read a big-endian `", stringify!($ty), "` at `index` without moving a cursor.")]
            #[inline]
            pub fn $read_at(&self, index: usize) -> BufferResult<$ty> {
                self.read_at::<$ty>(index)
            }
        )*
    };
}

/// Generates the named forms of the scalar writers (`write_i32`, `write_i32_at`, ...)
macro_rules! named_writes {
    ($($write:ident, $write_at:ident => $ty:ty;)*) => {
        $(
            #[inline]
            pub fn $write(&mut self, value: $ty) -> &mut Self {
                self.write(value)
            }

            #[inline]
            pub fn $write_at(&mut self, index: usize, value: $ty) -> &mut Self {
                self.write_at(index, value)
            }
        )*
    };
}

impl ByteBuffer {
    /// Create a zeroed buffer of `capacity` bytes, ready for writing.
    pub fn new(capacity: usize) -> Self {
        ByteBuffer {
            data: vec![0u8; capacity],
            read_position: 0,
            write_position: 0,
            limit: None,
            mode: Mode::Write,
        }
    }

    /// Adopt `data` without copying.
    ///
    /// With `is_empty == false` the whole array counts as written, so a `flip()`
    /// makes it readable. With `is_empty == true` writing starts at offset 0.
    pub fn wrap(data: Vec<u8>, is_empty: bool) -> Self {
        let write_position = if is_empty { 0 } else { data.len() };
        ByteBuffer {
            data,
            read_position: 0,
            write_position,
            limit: None,
            mode: Mode::Write,
        }
    }

    /// Copy `src` into a buffer of exactly `src.len()` bytes, already flipped for reading.
    pub fn from_slice(src: &[u8]) -> Self {
        let mut buffer = ByteBuffer::new(src.len());
        buffer.put(src);
        buffer.flip();
        buffer
    }

    /// Release the buffer, returning the backing array.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    // ---------------------------------------------------------------------
    // State
    // ---------------------------------------------------------------------

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    pub fn contents_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn read_position(&self) -> usize {
        self.read_position
    }

    pub fn write_position(&self) -> usize {
        self.write_position
    }

    /// Move the read cursor; it may not pass the write cursor.
    pub fn set_read_position(&mut self, position: usize) -> BufferResult<()> {
        if position > self.write_position {
            return Err(BufferError::ReadPositionOutOfRange {
                position,
                write_position: self.write_position,
            });
        }
        self.read_position = position;
        Ok(())
    }

    /// Advance the read cursor by up to `count` unread bytes, returning how far it moved.
    pub(crate) fn advance_read(&mut self, count: usize) -> usize {
        let skipped = count.min(self.write_position - self.read_position);
        self.read_position += skipped;
        skipped
    }

    /// Cursor of the current mode
    #[inline]
    pub fn position(&self) -> usize {
        match self.mode {
            Mode::Read => self.read_position,
            Mode::Write => self.write_position,
        }
    }

    /// Effective ceiling of the current mode: the write position while reading,
    /// the explicit limit (or capacity) while writing.
    #[inline]
    pub fn buffer_limit(&self) -> usize {
        match self.mode {
            Mode::Read => self.write_position,
            Mode::Write => self.limit.unwrap_or(self.data.len()),
        }
    }

    /// Alias of [`buffer_limit`](Self::buffer_limit).
    pub fn limit(&self) -> usize {
        self.buffer_limit()
    }

    /// Explicit write-mode limit, if one is set
    pub fn explicit_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Set a soft write ceiling below capacity.
    ///
    /// Only allowed in Write mode.
    pub fn set_limit(&mut self, limit: usize) -> BufferResult<()> {
        if self.mode == Mode::Read {
            return Err(BufferError::LimitInReadMode);
        }
        if limit > self.data.len() {
            return Err(BufferError::LimitOutOfRange {
                limit,
                capacity: self.data.len(),
            });
        }
        self.limit = Some(limit);
        Ok(())
    }

    pub fn clear_limit(&mut self) {
        self.limit = None;
    }

    /// Bytes left before the current limit
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buffer_limit().saturating_sub(self.position())
    }

    #[inline]
    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// Written but not yet read bytes: `[read_position, write_position)`
    pub fn unread(&self) -> &[u8] {
        &self.data[self.read_position..self.write_position]
    }

    /// All written bytes: `[0, write_position)`
    pub fn written(&self) -> &[u8] {
        &self.data[..self.write_position]
    }

    // ---------------------------------------------------------------------
    // Mode and contents manipulation
    //
    // flip    : written bytes become readable
    // rewind  : cursor of the current mode back to 0
    // clear   : initial state, contents zeroed
    // compact : drop already-read bytes, keep the unread tail
    // truncate: drop everything past the write position
    // reserve : guarantee room after the write position
    // ---------------------------------------------------------------------

    /// Switch to Read mode with the read cursor at 0.
    pub fn flip(&mut self) -> &mut Self {
        self.mode = Mode::Read;
        self.read_position = 0;
        self
    }

    /// Reset the cursor of the current mode to 0.
    ///
    /// Rewinding the write cursor also rewinds the read cursor, which may never
    /// sit past it.
    pub fn rewind(&mut self) -> &mut Self {
        match self.mode {
            Mode::Read => self.read_position = 0,
            Mode::Write => {
                self.write_position = 0;
                self.read_position = 0;
            }
        }
        self
    }

    /// Return to the initial Write state and zero the whole array.
    pub fn clear(&mut self) -> &mut Self {
        self.mode = Mode::Write;
        self.read_position = 0;
        self.write_position = 0;
        self.limit = None;
        self.data.fill(0);
        self
    }

    /// Shift the unread bytes down to offset 0 and switch to Write mode.
    ///
    /// ```text
    /// Before: [ABCDEFG]      After: [CDEFGFG]
    ///            R    W              R    W
    /// ```
    pub fn compact(&mut self) -> &mut Self {
        let pending = self.write_position - self.read_position;
        self.data.copy_within(self.read_position..self.write_position, 0);
        self.write_position = pending;
        self.read_position = 0;
        self.mode = Mode::Write;
        self
    }

    /// Reallocate the array to exactly `write_position` bytes.
    pub fn truncate(&mut self) -> &mut Self {
        let old_capacity = self.data.len();
        self.data.truncate(self.write_position);
        self.data.shrink_to_fit();
        self.limit = self.limit.map(|limit| limit.min(self.write_position));
        debug!(old_capacity, new_capacity = self.data.len(), "buffer truncated");
        self
    }

    /// Ensure `count` bytes can be written after the write position, growing the
    /// array when the current write limit is too small. Cursors do not move.
    ///
    /// Returns the resulting [`buffer_limit`](Self::buffer_limit).
    pub fn reserve(&mut self, count: usize) -> usize {
        let write_limit = self.limit.unwrap_or(self.data.len());
        let needed = self.write_position.saturating_add(count);
        if needed > write_limit {
            if needed > self.data.len() {
                debug!(
                    old_capacity = self.data.len(),
                    new_capacity = needed,
                    "buffer grown"
                );
                self.data.resize(needed, 0);
            }
            if self.limit.is_some() {
                self.limit = Some(needed);
            }
        }
        self.buffer_limit()
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    #[inline]
    fn check_bounds(index: usize, width: usize, limit: usize) -> BufferResult<()> {
        match index.checked_add(width) {
            Some(end) if end <= limit => Ok(()),
            _ => Err(BufferError::EndOfStream {
                needed: width,
                available: limit.saturating_sub(index),
            }),
        }
    }

    #[inline]
    fn check_width(nbytes: usize) -> BufferResult<()> {
        if nbytes == 0 || nbytes > MAX_UINT_WIDTH {
            return Err(BufferError::InvalidWidth(nbytes));
        }
        Ok(())
    }

    /// Read a scalar at the read cursor and advance it.
    ///
    /// Cursor reads never pass the write position, in either mode.
    #[inline]
    pub fn read<T: NetworkOrder>(&mut self) -> BufferResult<T> {
        let index = self.read_position;
        Self::check_bounds(index, T::WIDTH, self.write_position)?;
        self.read_position = index + T::WIDTH;
        Ok(T::decode(&self.data[index..]))
    }

    /// Read a scalar at `index` (bounded by the current limit) without moving a cursor.
    #[inline]
    pub fn read_at<T: NetworkOrder>(&self, index: usize) -> BufferResult<T> {
        Self::check_bounds(index, T::WIDTH, self.buffer_limit())?;
        Ok(T::decode(&self.data[index..]))
    }

    /// Read a scalar at the read cursor; the caller has already checked `remaining()`.
    ///
    /// The logical limit is only asserted in debug builds. Past the write position
    /// the result is stale data and the cursor stops at the write position; past
    /// capacity this panics.
    #[inline]
    pub fn read_unchecked<T: NetworkOrder>(&mut self) -> T {
        let index = self.read_position;
        debug_assert!(
            index + T::WIDTH <= self.write_position,
            "read of {} bytes at {} past write position {}",
            T::WIDTH,
            index,
            self.write_position
        );
        let value = T::decode(&self.data[index..]);
        self.read_position = (index + T::WIDTH).min(self.write_position);
        value
    }

    /// Random-access read with the same contract as [`read_unchecked`](Self::read_unchecked).
    #[inline]
    pub fn read_at_unchecked<T: NetworkOrder>(&self, index: usize) -> T {
        debug_assert!(
            index + T::WIDTH <= self.buffer_limit(),
            "read of {} bytes at {} past limit {}",
            T::WIDTH,
            index,
            self.buffer_limit()
        );
        T::decode(&self.data[index..])
    }

    named_reads! {
        read_u8, read_u8_at => u8;
        read_i8, read_i8_at => i8;
        read_u16, read_u16_at => u16;
        read_i16, read_i16_at => i16;
        read_u32, read_u32_at => u32;
        read_i32, read_i32_at => i32;
        read_u64, read_u64_at => u64;
        read_i64, read_i64_at => i64;
        read_f32, read_f32_at => f32;
        read_f64, read_f64_at => f64;
    }

    /// Read an unsigned big-endian integer of `nbytes` (1..=8) and advance.
    pub fn read_uint(&mut self, nbytes: usize) -> BufferResult<u64> {
        Self::check_width(nbytes)?;
        let index = self.read_position;
        Self::check_bounds(index, nbytes, self.write_position)?;
        self.read_position = index + nbytes;
        Ok(scalar::decode_uint(&self.data[index..], nbytes))
    }

    /// Read an unsigned big-endian integer of `nbytes` (1..=8) at `index`.
    pub fn read_uint_at(&self, index: usize, nbytes: usize) -> BufferResult<u64> {
        Self::check_width(nbytes)?;
        Self::check_bounds(index, nbytes, self.buffer_limit())?;
        Ok(scalar::decode_uint(&self.data[index..], nbytes))
    }

    /// Copy up to `length` unread bytes into `dest[dest_offset..]` and advance the
    /// read cursor. Returns the number of bytes copied, which is clamped to the
    /// unread byte count.
    pub fn read_bytes_into(
        &mut self,
        dest: &mut [u8],
        dest_offset: usize,
        length: usize,
    ) -> BufferResult<usize> {
        checked_range(dest_offset, length, dest.len())?;
        let count = length.min(self.write_position - self.read_position);
        let start = self.read_position;
        dest[dest_offset..dest_offset + count].copy_from_slice(&self.data[start..start + count]);
        self.read_position += count;
        if count < length {
            trace!(requested = length, copied = count, "read clamped to unread bytes");
        }
        Ok(count)
    }

    // ---------------------------------------------------------------------
    // Writes
    //
    // put      : copy raw bytes at the write cursor, clamped to the limit
    // write    : encode a scalar at the write cursor and advance it
    // write_at : encode a scalar at an index without moving a cursor
    //
    // A scalar that does not fit before the limit is dropped whole.
    // ---------------------------------------------------------------------

    #[inline]
    fn fits(&self, index: usize, width: usize) -> bool {
        index
            .checked_add(width)
            .map_or(false, |end| end <= self.buffer_limit())
    }

    /// Write a scalar at the write cursor and advance it.
    #[inline]
    pub fn write<T: NetworkOrder>(&mut self, value: T) -> &mut Self {
        let index = self.write_position;
        if self.fits(index, T::WIDTH) {
            value.encode(&mut self.data[index..]);
            self.write_position = index + T::WIDTH;
        } else {
            trace!(
                position = index,
                width = T::WIDTH,
                limit = self.buffer_limit(),
                "write dropped at limit"
            );
        }
        self
    }

    /// Write a scalar at `index` without moving a cursor.
    #[inline]
    pub fn write_at<T: NetworkOrder>(&mut self, index: usize, value: T) -> &mut Self {
        if self.fits(index, T::WIDTH) {
            value.encode(&mut self.data[index..]);
        } else {
            trace!(
                index,
                width = T::WIDTH,
                limit = self.buffer_limit(),
                "write_at dropped at limit"
            );
        }
        self
    }

    named_writes! {
        write_u8, write_u8_at => u8;
        write_i8, write_i8_at => i8;
        write_u16, write_u16_at => u16;
        write_i16, write_i16_at => i16;
        write_u32, write_u32_at => u32;
        write_i32, write_i32_at => i32;
        write_u64, write_u64_at => u64;
        write_i64, write_i64_at => i64;
        write_f32, write_f32_at => f32;
        write_f64, write_f64_at => f64;
    }

    /// Write the low-order `nbytes` (1..=8) of `value` big-endian and advance.
    pub fn write_uint(&mut self, value: u64, nbytes: usize) -> BufferResult<&mut Self> {
        Self::check_width(nbytes)?;
        let index = self.write_position;
        if self.fits(index, nbytes) {
            scalar::encode_uint(value, &mut self.data[index..], nbytes);
            self.write_position = index + nbytes;
        } else {
            trace!(position = index, width = nbytes, "write dropped at limit");
        }
        Ok(self)
    }

    /// Write the low-order `nbytes` (1..=8) of `value` big-endian at `index`.
    pub fn write_uint_at(
        &mut self,
        index: usize,
        value: u64,
        nbytes: usize,
    ) -> BufferResult<&mut Self> {
        Self::check_width(nbytes)?;
        if self.fits(index, nbytes) {
            scalar::encode_uint(value, &mut self.data[index..], nbytes);
        } else {
            trace!(index, width = nbytes, "write_at dropped at limit");
        }
        Ok(self)
    }

    /// Copy `src` at the write cursor, clamped to the room left before the limit.
    /// Returns the number of bytes copied.
    pub fn put(&mut self, src: &[u8]) -> usize {
        let room = self.buffer_limit().saturating_sub(self.write_position);
        let count = src.len().min(room);
        let start = self.write_position;
        self.data[start..start + count].copy_from_slice(&src[..count]);
        self.write_position += count;
        if count < src.len() {
            trace!(requested = src.len(), copied = count, "put clamped to limit");
        }
        count
    }

    /// Copy `src[offset..offset + length]` at the write cursor, clamped like [`put`](Self::put).
    pub fn put_range(&mut self, src: &[u8], offset: usize, length: usize) -> BufferResult<usize> {
        let end = checked_range(offset, length, src.len())?;
        Ok(self.put(&src[offset..end]))
    }

    /// Copy the unread bytes of `other` at the write cursor.
    pub fn put_buffer(&mut self, other: &ByteBuffer) -> usize {
        self.put(other.unread())
    }
}

#[inline]
fn checked_range(offset: usize, length: usize, len: usize) -> BufferResult<usize> {
    match offset.checked_add(length) {
        Some(end) if end <= len => Ok(end),
        _ => Err(BufferError::InvalidRange { offset, length, len }),
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(data: Vec<u8>) -> Self {
        ByteBuffer::wrap(data, false)
    }
}

// Content equality: same write position and same written bytes
impl PartialEq for ByteBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.write_position == other.write_position && self.written() == other.written()
    }
}

impl Eq for ByteBuffer {}

impl Hash for ByteBuffer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.write_position.hash(state);
        self.written().hash(state);
    }
}

impl fmt::Display for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReadPosition: {}, WritePosition: {}, Limit: {}, Contents[{}]",
            self.read_position,
            self.write_position,
            self.buffer_limit(),
            self.data.len()
        )
    }
}

struct HexPreview<'a>(&'a [u8]);

impl fmt::Debug for HexPreview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = &self.0[..self.0.len().min(DEBUG_PREVIEW_LEN)];
        f.write_str("{")?;
        for (i, byte) in shown.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, " {byte:02X}")?;
        }
        if self.0.len() > shown.len() {
            f.write_str(", ..")?;
        }
        f.write_str(" }")
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("mode", &self.mode)
            .field("read_position", &self.read_position)
            .field("write_position", &self.write_position)
            .field("limit", &self.buffer_limit())
            .field("capacity", &self.data.len())
            .field("contents", &HexPreview(&self.data))
            .finish()
    }
}
