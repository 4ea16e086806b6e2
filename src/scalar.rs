/// Network byte order scalar encoding
///
/// Every scalar crosses the wire big-endian regardless of host endianness:
///   - 1 byte : u8, i8
///   - 2 bytes: u16, i16
///   - 4 bytes: u32, i32, f32 (IEEE-754 bits)
///   - 8 bytes: u64, i64, f64 (IEEE-754 bits)

use byteorder::{BigEndian, ByteOrder};

mod sealed {
    pub trait Sealed {}
}

/// A fixed-width scalar that can be stored in a buffer in network byte order.
///
/// Implemented for the integer and floating point primitives only; the trait is
/// sealed so the width table above stays the complete wire contract.
pub trait NetworkOrder: Copy + sealed::Sealed {
    /// Encoded width in bytes
    const WIDTH: usize;

    /// Decode from the first `WIDTH` bytes of `src`.
    ///
    /// Panics if `src` is shorter than `WIDTH`; callers slice to the exact width.
    fn decode(src: &[u8]) -> Self;

    /// Encode into the first `WIDTH` bytes of `dst`.
    fn encode(self, dst: &mut [u8]);
}

impl sealed::Sealed for u8 {}
impl NetworkOrder for u8 {
    const WIDTH: usize = 1;

    #[inline]
    fn decode(src: &[u8]) -> Self {
        src[0]
    }

    #[inline]
    fn encode(self, dst: &mut [u8]) {
        dst[0] = self;
    }
}

impl sealed::Sealed for i8 {}
impl NetworkOrder for i8 {
    const WIDTH: usize = 1;

    #[inline]
    fn decode(src: &[u8]) -> Self {
        src[0] as i8
    }

    #[inline]
    fn encode(self, dst: &mut [u8]) {
        dst[0] = self as u8;
    }
}

macro_rules! impl_network_order {
    ($($ty:ty => $width:expr, $read:ident, $write:ident;)*) => {
        $(
            impl sealed::Sealed for $ty {}
            impl NetworkOrder for $ty {
                const WIDTH: usize = $width;

                #[inline]
                fn decode(src: &[u8]) -> Self {
                    BigEndian::$read(&src[..$width])
                }

                #[inline]
                fn encode(self, dst: &mut [u8]) {
                    BigEndian::$write(&mut dst[..$width], self)
                }
            }
        )*
    };
}

impl_network_order! {
    u16 => 2, read_u16, write_u16;
    i16 => 2, read_i16, write_i16;
    u32 => 4, read_u32, write_u32;
    i32 => 4, read_i32, write_i32;
    u64 => 8, read_u64, write_u64;
    i64 => 8, read_i64, write_i64;
    f32 => 4, read_f32, write_f32;
    f64 => 8, read_f64, write_f64;
}

/// Largest width accepted by the variable-width integer accessors
pub const MAX_UINT_WIDTH: usize = 8;

/// Decode an unsigned big-endian integer of `nbytes` (1..=8) bytes.
#[inline]
pub(crate) fn decode_uint(src: &[u8], nbytes: usize) -> u64 {
    BigEndian::read_uint(&src[..nbytes], nbytes)
}

/// Encode the low-order `nbytes` (1..=8) bytes of `value` big-endian.
///
/// High-order bytes that do not fit are dropped.
#[inline]
pub(crate) fn encode_uint(value: u64, dst: &mut [u8], nbytes: usize) {
    let masked = if nbytes >= MAX_UINT_WIDTH {
        value
    } else {
        value & ((1u64 << (nbytes * 8)) - 1)
    };
    BigEndian::write_uint(&mut dst[..nbytes], masked, nbytes);
}

// Compile-time check of the wire widths
const _: () = {
    assert!(<u8 as NetworkOrder>::WIDTH == 1);
    assert!(<i16 as NetworkOrder>::WIDTH == 2);
    assert!(<u32 as NetworkOrder>::WIDTH == 4);
    assert!(<f32 as NetworkOrder>::WIDTH == 4);
    assert!(<i64 as NetworkOrder>::WIDTH == 8);
    assert!(<f64 as NetworkOrder>::WIDTH == 8);
};
