/// Wire Buffer - dual-cursor byte buffer for binary protocol codecs
///
/// A reusable buffer that is filled in Write mode and drained in Read mode with
/// network byte order scalar and block I/O. Features include:
/// - Independent read/write cursors with explicit flip/compact/rewind transitions
/// - Big-endian accessors for u8..u64, i8..i64, f32 and f64, sequential or random access
/// - Silent-truncation writes for speculative encoders, checked reads for decoders
/// - Typed `WriteCursor`/`ReadCursor` wrappers that make the mode a compile-time state
/// - Length-prefixed framing for stream transports
/// - Size-tiered buffer pooling with statistics

pub mod buffer;
pub mod config;
pub mod cursor;
pub mod error;
pub mod frame;
pub mod pool;
pub mod scalar;
pub mod stats;

pub use buffer::{ByteBuffer, Mode};
pub use config::{BufferConfig, FrameConfig, PoolConfig};
pub use cursor::{ReadCursor, WriteCursor};
pub use error::{BufferError, BufferResult};
pub use frame::{FrameReader, FrameWriter, FRAME_HEADER_SIZE};
pub use pool::{BufferPool, PooledBuffer};
pub use scalar::NetworkOrder;
pub use stats::{FrameStats, PoolSnapshot, PoolStats};
