//! Global constants used throughout the toolkit
//!
//! Defaults for pool and table sizing, the fence layout used by pool
//! overflow detection, and the tags of the serialization wire format.

/// Default size of each memory pool block in bytes (64KB)
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Alignment of every pool allocation
pub const POOL_ALIGN: usize = 8;

/// Guard bytes placed before and after each fenced allocation
pub const FENCE_SIZE: usize = 8;

/// Byte pattern written into pool fences
pub const FENCE_PATTERN: u8 = 0xFD;

/// Default number of hash table buckets
pub const DEFAULT_TABLE_BUCKETS: usize = 16;

/// Default entries-per-bucket ratio that triggers a rehash
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;

/// Upper bound accepted for the table load factor
pub const MAX_LOAD_FACTOR_LIMIT: f64 = 8.0;

/// Default initial capacity of a serialization buffer in bytes
pub const DEFAULT_SERIALIZE_CAPACITY: usize = 256;

/// Magic bytes opening a sealed serialization envelope
pub const SEAL_MAGIC: &[u8; 2] = b"DU";

/// Version of the sealed envelope format written by this build
pub const SEAL_VERSION: u8 = 1;

/// Wire tags of serialized values
pub mod tags {
    /// Unsigned 8-bit value
    pub const U8: u8 = 0x01;
    /// Signed 8-bit value
    pub const I8: u8 = 0x02;
    /// Unsigned 64-bit value
    pub const U64: u8 = 0x03;
    /// Signed 64-bit value
    pub const I64: u8 = 0x04;
    /// Signed 32-bit value
    pub const I32: u8 = 0x05;
    /// Pointer-sized word, always written as 64 bits
    pub const POINTER: u8 = 0x06;
    /// Length-prefixed byte string
    pub const STRING: u8 = 0x07;
    /// Unsigned 32-bit value
    pub const U32: u8 = 0x08;

    /// Human-readable name of a tag, used in type mismatch errors
    pub fn name(tag: u8) -> &'static str {
        match tag {
            U8 => "u8",
            I8 => "i8",
            U64 => "u64",
            I64 => "i64",
            I32 => "i32",
            POINTER => "pointer",
            STRING => "string",
            U32 => "u32",
            _ => "unknown",
        }
    }
}
