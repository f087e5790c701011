//! 32-bit integrity checksum
//!
//! The value is the first four bytes (little-endian) of a BLAKE3 digest. At
//! 32 bits it detects accidental corruption only; it is NOT a cryptographic
//! authenticator.

/// Checksum of `data`
pub fn checksum(data: &[u8]) -> u32 {
    let digest = blake3::hash(data);
    let bytes = digest.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
