//! Base64 transcoding (standard alphabet, padded)

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::types::{Error, Result};

/// Encode bytes as padded standard base64
pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode padded standard base64
pub fn base64_decode(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|e| Error::illegal_message(format!("invalid base64: {}", e)))
}

/// Length of the base64 text for `len` input bytes, for pre-sizing buffers
pub fn base64_encoded_len(len: usize) -> Result<usize> {
    base64::encoded_len(len, true)
        .ok_or_else(|| Error::illegal_size(format!("base64 of {} bytes overflows", len)))
}
