//! Serialization buffer, base64 transcoding and integrity checksum

mod base64_text;
mod checksum;
mod serialize;


pub use base64_text::{base64_decode, base64_encode, base64_encoded_len};
pub use checksum::checksum;
pub use serialize::SerializeBuffer;
