//! Typed serialization buffer
//!
//! Every value is written as a one-byte type tag followed by its
//! little-endian payload; strings carry a `u32` length prefix. Reads must
//! mirror the writes: a read with the wrong type or past the end fails and
//! leaves the read cursor where it was.
//!
//! ```text
//! u8      0x01 b
//! i8      0x02 b
//! u64     0x03 b0..b7
//! i64     0x04 b0..b7
//! i32     0x05 b0..b3
//! pointer 0x06 b0..b7
//! string  0x07 len(u32) bytes
//! u32     0x08 b0..b3
//! ```

use crate::codec::base64_text::{base64_decode, base64_encode};
use crate::codec::checksum::checksum;
use crate::constants::{tags, SEAL_MAGIC, SEAL_VERSION};
use crate::core::config::SerializeConfig;
use crate::structures::array::DynArray;
use crate::types::{Error, Result};

/// Bytes of a sealed envelope around the payload: magic, version, length, checksum
const SEAL_OVERHEAD: usize = 2 + 1 + 4 + 4;

/// Append-only buffer with a rewindable read cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeBuffer {
    data: DynArray<u8>,
    cursor: usize,
}

impl Default for SerializeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializeBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self {
            data: DynArray::new(),
            cursor: 0,
        }
    }

    /// Create an empty buffer with the configured initial capacity
    pub fn with_config(config: &SerializeConfig) -> Result<Self> {
        Self::with_capacity(config.initial_capacity)
    }

    /// Create an empty buffer with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut buffer = Self::new();
        buffer.data.reserve(capacity)?;
        Ok(buffer)
    }

    /// Wrap previously serialized bytes; the cursor starts at the beginning
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            data: DynArray::try_from_slice(bytes)?,
            cursor: 0,
        })
    }

    /// Decode base64 text produced by [`SerializeBuffer::to_base64`]
    pub fn from_base64(text: &str) -> Result<Self> {
        Ok(Self {
            data: DynArray::from(base64_decode(text)?),
            cursor: 0,
        })
    }

    /// Number of bytes written
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when nothing has been written
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read cursor position in bytes
    #[inline]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Bytes left after the read cursor
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Move the read cursor back to the start; written data is kept
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// View of the contents, valid until the next write
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// Copy of the contents
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(self.len())?;
        bytes.extend_from_slice(self.as_bytes());
        Ok(bytes)
    }

    /// Contents as padded standard base64
    pub fn to_base64(&self) -> String {
        base64_encode(self.as_bytes())
    }

    fn put(&mut self, tag: u8, payload: &[u8]) -> Result<()> {
        self.data.reserve(1 + payload.len())?;
        self.data.append_element(tag)?;
        self.data.append_elements(payload)
    }

    /// Append an unsigned byte
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.put(tags::U8, &[value])
    }

    /// Append a signed byte
    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.put(tags::I8, &value.to_le_bytes())
    }

    /// Append an unsigned 64-bit value
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.put(tags::U64, &value.to_le_bytes())
    }

    /// Append a signed 64-bit value
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.put(tags::I64, &value.to_le_bytes())
    }

    /// Append a signed 32-bit value
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.put(tags::I32, &value.to_le_bytes())
    }

    /// Append an unsigned 32-bit value
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.put(tags::U32, &value.to_le_bytes())
    }

    /// Append an opaque pointer-sized word, always stored as 64 bits
    pub fn write_pointer(&mut self, value: usize) -> Result<()> {
        self.put(tags::POINTER, &(value as u64).to_le_bytes())
    }

    /// Append a length-prefixed byte string
    pub fn write_string(&mut self, value: impl AsRef<[u8]>) -> Result<()> {
        let bytes = value.as_ref();
        let len = u32::try_from(bytes.len())
            .map_err(|_| Error::illegal_size(format!("string of {} bytes is too long", bytes.len())))?;
        self.data.reserve(1 + 4 + bytes.len())?;
        self.data.append_element(tags::STRING)?;
        self.data.append_elements(&len.to_le_bytes())?;
        self.data.append_elements(bytes)
    }

    /// Check the tag at the cursor and that `len` payload bytes follow
    fn expect(&self, tag: u8, len: usize) -> Result<usize> {
        let rest = &self.as_bytes()[self.cursor..];
        let Some(&found) = rest.first() else {
            return Err(Error::NoMoreData {
                needed: 1 + len,
                remaining: 0,
            });
        };
        if found != tag {
            return Err(Error::TypeMismatch {
                expected: tags::name(tag),
                found: tags::name(found),
            });
        }
        if rest.len() < 1 + len {
            return Err(Error::NoMoreData {
                needed: 1 + len,
                remaining: rest.len(),
            });
        }
        Ok(self.cursor + 1)
    }

    fn take<const N: usize>(&mut self, tag: u8) -> Result<[u8; N]> {
        let start = self.expect(tag, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.as_bytes()[start..start + N]);
        self.cursor = start + N;
        Ok(out)
    }

    /// Read an unsigned byte
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>(tags::U8)?[0])
    }

    /// Read a signed byte
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(i8::from_le_bytes(self.take(tags::I8)?))
    }

    /// Read an unsigned 64-bit value
    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take(tags::U64)?))
    }

    /// Read a signed 64-bit value
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take(tags::I64)?))
    }

    /// Read a signed 32-bit value
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take(tags::I32)?))
    }

    /// Read an unsigned 32-bit value
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take(tags::U32)?))
    }

    /// Read a pointer-sized word
    pub fn read_pointer(&mut self) -> Result<usize> {
        let start = self.expect(tags::POINTER, 8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.as_bytes()[start..start + 8]);
        let value = usize::try_from(u64::from_le_bytes(raw))
            .map_err(|_| Error::illegal_message("pointer word does not fit this platform"))?;
        self.cursor = start + 8;
        Ok(value)
    }

    /// Locate the string at the cursor: (payload start, payload length)
    fn string_span(&self) -> Result<(usize, usize)> {
        let start = self.expect(tags::STRING, 4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.as_bytes()[start..start + 4]);
        let len = u32::from_le_bytes(raw) as usize;
        let payload = start + 4;
        let available = self.len() - payload;
        if available < len {
            return Err(Error::NoMoreData {
                needed: 1 + 4 + len,
                remaining: self.remaining(),
            });
        }
        Ok((payload, len))
    }

    /// Read a string into `dest`.
    ///
    /// With `None` only the string length is returned and the cursor does
    /// not move, so the caller can size a buffer and retry. A destination
    /// shorter than the string fails with `IllegalSize`, cursor unchanged.
    pub fn read_string_into(&mut self, dest: Option<&mut [u8]>) -> Result<usize> {
        let (start, len) = self.string_span()?;
        let Some(dest) = dest else {
            return Ok(len);
        };
        if dest.len() < len {
            return Err(Error::illegal_size(format!(
                "destination holds {} bytes, string needs {}",
                dest.len(),
                len
            )));
        }
        dest[..len].copy_from_slice(&self.as_bytes()[start..start + len]);
        self.cursor = start + len;
        Ok(len)
    }

    /// Read a string as owned bytes
    pub fn read_string(&mut self) -> Result<Vec<u8>> {
        let (start, len) = self.string_span()?;
        let mut out = Vec::new();
        out.try_reserve_exact(len)?;
        out.extend_from_slice(&self.as_bytes()[start..start + len]);
        self.cursor = start + len;
        Ok(out)
    }

    /// Read a string that must be valid UTF-8
    pub fn read_str(&mut self) -> Result<String> {
        let (start, len) = self.string_span()?;
        let text = std::str::from_utf8(&self.as_bytes()[start..start + len])
            .map_err(|e| Error::illegal_message(format!("string is not UTF-8: {}", e)))?;
        let mut out = String::new();
        out.try_reserve_exact(len)?;
        out.push_str(text);
        self.cursor = start + len;
        Ok(out)
    }

    /// Wrap the contents in an integrity envelope:
    /// `"DU" | version u8 | length u32 | payload | checksum u32`
    pub fn seal(&self) -> Result<Vec<u8>> {
        let payload = self.as_bytes();
        let len = u32::try_from(payload.len())
            .map_err(|_| Error::illegal_size("payload too large to seal"))?;
        let mut out = Vec::new();
        out.try_reserve_exact(SEAL_OVERHEAD + payload.len())?;
        out.extend_from_slice(SEAL_MAGIC);
        out.push(SEAL_VERSION);
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(payload);
        out.extend_from_slice(&checksum(payload).to_le_bytes());
        Ok(out)
    }

    /// Validate an envelope produced by [`SerializeBuffer::seal`] and load its payload
    pub fn unseal(sealed: &[u8]) -> Result<Self> {
        if sealed.len() < SEAL_OVERHEAD {
            return Err(Error::illegal_message(format!(
                "sealed data is {} bytes, shorter than the {} byte envelope",
                sealed.len(),
                SEAL_OVERHEAD
            )));
        }
        if &sealed[..2] != SEAL_MAGIC {
            return Err(Error::illegal_message("missing envelope magic"));
        }
        if sealed[2] != SEAL_VERSION {
            return Err(Error::IncompatibleVersion {
                found: sealed[2],
                supported: SEAL_VERSION,
            });
        }
        let declared = u32::from_le_bytes([sealed[3], sealed[4], sealed[5], sealed[6]]) as usize;
        let payload = &sealed[7..sealed.len() - 4];
        if declared != payload.len() {
            return Err(Error::illegal_message(format!(
                "envelope declares {} payload bytes, found {}",
                declared,
                payload.len()
            )));
        }
        let tail = &sealed[sealed.len() - 4..];
        let expected = u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]);
        let actual = checksum(payload);
        if expected != actual {
            return Err(Error::ChecksumMismatch { expected, actual });
        }
        Self::from_bytes(payload)
    }
}

