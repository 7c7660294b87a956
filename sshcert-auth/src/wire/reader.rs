//! Bounds-checked reads over a borrowed byte slice.

use bytes::Buf;

use crate::error::SshKeyError;

/// Upper bound on any single length-prefixed field.
///
/// A declared length above this is rejected outright rather than reported as
/// `NeedMoreData`, so a hostile length prefix cannot stall a streaming reader.
pub const MAX_FIELD_LEN: usize = 1024 * 1024;

/// A read cursor over SSH wire data.
///
/// Every read is atomic: it either returns the value and advances, or
/// returns an error and leaves the cursor where it was.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    remaining: &'a [u8],
    consumed: usize,
}

impl<'a> WireReader<'a> {
    /// Start reading at the beginning of `buf`.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            remaining: buf,
            consumed: 0,
        }
    }

    /// Number of bytes consumed so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// The unread tail of the buffer.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        self.remaining
    }

    /// Whether every byte has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Fail with `Malformed` unless every byte has been consumed.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::Malformed(reason)` if bytes remain.
    pub fn expect_end(&self, reason: &'static str) -> Result<(), SshKeyError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(SshKeyError::Malformed(reason))
        }
    }

    /// Read a big-endian `uint32`.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::NeedMoreData` if fewer than 4 bytes remain.
    pub fn read_u32(&mut self) -> Result<u32, SshKeyError> {
        let mut peek = self.remaining;
        if peek.remaining() < 4 {
            return Err(SshKeyError::NeedMoreData);
        }
        let value = peek.get_u32();
        self.commit(peek);
        Ok(value)
    }

    /// Read a big-endian `uint64`.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::NeedMoreData` if fewer than 8 bytes remain.
    pub fn read_u64(&mut self) -> Result<u64, SshKeyError> {
        let mut peek = self.remaining;
        if peek.remaining() < 8 {
            return Err(SshKeyError::NeedMoreData);
        }
        let value = peek.get_u64();
        self.commit(peek);
        Ok(value)
    }

    /// Read a `uint32` length followed by that many bytes.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::NeedMoreData` if the prefix or body is
    /// incomplete, and `SshKeyError::Malformed` if the declared length
    /// exceeds [`MAX_FIELD_LEN`].
    pub fn read_string(&mut self) -> Result<&'a [u8], SshKeyError> {
        let mut peek = self.remaining;
        if peek.remaining() < 4 {
            return Err(SshKeyError::NeedMoreData);
        }
        let len = peek.get_u32() as usize;
        if len > MAX_FIELD_LEN {
            return Err(SshKeyError::Malformed("field length exceeds limit"));
        }
        if peek.len() < len {
            return Err(SshKeyError::NeedMoreData);
        }
        let (value, rest) = peek.split_at(len);
        self.commit(rest);
        Ok(value)
    }

    /// Read a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// As [`read_string`](Self::read_string), plus `Malformed` for invalid
    /// UTF-8. The cursor does not move on any error.
    pub fn read_utf8(&mut self) -> Result<&'a str, SshKeyError> {
        let mut peek = self.clone();
        let bytes = peek.read_string()?;
        let text =
            std::str::from_utf8(bytes).map_err(|_| SshKeyError::Malformed("invalid UTF-8"))?;
        *self = peek;
        Ok(text)
    }

    /// Read an algorithm identifier: a length-prefixed printable ASCII tag.
    ///
    /// # Errors
    ///
    /// As [`read_string`](Self::read_string), plus `Malformed` if the tag is
    /// empty or contains anything but printable ASCII.
    pub fn read_algorithm_id(&mut self) -> Result<&'a str, SshKeyError> {
        let mut peek = self.clone();
        let bytes = peek.read_string()?;
        if bytes.is_empty() || !bytes.iter().all(|b| b.is_ascii_graphic()) {
            return Err(SshKeyError::Malformed("invalid algorithm identifier"));
        }
        let id = std::str::from_utf8(bytes)
            .map_err(|_| SshKeyError::Malformed("invalid algorithm identifier"))?;
        *self = peek;
        Ok(id)
    }

    /// Read a length-prefixed field and return a reader over its contents.
    ///
    /// # Errors
    ///
    /// As [`read_string`](Self::read_string).
    pub fn read_nested(&mut self) -> Result<WireReader<'a>, SshKeyError> {
        self.read_string().map(WireReader::new)
    }

    fn commit(&mut self, rest: &'a [u8]) {
        self.consumed += self.remaining.len() - rest.len();
        self.remaining = rest;
    }
}
