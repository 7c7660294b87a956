//! Deterministic SSH wire encoding on top of [`bytes::BufMut`].

use bytes::{BufMut, BytesMut};

/// SSH field writers for any [`BufMut`].
///
/// Output is canonical: one encoding per logical value, no padding.
pub trait WireWrite: BufMut {
    /// Write a `uint32` length prefix followed by `value`.
    fn put_ssh_string(&mut self, value: &[u8]) {
        debug_assert!(u32::try_from(value.len()).is_ok());
        self.put_u32(value.len() as u32);
        self.put_slice(value);
    }

    /// Write a UTF-8 string as an SSH `string`.
    fn put_ssh_str(&mut self, value: &str) {
        self.put_ssh_string(value.as_bytes());
    }

    /// Write an unsigned big-endian magnitude as an SSH `mpint`.
    fn put_ssh_mpint(&mut self, magnitude: &[u8]) {
        self.put_ssh_string(&mpint_body(magnitude));
    }

    /// Write a length-prefixed field whose contents are built by `build`.
    fn put_ssh_nested<F>(&mut self, build: F)
    where
        F: FnOnce(&mut BytesMut),
    {
        let mut inner = BytesMut::new();
        build(&mut inner);
        self.put_ssh_string(&inner);
    }
}

impl<B: BufMut> WireWrite for B {}

/// Body of the `mpint` encoding of an unsigned big-endian magnitude.
///
/// Leading zero bytes are stripped, and a single zero byte is prepended
/// when the high bit is set so the value stays positive. Zero encodes as an
/// empty body.
#[must_use]
pub fn mpint_body(magnitude: &[u8]) -> Vec<u8> {
    let start = magnitude
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(magnitude.len());
    let trimmed = &magnitude[start..];
    let mut body = Vec::with_capacity(trimmed.len() + 1);
    if trimmed.first().is_some_and(|b| b & 0x80 != 0) {
        body.push(0);
    }
    body.extend_from_slice(trimmed);
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_encoding() {
        let mut buf = BytesMut::new();
        buf.put_ssh_str("cats");
        buf.put_ssh_string(b"");
        assert_eq!(&buf[..], b"\x00\x00\x00\x04cats\x00\x00\x00\x00");
    }

    #[test]
    fn test_mpint_encoding() {
        let mut buf = BytesMut::new();
        buf.put_ssh_mpint(&[0x00, 0x00, 0x7f]);
        assert_eq!(&buf[..], &[0, 0, 0, 1, 0x7f]);

        let mut buf = BytesMut::new();
        buf.put_ssh_mpint(&[0x80, 0x01]);
        assert_eq!(&buf[..], &[0, 0, 0, 3, 0x00, 0x80, 0x01]);

        let mut buf = BytesMut::new();
        buf.put_ssh_mpint(&[0x00, 0x00]);
        assert_eq!(&buf[..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_nested_encoding() {
        let mut buf = BytesMut::new();
        buf.put_ssh_nested(|inner| inner.put_ssh_str("dogs"));
        assert_eq!(&buf[..], b"\x00\x00\x00\x08\x00\x00\x00\x04dogs");
    }

    #[test]
    fn test_writes_into_vec() {
        let mut buf: Vec<u8> = Vec::new();
        buf.put_ssh_str("a");
        buf.put_u64(1);
        assert_eq!(buf, [0, 0, 0, 1, b'a', 0, 0, 0, 0, 0, 0, 0, 1]);
    }
}
