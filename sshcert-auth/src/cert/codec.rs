//! Certificate wire codec.
//!
//! Field order after the algorithm identifier:
//!
//! | Field            | Encoding                                   |
//! |------------------|--------------------------------------------|
//! | nonce            | string                                     |
//! | base key fields  | algorithm-specific, no identifier          |
//! | serial           | uint64                                     |
//! | type             | uint32 (1 user, 2 host)                    |
//! | key id           | string                                     |
//! | valid principals | string containing strings                  |
//! | valid after      | uint64                                     |
//! | valid before     | uint64                                     |
//! | critical options | string containing name/data pairs          |
//! | extensions       | string containing name/data pairs          |
//! | reserved         | string                                     |
//! | signature key    | string containing a full public key blob   |
//! | signature        | string containing a signature blob         |
//!
//! The signed range runs from the algorithm identifier through the
//! signature key.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::SshKeyError;
use crate::keys::{KeyAlgorithm, PublicKey, SshSignature};
use crate::wire::{WireReader, WireWrite, MAX_FIELD_LEN};

use super::certificate::{Certificate, CertificateParts, CertificateType};
use super::options::CertificateOptions;

impl Certificate {
    /// Decode a certificate blob from the front of `bytes`.
    ///
    /// Returns the certificate and the number of bytes it occupied.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::NeedMoreData` if `bytes` ends inside the blob,
    /// `SshKeyError::Malformed` if the blob is invalid or is a plain key.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), SshKeyError> {
        let mut reader = WireReader::new(bytes);
        let id = reader.read_algorithm_id()?;
        let algorithm = KeyAlgorithm::from_certificate_id(id)
            .ok_or(SshKeyError::Malformed("not a certificate algorithm"))?;
        let cert = Self::read_fields(algorithm, &mut reader)?;
        Ok((cert, reader.consumed()))
    }

    /// Decode a certificate from the front of a streaming buffer.
    ///
    /// On success the buffer is advanced past the certificate. `Ok(None)`
    /// means more bytes are needed, and the buffer is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::Malformed` if the buffered bytes cannot be a
    /// certificate; the buffer is left untouched.
    pub fn read_from(buf: &mut BytesMut) -> Result<Option<Self>, SshKeyError> {
        let decoded = Self::decode(&buf[..]);
        match decoded {
            Ok((cert, consumed)) => {
                buf.advance(consumed);
                Ok(Some(cert))
            }
            Err(SshKeyError::NeedMoreData) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Read the fields following a certificate algorithm identifier.
    pub(crate) fn read_fields(
        algorithm: KeyAlgorithm,
        reader: &mut WireReader<'_>,
    ) -> Result<Self, SshKeyError> {
        let nonce = reader.read_string()?.to_vec();
        let key = PublicKey::read_plain_fields(algorithm, reader)?;
        let serial = reader.read_u64()?;
        let cert_type = CertificateType::from_wire(reader.read_u32()?)
            .ok_or(SshKeyError::Malformed("unknown certificate type"))?;
        let key_id = reader.read_utf8()?.to_owned();
        let valid_principals = read_principals(reader)?;
        let valid_after = reader.read_u64()?;
        let valid_before = reader.read_u64()?;
        let critical_options = CertificateOptions::read(reader)?;
        let extensions = CertificateOptions::read(reader)?;
        let reserved = reader.read_string()?.to_vec();
        let signature_key = read_signature_key(reader)?;
        let signature = read_signature(reader)?;

        Ok(Self::from_checked_parts(CertificateParts {
            nonce,
            cert_type,
            serial,
            key,
            key_id,
            valid_principals,
            valid_after,
            valid_before,
            critical_options,
            extensions,
            reserved,
            signature_key,
            signature,
        }))
    }

    /// Append every field after the identifier, up to the signature.
    fn encode_signed_fields<B: BufMut>(&self, buf: &mut B) {
        let parts = self.parts();
        buf.put_ssh_string(&parts.nonce);
        parts.key.encode_fields(buf);
        buf.put_u64(parts.serial);
        buf.put_u32(parts.cert_type.to_wire());
        buf.put_ssh_str(&parts.key_id);
        buf.put_ssh_nested(|list| {
            for principal in &parts.valid_principals {
                list.put_ssh_str(principal);
            }
        });
        buf.put_u64(parts.valid_after);
        buf.put_u64(parts.valid_before);
        parts.critical_options.encode(buf);
        parts.extensions.encode(buf);
        buf.put_ssh_string(&parts.reserved);
        buf.put_ssh_nested(|blob| parts.signature_key.encode(blob));
    }

    /// Append every field after the identifier.
    pub(crate) fn encode_fields<B: BufMut>(&self, buf: &mut B) {
        self.encode_signed_fields(buf);
        buf.put_ssh_nested(|blob| self.signature().encode(blob));
    }

    /// Append the full certificate blob.
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_ssh_str(self.algorithm_id());
        self.encode_fields(buf);
    }

    /// The full certificate blob.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }

    /// The bytes covered by the CA signature.
    ///
    /// This is the certificate blob truncated before the signature field,
    /// rebuilt from the current field values.
    #[must_use]
    pub fn signed_data(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.put_ssh_str(self.algorithm_id());
        self.encode_signed_fields(&mut buf);
        buf
    }
}

/// Reject parts with a length-prefixed field longer than [`MAX_FIELD_LEN`].
///
/// The decoder refuses such fields, so a certificate holding one could be
/// encoded but never read back.
pub(crate) fn check_field_lengths(parts: &CertificateParts) -> Result<(), SshKeyError> {
    let principals: usize = parts
        .valid_principals
        .iter()
        .map(|principal| 4 + principal.len())
        .sum();
    let lengths = [
        parts.nonce.len(),
        parts.key_id.len(),
        principals,
        parts.critical_options.encoded_len(),
        parts.extensions.encoded_len(),
        parts.reserved.len(),
    ];
    if lengths.into_iter().any(|len| len > MAX_FIELD_LEN) {
        return Err(SshKeyError::Malformed("field length exceeds limit"));
    }
    Ok(())
}

fn read_principals(reader: &mut WireReader<'_>) -> Result<Vec<String>, SshKeyError> {
    let mut list = reader.read_nested()?;
    let mut principals = Vec::new();
    while !list.is_empty() {
        let principal = list
            .read_utf8()
            .map_err(|e| e.complete_input("truncated principal"))?;
        principals.push(principal.to_owned());
    }
    Ok(principals)
}

fn read_signature_key(reader: &mut WireReader<'_>) -> Result<PublicKey, SshKeyError> {
    let mut blob = reader.read_nested()?;
    let key = PublicKey::read(&mut blob).map_err(|e| e.complete_input("truncated signature key"))?;
    if key.is_certified() {
        return Err(SshKeyError::Malformed("certificate chaining"));
    }
    blob.expect_end("trailing signature key data")?;
    Ok(key)
}

fn read_signature(reader: &mut WireReader<'_>) -> Result<SshSignature, SshKeyError> {
    let mut blob = reader.read_nested()?;
    let signature =
        SshSignature::read(&mut blob).map_err(|e| e.complete_input("truncated signature"))?;
    blob.expect_end("trailing signature data")?;
    Ok(signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::SshSigner;

    fn issue(cert_type: CertificateType) -> Certificate {
        let ca = p256::ecdsa::SigningKey::random(&mut rand::rngs::OsRng);
        let subject = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        let mut cert = Certificate::from_parts(CertificateParts {
            nonce: vec![1, 2, 3, 4],
            cert_type,
            serial: 543,
            key: subject.ssh_public_key(),
            key_id: "test key".to_string(),
            valid_principals: vec!["localhost".to_string(), "example.com".to_string()],
            valid_after: 10,
            valid_before: 20,
            critical_options: CertificateOptions::from([("cats", "dogs")]),
            extensions: CertificateOptions::from([("permit-pty", "")]),
            reserved: Vec::new(),
            signature_key: ca.ssh_public_key(),
            signature: SshSignature::Ed25519([0; 64]),
        })
        .unwrap();
        cert.sign_with(&ca).unwrap();
        cert
    }

    #[test]
    fn test_roundtrip_is_exact() {
        let cert = issue(CertificateType::Host);
        let bytes = cert.to_bytes();

        let (decoded, consumed) = Certificate::decode(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded.to_bytes(), bytes);
        assert_eq!(decoded, cert);
        assert_eq!(decoded.algorithm_id(), "ssh-ed25519-cert-v01@openssh.com");
    }

    #[test]
    fn test_signed_data_is_prefix_of_blob() {
        let cert = issue(CertificateType::User);
        let bytes = cert.to_bytes();
        let signed = cert.signed_data();

        assert!(bytes.starts_with(&signed));
        let mut tail = WireReader::new(&bytes[signed.len()..]);
        let signature = tail.read_string().unwrap();
        assert!(tail.is_empty());
        assert_eq!(signature, &cert.signature().to_bytes()[..]);
    }

    #[test]
    fn test_every_prefix_needs_more_data() {
        let bytes = issue(CertificateType::User).to_bytes();
        for len in 0..bytes.len() {
            assert_eq!(
                Certificate::decode(&bytes[..len]).unwrap_err(),
                SshKeyError::NeedMoreData,
                "prefix of length {len}"
            );
        }
    }

    #[test]
    fn test_read_from_leaves_buffer_on_short_input() {
        let bytes = issue(CertificateType::User).to_bytes();
        let mut buf = BytesMut::from(&bytes[..bytes.len() - 1]);
        assert!(Certificate::read_from(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), bytes.len() - 1);

        buf.put_slice(&bytes[bytes.len() - 1..]);
        let cert = Certificate::read_from(&mut buf).unwrap().unwrap();
        assert!(buf.is_empty());
        assert_eq!(cert.to_bytes(), bytes);
    }

    #[test]
    fn test_field_at_limit_round_trips() {
        let mut cert = issue(CertificateType::User);
        // Name and data framing take 4 + 1 + 4 + 4 bytes of the list.
        let value = "v".repeat(MAX_FIELD_LEN - 13);
        *cert.extensions_mut() = CertificateOptions::from([("x", value)]);
        assert_eq!(cert.extensions().encoded_len(), MAX_FIELD_LEN);

        let ca = p256::ecdsa::SigningKey::random(&mut rand::rngs::OsRng);
        cert.sign_with(&ca).unwrap();
        let bytes = cert.to_bytes();

        let (decoded, consumed) = Certificate::decode(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded, cert);
        assert_eq!(
            Certificate::decode(&bytes[..bytes.len() - 1]).unwrap_err(),
            SshKeyError::NeedMoreData
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        let cert = issue(CertificateType::User);
        let mut bytes = cert.to_bytes();
        // Identifier, nonce, ed25519 key, serial: the type tag follows.
        let offset = (4 + cert.algorithm_id().len()) + (4 + 4) + (4 + 32) + 8;
        assert_eq!(&bytes[offset..offset + 4], &[0, 0, 0, 1]);
        bytes[offset + 3] = 3;

        assert_eq!(
            Certificate::decode(&bytes).unwrap_err(),
            SshKeyError::Malformed("unknown certificate type")
        );
    }

    #[test]
    fn test_plain_key_is_not_a_certificate() {
        let key = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng).ssh_public_key();
        assert_eq!(
            Certificate::decode(&key.to_bytes()).unwrap_err(),
            SshKeyError::Malformed("not a certificate algorithm")
        );
    }

    #[test]
    fn test_certified_signature_key_rejected() {
        let inner = issue(CertificateType::User);
        let cert = issue(CertificateType::User);

        // Re-frame the blob with a certificate in the signature key slot.
        let mut bytes = Vec::new();
        bytes.put_ssh_str(cert.algorithm_id());
        let parts = cert.parts();
        bytes.put_ssh_string(&parts.nonce);
        parts.key.encode_fields(&mut bytes);
        bytes.put_u64(parts.serial);
        bytes.put_u32(parts.cert_type.to_wire());
        bytes.put_ssh_str(&parts.key_id);
        bytes.put_ssh_nested(|list| {
            for principal in &parts.valid_principals {
                list.put_ssh_str(principal);
            }
        });
        bytes.put_u64(parts.valid_after);
        bytes.put_u64(parts.valid_before);
        parts.critical_options.encode(&mut bytes);
        parts.extensions.encode(&mut bytes);
        bytes.put_ssh_string(&parts.reserved);
        bytes.put_ssh_nested(|blob| inner.encode(blob));
        bytes.put_ssh_nested(|blob| parts.signature.encode(blob));

        assert_eq!(
            Certificate::decode(&bytes).unwrap_err(),
            SshKeyError::Malformed("certificate chaining")
        );
    }

    #[test]
    fn test_trailing_signature_key_bytes_rejected() {
        let cert = issue(CertificateType::User);
        let signed = cert.signed_data();
        let key_blob = cert.signature_key().to_bytes();

        // Swap the signature key field for one with a trailing byte.
        let key_field_len = 4 + key_blob.len();
        let mut bytes = signed[..signed.len() - key_field_len].to_vec();
        let mut padded = key_blob;
        padded.push(0);
        bytes.put_ssh_string(&padded);
        bytes.put_ssh_nested(|blob| cert.signature().encode(blob));

        assert_eq!(
            Certificate::decode(&bytes).unwrap_err(),
            SshKeyError::Malformed("trailing signature key data")
        );
    }
}
