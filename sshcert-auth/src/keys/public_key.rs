//! The `PublicKey` tagged union and its OpenSSH text form.

use base64::prelude::*;
use bytes::{Buf, BufMut, BytesMut};

use crate::cert::Certificate;
use crate::error::SshKeyError;
use crate::wire::{WireReader, WireWrite};

use super::algorithm::KeyAlgorithm;
use super::ecdsa::EcdsaPublicKey;
use super::ed25519::Ed25519PublicKey;
use super::fingerprint::Fingerprint;
use super::signature::SshSignature;

/// An SSH public key: a plain key or a CA-signed certificate.
///
/// Equality and hashing are defined over the canonical wire encoding, so two
/// keys parsed from identical bytes are equal however they were obtained.
#[derive(Clone)]
pub enum PublicKey {
    /// `ssh-ed25519`
    Ed25519(Ed25519PublicKey),
    /// `ecdsa-sha2-nistp{256,384,521}`
    Ecdsa(EcdsaPublicKey),
    /// `*-cert-v01@openssh.com`
    Certified(Certificate),
}

impl PublicKey {
    /// The key algorithm. For a certificate, the algorithm of its base key.
    #[must_use]
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            Self::Ed25519(_) => KeyAlgorithm::Ed25519,
            Self::Ecdsa(key) => KeyAlgorithm::Ecdsa(key.curve()),
            Self::Certified(cert) => cert.key().algorithm(),
        }
    }

    /// The algorithm identifier at the start of the blob.
    #[must_use]
    pub fn algorithm_id(&self) -> &'static str {
        match self {
            Self::Certified(_) => self.algorithm().certificate_id(),
            _ => self.algorithm().id(),
        }
    }

    /// Whether this key is a certificate.
    #[must_use]
    pub fn is_certified(&self) -> bool {
        matches!(self, Self::Certified(_))
    }

    /// The certificate, if this key is one.
    #[must_use]
    pub fn as_certificate(&self) -> Option<&Certificate> {
        match self {
            Self::Certified(cert) => Some(cert),
            _ => None,
        }
    }

    /// Convert into the certificate, handing the key back if it is plain.
    ///
    /// # Errors
    ///
    /// Returns `Err(self)` for a plain key.
    pub fn into_certificate(self) -> Result<Certificate, Self> {
        match self {
            Self::Certified(cert) => Ok(cert),
            other => Err(other),
        }
    }

    /// Parse `"<algorithm-id> <base64> [comment]"`.
    ///
    /// The comment is discarded. The identifier in the text must agree with
    /// the one inside the blob, and the blob must be consumed exactly.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::Malformed` for any defect, including a
    /// truncated blob.
    pub fn from_openssh(text: &str) -> Result<Self, SshKeyError> {
        let mut fields = text.split_ascii_whitespace();
        let id = fields
            .next()
            .ok_or(SshKeyError::Malformed("missing algorithm identifier"))?;
        let encoded = fields
            .next()
            .ok_or(SshKeyError::Malformed("missing key data"))?;
        let blob = BASE64_STANDARD
            .decode(encoded)
            .map_err(|_| SshKeyError::Malformed("invalid base64 key data"))?;

        let (key, consumed) =
            Self::decode(&blob).map_err(|e| e.complete_input("truncated key data"))?;
        if consumed != blob.len() {
            return Err(SshKeyError::Malformed("trailing key data"));
        }
        if key.algorithm_id() != id {
            return Err(SshKeyError::Malformed("algorithm identifier mismatch"));
        }
        Ok(key)
    }

    /// Export as `"<algorithm-id> <base64>"`, never with a comment.
    #[must_use]
    pub fn to_openssh(&self) -> String {
        format!(
            "{} {}",
            self.algorithm_id(),
            BASE64_STANDARD.encode(self.to_bytes())
        )
    }

    /// Decode a key blob from the front of `bytes`.
    ///
    /// Returns the key and the number of bytes it occupied. `bytes` is only
    /// borrowed, so a `NeedMoreData` result can be retried on a longer
    /// buffer.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::NeedMoreData` if `bytes` ends inside the blob,
    /// `SshKeyError::Malformed` if the blob is invalid.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), SshKeyError> {
        let mut reader = WireReader::new(bytes);
        let key = Self::read(&mut reader)?;
        Ok((key, reader.consumed()))
    }

    /// Decode a key from the front of a streaming buffer.
    ///
    /// On success the buffer is advanced past the key. `Ok(None)` means more
    /// bytes are needed, and the buffer is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::Malformed` if the buffered bytes cannot be a key;
    /// the buffer is left untouched.
    pub fn read_from(buf: &mut BytesMut) -> Result<Option<Self>, SshKeyError> {
        let decoded = Self::decode(&buf[..]);
        match decoded {
            Ok((key, consumed)) => {
                buf.advance(consumed);
                Ok(Some(key))
            }
            Err(SshKeyError::NeedMoreData) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn read(reader: &mut WireReader<'_>) -> Result<Self, SshKeyError> {
        let id = reader.read_algorithm_id()?;
        if let Some(algorithm) = KeyAlgorithm::from_id(id) {
            Self::read_plain_fields(algorithm, reader)
        } else if let Some(algorithm) = KeyAlgorithm::from_certificate_id(id) {
            Certificate::read_fields(algorithm, reader).map(Self::Certified)
        } else {
            Err(SshKeyError::Malformed("unknown key algorithm"))
        }
    }

    /// Read the fields of a plain key whose identifier was already consumed.
    pub(crate) fn read_plain_fields(
        algorithm: KeyAlgorithm,
        reader: &mut WireReader<'_>,
    ) -> Result<Self, SshKeyError> {
        match algorithm {
            KeyAlgorithm::Ed25519 => Ed25519PublicKey::read_fields(reader).map(Self::Ed25519),
            KeyAlgorithm::Ecdsa(curve) => {
                EcdsaPublicKey::read_fields(curve, reader).map(Self::Ecdsa)
            }
        }
    }

    /// Append the canonical blob: identifier followed by the fields.
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_ssh_str(self.algorithm_id());
        self.encode_fields(buf);
    }

    /// Append everything after the algorithm identifier.
    pub(crate) fn encode_fields<B: BufMut>(&self, buf: &mut B) {
        match self {
            Self::Ed25519(key) => key.encode_fields(buf),
            Self::Ecdsa(key) => key.encode_fields(buf),
            Self::Certified(cert) => cert.encode_fields(buf),
        }
    }

    /// The canonical blob.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }

    /// Verify an SSH signature over `message`.
    ///
    /// A certificate verifies with its base key. Signatures whose algorithm
    /// does not match the key never verify.
    #[must_use]
    pub fn verify(&self, message: &[u8], signature: &SshSignature) -> bool {
        match self {
            Self::Ed25519(key) => key.verify(message, signature),
            Self::Ecdsa(key) => key.verify(message, signature),
            Self::Certified(cert) => cert.key().verify(message, signature),
        }
    }

    /// SHA-256 fingerprint of the canonical blob.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PublicKey {}

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl From<Ed25519PublicKey> for PublicKey {
    fn from(key: Ed25519PublicKey) -> Self {
        Self::Ed25519(key)
    }
}

impl From<EcdsaPublicKey> for PublicKey {
    fn from(key: EcdsaPublicKey) -> Self {
        Self::Ecdsa(key)
    }
}

impl From<Certificate> for PublicKey {
    fn from(cert: Certificate) -> Self {
        Self::Certified(cert)
    }
}

impl std::str::FromStr for PublicKey {
    type Err = SshKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_openssh(s)
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_openssh())
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Certified(cert) => f.debug_tuple("PublicKey").field(cert).finish(),
            _ => write!(f, "PublicKey({} {})", self.algorithm_id(), self.fingerprint()),
        }
    }
}

impl serde::Serialize for PublicKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for PublicKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_openssh(&text).map_err(serde::de::Error::custom)
    }
}
