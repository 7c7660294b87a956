//! `ssh-ed25519` public keys.

use base64::prelude::*;
use bytes::BufMut;

use crate::error::SshKeyError;
use crate::wire::{WireReader, WireWrite};

use super::signature::SshSignature;

/// Length of a raw Ed25519 public key.
pub const ED25519_KEY_LEN: usize = 32;

/// An Ed25519 verification key.
///
/// Blob fields after the algorithm identifier: `string(32-byte key)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(ed25519_dalek::VerifyingKey);

impl Ed25519PublicKey {
    /// Load a key from its raw 32 bytes.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::Malformed` if the slice is not 32 bytes or does
    /// not decode to a curve point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SshKeyError> {
        let bytes: [u8; ED25519_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| SshKeyError::Malformed("invalid Ed25519 key length"))?;
        let key = ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map_err(|_| SshKeyError::Malformed("invalid Ed25519 key"))?;
        Ok(Self(key))
    }

    /// Export the raw public key bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; ED25519_KEY_LEN] {
        self.0.to_bytes()
    }

    pub(crate) fn read_fields(reader: &mut WireReader<'_>) -> Result<Self, SshKeyError> {
        Self::from_bytes(reader.read_string()?)
    }

    pub(crate) fn encode_fields<B: BufMut>(&self, buf: &mut B) {
        buf.put_ssh_string(self.0.as_bytes());
    }

    /// Verify an SSH signature over `message`.
    ///
    /// Uses `verify_strict` to reject weak/small-order keys. A non-Ed25519
    /// signature never verifies.
    #[must_use]
    pub fn verify(&self, message: &[u8], signature: &SshSignature) -> bool {
        match signature {
            SshSignature::Ed25519(raw) => {
                let signature = ed25519_dalek::Signature::from_bytes(raw);
                self.0.verify_strict(message, &signature).is_ok()
            }
            SshSignature::Ecdsa { .. } => false,
        }
    }
}

impl From<ed25519_dalek::VerifyingKey> for Ed25519PublicKey {
    fn from(key: ed25519_dalek::VerifyingKey) -> Self {
        Self(key)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ed25519PublicKey({})",
            BASE64_STANDARD_NO_PAD.encode(self.0.as_bytes())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::Signer;

    #[test]
    fn test_sign_and_verify() {
        let signing_key = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        let key = Ed25519PublicKey::from(signing_key.verifying_key());

        let message = b"test message";
        let signature = SshSignature::Ed25519(signing_key.sign(message).to_bytes());

        assert!(key.verify(message, &signature));
        assert!(!key.verify(b"other message", &signature));
    }

    #[test]
    fn test_ecdsa_signature_never_verifies() {
        let signing_key = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        let key = Ed25519PublicKey::from(signing_key.verifying_key());
        let signature = SshSignature::ecdsa_from_scalars(
            crate::keys::EcdsaCurve::NistP256,
            &[1; 32],
            &[1; 32],
        );
        assert!(!key.verify(b"message", &signature));
    }

    #[test]
    fn test_fields_roundtrip() {
        let signing_key = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        let key = Ed25519PublicKey::from(signing_key.verifying_key());

        let mut buf = Vec::new();
        key.encode_fields(&mut buf);
        assert_eq!(buf.len(), 4 + ED25519_KEY_LEN);

        let mut reader = WireReader::new(&buf);
        assert_eq!(Ed25519PublicKey::read_fields(&mut reader).unwrap(), key);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_invalid_key_lengths() {
        assert!(Ed25519PublicKey::from_bytes(&[0u8; 16]).is_err());
        assert!(Ed25519PublicKey::from_bytes(&[0u8; 64]).is_err());
    }
}
