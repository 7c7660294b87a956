//! SHA-256 key fingerprints in `ssh-keygen -l` format.

use base64::prelude::*;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::SshKeyError;

use super::public_key::PublicKey;

/// A SHA-256 fingerprint of a public key blob.
///
/// Format: `SHA256:{base64_no_padding}`, the same string `ssh-keygen -l`
/// prints.
///
/// # Security
///
/// Comparisons use constant-time equality. `Hash` stays derived: the hash
/// value is not secret.
#[derive(Clone, Eq, Hash)]
#[allow(clippy::derived_hash_with_manual_eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// The prefix used for fingerprint strings.
    pub const PREFIX: &'static str = "SHA256:";

    /// Fingerprint the canonical wire encoding of `key`.
    ///
    /// A certificate is fingerprinted over its whole blob, as OpenSSH does.
    #[must_use]
    pub fn of(key: &PublicKey) -> Self {
        let hash = Sha256::digest(key.to_bytes());
        Self::from_hash_bytes(hash.into())
    }

    /// Create a fingerprint from raw SHA-256 bytes.
    #[must_use]
    pub fn from_hash_bytes(hash: [u8; 32]) -> Self {
        Self(format!("{}{}", Self::PREFIX, BASE64_STANDARD_NO_PAD.encode(hash)))
    }

    /// Parse a fingerprint from a string.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::Malformed` unless the string is `SHA256:`
    /// followed by unpadded base64 of exactly 32 bytes.
    pub fn parse(s: &str) -> Result<Self, SshKeyError> {
        let encoded = s
            .strip_prefix(Self::PREFIX)
            .ok_or(SshKeyError::Malformed("missing fingerprint prefix"))?;
        let decoded = BASE64_STANDARD_NO_PAD
            .decode(encoded)
            .map_err(|_| SshKeyError::Malformed("invalid fingerprint encoding"))?;
        if decoded.len() != 32 {
            return Err(SshKeyError::Malformed("invalid fingerprint length"));
        }
        Ok(Self(s.to_string()))
    }

    /// Get the fingerprint as a string reference.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fingerprint({})", self.0)
    }
}
