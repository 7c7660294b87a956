//! Policy configuration error types.

use crate::error::SshKeyError;
use crate::keys::Fingerprint;

/// Errors that can occur while loading a certificate policy.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PolicyError {
    /// The TOML text is invalid or does not describe a policy.
    #[error("invalid policy: {0}")]
    Toml(#[from] toml::de::Error),

    /// A line of a CA key file is not an OpenSSH public key.
    #[error("line {line}: {source}")]
    AuthorityKey {
        /// 1-based line number.
        line: usize,
        /// Why the key did not parse.
        #[source]
        source: SshKeyError,
    },

    /// A certificate was listed as a certificate authority.
    #[error("certificate authority {fingerprint} is itself a certificate")]
    CertifiedAuthority {
        /// Fingerprint of the offending entry.
        fingerprint: Fingerprint,
    },
}
