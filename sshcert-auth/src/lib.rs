//! OpenSSH public keys and certificates.
//!
//! This crate is IO-free:
//! - No filesystem operations
//! - No network calls
//! - No clock access beyond `SystemTime::now()` in the convenience
//!   validators, each of which has an explicit-time variant
//!
//! Modules:
//! - [`wire`] - SSH binary field codec
//! - [`keys`] - Ed25519 and ECDSA (P-256, P-384, P-521) public keys,
//!   signatures, fingerprints and the [`keys::SshSigner`] capability
//! - [`cert`] - `*-cert-v01@openssh.com` certificates and their validation
//! - [`policy`] - trusted-CA configuration and authentication
//!
//! # Example
//!
//! ```no_run
//! use sshcert_auth::{CertificatePolicy, CertificateType, PublicKey};
//!
//! # fn run(offered_text: &str, ca_file: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let authorities = sshcert_auth::parse_trusted_authorities(ca_file)?;
//! let policy = CertificatePolicy::new(authorities)?.with_critical_option("force-command");
//!
//! let offered: PublicKey = offered_text.parse()?;
//! let identity = policy.authenticate(&offered, "alice", CertificateType::User)?;
//! println!("{} authenticated with {}", identity.principal(), identity.key_id());
//! # Ok(())
//! # }
//! ```

pub mod cert;
mod error;
pub mod keys;
pub mod policy;
pub mod wire;

pub use cert::{Certificate, CertificateOptions, CertificateParts, CertificateType};
pub use error::SshKeyError;
pub use keys::{
    EcdsaCurve, EcdsaPublicKey, Ed25519PublicKey, Fingerprint, KeyAlgorithm, PublicKey,
    SshSignature, SshSigner,
};
pub use policy::{parse_trusted_authorities, CertificatePolicy, CertifiedIdentity, PolicyError};
