//! Configuration-driven certificate authentication.
//!
//! A [`CertificatePolicy`] names the trusted CA keys and the critical
//! options the caller can enforce. Offering it a certificate either yields a
//! [`CertifiedIdentity`] or `InvalidCertificate`.
//!
//! Policies load from TOML ([`CertificatePolicy::from_toml_str`]) or from an
//! OpenSSH `TrustedUserCAKeys` file body ([`parse_trusted_authorities`]).
//! Reading the files is left to the caller.

mod config;
mod error;
mod identity;

pub use config::{parse_trusted_authorities, CertificatePolicy};
pub use error::PolicyError;
pub use identity::CertifiedIdentity;
