//! OpenSSH certificates.
//!
//! A [`Certificate`] binds a plain public key to a key id, a set of
//! principals, a validity window and option lists, under a CA signature.
//!
//! Decoding keeps every field, including the unused reserved field and
//! duplicate option names, so re-encoding an unmodified certificate yields
//! the original bytes. The CA signature covers that encoding up to the
//! signature field, so any mutation makes the signature fail to verify.
//!
//! [`Certificate::validate`] runs the checks a server applies before
//! accepting a certificate. Every failure is reported as
//! [`SshKeyError::InvalidCertificate`](crate::SshKeyError::InvalidCertificate).

mod certificate;
mod codec;
mod options;
mod validate;

pub use certificate::{Certificate, CertificateParts, CertificateType};
pub use options::CertificateOptions;

pub(crate) use validate::unix_now;
