//! The result of a successful certificate authentication.

use crate::cert::{Certificate, CertificateOptions, CertificateType};
use crate::keys::{Fingerprint, PublicKey};

/// A principal proven by a CA-signed certificate.
///
/// Only [`CertificatePolicy::authenticate`](super::CertificatePolicy::authenticate)
/// creates these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertifiedIdentity {
    principal: String,
    cert_type: CertificateType,
    key_id: String,
    serial: u64,
    key: PublicKey,
    authority: PublicKey,
    critical_options: CertificateOptions,
    extensions: CertificateOptions,
}

impl CertifiedIdentity {
    /// Create an identity from a certificate that has passed validation.
    ///
    /// # Visibility
    ///
    /// Crate-private so that holding a `CertifiedIdentity` always means
    /// validation ran.
    #[must_use]
    pub(crate) fn new(
        cert: &Certificate,
        principal: &str,
        critical_options: CertificateOptions,
    ) -> Self {
        Self {
            principal: principal.to_string(),
            cert_type: cert.cert_type(),
            key_id: cert.key_id().to_string(),
            serial: cert.serial(),
            key: cert.key().clone(),
            authority: cert.signature_key().clone(),
            critical_options,
            extensions: cert.extensions().clone(),
        }
    }

    /// The principal that was authenticated.
    #[must_use]
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// Whether a user or host certificate was presented.
    #[must_use]
    pub fn cert_type(&self) -> CertificateType {
        self.cert_type
    }

    /// The certificate's key id, for audit logs.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// The certificate's serial number.
    #[must_use]
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// The certified (base) key. The peer must prove possession of it.
    #[must_use]
    pub fn key(&self) -> &PublicKey {
        &self.key
    }

    /// Fingerprint of the certified key.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        self.key.fingerprint()
    }

    /// The CA key that signed the certificate.
    #[must_use]
    pub fn authority(&self) -> &PublicKey {
        &self.authority
    }

    /// Critical options the caller must now enforce.
    #[must_use]
    pub fn critical_options(&self) -> &CertificateOptions {
        &self.critical_options
    }

    /// The certificate's extensions, unvalidated.
    #[must_use]
    pub fn extensions(&self) -> &CertificateOptions {
        &self.extensions
    }
}
