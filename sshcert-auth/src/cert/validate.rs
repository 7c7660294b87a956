//! Certificate validation.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::SshKeyError;
use crate::keys::PublicKey;

use super::certificate::{Certificate, CertificateType};
use super::options::CertificateOptions;

/// Current Unix time in seconds. A clock before the epoch reads as zero.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

impl Certificate {
    /// Validate against the system clock.
    ///
    /// See [`validate_at`](Self::validate_at).
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::InvalidCertificate` if any check fails.
    pub fn validate(
        &self,
        principal: &str,
        cert_type: CertificateType,
        authorities: &[PublicKey],
        acceptable_critical_options: &[&str],
    ) -> Result<CertificateOptions, SshKeyError> {
        self.validate_at(
            unix_now(),
            principal,
            cert_type,
            authorities,
            acceptable_critical_options,
        )
    }

    /// Validate the certificate for `principal` at Unix time `now`.
    ///
    /// All of the following must hold:
    ///
    /// 1. the certificate type is `cert_type`;
    /// 2. `principal` is listed, or no principals are listed;
    /// 3. `valid_after <= now < valid_before`;
    /// 4. every critical option is named in `acceptable_critical_options`;
    /// 5. some key in `authorities` equals the signature key and verifies
    ///    the signature over [`signed_data`](Self::signed_data).
    ///
    /// On success the certificate's critical options are returned as they
    /// appear in the certificate.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::InvalidCertificate` if any check fails. The
    /// error does not say which.
    pub fn validate_at(
        &self,
        now: u64,
        principal: &str,
        cert_type: CertificateType,
        authorities: &[PublicKey],
        acceptable_critical_options: &[&str],
    ) -> Result<CertificateOptions, SshKeyError> {
        let reject = |check: &'static str| -> Result<CertificateOptions, SshKeyError> {
            tracing::debug!(
                check,
                key_id = %self.key_id(),
                serial = self.serial(),
                "certificate rejected"
            );
            Err(SshKeyError::InvalidCertificate)
        };

        if self.cert_type() != cert_type {
            return reject("type");
        }

        let principals = self.valid_principals();
        if !principals.is_empty() && !principals.iter().any(|p| p == principal) {
            return reject("principal");
        }

        if now < self.valid_after() || now >= self.valid_before() {
            return reject("validity window");
        }

        if let Some(name) = self
            .critical_options()
            .names()
            .find(|name| !acceptable_critical_options.contains(name))
        {
            tracing::debug!(option = name, "unsupported critical option");
            return reject("critical option");
        }

        let signed = self.signed_data();
        let trusted = authorities.iter().any(|authority| {
            authority == self.signature_key() && authority.verify(&signed, self.signature())
        });
        if !trusted {
            return reject("authority");
        }

        tracing::trace!(
            key_id = %self.key_id(),
            serial = self.serial(),
            ca = %self.signature_key().fingerprint(),
            "certificate accepted"
        );
        Ok(self.critical_options().clone())
    }
}
