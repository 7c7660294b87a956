//! Certificate trust policy and its configuration formats.

use serde::{Deserialize, Serialize};

use crate::cert::{unix_now, CertificateType};
use crate::error::SshKeyError;
use crate::keys::PublicKey;

use super::error::PolicyError;
use super::identity::CertifiedIdentity;

/// Which CAs to trust and which critical options the caller can enforce.
///
/// Loaded from TOML:
///
/// ```toml
/// trusted_authorities = [
///     "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIJfkNV4OS33ImTXvorZr72q4v5XhVEQKfvqsxOEJ/XaR",
/// ]
/// acceptable_critical_options = ["force-command"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CertificatePolicy {
    /// CA keys whose signatures are accepted. Plain keys only.
    pub trusted_authorities: Vec<PublicKey>,
    /// Critical option names the caller knows how to enforce.
    #[serde(default)]
    pub acceptable_critical_options: Vec<String>,
}

impl CertificatePolicy {
    /// A policy trusting `trusted_authorities` and no critical options.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::CertifiedAuthority` if any authority is a
    /// certificate.
    pub fn new(trusted_authorities: Vec<PublicKey>) -> Result<Self, PolicyError> {
        let policy = Self {
            trusted_authorities,
            acceptable_critical_options: Vec::new(),
        };
        policy.check_authorities()?;
        Ok(policy)
    }

    /// Accept certificates carrying the critical option `name`.
    #[must_use]
    pub fn with_critical_option(mut self, name: impl Into<String>) -> Self {
        self.acceptable_critical_options.push(name.into());
        self
    }

    /// Parse a policy from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::Toml` for syntax errors, unknown fields or
    /// unparseable keys, and `PolicyError::CertifiedAuthority` if an
    /// authority is a certificate.
    pub fn from_toml_str(text: &str) -> Result<Self, PolicyError> {
        let policy: Self = toml::from_str(text)?;
        policy.check_authorities()?;
        Ok(policy)
    }

    fn check_authorities(&self) -> Result<(), PolicyError> {
        match self.trusted_authorities.iter().find(|key| key.is_certified()) {
            Some(key) => Err(PolicyError::CertifiedAuthority {
                fingerprint: key.fingerprint(),
            }),
            None => Ok(()),
        }
    }

    /// Authenticate an offered key against the system clock.
    ///
    /// See [`authenticate_at`](Self::authenticate_at).
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::InvalidCertificate` on any failure.
    pub fn authenticate(
        &self,
        offered: &PublicKey,
        principal: &str,
        cert_type: CertificateType,
    ) -> Result<CertifiedIdentity, SshKeyError> {
        self.authenticate_at(unix_now(), offered, principal, cert_type)
    }

    /// Authenticate an offered key at Unix time `now`.
    ///
    /// The key must be a certificate that validates for `principal` and
    /// `cert_type` under this policy. A plain key is rejected the same way
    /// as a bad certificate.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::InvalidCertificate` on any failure.
    pub fn authenticate_at(
        &self,
        now: u64,
        offered: &PublicKey,
        principal: &str,
        cert_type: CertificateType,
    ) -> Result<CertifiedIdentity, SshKeyError> {
        let Some(cert) = offered.as_certificate() else {
            tracing::debug!(
                key = %offered.fingerprint(),
                "offered key is not a certificate"
            );
            return Err(SshKeyError::InvalidCertificate);
        };

        let acceptable: Vec<&str> = self
            .acceptable_critical_options
            .iter()
            .map(String::as_str)
            .collect();
        let critical_options = cert.validate_at(
            now,
            principal,
            cert_type,
            &self.trusted_authorities,
            &acceptable,
        )?;

        tracing::trace!(
            principal,
            %cert_type,
            key_id = %cert.key_id(),
            "certificate authenticated"
        );
        Ok(CertifiedIdentity::new(cert, principal, critical_options))
    }
}

/// Parse the body of an OpenSSH `TrustedUserCAKeys` file.
///
/// One public key per line. Blank lines and lines starting with `#` are
/// skipped; comments after a key are dropped.
///
/// # Errors
///
/// Returns `PolicyError::AuthorityKey` with the line number of the first
/// unparseable key, or `PolicyError::CertifiedAuthority` if a line holds a
/// certificate.
pub fn parse_trusted_authorities(text: &str) -> Result<Vec<PublicKey>, PolicyError> {
    let mut authorities = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let key = PublicKey::from_openssh(line).map_err(|source| PolicyError::AuthorityKey {
            line: index + 1,
            source,
        })?;
        if key.is_certified() {
            return Err(PolicyError::CertifiedAuthority {
                fingerprint: key.fingerprint(),
            });
        }
        authorities.push(key);
    }
    Ok(authorities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::{Certificate, CertificateOptions, CertificateParts};
    use crate::keys::{SshSignature, SshSigner};

    const ED25519_KEY: &str =
        "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIJfkNV4OS33ImTXvorZr72q4v5XhVEQKfvqsxOEJ/XaR";
    const CA_KEY: &str = "ecdsa-sha2-nistp384 AAAAE2VjZHNhLXNoYTItbmlzdHAzODQAAAAIbmlzdHAzODQAAABhBHYlMSXacXt13oBLpMXEP0OSMw5okd5c7G3hoim1MR/THUOyOS2AVQKEqLZs+td3Y6yYCrq5TGWDNGY2dfKFX99nLqJCq2kxR//CP3UherkZnn6u4eW4biLL7xODqNOzkQ==";

    fn issue(ca: &ed25519_dalek::SigningKey, critical: CertificateOptions) -> Certificate {
        let subject = p384::ecdsa::SigningKey::random(&mut rand::rngs::OsRng);
        let mut cert = Certificate::from_parts(CertificateParts {
            nonce: vec![5; 32],
            cert_type: CertificateType::User,
            serial: 77,
            key: subject.ssh_public_key(),
            key_id: "deploy".to_string(),
            valid_principals: vec!["deploy".to_string()],
            valid_after: 1_000,
            valid_before: 2_000,
            critical_options: critical,
            extensions: CertificateOptions::from([("permit-pty", "")]),
            reserved: Vec::new(),
            signature_key: ca.ssh_public_key(),
            signature: SshSignature::Ed25519([0; 64]),
        })
        .unwrap();
        cert.sign_with(ca).unwrap();
        cert
    }

    #[test]
    fn test_parse_trusted_authorities() {
        let text = format!("# user CAs\n\n{ED25519_KEY} ops@example\n   \n{CA_KEY}\n");
        let keys = parse_trusted_authorities(&text).unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].to_openssh(), ED25519_KEY);
        assert_eq!(keys[1].to_openssh(), CA_KEY);
    }

    #[test]
    fn test_parse_trusted_authorities_reports_line() {
        let text = format!("{ED25519_KEY}\n# comment\nssh-ed25519 garbage\n");
        match parse_trusted_authorities(&text) {
            Err(PolicyError::AuthorityKey { line, source }) => {
                assert_eq!(line, 3);
                assert!(matches!(source, SshKeyError::Malformed(_)));
            }
            other => panic!("expected AuthorityKey error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_trusted_authorities_rejects_certificates() {
        let ca = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        let cert = PublicKey::Certified(issue(&ca, CertificateOptions::new()));
        let result = parse_trusted_authorities(&cert.to_openssh());
        assert!(matches!(
            result,
            Err(PolicyError::CertifiedAuthority { fingerprint }) if fingerprint == cert.fingerprint()
        ));
    }

    #[test]
    fn test_from_toml_str() {
        let text = format!(
            "trusted_authorities = [\"{ED25519_KEY}\", \"{CA_KEY}\"]\n\
             acceptable_critical_options = [\"force-command\"]\n"
        );
        let policy = CertificatePolicy::from_toml_str(&text).unwrap();
        assert_eq!(policy.trusted_authorities.len(), 2);
        assert_eq!(policy.acceptable_critical_options, ["force-command"]);

        let written = toml::to_string(&policy).unwrap();
        assert_eq!(CertificatePolicy::from_toml_str(&written).unwrap(), policy);
    }

    #[test]
    fn test_from_toml_str_defaults_options() {
        let text = format!("trusted_authorities = [\"{ED25519_KEY}\"]\n");
        let policy = CertificatePolicy::from_toml_str(&text).unwrap();
        assert!(policy.acceptable_critical_options.is_empty());
    }

    #[test]
    fn test_from_toml_str_rejects_bad_input() {
        assert!(matches!(
            CertificatePolicy::from_toml_str("trusted_authorities = [\"ssh-ed25519 !!\"]"),
            Err(PolicyError::Toml(_))
        ));
        assert!(matches!(
            CertificatePolicy::from_toml_str("trusted_authorities = []\nunknown = 1"),
            Err(PolicyError::Toml(_))
        ));
    }

    #[test]
    fn test_new_rejects_certified_authority() {
        let ca = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        let cert = PublicKey::Certified(issue(&ca, CertificateOptions::new()));
        assert!(matches!(
            CertificatePolicy::new(vec![cert]),
            Err(PolicyError::CertifiedAuthority { .. })
        ));
    }

    #[test]
    fn test_authenticate_at() {
        let ca = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        let cert = issue(&ca, CertificateOptions::from([("force-command", "uptime")]));
        let offered = PublicKey::Certified(cert.clone());

        let policy = CertificatePolicy::new(vec![ca.ssh_public_key()])
            .unwrap()
            .with_critical_option("force-command");
        let identity = policy
            .authenticate_at(1_500, &offered, "deploy", CertificateType::User)
            .unwrap();

        assert_eq!(identity.principal(), "deploy");
        assert_eq!(identity.cert_type(), CertificateType::User);
        assert_eq!(identity.key_id(), "deploy");
        assert_eq!(identity.serial(), 77);
        assert_eq!(identity.key(), cert.key());
        assert_eq!(identity.fingerprint(), cert.key().fingerprint());
        assert_eq!(identity.authority(), &ca.ssh_public_key());
        assert_eq!(identity.critical_options().get("force-command"), Some("uptime"));
        assert!(identity.extensions().contains_key("permit-pty"));
    }

    #[test]
    fn test_authenticate_at_rejects() {
        let ca = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        let cert = issue(&ca, CertificateOptions::from([("force-command", "uptime")]));
        let offered = PublicKey::Certified(cert.clone());
        let policy = CertificatePolicy::new(vec![ca.ssh_public_key()]).unwrap();

        // Unsupported critical option.
        assert_eq!(
            policy.authenticate_at(1_500, &offered, "deploy", CertificateType::User),
            Err(SshKeyError::InvalidCertificate)
        );

        let policy = policy.with_critical_option("force-command");
        assert_eq!(
            policy.authenticate_at(2_000, &offered, "deploy", CertificateType::User),
            Err(SshKeyError::InvalidCertificate)
        );
        assert_eq!(
            policy.authenticate_at(1_500, &offered, "root", CertificateType::User),
            Err(SshKeyError::InvalidCertificate)
        );
        assert_eq!(
            policy.authenticate_at(1_500, cert.key(), "deploy", CertificateType::User),
            Err(SshKeyError::InvalidCertificate)
        );
    }
}
