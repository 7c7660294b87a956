//! The `Certificate` aggregate and its copy-on-write storage.

use std::sync::Arc;

use crate::error::SshKeyError;
use crate::keys::{PublicKey, SshSignature, SshSigner};

use super::codec::check_field_lengths;
use super::options::CertificateOptions;

/// What a certificate may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertificateType {
    /// Authenticates a user to a host.
    User,
    /// Authenticates a host to a user.
    Host,
}

impl CertificateType {
    /// Map the wire tag (`1` user, `2` host).
    #[must_use]
    pub fn from_wire(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(Self::User),
            2 => Some(Self::Host),
            _ => None,
        }
    }

    /// The wire tag.
    #[must_use]
    pub fn to_wire(self) -> u32 {
        match self {
            Self::User => 1,
            Self::Host => 2,
        }
    }
}

impl std::fmt::Display for CertificateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Host => f.write_str("host"),
        }
    }
}

/// The fields of a certificate, in wire order.
///
/// Used to build a [`Certificate`] with [`Certificate::from_parts`] and to
/// take one apart with [`Certificate::into_parts`].
#[derive(Debug, Clone)]
pub struct CertificateParts {
    /// CA-chosen random bytes.
    pub nonce: Vec<u8>,
    /// User or host.
    pub cert_type: CertificateType,
    /// CA-assigned serial number.
    pub serial: u64,
    /// The certified key. Must be a plain key.
    pub key: PublicKey,
    /// Free-form identifier, logged by servers.
    pub key_id: String,
    /// Principals the certificate is valid for; empty means any.
    pub valid_principals: Vec<String>,
    /// First second of validity (inclusive, Unix time).
    pub valid_after: u64,
    /// End of validity (exclusive, Unix time).
    pub valid_before: u64,
    /// Restrictions a validator must understand.
    pub critical_options: CertificateOptions,
    /// Optional features; never validated.
    pub extensions: CertificateOptions,
    /// Unused field, carried verbatim.
    pub reserved: Vec<u8>,
    /// The CA key. Must be a plain key.
    pub signature_key: PublicKey,
    /// The CA's signature over every preceding field.
    pub signature: SshSignature,
}

/// An OpenSSH certificate (`*-cert-v01@openssh.com`).
///
/// Clones share storage until one of them is mutated, at which point the
/// mutated copy takes private storage; earlier copies never observe the
/// change. Equality and hashing are over the encoded blob.
///
/// Neither the certified key nor the signature key may itself be a
/// certificate. Every constructor and setter enforces this.
#[derive(Clone)]
pub struct Certificate {
    inner: Arc<CertificateParts>,
}

fn reject_chaining(key: &PublicKey) -> Result<(), SshKeyError> {
    if key.is_certified() {
        return Err(SshKeyError::Malformed("certificate chaining"));
    }
    Ok(())
}

impl Certificate {
    /// Build a certificate from its fields.
    ///
    /// The signature is taken as given; nothing is verified here.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::Malformed` if `key` or `signature_key` is a
    /// certificate, or if a length-prefixed field is longer than
    /// [`MAX_FIELD_LEN`](crate::wire::MAX_FIELD_LEN).
    pub fn from_parts(parts: CertificateParts) -> Result<Self, SshKeyError> {
        reject_chaining(&parts.key)?;
        reject_chaining(&parts.signature_key)?;
        check_field_lengths(&parts)?;
        Ok(Self::from_checked_parts(parts))
    }

    /// Wrap parts whose keys are already known to be plain.
    pub(crate) fn from_checked_parts(parts: CertificateParts) -> Self {
        Self {
            inner: Arc::new(parts),
        }
    }

    /// Take the certificate apart, copying only if storage is shared.
    #[must_use]
    pub fn into_parts(self) -> CertificateParts {
        Arc::try_unwrap(self.inner).unwrap_or_else(|shared| (*shared).clone())
    }

    /// Borrow every field at once.
    #[must_use]
    pub fn parts(&self) -> &CertificateParts {
        &self.inner
    }

    fn parts_mut(&mut self) -> &mut CertificateParts {
        Arc::make_mut(&mut self.inner)
    }

    /// The certificate algorithm identifier, derived from the base key.
    #[must_use]
    pub fn algorithm_id(&self) -> &'static str {
        self.inner.key.algorithm().certificate_id()
    }

    /// CA-chosen random bytes.
    #[must_use]
    pub fn nonce(&self) -> &[u8] {
        &self.inner.nonce
    }

    /// User or host.
    #[must_use]
    pub fn cert_type(&self) -> CertificateType {
        self.inner.cert_type
    }

    /// CA-assigned serial number.
    #[must_use]
    pub fn serial(&self) -> u64 {
        self.inner.serial
    }

    /// The certified key.
    #[must_use]
    pub fn key(&self) -> &PublicKey {
        &self.inner.key
    }

    /// Free-form identifier chosen by the CA.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.inner.key_id
    }

    /// Principals the certificate is valid for; empty means any.
    #[must_use]
    pub fn valid_principals(&self) -> &[String] {
        &self.inner.valid_principals
    }

    /// First second of validity (inclusive, Unix time).
    #[must_use]
    pub fn valid_after(&self) -> u64 {
        self.inner.valid_after
    }

    /// End of validity (exclusive, Unix time).
    #[must_use]
    pub fn valid_before(&self) -> u64 {
        self.inner.valid_before
    }

    /// Restrictions a validator must understand.
    #[must_use]
    pub fn critical_options(&self) -> &CertificateOptions {
        &self.inner.critical_options
    }

    /// Optional features, in wire order.
    #[must_use]
    pub fn extensions(&self) -> &CertificateOptions {
        &self.inner.extensions
    }

    /// The reserved field, carried verbatim.
    #[must_use]
    pub fn reserved(&self) -> &[u8] {
        &self.inner.reserved
    }

    /// The CA key that signed this certificate.
    #[must_use]
    pub fn signature_key(&self) -> &PublicKey {
        &self.inner.signature_key
    }

    /// The CA signature over [`signed_data`](Self::signed_data).
    #[must_use]
    pub fn signature(&self) -> &SshSignature {
        &self.inner.signature
    }

    /// Mutable access to the nonce.
    pub fn nonce_mut(&mut self) -> &mut Vec<u8> {
        &mut self.parts_mut().nonce
    }

    /// Set the certificate type.
    pub fn set_cert_type(&mut self, cert_type: CertificateType) {
        self.parts_mut().cert_type = cert_type;
    }

    /// Set the serial number.
    pub fn set_serial(&mut self, serial: u64) {
        self.parts_mut().serial = serial;
    }

    /// Replace the certified key.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::Malformed` if `key` is a certificate; the
    /// certificate is left unchanged.
    pub fn set_key(&mut self, key: PublicKey) -> Result<(), SshKeyError> {
        reject_chaining(&key)?;
        self.parts_mut().key = key;
        Ok(())
    }

    /// Set the key id.
    pub fn set_key_id(&mut self, key_id: impl Into<String>) {
        self.parts_mut().key_id = key_id.into();
    }

    /// Mutable access to the principal list.
    pub fn valid_principals_mut(&mut self) -> &mut Vec<String> {
        &mut self.parts_mut().valid_principals
    }

    /// Set the start of the validity window.
    pub fn set_valid_after(&mut self, valid_after: u64) {
        self.parts_mut().valid_after = valid_after;
    }

    /// Set the end of the validity window.
    pub fn set_valid_before(&mut self, valid_before: u64) {
        self.parts_mut().valid_before = valid_before;
    }

    /// Mutable access to the critical options.
    pub fn critical_options_mut(&mut self) -> &mut CertificateOptions {
        &mut self.parts_mut().critical_options
    }

    /// Mutable access to the extensions.
    pub fn extensions_mut(&mut self) -> &mut CertificateOptions {
        &mut self.parts_mut().extensions
    }

    /// Mutable access to the reserved field.
    pub fn reserved_mut(&mut self) -> &mut Vec<u8> {
        &mut self.parts_mut().reserved
    }

    /// Replace the CA key without re-signing.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::Malformed` if `key` is a certificate; the
    /// certificate is left unchanged.
    pub fn set_signature_key(&mut self, key: PublicKey) -> Result<(), SshKeyError> {
        reject_chaining(&key)?;
        self.parts_mut().signature_key = key;
        Ok(())
    }

    /// Replace the signature without re-signing.
    pub fn set_signature(&mut self, signature: SshSignature) {
        self.parts_mut().signature = signature;
    }

    /// Sign the certificate with a CA key.
    ///
    /// The signature key becomes `signer`'s public key and the signature is
    /// recomputed over the resulting signed range.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::Malformed` if the signer presents a certified
    /// public key, or if a field grown through the `*_mut` accessors is
    /// longer than [`MAX_FIELD_LEN`](crate::wire::MAX_FIELD_LEN). The
    /// certificate is left unchanged on error.
    pub fn sign_with<S: SshSigner + ?Sized>(&mut self, signer: &S) -> Result<(), SshKeyError> {
        check_field_lengths(self.parts())?;
        self.set_signature_key(signer.ssh_public_key())?;
        let signature = signer.sign_ssh(&self.signed_data());
        self.set_signature(signature);
        tracing::trace!(
            key_id = %self.key_id(),
            serial = self.serial(),
            ca = %self.signature_key().fingerprint(),
            "certificate signed"
        );
        Ok(())
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.to_bytes() == other.to_bytes()
    }
}

impl Eq for Certificate {}

impl std::hash::Hash for Certificate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl std::fmt::Debug for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Certificate")
            .field("type", &self.cert_type())
            .field("serial", &self.serial())
            .field("key_id", &self.key_id())
            .field("valid_principals", &self.valid_principals())
            .field("key", self.key())
            .field("signature_key", self.signature_key())
            .finish_non_exhaustive()
    }
}

impl TryFrom<PublicKey> for Certificate {
    type Error = PublicKey;

    fn try_from(key: PublicKey) -> Result<Self, Self::Error> {
        key.into_certificate()
    }
}
