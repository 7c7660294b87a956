//! Signing capability for issuing certificates.
//!
//! Private keys never pass through this crate's parsers. Callers bring a
//! signing key from the RustCrypto ecosystem and this trait adapts it to SSH
//! wire forms.

use super::algorithm::EcdsaCurve;
use super::ecdsa::EcdsaPublicKey;
use super::ed25519::Ed25519PublicKey;
use super::public_key::PublicKey;
use super::signature::SshSignature;

/// A private key that can produce SSH signatures.
pub trait SshSigner {
    /// The public half, as it appears in a certificate's signature key field.
    fn ssh_public_key(&self) -> PublicKey;

    /// Sign `message`, returning the SSH signature blob.
    fn sign_ssh(&self, message: &[u8]) -> SshSignature;
}

impl SshSigner for ed25519_dalek::SigningKey {
    fn ssh_public_key(&self) -> PublicKey {
        PublicKey::Ed25519(Ed25519PublicKey::from(self.verifying_key()))
    }

    fn sign_ssh(&self, message: &[u8]) -> SshSignature {
        let signature = ed25519_dalek::Signer::sign(self, message);
        SshSignature::Ed25519(signature.to_bytes())
    }
}

/// Split a fixed-width `r || s` signature into SSH form.
fn ecdsa_signature(curve: EcdsaCurve, raw: &[u8]) -> SshSignature {
    let (r, s) = raw.split_at(raw.len() / 2);
    SshSignature::ecdsa_from_scalars(curve, r, s)
}

/// Wrap a SEC1 point produced by a signing key.
///
/// The point comes from a valid key, so construction cannot fail.
fn ecdsa_public_key(curve: EcdsaCurve, point: &[u8]) -> PublicKey {
    match EcdsaPublicKey::from_sec1_bytes(curve, point) {
        Ok(key) => PublicKey::Ecdsa(key),
        Err(e) => unreachable!("signing key produced an invalid point: {e}"),
    }
}

impl SshSigner for p256::ecdsa::SigningKey {
    fn ssh_public_key(&self) -> PublicKey {
        let point = self.verifying_key().to_encoded_point(false);
        ecdsa_public_key(EcdsaCurve::NistP256, point.as_bytes())
    }

    fn sign_ssh(&self, message: &[u8]) -> SshSignature {
        let signature: p256::ecdsa::Signature =
            p256::ecdsa::signature::Signer::sign(self, message);
        ecdsa_signature(EcdsaCurve::NistP256, &signature.to_bytes())
    }
}

impl SshSigner for p384::ecdsa::SigningKey {
    fn ssh_public_key(&self) -> PublicKey {
        let point = self.verifying_key().to_encoded_point(false);
        ecdsa_public_key(EcdsaCurve::NistP384, point.as_bytes())
    }

    fn sign_ssh(&self, message: &[u8]) -> SshSignature {
        let signature: p384::ecdsa::Signature =
            p384::ecdsa::signature::Signer::sign(self, message);
        ecdsa_signature(EcdsaCurve::NistP384, &signature.to_bytes())
    }
}

impl SshSigner for p521::ecdsa::SigningKey {
    fn ssh_public_key(&self) -> PublicKey {
        let verifying_key = p521::ecdsa::VerifyingKey::from(self);
        let point = verifying_key.to_encoded_point(false);
        ecdsa_public_key(EcdsaCurve::NistP521, point.as_bytes())
    }

    fn sign_ssh(&self, message: &[u8]) -> SshSignature {
        let signature: p521::ecdsa::Signature =
            p521::ecdsa::signature::Signer::sign(self, message);
        ecdsa_signature(EcdsaCurve::NistP521, &signature.to_bytes())
    }
}
