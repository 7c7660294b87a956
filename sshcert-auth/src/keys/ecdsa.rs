//! `ecdsa-sha2-nistp*` public keys.

use base64::prelude::*;
use bytes::BufMut;

use crate::error::SshKeyError;
use crate::wire::{WireReader, WireWrite};

use super::algorithm::EcdsaCurve;
use super::signature::{fixed_width_scalar, SshSignature};

/// An ECDSA verification key on one of the NIST curves.
///
/// Blob fields after the algorithm identifier:
/// `string(curve identifier) || string(SEC1 point)`.
///
/// The point is validated on construction and kept in its original SEC1
/// encoding so the key re-encodes byte for byte.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EcdsaPublicKey {
    curve: EcdsaCurve,
    point: Box<[u8]>,
}

impl EcdsaPublicKey {
    /// Load a key from a SEC1-encoded point.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::Malformed` if the point is not on `curve`.
    pub fn from_sec1_bytes(curve: EcdsaCurve, point: &[u8]) -> Result<Self, SshKeyError> {
        let valid = match curve {
            EcdsaCurve::NistP256 => p256::ecdsa::VerifyingKey::from_sec1_bytes(point).is_ok(),
            EcdsaCurve::NistP384 => p384::ecdsa::VerifyingKey::from_sec1_bytes(point).is_ok(),
            EcdsaCurve::NistP521 => p521::ecdsa::VerifyingKey::from_sec1_bytes(point).is_ok(),
        };
        if !valid {
            return Err(SshKeyError::Malformed("invalid ECDSA point"));
        }
        Ok(Self {
            curve,
            point: point.into(),
        })
    }

    /// The curve this key lives on.
    #[must_use]
    pub fn curve(&self) -> EcdsaCurve {
        self.curve
    }

    /// The SEC1-encoded point.
    #[must_use]
    pub fn point(&self) -> &[u8] {
        &self.point
    }

    /// Read the blob fields for a key whose algorithm names `curve`.
    ///
    /// The embedded curve identifier must agree with the algorithm.
    pub(crate) fn read_fields(
        curve: EcdsaCurve,
        reader: &mut WireReader<'_>,
    ) -> Result<Self, SshKeyError> {
        let identifier = reader.read_string()?;
        if identifier != curve.identifier().as_bytes() {
            return Err(SshKeyError::Malformed("ECDSA curve does not match algorithm"));
        }
        let point = reader.read_string()?;
        Self::from_sec1_bytes(curve, point)
    }

    pub(crate) fn encode_fields<B: BufMut>(&self, buf: &mut B) {
        buf.put_ssh_str(self.curve.identifier());
        buf.put_ssh_string(&self.point);
    }

    /// Verify an SSH signature over `message`.
    ///
    /// The message is hashed with the curve's digest (SHA-256, SHA-384 or
    /// SHA-512). Signatures made on another curve or algorithm never verify.
    #[must_use]
    pub fn verify(&self, message: &[u8], signature: &SshSignature) -> bool {
        let SshSignature::Ecdsa { curve, r, s } = signature else {
            return false;
        };
        if *curve != self.curve {
            return false;
        }
        let width = self.curve.field_size();
        let (Some(r), Some(s)) = (fixed_width_scalar(r, width), fixed_width_scalar(s, width))
        else {
            return false;
        };
        let mut raw = r;
        raw.extend_from_slice(&s);

        match self.curve {
            EcdsaCurve::NistP256 => {
                let (Ok(key), Ok(signature)) = (
                    p256::ecdsa::VerifyingKey::from_sec1_bytes(&self.point),
                    p256::ecdsa::Signature::from_slice(&raw),
                ) else {
                    return false;
                };
                p256::ecdsa::signature::Verifier::verify(&key, message, &signature).is_ok()
            }
            EcdsaCurve::NistP384 => {
                let (Ok(key), Ok(signature)) = (
                    p384::ecdsa::VerifyingKey::from_sec1_bytes(&self.point),
                    p384::ecdsa::Signature::from_slice(&raw),
                ) else {
                    return false;
                };
                p384::ecdsa::signature::Verifier::verify(&key, message, &signature).is_ok()
            }
            EcdsaCurve::NistP521 => {
                let (Ok(key), Ok(signature)) = (
                    p521::ecdsa::VerifyingKey::from_sec1_bytes(&self.point),
                    p521::ecdsa::Signature::from_slice(&raw),
                ) else {
                    return false;
                };
                p521::ecdsa::signature::Verifier::verify(&key, message, &signature).is_ok()
            }
        }
    }
}

impl std::fmt::Debug for EcdsaPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdsaPublicKey")
            .field("curve", &self.curve)
            .field("point", &BASE64_STANDARD_NO_PAD.encode(&self.point))
            .finish()
    }
}
