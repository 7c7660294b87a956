//! SSH signature blobs.

use bytes::BufMut;

use crate::error::SshKeyError;
use crate::wire::{mpint_body, WireReader, WireWrite};

use super::algorithm::{EcdsaCurve, KeyAlgorithm};

/// Length of a raw Ed25519 signature.
pub const ED25519_SIGNATURE_LEN: usize = 64;

/// A signature in SSH wire form: `string(algorithm) || string(blob)`.
///
/// ECDSA scalars keep their `mpint` bodies exactly as received so that
/// re-encoding a decoded signature reproduces the original bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum SshSignature {
    /// Raw 64-byte Ed25519 signature.
    Ed25519([u8; ED25519_SIGNATURE_LEN]),
    /// ECDSA signature as two `mpint` bodies.
    Ecdsa {
        /// Curve named by the signature algorithm.
        curve: EcdsaCurve,
        /// `mpint` body of `r`.
        r: Vec<u8>,
        /// `mpint` body of `s`.
        s: Vec<u8>,
    },
}

impl SshSignature {
    /// Build an ECDSA signature from unsigned big-endian scalars.
    #[must_use]
    pub fn ecdsa_from_scalars(curve: EcdsaCurve, r: &[u8], s: &[u8]) -> Self {
        Self::Ecdsa {
            curve,
            r: mpint_body(r),
            s: mpint_body(s),
        }
    }

    /// The algorithm this signature was made with.
    #[must_use]
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            Self::Ed25519(_) => KeyAlgorithm::Ed25519,
            Self::Ecdsa { curve, .. } => KeyAlgorithm::Ecdsa(*curve),
        }
    }

    /// Identifier written at the start of the signature blob.
    #[must_use]
    pub fn algorithm_id(&self) -> &'static str {
        self.algorithm().id()
    }

    /// Decode a complete signature blob.
    ///
    /// # Errors
    ///
    /// Returns `SshKeyError::Malformed` for unknown algorithms, wrong sizes,
    /// truncation, or trailing bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, SshKeyError> {
        let mut reader = WireReader::new(bytes);
        let signature =
            Self::read(&mut reader).map_err(|e| e.complete_input("truncated signature"))?;
        reader.expect_end("trailing signature data")?;
        Ok(signature)
    }

    pub(crate) fn read(reader: &mut WireReader<'_>) -> Result<Self, SshKeyError> {
        let id = reader.read_algorithm_id()?;
        let algorithm = KeyAlgorithm::from_id(id)
            .ok_or(SshKeyError::Malformed("unknown signature algorithm"))?;
        let mut blob = reader.read_nested()?;

        let signature = match algorithm {
            KeyAlgorithm::Ed25519 => {
                let raw: [u8; ED25519_SIGNATURE_LEN] = blob
                    .remaining()
                    .try_into()
                    .map_err(|_| SshKeyError::Malformed("invalid Ed25519 signature length"))?;
                Self::Ed25519(raw)
            }
            KeyAlgorithm::Ecdsa(curve) => {
                let r = blob
                    .read_string()
                    .map_err(|e| e.complete_input("truncated ECDSA signature"))?;
                let s = blob
                    .read_string()
                    .map_err(|e| e.complete_input("truncated ECDSA signature"))?;
                blob.expect_end("trailing ECDSA signature data")?;
                Self::Ecdsa {
                    curve,
                    r: r.to_vec(),
                    s: s.to_vec(),
                }
            }
        };
        Ok(signature)
    }

    /// Append the wire form of this signature to `buf`.
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_ssh_str(self.algorithm_id());
        match self {
            Self::Ed25519(raw) => buf.put_ssh_string(raw),
            Self::Ecdsa { r, s, .. } => buf.put_ssh_nested(|blob| {
                blob.put_ssh_string(r);
                blob.put_ssh_string(s);
            }),
        }
    }

    /// The wire form of this signature.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

impl std::fmt::Debug for SshSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only the leading bytes; enough to tell signatures apart in logs.
        let head: Vec<u8> = match self {
            Self::Ed25519(raw) => raw[..4].to_vec(),
            Self::Ecdsa { r, .. } => r.iter().take(4).copied().collect(),
        };
        write!(f, "SshSignature({}, ", self.algorithm_id())?;
        for byte in head {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...)")
    }
}

/// Convert an `mpint` body to a fixed-width unsigned big-endian scalar.
///
/// Returns `None` for negative values or values wider than `width`.
pub(crate) fn fixed_width_scalar(mpint: &[u8], width: usize) -> Option<Vec<u8>> {
    if mpint.first().is_some_and(|b| b & 0x80 != 0) {
        return None;
    }
    let start = mpint.iter().position(|&b| b != 0).unwrap_or(mpint.len());
    let magnitude = &mpint[start..];
    if magnitude.len() > width {
        return None;
    }
    let mut scalar = vec![0u8; width - magnitude.len()];
    scalar.extend_from_slice(magnitude);
    Some(scalar)
}
