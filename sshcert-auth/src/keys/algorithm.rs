//! Algorithm identifier registry.

/// Suffix appended to a key algorithm identifier to name its certificate form.
pub const CERTIFICATE_SUFFIX: &str = "-cert-v01@openssh.com";

/// NIST curves supported for `ecdsa-sha2-*` keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcdsaCurve {
    /// P-256, signatures hashed with SHA-256.
    NistP256,
    /// P-384, signatures hashed with SHA-384.
    NistP384,
    /// P-521, signatures hashed with SHA-512.
    NistP521,
}

impl EcdsaCurve {
    /// Curve identifier embedded in the key blob (e.g. `nistp256`).
    #[must_use]
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::NistP256 => "nistp256",
            Self::NistP384 => "nistp384",
            Self::NistP521 => "nistp521",
        }
    }

    /// Key algorithm identifier (e.g. `ecdsa-sha2-nistp256`).
    #[must_use]
    pub const fn algorithm_id(self) -> &'static str {
        match self {
            Self::NistP256 => "ecdsa-sha2-nistp256",
            Self::NistP384 => "ecdsa-sha2-nistp384",
            Self::NistP521 => "ecdsa-sha2-nistp521",
        }
    }

    /// Size in bytes of a field element, and so of each signature scalar.
    #[must_use]
    pub const fn field_size(self) -> usize {
        match self {
            Self::NistP256 => 32,
            Self::NistP384 => 48,
            Self::NistP521 => 66,
        }
    }

    /// Look up a curve by its key algorithm identifier.
    #[must_use]
    pub fn from_algorithm_id(id: &str) -> Option<Self> {
        match id {
            "ecdsa-sha2-nistp256" => Some(Self::NistP256),
            "ecdsa-sha2-nistp384" => Some(Self::NistP384),
            "ecdsa-sha2-nistp521" => Some(Self::NistP521),
            _ => None,
        }
    }
}

/// A supported plain (non-certificate) key algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// `ssh-ed25519`
    Ed25519,
    /// `ecdsa-sha2-nistp{256,384,521}`
    Ecdsa(EcdsaCurve),
}

impl KeyAlgorithm {
    /// Every supported algorithm.
    pub const ALL: [Self; 4] = [
        Self::Ed25519,
        Self::Ecdsa(EcdsaCurve::NistP256),
        Self::Ecdsa(EcdsaCurve::NistP384),
        Self::Ecdsa(EcdsaCurve::NistP521),
    ];

    /// Identifier of the plain key algorithm.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Ed25519 => "ssh-ed25519",
            Self::Ecdsa(curve) => curve.algorithm_id(),
        }
    }

    /// Identifier of the matching certificate algorithm.
    #[must_use]
    pub const fn certificate_id(self) -> &'static str {
        match self {
            Self::Ed25519 => "ssh-ed25519-cert-v01@openssh.com",
            Self::Ecdsa(EcdsaCurve::NistP256) => "ecdsa-sha2-nistp256-cert-v01@openssh.com",
            Self::Ecdsa(EcdsaCurve::NistP384) => "ecdsa-sha2-nistp384-cert-v01@openssh.com",
            Self::Ecdsa(EcdsaCurve::NistP521) => "ecdsa-sha2-nistp521-cert-v01@openssh.com",
        }
    }

    /// Look up a plain key algorithm by identifier.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|alg| alg.id() == id)
    }

    /// Look up the base algorithm of a certificate algorithm identifier.
    #[must_use]
    pub fn from_certificate_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|alg| alg.certificate_id() == id)
    }
}
