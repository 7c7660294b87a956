//! Error types for key parsing and certificate validation.

/// Errors produced while decoding keys or validating certificates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SshKeyError {
    /// The buffer ended before a declared field did.
    ///
    /// This is a retry signal for streaming callers, not a failure: nothing
    /// was consumed, and the same call succeeds once more bytes arrive.
    #[error("need more data")]
    NeedMoreData,

    /// The input is structurally invalid.
    #[error("malformed key data: {0}")]
    Malformed(&'static str),

    /// The certificate failed validation.
    ///
    /// Every validation failure maps to this one variant so callers cannot
    /// learn which check a forged certificate tripped.
    #[error("invalid certificate")]
    InvalidCertificate,
}

impl SshKeyError {
    /// Returns `true` for the streaming retry signal.
    #[must_use]
    pub fn is_need_more_data(&self) -> bool {
        matches!(self, Self::NeedMoreData)
    }

    /// Collapse `NeedMoreData` into `Malformed`.
    ///
    /// Used where the input is known to be complete (OpenSSH text, nested
    /// length-prefixed blobs), so running out of bytes means truncation.
    pub(crate) fn complete_input(self, reason: &'static str) -> Self {
        match self {
            Self::NeedMoreData => Self::Malformed(reason),
            other => other,
        }
    }
}
