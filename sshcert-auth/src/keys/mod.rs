//! SSH public keys and signatures.
//!
//! - [`PublicKey`] - tagged union over Ed25519, ECDSA and certified keys
//! - [`Ed25519PublicKey`], [`EcdsaPublicKey`] - per-algorithm key material
//! - [`SshSignature`] - signature blobs in SSH wire form
//! - [`SshSigner`] - adapter from RustCrypto signing keys
//! - [`Fingerprint`] - `SHA256:` fingerprints as printed by `ssh-keygen -l`
//!
//! # Example
//!
//! ```
//! use sshcert_auth::keys::PublicKey;
//!
//! let key: PublicKey =
//!     "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIJfkNV4OS33ImTXvorZr72q4v5XhVEQKfvqsxOEJ/XaR me@host"
//!         .parse()
//!         .unwrap();
//!
//! // Export never carries the comment.
//! assert_eq!(
//!     key.to_openssh(),
//!     "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIJfkNV4OS33ImTXvorZr72q4v5XhVEQKfvqsxOEJ/XaR"
//! );
//! ```

mod algorithm;
mod ecdsa;
mod ed25519;
mod fingerprint;
mod public_key;
mod signature;
mod signer;

pub use algorithm::{EcdsaCurve, KeyAlgorithm, CERTIFICATE_SUFFIX};
pub use ecdsa::EcdsaPublicKey;
pub use ed25519::{Ed25519PublicKey, ED25519_KEY_LEN};
pub use fingerprint::Fingerprint;
pub use public_key::PublicKey;
pub use signature::{SshSignature, ED25519_SIGNATURE_LEN};
pub use signer::SshSigner;
