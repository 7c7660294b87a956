//! SSH binary field codec.
//!
//! The OpenSSH key and certificate formats are built from three primitives
//! (RFC 4251 §5):
//!
//! - `uint32` / `uint64` - big-endian fixed width integers
//! - `string` - a `uint32` length followed by that many bytes
//! - `mpint` - a `string` holding a two's complement big-endian integer
//!
//! [`WireReader`] decodes them from a borrowed slice. A short buffer yields
//! [`SshKeyError::NeedMoreData`](crate::SshKeyError::NeedMoreData) and leaves
//! the cursor untouched, so streaming callers can retry with more bytes.
//! [`WireWrite`] encodes them into any [`bytes::BufMut`].

mod reader;
mod writer;

pub use reader::{WireReader, MAX_FIELD_LEN};
pub use writer::{mpint_body, WireWrite};
