#![warn(missing_docs)]

//! matchwire-codec: match-key packing and unpacking.
//!
//! # Module Organization
//!
//! - [`key`] - The key type, unpacked fields and receive patterns
//! - `encoder` - Field packing with overflow checks
//! - `decoder` - Field unpacking and sync-send acknowledgment keys
//! - [`codec`] - Profile-bound entry points used by the send/receive path
//!
//! Keys are only built through a [`CapabilityProfile`](matchwire_profile::CapabilityProfile),
//! whose layout has already been validated. The raw layout-level encoder is not
//! part of the public surface:
//!
//! ```compile_fail
//! use matchwire_codec::encoder::MatchKeyEncoder;
//! ```

pub mod codec;
mod decoder;
mod encoder;
pub mod key;

#[cfg(test)]
mod tests;

pub use codec::{decode, encode, MatchCodec};
pub use key::{MatchFields, MatchKey, MatchPattern};
pub use matchwire_profile::ProtocolFlags;
