#![warn(missing_docs)]

//! matchwire-profile: capability profiles and how one gets chosen.
//!
//! A [`CapabilityProfile`] fixes the feature set and match-key bit allocation
//! for the lifetime of a transport. It comes either from the precompiled
//! [`registry`] through the [`selector`], or from the [`negotiator`] when the
//! provider is only known at startup.

/// The profile value: features, endpoint sizing, layout.
pub mod capability;
/// Rank to endpoint mapping.
pub mod endpoint;
/// Match-key bit layout and protocol flags.
pub mod layout;
/// Runtime negotiation against a live transport.
pub mod negotiator;
/// Precompiled profiles.
pub mod registry;
/// Provider name to profile selection.
pub mod selector;

pub use capability::{
    ApiVersion, AtomicOrdering, CapabilityProfile, EndpointSettings, Features, ProfileOrigin,
};
pub use endpoint::{endpoint_for, endpoints_per_peer};
pub use layout::{FlagPositions, MatchLayout, ProtocolFlags};
pub use negotiator::negotiate;
pub use registry::{lookup, ProfileId, ALL_PROFILES};
pub use selector::{select, BUILD_PROFILE};
