#![warn(missing_docs)]

//! matchwire: a small public API facade for the workspace.
//!
//! This crate re-exports what a transport needs to dimension and pack its
//! matching metadata:
//!
//! - Startup (`ActiveProfile`, `Config`)
//! - Profiles (`CapabilityProfile`, `ProfileId`, `select`, `negotiate`)
//! - Match keys (`MatchCodec`, `MatchKey`, `MatchFields`, `ProtocolFlags`)
//!
//! Example
//! ```
//! use matchwire::{ActiveProfile, Config, ProtocolFlags, SimulatedTransport};
//!
//! let transport = SimulatedTransport::new("sockets");
//! let active = ActiveProfile::establish(&Config::default(), &transport).unwrap();
//!
//! let codec = active.codec();
//! let key = codec.encode(3, None, 42, ProtocolFlags::SYNC_SEND).unwrap();
//! let fields = codec.decode(key);
//! assert_eq!(fields.tag, 42);
//! assert!(fields.flags.contains(ProtocolFlags::SYNC_SEND));
//! ```

/// Profile resolution at transport startup.
pub mod startup;

pub use matchwire_codec::{decode, encode, MatchCodec, MatchFields, MatchKey, MatchPattern};
pub use matchwire_core::{
    config::{Config, ProfileSource},
    error::{ConfigurationError, ErrorKind, MatchField, OverflowError, Result},
    transport::{MemoryRegionMode, ProviderAttributes, SimulatedTransport, TransportQuery},
};
pub use matchwire_profile::{
    endpoint_for, endpoints_per_peer, lookup, negotiate, select, AtomicOrdering, CapabilityProfile,
    Features, MatchLayout, ProfileId, ProfileOrigin, ProtocolFlags, ALL_PROFILES, BUILD_PROFILE,
};
pub use startup::ActiveProfile;

/// Convenience prelude with the most commonly used items.
pub mod prelude {
    pub use crate::{
        ActiveProfile, CapabilityProfile, Config, ErrorKind, MatchCodec, MatchFields, MatchKey,
        ProfileId, ProtocolFlags, TransportQuery,
    };
}
