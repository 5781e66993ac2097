use std::default::Default;

use crate::constants::{MAX_CONTEXT_IDS_DEFAULT, MAX_WORLD_SIZE_DEFAULT, MIN_TAG_BITS_DEFAULT};

/// Where the active capability profile comes from when no build-time profile is compiled in.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub enum ProfileSource {
    /// Pick a precompiled profile from the provider name.
    #[default]
    Named,
    /// Query the live transport and compute the bit allocation.
    Negotiate,
}

#[derive(Clone, Debug)]
/// Configuration options for capability profile resolution.
pub struct Config {
    /// How the profile is resolved at transport startup.
    pub profile_source: ProfileSource,
    /// Provider name to select on instead of the one the transport reports.
    pub provider_override: Option<String>,
    /// Largest number of ranks a session may hold.
    /// Bounds the source field when the transport cannot deliver the source out of band.
    pub max_world_size: u32,
    /// Largest number of simultaneously live communication contexts.
    pub max_context_ids: u32,
    /// Narrowest tag field negotiation will accept.
    pub min_tag_bits: u8,
    /// Disable hardware tagged matching and RMA, leaving only the active-message path.
    pub force_active_messages: bool,
    /// Operator override for shared receive contexts (None = keep the profile's value).
    pub enable_shared_contexts: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile_source: ProfileSource::Named,
            provider_override: None,
            max_world_size: MAX_WORLD_SIZE_DEFAULT,
            max_context_ids: MAX_CONTEXT_IDS_DEFAULT,
            min_tag_bits: MIN_TAG_BITS_DEFAULT,
            force_active_messages: false,
            enable_shared_contexts: None,
        }
    }
}
