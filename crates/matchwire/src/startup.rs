//! Resolves and publishes the active profile at transport startup.

use std::sync::Arc;

use matchwire_codec::MatchCodec;
use matchwire_core::{
    config::{Config, ProfileSource},
    error::Result,
    transport::TransportQuery,
};
use matchwire_profile::{
    endpoint_for, endpoints_per_peer, lookup, negotiate, select, CapabilityProfile, ProfileOrigin,
    BUILD_PROFILE,
};
use tracing::info;

/// The profile a transport instance uses for its whole lifetime.
///
/// Resolved once, before any endpoint or message exists, then shared
/// read-only; cloning shares the same profile.
#[derive(Clone, Debug)]
pub struct ActiveProfile {
    profile: Arc<CapabilityProfile>,
}

impl ActiveProfile {
    /// Resolves the profile for `transport`.
    ///
    /// A build-time profile wins; otherwise `config.profile_source` picks
    /// between negotiation and name-based selection. Errors abort startup.
    pub fn establish<Q>(config: &Config, transport: &Q) -> Result<Self>
    where
        Q: TransportQuery + ?Sized,
    {
        let profile = match (BUILD_PROFILE, config.profile_source) {
            (Some(id), _) => lookup(id).with_overrides(config),
            (None, ProfileSource::Negotiate) => negotiate(transport, config)?,
            (None, ProfileSource::Named) => {
                let name =
                    config.provider_override.as_deref().unwrap_or_else(|| transport.provider_name());
                lookup(select(Some(name))).with_overrides(config)
            }
        };
        profile.validate()?;

        info!(
            "Active capability profile '{}' for provider '{}' (fingerprint {:#010x})",
            profile.origin(),
            transport.provider_name(),
            profile.layout_fingerprint()
        );

        Ok(Self::from_profile(profile))
    }

    /// Publishes an already-built profile.
    pub fn from_profile(profile: CapabilityProfile) -> Self {
        Self { profile: Arc::new(profile) }
    }

    /// The published profile.
    pub fn profile(&self) -> &CapabilityProfile {
        &self.profile
    }

    /// Where the profile came from.
    pub fn origin(&self) -> ProfileOrigin {
        self.profile.origin()
    }

    /// Codec bound to this profile.
    pub fn codec(&self) -> MatchCodec<'_> {
        MatchCodec::new(&self.profile)
    }

    /// Endpoint index for traffic with `rank`.
    pub fn endpoint_for(&self, rank: u32) -> u32 {
        endpoint_for(rank, &self.profile)
    }

    /// Physical endpoints to open toward each peer.
    pub fn endpoints_per_peer(&self) -> u32 {
        endpoints_per_peer(&self.profile)
    }

    /// Whether a peer's layout fingerprint matches ours.
    pub fn is_compatible_with(&self, peer_fingerprint: u32) -> bool {
        self.profile.layout_fingerprint() == peer_fingerprint
    }
}
