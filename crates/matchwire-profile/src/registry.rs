//! Precompiled capability profiles, one per known transport family.
//!
//! Adding a family is a matter of adding a row to [`PROFILES`] and a variant to [`ProfileId`].

use std::{fmt, str::FromStr};

use matchwire_core::{
    constants::{
        API_VERSION, MAX_ENDPOINTS_BITS_REGULAR, MAX_ENDPOINTS_BITS_SCALABLE, MAX_ENDPOINTS_REGULAR,
        MAX_ENDPOINTS_SCALABLE, MAX_NUM_AM_BUFFERS,
    },
    transport::MemoryRegionMode,
};

use crate::{
    capability::{ApiVersion, CapabilityProfile, EndpointSettings, Features, ProfileOrigin},
    layout::{FlagPositions, MatchLayout},
};

/// Identifies a registry profile.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProfileId {
    /// Balanced feature set; source rank delivered as immediate data.
    Default = 0,
    /// Narrow match budget; source rank embedded, reduced tag range.
    ///
    /// Tags stop at 1_048_575 and embedded source ranks at 16_777_214, since
    /// the all-ones source pattern means "no source".
    Minimal = 1,
    /// Intel Omni-Path PSM2.
    Psm2 = 2,
    /// Portable sockets provider.
    Sockets = 3,
    /// Blue Gene/Q.
    Bgq = 4,
    /// Reliable-datagram emulation over a message endpoint.
    Rxm = 5,
}

/// Every registry id in table order.
pub const ALL_PROFILES: [ProfileId; 6] = [
    ProfileId::Default,
    ProfileId::Minimal,
    ProfileId::Psm2,
    ProfileId::Sockets,
    ProfileId::Bgq,
    ProfileId::Rxm,
];

impl ProfileId {
    /// Stable profile name.
    pub fn name(&self) -> &'static str {
        match self {
            ProfileId::Default => "default",
            ProfileId::Minimal => "minimal",
            ProfileId::Psm2 => "psm2",
            ProfileId::Sockets => "sockets",
            ProfileId::Bgq => "bgq",
            ProfileId::Rxm => "rxm",
        }
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown profile name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProfile(pub String);

impl fmt::Display for UnknownProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown capability profile '{}'", self.0)
    }
}

impl std::error::Error for UnknownProfile {}

impl FromStr for ProfileId {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_PROFILES
            .iter()
            .copied()
            .find(|id| id.name() == s)
            .ok_or_else(|| UnknownProfile(s.to_owned()))
    }
}

const SCALABLE: EndpointSettings =
    EndpointSettings { count: MAX_ENDPOINTS_SCALABLE, bits: MAX_ENDPOINTS_BITS_SCALABLE };
const REGULAR: EndpointSettings =
    EndpointSettings { count: MAX_ENDPOINTS_REGULAR, bits: MAX_ENDPOINTS_BITS_REGULAR };

// Full-width families: tag 0..31, bit 31 unused, context 32..52, flags 52..56.
const FULL_WIDTH_LAYOUT: MatchLayout = MatchLayout::new(20, 0, 31, 1, FlagPositions::ACK_FIRST);
// Minimal: tag 0..20, source 20..44, context 44..60, flags 60..64.
const MINIMAL_LAYOUT: MatchLayout = MatchLayout::new(16, 24, 20, 0, FlagPositions::SYNC_FIRST);

const BASE_FEATURES: Features = Features {
    av_table: true,
    scalable_endpoints: false,
    shared_contexts: false,
    memory_region: MemoryRegionMode::BASIC,
    tagged: true,
    active_messages: true,
    rma: true,
    atomics: true,
    device_memory: false,
    data_auto_progress: false,
    control_auto_progress: false,
    pt2pt_nopack: true,
};

const SCALABLE_FEATURES: Features = Features {
    scalable_endpoints: true,
    shared_contexts: true,
    memory_region: MemoryRegionMode::SCALABLE,
    ..BASE_FEATURES
};

/// The registry, indexed by `ProfileId as usize`.
pub static PROFILES: [CapabilityProfile; 6] = [
    CapabilityProfile {
        origin: ProfileOrigin::Registry(ProfileId::Default),
        features: BASE_FEATURES,
        endpoints: REGULAR,
        num_am_buffers: MAX_NUM_AM_BUFFERS,
        fetch_atomic_iovecs: 1,
        context_structs: 1,
        api_version: ApiVersion::new(API_VERSION.0, API_VERSION.1),
        layout: FULL_WIDTH_LAYOUT,
    },
    CapabilityProfile {
        origin: ProfileOrigin::Registry(ProfileId::Minimal),
        features: Features { tagged: false, rma: false, atomics: false, ..BASE_FEATURES },
        endpoints: REGULAR,
        num_am_buffers: MAX_NUM_AM_BUFFERS,
        fetch_atomic_iovecs: 1,
        context_structs: 1,
        api_version: ApiVersion::new(API_VERSION.0, API_VERSION.1),
        layout: MINIMAL_LAYOUT,
    },
    CapabilityProfile {
        origin: ProfileOrigin::Registry(ProfileId::Psm2),
        features: SCALABLE_FEATURES,
        endpoints: SCALABLE,
        num_am_buffers: MAX_NUM_AM_BUFFERS,
        fetch_atomic_iovecs: 1,
        context_structs: 1,
        api_version: ApiVersion::new(1, 6),
        layout: FULL_WIDTH_LAYOUT,
    },
    CapabilityProfile {
        origin: ProfileOrigin::Registry(ProfileId::Sockets),
        features: SCALABLE_FEATURES,
        endpoints: SCALABLE,
        num_am_buffers: MAX_NUM_AM_BUFFERS,
        fetch_atomic_iovecs: 1,
        context_structs: 1,
        api_version: ApiVersion::new(1, 5),
        layout: FULL_WIDTH_LAYOUT,
    },
    CapabilityProfile {
        origin: ProfileOrigin::Registry(ProfileId::Bgq),
        features: Features { av_table: false, pt2pt_nopack: false, ..BASE_FEATURES },
        endpoints: REGULAR,
        num_am_buffers: MAX_NUM_AM_BUFFERS,
        fetch_atomic_iovecs: 1,
        context_structs: 2,
        api_version: ApiVersion::new(1, 5),
        layout: FULL_WIDTH_LAYOUT,
    },
    CapabilityProfile {
        origin: ProfileOrigin::Registry(ProfileId::Rxm),
        features: Features { av_table: false, atomics: false, ..BASE_FEATURES },
        endpoints: REGULAR,
        num_am_buffers: MAX_NUM_AM_BUFFERS,
        fetch_atomic_iovecs: 1,
        context_structs: 1,
        api_version: ApiVersion::new(1, 6),
        layout: FULL_WIDTH_LAYOUT,
    },
];

/// Returns the registry entry for `id`.
///
/// Every entry is validated by the registry tests. [`ProfileId::Minimal`] is a
/// narrower contract than the rest: see
/// [`CapabilityProfile::max_tag`] and [`CapabilityProfile::max_source_rank`].
pub fn lookup(id: ProfileId) -> &'static CapabilityProfile {
    &PROFILES[id as usize]
}

/// Iterates over every registry entry.
pub fn all() -> impl Iterator<Item = &'static CapabilityProfile> {
    PROFILES.iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_ids() {
        for id in ALL_PROFILES {
            assert_eq!(lookup(id).origin(), ProfileOrigin::Registry(id));
        }
    }

    #[test]
    fn test_every_profile_validates() {
        for profile in all() {
            assert!(profile.validate().is_ok(), "{} failed validation", profile.origin());
        }
    }

    #[test]
    fn test_default_profile_shape() {
        let profile = lookup(ProfileId::Default);
        let layout = profile.layout();

        assert!(!profile.features().scalable_endpoints);
        assert_eq!(profile.features().memory_region, MemoryRegionMode::BASIC);
        assert!(profile.features().tagged);
        assert!(profile.features().rma);
        assert_eq!((layout.context_bits(), layout.source_bits(), layout.tag_bits()), (20, 0, 31));
        assert!(!layout.embeds_source());
    }

    #[test]
    fn test_minimal_profile_shape() {
        let profile = lookup(ProfileId::Minimal);
        let layout = profile.layout();

        assert_eq!((layout.context_bits(), layout.source_bits(), layout.tag_bits()), (16, 24, 20));
        assert!(layout.embeds_source());
        assert!(!profile.features().tagged);
        assert!(profile.features().active_messages);
    }

    #[test]
    fn test_scalable_families() {
        for id in [ProfileId::Psm2, ProfileId::Sockets] {
            let profile = lookup(id);
            assert!(profile.features().scalable_endpoints);
            assert_eq!(profile.features().memory_region, MemoryRegionMode::SCALABLE);
            assert_eq!(profile.endpoints().count, 256);
            assert_eq!(profile.endpoints().bits, 8);
        }
    }

    #[test]
    fn test_memory_region_styles_per_family() {
        for id in [ProfileId::Default, ProfileId::Minimal, ProfileId::Bgq, ProfileId::Rxm] {
            let mode = lookup(id).features().memory_region;
            assert!(mode.contains(MemoryRegionMode::VIRT_ADDRESS | MemoryRegionMode::PROV_KEY));
            assert!(!mode.contains(MemoryRegionMode::SCALABLE));
            assert!(lookup(id).report().contains("memory regions virt-addr+prov-key"), "{}", id);
        }
        for id in [ProfileId::Psm2, ProfileId::Sockets] {
            assert_eq!(lookup(id).features().memory_region, MemoryRegionMode::SCALABLE);
            assert!(lookup(id).report().contains("memory regions scalable"), "{}", id);
        }
    }

    #[test]
    fn test_bgq_needs_two_context_structs() {
        assert_eq!(lookup(ProfileId::Bgq).context_structs(), 2);
        assert!(!lookup(ProfileId::Bgq).features().pt2pt_nopack);
    }

    #[test]
    fn test_parse_names() {
        for id in ALL_PROFILES {
            assert_eq!(id.name().parse::<ProfileId>(), Ok(id));
        }
        assert!("infiniband".parse::<ProfileId>().is_err());
    }
}
