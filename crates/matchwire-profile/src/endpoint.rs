//! Maps logical ranks onto physical endpoints.

use crate::{capability::CapabilityProfile, layout::low_mask};

/// Number of physical endpoints to open toward each peer.
pub fn endpoints_per_peer(profile: &CapabilityProfile) -> u32 {
    if profile.features().scalable_endpoints {
        profile.endpoints().count.max(1)
    } else {
        1
    }
}

/// Endpoint index used for traffic with `rank`.
///
/// Always 0 without scalable endpoints; otherwise the low endpoint-index bits
/// of the rank, folded into `[0, endpoint_count)`.
pub fn endpoint_for(rank: u32, profile: &CapabilityProfile) -> u32 {
    let count = endpoints_per_peer(profile);
    if count == 1 {
        return 0;
    }
    let index = u64::from(rank) & low_mask(profile.endpoints().bits);
    (index % u64::from(count)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        capability::EndpointSettings,
        registry::{lookup, ProfileId},
    };

    #[test]
    fn test_regular_profiles_use_single_endpoint() {
        for id in [ProfileId::Default, ProfileId::Minimal, ProfileId::Bgq, ProfileId::Rxm] {
            let profile = lookup(id);
            assert_eq!(endpoints_per_peer(profile), 1);
            for rank in [0, 1, 255, 256, u32::MAX] {
                assert_eq!(endpoint_for(rank, profile), 0);
            }
        }
    }

    #[test]
    fn test_scalable_profiles_spread_ranks() {
        let profile = lookup(ProfileId::Psm2);
        assert_eq!(endpoints_per_peer(profile), 256);
        assert_eq!(endpoint_for(0, profile), 0);
        assert_eq!(endpoint_for(7, profile), 7);
        assert_eq!(endpoint_for(255, profile), 255);
        assert_eq!(endpoint_for(256, profile), 0);
        assert_eq!(endpoint_for(1000, profile), 1000 % 256);
    }

    #[test]
    fn test_non_power_of_two_count_stays_in_range() {
        let mut profile = *lookup(ProfileId::Sockets);
        profile.endpoints = EndpointSettings { count: 6, bits: 3 };
        for rank in 0..1000 {
            assert!(endpoint_for(rank, &profile) < 6);
        }
        assert_eq!(endpoint_for(13, &profile), 5);
        assert_eq!(endpoint_for(14, &profile), 0);
    }
}
