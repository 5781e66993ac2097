//! Integration tests for match-key encoding and decoding.

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use matchwire_core::error::{ErrorKind, MatchField, OverflowError};
    use matchwire_profile::{lookup, ProfileId, ProtocolFlags};

    use super::super::{decode, encode, MatchCodec, MatchFields, MatchKey};

    #[test]
    fn test_default_profile_sync_send_scenario() {
        let profile = lookup(ProfileId::Default);
        let key = encode(profile, 3, None, 42, ProtocolFlags::SYNC_SEND).unwrap();
        let bits = key.bits();

        assert_eq!(bits & 0x7FFF_FFFF, 42);
        assert_eq!((bits >> 32) & 0xF_FFFF, 3);
        assert_ne!(bits & 0x0020_0000_0000_0000, 0);
        assert_eq!(bits & 0x0010_0000_0000_0000, 0);
        assert_eq!(bits & 0x0040_0000_0000_0000, 0);
        assert_eq!(bits & 0x0080_0000_0000_0000, 0);
        assert_eq!(bits, 0x0020_0003_0000_002A);

        let fields = decode(key, profile);
        assert_eq!(fields, MatchFields::new(3, None, 42).with_flags(ProtocolFlags::SYNC_SEND));
    }

    #[test]
    fn test_minimal_profile_scenario() {
        let profile = lookup(ProfileId::Minimal);
        let key = encode(profile, 5, Some(7), 100, ProtocolFlags::empty()).unwrap();

        assert_eq!(key.bits(), (5u64 << 44) | (7u64 << 20) | 100);
        assert_eq!(decode(key, profile), MatchFields::new(5, Some(7), 100));

        let err = encode(profile, 5, Some(7), 2_000_000, ProtocolFlags::empty()).unwrap_err();
        assert!(matches!(
            err,
            ErrorKind::Overflow(OverflowError { field: MatchField::Tag, value: 2_000_000, bits: 20 })
        ));
    }

    #[test]
    fn test_tag_and_context_limits() {
        let minimal = lookup(ProfileId::Minimal);
        assert!(encode(minimal, 0, None, 1_048_575, ProtocolFlags::empty()).is_ok());
        assert!(matches!(
            encode(minimal, 0, None, 1_048_576, ProtocolFlags::empty()),
            Err(ErrorKind::Overflow(OverflowError { field: MatchField::Tag, .. }))
        ));
        assert!(matches!(
            encode(minimal, 1 << 16, None, 0, ProtocolFlags::empty()),
            Err(ErrorKind::Overflow(OverflowError { field: MatchField::Context, bits: 16, .. }))
        ));

        let default = lookup(ProfileId::Default);
        assert!(encode(default, (1 << 20) - 1, None, 0x7FFF_FFFF, ProtocolFlags::all()).is_ok());
        assert!(encode(default, 1 << 20, None, 0, ProtocolFlags::empty()).is_err());
        assert!(encode(default, 0, None, 1 << 31, ProtocolFlags::empty()).is_err());
    }

    #[test]
    fn test_source_rejected_when_not_embedded() {
        let err = encode(lookup(ProfileId::Default), 1, Some(0), 1, ProtocolFlags::empty())
            .unwrap_err();
        assert!(matches!(
            err,
            ErrorKind::Overflow(OverflowError { field: MatchField::Source, value: 0, bits: 0 })
        ));
    }

    #[test]
    fn test_absent_source_round_trips_when_embedded() {
        let profile = lookup(ProfileId::Minimal);
        let key = encode(profile, 9, None, 11, ProtocolFlags::HUGE_SEND).unwrap();

        assert_eq!(key.bits() & profile.layout().source_mask(), profile.layout().source_mask());
        assert_eq!(
            decode(key, profile),
            MatchFields::new(9, None, 11).with_flags(ProtocolFlags::HUGE_SEND)
        );
    }

    #[test]
    fn test_highest_source_pattern_is_reserved() {
        let profile = lookup(ProfileId::Minimal);
        let max_rank = (1 << 24) - 2;
        let key = encode(profile, 0, Some(max_rank), 0, ProtocolFlags::empty()).unwrap();
        assert_eq!(decode(key, profile).source_rank, Some(max_rank));

        assert!(matches!(
            encode(profile, 0, Some(max_rank + 1), 0, ProtocolFlags::empty()),
            Err(ErrorKind::Overflow(OverflowError { field: MatchField::Source, .. }))
        ));
    }

    #[test]
    fn test_minimal_flag_positions() {
        let profile = lookup(ProfileId::Minimal);
        let sync = encode(profile, 0, None, 0, ProtocolFlags::SYNC_SEND).unwrap();
        let ack = encode(profile, 0, None, 0, ProtocolFlags::SYNC_SEND_ACK).unwrap();
        let source = profile.layout().source_mask();

        assert_eq!(sync.bits() & !source, 0x1000_0000_0000_0000);
        assert_eq!(ack.bits() & !source, 0x2000_0000_0000_0000);
    }

    #[test]
    fn test_every_flag_subset_round_trips() {
        for id in [ProfileId::Default, ProfileId::Minimal] {
            let profile = lookup(id);
            for raw in 0u8..16 {
                let flags = ProtocolFlags::from_bits_truncate(raw);
                let key = encode(profile, 1, None, 2, flags).unwrap();
                assert_eq!(decode(key, profile).flags, flags);
            }
        }
    }

    #[test]
    fn test_receive_patterns() {
        let profile = lookup(ProfileId::Minimal);
        let codec = MatchCodec::new(profile);
        let send = codec.encode(4, Some(12), 77, ProtocolFlags::empty()).unwrap();

        assert!(codec.receive_pattern(4, Some(12), Some(77)).unwrap().matches(send));
        assert!(codec.receive_pattern(4, None, Some(77)).unwrap().matches(send));
        assert!(codec.receive_pattern(4, Some(12), None).unwrap().matches(send));
        assert!(codec.receive_pattern(4, None, None).unwrap().matches(send));
        assert!(!codec.receive_pattern(4, Some(13), Some(77)).unwrap().matches(send));
        assert!(!codec.receive_pattern(4, Some(12), Some(78)).unwrap().matches(send));
        assert!(!codec.receive_pattern(5, None, None).unwrap().matches(send));
    }

    #[test]
    fn test_receive_pattern_accepts_sync_and_huge_sends_only() {
        let profile = lookup(ProfileId::Default);
        let codec = MatchCodec::new(profile);
        let pattern = codec.receive_pattern(3, Some(99), Some(42)).unwrap();

        for flags in [ProtocolFlags::SYNC_SEND, ProtocolFlags::HUGE_SEND, ProtocolFlags::empty()] {
            assert!(pattern.matches(codec.encode(3, None, 42, flags).unwrap()));
        }
        for flags in [ProtocolFlags::SYNC_SEND_ACK, ProtocolFlags::DYNAMIC_PROCESS_SEND] {
            assert!(!pattern.matches(codec.encode(3, None, 42, flags).unwrap()));
        }
    }

    #[test]
    fn test_receive_pattern_rejects_overflow() {
        let codec = MatchCodec::new(lookup(ProfileId::Minimal));
        assert!(codec.receive_pattern(1 << 16, None, None).is_err());
        assert!(codec.receive_pattern(0, None, Some(1 << 20)).is_err());
        assert!(codec.receive_pattern(0, Some(1 << 24), None).is_err());
    }

    #[test]
    fn test_sync_send_acknowledgment() {
        for id in [ProfileId::Default, ProfileId::Minimal] {
            let codec = MatchCodec::new(lookup(id));
            let send = codec.encode(6, None, 8, ProtocolFlags::SYNC_SEND).unwrap();
            let ack = codec.acknowledge(send).unwrap();

            assert_eq!(
                codec.decode(ack),
                MatchFields::new(6, None, 8).with_flags(ProtocolFlags::SYNC_SEND_ACK)
            );

            let plain = codec.encode(6, None, 8, ProtocolFlags::empty()).unwrap();
            assert_eq!(codec.acknowledge(plain), None);
        }
    }

    #[test]
    fn test_key_survives_the_wire() {
        let codec = MatchCodec::new(lookup(ProfileId::Minimal));
        let key = codec.encode(300, Some(4096), 65_535, ProtocolFlags::DYNAMIC_PROCESS_SEND).unwrap();

        let mut buffer = Vec::new();
        key.write_to(&mut buffer).unwrap();
        let mut cursor = Cursor::new(buffer.as_slice());
        let received = MatchKey::read_from(&mut cursor).unwrap();

        assert_eq!(received, key);
        assert_eq!(codec.decode(received).source_rank, Some(4096));
    }
}
