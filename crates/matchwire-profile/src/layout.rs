//! Bit layout of a match key.
//!
//! From the most significant claimed bit down, a key holds the protocol flags,
//! the context id, an optional reserved gap, the embedded source rank and the tag:
//!
//! ```text
//!  63 ........................................................ 0
//!  | unclaimed | protocol(4) | context | reserved | source | tag |
//! ```
//!
//! Only widths and flag positions are stored; shifts and masks are derived.

use bitflags::bitflags;
use matchwire_core::{
    constants::{MATCH_KEY_BITS, PROTOCOL_FLAG_BITS},
    error::{ErrorKind, LayoutErrorKind, Result},
};

bitflags! {
    /// Protocol-control flags carried in every match key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ProtocolFlags: u8 {
        /// Synchronous (rendezvous) send; completes only after a matching ack.
        const SYNC_SEND = 1 << 0;
        /// Acknowledgment of a synchronous send.
        const SYNC_SEND_ACK = 1 << 1;
        /// Message exchanged while connecting dynamically spawned processes.
        const DYNAMIC_PROCESS_SEND = 1 << 2;
        /// Message length exceeds the transport length field; an out-of-band
        /// length exchange follows.
        const HUGE_SEND = 1 << 3;
    }
}

/// Mask of the low `bits` bits.
pub const fn low_mask(bits: u8) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

const fn shifted(mask: u64, shift: u8) -> u64 {
    if shift >= 64 {
        0
    } else {
        mask << shift
    }
}

/// Position of each protocol flag inside the 4-bit protocol group (0 = lowest).
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub struct FlagPositions {
    /// Slot of [`ProtocolFlags::SYNC_SEND`].
    pub sync_send: u8,
    /// Slot of [`ProtocolFlags::SYNC_SEND_ACK`].
    pub sync_send_ack: u8,
    /// Slot of [`ProtocolFlags::DYNAMIC_PROCESS_SEND`].
    pub dynamic_process_send: u8,
    /// Slot of [`ProtocolFlags::HUGE_SEND`].
    pub huge_send: u8,
}

impl FlagPositions {
    /// Ack below sync-send, as laid out by the full-width provider families.
    pub const ACK_FIRST: FlagPositions =
        FlagPositions { sync_send_ack: 0, sync_send: 1, dynamic_process_send: 2, huge_send: 3 };

    /// Sync-send below ack, as laid out by the minimal profile.
    pub const SYNC_FIRST: FlagPositions =
        FlagPositions { sync_send: 0, sync_send_ack: 1, dynamic_process_send: 2, huge_send: 3 };

    fn slot(&self, flag: ProtocolFlags) -> Option<u8> {
        if flag == ProtocolFlags::SYNC_SEND {
            Some(self.sync_send)
        } else if flag == ProtocolFlags::SYNC_SEND_ACK {
            Some(self.sync_send_ack)
        } else if flag == ProtocolFlags::DYNAMIC_PROCESS_SEND {
            Some(self.dynamic_process_send)
        } else if flag == ProtocolFlags::HUGE_SEND {
            Some(self.huge_send)
        } else {
            None
        }
    }

    fn is_permutation(&self) -> bool {
        let slots = [self.sync_send, self.sync_send_ack, self.dynamic_process_send, self.huge_send];
        let mut seen = 0u8;
        for slot in slots {
            if slot >= PROTOCOL_FLAG_BITS {
                return false;
            }
            seen |= 1 << slot;
        }
        seen == 0b1111
    }
}

/// Widths of the match-key fields plus the protocol flag positions.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub struct MatchLayout {
    context_bits: u8,
    source_bits: u8,
    tag_bits: u8,
    reserved_bits: u8,
    flags: FlagPositions,
}

impl MatchLayout {
    /// Creates a layout. Call [`MatchLayout::validate`] before publishing it.
    pub const fn new(
        context_bits: u8,
        source_bits: u8,
        tag_bits: u8,
        reserved_bits: u8,
        flags: FlagPositions,
    ) -> Self {
        Self { context_bits, source_bits, tag_bits, reserved_bits, flags }
    }

    /// Creates a gap-free layout with the ack-first flag order.
    pub const fn contiguous(context_bits: u8, source_bits: u8, tag_bits: u8) -> Self {
        Self::new(context_bits, source_bits, tag_bits, 0, FlagPositions::ACK_FIRST)
    }

    /// Width of the context id field.
    pub fn context_bits(&self) -> u8 {
        self.context_bits
    }

    /// Width of the embedded source field (0 = source delivered as immediate data).
    pub fn source_bits(&self) -> u8 {
        self.source_bits
    }

    /// Width of the tag field.
    pub fn tag_bits(&self) -> u8 {
        self.tag_bits
    }

    /// Unclaimed bits between the source/tag group and the context field.
    pub fn reserved_bits(&self) -> u8 {
        self.reserved_bits
    }

    /// Protocol flag positions.
    pub fn flag_positions(&self) -> FlagPositions {
        self.flags
    }

    /// Whether the source rank travels inside the key.
    pub fn embeds_source(&self) -> bool {
        self.source_bits > 0
    }

    /// Bits claimed by fields, protocol flags and the reserved gap.
    pub fn claimed_bits(&self) -> u16 {
        self.field_bits() + u16::from(self.reserved_bits)
    }

    fn field_bits(&self) -> u16 {
        u16::from(self.context_bits)
            + u16::from(self.source_bits)
            + u16::from(self.tag_bits)
            + u16::from(PROTOCOL_FLAG_BITS)
    }

    /// Shift of the source field.
    pub fn source_shift(&self) -> u8 {
        self.tag_bits
    }

    /// Shift of the context field.
    pub fn context_shift(&self) -> u8 {
        self.tag_bits.saturating_add(self.source_bits).saturating_add(self.reserved_bits)
    }

    /// Shift of the lowest protocol flag slot.
    pub fn protocol_shift(&self) -> u8 {
        self.context_shift().saturating_add(self.context_bits)
    }

    /// Mask of the tag field.
    pub fn tag_mask(&self) -> u64 {
        low_mask(self.tag_bits)
    }

    /// Mask of the source field (zero when the source is not embedded).
    pub fn source_mask(&self) -> u64 {
        shifted(low_mask(self.source_bits), self.source_shift())
    }

    /// Mask of the context field.
    pub fn context_mask(&self) -> u64 {
        shifted(low_mask(self.context_bits), self.context_shift())
    }

    /// Mask of all four protocol flag bits.
    pub fn protocol_mask(&self) -> u64 {
        shifted(low_mask(PROTOCOL_FLAG_BITS), self.protocol_shift())
    }

    /// Key bits for a set of protocol flags.
    pub fn flag_bits(&self, flags: ProtocolFlags) -> u64 {
        flags
            .iter()
            .filter_map(|flag| self.flags.slot(flag))
            .fold(0, |bits, slot| bits | shifted(1, self.protocol_shift().saturating_add(slot)))
    }

    /// Protocol flags set in `bits`.
    pub fn flags_from_bits(&self, bits: u64) -> ProtocolFlags {
        ProtocolFlags::all()
            .iter()
            .filter(|flag| bits & self.flag_bits(*flag) != 0)
            .fold(ProtocolFlags::empty(), |acc, flag| acc | flag)
    }

    /// Checks that the layout fits the key, its masks are disjoint and cover
    /// exactly the claimed field bits, and the flag slots are distinct.
    pub fn validate(&self) -> Result<()> {
        let claimed = self.claimed_bits();
        if claimed > u16::from(MATCH_KEY_BITS) {
            return Err(ErrorKind::InvalidLayout(LayoutErrorKind::TooWide {
                claimed: claimed.min(u16::from(u8::MAX)) as u8,
            }));
        }

        if !self.flags.is_permutation() {
            return Err(ErrorKind::InvalidLayout(LayoutErrorKind::DuplicateFlagPosition));
        }

        let masks = [self.protocol_mask(), self.context_mask(), self.source_mask(), self.tag_mask()];
        for (i, a) in masks.iter().enumerate() {
            for b in &masks[i + 1..] {
                if a & b != 0 {
                    return Err(ErrorKind::InvalidLayout(LayoutErrorKind::OverlappingMasks));
                }
            }
        }

        let union = masks.iter().fold(0u64, |acc, mask| acc | mask);
        if union.count_ones() != u32::from(self.field_bits()) {
            return Err(ErrorKind::InvalidLayout(LayoutErrorKind::CoverageMismatch));
        }

        Ok(())
    }
}
