//! Match-key decoding.

use matchwire_profile::{layout::low_mask, MatchLayout, ProtocolFlags};

use crate::key::{MatchFields, MatchKey};

/// Unpacks match keys back into fields.
pub(crate) struct MatchKeyDecoder;

fn extract(bits: u64, mask: u64, shift: u8) -> u64 {
    (bits & mask).checked_shr(u32::from(shift)).unwrap_or(0)
}

impl MatchKeyDecoder {
    /// Decodes `key` under `layout`.
    ///
    /// Exact for every key the encoder produced under the
    /// same layout. Keys from a different layout decode to garbage; compare
    /// layout fingerprints before exchanging keys.
    pub(crate) fn decode(layout: &MatchLayout, key: MatchKey) -> MatchFields {
        let bits = key.bits();

        let source_rank = if layout.embeds_source() {
            let raw = extract(bits, layout.source_mask(), layout.source_shift());
            (raw != low_mask(layout.source_bits())).then_some(raw as u32)
        } else {
            None
        };

        MatchFields {
            context_id: extract(bits, layout.context_mask(), layout.context_shift()) as u32,
            source_rank,
            tag: (bits & layout.tag_mask()) as u32,
            flags: layout.flags_from_bits(bits),
        }
    }

    /// Derives the acknowledgment key for a synchronous send.
    ///
    /// Returns `None` unless `key` carries [`ProtocolFlags::SYNC_SEND`]. The ack
    /// keeps context, source and tag, clears sync-send and sets sync-send-ack, so
    /// the sender can match it against the send it is holding open.
    pub(crate) fn acknowledge(layout: &MatchLayout, key: MatchKey) -> Option<MatchKey> {
        let sync = layout.flag_bits(ProtocolFlags::SYNC_SEND);
        if key.bits() & sync == 0 {
            return None;
        }
        let ack = layout.flag_bits(ProtocolFlags::SYNC_SEND_ACK);
        Some(MatchKey::from_bits((key.bits() & !sync) | ack))
    }
}
