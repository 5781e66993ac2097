//! Match-key encoding.
//!
//! Packs fields into the disjoint bit ranges of a [`MatchLayout`], refusing any
//! value wider than its field instead of truncating it.

use matchwire_core::error::{MatchField, OverflowError, Result};
use matchwire_profile::{layout::low_mask, MatchLayout, ProtocolFlags};

use crate::key::{MatchFields, MatchKey, MatchPattern};

/// Serializes match fields into keys and receive patterns.
pub(crate) struct MatchKeyEncoder;

fn check(field: MatchField, value: u32, bits: u8) -> Result<u64> {
    let value = u64::from(value);
    if value > low_mask(bits) {
        return Err(OverflowError { field, value, bits }.into());
    }
    Ok(value)
}

fn check_source(layout: &MatchLayout, rank: u32) -> Result<u64> {
    let bits = layout.source_bits();
    // All-ones is reserved for an absent source.
    if bits == 0 || u64::from(rank) >= low_mask(bits) {
        return Err(OverflowError { field: MatchField::Source, value: u64::from(rank), bits }.into());
    }
    Ok(u64::from(rank))
}

fn place(value: u64, shift: u8) -> u64 {
    value.checked_shl(u32::from(shift)).unwrap_or(0)
}

impl MatchKeyEncoder {
    /// Encodes `fields` under `layout`.
    ///
    /// Fails with an overflow error when the context id or tag does not fit,
    /// or a source rank is given that the layout cannot embed.
    pub(crate) fn encode(layout: &MatchLayout, fields: &MatchFields) -> Result<MatchKey> {
        let context = check(MatchField::Context, fields.context_id, layout.context_bits())?;
        let tag = check(MatchField::Tag, fields.tag, layout.tag_bits())?;
        let source = match fields.source_rank {
            Some(rank) => check_source(layout, rank)?,
            None => low_mask(layout.source_bits()),
        };

        let mut bits = layout.flag_bits(fields.flags);
        bits |= place(context, layout.context_shift());
        if layout.embeds_source() {
            bits |= place(source, layout.source_shift());
        }
        bits |= tag;

        Ok(MatchKey::from_bits(bits))
    }

    /// Builds the pattern a receive posts.
    ///
    /// An absent source or tag is a wildcard. A specific source is only compared
    /// when the layout embeds it; otherwise the transport filters by address.
    /// Sync-send and huge-send bits are ignored so those sends match plain receives.
    pub(crate) fn encode_receive(
        layout: &MatchLayout,
        context_id: u32,
        source_rank: Option<u32>,
        tag: Option<u32>,
    ) -> Result<MatchPattern> {
        let context = check(MatchField::Context, context_id, layout.context_bits())?;
        let mut bits = place(context, layout.context_shift());
        let mut ignore = layout.flag_bits(ProtocolFlags::SYNC_SEND | ProtocolFlags::HUGE_SEND);

        match source_rank {
            Some(rank) if layout.embeds_source() => {
                bits |= place(check_source(layout, rank)?, layout.source_shift());
            }
            Some(_) => {}
            None => ignore |= layout.source_mask(),
        }

        match tag {
            Some(tag) => bits |= check(MatchField::Tag, tag, layout.tag_bits())?,
            None => ignore |= layout.tag_mask(),
        }

        Ok(MatchPattern { bits, ignore })
    }
}
