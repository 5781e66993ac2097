//! Runtime negotiation of a profile for providers unknown at build time.
//!
//! Runs once at transport startup, before any endpoint or message exists.
//! The returned profile is immutable; callers publish it and share it read-only.

use matchwire_core::{
    config::Config,
    constants::{
        CONTRACT_TAG_BITS, MATCH_KEY_BITS, MAX_ENDPOINTS_SCALABLE, MAX_NUM_AM_BUFFERS,
        PROTOCOL_FLAG_BITS,
    },
    error::{ConfigurationError, Result},
    transport::TransportQuery,
};
use tracing::{error, info};

use crate::{
    capability::{ApiVersion, CapabilityProfile, EndpointSettings, Features, ProfileOrigin},
    layout::MatchLayout,
};

/// Protocol-context structures a negotiated profile reserves per operation.
const NEGOTIATED_CONTEXT_STRUCTS: u8 = 2;

/// Bits needed to represent `count` distinct values, i.e. `ceil(log2(count))`.
pub fn bits_for(count: u64) -> u8 {
    if count <= 1 {
        0
    } else {
        (64 - (count - 1).leading_zeros()) as u8
    }
}

/// Queries `transport` and computes a validated profile.
///
/// Fails with a configuration error when the remaining tag width would fall
/// below `config.min_tag_bits`; the tag contract is never silently narrowed past it.
pub fn negotiate<Q>(transport: &Q, config: &Config) -> Result<CapabilityProfile>
where
    Q: TransportQuery + ?Sized,
{
    let usable_bits = transport.max_usable_match_bits().min(MATCH_KEY_BITS);
    let immediate_source = transport.supports_immediate_source();
    let attributes = transport.attributes();

    let budget = usable_bits.saturating_sub(PROTOCOL_FLAG_BITS);
    // The all-ones source pattern marks an absent source, so one extra value is needed.
    let source_bits = if immediate_source {
        0
    } else {
        bits_for(u64::from(config.max_world_size) + 1).max(1)
    };
    let context_bits = bits_for(u64::from(config.max_context_ids)).max(1);
    let fits = u16::from(context_bits) + u16::from(source_bits) <= u16::from(budget);
    // Bits past the 31-bit tag contract stay unclaimed.
    let tag_bits = budget
        .saturating_sub(context_bits)
        .saturating_sub(source_bits)
        .min(CONTRACT_TAG_BITS);

    if !fits || tag_bits < config.min_tag_bits {
        let err = ConfigurationError {
            usable_bits,
            context_bits,
            source_bits,
            tag_bits,
            min_tag_bits: config.min_tag_bits,
        };
        error!("Capability negotiation with '{}' failed: {}", transport.provider_name(), err);
        return Err(err.into());
    }

    let tx_contexts = attributes.max_tx_contexts.clamp(1, MAX_ENDPOINTS_SCALABLE);
    let endpoints = EndpointSettings { count: tx_contexts, bits: bits_for(u64::from(tx_contexts)) };

    let profile = CapabilityProfile {
        origin: ProfileOrigin::Negotiated,
        features: Features {
            av_table: true,
            scalable_endpoints: tx_contexts > 1,
            shared_contexts: attributes.shared_contexts,
            memory_region: attributes.memory_region,
            tagged: attributes.tagged,
            active_messages: true,
            rma: attributes.rma,
            atomics: attributes.rma && attributes.atomics,
            device_memory: attributes.device_memory,
            data_auto_progress: attributes.data_auto_progress,
            control_auto_progress: attributes.control_auto_progress,
            pt2pt_nopack: true,
        },
        endpoints,
        num_am_buffers: MAX_NUM_AM_BUFFERS,
        fetch_atomic_iovecs: 1,
        context_structs: NEGOTIATED_CONTEXT_STRUCTS,
        api_version: ApiVersion::new(attributes.api_version.0, attributes.api_version.1),
        layout: MatchLayout::contiguous(context_bits, source_bits, tag_bits),
    }
    .with_overrides(config);

    profile.validate()?;

    info!(
        "Negotiated capabilities with '{}': {} usable bits, context {} / source {} / tag {}, {} endpoint(s)",
        transport.provider_name(),
        usable_bits,
        context_bits,
        source_bits,
        tag_bits,
        endpoints.count
    );

    Ok(profile)
}
