//! Profile-bound codec used on every send and receive completion.

use matchwire_core::error::Result;
use matchwire_profile::{CapabilityProfile, ProtocolFlags};

use crate::{
    decoder::MatchKeyDecoder,
    encoder::MatchKeyEncoder,
    key::{MatchFields, MatchKey, MatchPattern},
};

/// Encodes `context_id`, `source_rank`, `tag` and `flags` with the profile's layout.
pub fn encode(
    profile: &CapabilityProfile,
    context_id: u32,
    source_rank: Option<u32>,
    tag: u32,
    flags: ProtocolFlags,
) -> Result<MatchKey> {
    let fields = MatchFields { context_id, source_rank, tag, flags };
    MatchKeyEncoder::encode(profile.layout(), &fields)
}

/// Decodes a key produced by [`encode`] under the same profile.
pub fn decode(key: MatchKey, profile: &CapabilityProfile) -> MatchFields {
    MatchKeyDecoder::decode(profile.layout(), key)
}

/// Codec bound to one published profile.
///
/// Holding the profile by reference keeps every key on a transport under a
/// single layout.
#[derive(Clone, Copy, Debug)]
pub struct MatchCodec<'p> {
    profile: &'p CapabilityProfile,
}

impl<'p> MatchCodec<'p> {
    /// Binds a codec to `profile`.
    pub fn new(profile: &'p CapabilityProfile) -> Self {
        Self { profile }
    }

    /// The bound profile.
    pub fn profile(&self) -> &'p CapabilityProfile {
        self.profile
    }

    /// Encodes a send key.
    pub fn encode(
        &self,
        context_id: u32,
        source_rank: Option<u32>,
        tag: u32,
        flags: ProtocolFlags,
    ) -> Result<MatchKey> {
        encode(self.profile, context_id, source_rank, tag, flags)
    }

    /// Encodes pre-assembled fields.
    pub fn encode_fields(&self, fields: &MatchFields) -> Result<MatchKey> {
        MatchKeyEncoder::encode(self.profile.layout(), fields)
    }

    /// Decodes a completed receive's key.
    pub fn decode(&self, key: MatchKey) -> MatchFields {
        decode(key, self.profile)
    }

    /// Builds a receive pattern; `None` source or tag is a wildcard.
    pub fn receive_pattern(
        &self,
        context_id: u32,
        source_rank: Option<u32>,
        tag: Option<u32>,
    ) -> Result<MatchPattern> {
        MatchKeyEncoder::encode_receive(self.profile.layout(), context_id, source_rank, tag)
    }

    /// Ack key for a synchronous send, or `None` if `key` is not one.
    pub fn acknowledge(&self, key: MatchKey) -> Option<MatchKey> {
        MatchKeyDecoder::acknowledge(self.profile.layout(), key)
    }
}
