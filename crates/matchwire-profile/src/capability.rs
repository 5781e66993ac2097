//! The capability profile value shared by the codec and endpoint setup.

use std::fmt;

use byteorder::{BigEndian, WriteBytesExt};
use matchwire_core::{
    config::Config,
    constants::CONTRACT_TAG_BITS,
    error::{ErrorKind, LayoutErrorKind, Result},
    transport::MemoryRegionMode,
};

use crate::{
    layout::{low_mask, MatchLayout, ProtocolFlags},
    registry::ProfileId,
};

/// Optional behaviours a transport family supports.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub struct Features {
    /// Address vectors indexed as a table rather than mapped addresses.
    pub av_table: bool,
    /// Multiple transmit contexts behind one scalable endpoint.
    pub scalable_endpoints: bool,
    /// Shared receive contexts.
    pub shared_contexts: bool,
    /// Memory registration style.
    pub memory_region: MemoryRegionMode,
    /// Hardware tagged matching.
    pub tagged: bool,
    /// Active-message fallback path.
    pub active_messages: bool,
    /// RMA with delivery-complete semantics.
    pub rma: bool,
    /// Atomic operations.
    pub atomics: bool,
    /// Transfers to and from device memory.
    pub device_memory: bool,
    /// Background progress for data messages.
    pub data_auto_progress: bool,
    /// Background progress for control messages.
    pub control_auto_progress: bool,
    /// Sends of non-contiguous buffers without packing.
    pub pt2pt_nopack: bool,
}

/// Transport API revision a profile requires.
#[derive(Clone, Debug, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    /// Major revision
    pub major: u16,
    /// Minor revision
    pub minor: u16,
}

impl ApiVersion {
    /// Creates a version.
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// First API revision with atomic-specific ordering flags.
const ATOMIC_ORDER_API: ApiVersion = ApiVersion::new(1, 8);

/// Read/write ordering a profile requests for atomic operations.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub enum AtomicOrdering {
    /// Orders atomics against atomics only.
    AtomicOnly,
    /// Orders all reads and writes; serializes more traffic.
    Generic,
}

/// How many physical endpoints a rank may use and how wide their index is.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub struct EndpointSettings {
    /// Number of endpoints.
    pub count: u32,
    /// Bits needed to index them.
    pub bits: u8,
}

/// Where a profile came from.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub enum ProfileOrigin {
    /// A precompiled registry entry.
    Registry(ProfileId),
    /// Computed from a live transport at startup.
    Negotiated,
}

impl fmt::Display for ProfileOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileOrigin::Registry(id) => write!(f, "{}", id),
            ProfileOrigin::Negotiated => f.write_str("negotiated"),
        }
    }
}

/// Complete feature set and bit allocation for one transport.
///
/// Immutable once constructed; adjustments produce a new value.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityProfile {
    pub(crate) origin: ProfileOrigin,
    pub(crate) features: Features,
    pub(crate) endpoints: EndpointSettings,
    pub(crate) num_am_buffers: u32,
    pub(crate) fetch_atomic_iovecs: u32,
    pub(crate) context_structs: u8,
    pub(crate) api_version: ApiVersion,
    pub(crate) layout: MatchLayout,
}

impl CapabilityProfile {
    /// Where this profile came from.
    pub fn origin(&self) -> ProfileOrigin {
        self.origin
    }

    /// Feature flags.
    pub fn features(&self) -> &Features {
        &self.features
    }

    /// Endpoint count and index width.
    pub fn endpoints(&self) -> EndpointSettings {
        self.endpoints
    }

    /// Receive buffers posted for active messages.
    pub fn num_am_buffers(&self) -> u32 {
        self.num_am_buffers
    }

    /// Maximum iovecs accepted by fetch-atomic operations.
    pub fn fetch_atomic_iovecs(&self) -> u32 {
        self.fetch_atomic_iovecs
    }

    /// Protocol-context structures each in-flight operation needs.
    pub fn context_structs(&self) -> u8 {
        self.context_structs
    }

    /// Required transport API revision.
    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// Match-key bit layout.
    pub fn layout(&self) -> &MatchLayout {
        &self.layout
    }

    /// Largest tag callers may use with this profile.
    ///
    /// `2^tag_bits - 1`; the minimal profile stops at 1_048_575 and caps
    /// embedded ranks at [`max_source_rank`](Self::max_source_rank).
    pub fn max_tag(&self) -> u32 {
        low_mask(self.layout.tag_bits().min(32)) as u32
    }

    /// Largest source rank the key can embed, or `None` when the transport
    /// delivers the rank as immediate data.
    ///
    /// The all-ones pattern marks an absent source, so this is
    /// `2^source_bits - 2` (16_777_214 for the minimal profile).
    pub fn max_source_rank(&self) -> Option<u32> {
        if !self.layout.embeds_source() {
            return None;
        }
        let bits = self.layout.source_bits().min(32);
        Some((low_mask(bits) - 1) as u32)
    }

    /// Ordering requested for atomics, or `None` when atomics are off.
    pub fn atomic_ordering(&self) -> Option<AtomicOrdering> {
        if !self.features.atomics {
            None
        } else if self.api_version >= ATOMIC_ORDER_API {
            Some(AtomicOrdering::AtomicOnly)
        } else {
            Some(AtomicOrdering::Generic)
        }
    }

    /// Largest context id this profile can carry.
    pub fn max_context_id(&self) -> u32 {
        low_mask(self.layout.context_bits().min(32)) as u32
    }

    /// Whether the tag range is the full non-negative 31-bit contract.
    ///
    /// False means the profile offers a narrower, documented tag range.
    pub fn has_full_tag_contract(&self) -> bool {
        self.layout.tag_bits() >= CONTRACT_TAG_BITS
    }

    /// Checks the layout invariants and endpoint sizing.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        let EndpointSettings { count, bits } = self.endpoints;
        if count == 0 || u64::from(count - 1) > low_mask(bits) {
            return Err(ErrorKind::InvalidLayout(LayoutErrorKind::EndpointBits { count, bits }));
        }
        Ok(())
    }

    /// Applies operator overrides from `config`.
    pub fn with_overrides(mut self, config: &Config) -> Self {
        if config.force_active_messages {
            self.features.tagged = false;
            self.features.rma = false;
            self.features.atomics = false;
            self.features.active_messages = true;
        }
        if let Some(shared) = config.enable_shared_contexts {
            self.features.shared_contexts = shared;
        }
        self
    }

    /// CRC32 over the big-endian masks and flag bits of the layout.
    ///
    /// Two processes can only match messages when their fingerprints agree.
    pub fn layout_fingerprint(&self) -> u32 {
        let layout = &self.layout;
        let mut bytes = Vec::with_capacity(64);
        let words = [
            layout.protocol_mask(),
            layout.context_mask(),
            layout.source_mask(),
            layout.tag_mask(),
            layout.flag_bits(ProtocolFlags::SYNC_SEND),
            layout.flag_bits(ProtocolFlags::SYNC_SEND_ACK),
            layout.flag_bits(ProtocolFlags::DYNAMIC_PROCESS_SEND),
            layout.flag_bits(ProtocolFlags::HUGE_SEND),
        ];
        for word in words {
            // Writing into a Vec cannot fail.
            let _ = bytes.write_u64::<BigEndian>(word);
        }
        crc32fast::hash(&bytes)
    }

    /// Multi-line operator report of widths, masks and features.
    pub fn report(&self) -> String {
        self.to_string()
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

impl fmt::Display for CapabilityProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = &self.layout;
        let features = &self.features;
        writeln!(f, "profile: {} (api {})", self.origin, self.api_version)?;
        writeln!(
            f,
            "  bits: context {} / source {} / tag {} / reserved {} / protocol 4",
            layout.context_bits(),
            layout.source_bits(),
            layout.tag_bits(),
            layout.reserved_bits()
        )?;
        writeln!(f, "  protocol mask: {:#018x}", layout.protocol_mask())?;
        writeln!(f, "  context mask:  {:#018x}", layout.context_mask())?;
        writeln!(f, "  source mask:   {:#018x}", layout.source_mask())?;
        writeln!(f, "  tag mask:      {:#018x}", layout.tag_mask())?;
        writeln!(
            f,
            "  max tag: {}{}",
            self.max_tag(),
            if self.has_full_tag_contract() { "" } else { " (reduced tag contract)" }
        )?;
        if let Some(rank) = self.max_source_rank() {
            writeln!(f, "  max source rank: {}", rank)?;
        }
        writeln!(f, "  endpoints: {} ({} bits)", self.endpoints.count, self.endpoints.bits)?;
        writeln!(
            f,
            "  scalable endpoints {}, shared contexts {}, av table {}, memory regions {}",
            on_off(features.scalable_endpoints),
            on_off(features.shared_contexts),
            on_off(features.av_table),
            features.memory_region
        )?;
        writeln!(
            f,
            "  tagged {}, active messages {}, rma {}, atomics {}, device memory {}",
            on_off(features.tagged),
            on_off(features.active_messages),
            on_off(features.rma),
            match self.atomic_ordering() {
                None => "off",
                Some(AtomicOrdering::AtomicOnly) => "on (atomic ordering)",
                Some(AtomicOrdering::Generic) => "on (generic ordering)",
            },
            on_off(features.device_memory)
        )?;
        writeln!(
            f,
            "  auto progress data {} / control {}, pt2pt nopack {}",
            on_off(features.data_auto_progress),
            on_off(features.control_auto_progress),
            on_off(features.pt2pt_nopack)
        )?;
        write!(
            f,
            "  am buffers {}, context structs {}, fetch-atomic iovecs {}, fingerprint {:#010x}",
            self.num_am_buffers,
            self.context_structs,
            self.fetch_atomic_iovecs,
            self.layout_fingerprint()
        )
    }
}
