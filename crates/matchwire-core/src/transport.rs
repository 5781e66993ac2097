//! Transport query abstraction for runtime negotiation.

use std::fmt;

use bitflags::bitflags;

use crate::constants::{API_VERSION, MATCH_KEY_BITS};

bitflags! {
    /// Memory registration modes a provider expects.
    ///
    /// Virtual addressing and provider keys are independent; an empty set
    /// leaves the choice to the provider when the domain opens.
    #[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
    pub struct MemoryRegionMode: u8 {
        /// Regions are addressed by virtual address rather than offset.
        const VIRT_ADDRESS = 1 << 0;
        /// The provider chooses region keys.
        const PROV_KEY = 1 << 1;
        /// Offset addressing with caller-chosen keys.
        const SCALABLE = 1 << 2;
    }
}

impl MemoryRegionMode {
    /// Virtual addresses with provider keys, the non-scalable style.
    pub const BASIC: Self = Self::VIRT_ADDRESS.union(Self::PROV_KEY);

    /// No mode requested.
    pub const UNSPECIFIED: Self = Self::empty();
}

impl fmt::Display for MemoryRegionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("unspecified");
        }
        let names = [
            (Self::VIRT_ADDRESS, "virt-addr"),
            (Self::PROV_KEY, "prov-key"),
            (Self::SCALABLE, "scalable"),
        ];
        let mut first = true;
        for (mode, name) in names {
            if self.contains(mode) {
                if !first {
                    f.write_str("+")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Provider attributes consulted when building a negotiated profile.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct ProviderAttributes {
    /// Transmit contexts one endpoint can expose (1 = no scalable endpoints).
    pub max_tx_contexts: u32,
    /// Memory registration style.
    pub memory_region: MemoryRegionMode,
    /// Hardware tagged matching.
    pub tagged: bool,
    /// RMA with delivery-complete semantics.
    pub rma: bool,
    /// Atomic operations.
    pub atomics: bool,
    /// Transfers to and from device memory.
    pub device_memory: bool,
    /// Shared receive contexts.
    pub shared_contexts: bool,
    /// Background progress for data messages.
    pub data_auto_progress: bool,
    /// Background progress for control messages.
    pub control_auto_progress: bool,
    /// API revision the provider implements.
    pub api_version: (u16, u16),
}

impl Default for ProviderAttributes {
    fn default() -> Self {
        Self {
            max_tx_contexts: 1,
            memory_region: MemoryRegionMode::BASIC,
            tagged: true,
            rma: true,
            atomics: true,
            device_memory: false,
            shared_contexts: false,
            data_auto_progress: false,
            control_auto_progress: false,
            api_version: API_VERSION,
        }
    }
}

/// Live transport queried once at startup.
///
/// Implementations may block while talking to the provider; negotiation
/// calls each method exactly once before any endpoint exists.
pub trait TransportQuery {
    /// Identity string of the provider (e.g. `"psm2"`, `"tcp;ofi_rxm"`).
    fn provider_name(&self) -> &str;

    /// Width of the match field the provider honours; may be below 64.
    fn max_usable_match_bits(&self) -> u8;

    /// Whether the provider can deliver the sender rank as immediate data.
    fn supports_immediate_source(&self) -> bool;

    /// Remaining feature attributes.
    fn attributes(&self) -> ProviderAttributes {
        ProviderAttributes::default()
    }
}

/// Fixed-answer transport for tests and offline tooling.
#[derive(Clone, Debug)]
pub struct SimulatedTransport {
    /// Reported provider name.
    pub name: String,
    /// Reported usable match bits.
    pub match_bits: u8,
    /// Reported immediate-data support.
    pub immediate_source: bool,
    /// Reported feature attributes.
    pub attributes: ProviderAttributes,
}

impl SimulatedTransport {
    /// Creates a full-width provider with immediate data and default attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            match_bits: MATCH_KEY_BITS,
            immediate_source: true,
            attributes: ProviderAttributes::default(),
        }
    }

    /// Sets the reported usable match bits.
    pub fn with_match_bits(mut self, bits: u8) -> Self {
        self.match_bits = bits;
        self
    }

    /// Sets whether immediate source delivery is reported.
    pub fn with_immediate_source(mut self, supported: bool) -> Self {
        self.immediate_source = supported;
        self
    }

    /// Replaces the reported attributes.
    pub fn with_attributes(mut self, attributes: ProviderAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}

impl TransportQuery for SimulatedTransport {
    fn provider_name(&self) -> &str {
        &self.name
    }

    fn max_usable_match_bits(&self) -> u8 {
        self.match_bits
    }

    fn supports_immediate_source(&self) -> bool {
        self.immediate_source
    }

    fn attributes(&self) -> ProviderAttributes {
        self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_transport_defaults() {
        let transport = SimulatedTransport::new("sockets");
        assert_eq!(transport.provider_name(), "sockets");
        assert_eq!(transport.max_usable_match_bits(), 64);
        assert!(transport.supports_immediate_source());
        assert_eq!(transport.attributes().max_tx_contexts, 1);
    }

    #[test]
    fn test_simulated_transport_builders() {
        let transport = SimulatedTransport::new("narrow")
            .with_match_bits(48)
            .with_immediate_source(false);
        assert_eq!(transport.max_usable_match_bits(), 48);
        assert!(!transport.supports_immediate_source());
    }

    #[test]
    fn test_memory_region_modes_are_independent() {
        let key_only = MemoryRegionMode::PROV_KEY;
        assert!(!key_only.contains(MemoryRegionMode::VIRT_ADDRESS));
        assert_eq!(key_only.to_string(), "prov-key");

        assert_eq!(MemoryRegionMode::BASIC.to_string(), "virt-addr+prov-key");
        assert_eq!(MemoryRegionMode::SCALABLE.to_string(), "scalable");
        assert_eq!(MemoryRegionMode::UNSPECIFIED.to_string(), "unspecified");
        assert_eq!(ProviderAttributes::default().memory_region, MemoryRegionMode::BASIC);
    }
}
