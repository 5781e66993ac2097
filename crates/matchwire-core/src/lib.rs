#![warn(missing_docs)]

//! matchwire-core: foundational types shared by every layer.
//!
//! This crate provides the minimal set of pieces the profile and codec crates build on:
//! - Configuration types
//! - Error handling
//! - Match-key and endpoint constants
//! - The transport query seam used by runtime negotiation
//!
//! Profile-specific logic lives in specialized crates:
//! - `matchwire-profile`: registry, selector, negotiator, endpoint mapping
//! - `matchwire-codec`: match-key packing and unpacking

/// Constants shared across layers.
pub mod constants {
    /// Total width of a match key in bits.
    pub const MATCH_KEY_BITS: u8 = 64;
    /// Number of single-bit protocol flags every layout reserves.
    pub const PROTOCOL_FLAG_BITS: u8 = 4;
    /// Tag width the library promises to callers (non-negative `i32` tag space).
    pub const CONTRACT_TAG_BITS: u8 = 31;
    /// Default floor below which runtime negotiation refuses a tag width.
    pub const MIN_TAG_BITS_DEFAULT: u8 = 8;
    /// Default upper bound on simultaneously live communication contexts.
    pub const MAX_CONTEXT_IDS_DEFAULT: u32 = 1 << 20;
    /// Default upper bound on the number of ranks in one session.
    pub const MAX_WORLD_SIZE_DEFAULT: u32 = 1 << 24;
    /// Longest provider name considered by the selector, in bytes.
    pub const MAX_PROVIDER_NAME_LEN: usize = 64;
    /// Endpoint count for profiles with scalable endpoints.
    pub const MAX_ENDPOINTS_SCALABLE: u32 = 256;
    /// Index width for profiles with scalable endpoints.
    pub const MAX_ENDPOINTS_BITS_SCALABLE: u8 = 8;
    /// Endpoint count for profiles without scalable endpoints.
    pub const MAX_ENDPOINTS_REGULAR: u32 = 1;
    /// Index width for profiles without scalable endpoints.
    pub const MAX_ENDPOINTS_BITS_REGULAR: u8 = 0;
    /// Receive buffers posted for the active-message path.
    pub const MAX_NUM_AM_BUFFERS: u32 = 8;
    /// Transport API revision this build targets when a profile does not pin one.
    pub const API_VERSION: (u16, u16) = (1, 7);
}

/// Configuration options for profile selection and negotiation.
pub mod config;
/// Error types and results.
pub mod error;
/// Transport query abstraction for runtime negotiation.
pub mod transport;
