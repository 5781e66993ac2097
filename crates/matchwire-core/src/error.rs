//! Error types shared by every layer.

use std::{fmt, io};

use thiserror::Error;

/// Result alias used throughout matchwire.
pub type Result<T> = std::result::Result<T, ErrorKind>;

/// Everything that can go wrong while dimensioning or packing match keys.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The transport's match-bit budget cannot satisfy the tag contract.
    /// Fatal to transport initialization.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// A field value does not fit the width the active profile gives it.
    #[error(transparent)]
    Overflow(#[from] OverflowError),
    /// A bit layout violates its own invariants.
    #[error("invalid match layout: {0}")]
    InvalidLayout(LayoutErrorKind),
    /// Reading or writing a match key on the wire failed.
    #[error("match key i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// Negotiation could not produce an allocation that honours the minimum tag width.
///
/// Carries the computed widths so operators can see where the budget went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "transport match-bit budget insufficient: {usable_bits} usable bits, \
     context {context_bits} + source {source_bits} + protocol 4 leaves tag {tag_bits} < minimum {min_tag_bits}"
)]
pub struct ConfigurationError {
    /// Match bits the transport reported as usable.
    pub usable_bits: u8,
    /// Bits required for the context field.
    pub context_bits: u8,
    /// Bits required for the source field.
    pub source_bits: u8,
    /// Bits left for the tag (saturated at zero).
    pub tag_bits: u8,
    /// The configured floor.
    pub min_tag_bits: u8,
}

/// Names the match-key field that overflowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    /// Communication context identifier
    Context,
    /// Embedded source rank
    Source,
    /// Message tag
    Tag,
}

impl fmt::Display for MatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchField::Context => "context id",
            MatchField::Source => "source rank",
            MatchField::Tag => "tag",
        };
        f.write_str(name)
    }
}

/// A value exceeded the width allotted to its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field} {value} does not fit in {bits} bits")]
pub struct OverflowError {
    /// The field that overflowed.
    pub field: MatchField,
    /// The rejected value.
    pub value: u64,
    /// Width of the field in the active layout.
    pub bits: u8,
}

/// Ways a bit layout can be inconsistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutErrorKind {
    /// Field widths plus protocol bits exceed the match-key width.
    TooWide {
        /// Total bits the layout claims.
        claimed: u8,
    },
    /// Two fields claim the same bit.
    OverlappingMasks,
    /// The union of the field masks does not cover exactly the claimed bits.
    CoverageMismatch,
    /// Protocol flag positions are not a permutation of the four flag slots.
    DuplicateFlagPosition,
    /// Endpoint count does not fit its index width.
    EndpointBits {
        /// Endpoint count.
        count: u32,
        /// Index width.
        bits: u8,
    },
}

impl fmt::Display for LayoutErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutErrorKind::TooWide { claimed } => {
                write!(f, "layout claims {} bits, more than the 64-bit match key", claimed)
            }
            LayoutErrorKind::OverlappingMasks => f.write_str("field masks overlap"),
            LayoutErrorKind::CoverageMismatch => {
                f.write_str("field masks do not cover the claimed bits")
            }
            LayoutErrorKind::DuplicateFlagPosition => {
                f.write_str("protocol flags share a bit position")
            }
            LayoutErrorKind::EndpointBits { count, bits } => {
                write!(f, "{} endpoints cannot be indexed with {} bits", count, bits)
            }
        }
    }
}
