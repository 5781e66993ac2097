//! Match keys, the fields they carry, and receive-side patterns.

use std::{
    fmt,
    io::{Read, Write},
};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use matchwire_core::error::Result;
use matchwire_profile::ProtocolFlags;

/// Packed 64-bit matching metadata handed to the transport.
///
/// Only the codec produces keys; they live from just before a send is issued
/// until the matching receive completes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchKey(u64);

impl MatchKey {
    pub(crate) const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw key bits, as passed to the transport.
    pub fn bits(self) -> u64 {
        self.0
    }

    /// Writes the key as 8 big-endian bytes.
    pub fn write_to<W: Write>(self, writer: &mut W) -> Result<()> {
        writer.write_u64::<BigEndian>(self.0)?;
        Ok(())
    }

    /// Reads a key previously written with [`MatchKey::write_to`].
    ///
    /// Only meaningful when the writer used a profile with the same layout fingerprint.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self(reader.read_u64::<BigEndian>()?))
    }
}

impl fmt::Debug for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MatchKey({:#018x})", self.0)
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Unpacked contents of a match key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct MatchFields {
    /// Communication context the message belongs to.
    pub context_id: u32,
    /// Sender rank, when carried in the key. `None` means the transport
    /// delivers it as immediate data, or the sender did not name one.
    pub source_rank: Option<u32>,
    /// User tag.
    pub tag: u32,
    /// Protocol-control flags.
    pub flags: ProtocolFlags,
}

impl MatchFields {
    /// Creates fields with no flags set.
    pub fn new(context_id: u32, source_rank: Option<u32>, tag: u32) -> Self {
        Self { context_id, source_rank, tag, flags: ProtocolFlags::empty() }
    }

    /// Returns a copy with `flags` set.
    pub fn with_flags(mut self, flags: ProtocolFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Receive-side match bits plus the bits to ignore when comparing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MatchPattern {
    /// Expected key bits.
    pub bits: u64,
    /// Bits the comparison ignores (wildcards and sender-side protocol flags).
    pub ignore: u64,
}

impl MatchPattern {
    /// Whether `key` satisfies this pattern.
    pub fn matches(&self, key: MatchKey) -> bool {
        (key.bits() ^ self.bits) & !self.ignore == 0
    }
}
