//! Wire formats
//!
//! Address types and the frame codec that reads and writes protocol headers
//! directly inside the MEMAC ring buffers.
//!
//! - [`frame`]: Ring-buffer windows addressed relative to a descriptor
//! - [`checksum`]: Internet checksum accumulation
//! - [`header`]: Ethernet/IPv4/UDP header construction and checksum passes
//!
//! All multi-byte wire fields are big-endian. Addresses are kept as raw
//! byte arrays in frame order and never byte-swapped.

pub mod checksum;
pub mod frame;
pub mod header;

pub use checksum::Checksum;
pub use frame::{FrameRead, RxFrame, TxFrame};

use crate::internal::constants::{DEFAULT_IP_ADDR, DEFAULT_MAC_ADDR};

// =============================================================================
// MAC Address
// =============================================================================

/// 48-bit Ethernet hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Broadcast address `ff:ff:ff:ff:ff:ff`
    pub const BROADCAST: Self = Self([0xFF; 6]);

    /// Create from raw bytes
    #[must_use]
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Raw bytes in frame order
    #[must_use]
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Check for the broadcast address
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

impl core::fmt::Display for MacAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

// =============================================================================
// IPv4 Address
// =============================================================================

/// IPv4 address in network byte order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ipv4Address(pub [u8; 4]);

impl Ipv4Address {
    /// Unspecified address `0.0.0.0`
    pub const UNSPECIFIED: Self = Self([0; 4]);

    /// Create from dotted-quad components
    #[must_use]
    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self([a, b, c, d])
    }

    /// Raw bytes in network order
    #[must_use]
    pub const fn octets(&self) -> [u8; 4] {
        self.0
    }

    /// Packed form, first octet in the most significant byte
    #[must_use]
    pub const fn to_bits(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Build from the packed form produced by [`to_bits`](Self::to_bits)
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits.to_be_bytes())
    }
}

impl From<[u8; 4]> for Ipv4Address {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl core::fmt::Display for Ipv4Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let b = &self.0;
        write!(f, "{}.{}.{}.{}", b[0], b[1], b[2], b[3])
    }
}

// =============================================================================
// Local Identity
// =============================================================================

/// Local MAC/IP identity stamped into every generated frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Identity {
    /// Local hardware address
    pub mac: MacAddress,
    /// Local IPv4 address
    pub ip: Ipv4Address,
}

impl Identity {
    /// Create a new identity
    #[must_use]
    pub const fn new(mac: MacAddress, ip: Ipv4Address) -> Self {
        Self { mac, ip }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new(MacAddress(DEFAULT_MAC_ADDR), Ipv4Address(DEFAULT_IP_ADDR))
    }
}
