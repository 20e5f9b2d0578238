//! Generic PHY Driver Trait
//!
//! This module defines the common interface for Ethernet PHY drivers,
//! based on IEEE 802.3 Clause 22 standard registers.

use crate::driver::error::{IoError, Result};
use crate::hal::control::LinkSpeed;
use crate::hal::mdio::MdioBus;

// =============================================================================
// Link Status
// =============================================================================

/// Duplex mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duplex {
    /// Half duplex
    Half,
    /// Full duplex
    Full,
}

/// Ethernet link status information
///
/// Contains the negotiated or configured link parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStatus {
    /// Link speed
    pub speed: LinkSpeed,
    /// Duplex mode
    pub duplex: Duplex,
}

impl LinkStatus {
    /// Create a new link status
    pub const fn new(speed: LinkSpeed, duplex: Duplex) -> Self {
        Self { speed, duplex }
    }

    /// 1000 Mbps Full Duplex
    pub const fn gigabit_full() -> Self {
        Self::new(LinkSpeed::Mbps1000, Duplex::Full)
    }

    /// 100 Mbps Full Duplex
    pub const fn fast_full() -> Self {
        Self::new(LinkSpeed::Mbps100, Duplex::Full)
    }

    /// 100 Mbps Half Duplex
    pub const fn fast_half() -> Self {
        Self::new(LinkSpeed::Mbps100, Duplex::Half)
    }
}

// =============================================================================
// PHY Identifier
// =============================================================================

/// Decoded PHYIDR1/PHYIDR2 contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhyId {
    /// Organizationally unique identifier bits 3..=24
    pub oui: u32,
    /// Manufacturer model number
    pub model: u8,
    /// Manufacturer revision number
    pub revision: u8,
}

impl PhyId {
    /// Decode the two identifier registers
    pub const fn decode(id1: u16, id2: u16) -> Self {
        Self {
            oui: ((id1 as u32) << 6) | ((id2 as u32) >> 10),
            model: ((id2 >> 4) & 0x3F) as u8,
            revision: (id2 & 0x0F) as u8,
        }
    }
}

// =============================================================================
// PHY Driver Trait
// =============================================================================

/// Trait for Ethernet PHY drivers
///
/// All PHY drivers must support the standard Clause 22 registers (0-15),
/// but may also use vendor-specific registers (16-31) for link resolution.
pub trait PhyDriver {
    /// Get the PHY address (0-31)
    fn address(&self) -> u8;

    /// Initialize the PHY
    ///
    /// Typically a soft reset followed by auto-negotiation setup.
    fn init<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()>;

    /// Perform a soft reset
    ///
    /// Writes to BMCR.RESET and waits for it to self-clear.
    fn soft_reset<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()>;

    /// Check if the link is up
    fn is_link_up<M: MdioBus>(&self, mdio: &mut M) -> Result<bool>;

    /// Get current link status with speed/duplex
    ///
    /// Returns `None` if link is down, `Some(LinkStatus)` if link is up.
    fn link_status<M: MdioBus>(&self, mdio: &mut M) -> Result<Option<LinkStatus>>;

    /// Poll for link changes
    ///
    /// Returns `Some(LinkStatus)` when a new link is established,
    /// `None` if link is still down or unchanged.
    fn poll_link<M: MdioBus>(&mut self, mdio: &mut M) -> Result<Option<LinkStatus>>;

    /// Enable and restart auto-negotiation
    fn enable_auto_negotiation<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()>;

    /// Read the PHY identifier
    fn phy_id<M: MdioBus>(&self, mdio: &mut M) -> Result<PhyId>;

    /// Check if auto-negotiation is complete
    fn is_auto_negotiation_complete<M: MdioBus>(&self, mdio: &mut M) -> Result<bool>;
}

// =============================================================================
// Default Implementations
// =============================================================================

/// Helper functions using standard IEEE 802.3 registers
pub mod ieee802_3 {
    use super::*;
    use crate::hal::mdio::{bmcr, bmsr, phy_reg};

    /// Read BMSR and check link status bit
    pub fn is_link_up<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<bool> {
        let bmsr_val = mdio.read(phy_addr, phy_reg::BMSR)?;
        Ok((bmsr_val & bmsr::LINK_STATUS) != 0)
    }

    /// Read BMSR and check AN complete bit
    pub fn is_an_complete<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<bool> {
        let bmsr_val = mdio.read(phy_addr, phy_reg::BMSR)?;
        Ok((bmsr_val & bmsr::AN_COMPLETE) != 0)
    }

    /// Perform soft reset via BMCR
    ///
    /// # Errors
    ///
    /// [`IoError::Timeout`] if the reset bit is still set after
    /// `max_attempts` reads.
    pub fn soft_reset<M: MdioBus>(mdio: &mut M, phy_addr: u8, max_attempts: u32) -> Result<()> {
        mdio.write(phy_addr, phy_reg::BMCR, bmcr::RESET)?;

        // Bit self-clears
        for _ in 0..max_attempts {
            let bmcr_val = mdio.read(phy_addr, phy_reg::BMCR)?;
            if (bmcr_val & bmcr::RESET) == 0 {
                return Ok(());
            }
        }
        Err(IoError::Timeout.into())
    }

    /// Enable auto-negotiation and restart
    pub fn enable_auto_negotiation<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<()> {
        mdio.modify(
            phy_addr,
            phy_reg::BMCR,
            bmcr::ISOLATE | bmcr::POWER_DOWN,
            bmcr::AN_ENABLE | bmcr::AN_RESTART,
        )
    }

    /// Read and decode PHYIDR1 and PHYIDR2
    pub fn read_phy_id<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<PhyId> {
        let id1 = mdio.read(phy_addr, phy_reg::PHYIDR1)?;
        let id2 = mdio.read(phy_addr, phy_reg::PHYIDR2)?;
        Ok(PhyId::decode(id1, id2))
    }
}
