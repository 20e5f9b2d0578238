//! MDIO (Management Data Input/Output) HAL
//!
//! The MEMAC exposes PHY management registers as a memory window: each
//! 16-bit register of each PHY has its own address, and the hardware runs
//! the MDIO transaction when that address is read or written.

use crate::driver::config::MemoryMap;
use crate::driver::error::{IoError, Result};
use crate::internal::mmio;

// =============================================================================
// MDIO Constants
// =============================================================================

/// Maximum valid PHY address (5-bit field)
pub const MAX_PHY_ADDR: u8 = 31;

/// Maximum valid register address (5-bit field)
pub const MAX_REG_ADDR: u8 = 31;

/// Window address of a PHY register
#[inline(always)]
#[must_use]
pub const fn register_address(base: usize, phy_addr: u8, reg_addr: u8) -> usize {
    base + ((phy_addr as usize) << 7) + ((reg_addr as usize) << 2)
}

fn check_address(phy_addr: u8, reg_addr: u8) -> Result<()> {
    if phy_addr > MAX_PHY_ADDR {
        return Err(IoError::InvalidPhyAddress.into());
    }
    if reg_addr > MAX_REG_ADDR {
        return Err(IoError::InvalidRegister.into());
    }
    Ok(())
}

// =============================================================================
// MDIO Bus Trait
// =============================================================================

/// Trait for MDIO bus operations
///
/// This trait can be implemented by different backends, allowing
/// the PHY driver to work with various MDIO implementations.
pub trait MdioBus {
    /// Read a PHY register
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16>;

    /// Write a PHY register
    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()>;

    /// Read-modify-write a PHY register
    fn modify(&mut self, phy_addr: u8, reg_addr: u8, clear: u16, set: u16) -> Result<()> {
        let value = self.read(phy_addr, reg_addr)?;
        self.write(phy_addr, reg_addr, (value & !clear) | set)
    }
}

// =============================================================================
// MEMAC MDIO Window
// =============================================================================

/// MDIO access through the MEMAC register window
#[derive(Debug)]
pub struct MemacMdio {
    base: usize,
}

impl MemacMdio {
    /// Create an MDIO accessor for the window in `map`
    ///
    /// # Safety
    ///
    /// `map` must describe a real MEMAC.
    #[must_use]
    pub const unsafe fn new(map: &MemoryMap) -> Self {
        Self { base: map.mdio() }
    }
}

impl MdioBus for MemacMdio {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        check_address(phy_addr, reg_addr)?;
        // SAFETY: address checked to lie within the MDIO window
        Ok(unsafe { mmio::read_u16(register_address(self.base, phy_addr, reg_addr)) })
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        check_address(phy_addr, reg_addr)?;
        // SAFETY: address checked to lie within the MDIO window
        unsafe { mmio::write_u16(register_address(self.base, phy_addr, reg_addr), value) }
        Ok(())
    }
}

// =============================================================================
// PHY Register Definitions (IEEE 802.3 standard registers)
// =============================================================================

/// Standard PHY register addresses (IEEE 802.3 Clause 22)
pub mod phy_reg {
    /// Basic Mode Control Register
    pub const BMCR: u8 = 0;
    /// Basic Mode Status Register
    pub const BMSR: u8 = 1;
    /// PHY Identifier 1
    pub const PHYIDR1: u8 = 2;
    /// PHY Identifier 2
    pub const PHYIDR2: u8 = 3;
    /// Auto-Negotiation Advertisement Register
    pub const ANAR: u8 = 4;
    /// Auto-Negotiation Link Partner Ability Register
    pub const ANLPAR: u8 = 5;
    /// Auto-Negotiation Expansion Register
    pub const ANER: u8 = 6;
    /// 1000BASE-T Control Register
    pub const GBCR: u8 = 9;
    /// 1000BASE-T Status Register
    pub const GBSR: u8 = 10;
    /// Extended Status Register
    pub const GBESR: u8 = 15;
}

/// BMCR (Basic Mode Control Register) bits
pub mod bmcr {
    /// Soft reset
    pub const RESET: u16 = 1 << 15;
    /// Loopback mode
    pub const LOOPBACK: u16 = 1 << 14;
    /// Speed select LSB
    pub const SPEED_SEL0: u16 = 1 << 13;
    /// Auto-negotiation enable
    pub const AN_ENABLE: u16 = 1 << 12;
    /// Power down
    pub const POWER_DOWN: u16 = 1 << 11;
    /// Isolate
    pub const ISOLATE: u16 = 1 << 10;
    /// Restart auto-negotiation
    pub const AN_RESTART: u16 = 1 << 9;
    /// Duplex mode (full duplex if set)
    pub const DUPLEX_FULL: u16 = 1 << 8;
    /// Speed select MSB
    pub const SPEED_SEL1: u16 = 1 << 6;
}

/// BMSR (Basic Mode Status Register) bits
pub mod bmsr {
    /// 100BASE-T4 capable
    pub const T4_CAPABLE: u16 = 1 << 15;
    /// 100BASE-TX full duplex capable
    pub const TX_FD_CAPABLE: u16 = 1 << 14;
    /// 100BASE-TX half duplex capable
    pub const TX_HD_CAPABLE: u16 = 1 << 13;
    /// 10BASE-T full duplex capable
    pub const T10_FD_CAPABLE: u16 = 1 << 12;
    /// 10BASE-T half duplex capable
    pub const T10_HD_CAPABLE: u16 = 1 << 11;
    /// Extended status register present
    pub const ESTATUS: u16 = 1 << 8;
    /// MF preamble suppression
    pub const MF_PREAMBLE_SUPP: u16 = 1 << 6;
    /// Auto-negotiation complete
    pub const AN_COMPLETE: u16 = 1 << 5;
    /// Remote fault
    pub const REMOTE_FAULT: u16 = 1 << 4;
    /// Auto-negotiation ability
    pub const AN_ABILITY: u16 = 1 << 3;
    /// Link status (latched low)
    pub const LINK_STATUS: u16 = 1 << 2;
    /// Jabber detect
    pub const JABBER_DETECT: u16 = 1 << 1;
    /// Extended capabilities
    pub const EXT_CAPABLE: u16 = 1 << 0;
}
