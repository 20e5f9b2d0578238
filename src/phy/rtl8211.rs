//! RTL8211 PHY Driver
//!
//! Driver for the Realtek RTL8211 family of 10/100/1000 Ethernet PHYs as
//! found on MEMAC boards, reached through the MEMAC MDIO window.
//!
//! Link state, speed and duplex come from the vendor PHY-specific status
//! register (PHYSR, 0x11), which reports the resolved link in one read.
//!
//! # Reset Pin
//!
//! The active-low reset line is usually IOModule GPO1 bit 0; pass
//! [`MacControl::phy_reset_pin`](crate::hal::MacControl::phy_reset_pin) or
//! any other `embedded_hal::digital::OutputPin`:
//!
//! ```ignore
//! let mut phy = Rtl8211::new(RTL8211_DEFAULT_ADDR);
//! phy.hardware_reset(&mut control.phy_reset_pin(), &mut delay)?;
//! phy.verify_id(&mut mdio)?;
//! phy.init(&mut mdio)?;
//!
//! loop {
//!     if let Some(link) = phy.poll_link(&mut mdio)? {
//!         control.set_speed(link.speed);
//!         break;
//!     }
//! }
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use super::generic::{Duplex, LinkStatus, PhyDriver, PhyId, ieee802_3};
use crate::driver::error::{IoError, Result};
use crate::hal::control::LinkSpeed;
use crate::hal::mdio::{MdioBus, phy_reg};
use crate::internal::constants::{PHY_RESET_ASSERT_MS, PHY_RESET_SETTLE_MS};

// =============================================================================
// RTL8211 Constants
// =============================================================================

/// Realtek OUI as decoded from PHYIDR1/PHYIDR2
pub const RTL8211_OUI: u32 = 0x0732;

/// PHY address strapped on MEMAC boards
pub const RTL8211_DEFAULT_ADDR: u8 = 1;

/// Maximum soft reset polling iterations
const RESET_MAX_ATTEMPTS: u32 = 1000;

/// RTL8211 vendor-specific register addresses
pub mod reg {
    /// PHY Specific Control Register
    pub const PHYCR: u8 = 0x10;
    /// PHY Specific Status Register
    pub const PHYSR: u8 = 0x11;
}

/// PHY Specific Status Register (0x11) bits
pub mod physr {
    /// Resolved speed (bits 15:14): 00 = 10, 01 = 100, 10 = 1000 Mbps
    pub const SPEED_SHIFT: u16 = 14;
    /// Resolved duplex, 1 = full
    pub const DUPLEX: u16 = 1 << 13;
    /// Link partner page received
    pub const PAGE_RECEIVED: u16 = 1 << 12;
    /// Speed and duplex resolved
    pub const RESOLVED: u16 = 1 << 11;
    /// Real-time link status
    pub const LINK: u16 = 1 << 10;
}

/// 1000BASE-T Control Register (9) bits
pub mod gbcr {
    /// Advertise 1000BASE-T full duplex
    pub const ADV_1000_FD: u16 = 1 << 9;
    /// Advertise 1000BASE-T half duplex
    pub const ADV_1000_HD: u16 = 1 << 8;
}

/// Auto-Negotiation Advertisement Register (4) values
pub mod anar {
    /// IEEE 802.3 selector field
    pub const SELECTOR_802_3: u16 = 0x0001;
    /// 10/100 half and full duplex
    pub const ADV_10_100_ALL: u16 = 0x01E0;
}

// =============================================================================
// RTL8211 Driver
// =============================================================================

/// RTL8211 PHY Driver
#[derive(Debug)]
pub struct Rtl8211 {
    /// PHY address (0-31)
    addr: u8,
    /// Last known link state
    last_link_up: bool,
}

impl Default for Rtl8211 {
    fn default() -> Self {
        Self::new(RTL8211_DEFAULT_ADDR)
    }
}

impl Rtl8211 {
    /// Create a driver for the PHY at `addr`
    pub const fn new(addr: u8) -> Self {
        Self {
            addr,
            last_link_up: false,
        }
    }

    /// Check the OUI and return the decoded identifier
    ///
    /// # Errors
    ///
    /// [`IoError::PhyError`] when the PHY does not report the Realtek OUI.
    pub fn verify_id<M: MdioBus>(&self, mdio: &mut M) -> Result<PhyId> {
        let id = self.phy_id(mdio)?;
        if id.oui != RTL8211_OUI {
            #[cfg(feature = "defmt")]
            defmt::warn!("PHY {=u8}: unexpected OUI {:#08x}", self.addr, id.oui);
            return Err(IoError::PhyError.into());
        }
        Ok(id)
    }

    /// Raw PHY-specific status register
    pub fn status<M: MdioBus>(&self, mdio: &mut M) -> Result<u16> {
        mdio.read(self.addr, reg::PHYSR)
    }

    /// Real-time link bit from PHYSR
    pub fn link<M: MdioBus>(&self, mdio: &mut M) -> Result<bool> {
        Ok(self.status(mdio)? & physr::LINK != 0)
    }

    /// Resolved speed from PHYSR; `None` for the reserved code
    pub fn speed<M: MdioBus>(&self, mdio: &mut M) -> Result<Option<LinkSpeed>> {
        let code = self.status(mdio)? >> physr::SPEED_SHIFT;
        Ok(LinkSpeed::from_code(code as u32))
    }

    /// Resolved duplex from PHYSR
    pub fn duplex<M: MdioBus>(&self, mdio: &mut M) -> Result<Duplex> {
        Ok(if self.status(mdio)? & physr::DUPLEX != 0 {
            Duplex::Full
        } else {
            Duplex::Half
        })
    }

    /// Pulse the active-low reset line
    ///
    /// Holds reset for 15 ms, then waits 45 ms for the PHY to come out of
    /// reset before MDIO access.
    ///
    /// # Errors
    ///
    /// [`IoError::PhyError`] if the pin cannot be driven.
    pub fn hardware_reset<P: OutputPin, D: DelayNs>(
        &mut self,
        reset_pin: &mut P,
        delay: &mut D,
    ) -> Result<()> {
        reset_pin.set_low().map_err(|_| IoError::PhyError)?;
        delay.delay_ms(PHY_RESET_ASSERT_MS);
        reset_pin.set_high().map_err(|_| IoError::PhyError)?;
        delay.delay_ms(PHY_RESET_SETTLE_MS);

        self.last_link_up = false;
        Ok(())
    }

    fn resolve(status: u16) -> Option<LinkStatus> {
        if status & physr::LINK == 0 {
            return None;
        }
        let speed = LinkSpeed::from_code((status >> physr::SPEED_SHIFT) as u32)?;
        let duplex = if status & physr::DUPLEX != 0 {
            Duplex::Full
        } else {
            Duplex::Half
        };
        Some(LinkStatus::new(speed, duplex))
    }
}

impl PhyDriver for Rtl8211 {
    fn address(&self) -> u8 {
        self.addr
    }

    fn init<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        self.soft_reset(mdio)?;
        self.enable_auto_negotiation(mdio)?;

        #[cfg(feature = "defmt")]
        defmt::info!("RTL8211 at {=u8} initialized", self.addr);

        self.last_link_up = false;
        Ok(())
    }

    fn soft_reset<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        ieee802_3::soft_reset(mdio, self.addr, RESET_MAX_ATTEMPTS)
    }

    fn is_link_up<M: MdioBus>(&self, mdio: &mut M) -> Result<bool> {
        self.link(mdio)
    }

    fn link_status<M: MdioBus>(&self, mdio: &mut M) -> Result<Option<LinkStatus>> {
        Ok(Self::resolve(self.status(mdio)?))
    }

    fn poll_link<M: MdioBus>(&mut self, mdio: &mut M) -> Result<Option<LinkStatus>> {
        let status = Self::resolve(self.status(mdio)?);
        let link_up = status.is_some();
        let was_up = core::mem::replace(&mut self.last_link_up, link_up);

        if link_up && !was_up {
            #[cfg(feature = "defmt")]
            defmt::info!("PHY {=u8} link up: {}", self.addr, status);
            return Ok(status);
        }
        Ok(None)
    }

    fn enable_auto_negotiation<M: MdioBus>(&mut self, mdio: &mut M) -> Result<()> {
        mdio.write(
            self.addr,
            phy_reg::ANAR,
            anar::ADV_10_100_ALL | anar::SELECTOR_802_3,
        )?;
        mdio.modify(self.addr, phy_reg::GBCR, gbcr::ADV_1000_HD, gbcr::ADV_1000_FD)?;
        ieee802_3::enable_auto_negotiation(mdio, self.addr)
    }

    fn phy_id<M: MdioBus>(&self, mdio: &mut M) -> Result<PhyId> {
        ieee802_3::read_phy_id(mdio, self.addr)
    }

    fn is_auto_negotiation_complete<M: MdioBus>(&self, mdio: &mut M) -> Result<bool> {
        ieee802_3::is_an_complete(mdio, self.addr)
    }
}
