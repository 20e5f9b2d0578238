//! Ethernet PHY Drivers
//!
//! The PHY layer is independent of the packet engine and talks to the chip
//! only through the [`MdioBus`](crate::hal::MdioBus) trait, so drivers run
//! against the MEMAC MDIO window on hardware and a mock bus in tests.
//!
//! # Supported PHY Chips
//!
//! - [`Rtl8211`]: Realtek RTL8211 10/100/1000 PHY
//!
//! # Example
//!
//! ```ignore
//! use memac_raw::hal::{MacControl, MemacMdio};
//! use memac_raw::phy::{PhyDriver, Rtl8211};
//!
//! let mut mdio = unsafe { MemacMdio::new(&config.memory_map) };
//! let mut phy = Rtl8211::default();
//! phy.init(&mut mdio)?;
//!
//! loop {
//!     if let Some(link) = phy.poll_link(&mut mdio)? {
//!         control.set_speed(link.speed);
//!         break;
//!     }
//! }
//! ```

pub mod generic;
pub mod rtl8211;

pub use generic::{Duplex, LinkStatus, PhyDriver, PhyId};
pub use rtl8211::{RTL8211_DEFAULT_ADDR, RTL8211_OUI, Rtl8211};

// Re-export IEEE 802.3 standard register definitions from mdio
pub use crate::hal::mdio::{bmcr, bmsr, phy_reg};
