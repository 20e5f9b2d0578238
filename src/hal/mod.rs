//! Hardware Abstraction Layer
//!
//! Thin register-level services around the packet engine: the MicroBlaze
//! MCS IOModule ports that carry MAC control and status bits, and the MEMAC
//! MDIO window used to reach the PHY.
//!
//! # Modules
//!
//! - [`gpio`]: IOModule GPO/GPI ports
//! - [`control`]: MAC resets, link speed, RX framing options
//! - [`mdio`]: Clause 22 PHY register access
//!
//! # Delay Integration
//!
//! Types that need delays take `embedded_hal::delay::DelayNs` directly.

pub mod control;
pub mod gpio;
pub mod mdio;

// Re-export commonly used types
pub use control::{LinkSpeed, MacControl, PhyResetPin, QueueStatus, RxControl};
pub use gpio::{GpiPort, GpoPort};
pub use mdio::{MdioBus, MemacMdio};
