//! Synchronization Support
//!
//! Critical-section protected wrappers for sharing the packet engine between
//! the main loop and interrupt handlers (for example a timer tick that
//! drives [`Memac::poll`](crate::Memac::poll)).
//!
//! - [`CriticalSectionCell`] - ISR-safe interior mutability
//! - [`SharedMemac`] - Statically allocated, lazily initialized engine
//!
//! # Feature Flags
//!
//! - `critical-section`: Enables this module
//!
//! # Example
//!
//! ```ignore
//! use memac_raw::sync::SharedMemac;
//! use memac_raw::{MemacConfig, MmioTransport};
//!
//! static MEMAC: SharedMemac<MmioTransport> = SharedMemac::new();
//!
//! fn main() {
//!     let config = MemacConfig::new();
//!     MEMAC.init(unsafe { MmioTransport::new(&config) }, &config).unwrap();
//!     loop {
//!         MEMAC.poll();
//!     }
//! }
//! ```

mod primitives;
mod shared;

pub use primitives::CriticalSectionCell;
pub use shared::SharedMemac;
