//! Packet engine and its configuration.
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`engine`] - The [`Memac`] poll loop
//! - [`error`] - Error types and result aliases
//! - [`transport`] - Buffer and descriptor queue access
//!
//! # Example
//!
//! ```ignore
//! use memac_raw::driver::{Memac, MemacConfig, MmioTransport};
//!
//! let config = MemacConfig::new()
//!     .with_mac_address([0x02, 0x00, 0x00, 0x00, 0x00, 0x01])
//!     .with_ip_address([192, 168, 1, 20]);
//! let bus = unsafe { MmioTransport::new(&config) };
//! let mut memac = Memac::new(bus, &config)?;
//! ```

// Submodules
pub mod config;
pub mod engine;
pub mod error;
pub mod transport;

// Re-exports for convenience
pub use config::{IpDispatchOrder, IpProtocol, MemacConfig, MemoryMap, Protocols};
pub use engine::{Counters, Memac, PollEvents};
pub use error::{
    ConfigError, ConfigResult, Error, IoError, IoResult, Result, TxError, TxResult,
};
pub use transport::{MmioTransport, Transport};
