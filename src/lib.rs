//! MEMAC Raw Packet Engine
//!
//! A `no_std`, `no_alloc` raw Ethernet/IPv4/ARP/ICMP/UDP engine for the MEMAC
//! memory-mapped Ethernet MAC used by FPGA-hosted soft processors such as the
//! MicroBlaze MCS.
//!
//! The MEMAC exposes a circular transmit buffer, a circular receive buffer and
//! four descriptor queues. This crate answers ARP and ICMP echo requests and
//! runs a single UDP endpoint by reading and writing protocol headers in place
//! inside those buffers; no frame is ever copied into RAM except a received
//! UDP payload.
//!
//! # Architecture
//!
//! 1. **Transport** ([`driver::transport`]): byte access to the buffers and
//!    descriptor queues ([`MmioTransport`] on hardware, a mock in tests)
//! 2. **Descriptors** ([`descriptor`]): frame locations and per-protocol
//!    transmit slots
//! 3. **Wire** ([`wire`]): header codec and Internet checksums over the rings
//! 4. **Protocols** ([`protocol`]): ARP, IPv4 demux, ICMP echo, UDP
//! 5. **Engine** ([`Memac`]): the cooperative poll loop
//!
//! Around the engine, [`hal`] covers MAC control bits on the IOModule ports
//! and MDIO access, and [`phy`] drives the RTL8211 PHY.
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting and logging
//! - `critical-section`: Enable the ISR-safe [`sync::SharedMemac`] wrapper
//!
//! # Example
//!
//! ```ignore
//! use memac_raw::hal::{LinkSpeed, MacControl};
//! use memac_raw::{Memac, MemacConfig, MmioTransport};
//!
//! let config = MemacConfig::new()
//!     .with_mac_address([0x02, 0x00, 0x00, 0x12, 0x34, 0x56])
//!     .with_ip_address([192, 168, 1, 155])
//!     .with_udp_port(5000);
//!
//! let mut control = unsafe { MacControl::new(&config.memory_map) };
//! control.init();
//! control.set_speed(LinkSpeed::Mbps1000);
//!
//! let bus = unsafe { MmioTransport::new(&config) };
//! let mut memac = Memac::new(bus, &config).unwrap();
//!
//! loop {
//!     memac.poll();
//! }
//! ```

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod descriptor;
pub mod driver;
pub mod hal;
pub mod phy;
pub mod protocol;
pub mod wire;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use descriptor::{RxDescriptor, SlotState, TxDescriptor};
pub use driver::config::{IpDispatchOrder, IpProtocol, MemacConfig, MemoryMap, Protocols};
pub use driver::engine::{Counters, Memac, PollEvents};
pub use driver::error::{
    ConfigError, ConfigResult, Error, IoError, IoResult, Result, TxError, TxResult,
};
pub use driver::transport::{MmioTransport, Transport};
pub use protocol::{RxOutcome, UdpEndpoint, UdpMeta};
pub use wire::{Identity, Ipv4Address, MacAddress};

// Re-export PHY types
pub use phy::{Duplex, LinkStatus, PhyDriver, Rtl8211};

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::SharedMemac;

/// Wire-format and hardware constants.
///
/// Grouped into a dedicated module to keep the top-level facade focused on
/// engine types.
pub mod constants {
    pub use crate::internal::constants::{
        ARP_PACKET_LEN,
        ARP_SLOT_LEN,
        DEFAULT_IP_ADDR,
        DEFAULT_MAC_ADDR,
        DEFAULT_RX_BUFFER_SIZE,
        DEFAULT_TX_BUFFER_SIZE,
        ETH_HEADER_LEN,
        ICMP_HEADER_LEN,
        ICMP_SLOT_LEN,
        IOMODULE_BASE,
        IOMODULE_GPI1_OFFSET,
        IOMODULE_GPO1_OFFSET,
        IP_MTU,
        IPV4_ADDR_LEN,
        IPV4_HEADER_LEN,
        MAC_ADDR_LEN,
        MAX_BUFFER_SIZE,
        MEMAC_BASE,
        MEMAC_MDIO_OFFSET,
        MEMAC_RX_BUF_ERR_OFFSET,
        MEMAC_RX_BUF_OFFSET,
        MEMAC_RX_PDQ_OFFSET,
        MEMAC_TX_BUF_ERR_OFFSET,
        MEMAC_TX_BUF_OFFSET,
        MEMAC_TX_PDQ_OFFSET,
        MIN_BUFFER_SIZE,
        PHY_RESET_ASSERT_MS,
        PHY_RESET_SETTLE_MS,
        UDP_HEADER_LEN,
        UDP_MAX_PAYLOAD,
        UDP_SLOT_LEN,
    };
}
