//! Centralized Constants
//!
//! Single source of truth for wire-format sizes, protocol numbers, MEMAC
//! memory map offsets and default identity values.
//!
//! # Organization
//!
//! - **Frame/header sizes**: Ethernet, IPv4, ARP, ICMP, UDP
//! - **Protocol numbers**: EtherTypes, IP protocols, ARP fields
//! - **Buffers**: transmit/receive ring sizes and slot sizes
//! - **Memory map**: MEMAC block offsets and IOModule GPIO registers
//! - **Defaults**: local MAC/IP identity
//!
//! # Note
//!
//! GPIO bit assignments for the MAC control word live next to the code
//! that drives them (`hal/control.rs`).

// =============================================================================
// Frame and Header Sizes
// =============================================================================

/// Ethernet header size (dst MAC + src MAC + EtherType)
pub const ETH_HEADER_LEN: u16 = 14;

/// MAC address length in bytes
pub const MAC_ADDR_LEN: usize = 6;

/// IPv4 address length in bytes
pub const IPV4_ADDR_LEN: usize = 4;

/// IPv4 header size without options
pub const IPV4_HEADER_LEN: u16 = 20;

/// IPv4 MTU (largest IP datagram carried in one frame)
pub const IP_MTU: u16 = 1500;

/// ARP packet length for Ethernet/IPv4
pub const ARP_PACKET_LEN: u16 = 28;

/// ICMP echo header size (type, code, checksum, identifier, sequence)
pub const ICMP_HEADER_LEN: u16 = 8;

/// UDP header size
pub const UDP_HEADER_LEN: u16 = 8;

/// Largest UDP payload that fits an unfragmented datagram
pub const UDP_MAX_PAYLOAD: u16 = IP_MTU - IPV4_HEADER_LEN - UDP_HEADER_LEN;

/// Frame offset of the IPv4 header
pub const IP_OFFSET: u16 = ETH_HEADER_LEN;

/// Frame offset of the payload that follows a 20-byte IPv4 header
pub const IP_PAYLOAD_OFFSET: u16 = ETH_HEADER_LEN + IPV4_HEADER_LEN;

// =============================================================================
// Protocol Numbers
// =============================================================================

/// EtherType for IPv4
pub const ETHERTYPE_IPV4: u16 = 0x0800;

/// EtherType for ARP
pub const ETHERTYPE_ARP: u16 = 0x0806;

/// IP protocol number for ICMP
pub const IP_PROTOCOL_ICMP: u8 = 0x01;

/// IP protocol number for UDP
pub const IP_PROTOCOL_UDP: u8 = 0x11;

/// Version/IHL byte for an option-less IPv4 header
pub const IP_VER_IHL: u8 = 0x45;

/// TTL used for every generated datagram
pub const IP_DEFAULT_TTL: u8 = 64;

/// ARP hardware type: Ethernet
pub const ARP_HTYPE_ETHERNET: u16 = 0x0001;

/// ARP protocol type: IPv4
pub const ARP_PTYPE_IPV4: u16 = 0x0800;

/// ARP hardware address length
pub const ARP_HLEN: u8 = 6;

/// ARP protocol address length
pub const ARP_PLEN: u8 = 4;

/// ARP operation: request
pub const ARP_OPER_REQUEST: u16 = 0x0001;

/// ARP operation: reply
pub const ARP_OPER_REPLY: u16 = 0x0002;

/// ICMP type: echo reply
pub const ICMP_ECHO_REPLY: u8 = 0;

/// ICMP type: echo request
pub const ICMP_ECHO_REQUEST: u8 = 8;

// =============================================================================
// Buffers
// =============================================================================

/// Default transmit buffer size in bytes
pub const DEFAULT_TX_BUFFER_SIZE: u16 = 8192;

/// Default receive buffer size in bytes
pub const DEFAULT_RX_BUFFER_SIZE: u16 = 8192;

/// Smallest supported ring buffer
pub const MIN_BUFFER_SIZE: u16 = 64;

/// Largest supported ring buffer (offsets are 16-bit)
pub const MAX_BUFFER_SIZE: u16 = 32768;

/// Alignment of transmit slots inside the ring
pub const TX_SLOT_ALIGN: u16 = 4;

/// Transmit slot reserved for ARP replies
pub const ARP_SLOT_LEN: u16 = ETH_HEADER_LEN + ARP_PACKET_LEN;

/// Transmit slot reserved for ICMP echo replies
pub const ICMP_SLOT_LEN: u16 = ETH_HEADER_LEN + IP_MTU;

/// Transmit slot reserved for outbound UDP datagrams
pub const UDP_SLOT_LEN: u16 = ETH_HEADER_LEN + IP_MTU;

// =============================================================================
// Memory Map
// =============================================================================

/// Default MEMAC base address
pub const MEMAC_BASE: usize = 0xC000_0000;

/// Transmit buffer offset from the MEMAC base
pub const MEMAC_TX_BUF_OFFSET: usize = 0x0_0000;

/// Transmit buffer error window offset
pub const MEMAC_TX_BUF_ERR_OFFSET: usize = 0x1_0000;

/// Transmit packet descriptor queue offset
pub const MEMAC_TX_PDQ_OFFSET: usize = 0x2_0000;

/// Receive buffer offset from the MEMAC base
pub const MEMAC_RX_BUF_OFFSET: usize = 0x4_0000;

/// Receive buffer error window offset
pub const MEMAC_RX_BUF_ERR_OFFSET: usize = 0x5_0000;

/// Receive packet descriptor queue offset
pub const MEMAC_RX_PDQ_OFFSET: usize = 0x6_0000;

/// MDIO window offset
pub const MEMAC_MDIO_OFFSET: usize = 0x8_0000;

/// Default MicroBlaze MCS IOModule base address
pub const IOMODULE_BASE: usize = 0x8000_0000;

/// IOModule GPO1 register offset
pub const IOMODULE_GPO1_OFFSET: usize = 0x10;

/// IOModule GPI1 register offset
pub const IOMODULE_GPI1_OFFSET: usize = 0x20;

/// TX options written at init: preamble length 8, auto preamble, auto FCS
pub const TX_OPTIONS_DEFAULT: u32 = 0b11_1000;

/// Maximum polls of the RX free-queue ready flag before giving up
pub const RX_RELEASE_SPIN_LIMIT: u32 = 100_000;

// =============================================================================
// PHY Timing
// =============================================================================

/// PHY reset assertion time in milliseconds (datasheet minimum is 10 ms)
pub const PHY_RESET_ASSERT_MS: u32 = 15;

/// PHY settle time after reset release in milliseconds (datasheet: 30 ms)
pub const PHY_RESET_SETTLE_MS: u32 = 45;

// =============================================================================
// Identity Defaults
// =============================================================================

/// Default local MAC address
pub const DEFAULT_MAC_ADDR: [u8; 6] = [0xEE, 0xEE, 0xEE, 0xEE, 0xEE, 0xEE];

/// Default local IPv4 address
pub const DEFAULT_IP_ADDR: [u8; 4] = [192, 168, 1, 155];
