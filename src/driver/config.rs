//! Configuration types for the MEMAC raw packet engine

use crate::driver::error::{ConfigError, ConfigResult};
use crate::internal::constants::{
    DEFAULT_IP_ADDR, DEFAULT_MAC_ADDR, DEFAULT_RX_BUFFER_SIZE, DEFAULT_TX_BUFFER_SIZE,
    IOMODULE_BASE, IOMODULE_GPI1_OFFSET, IOMODULE_GPO1_OFFSET, IP_PROTOCOL_ICMP, IP_PROTOCOL_UDP,
    MAX_BUFFER_SIZE, MEMAC_BASE, MEMAC_MDIO_OFFSET, MEMAC_RX_BUF_OFFSET, MEMAC_RX_PDQ_OFFSET,
    MEMAC_TX_BUF_OFFSET, MEMAC_TX_PDQ_OFFSET, MIN_BUFFER_SIZE,
};
use crate::wire::{Identity, Ipv4Address, MacAddress};

// =============================================================================
// Memory Map
// =============================================================================

/// Physical placement of the MEMAC block and the MCS IOModule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemoryMap {
    /// MEMAC base address
    pub memac_base: usize,
    /// MicroBlaze MCS IOModule base address
    pub iomodule_base: usize,
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMap {
    /// Default MicroBlaze MCS placement
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memac_base: MEMAC_BASE,
            iomodule_base: IOMODULE_BASE,
        }
    }

    /// Transmit buffer address
    #[must_use]
    pub const fn tx_buffer(&self) -> usize {
        self.memac_base + MEMAC_TX_BUF_OFFSET
    }

    /// Transmit packet descriptor queue address
    #[must_use]
    pub const fn tx_pdq(&self) -> usize {
        self.memac_base + MEMAC_TX_PDQ_OFFSET
    }

    /// Receive buffer address
    #[must_use]
    pub const fn rx_buffer(&self) -> usize {
        self.memac_base + MEMAC_RX_BUF_OFFSET
    }

    /// Receive packet descriptor queue address
    #[must_use]
    pub const fn rx_pdq(&self) -> usize {
        self.memac_base + MEMAC_RX_PDQ_OFFSET
    }

    /// MDIO register window address
    #[must_use]
    pub const fn mdio(&self) -> usize {
        self.memac_base + MEMAC_MDIO_OFFSET
    }

    /// IOModule GPO1 (MAC control word) address
    #[must_use]
    pub const fn gpo1(&self) -> usize {
        self.iomodule_base + IOMODULE_GPO1_OFFSET
    }

    /// IOModule GPI1 (queue ready flags, RX speed) address
    #[must_use]
    pub const fn gpi1(&self) -> usize {
        self.iomodule_base + IOMODULE_GPI1_OFFSET
    }
}

// =============================================================================
// Protocol Selection
// =============================================================================

/// Set of enabled protocol handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Protocols(u8);

impl Protocols {
    /// No handlers
    pub const NONE: Self = Self(0);
    /// ARP responder
    pub const ARP: Self = Self(1 << 0);
    /// IPv4 demultiplexer
    pub const IP: Self = Self(1 << 1);
    /// ICMP echo responder (requires [`Protocols::IP`])
    pub const ICMP: Self = Self(1 << 2);
    /// UDP endpoint (requires [`Protocols::IP`])
    pub const UDP: Self = Self(1 << 3);
    /// Every handler
    pub const ALL: Self = Self(Self::ARP.0 | Self::IP.0 | Self::ICMP.0 | Self::UDP.0);

    /// Whether every handler in `other` is enabled
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no handler is enabled
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Union of two sets
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Set with the handlers in `other` removed
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl Default for Protocols {
    fn default() -> Self {
        Self::ALL
    }
}

impl core::ops::BitOr for Protocols {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Transport protocols carried over IPv4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IpProtocol {
    /// ICMP
    Icmp = IP_PROTOCOL_ICMP,
    /// UDP
    Udp = IP_PROTOCOL_UDP,
}

impl IpProtocol {
    /// IP header protocol number
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }
}

/// Order in which the IP demultiplexer offers packets to its handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IpDispatchOrder {
    /// ICMP then UDP
    #[default]
    IcmpFirst,
    /// UDP then ICMP
    UdpFirst,
}

impl IpDispatchOrder {
    /// Handlers in dispatch order
    #[must_use]
    pub const fn sequence(self) -> [IpProtocol; 2] {
        match self {
            IpDispatchOrder::IcmpFirst => [IpProtocol::Icmp, IpProtocol::Udp],
            IpDispatchOrder::UdpFirst => [IpProtocol::Udp, IpProtocol::Icmp],
        }
    }
}

// =============================================================================
// Engine Configuration
// =============================================================================

/// Complete MEMAC engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemacConfig {
    /// Local MAC address
    pub mac_address: [u8; 6],
    /// Local IPv4 address
    pub ip_address: [u8; 4],
    /// Transmit ring size in bytes (power of two)
    pub tx_buffer_size: u16,
    /// Receive ring size in bytes (power of two)
    pub rx_buffer_size: u16,
    /// Enabled protocol handlers
    pub protocols: Protocols,
    /// IP handler order
    pub ip_dispatch: IpDispatchOrder,
    /// Local UDP port accepted by the endpoint; `None` accepts nothing
    pub udp_port: Option<u16>,
    /// Hardware placement
    pub memory_map: MemoryMap,
}

impl Default for MemacConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MemacConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mac_address: DEFAULT_MAC_ADDR,
            ip_address: DEFAULT_IP_ADDR,
            tx_buffer_size: DEFAULT_TX_BUFFER_SIZE,
            rx_buffer_size: DEFAULT_RX_BUFFER_SIZE,
            protocols: Protocols::ALL,
            ip_dispatch: IpDispatchOrder::IcmpFirst,
            udp_port: None,
            memory_map: MemoryMap::new(),
        }
    }

    /// Set the local MAC address
    #[must_use]
    pub const fn with_mac_address(mut self, addr: [u8; 6]) -> Self {
        self.mac_address = addr;
        self
    }

    /// Set the local IPv4 address
    #[must_use]
    pub const fn with_ip_address(mut self, addr: [u8; 4]) -> Self {
        self.ip_address = addr;
        self
    }

    /// Set both ring buffer sizes
    #[must_use]
    pub const fn with_buffer_sizes(mut self, tx: u16, rx: u16) -> Self {
        self.tx_buffer_size = tx;
        self.rx_buffer_size = rx;
        self
    }

    /// Select the enabled protocol handlers
    #[must_use]
    pub const fn with_protocols(mut self, protocols: Protocols) -> Self {
        self.protocols = protocols;
        self
    }

    /// Set the IP dispatch order
    #[must_use]
    pub const fn with_ip_dispatch(mut self, order: IpDispatchOrder) -> Self {
        self.ip_dispatch = order;
        self
    }

    /// Bind the UDP endpoint to a local port
    #[must_use]
    pub const fn with_udp_port(mut self, port: u16) -> Self {
        self.udp_port = Some(port);
        self
    }

    /// Override the hardware placement
    #[must_use]
    pub const fn with_memory_map(mut self, map: MemoryMap) -> Self {
        self.memory_map = map;
        self
    }

    /// Local identity derived from the configured addresses
    #[must_use]
    pub const fn identity(&self) -> Identity {
        Identity::new(MacAddress(self.mac_address), Ipv4Address(self.ip_address))
    }

    /// Check the configuration for consistency
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidBufferSize`] for a ring size that is not a
    ///   power of two between 64 and 32768 bytes
    /// - [`ConfigError::NoProtocols`] when no handler is enabled
    /// - [`ConfigError::InvalidConfig`] when ICMP or UDP is enabled without IP
    pub fn validate(&self) -> ConfigResult<()> {
        validate_buffer_size(self.tx_buffer_size)?;
        validate_buffer_size(self.rx_buffer_size)?;

        if self.protocols.is_empty() {
            return Err(ConfigError::NoProtocols);
        }
        let needs_ip = self.protocols.contains(Protocols::ICMP)
            || self.protocols.contains(Protocols::UDP);
        if needs_ip && !self.protocols.contains(Protocols::IP) {
            return Err(ConfigError::InvalidConfig);
        }
        Ok(())
    }
}

/// Check a ring buffer size
///
/// # Errors
///
/// [`ConfigError::InvalidBufferSize`] unless `size` is a power of two in
/// `64..=32768`.
pub const fn validate_buffer_size(size: u16) -> ConfigResult<()> {
    if size.is_power_of_two() && size >= MIN_BUFFER_SIZE && size <= MAX_BUFFER_SIZE {
        Ok(())
    } else {
        Err(ConfigError::InvalidBufferSize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Default Value Tests
    // =========================================================================

    #[test]
    fn config_default_values() {
        let config = MemacConfig::new();

        assert_eq!(config.mac_address, [0xEE; 6]);
        assert_eq!(config.ip_address, [192, 168, 1, 155]);
        assert_eq!(config.tx_buffer_size, 8192);
        assert_eq!(config.rx_buffer_size, 8192);
        assert_eq!(config.protocols, Protocols::ALL);
        assert_eq!(config.ip_dispatch, IpDispatchOrder::IcmpFirst);
        assert_eq!(config.udp_port, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_default_trait_matches_new() {
        assert_eq!(MemacConfig::default(), MemacConfig::new());
    }

    #[test]
    fn memory_map_addresses() {
        let map = MemoryMap::new();
        assert_eq!(map.tx_buffer(), 0xC000_0000);
        assert_eq!(map.tx_pdq(), 0xC002_0000);
        assert_eq!(map.rx_buffer(), 0xC004_0000);
        assert_eq!(map.rx_pdq(), 0xC006_0000);
        assert_eq!(map.mdio(), 0xC008_0000);
        assert_eq!(map.gpo1(), 0x8000_0010);
        assert_eq!(map.gpi1(), 0x8000_0020);
    }

    // =========================================================================
    // Builder Pattern Tests
    // =========================================================================

    #[test]
    fn config_builder_chaining() {
        let config = MemacConfig::new()
            .with_mac_address([0x02, 0, 0, 0x11, 0x22, 0x33])
            .with_ip_address([10, 0, 0, 2])
            .with_buffer_sizes(4096, 16384)
            .with_protocols(Protocols::ARP | Protocols::IP | Protocols::UDP)
            .with_ip_dispatch(IpDispatchOrder::UdpFirst)
            .with_udp_port(5000);

        assert_eq!(config.mac_address, [0x02, 0, 0, 0x11, 0x22, 0x33]);
        assert_eq!(config.identity().ip, Ipv4Address::new(10, 0, 0, 2));
        assert_eq!(config.tx_buffer_size, 4096);
        assert_eq!(config.rx_buffer_size, 16384);
        assert!(!config.protocols.contains(Protocols::ICMP));
        assert_eq!(config.udp_port, Some(5000));
        assert!(config.validate().is_ok());
    }

    // =========================================================================
    // Validation Tests
    // =========================================================================

    #[test]
    fn buffer_size_must_be_power_of_two_in_range() {
        assert!(validate_buffer_size(64).is_ok());
        assert!(validate_buffer_size(32768).is_ok());
        assert_eq!(validate_buffer_size(32), Err(ConfigError::InvalidBufferSize));
        assert_eq!(validate_buffer_size(3000), Err(ConfigError::InvalidBufferSize));
        assert_eq!(validate_buffer_size(0), Err(ConfigError::InvalidBufferSize));

        let config = MemacConfig::new().with_buffer_sizes(8192, 1000);
        assert_eq!(config.validate(), Err(ConfigError::InvalidBufferSize));
    }

    #[test]
    fn empty_protocol_set_is_rejected() {
        let config = MemacConfig::new().with_protocols(Protocols::NONE);
        assert_eq!(config.validate(), Err(ConfigError::NoProtocols));
    }

    #[test]
    fn ip_sub_protocols_require_ip() {
        let config = MemacConfig::new().with_protocols(Protocols::ARP | Protocols::ICMP);
        assert_eq!(config.validate(), Err(ConfigError::InvalidConfig));

        let config = MemacConfig::new().with_protocols(Protocols::ALL.without(Protocols::IP));
        assert_eq!(config.validate(), Err(ConfigError::InvalidConfig));

        let config = MemacConfig::new().with_protocols(Protocols::ARP);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn dispatch_order_sequence() {
        assert_eq!(
            IpDispatchOrder::default().sequence(),
            [IpProtocol::Icmp, IpProtocol::Udp]
        );
        assert_eq!(
            IpDispatchOrder::UdpFirst.sequence(),
            [IpProtocol::Udp, IpProtocol::Icmp]
        );
        assert_eq!(IpProtocol::Udp.number(), 17);
    }
}
