//! IPv4 demultiplexer
//!
//! Validates the IPv4 header once and hands the frame to the enabled
//! upper-layer handlers in the configured order. Handlers receive frames
//! whose version, header length and header checksum are already known good.

use crate::descriptor::{RxDescriptor, TxAllocator, TxDescriptor, TxRelease};
use crate::driver::config::{IpDispatchOrder, IpProtocol};
use crate::driver::error::ConfigResult;
use crate::driver::transport::Transport;
use crate::internal::constants::{ETH_HEADER_LEN, ETHERTYPE_IPV4, IP_PAYLOAD_OFFSET};
use crate::protocol::{Icmp, Protocol, RxOutcome, Udp};
use crate::wire::frame::{FrameRead, RxFrame};
use crate::wire::header::{ip_header_checksum, ip_header_len, offset};
use crate::wire::Identity;

/// IPv4 diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IpStats {
    /// Frames carrying the IPv4 EtherType
    pub received: u32,
    /// Headers rejected before dispatch
    pub bad_header: u32,
    /// Valid packets no handler claimed
    pub unhandled: u32,
}

/// IPv4 layer owning the ICMP and UDP handlers
#[derive(Debug)]
pub struct Ip {
    order: IpDispatchOrder,
    icmp: Option<Icmp>,
    udp: Option<Udp>,
    stats: IpStats,
}

impl Ip {
    /// Create the IPv4 layer with the requested upper-layer handlers
    ///
    /// ICMP is allocated first so slot offsets stay stable for a given
    /// configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::TxBufferExhausted`](crate::ConfigError::TxBufferExhausted)
    /// when a handler's transmit slot does not fit.
    pub fn new(
        alloc: &mut TxAllocator,
        local: Identity,
        order: IpDispatchOrder,
        icmp: bool,
        udp: Option<Option<u16>>,
    ) -> ConfigResult<Self> {
        let icmp = if icmp {
            Some(Icmp::new(alloc, local)?)
        } else {
            None
        };
        let udp = match udp {
            Some(port) => Some(Udp::new(alloc, local, port)?),
            None => None,
        };

        Ok(Self {
            order,
            icmp,
            udp,
            stats: IpStats::default(),
        })
    }

    /// ICMP handler, if enabled
    pub fn icmp(&self) -> Option<&Icmp> {
        self.icmp.as_ref()
    }

    /// UDP handler, if enabled
    pub fn udp(&self) -> Option<&Udp> {
        self.udp.as_ref()
    }

    /// Mutable UDP handler, if enabled
    pub fn udp_mut(&mut self) -> Option<&mut Udp> {
        self.udp.as_mut()
    }

    /// Diagnostics
    pub fn stats(&self) -> IpStats {
        self.stats
    }

    fn dispatch<T: Transport + ?Sized>(
        &mut self,
        protocol: IpProtocol,
        bus: &mut T,
        desc: &RxDescriptor,
    ) -> RxOutcome {
        match protocol {
            IpProtocol::Icmp => self
                .icmp
                .as_mut()
                .map_or(RxOutcome::NotMine, |h| h.on_receive(bus, desc)),
            IpProtocol::Udp => self
                .udp
                .as_mut()
                .map_or(RxOutcome::NotMine, |h| h.on_receive(bus, desc)),
        }
    }
}

impl Protocol for Ip {
    fn on_receive<T: Transport + ?Sized>(
        &mut self,
        bus: &mut T,
        desc: &RxDescriptor,
    ) -> RxOutcome {
        {
            let rx = RxFrame::new(&*bus, desc);
            if rx.len() < ETH_HEADER_LEN || rx.get_u16(offset::ETH_TYPE) != ETHERTYPE_IPV4 {
                return RxOutcome::NotMine;
            }
            self.stats.received += 1;

            let ver_ihl = rx.get_u8(offset::IP_VER_IHL);
            let ihl = ip_header_len(&rx);
            let valid = rx.len() >= IP_PAYLOAD_OFFSET
                && ver_ihl >> 4 == 4
                && ihl >= 20
                && ETH_HEADER_LEN + ihl <= rx.len()
                && ip_header_checksum(&rx) == rx.get_u16(offset::IP_CHECKSUM);
            if !valid {
                #[cfg(feature = "defmt")]
                defmt::debug!("IPv4 header rejected, ver/ihl {=u8:#04x}", ver_ihl);
                self.stats.bad_header += 1;
                return RxOutcome::Bad;
            }
        }

        for protocol in self.order.sequence() {
            let outcome = self.dispatch(protocol, bus, desc);
            if outcome.is_claimed() {
                return outcome;
            }
        }
        self.stats.unhandled += 1;
        RxOutcome::NotMine
    }

    fn on_transmit_free(&mut self, desc: &TxDescriptor) -> TxRelease {
        if let Some(icmp) = self.icmp.as_mut()
            && icmp.on_transmit_free(desc).is_claimed()
        {
            return TxRelease::Claimed;
        }
        match self.udp.as_mut() {
            Some(udp) => udp.on_transmit_free(desc),
            None => TxRelease::NotMine,
        }
    }

    fn try_send<T: Transport + ?Sized>(&mut self, bus: &mut T) -> bool {
        let mut sent = false;
        if let Some(icmp) = self.icmp.as_mut() {
            sent |= icmp.try_send(bus);
        }
        if let Some(udp) = self.udp.as_mut() {
            sent |= udp.try_send(bus);
        }
        sent
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::testing::{MockTransport, icmp_echo_request, ipv4_frame, udp_datagram};
    use crate::wire::{Ipv4Address, MacAddress};

    const LOCAL_MAC: MacAddress = MacAddress([0x02, 0x00, 0x00, 0xAA, 0xBB, 0xCC]);
    const LOCAL_IP: Ipv4Address = Ipv4Address([192, 168, 1, 155]);
    const PEER_MAC: MacAddress = MacAddress([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    const PEER_IP: Ipv4Address = Ipv4Address([192, 168, 1, 10]);

    fn setup(icmp: bool, udp: Option<Option<u16>>) -> (MockTransport, Ip) {
        let bus = MockTransport::new(8192, 8192);
        let mut alloc = TxAllocator::new(8192);
        let local = Identity::new(LOCAL_MAC, LOCAL_IP);
        let ip = Ip::new(&mut alloc, local, IpDispatchOrder::IcmpFirst, icmp, udp).unwrap();
        (bus, ip)
    }

    fn ping() -> std::vec::Vec<u8> {
        icmp_echo_request(PEER_MAC, PEER_IP, LOCAL_MAC, LOCAL_IP, 1, 1, b"ping")
    }

    #[test]
    fn dispatches_icmp_and_udp() {
        let (mut bus, mut ip) = setup(true, Some(Some(5000)));

        let rx = bus.inject(&ping());
        assert_eq!(ip.on_receive(&mut bus, &rx), RxOutcome::Success);
        assert_eq!(ip.icmp().unwrap().stats().received, 1);

        let frame = udp_datagram(PEER_MAC, PEER_IP, LOCAL_MAC, LOCAL_IP, 1, 5000, b"hi");
        let rx = bus.inject(&frame);
        assert_eq!(ip.on_receive(&mut bus, &rx), RxOutcome::Success);
        assert!(ip.udp().unwrap().has_datagram());
        assert_eq!(ip.stats().received, 2);
    }

    #[test]
    fn corrupt_header_checksum_is_not_dispatched() {
        let (mut bus, mut ip) = setup(true, None);
        let mut frame = ping();
        frame[24] ^= 0x10;
        let rx = bus.inject(&frame);

        assert_eq!(ip.on_receive(&mut bus, &rx), RxOutcome::Bad);
        assert_eq!(ip.icmp().unwrap().stats().received, 0);
        assert_eq!(ip.stats().bad_header, 1);
    }

    #[test]
    fn malformed_headers_are_bad() {
        let (mut bus, mut ip) = setup(true, None);

        // IPv6 version nibble
        let mut v6 = ping();
        v6[14] = 0x65;
        let rx = bus.inject(&v6);
        assert_eq!(ip.on_receive(&mut bus, &rx), RxOutcome::Bad);

        // IHL below the minimum
        let mut short_ihl = ping();
        short_ihl[14] = 0x44;
        let rx = bus.inject(&short_ihl);
        assert_eq!(ip.on_receive(&mut bus, &rx), RxOutcome::Bad);

        let truncated = ping();
        let rx = bus.inject(&truncated[..30]);
        assert_eq!(ip.on_receive(&mut bus, &rx), RxOutcome::Bad);
    }

    #[test]
    fn unclaimed_protocol_is_not_mine() {
        let (mut bus, mut ip) = setup(true, None);

        // TCP
        let frame = ipv4_frame(PEER_MAC, PEER_IP, LOCAL_MAC, LOCAL_IP, 6, 0, &[0; 20]);
        let rx = bus.inject(&frame);
        assert_eq!(ip.on_receive(&mut bus, &rx), RxOutcome::NotMine);

        // UDP with no UDP handler
        let frame = udp_datagram(PEER_MAC, PEER_IP, LOCAL_MAC, LOCAL_IP, 1, 2, b"");
        let rx = bus.inject(&frame);
        assert_eq!(ip.on_receive(&mut bus, &rx), RxOutcome::NotMine);
        assert_eq!(ip.stats().unhandled, 2);
    }

    #[test]
    fn non_ipv4_is_not_mine() {
        let (mut bus, mut ip) = setup(true, None);
        let mut frame = ping();
        frame[12] = 0x86;
        frame[13] = 0xDD;
        let rx = bus.inject(&frame);
        assert_eq!(ip.on_receive(&mut bus, &rx), RxOutcome::NotMine);
        assert_eq!(ip.stats().received, 0);
    }

    #[test]
    fn udp_first_order_still_reaches_icmp() {
        let bus_size = 8192;
        let mut bus = MockTransport::new(bus_size, bus_size);
        let mut alloc = TxAllocator::new(bus_size);
        let local = Identity::new(LOCAL_MAC, LOCAL_IP);
        let mut ip =
            Ip::new(&mut alloc, local, IpDispatchOrder::UdpFirst, true, Some(Some(7))).unwrap();

        let rx = bus.inject(&ping());
        assert_eq!(ip.on_receive(&mut bus, &rx), RxOutcome::Success);
        assert_eq!(ip.udp().unwrap().stats().received, 0);
    }

    #[test]
    fn transmit_free_routes_to_owner() {
        let (mut bus, mut ip) = setup(true, Some(None));
        let rx = bus.inject(&ping());
        ip.on_receive(&mut bus, &rx);

        let to = crate::protocol::UdpEndpoint::new(PEER_MAC, PEER_IP, 9);
        ip.udp_mut().unwrap().send(&mut bus, to, 9, b"x").unwrap();

        assert!(ip.try_send(&mut bus));
        assert_eq!(bus.submitted().len(), 2);
        for desc in [bus.submitted()[0], bus.submitted()[1]] {
            assert!(ip.on_transmit_free(&desc).is_claimed());
        }
        assert!(!ip.on_transmit_free(&TxDescriptor::new(8000, 4)).is_claimed());
    }
}
