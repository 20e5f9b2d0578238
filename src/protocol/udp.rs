//! UDP endpoint
//!
//! A single bound port with a one-datagram inbox, plus one transmit slot for
//! outbound datagrams. Inbound datagrams are copied out of the receive ring
//! so the frame can be released immediately.

use crate::descriptor::{RxDescriptor, SlotState, TxAllocator, TxDescriptor, TxRelease, TxSlot};
use crate::driver::error::{ConfigResult, TxError, TxResult};
use crate::driver::transport::Transport;
use crate::internal::constants::{
    ETH_HEADER_LEN, IP_PROTOCOL_UDP, UDP_HEADER_LEN, UDP_MAX_PAYLOAD, UDP_SLOT_LEN,
};
use crate::protocol::{Protocol, RxOutcome};
use crate::wire::frame::{FrameRead, RxFrame, TxFrame};
use crate::wire::header::{
    compute_ip_checksum, compute_udp_checksum, init_udp_header, ip_header_len, offset, udp_sum,
};
use crate::wire::{Identity, Ipv4Address, MacAddress};

/// Remote end of a datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UdpEndpoint {
    /// Hardware address
    pub mac: MacAddress,
    /// IPv4 address
    pub ip: Ipv4Address,
    /// UDP port
    pub port: u16,
}

impl UdpEndpoint {
    /// Create an endpoint
    #[must_use]
    pub const fn new(mac: MacAddress, ip: Ipv4Address, port: u16) -> Self {
        Self { mac, ip, port }
    }
}

/// Metadata of a received datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UdpMeta {
    /// Sender; replying to it reaches the right host without ARP
    pub source: UdpEndpoint,
    /// Local port the datagram was addressed to
    pub dst_port: u16,
    /// Payload length in bytes
    pub len: usize,
}

/// UDP diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UdpStats {
    /// IPv4 packets carrying UDP
    pub received: u32,
    /// Datagrams placed in the inbox
    pub delivered: u32,
    /// Datagrams handed to the hardware
    pub sent: u32,
}

/// UDP endpoint state
#[derive(Debug)]
pub struct Udp {
    local: Identity,
    port: Option<u16>,
    slot: TxSlot,
    inbox: [u8; UDP_MAX_PAYLOAD as usize],
    pending: Option<UdpMeta>,
    stats: UdpStats,
}

impl Udp {
    /// Claim a transmit slot for outbound datagrams
    ///
    /// With `port` set to `None` every inbound datagram is ignored.
    ///
    /// # Errors
    ///
    /// [`ConfigError::TxBufferExhausted`](crate::ConfigError::TxBufferExhausted)
    /// when the transmit buffer has no room for the slot.
    pub fn new(alloc: &mut TxAllocator, local: Identity, port: Option<u16>) -> ConfigResult<Self> {
        let desc = alloc.alloc(UDP_SLOT_LEN)?;

        #[cfg(feature = "defmt")]
        defmt::info!("UDP slot at {=u16}, {=u16} bytes", desc.offset, desc.len);

        Ok(Self {
            local,
            port,
            slot: TxSlot::new(desc),
            inbox: [0; UDP_MAX_PAYLOAD as usize],
            pending: None,
            stats: UdpStats::default(),
        })
    }

    /// Bound local port
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Bind to a different local port, or stop accepting with `None`
    pub fn bind(&mut self, port: Option<u16>) {
        self.port = port;
    }

    /// Transmit slot state
    pub fn slot_state(&self) -> SlotState {
        self.slot.state()
    }

    /// Diagnostics
    pub fn stats(&self) -> UdpStats {
        self.stats
    }

    /// Whether a received datagram waits in the inbox
    pub fn has_datagram(&self) -> bool {
        self.pending.is_some()
    }

    /// Build a datagram to `to` in the transmit slot
    ///
    /// The frame goes out on a later [`try_send`](Protocol::try_send).
    ///
    /// # Errors
    ///
    /// - [`TxError::SlotBusy`] while the previous datagram is not yet sent
    /// - [`TxError::FrameTooLarge`] when `payload` exceeds one unfragmented datagram
    pub fn send<T: Transport + ?Sized>(
        &mut self,
        bus: &mut T,
        to: UdpEndpoint,
        src_port: u16,
        payload: &[u8],
    ) -> TxResult<()> {
        if !self.slot.is_free() {
            return Err(TxError::SlotBusy);
        }
        if payload.len() > UDP_MAX_PAYLOAD as usize {
            return Err(TxError::FrameTooLarge);
        }
        let len = payload.len() as u16;

        let mut frame = TxFrame::new(bus, self.slot.descriptor());
        let at = init_udp_header(&mut frame, &self.local, to.mac, to.ip, src_port, to.port, len);
        frame.put_bytes(at, payload);
        compute_ip_checksum(&mut frame);
        compute_udp_checksum(&mut frame, len);

        self.slot.mark_pending(at + len);
        Ok(())
    }

    /// Take the waiting datagram, copying as much payload as fits in `buf`
    ///
    /// The returned [`UdpMeta::len`] is the full payload length.
    pub fn recv(&mut self, buf: &mut [u8]) -> Option<UdpMeta> {
        let meta = self.pending.take()?;
        let n = meta.len.min(buf.len());
        buf[..n].copy_from_slice(&self.inbox[..n]);
        Some(meta)
    }
}

impl Protocol for Udp {
    fn on_receive<T: Transport + ?Sized>(
        &mut self,
        bus: &mut T,
        desc: &RxDescriptor,
    ) -> RxOutcome {
        let rx = RxFrame::new(&*bus, desc);
        if rx.get_u8(offset::IP_PROTOCOL) != IP_PROTOCOL_UDP {
            return RxOutcome::NotMine;
        }
        self.stats.received += 1;

        if rx.get_ip(offset::IP_DST) != self.local.ip {
            return RxOutcome::Ignore;
        }

        let ihl = ip_header_len(&rx);
        let total_len = rx.get_u16(offset::IP_TOTAL_LEN);
        if total_len < ihl + UDP_HEADER_LEN
            || total_len > rx.len().saturating_sub(ETH_HEADER_LEN)
        {
            return RxOutcome::Bad;
        }
        let start = ETH_HEADER_LEN + ihl;
        let udp_len = rx.get_u16(start + 4);
        if udp_len < UDP_HEADER_LEN || udp_len > total_len - ihl {
            return RxOutcome::Bad;
        }

        let src_ip = rx.get_ip(offset::IP_SRC);
        if rx.get_u16(start + 6) != 0
            && !udp_sum(&rx, start, udp_len, src_ip, self.local.ip).is_valid()
        {
            #[cfg(feature = "defmt")]
            defmt::debug!("UDP checksum mismatch from {}", src_ip.octets());
            return RxOutcome::Bad;
        }

        let dst_port = rx.get_u16(start + 2);
        if self.port != Some(dst_port) {
            return RxOutcome::Ignore;
        }
        let len = udp_len - UDP_HEADER_LEN;
        if self.pending.is_some() || len > UDP_MAX_PAYLOAD {
            #[cfg(feature = "defmt")]
            defmt::debug!("UDP datagram dropped, {=u16} byte payload", len);
            return RxOutcome::Drop;
        }

        rx.get_bytes(start + UDP_HEADER_LEN, &mut self.inbox[..len as usize]);
        self.pending = Some(UdpMeta {
            source: UdpEndpoint::new(rx.get_mac(offset::ETH_SRC), src_ip, rx.get_u16(start)),
            dst_port,
            len: len as usize,
        });
        self.stats.delivered += 1;
        RxOutcome::Success
    }

    fn on_transmit_free(&mut self, desc: &TxDescriptor) -> TxRelease {
        self.slot.release(desc)
    }

    fn try_send<T: Transport + ?Sized>(&mut self, bus: &mut T) -> bool {
        let sent = self.slot.try_submit(bus);
        if sent {
            self.stats.sent += 1;
        }
        sent
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use smoltcp::wire::{IpAddress, Ipv4Packet, UdpPacket};

    use super::*;
    use crate::testing::{MockTransport, ipv4_frame, set_ip_total_len, udp_datagram};

    const LOCAL_MAC: MacAddress = MacAddress([0x02, 0x00, 0x00, 0xAA, 0xBB, 0xCC]);
    const LOCAL_IP: Ipv4Address = Ipv4Address([192, 168, 1, 155]);
    const PEER_MAC: MacAddress = MacAddress([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    const PEER_IP: Ipv4Address = Ipv4Address([192, 168, 1, 10]);

    fn setup(port: Option<u16>) -> (MockTransport, Udp) {
        let bus = MockTransport::new(4096, 4096);
        let mut alloc = TxAllocator::new(4096);
        let udp = Udp::new(&mut alloc, Identity::new(LOCAL_MAC, LOCAL_IP), port).unwrap();
        (bus, udp)
    }

    fn datagram(dst_port: u16, data: &[u8]) -> std::vec::Vec<u8> {
        udp_datagram(PEER_MAC, PEER_IP, LOCAL_MAC, LOCAL_IP, 6000, dst_port, data)
    }

    #[test]
    fn delivers_datagram_to_bound_port() {
        let (mut bus, mut udp) = setup(Some(7));
        let rx = bus.inject(&datagram(7, b"echo me"));

        assert_eq!(udp.on_receive(&mut bus, &rx), RxOutcome::Success);
        assert!(udp.has_datagram());

        let mut buf = [0u8; 64];
        let meta = udp.recv(&mut buf).unwrap();
        assert_eq!(meta.len, 7);
        assert_eq!(&buf[..7], b"echo me");
        assert_eq!(meta.source, UdpEndpoint::new(PEER_MAC, PEER_IP, 6000));
        assert_eq!(meta.dst_port, 7);
        assert!(udp.recv(&mut buf).is_none());
    }

    #[test]
    fn recv_truncates_to_buffer() {
        let (mut bus, mut udp) = setup(Some(7));
        let rx = bus.inject(&datagram(7, b"0123456789"));
        udp.on_receive(&mut bus, &rx);

        let mut buf = [0u8; 4];
        let meta = udp.recv(&mut buf).unwrap();
        assert_eq!(meta.len, 10);
        assert_eq!(&buf, b"0123");
    }

    #[test]
    fn unbound_or_other_port_is_ignored() {
        let (mut bus, mut udp) = setup(None);
        let rx = bus.inject(&datagram(7, b"x"));
        assert_eq!(udp.on_receive(&mut bus, &rx), RxOutcome::Ignore);

        udp.bind(Some(8));
        let rx = bus.inject(&datagram(7, b"x"));
        assert_eq!(udp.on_receive(&mut bus, &rx), RxOutcome::Ignore);
        assert!(!udp.has_datagram());
    }

    #[test]
    fn full_inbox_drops() {
        let (mut bus, mut udp) = setup(Some(7));
        let rx = bus.inject(&datagram(7, b"first"));
        assert_eq!(udp.on_receive(&mut bus, &rx), RxOutcome::Success);
        let rx = bus.inject(&datagram(7, b"second"));
        assert_eq!(udp.on_receive(&mut bus, &rx), RxOutcome::Drop);

        let mut buf = [0u8; 16];
        assert_eq!(udp.recv(&mut buf).unwrap().len, 5);
        assert_eq!(udp.stats().delivered, 1);
    }

    #[test]
    fn corrupt_checksum_is_bad_zero_checksum_is_accepted() {
        let (mut bus, mut udp) = setup(Some(7));
        let mut frame = datagram(7, b"data");
        frame[42] ^= 0x01;
        let rx = bus.inject(&frame);
        assert_eq!(udp.on_receive(&mut bus, &rx), RxOutcome::Bad);

        // Zero means the sender did not compute a checksum
        frame[40] = 0;
        frame[41] = 0;
        let rx = bus.inject(&frame);
        assert_eq!(udp.on_receive(&mut bus, &rx), RxOutcome::Success);
    }

    #[test]
    fn bad_lengths_are_bad() {
        let (mut bus, mut udp) = setup(Some(7));

        let mut short = datagram(7, b"data");
        short[38] = 0;
        short[39] = 4;
        let rx = bus.inject(&short);
        assert_eq!(udp.on_receive(&mut bus, &rx), RxOutcome::Bad);

        let mut long = datagram(7, b"data");
        long[39] = 200;
        let rx = bus.inject(&long);
        assert_eq!(udp.on_receive(&mut bus, &rx), RxOutcome::Bad);
    }

    #[test]
    fn total_length_past_frame_end_is_bad() {
        let (mut bus, mut udp) = setup(Some(7));
        for total_len in [0xFFFF, 0xFFF3] {
            let mut frame = datagram(7, b"data");
            set_ip_total_len(&mut frame, total_len);
            let rx = bus.inject(&frame);
            assert_eq!(udp.on_receive(&mut bus, &rx), RxOutcome::Bad);
        }
        assert!(!udp.has_datagram());
    }

    #[test]
    fn payload_larger_than_inbox_drops() {
        let (mut bus, mut udp) = setup(Some(7));
        let rx = bus.inject(&datagram(7, &[0xAB; 1600]));
        assert_eq!(udp.on_receive(&mut bus, &rx), RxOutcome::Drop);
        assert!(!udp.has_datagram());

        let rx = bus.inject(&datagram(7, &[0xCD; 1472]));
        assert_eq!(udp.on_receive(&mut bus, &rx), RxOutcome::Success);
        let mut buf = [0u8; 1500];
        assert_eq!(udp.recv(&mut buf).unwrap().len, 1472);
        assert_eq!(buf[1471], 0xCD);
        assert_eq!(udp.stats().delivered, 1);
    }

    #[test]
    fn foreign_destination_and_other_protocols() {
        let (mut bus, mut udp) = setup(Some(7));
        let frame = udp_datagram(PEER_MAC, PEER_IP, LOCAL_MAC, Ipv4Address::new(10, 0, 0, 1), 1, 7, b"");
        let rx = bus.inject(&frame);
        assert_eq!(udp.on_receive(&mut bus, &rx), RxOutcome::Ignore);

        let icmp = ipv4_frame(PEER_MAC, PEER_IP, LOCAL_MAC, LOCAL_IP, 1, 0, &[8, 0, 0, 0]);
        let rx = bus.inject(&icmp);
        assert_eq!(udp.on_receive(&mut bus, &rx), RxOutcome::NotMine);
    }

    #[test]
    fn send_builds_valid_datagram() {
        let (mut bus, mut udp) = setup(Some(7));
        let to = UdpEndpoint::new(PEER_MAC, PEER_IP, 9000);
        udp.send(&mut bus, to, 7, b"telemetry").unwrap();
        assert_eq!(udp.slot_state(), SlotState::Pending);
        assert_eq!(udp.send(&mut bus, to, 7, b"again"), Err(TxError::SlotBusy));

        assert!(udp.try_send(&mut bus));
        let bytes = bus.last_sent().unwrap();
        assert_eq!(bytes.len(), 42 + 9);

        let ip = Ipv4Packet::new_checked(&bytes[14..]).unwrap();
        assert!(ip.verify_checksum());
        let packet = UdpPacket::new_checked(ip.payload()).unwrap();
        assert!(packet.verify_checksum(
            &IpAddress::Ipv4(ip.src_addr()),
            &IpAddress::Ipv4(ip.dst_addr())
        ));
        assert_eq!(packet.dst_port(), 9000);
        assert_eq!(packet.payload(), b"telemetry");

        bus.complete_tx();
        assert!(udp.on_transmit_free(&bus.submitted()[0]).is_claimed());
        assert!(udp.send(&mut bus, to, 7, b"again").is_ok());
    }

    #[test]
    fn send_rejects_oversized_payload() {
        let (mut bus, mut udp) = setup(None);
        let to = UdpEndpoint::new(PEER_MAC, PEER_IP, 9000);
        let big = [0u8; 1473];
        assert_eq!(udp.send(&mut bus, to, 1, &big), Err(TxError::FrameTooLarge));
        assert!(udp.send(&mut bus, to, 1, &big[..1472]).is_ok());
    }
}
