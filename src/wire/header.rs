//! Ethernet, IPv4 and UDP header builders and checksum helpers
//!
//! Builders write straight into a transmit slot and return the frame index
//! where the next layer starts. Field offsets are frame-relative and assume
//! the 20-byte IPv4 header every generated frame carries.

use crate::driver::transport::Transport;
use crate::internal::constants::{
    ETH_HEADER_LEN, ETHERTYPE_IPV4, IP_DEFAULT_TTL, IP_OFFSET, IP_PAYLOAD_OFFSET,
    IP_PROTOCOL_UDP, IP_VER_IHL, IPV4_HEADER_LEN, UDP_HEADER_LEN,
};
use crate::wire::checksum::Checksum;
use crate::wire::frame::{FrameRead, TxFrame};
use crate::wire::{Identity, Ipv4Address, MacAddress};

/// Frame offsets of the fields the engine reads or patches
pub mod offset {
    /// Ethernet destination MAC
    pub const ETH_DST: u16 = 0;
    /// Ethernet source MAC
    pub const ETH_SRC: u16 = 6;
    /// EtherType
    pub const ETH_TYPE: u16 = 12;

    /// IPv4 version/IHL
    pub const IP_VER_IHL: u16 = 14;
    /// IPv4 DSCP/ECN
    pub const IP_TOS: u16 = 15;
    /// IPv4 total length
    pub const IP_TOTAL_LEN: u16 = 16;
    /// IPv4 identification
    pub const IP_ID: u16 = 18;
    /// IPv4 flags/fragment offset
    pub const IP_FRAG: u16 = 20;
    /// IPv4 TTL
    pub const IP_TTL: u16 = 22;
    /// IPv4 protocol
    pub const IP_PROTOCOL: u16 = 23;
    /// IPv4 header checksum
    pub const IP_CHECKSUM: u16 = 24;
    /// IPv4 source address
    pub const IP_SRC: u16 = 26;
    /// IPv4 destination address
    pub const IP_DST: u16 = 30;

    /// UDP source port (20-byte IP header)
    pub const UDP_SRC_PORT: u16 = 34;
    /// UDP destination port
    pub const UDP_DST_PORT: u16 = 36;
    /// UDP length
    pub const UDP_LEN: u16 = 38;
    /// UDP checksum
    pub const UDP_CHECKSUM: u16 = 40;
}

// =============================================================================
// Builders
// =============================================================================

/// Write an Ethernet header from the local MAC to `dst`
///
/// Returns the frame index of the payload (14).
pub fn init_ethernet_header<T: Transport + ?Sized>(
    frame: &mut TxFrame<'_, T>,
    local: &Identity,
    dst: MacAddress,
    ethertype: u16,
) -> u16 {
    frame.put_mac(offset::ETH_DST, dst);
    frame.put_mac(offset::ETH_SRC, local.mac);
    frame.put_u16(offset::ETH_TYPE, ethertype);
    ETH_HEADER_LEN
}

/// Write Ethernet and IPv4 headers for a datagram of `payload_len` bytes
///
/// Identification, flags and checksum are zero; call
/// [`compute_ip_checksum`] once the header is final. Returns the frame index
/// of the IP payload (34).
pub fn init_ip_header<T: Transport + ?Sized>(
    frame: &mut TxFrame<'_, T>,
    local: &Identity,
    dst_mac: MacAddress,
    dst_ip: Ipv4Address,
    protocol: u8,
    payload_len: u16,
) -> u16 {
    init_ethernet_header(frame, local, dst_mac, ETHERTYPE_IPV4);
    frame.put_u8(offset::IP_VER_IHL, IP_VER_IHL);
    frame.put_u8(offset::IP_TOS, 0);
    frame.put_u16(offset::IP_TOTAL_LEN, payload_len + IPV4_HEADER_LEN);
    frame.put_u16(offset::IP_ID, 0);
    frame.put_u16(offset::IP_FRAG, 0);
    frame.put_u8(offset::IP_TTL, IP_DEFAULT_TTL);
    frame.put_u8(offset::IP_PROTOCOL, protocol);
    frame.put_u16(offset::IP_CHECKSUM, 0);
    frame.put_ip(offset::IP_SRC, local.ip);
    frame.put_ip(offset::IP_DST, dst_ip);
    IP_PAYLOAD_OFFSET
}

/// Write Ethernet, IPv4 and UDP headers for `payload_len` bytes of data
///
/// The UDP checksum is zero; call [`compute_udp_checksum`] once the payload
/// is in place. Returns the frame index of the UDP payload (42).
pub fn init_udp_header<T: Transport + ?Sized>(
    frame: &mut TxFrame<'_, T>,
    local: &Identity,
    dst_mac: MacAddress,
    dst_ip: Ipv4Address,
    src_port: u16,
    dst_port: u16,
    payload_len: u16,
) -> u16 {
    let udp_len = payload_len + UDP_HEADER_LEN;
    init_ip_header(frame, local, dst_mac, dst_ip, IP_PROTOCOL_UDP, udp_len);
    frame.put_u16(offset::UDP_SRC_PORT, src_port);
    frame.put_u16(offset::UDP_DST_PORT, dst_port);
    frame.put_u16(offset::UDP_LEN, udp_len);
    frame.put_u16(offset::UDP_CHECKSUM, 0);
    IP_PAYLOAD_OFFSET + UDP_HEADER_LEN
}

// =============================================================================
// Checksums
// =============================================================================

/// IPv4 header length in bytes from the IHL field
#[inline(always)]
pub fn ip_header_len<F: FrameRead + ?Sized>(frame: &F) -> u16 {
    ((frame.get_u8(offset::IP_VER_IHL) & 0x0F) as u16) * 4
}

/// Expected IPv4 header checksum, summed over the IHL-derived header length
/// with the checksum field left out
pub fn ip_header_checksum<F: FrameRead + ?Sized>(frame: &F) -> u16 {
    let mut sum = Checksum::new();
    sum.add_frame_skipping(frame, IP_OFFSET, ip_header_len(frame), offset::IP_CHECKSUM);
    sum.finish()
}

/// Compute and write the IPv4 header checksum
pub fn compute_ip_checksum<T: Transport + ?Sized>(frame: &mut TxFrame<'_, T>) {
    let checksum = ip_header_checksum(frame);
    frame.put_u16(offset::IP_CHECKSUM, checksum);
}

/// Expected ICMP checksum over `len` bytes at frame index `start`, with the
/// checksum field (`start + 2`) left out
pub fn icmp_checksum<F: FrameRead + ?Sized>(frame: &F, start: u16, len: u16) -> u16 {
    let mut sum = Checksum::new();
    sum.add_frame_skipping(frame, start, len, start.wrapping_add(2));
    sum.finish()
}

/// Raw sum of a UDP segment plus its pseudo-header
///
/// Covers the checksum field as stored; a received segment is intact when
/// the result [`is_valid`](Checksum::is_valid).
pub fn udp_sum<F: FrameRead + ?Sized>(
    frame: &F,
    start: u16,
    udp_len: u16,
    src: Ipv4Address,
    dst: Ipv4Address,
) -> Checksum {
    let mut sum = Checksum::new();
    sum.add_ip(src);
    sum.add_ip(dst);
    sum.add_u16(IP_PROTOCOL_UDP as u16);
    sum.add_u16(udp_len);
    sum.add_frame(frame, start, udp_len);
    sum
}

/// Compute and write the UDP checksum for `payload_len` bytes of data
///
/// Addresses come from the IPv4 header already in the frame. A computed
/// value of zero is sent as 0xFFFF.
pub fn compute_udp_checksum<T: Transport + ?Sized>(frame: &mut TxFrame<'_, T>, payload_len: u16) {
    let udp_len = payload_len + UDP_HEADER_LEN;
    frame.put_u16(offset::UDP_CHECKSUM, 0);
    let src = frame.get_ip(offset::IP_SRC);
    let dst = frame.get_ip(offset::IP_DST);
    let checksum = match udp_sum(frame, IP_PAYLOAD_OFFSET, udp_len, src, dst).finish() {
        0 => 0xFFFF,
        c => c,
    };
    frame.put_u16(offset::UDP_CHECKSUM, checksum);
}
