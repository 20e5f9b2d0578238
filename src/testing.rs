//! Testing utilities and mock implementations
//!
//! This module provides mock implementations for testing the packet engine
//! and PHY driver on the host without hardware access.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::vec;
use std::vec::Vec;

use crate::descriptor::{RxDescriptor, TxDescriptor};
use crate::driver::error::{IoError, IoResult, Result};
use crate::driver::transport::Transport;
use crate::hal::mdio::{MdioBus, bmsr, phy_reg};
use crate::wire::checksum::{Checksum, internet_checksum};
use crate::wire::{Ipv4Address, MacAddress};

// =============================================================================
// Mock Transport
// =============================================================================

/// RAM-backed MEMAC buffers and descriptor queues
///
/// Frames are injected into the receive ring at a movable write pointer so
/// tests can place them across the buffer end. Submitted transmit
/// descriptors stay "in flight" until [`complete_tx`](Self::complete_tx)
/// moves them to the free queue.
#[derive(Debug)]
pub struct MockTransport {
    tx_buf: Vec<u8>,
    rx_buf: Vec<u8>,
    rx_write: u16,
    rx_ready: VecDeque<RxDescriptor>,
    tx_in_flight: VecDeque<TxDescriptor>,
    tx_free: VecDeque<TxDescriptor>,
    submitted: Vec<TxDescriptor>,
    released: Vec<RxDescriptor>,
    tx_queue_full: bool,
    rx_free_stalled: bool,
}

impl MockTransport {
    /// Create zeroed buffers of the given sizes (powers of two)
    pub fn new(tx_size: u16, rx_size: u16) -> Self {
        Self {
            tx_buf: vec![0; tx_size as usize],
            rx_buf: vec![0; rx_size as usize],
            rx_write: 0,
            rx_ready: VecDeque::new(),
            tx_in_flight: VecDeque::new(),
            tx_free: VecDeque::new(),
            submitted: Vec::new(),
            released: Vec::new(),
            tx_queue_full: false,
            rx_free_stalled: false,
        }
    }

    /// Move the receive write pointer
    pub fn set_rx_write_offset(&mut self, offset: u16) {
        self.rx_write = offset & (self.rx_buf.len() as u16 - 1);
    }

    /// Copy a frame into the receive ring and queue its descriptor
    pub fn inject(&mut self, frame: &[u8]) -> RxDescriptor {
        let mask = self.rx_buf.len() - 1;
        let offset = self.rx_write;
        for (k, &b) in frame.iter().enumerate() {
            self.rx_buf[(offset as usize + k) & mask] = b;
        }
        self.rx_write = ((offset as usize + frame.len()) & mask) as u16;
        let desc = RxDescriptor::new(offset, frame.len() as u16, 0);
        self.rx_ready.push_back(desc);
        desc
    }

    /// Receive descriptors still waiting to be taken
    pub fn rx_pending(&self) -> usize {
        self.rx_ready.len()
    }

    /// Byte of the transmit buffer
    pub fn tx_byte(&self, addr: u16) -> u8 {
        self.tx_buf[addr as usize & (self.tx_buf.len() - 1)]
    }

    /// Bytes covered by a transmit descriptor, unwrapped
    pub fn tx_bytes(&self, desc: &TxDescriptor) -> Vec<u8> {
        (0..desc.len)
            .map(|i| self.tx_byte(desc.offset.wrapping_add(i)))
            .collect()
    }

    /// Every descriptor ever submitted, oldest first
    pub fn submitted(&self) -> &[TxDescriptor] {
        &self.submitted
    }

    /// Bytes of the most recently submitted frame
    pub fn last_sent(&self) -> Option<Vec<u8>> {
        self.submitted.last().map(|d| self.tx_bytes(d))
    }

    /// Every receive descriptor handed back, oldest first
    pub fn released(&self) -> &[RxDescriptor] {
        &self.released
    }

    /// Simulate a full TX ready queue
    pub fn set_tx_queue_full(&mut self, full: bool) {
        self.tx_queue_full = full;
    }

    /// Simulate an RX free queue that never becomes ready
    pub fn set_rx_free_stalled(&mut self, stalled: bool) {
        self.rx_free_stalled = stalled;
    }

    /// Finish the oldest in-flight transmit; returns whether one existed
    pub fn complete_tx(&mut self) -> bool {
        match self.tx_in_flight.pop_front() {
            Some(desc) => {
                self.tx_free.push_back(desc);
                true
            }
            None => false,
        }
    }

    /// Finish every in-flight transmit
    pub fn complete_all_tx(&mut self) {
        while self.complete_tx() {}
    }

    /// Queue an arbitrary completion, e.g. one no handler owns
    pub fn push_tx_free(&mut self, desc: TxDescriptor) {
        self.tx_free.push_back(desc);
    }
}

impl Transport for MockTransport {
    fn tx_buffer_size(&self) -> u16 {
        self.tx_buf.len() as u16
    }

    fn rx_buffer_size(&self) -> u16 {
        self.rx_buf.len() as u16
    }

    fn tx_read(&self, addr: u16) -> u8 {
        self.tx_buf[addr as usize]
    }

    fn tx_write(&mut self, addr: u16, value: u8) {
        self.tx_buf[addr as usize] = value;
    }

    fn rx_read(&self, addr: u16) -> u8 {
        self.rx_buf[addr as usize]
    }

    fn can_submit_tx(&self) -> bool {
        !self.tx_queue_full
    }

    fn submit_tx(&mut self, desc: TxDescriptor) {
        self.submitted.push(desc);
        self.tx_in_flight.push_back(desc);
    }

    fn reclaim_tx(&mut self) -> Option<TxDescriptor> {
        self.tx_free.pop_front()
    }

    fn receive(&mut self) -> Option<RxDescriptor> {
        self.rx_ready.pop_front()
    }

    fn release_rx(&mut self, desc: &RxDescriptor) -> IoResult<()> {
        if self.rx_free_stalled {
            return Err(IoError::Timeout);
        }
        self.released.push(*desc);
        Ok(())
    }
}

// =============================================================================
// Frame Builders
// =============================================================================

fn ethernet(dst: MacAddress, src: MacAddress, ethertype: u16) -> Vec<u8> {
    let mut f = Vec::with_capacity(64);
    f.extend_from_slice(&dst.octets());
    f.extend_from_slice(&src.octets());
    f.extend_from_slice(&ethertype.to_be_bytes());
    f
}

/// Ethernet + ARP request from `sha`/`spa` asking for `tpa`
pub fn arp_request(sha: MacAddress, spa: Ipv4Address, tpa: Ipv4Address) -> Vec<u8> {
    let mut f = ethernet(MacAddress::BROADCAST, sha, 0x0806);
    f.extend_from_slice(&[0x00, 0x01, 0x08, 0x00, 6, 4, 0x00, 0x01]);
    f.extend_from_slice(&sha.octets());
    f.extend_from_slice(&spa.octets());
    f.extend_from_slice(&MacAddress::BROADCAST.octets());
    f.extend_from_slice(&tpa.octets());
    f
}

/// Ethernet + option-less IPv4 header with a valid checksum
pub fn ipv4_frame(
    src_mac: MacAddress,
    src_ip: Ipv4Address,
    dst_mac: MacAddress,
    dst_ip: Ipv4Address,
    protocol: u8,
    ident: u16,
    payload: &[u8],
) -> Vec<u8> {
    let mut f = ethernet(dst_mac, src_mac, 0x0800);
    let total = (20 + payload.len()) as u16;
    let mut ip = vec![0x45, 0x00];
    ip.extend_from_slice(&total.to_be_bytes());
    ip.extend_from_slice(&ident.to_be_bytes());
    ip.extend_from_slice(&[0x40, 0x00, 64, protocol, 0, 0]);
    ip.extend_from_slice(&src_ip.octets());
    ip.extend_from_slice(&dst_ip.octets());
    let checksum = internet_checksum(&ip);
    ip[10..12].copy_from_slice(&checksum.to_be_bytes());
    f.extend_from_slice(&ip);
    f.extend_from_slice(payload);
    f
}

/// Overwrite the IPv4 total length and restore a valid header checksum
pub fn set_ip_total_len(frame: &mut [u8], total_len: u16) {
    frame[16..18].copy_from_slice(&total_len.to_be_bytes());
    frame[24..26].copy_from_slice(&[0, 0]);
    let checksum = internet_checksum(&frame[14..34]);
    frame[24..26].copy_from_slice(&checksum.to_be_bytes());
}

/// ICMP echo message (type 8 request or 0 reply) with a valid checksum
pub fn icmp_echo(kind: u8, id: u16, seq: u16, data: &[u8]) -> Vec<u8> {
    let mut m = vec![kind, 0, 0, 0];
    m.extend_from_slice(&id.to_be_bytes());
    m.extend_from_slice(&seq.to_be_bytes());
    m.extend_from_slice(data);
    let checksum = internet_checksum(&m);
    m[2..4].copy_from_slice(&checksum.to_be_bytes());
    m
}

/// Ethernet + IPv4 + ICMP echo request
pub fn icmp_echo_request(
    src_mac: MacAddress,
    src_ip: Ipv4Address,
    dst_mac: MacAddress,
    dst_ip: Ipv4Address,
    id: u16,
    seq: u16,
    data: &[u8],
) -> Vec<u8> {
    let icmp = icmp_echo(8, id, seq, data);
    ipv4_frame(src_mac, src_ip, dst_mac, dst_ip, 1, 0x1234, &icmp)
}

/// Ethernet + IPv4 + UDP datagram with a valid checksum
pub fn udp_datagram(
    src_mac: MacAddress,
    src_ip: Ipv4Address,
    dst_mac: MacAddress,
    dst_ip: Ipv4Address,
    src_port: u16,
    dst_port: u16,
    data: &[u8],
) -> Vec<u8> {
    let udp_len = (8 + data.len()) as u16;
    let mut u = Vec::with_capacity(udp_len as usize);
    u.extend_from_slice(&src_port.to_be_bytes());
    u.extend_from_slice(&dst_port.to_be_bytes());
    u.extend_from_slice(&udp_len.to_be_bytes());
    u.extend_from_slice(&[0, 0]);
    u.extend_from_slice(data);

    let mut sum = Checksum::new();
    sum.add_ip(src_ip);
    sum.add_ip(dst_ip);
    sum.add_u16(17);
    sum.add_u16(udp_len);
    sum.add_bytes(&u);
    let checksum = match sum.finish() {
        0 => 0xFFFF,
        c => c,
    };
    u[6..8].copy_from_slice(&checksum.to_be_bytes());
    ipv4_frame(src_mac, src_ip, dst_mac, dst_ip, 17, 0, &u)
}

// =============================================================================
// Mock MDIO Bus
// =============================================================================

/// RTL8211 PHY-specific status register
pub const RTL8211_PHYSR: u8 = 0x11;

/// Mock MDIO bus for testing PHY drivers without hardware
///
/// This allows setting up expected register values and verifying writes.
#[derive(Debug, Default)]
pub struct MockMdioBus {
    /// Register values: (phy_addr, reg_addr) -> value
    registers: RefCell<HashMap<(u8, u8), u16>>,
    /// Record of writes: (phy_addr, reg_addr, value)
    write_log: RefCell<Vec<(u8, u8, u16)>>,
}

impl MockMdioBus {
    /// Create a new mock MDIO bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a register value
    pub fn set_register(&self, phy_addr: u8, reg_addr: u8, value: u16) {
        self.registers
            .borrow_mut()
            .insert((phy_addr, reg_addr), value);
    }

    /// Get the current value of a register (for test verification)
    pub fn get_register(&self, phy_addr: u8, reg_addr: u8) -> Option<u16> {
        self.registers.borrow().get(&(phy_addr, reg_addr)).copied()
    }

    /// Get all writes that have been made
    pub fn get_writes(&self) -> Vec<(u8, u8, u16)> {
        self.write_log.borrow().clone()
    }

    /// Setup for an RTL8211E PHY, link down
    pub fn setup_rtl8211(&self, phy_addr: u8) {
        self.set_register(phy_addr, phy_reg::PHYIDR1, 0x001C);
        self.set_register(phy_addr, phy_reg::PHYIDR2, 0xC915);

        let bmsr_value = bmsr::TX_FD_CAPABLE
            | bmsr::TX_HD_CAPABLE
            | bmsr::T10_FD_CAPABLE
            | bmsr::T10_HD_CAPABLE
            | bmsr::ESTATUS
            | bmsr::AN_ABILITY
            | bmsr::EXT_CAPABLE;
        self.set_register(phy_addr, phy_reg::BMSR, bmsr_value);
        self.set_register(phy_addr, phy_reg::BMCR, 0x1140);
        self.set_register(phy_addr, RTL8211_PHYSR, 0x0000);
    }

    /// Simulate auto-negotiation completing at 1000 Mbps full duplex
    pub fn simulate_link_up_1000_fd(&self, phy_addr: u8) {
        let bmsr_val = self.get_register(phy_addr, phy_reg::BMSR).unwrap_or(0);
        self.set_register(
            phy_addr,
            phy_reg::BMSR,
            bmsr_val | bmsr::LINK_STATUS | bmsr::AN_COMPLETE,
        );
        // speed 0b10, duplex, resolved, link
        self.set_register(phy_addr, RTL8211_PHYSR, 0b1010_1100_0000_0000);
    }

    /// Simulate a 100 Mbps half duplex link
    pub fn simulate_link_up_100_hd(&self, phy_addr: u8) {
        let bmsr_val = self.get_register(phy_addr, phy_reg::BMSR).unwrap_or(0);
        self.set_register(
            phy_addr,
            phy_reg::BMSR,
            bmsr_val | bmsr::LINK_STATUS | bmsr::AN_COMPLETE,
        );
        self.set_register(phy_addr, RTL8211_PHYSR, 0b0100_1100_0000_0000);
    }
}

impl MdioBus for MockMdioBus {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        // Return from register map (default 0 if not set)
        Ok(self
            .registers
            .borrow()
            .get(&(phy_addr, reg_addr))
            .copied()
            .unwrap_or(0))
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        self.write_log
            .borrow_mut()
            .push((phy_addr, reg_addr, value));

        // BMCR reset self-clears
        let stored = if reg_addr == phy_reg::BMCR {
            value & !crate::hal::mdio::bmcr::RESET
        } else {
            value
        };
        self.registers
            .borrow_mut()
            .insert((phy_addr, reg_addr), stored);

        Ok(())
    }
}

// =============================================================================
// Mock Delay and Pin
// =============================================================================

/// Mock delay provider that records total time
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: RefCell<u64>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }

    /// Get total milliseconds that were "delayed"
    pub fn total_ms(&self) -> u64 {
        self.total_ns() / 1_000_000
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += ns as u64;
    }
}

/// Output pin recording every level written, `true` for high
#[derive(Debug, Default)]
pub struct MockPin {
    pub levels: Vec<bool>,
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}
