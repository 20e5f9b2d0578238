//! Descriptor-addressed frame views
//!
//! A frame never lives in contiguous memory: it occupies `len` bytes of a
//! circular buffer starting at the descriptor offset and may wrap past the
//! end. [`TxFrame`] and [`RxFrame`] hide that by reducing every frame index
//! `i` to `(offset + i) mod size` before touching the [`Transport`].
//!
//! Multi-byte fields are big-endian (network order).

use crate::descriptor::{RxDescriptor, TxDescriptor};
use crate::driver::transport::Transport;
use crate::wire::{Ipv4Address, MacAddress};

/// Buffer address of frame byte `i`
#[inline(always)]
const fn wrap(offset: u16, i: u16, mask: u16) -> u16 {
    offset.wrapping_add(i) & mask
}

// =============================================================================
// Read Access
// =============================================================================

/// Big-endian read access to frame bytes by frame-relative index
pub trait FrameRead {
    /// Byte at frame index `i`
    fn get_u8(&self, i: u16) -> u8;

    /// Big-endian 16-bit value at frame index `i`
    fn get_u16(&self, i: u16) -> u16 {
        u16::from_be_bytes([self.get_u8(i), self.get_u8(i.wrapping_add(1))])
    }

    /// Big-endian 32-bit value at frame index `i`
    fn get_u32(&self, i: u16) -> u32 {
        ((self.get_u16(i) as u32) << 16) | self.get_u16(i.wrapping_add(2)) as u32
    }

    /// Copy `dst.len()` bytes starting at frame index `i`
    fn get_bytes(&self, i: u16, dst: &mut [u8]) {
        for (k, b) in dst.iter_mut().enumerate() {
            *b = self.get_u8(i.wrapping_add(k as u16));
        }
    }

    /// MAC address at frame index `i`
    fn get_mac(&self, i: u16) -> MacAddress {
        let mut mac = [0u8; 6];
        self.get_bytes(i, &mut mac);
        MacAddress(mac)
    }

    /// IPv4 address at frame index `i`
    fn get_ip(&self, i: u16) -> Ipv4Address {
        Ipv4Address::from_bits(self.get_u32(i))
    }
}

// =============================================================================
// Receive Frame
// =============================================================================

/// Read-only view of a received frame
#[derive(Debug)]
pub struct RxFrame<'a, T: Transport + ?Sized> {
    bus: &'a T,
    offset: u16,
    len: u16,
    mask: u16,
}

impl<'a, T: Transport + ?Sized> RxFrame<'a, T> {
    /// View the frame described by `desc`
    pub fn new(bus: &'a T, desc: &RxDescriptor) -> Self {
        Self {
            offset: desc.offset,
            len: desc.len,
            mask: bus.rx_buffer_size().wrapping_sub(1),
            bus,
        }
    }

    /// Frame length in bytes
    #[inline(always)]
    pub const fn len(&self) -> u16 {
        self.len
    }

    /// Whether the frame is empty
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T: Transport + ?Sized> FrameRead for RxFrame<'_, T> {
    #[inline(always)]
    fn get_u8(&self, i: u16) -> u8 {
        self.bus.rx_read(wrap(self.offset, i, self.mask))
    }
}

// =============================================================================
// Transmit Frame
// =============================================================================

/// Writable view of a transmit slot
#[derive(Debug)]
pub struct TxFrame<'a, T: Transport + ?Sized> {
    bus: &'a mut T,
    desc: TxDescriptor,
    mask: u16,
}

impl<'a, T: Transport + ?Sized> TxFrame<'a, T> {
    /// View the transmit region described by `desc`
    pub fn new(bus: &'a mut T, desc: TxDescriptor) -> Self {
        Self {
            mask: bus.tx_buffer_size().wrapping_sub(1),
            bus,
            desc,
        }
    }

    /// Descriptor this view writes through
    #[inline(always)]
    pub const fn descriptor(&self) -> TxDescriptor {
        self.desc
    }

    /// Write a byte at frame index `i`
    #[inline(always)]
    pub fn put_u8(&mut self, i: u16, value: u8) {
        self.bus.tx_write(wrap(self.desc.offset, i, self.mask), value);
    }

    /// Write a big-endian 16-bit value at frame index `i`
    pub fn put_u16(&mut self, i: u16, value: u16) {
        self.put_bytes(i, &value.to_be_bytes());
    }

    /// Write a big-endian 32-bit value at frame index `i`
    pub fn put_u32(&mut self, i: u16, value: u32) {
        self.put_bytes(i, &value.to_be_bytes());
    }

    /// Write `src` starting at frame index `i`
    pub fn put_bytes(&mut self, i: u16, src: &[u8]) {
        for (k, &b) in src.iter().enumerate() {
            self.put_u8(i.wrapping_add(k as u16), b);
        }
    }

    /// Write a MAC address at frame index `i`
    pub fn put_mac(&mut self, i: u16, mac: MacAddress) {
        self.put_bytes(i, &mac.octets());
    }

    /// Write an IPv4 address at frame index `i`
    pub fn put_ip(&mut self, i: u16, ip: Ipv4Address) {
        self.put_u32(i, ip.to_bits());
    }

    /// Copy `len` bytes from a received frame into this one
    ///
    /// Both sides wrap independently at their own buffer boundary.
    pub fn copy_from_rx(&mut self, dst: u16, rx: &RxDescriptor, src: u16, len: u16) {
        let rx_mask = self.bus.rx_buffer_size().wrapping_sub(1);
        for k in 0..len {
            let b = self.bus.rx_read(wrap(rx.offset, src.wrapping_add(k), rx_mask));
            self.put_u8(dst.wrapping_add(k), b);
        }
    }
}

impl<T: Transport + ?Sized> FrameRead for TxFrame<'_, T> {
    #[inline(always)]
    fn get_u8(&self, i: u16) -> u8 {
        self.bus.tx_read(wrap(self.desc.offset, i, self.mask))
    }
}
