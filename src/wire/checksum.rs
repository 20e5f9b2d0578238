//! Internet checksum (RFC 1071)
//!
//! One's complement sum of big-endian 16-bit words. A trailing odd byte is
//! treated as the high byte of a word padded with zero. Folding repeats until
//! no carry remains above bit 15.

use crate::wire::frame::FrameRead;
use crate::wire::Ipv4Address;

/// Running one's complement sum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Checksum {
    sum: u32,
}

impl Checksum {
    /// Empty sum
    #[must_use]
    pub const fn new() -> Self {
        Self { sum: 0 }
    }

    /// Add one 16-bit word
    #[inline(always)]
    pub fn add_u16(&mut self, word: u16) {
        self.sum += word as u32;
        // Keep headroom for the next addition
        if self.sum & 0x8000_0000 != 0 {
            self.sum = (self.sum & 0xFFFF) + (self.sum >> 16);
        }
    }

    /// Add an IPv4 address as two words
    pub fn add_ip(&mut self, ip: Ipv4Address) {
        let bits = ip.to_bits();
        self.add_u16((bits >> 16) as u16);
        self.add_u16(bits as u16);
    }

    /// Add a byte slice
    pub fn add_bytes(&mut self, bytes: &[u8]) {
        let mut pairs = bytes.chunks_exact(2);
        for pair in pairs.by_ref() {
            self.add_u16(u16::from_be_bytes([pair[0], pair[1]]));
        }
        if let [last] = pairs.remainder() {
            self.add_u16((*last as u16) << 8);
        }
    }

    /// Add `len` frame bytes starting at frame index `start`
    ///
    /// An odd `len` reads exactly one final byte.
    pub fn add_frame<F: FrameRead + ?Sized>(&mut self, frame: &F, start: u16, len: u16) {
        let mut i = 0;
        while i + 1 < len {
            self.add_u16(frame.get_u16(start.wrapping_add(i)));
            i += 2;
        }
        if i < len {
            self.add_u16((frame.get_u8(start.wrapping_add(i)) as u16) << 8);
        }
    }

    /// Add a frame range, leaving out the 16-bit field at frame index `skip`
    ///
    /// `skip` must lie inside the range at an even distance from `start`.
    pub fn add_frame_skipping<F: FrameRead + ?Sized>(
        &mut self,
        frame: &F,
        start: u16,
        len: u16,
        skip: u16,
    ) {
        let head = skip.wrapping_sub(start);
        self.add_frame(frame, start, head);
        self.add_frame(frame, skip.wrapping_add(2), len.saturating_sub(head + 2));
    }

    /// Sum folded to 16 bits
    #[must_use]
    pub const fn fold(self) -> u16 {
        let mut sum = self.sum;
        while sum >> 16 != 0 {
            sum = (sum & 0xFFFF) + (sum >> 16);
        }
        sum as u16
    }

    /// Complement of the folded sum, the value written to a checksum field
    #[must_use]
    pub const fn finish(self) -> u16 {
        !self.fold()
    }

    /// Whether a sum taken over data including its checksum field verifies
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.fold() == 0xFFFF
    }
}

/// Checksum of a byte slice
#[must_use]
pub fn internet_checksum(bytes: &[u8]) -> u16 {
    let mut sum = Checksum::new();
    sum.add_bytes(bytes);
    sum.finish()
}
