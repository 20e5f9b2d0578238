//! MicroBlaze MCS IOModule general-purpose ports
//!
//! The MEMAC control word is driven from IOModule GPO1 and its status flags
//! are sampled on GPI1. GPO registers are write-only, so [`GpoPort`] keeps a
//! shadow copy to support read-modify-write updates.

use crate::internal::mmio;

// =============================================================================
// Input Port
// =============================================================================

/// Read-only general purpose input register
#[derive(Debug)]
pub struct GpiPort {
    addr: usize,
}

impl GpiPort {
    /// Create a port for the GPI register at `addr`
    ///
    /// # Safety
    ///
    /// `addr` must be a valid, 4-byte aligned IOModule GPI register.
    #[must_use]
    pub const unsafe fn new(addr: usize) -> Self {
        Self { addr }
    }

    /// Sample all input bits
    #[inline(always)]
    pub fn read(&self) -> u32 {
        // SAFETY: address validated at construction
        unsafe { mmio::read_u32(self.addr) }
    }

    /// Sample a single input bit
    #[inline(always)]
    pub fn bit(&self, bit: u32) -> bool {
        self.read() & (1 << bit) != 0
    }
}

// =============================================================================
// Output Port
// =============================================================================

/// Write-only general purpose output register with a software shadow
#[derive(Debug)]
pub struct GpoPort {
    addr: usize,
    shadow: u32,
}

impl GpoPort {
    /// Create a port for the GPO register at `addr` with an initial value
    ///
    /// The initial value is written immediately so hardware and shadow agree.
    ///
    /// # Safety
    ///
    /// `addr` must be a valid, 4-byte aligned IOModule GPO register that no
    /// other code writes.
    pub unsafe fn new(addr: usize, initial: u32) -> Self {
        // SAFETY: forwarded from the caller's guarantee
        unsafe { mmio::write_u32(addr, initial) };
        Self {
            addr,
            shadow: initial,
        }
    }

    /// Last value written
    #[inline(always)]
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.shadow
    }

    /// Write all output bits
    pub fn write(&mut self, value: u32) {
        self.shadow = value;
        // SAFETY: address validated at construction
        unsafe { mmio::write_u32(self.addr, value) }
    }

    /// Replace the bits selected by `mask` with the matching bits of `value`
    pub fn modify(&mut self, mask: u32, value: u32) {
        self.write(merge_bits(self.shadow, mask, value));
    }

    /// Drive a single output bit
    pub fn set_bit(&mut self, bit: u32, high: bool) {
        self.modify(1 << bit, if high { 1 << bit } else { 0 });
    }
}

/// Read-modify-write merge used by [`GpoPort::modify`]
#[inline(always)]
#[must_use]
pub const fn merge_bits(current: u32, mask: u32, value: u32) -> u32 {
    (current & !mask) | (value & mask)
}
