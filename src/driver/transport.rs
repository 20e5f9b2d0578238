//! Register transport
//!
//! The [`Transport`] trait is the only way the packet engine touches the
//! hardware: byte access into the transmit/receive buffers plus the four
//! descriptor queues. [`MmioTransport`] implements it over the MEMAC memory
//! map; tests use an in-memory mock.

use crate::descriptor::{RxDescriptor, TxDescriptor};
use crate::driver::config::{MemacConfig, MemoryMap};
use crate::driver::error::{IoError, IoResult};
use crate::hal::control::gpi_bits;
use crate::hal::gpio::GpiPort;
use crate::internal::constants::RX_RELEASE_SPIN_LIMIT;
use crate::internal::mmio;

// =============================================================================
// Transport Trait
// =============================================================================

/// Byte-level access to MEMAC buffers and descriptor queues
///
/// Buffer addresses passed to the read/write methods are already reduced
/// modulo the buffer size; implementations never see an out-of-range index.
pub trait Transport {
    /// Transmit buffer size in bytes (power of two)
    fn tx_buffer_size(&self) -> u16;

    /// Receive buffer size in bytes (power of two)
    fn rx_buffer_size(&self) -> u16;

    /// Read a byte of the transmit buffer
    fn tx_read(&self, addr: u16) -> u8;

    /// Write a byte of the transmit buffer
    fn tx_write(&mut self, addr: u16, value: u8);

    /// Read a byte of the receive buffer
    fn rx_read(&self, addr: u16) -> u8;

    /// Whether the TX ready queue can accept a descriptor
    fn can_submit_tx(&self) -> bool;

    /// Push a descriptor into the TX ready queue
    ///
    /// Callers check [`can_submit_tx`](Self::can_submit_tx) first.
    fn submit_tx(&mut self, desc: TxDescriptor);

    /// Pop a descriptor the hardware has finished transmitting, if any
    fn reclaim_tx(&mut self) -> Option<TxDescriptor>;

    /// Pop the next received frame, if any
    fn receive(&mut self) -> Option<RxDescriptor>;

    /// Hand a received frame's buffer space back to the hardware
    ///
    /// # Errors
    ///
    /// [`IoError::Timeout`] if the free queue never becomes ready.
    fn release_rx(&mut self, desc: &RxDescriptor) -> IoResult<()>;
}

// =============================================================================
// Memory-Mapped Transport
// =============================================================================

/// [`Transport`] over the MEMAC memory map
///
/// Queue ready flags are read from the MicroBlaze MCS IOModule GPI1 port.
#[derive(Debug)]
pub struct MmioTransport {
    map: MemoryMap,
    gpi: GpiPort,
    tx_size: u16,
    rx_size: u16,
}

impl MmioTransport {
    /// Create a transport for the memory map and buffer sizes in `config`
    ///
    /// # Safety
    ///
    /// The memory map must describe a real MEMAC and IOModule, and no other
    /// code may access the MEMAC buffers or queues while this exists.
    #[must_use]
    pub const unsafe fn new(config: &MemacConfig) -> Self {
        Self {
            map: config.memory_map,
            // SAFETY: forwarded from the caller's guarantee
            gpi: unsafe { GpiPort::new(config.memory_map.gpi1()) },
            tx_size: config.tx_buffer_size,
            rx_size: config.rx_buffer_size,
        }
    }

    /// Memory map in use
    #[must_use]
    pub const fn memory_map(&self) -> &MemoryMap {
        &self.map
    }

    #[inline(always)]
    fn flag(&self, bit: u32) -> bool {
        self.gpi.read() & (1 << bit) != 0
    }
}

impl Transport for MmioTransport {
    fn tx_buffer_size(&self) -> u16 {
        self.tx_size
    }

    fn rx_buffer_size(&self) -> u16 {
        self.rx_size
    }

    fn tx_read(&self, addr: u16) -> u8 {
        // SAFETY: addr is below the buffer size, inside the TX buffer window
        unsafe { mmio::read_u8(self.map.tx_buffer() + addr as usize) }
    }

    fn tx_write(&mut self, addr: u16, value: u8) {
        // SAFETY: addr is below the buffer size, inside the TX buffer window
        unsafe { mmio::write_u8(self.map.tx_buffer() + addr as usize, value) }
    }

    fn rx_read(&self, addr: u16) -> u8 {
        // SAFETY: addr is below the buffer size, inside the RX buffer window
        unsafe { mmio::read_u8(self.map.rx_buffer() + addr as usize) }
    }

    fn can_submit_tx(&self) -> bool {
        self.flag(gpi_bits::TX_PRQ_RDY)
    }

    fn submit_tx(&mut self, desc: TxDescriptor) {
        // SAFETY: TX PDQ is a valid 32-bit queue register
        unsafe { mmio::write_u32(self.map.tx_pdq(), desc.to_queue_word()) }
    }

    fn reclaim_tx(&mut self) -> Option<TxDescriptor> {
        if !self.flag(gpi_bits::TX_PFQ_RDY) {
            return None;
        }
        // SAFETY: TX PDQ is a valid 32-bit queue register; reading pops it
        let word = unsafe { mmio::read_u32(self.map.tx_pdq()) };
        Some(TxDescriptor::from_queue_word(word))
    }

    fn receive(&mut self) -> Option<RxDescriptor> {
        if !self.flag(gpi_bits::RX_PRQ_RDY) {
            return None;
        }
        // Flags must be read before the descriptor word, which pops the queue
        // SAFETY: RX PDQ registers are valid and aligned
        let flags = unsafe { mmio::read_u16(self.map.rx_pdq() + 4) };
        let word = unsafe { mmio::read_u32(self.map.rx_pdq()) };
        Some(RxDescriptor::from_queue_words(word, flags))
    }

    fn release_rx(&mut self, desc: &RxDescriptor) -> IoResult<()> {
        let mut spins = 0u32;
        while !self.flag(gpi_bits::RX_PFQ_RDY) {
            if spins >= RX_RELEASE_SPIN_LIMIT {
                return Err(IoError::Timeout);
            }
            spins += 1;
            core::hint::spin_loop();
        }
        // SAFETY: RX PDQ is a valid 32-bit queue register
        unsafe { mmio::write_u32(self.map.rx_pdq(), desc.release_word()) }
        Ok(())
    }
}
