//! Transmit packet descriptors, slots and slot allocation.
//!
//! A transmit descriptor locates a frame inside the circular transmit buffer.
//! Each reply-generating protocol owns exactly one [`TxSlot`], carved out of
//! the buffer once at startup by the [`TxAllocator`].

use crate::driver::error::{ConfigError, ConfigResult};
use crate::driver::transport::Transport;
use crate::internal::constants::TX_SLOT_ALIGN;

// =============================================================================
// TxDescriptor
// =============================================================================

/// Transmit packet descriptor
///
/// Exchanged with the hardware through the TX packet descriptor queue as a
/// single 32-bit word: offset in the upper half, length in the lower half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxDescriptor {
    /// Frame length in bytes
    pub len: u16,
    /// Byte offset of the frame within the transmit buffer
    pub offset: u16,
}

impl TxDescriptor {
    /// Create a new descriptor
    #[must_use]
    pub const fn new(offset: u16, len: u16) -> Self {
        Self { len, offset }
    }

    /// Encode as a descriptor queue word
    #[must_use]
    pub const fn to_queue_word(self) -> u32 {
        ((self.offset as u32) << 16) | self.len as u32
    }

    /// Decode a descriptor queue word
    #[must_use]
    pub const fn from_queue_word(word: u32) -> Self {
        Self {
            len: (word & 0xFFFF) as u16,
            offset: (word >> 16) as u16,
        }
    }
}

// =============================================================================
// Slot State Machine
// =============================================================================

/// Lifecycle of a protocol's transmit slot
///
/// `Free` -> `Pending` (frame built) -> `Reserved` (handed to hardware)
/// -> `Free` (hardware reported completion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotState {
    /// Unused, may be filled
    #[default]
    Free,
    /// Frame built, waiting for space in the TX ready queue
    Pending,
    /// Submitted to hardware, waiting for completion
    Reserved,
}

/// Result of offering a completed transmit descriptor to a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxRelease {
    /// The descriptor belonged to this handler and its slot is free again
    Claimed,
    /// Not this handler's descriptor
    NotMine,
}

impl TxRelease {
    /// Whether the descriptor was claimed
    #[must_use]
    pub const fn is_claimed(self) -> bool {
        matches!(self, TxRelease::Claimed)
    }
}

/// A fixed transmit buffer region owned by one protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxSlot {
    desc: TxDescriptor,
    capacity: u16,
    state: SlotState,
}

impl TxSlot {
    /// Wrap a freshly allocated descriptor; its length is the slot capacity
    #[must_use]
    pub const fn new(desc: TxDescriptor) -> Self {
        Self {
            desc,
            capacity: desc.len,
            state: SlotState::Free,
        }
    }

    /// Current descriptor (offset is fixed, length follows the last frame)
    #[inline(always)]
    #[must_use]
    pub const fn descriptor(&self) -> TxDescriptor {
        self.desc
    }

    /// Bytes reserved for this slot
    #[inline(always)]
    #[must_use]
    pub const fn capacity(&self) -> u16 {
        self.capacity
    }

    /// Current state
    #[inline(always)]
    #[must_use]
    pub const fn state(&self) -> SlotState {
        self.state
    }

    /// Whether a new frame may be built
    #[inline(always)]
    #[must_use]
    pub const fn is_free(&self) -> bool {
        matches!(self.state, SlotState::Free)
    }

    /// Mark a built frame of `len` bytes as ready for submission
    ///
    /// The caller guarantees `len <= capacity`.
    pub fn mark_pending(&mut self, len: u16) {
        debug_assert!(len <= self.capacity);
        self.desc.len = len;
        self.state = SlotState::Pending;
    }

    /// Submit a pending frame if the hardware ready queue has space
    ///
    /// Returns `true` when the descriptor was handed to the hardware.
    pub fn try_submit<T: Transport + ?Sized>(&mut self, bus: &mut T) -> bool {
        if self.state != SlotState::Pending || !bus.can_submit_tx() {
            return false;
        }
        bus.submit_tx(self.desc);
        self.state = SlotState::Reserved;
        true
    }

    /// Offer a completed descriptor; frees the slot when it matches
    pub fn release(&mut self, desc: &TxDescriptor) -> TxRelease {
        if self.state == SlotState::Reserved
            && desc.len == self.desc.len
            && desc.offset == self.desc.offset
        {
            self.state = SlotState::Free;
            TxRelease::Claimed
        } else {
            TxRelease::NotMine
        }
    }
}

// =============================================================================
// TxAllocator
// =============================================================================

/// One-shot allocator carving protocol slots out of the transmit buffer
///
/// Slots are handed out contiguously from offset zero and never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxAllocator {
    next: u32,
    size: u32,
}

impl TxAllocator {
    /// Create an allocator for a transmit buffer of `buffer_size` bytes
    #[must_use]
    pub const fn new(buffer_size: u16) -> Self {
        Self {
            next: 0,
            size: buffer_size as u32,
        }
    }

    /// Bytes still available
    #[must_use]
    pub const fn remaining(&self) -> u16 {
        (self.size - self.next) as u16
    }

    /// Reserve `len` contiguous bytes
    ///
    /// # Errors
    ///
    /// [`ConfigError::TxBufferExhausted`] when fewer than `len` bytes remain.
    pub fn alloc(&mut self, len: u16) -> ConfigResult<TxDescriptor> {
        let len32 = len as u32;
        if len == 0 || len32 > self.size - self.next {
            return Err(ConfigError::TxBufferExhausted);
        }
        let desc = TxDescriptor::new(self.next as u16, len);
        let align = TX_SLOT_ALIGN as u32;
        let end = (self.next + len32).div_ceil(align) * align;
        self.next = end.min(self.size);
        Ok(desc)
    }
}
