//! Receive packet descriptor
//!
//! Produced by the MEMAC when a frame lands in the circular receive buffer.
//! Every descriptor taken from the ready queue must be handed back through
//! the free queue, otherwise the receive buffer space it covers is leaked.

/// Receive packet descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxDescriptor {
    /// Frame length in bytes
    pub len: u16,
    /// Byte offset of the frame within the receive buffer
    pub offset: u16,
    /// Hardware status flags, passed through unchanged
    pub flags: u16,
}

impl RxDescriptor {
    /// Create a new descriptor
    #[must_use]
    pub const fn new(offset: u16, len: u16, flags: u16) -> Self {
        Self { len, offset, flags }
    }

    /// Decode the ready-queue word (offset high, length low) plus the flags word
    #[must_use]
    pub const fn from_queue_words(word: u32, flags: u16) -> Self {
        Self {
            len: (word & 0xFFFF) as u16,
            offset: (word >> 16) as u16,
            flags,
        }
    }

    /// Word written to the free queue to release this frame's buffer space
    ///
    /// The hardware only needs the length: frames are released in the order
    /// they were received.
    #[must_use]
    pub const fn release_word(&self) -> u32 {
        self.len as u32
    }
}
