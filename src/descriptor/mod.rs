//! Packet descriptor definitions
//!
//! The MEMAC exchanges frames with software through four hardware queues:
//!
//! | Queue  | Direction | Carries                                  |
//! |--------|-----------|------------------------------------------|
//! | TX PRQ | SW -> HW  | [`TxDescriptor`] ready for transmission  |
//! | TX PFQ | HW -> SW  | [`TxDescriptor`] whose frame has been sent |
//! | RX PRQ | HW -> SW  | [`RxDescriptor`] of a received frame     |
//! | RX PFQ | SW -> HW  | Released receive buffer space            |
//!
//! Descriptors never own memory; they locate a frame inside the fixed
//! circular transmit or receive buffer.

pub mod rx;
pub mod tx;

pub use rx::RxDescriptor;
pub use tx::{SlotState, TxAllocator, TxDescriptor, TxRelease, TxSlot};
