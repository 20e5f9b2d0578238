//! Protocol handlers
//!
//! Each handler inspects received frames in place, builds replies in its own
//! transmit slot and reclaims that slot when the hardware reports the frame
//! sent. The engine drives every handler through the [`Protocol`] trait:
//!
//! - [`Arp`]: answers ARP requests for the local address
//! - [`Ip`]: validates IPv4 headers and dispatches to [`Icmp`] and [`Udp`]
//! - [`Icmp`]: answers echo requests
//! - [`Udp`]: one-datagram inbox plus an outbound datagram slot

pub mod arp;
pub mod icmp;
pub mod ip;
pub mod udp;

pub use arp::{Arp, ArpStats};
pub use icmp::{Icmp, IcmpStats};
pub use ip::{Ip, IpStats};
pub use udp::{Udp, UdpEndpoint, UdpMeta, UdpStats};

pub use crate::descriptor::TxRelease;
use crate::descriptor::{RxDescriptor, TxDescriptor};
use crate::driver::transport::Transport;

/// What a handler did with a received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxOutcome {
    /// Not this handler's protocol; the next handler may look at it
    NotMine,
    /// This handler's protocol, but nothing to do (not addressed to us, or
    /// a message type that needs no answer)
    Ignore,
    /// Valid, but the reply slot is busy or too small
    Drop,
    /// Malformed or failed a checksum
    Bad,
    /// Handled; a reply may now be pending
    Success,
}

impl RxOutcome {
    /// Whether a handler took responsibility for the frame
    #[must_use]
    pub const fn is_claimed(self) -> bool {
        !matches!(self, RxOutcome::NotMine)
    }
}

/// Common interface of every protocol handler
pub trait Protocol {
    /// Inspect a received frame
    ///
    /// The frame stays in the receive buffer; the caller releases it
    /// afterwards regardless of the outcome.
    fn on_receive<T: Transport + ?Sized>(&mut self, bus: &mut T, frame: &RxDescriptor)
    -> RxOutcome;

    /// Offer a transmit descriptor the hardware has finished with
    fn on_transmit_free(&mut self, desc: &TxDescriptor) -> TxRelease;

    /// Submit a pending reply if the TX ready queue has space
    ///
    /// Returns `true` when at least one descriptor was submitted.
    fn try_send<T: Transport + ?Sized>(&mut self, bus: &mut T) -> bool;
}
