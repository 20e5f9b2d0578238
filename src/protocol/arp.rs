//! ARP responder
//!
//! Answers Ethernet/IPv4 ARP requests for the local address. The reply slot
//! is pre-filled at construction with every field that never changes, so a
//! reply only patches the requester's addresses.

use crate::descriptor::{RxDescriptor, SlotState, TxAllocator, TxDescriptor, TxRelease, TxSlot};
use crate::driver::error::ConfigResult;
use crate::driver::transport::Transport;
use crate::internal::constants::{
    ARP_HLEN, ARP_HTYPE_ETHERNET, ARP_OPER_REPLY, ARP_OPER_REQUEST, ARP_PLEN, ARP_PTYPE_IPV4,
    ARP_SLOT_LEN, ETH_HEADER_LEN, ETHERTYPE_ARP,
};
use crate::protocol::{Protocol, RxOutcome};
use crate::wire::frame::{FrameRead, RxFrame, TxFrame};
use crate::wire::header::{init_ethernet_header, offset};
use crate::wire::{Identity, MacAddress};

/// ARP field offsets within the frame
mod field {
    pub const HTYPE: u16 = 14;
    pub const PTYPE: u16 = 16;
    pub const HLEN: u16 = 18;
    pub const PLEN: u16 = 19;
    pub const OPER: u16 = 20;
    pub const SHA: u16 = 22;
    pub const SPA: u16 = 28;
    pub const THA: u16 = 32;
    pub const TPA: u16 = 38;
}

/// ARP diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArpStats {
    /// Frames carrying the ARP EtherType
    pub received: u32,
    /// Replies handed to the hardware
    pub replies_sent: u32,
}

/// ARP responder state
#[derive(Debug)]
pub struct Arp {
    local: Identity,
    slot: TxSlot,
    stats: ArpStats,
}

impl Arp {
    /// Claim a reply slot and pre-fill its constant fields
    ///
    /// # Errors
    ///
    /// [`ConfigError::TxBufferExhausted`](crate::ConfigError::TxBufferExhausted)
    /// when the transmit buffer has no room for the slot.
    pub fn new<T: Transport + ?Sized>(
        bus: &mut T,
        alloc: &mut TxAllocator,
        local: Identity,
    ) -> ConfigResult<Self> {
        let desc = alloc.alloc(ARP_SLOT_LEN)?;

        let mut frame = TxFrame::new(bus, desc);
        init_ethernet_header(&mut frame, &local, MacAddress::BROADCAST, ETHERTYPE_ARP);
        frame.put_u16(field::HTYPE, ARP_HTYPE_ETHERNET);
        frame.put_u16(field::PTYPE, ARP_PTYPE_IPV4);
        frame.put_u8(field::HLEN, ARP_HLEN);
        frame.put_u8(field::PLEN, ARP_PLEN);
        frame.put_u16(field::OPER, ARP_OPER_REPLY);
        frame.put_mac(field::SHA, local.mac);
        frame.put_ip(field::SPA, local.ip);

        #[cfg(feature = "defmt")]
        defmt::info!("ARP slot at {=u16}, {=u16} bytes", desc.offset, desc.len);

        Ok(Self {
            local,
            slot: TxSlot::new(desc),
            stats: ArpStats::default(),
        })
    }

    /// Reply slot state
    pub fn slot_state(&self) -> SlotState {
        self.slot.state()
    }

    /// Reply slot descriptor
    pub fn descriptor(&self) -> TxDescriptor {
        self.slot.descriptor()
    }

    /// Diagnostics
    pub fn stats(&self) -> ArpStats {
        self.stats
    }
}

impl Protocol for Arp {
    fn on_receive<T: Transport + ?Sized>(
        &mut self,
        bus: &mut T,
        desc: &RxDescriptor,
    ) -> RxOutcome {
        let (sha, spa) = {
            let rx = RxFrame::new(&*bus, desc);
            if rx.len() < ETH_HEADER_LEN || rx.get_u16(offset::ETH_TYPE) != ETHERTYPE_ARP {
                return RxOutcome::NotMine;
            }
            self.stats.received += 1;

            if rx.len() < ARP_SLOT_LEN
                || rx.get_u16(field::HTYPE) != ARP_HTYPE_ETHERNET
                || rx.get_u16(field::PTYPE) != ARP_PTYPE_IPV4
                || rx.get_u8(field::HLEN) != ARP_HLEN
                || rx.get_u8(field::PLEN) != ARP_PLEN
                || rx.get_u16(field::OPER) != ARP_OPER_REQUEST
            {
                return RxOutcome::Bad;
            }
            if rx.get_ip(field::TPA) != self.local.ip {
                return RxOutcome::Ignore;
            }
            (rx.get_mac(field::SHA), rx.get_ip(field::SPA))
        };

        if !self.slot.is_free() {
            #[cfg(feature = "defmt")]
            defmt::debug!("ARP reply slot busy, dropping request from {}", spa.octets());
            return RxOutcome::Drop;
        }

        let mut frame = TxFrame::new(bus, self.slot.descriptor());
        frame.put_mac(offset::ETH_DST, sha);
        frame.put_mac(field::THA, sha);
        frame.put_ip(field::TPA, spa);
        self.slot.mark_pending(ARP_SLOT_LEN);
        RxOutcome::Success
    }

    fn on_transmit_free(&mut self, desc: &TxDescriptor) -> TxRelease {
        self.slot.release(desc)
    }

    fn try_send<T: Transport + ?Sized>(&mut self, bus: &mut T) -> bool {
        let sent = self.slot.try_submit(bus);
        if sent {
            self.stats.replies_sent += 1;
        }
        sent
    }
}
