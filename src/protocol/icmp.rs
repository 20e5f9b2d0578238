//! ICMP echo responder

use crate::descriptor::{RxDescriptor, SlotState, TxAllocator, TxDescriptor, TxRelease, TxSlot};
use crate::driver::error::ConfigResult;
use crate::driver::transport::Transport;
use crate::internal::constants::{
    ETH_HEADER_LEN, ICMP_ECHO_REPLY, ICMP_ECHO_REQUEST, ICMP_HEADER_LEN, ICMP_SLOT_LEN,
    IP_PAYLOAD_OFFSET, IP_PROTOCOL_ICMP,
};
use crate::protocol::{Protocol, RxOutcome};
use crate::wire::frame::{FrameRead, RxFrame, TxFrame};
use crate::wire::header::{
    compute_ip_checksum, icmp_checksum, init_ip_header, ip_header_len, offset,
};
use crate::wire::Identity;

/// ICMP diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IcmpStats {
    /// IPv4 packets carrying ICMP
    pub received: u32,
    /// Echo replies handed to the hardware
    pub replies_sent: u32,
}

/// ICMP echo responder state
#[derive(Debug)]
pub struct Icmp {
    local: Identity,
    slot: TxSlot,
    stats: IcmpStats,
}

impl Icmp {
    /// Claim a reply slot large enough for a full-MTU echo
    ///
    /// # Errors
    ///
    /// [`ConfigError::TxBufferExhausted`](crate::ConfigError::TxBufferExhausted)
    /// when the transmit buffer has no room for the slot.
    pub fn new(alloc: &mut TxAllocator, local: Identity) -> ConfigResult<Self> {
        let desc = alloc.alloc(ICMP_SLOT_LEN)?;

        #[cfg(feature = "defmt")]
        defmt::info!("ICMP slot at {=u16}, {=u16} bytes", desc.offset, desc.len);

        Ok(Self {
            local,
            slot: TxSlot::new(desc),
            stats: IcmpStats::default(),
        })
    }

    /// Reply slot state
    pub fn slot_state(&self) -> SlotState {
        self.slot.state()
    }

    /// Diagnostics
    pub fn stats(&self) -> IcmpStats {
        self.stats
    }
}

impl Protocol for Icmp {
    /// Expects a frame whose IPv4 header has already been validated
    fn on_receive<T: Transport + ?Sized>(
        &mut self,
        bus: &mut T,
        desc: &RxDescriptor,
    ) -> RxOutcome {
        let (ihl, icmp_len, ident, src_mac, src_ip) = {
            let rx = RxFrame::new(&*bus, desc);
            if rx.get_u8(offset::IP_PROTOCOL) != IP_PROTOCOL_ICMP {
                return RxOutcome::NotMine;
            }
            self.stats.received += 1;

            let ihl = ip_header_len(&rx);
            let total_len = rx.get_u16(offset::IP_TOTAL_LEN);
            if total_len < ihl + ICMP_HEADER_LEN
                || total_len > rx.len().saturating_sub(ETH_HEADER_LEN)
            {
                return RxOutcome::Bad;
            }
            let start = ETH_HEADER_LEN + ihl;

            let kind = rx.get_u8(start);
            let code = rx.get_u8(start + 1);
            if code != 0 || (kind != ICMP_ECHO_REQUEST && kind != ICMP_ECHO_REPLY) {
                return RxOutcome::Ignore;
            }
            if rx.get_ip(offset::IP_DST) != self.local.ip {
                return RxOutcome::Ignore;
            }

            let icmp_len = total_len - ihl;
            if icmp_checksum(&rx, start, icmp_len) != rx.get_u16(start + 2) {
                #[cfg(feature = "defmt")]
                defmt::debug!("ICMP checksum mismatch");
                return RxOutcome::Bad;
            }
            if kind == ICMP_ECHO_REPLY {
                return RxOutcome::Ignore;
            }
            (
                ihl,
                icmp_len,
                rx.get_u16(offset::IP_ID),
                rx.get_mac(offset::ETH_SRC),
                rx.get_ip(offset::IP_SRC),
            )
        };

        if !self.slot.is_free()
            || icmp_len > self.slot.capacity().saturating_sub(IP_PAYLOAD_OFFSET)
        {
            #[cfg(feature = "defmt")]
            defmt::debug!("ICMP echo dropped, slot {}", self.slot.state());
            return RxOutcome::Drop;
        }

        let mut frame = TxFrame::new(bus, self.slot.descriptor());
        let at = init_ip_header(
            &mut frame,
            &self.local,
            src_mac,
            src_ip,
            IP_PROTOCOL_ICMP,
            icmp_len,
        );
        frame.put_u16(offset::IP_ID, ident);
        frame.copy_from_rx(at, desc, ETH_HEADER_LEN + ihl, icmp_len);
        frame.put_u8(at, ICMP_ECHO_REPLY);
        let checksum = icmp_checksum(&frame, at, icmp_len);
        frame.put_u16(at + 2, checksum);
        compute_ip_checksum(&mut frame);

        self.slot.mark_pending(at + icmp_len);
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
