//! MEMAC packet engine
//!
//! [`Memac`] owns the transport and every enabled protocol handler. Each
//! call to [`Memac::poll`] performs one bounded unit of work:
//!
//! 1. Reclaim at most one transmitted descriptor and hand it to its owner
//! 2. Receive at most one frame, dispatch it, and release it to the hardware
//! 3. Submit any pending replies while the TX ready queue has room
//!
//! Nothing blocks except the RX free queue release, which is bounded by the
//! transport.

use super::config::{MemacConfig, Protocols, validate_buffer_size};
use super::error::{ConfigError, Result, TxError};
use super::transport::Transport;
use crate::descriptor::{RxDescriptor, TxAllocator, TxDescriptor, TxRelease};
use crate::protocol::{
    Arp, ArpStats, IcmpStats, Ip, IpStats, Protocol, RxOutcome, UdpEndpoint, UdpMeta, UdpStats,
};
use crate::wire::Identity;

// =============================================================================
// Diagnostics
// =============================================================================

/// Engine-level event counters
///
/// Diagnostic only; never reset by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Counters {
    /// Frames taken from the RX ready queue
    pub rx: u32,
    /// Frames no handler claimed
    pub rx_unhandled: u32,
    /// Frames a handler dropped for lack of a free slot
    pub rx_dropped: u32,
    /// Malformed frames
    pub rx_bad: u32,
    /// Frames for this protocol stack that needed no action
    pub rx_ignored: u32,
    /// RX free queue releases that timed out
    pub rx_release_errors: u32,
    /// Completed transmit descriptors no handler owned
    pub tx_unhandled: u32,
}

impl Counters {
    fn record(&mut self, outcome: RxOutcome) {
        match outcome {
            RxOutcome::NotMine => self.rx_unhandled += 1,
            RxOutcome::Ignore => self.rx_ignored += 1,
            RxOutcome::Drop => self.rx_dropped += 1,
            RxOutcome::Bad => self.rx_bad += 1,
            RxOutcome::Success => {}
        }
    }
}

/// What a single [`Memac::poll`] call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollEvents {
    /// A transmitted descriptor was reclaimed
    pub reclaimed: bool,
    /// Outcome of the received frame, if one was waiting
    pub received: Option<RxOutcome>,
    /// At least one pending frame was submitted
    pub submitted: bool,
}

impl PollEvents {
    /// Nothing happened; the caller may idle
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        !self.reclaimed && self.received.is_none() && !self.submitted
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Raw Ethernet/IPv4 packet engine
///
/// # Example
/// ```ignore
/// let config = MemacConfig::new()
///     .with_ip_address([10, 0, 0, 2])
///     .with_udp_port(5000);
/// let bus = unsafe { MmioTransport::new(&config) };
/// let mut memac = Memac::new(bus, &config)?;
///
/// loop {
///     memac.poll();
///     if let Some(meta) = memac.recv_udp(&mut buf) {
///         memac.send_udp(meta.source, 5000, &buf[..meta.len])?;
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Memac<T: Transport> {
    bus: T,
    local: Identity,
    arp: Option<Arp>,
    ip: Option<Ip>,
    counters: Counters,
}

impl<T: Transport> Memac<T> {
    /// Validate `config` and claim a transmit slot for every enabled handler
    ///
    /// Slots are allocated in the order ARP, ICMP, UDP.
    ///
    /// # Errors
    ///
    /// - Any [`MemacConfig::validate`] error
    /// - [`ConfigError::InvalidConfig`] when the transport's buffer sizes
    ///   differ from the configured ones
    /// - [`ConfigError::TxBufferExhausted`] when the slots do not fit
    pub fn new(mut bus: T, config: &MemacConfig) -> Result<Self> {
        config.validate()?;
        validate_buffer_size(bus.tx_buffer_size())?;
        validate_buffer_size(bus.rx_buffer_size())?;
        if bus.tx_buffer_size() != config.tx_buffer_size
            || bus.rx_buffer_size() != config.rx_buffer_size
        {
            return Err(ConfigError::InvalidConfig.into());
        }

        let local = config.identity();
        let protocols = config.protocols;
        let mut alloc = TxAllocator::new(bus.tx_buffer_size());

        let arp = if protocols.contains(Protocols::ARP) {
            Some(Arp::new(&mut bus, &mut alloc, local)?)
        } else {
            None
        };
        let ip = if protocols.contains(Protocols::IP) {
            let udp = protocols.contains(Protocols::UDP).then_some(config.udp_port);
            Some(Ip::new(
                &mut alloc,
                local,
                config.ip_dispatch,
                protocols.contains(Protocols::ICMP),
                udp,
            )?)
        } else {
            None
        };

        #[cfg(feature = "defmt")]
        defmt::info!(
            "MEMAC engine up: {} {}, {=u16} TX bytes unallocated",
            local.mac,
            local.ip,
            alloc.remaining()
        );

        Ok(Self {
            bus,
            local,
            arp,
            ip,
            counters: Counters::default(),
        })
    }

    /// Run one reclaim / receive / submit iteration
    pub fn poll(&mut self) -> PollEvents {
        let mut events = PollEvents::default();

        if let Some(desc) = self.bus.reclaim_tx() {
            events.reclaimed = true;
            if !self.route_tx_free(&desc).is_claimed() {
                #[cfg(feature = "defmt")]
                defmt::trace!("unowned TX completion {}", desc);
                self.counters.tx_unhandled += 1;
            }
        }

        if let Some(desc) = self.bus.receive() {
            self.counters.rx += 1;
            let outcome = self.route_rx(&desc);
            self.counters.record(outcome);

            if self.bus.release_rx(&desc).is_err() {
                #[cfg(feature = "defmt")]
                defmt::debug!("RX free queue release timed out for {}", desc);
                self.counters.rx_release_errors += 1;
            }
            events.received = Some(outcome);
        }

        events.submitted = self.flush();
        events
    }

    /// Submit pending replies; returns whether anything was submitted
    pub fn flush(&mut self) -> bool {
        let mut sent = false;
        if let Some(arp) = self.arp.as_mut() {
            sent |= arp.try_send(&mut self.bus);
        }
        if let Some(ip) = self.ip.as_mut() {
            sent |= ip.try_send(&mut self.bus);
        }
        sent
    }

    fn route_rx(&mut self, desc: &RxDescriptor) -> RxOutcome {
        if let Some(arp) = self.arp.as_mut() {
            let outcome = arp.on_receive(&mut self.bus, desc);
            if outcome.is_claimed() {
                return outcome;
            }
        }
        match self.ip.as_mut() {
            Some(ip) => ip.on_receive(&mut self.bus, desc),
            None => RxOutcome::NotMine,
        }
    }

    fn route_tx_free(&mut self, desc: &TxDescriptor) -> TxRelease {
        if let Some(arp) = self.arp.as_mut()
            && arp.on_transmit_free(desc).is_claimed()
        {
            return TxRelease::Claimed;
        }
        match self.ip.as_mut() {
            Some(ip) => ip.on_transmit_free(desc),
            None => TxRelease::NotMine,
        }
    }

    // =========================================================================
    // UDP
    // =========================================================================

    /// Queue a datagram; it is submitted on the next [`poll`](Self::poll) or
    /// [`flush`](Self::flush)
    ///
    /// # Errors
    ///
    /// - [`TxError::Disabled`] when the UDP endpoint is not enabled
    /// - [`TxError::SlotBusy`] while the previous datagram is in flight
    /// - [`TxError::FrameTooLarge`] for a payload over 1472 bytes
    pub fn send_udp(&mut self, to: UdpEndpoint, src_port: u16, payload: &[u8]) -> Result<()> {
        let udp = self
            .ip
            .as_mut()
            .and_then(Ip::udp_mut)
            .ok_or(TxError::Disabled)?;
        udp.send(&mut self.bus, to, src_port, payload)?;
        Ok(())
    }

    /// Take the waiting datagram, if any
    ///
    /// See [`Udp::recv`](crate::protocol::Udp::recv).
    pub fn recv_udp(&mut self, buf: &mut [u8]) -> Option<UdpMeta> {
        self.ip.as_mut()?.udp_mut()?.recv(buf)
    }

    /// Rebind the UDP endpoint
    ///
    /// # Errors
    ///
    /// [`TxError::Disabled`] when the UDP endpoint is not enabled.
    pub fn bind_udp(&mut self, port: Option<u16>) -> Result<()> {
        let udp = self
            .ip
            .as_mut()
            .and_then(Ip::udp_mut)
            .ok_or(TxError::Disabled)?;
        udp.bind(port);
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Local addresses
    pub fn identity(&self) -> Identity {
        self.local
    }

    /// Engine counters
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// ARP counters, if ARP is enabled
    pub fn arp_stats(&self) -> Option<ArpStats> {
        self.arp.as_ref().map(Arp::stats)
    }

    /// IPv4 counters, if IP is enabled
    pub fn ip_stats(&self) -> Option<IpStats> {
        self.ip.as_ref().map(Ip::stats)
    }

    /// ICMP counters, if ICMP is enabled
    pub fn icmp_stats(&self) -> Option<IcmpStats> {
        self.ip.as_ref()?.icmp().map(|icmp| icmp.stats())
    }

    /// UDP counters, if UDP is enabled
    pub fn udp_stats(&self) -> Option<UdpStats> {
        self.ip.as_ref()?.udp().map(|udp| udp.stats())
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.bus
    }

    /// Underlying transport, mutably
    ///
    /// Writing into allocated transmit slots corrupts pending replies.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.bus
    }

    /// Tear down the engine and return the transport
    pub fn into_transport(self) -> T {
        self.bus
    }
}
