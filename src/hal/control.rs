//! MEMAC control and status lines
//!
//! The MEMAC has no control registers of its own. Resets, link speed and
//! receiver options are driven from the IOModule GPO1 word, and the descriptor
//! queue ready flags plus the measured receive speed come back on GPI1.
//!
//! ```text
//! GPO1: 17      16      15..12   11..8    7..6   5..4   3        2      1      0
//!       FCS_INC PRE_INC PRE_LEN  IPG_MIN  RX_SPD TX_SPD MDIO_PRE RX_RST TX_RST PHY_RST
//!                                                                  (resets active low)
//! GPI1: 6..5    3       2       1       0
//!       RX_SPD  RX_PFQ  RX_PRQ  TX_PFQ  TX_PRQ
//! ```

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::driver::config::MemoryMap;
use crate::hal::gpio::{GpiPort, GpoPort};
use crate::internal::constants::TX_OPTIONS_DEFAULT;
use crate::internal::mmio;

/// GPO1 bit positions
pub mod gpo_bits {
    /// PHY reset, active low
    pub const PHY_RST_N: u32 = 0;
    /// Transmitter reset, active low
    pub const TX_RST_N: u32 = 1;
    /// Receiver reset, active low
    pub const RX_RST_N: u32 = 2;
    /// MDIO preamble enable
    pub const PHY_MDIO_PRE: u32 = 3;
    /// Transmit speed code (2 bits)
    pub const TX_SPD: u32 = 4;
    /// Receive speed code (2 bits)
    pub const RX_SPD: u32 = 6;
    /// Minimum receive inter-packet gap (4 bits)
    pub const RX_IPG_MIN: u32 = 8;
    /// Receive preamble length (4 bits)
    pub const RX_PRE_LEN: u32 = 12;
    /// Keep the preamble in received frames
    pub const RX_PRE_INC: u32 = 16;
    /// Keep the FCS in received frames
    pub const RX_FCS_INC: u32 = 17;

    /// Both speed fields
    pub const SPEED_MASK: u32 = (0b11 << TX_SPD) | (0b11 << RX_SPD);
    /// Transmitter and receiver resets
    pub const MAC_RESET_MASK: u32 = (1 << TX_RST_N) | (1 << RX_RST_N);
    /// All receive control fields
    pub const RX_CONTROL_MASK: u32 = (0b1111 << RX_IPG_MIN)
        | (0b1111 << RX_PRE_LEN)
        | (1 << RX_PRE_INC)
        | (1 << RX_FCS_INC);
}

/// GPI1 bit positions
pub mod gpi_bits {
    /// TX packet ready queue can accept a descriptor
    pub const TX_PRQ_RDY: u32 = 0;
    /// TX packet free queue holds a completed descriptor
    pub const TX_PFQ_RDY: u32 = 1;
    /// RX packet ready queue holds a received frame
    pub const RX_PRQ_RDY: u32 = 2;
    /// RX packet free queue can accept a release
    pub const RX_PFQ_RDY: u32 = 3;
    /// Measured receive speed code (2 bits)
    pub const RX_SPD: u32 = 5;
}

/// Control word written at construction: all resets released
const GPO_INITIAL: u32 =
    (1 << gpo_bits::PHY_RST_N) | (1 << gpo_bits::TX_RST_N) | (1 << gpo_bits::RX_RST_N);

// =============================================================================
// Link Speed
// =============================================================================

/// MEMAC link speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkSpeed {
    /// 10 Mbps
    Mbps10,
    /// 100 Mbps
    Mbps100,
    /// 1000 Mbps
    Mbps1000,
}

impl LinkSpeed {
    /// Two-bit speed code used by the MEMAC and the RTL8211 status register
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            LinkSpeed::Mbps10 => 0b00,
            LinkSpeed::Mbps100 => 0b01,
            LinkSpeed::Mbps1000 => 0b10,
        }
    }

    /// Decode a speed code; `0b11` is reserved
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code & 0b11 {
            0b00 => Some(LinkSpeed::Mbps10),
            0b01 => Some(LinkSpeed::Mbps100),
            0b10 => Some(LinkSpeed::Mbps1000),
            _ => None,
        }
    }

    /// Speed in Mbps
    #[must_use]
    pub const fn mbps(self) -> u16 {
        match self {
            LinkSpeed::Mbps10 => 10,
            LinkSpeed::Mbps100 => 100,
            LinkSpeed::Mbps1000 => 1000,
        }
    }
}

// =============================================================================
// Receive Control
// =============================================================================

/// Receiver framing options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxControl {
    /// Minimum inter-packet gap (0-15)
    pub ipg_min: u8,
    /// Preamble length (0-15)
    pub preamble_len: u8,
    /// Keep the preamble in the receive buffer
    pub include_preamble: bool,
    /// Keep the FCS in the receive buffer
    pub include_fcs: bool,
}

impl RxControl {
    /// GPO1 bits for these options; out-of-range fields are truncated
    #[must_use]
    pub const fn to_bits(self) -> u32 {
        ((self.ipg_min as u32 & 0b1111) << gpo_bits::RX_IPG_MIN)
            | ((self.preamble_len as u32 & 0b1111) << gpo_bits::RX_PRE_LEN)
            | ((self.include_preamble as u32) << gpo_bits::RX_PRE_INC)
            | ((self.include_fcs as u32) << gpo_bits::RX_FCS_INC)
    }
}

/// GPO1 speed field value for `speed` on both directions
#[must_use]
pub const fn speed_bits(speed: LinkSpeed) -> u32 {
    (speed.code() << gpo_bits::TX_SPD) | (speed.code() << gpo_bits::RX_SPD)
}

/// Reset line bits; the lines are active low
#[must_use]
pub const fn reset_bits(mask: u32, asserted: bool) -> u32 {
    if asserted { 0 } else { mask }
}

// =============================================================================
// MAC Control
// =============================================================================

/// Queue ready flags sampled in one GPI read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueStatus {
    /// TX ready queue has space
    pub tx_ready_space: bool,
    /// TX free queue holds a completed descriptor
    pub tx_completed: bool,
    /// RX ready queue holds a frame
    pub rx_pending: bool,
    /// RX free queue has space
    pub rx_free_space: bool,
}

impl QueueStatus {
    /// Decode the GPI1 word
    #[must_use]
    pub const fn from_gpi(word: u32) -> Self {
        Self {
            tx_ready_space: word & (1 << gpi_bits::TX_PRQ_RDY) != 0,
            tx_completed: word & (1 << gpi_bits::TX_PFQ_RDY) != 0,
            rx_pending: word & (1 << gpi_bits::RX_PRQ_RDY) != 0,
            rx_free_space: word & (1 << gpi_bits::RX_PFQ_RDY) != 0,
        }
    }
}

/// Driver for the MEMAC control word and status flags
#[derive(Debug)]
pub struct MacControl {
    gpo: GpoPort,
    gpi: GpiPort,
    tx_options: usize,
}

impl MacControl {
    /// Take control of GPO1/GPI1 and release every reset line
    ///
    /// # Safety
    ///
    /// `map` must describe the real IOModule and MEMAC, and nothing else may
    /// write GPO1 while this exists.
    pub unsafe fn new(map: &MemoryMap) -> Self {
        // SAFETY: forwarded from the caller's guarantee
        unsafe {
            Self {
                gpo: GpoPort::new(map.gpo1(), GPO_INITIAL),
                gpi: GpiPort::new(map.gpi1()),
                tx_options: map.tx_pdq() + 4,
            }
        }
    }

    /// Enable the MDIO preamble and program the transmit options
    /// (preamble length 8, automatic preamble, automatic FCS)
    pub fn init(&mut self) {
        self.gpo.set_bit(gpo_bits::PHY_MDIO_PRE, true);
        // SAFETY: TX options register sits next to the TX PDQ
        unsafe { mmio::write_u32(self.tx_options, TX_OPTIONS_DEFAULT) }

        #[cfg(feature = "defmt")]
        defmt::info!("MEMAC control initialized, GPO1={:#010x}", self.gpo.value());
    }

    /// Assert or release the PHY reset line
    pub fn phy_reset(&mut self, asserted: bool) {
        self.gpo.set_bit(gpo_bits::PHY_RST_N, !asserted);
    }

    /// PHY reset line as an output pin (low = reset asserted)
    pub fn phy_reset_pin(&mut self) -> PhyResetPin<'_> {
        PhyResetPin { gpo: &mut self.gpo }
    }

    /// Assert or release the transmitter and receiver resets together
    pub fn reset(&mut self, asserted: bool) {
        self.gpo.modify(
            gpo_bits::MAC_RESET_MASK,
            reset_bits(gpo_bits::MAC_RESET_MASK, asserted),
        );
    }

    /// Program the transmit and receive speed
    pub fn set_speed(&mut self, speed: LinkSpeed) {
        self.gpo.modify(gpo_bits::SPEED_MASK, speed_bits(speed));

        #[cfg(feature = "defmt")]
        defmt::debug!("MEMAC speed set to {} Mbps", speed.mbps());
    }

    /// Receive speed measured by the MAC; `None` while the code is reserved
    pub fn speed(&self) -> Option<LinkSpeed> {
        LinkSpeed::from_code(self.gpi.read() >> gpi_bits::RX_SPD)
    }

    /// Program the receiver framing options
    pub fn rx_control(&mut self, ctrl: RxControl) {
        self.gpo.modify(gpo_bits::RX_CONTROL_MASK, ctrl.to_bits());
    }

    /// Sample the descriptor queue ready flags
    pub fn queue_status(&self) -> QueueStatus {
        QueueStatus::from_gpi(self.gpi.read())
    }

    /// Current control word
    #[must_use]
    pub const fn control_word(&self) -> u32 {
        self.gpo.value()
    }
}

/// PHY reset line borrowed from [`MacControl`]
///
/// The pin level is the line level: driving it low holds the PHY in reset.
#[derive(Debug)]
pub struct PhyResetPin<'a> {
    gpo: &'a mut GpoPort,
}

impl ErrorType for PhyResetPin<'_> {
    type Error = Infallible;
}

impl OutputPin for PhyResetPin<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.gpo.set_bit(gpo_bits::PHY_RST_N, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.gpo.set_bit(gpo_bits::PHY_RST_N, true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_codes() {
        assert_eq!(LinkSpeed::Mbps1000.code(), 0b10);
        assert_eq!(LinkSpeed::Mbps100.code(), 0b01);
        assert_eq!(LinkSpeed::Mbps10.code(), 0b00);
        assert_eq!(LinkSpeed::from_code(0b10), Some(LinkSpeed::Mbps1000));
        assert_eq!(LinkSpeed::from_code(0b11), None);
        assert_eq!(LinkSpeed::Mbps100.mbps(), 100);
    }

    #[test]
    fn speed_bits_cover_both_directions() {
        assert_eq!(speed_bits(LinkSpeed::Mbps1000), 0b10_10_0000);
        assert_eq!(speed_bits(LinkSpeed::Mbps1000) & !gpo_bits::SPEED_MASK, 0);
        assert_eq!(speed_bits(LinkSpeed::Mbps10), 0);
    }

    #[test]
    fn rx_control_bits() {
        let ctrl = RxControl {
            ipg_min: 12,
            preamble_len: 7,
            include_preamble: false,
            include_fcs: true,
        };
        assert_eq!(ctrl.to_bits(), (12 << 8) | (7 << 12) | (1 << 17));
        assert_eq!(ctrl.to_bits() & !gpo_bits::RX_CONTROL_MASK, 0);

        let wide = RxControl {
            ipg_min: 0xFF,
            ..RxControl::default()
        };
        assert_eq!(wide.to_bits(), 0xF << 8);
    }

    #[test]
    fn reset_lines_are_active_low() {
        assert_eq!(reset_bits(gpo_bits::MAC_RESET_MASK, true), 0);
        assert_eq!(reset_bits(gpo_bits::MAC_RESET_MASK, false), 0b110);
    }

    #[test]
    fn queue_status_decode() {
        let status = QueueStatus::from_gpi(0b0110_0101);
        assert!(status.tx_ready_space);
        assert!(!status.tx_completed);
        assert!(status.rx_pending);
        assert!(!status.rx_free_space);
    }

    #[test]
    fn control_over_ram_registers() {
        // GPO1 at +0x10 and GPI1 at +0x20 of a fake IOModule; TX options at
        // +0x20004 of a fake MEMAC is out of reach, so only GPIO is exercised
        let mut iomodule = [0u32; 16];
        iomodule[8] = (0b01 << gpi_bits::RX_SPD) | (1 << gpi_bits::RX_PRQ_RDY);
        let map = MemoryMap {
            memac_base: 0,
            iomodule_base: iomodule.as_mut_ptr() as usize,
        };
        let mut ctrl = unsafe { MacControl::new(&map) };
        assert_eq!(ctrl.control_word(), GPO_INITIAL);

        ctrl.set_speed(LinkSpeed::Mbps1000);
        ctrl.reset(true);
        assert_eq!(ctrl.control_word(), 0b10_10_0001);
        ctrl.reset(false);

        ctrl.phy_reset_pin().set_low().unwrap();
        assert_eq!(ctrl.control_word() & 1, 0);
        ctrl.phy_reset(false);
        assert_eq!(ctrl.control_word() & 1, 1);
        assert_eq!(iomodule[4], ctrl.control_word());

        assert_eq!(ctrl.speed(), Some(LinkSpeed::Mbps100));
        assert!(ctrl.queue_status().rx_pending);
    }
}
