//! Error types for the MEMAC raw packet engine
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Initialization and configuration failures
//! - [`TxError`]: Application-initiated transmit failures
//! - [`IoError`]: PHY/MDIO and hardware queue failures
//!
//! The unified [`Error`] enum wraps all domain errors.
//!
//! Inbound frame handling never produces these errors: protocol handlers
//! report in-band outcomes through [`RxOutcome`](crate::protocol::RxOutcome).

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and initialization errors
///
/// These are the only fatal errors of the engine: startup must halt when
/// any of them is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Invalid configuration parameter
    InvalidConfig,
    /// Buffer size is not a power of two in the supported range
    InvalidBufferSize,
    /// Not enough transmit buffer space left for a protocol slot
    TxBufferExhausted,
    /// No protocol handler enabled
    NoProtocols,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidConfig => "invalid configuration",
            ConfigError::InvalidBufferSize => "invalid buffer size",
            ConfigError::TxBufferExhausted => "transmit buffer exhausted",
            ConfigError::NoProtocols => "no protocols enabled",
        }
    }
}

// =============================================================================
// Transmit Errors
// =============================================================================

/// Transmit errors for application-initiated frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxError {
    /// The protocol's transmit slot is pending or reserved
    SlotBusy,
    /// Hardware transmit ready queue has no space
    QueueFull,
    /// Payload does not fit the transmit slot
    FrameTooLarge,
    /// Protocol is not enabled in this configuration
    Disabled,
}

impl core::fmt::Display for TxError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TxError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            TxError::SlotBusy => "transmit slot busy",
            TxError::QueueFull => "transmit queue full",
            TxError::FrameTooLarge => "frame too large for slot",
            TxError::Disabled => "protocol disabled",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Hardware and PHY errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Operation timed out
    Timeout,
    /// PHY communication error or unexpected PHY identity
    PhyError,
    /// Invalid PHY address (must be 0-31)
    InvalidPhyAddress,
    /// Invalid PHY register address (must be 0-31)
    InvalidRegister,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Timeout => "operation timed out",
            IoError::PhyError => "PHY communication error",
            IoError::InvalidPhyAddress => "invalid PHY address",
            IoError::InvalidRegister => "invalid PHY register",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::TxBufferExhausted)) => { /* halt */ }
///     Err(Error::Tx(TxError::SlotBusy)) => { /* try later */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// Transmit error
    Tx(TxError),
    /// I/O error
    Io(IoError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Tx(e) => write!(f, "tx: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<TxError> for Error {
    fn from(e: TxError) -> Self {
        Error::Tx(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for engine operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for transmit operations
pub type TxResult<T> = core::result::Result<T, TxError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================
