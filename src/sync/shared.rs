//! ISR-safe engine wrapper using critical sections.

use super::primitives::CriticalSectionCell;
use crate::driver::config::MemacConfig;
use crate::driver::engine::{Memac, PollEvents};
use crate::driver::error::Result;
use crate::driver::transport::Transport;

/// ISR-safe [`Memac`] holder
///
/// Starts empty so it can live in a `static`; [`init`](Self::init) builds
/// the engine in place. All access goes through `critical_section::with()`,
/// disabling interrupts for the duration of the closure.
///
/// # Example
///
/// ```ignore
/// static MEMAC: SharedMemac<MmioTransport> = SharedMemac::new();
///
/// MEMAC.with(|memac| memac.send_udp(to, 5000, b"hello"));
/// ```
pub struct SharedMemac<T: Transport> {
    inner: CriticalSectionCell<Option<Memac<T>>>,
}

impl<T: Transport> SharedMemac<T> {
    /// Create an empty holder (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            inner: CriticalSectionCell::new(None),
        }
    }

    /// Build the engine over `bus`, replacing any previous one
    ///
    /// # Errors
    ///
    /// Any error from [`Memac::new`]; the holder is left unchanged.
    pub fn init(&self, bus: T, config: &MemacConfig) -> Result<()> {
        let memac = Memac::new(bus, config)?;
        self.inner.replace(Some(memac));
        Ok(())
    }

    /// Whether [`init`](Self::init) has succeeded
    pub fn is_initialized(&self) -> bool {
        self.inner.with(|slot| slot.is_some())
    }

    /// Remove the engine, leaving the holder empty
    pub fn take(&self) -> Option<Memac<T>> {
        self.inner.replace(None)
    }

    /// Execute a closure with exclusive access to the engine.
    ///
    /// Returns `None` before initialization.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Memac<T>) -> R,
    {
        self.inner.with(|slot| slot.as_mut().map(f))
    }

    /// Like [`with`](Self::with), but also returns `None` when the engine is
    /// already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Memac<T>) -> R,
    {
        self.inner.try_with(|slot| slot.as_mut().map(f)).flatten()
    }

    /// Run one [`Memac::poll`] iteration if initialized
    pub fn poll(&self) -> Option<PollEvents> {
        self.with(Memac::poll)
    }
}

impl<T: Transport> Default for SharedMemac<T> {
    fn default() -> Self {
        Self::new()
    }
}
