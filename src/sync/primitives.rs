//! Interrupt-masked cell backing [`SharedMemac`](super::SharedMemac).

use core::cell::RefCell;
use critical_section::Mutex;

/// Static storage whose contents are only touched with interrupts masked
///
/// The poll loop and an interrupt handler may both reach the engine; each
/// access runs inside `critical_section::with`, and the `RefCell` catches a
/// handler that re-enters while the main loop holds the borrow.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Wrap `value`; usable in a `static` initializer.
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` on the contents inside a critical section.
    ///
    /// # Panics
    ///
    /// When the contents are already borrowed by an enclosing call.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Like [`with`](Self::with), but yields `None` instead of panicking on
    /// re-entry.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut guard = self.inner.borrow(cs).try_borrow_mut().ok()?;
            Some(f(&mut guard))
        })
    }

    /// Swap in `value`, returning the previous contents.
    pub fn replace(&self, value: T) -> T {
        critical_section::with(|cs| self.inner.borrow(cs).replace(value))
    }
}

// SAFETY: the RefCell is only reached through critical_section::with, so no
// two contexts observe it at once.
unsafe impl<T: Send> Sync for CriticalSectionCell<T> {}
