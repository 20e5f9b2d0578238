//! Volatile memory-mapped access helpers.
//!
//! All MEMAC and IOModule accesses go through these functions so that every
//! load and store is volatile and sized exactly as the hardware expects.

/// Read an 8-bit value at the given address
///
/// # Safety
/// The caller must ensure the address is a valid device location.
#[inline(always)]
pub unsafe fn read_u8(addr: usize) -> u8 {
    unsafe { core::ptr::read_volatile(addr as *const u8) }
}

/// Write an 8-bit value at the given address
///
/// # Safety
/// The caller must ensure the address is a valid device location.
#[inline(always)]
pub unsafe fn write_u8(addr: usize, value: u8) {
    unsafe { core::ptr::write_volatile(addr as *mut u8, value) }
}

/// Read a 16-bit value at the given address
///
/// # Safety
/// The caller must ensure the address is valid and 2-byte aligned.
#[inline(always)]
pub unsafe fn read_u16(addr: usize) -> u16 {
    unsafe { core::ptr::read_volatile(addr as *const u16) }
}

/// Write a 16-bit value at the given address
///
/// # Safety
/// The caller must ensure the address is valid and 2-byte aligned.
#[inline(always)]
pub unsafe fn write_u16(addr: usize, value: u16) {
    unsafe { core::ptr::write_volatile(addr as *mut u16, value) }
}

/// Read a 32-bit value at the given address
///
/// # Safety
/// The caller must ensure the address is valid and 4-byte aligned.
#[inline(always)]
pub unsafe fn read_u32(addr: usize) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// Write a 32-bit value at the given address
///
/// # Safety
/// The caller must ensure the address is valid and 4-byte aligned.
#[inline(always)]
pub unsafe fn write_u32(addr: usize, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}
