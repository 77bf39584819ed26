use crate::port::IoPort;
use std::fmt::{Debug, Formatter};
use std::ptr::NonNull;

/// An [IoPort] over a raw register address, for targets where the I/O registers are
/// directly addressable.
pub struct RawPort {
    register: NonNull<u8>,
}

impl RawPort {
    /// Wraps the register at `register`.
    ///
    /// # Safety
    ///
    /// `register` must point to a byte that is valid for volatile reads and writes for
    /// the whole lifetime of the returned port, and nothing else may hold a reference
    /// to it in the meantime.
    pub unsafe fn new(register: NonNull<u8>) -> Self {
        RawPort { register }
    }

    /// Wraps the register at a fixed physical `address`.
    ///
    /// # Safety
    ///
    /// Same requirements as [RawPort::new]. Returns `None` for a null address.
    pub unsafe fn at_address(address: usize) -> Option<Self> {
        NonNull::new(address as *mut u8).map(|register| RawPort { register })
    }

    pub fn address(&self) -> usize {
        self.register.as_ptr().addr()
    }
}

impl Debug for RawPort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawPort({:#x})", self.address())
    }
}

impl IoPort for RawPort {
    #[inline(always)]
    fn read(&self) -> u8 {
        // SAFETY: validity for volatile access is the constructor's precondition.
        unsafe { self.register.as_ptr().read_volatile() }
    }

    #[inline(always)]
    fn write(&self, value: u8) {
        // SAFETY: validity for volatile access is the constructor's precondition.
        unsafe { self.register.as_ptr().write_volatile(value) }
    }
}
