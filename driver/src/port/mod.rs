//! Bus primitives over byte-wide memory-mapped I/O registers.
//!
//! An [IoPort] is one 8-bit register where each bit drives one physical line. The
//! transports only ever touch the hardware through this trait, so the same code runs
//! on a raw register pointer ([raw::RawPort]), on a page mapped from `/dev/mem`
//! ([mmap::MmapPort]), or on a recording mock in tests.

pub mod mmap;
pub mod raw;

use crate::{LcdError, LcdResult};
use bitvec::prelude::*;
use std::fmt::Debug;
pub use mmap::*;
pub use raw::*;

/// A single 8-bit I/O register.
///
/// Implementations must use volatile semantics: every [IoPort::read] and [IoPort::write]
/// reaches the register, in program order, and is never merged or elided.
pub trait IoPort: Debug {
    /// Reads the current value of the register.
    fn read(&self) -> u8;

    /// Writes a new value to the register.
    fn write(&self, value: u8);

    /// Read-modify-write: clears the bits in `clear`, then sets the bits in `set`.
    #[inline(always)]
    fn modify(&self, clear: u8, set: u8) {
        let value = self.read();
        self.write((value & !clear) | set);
    }

    /// Drives the bit at `pos` high, leaving the other bits untouched.
    #[inline(always)]
    fn set_bit(&self, pos: u8) {
        self.modify(0, 1 << (pos & 7));
    }

    /// Drives the bit at `pos` low, leaving the other bits untouched.
    #[inline(always)]
    fn clear_bit(&self, pos: u8) {
        self.modify(1 << (pos & 7), 0);
    }

    #[inline(always)]
    fn write_bit(&self, pos: u8, high: bool) {
        if high {
            self.set_bit(pos);
        } else {
            self.clear_bit(pos);
        }
    }
}

/// Order in which [shift_out] emits the bits of a byte.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum BitOrder {
    #[default] LsbFirst,
    MsbFirst,
}

/// Bit-bangs `value` out on `data_pin`, pulsing `clock_pin` once per bit.
///
/// For each of the 8 positions the data line is set first and then the clock line is
/// raised and lowered, so a shift register clocking on the rising edge samples a
/// stable bit.
#[inline]
pub fn shift_out<P: IoPort + ?Sized>(
    port: &P,
    data_pin: u8,
    clock_pin: u8,
    order: BitOrder,
    value: u8,
) {
    for i in 0..8 {
        let bit = match order {
            BitOrder::LsbFirst => i,
            BitOrder::MsbFirst => 7 - i,
        };
        port.write_bit(data_pin, value & (1 << bit) != 0);
        port.set_bit(clock_pin);
        port.clear_bit(clock_pin);
    }
}

/// Set of pin indices claimed on one byte-wide port.
///
/// Used by the transports to reject wiring where two lines share a bit.
#[derive(Copy, Clone, Debug)]
pub struct PinSet {
    bits: BitArray<[u8; 1], Lsb0>,
}

impl PinSet {
    pub fn empty() -> Self {
        PinSet { bits: BitArray::new([0]) }
    }

    /// Claims all `pins`, failing on an index outside 0-7 or a pin given twice.
    pub fn claim(pins: &[u8]) -> LcdResult<Self> {
        let mut set = Self::empty();
        for &pin in pins {
            set.insert(pin)?;
        }
        Ok(set)
    }

    pub fn insert(&mut self, pin: u8) -> LcdResult<()> {
        if pin >= 8 {
            return Err(LcdError::InvalidPin(pin));
        }
        if self.bits[pin as usize] {
            return Err(LcdError::PinConflict(pin));
        }
        self.bits.set(pin as usize, true);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, pin: u8) -> bool {
        pin < 8 && self.bits[pin as usize]
    }

    /// The claimed pins as a register mask.
    #[cfg(test)]
    pub(crate) fn mask(&self) -> u8 {
        self.bits.into_inner()[0]
    }

    /// Returns the lowest claimed pin that is also set in `mask`, if any.
    pub fn first_overlap(&self, mask: u8) -> Option<u8> {
        self.bits
            .iter_ones()
            .find(|&i| mask & (1 << i) != 0)
            .map(|i| i as u8)
    }
}
