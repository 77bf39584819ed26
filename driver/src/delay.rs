//! Busy-wait delays.
//!
//! The driver never reads the busy flag, so every command is followed by a fixed wait.
//! Waits go through [embedded_hal::delay::DelayNs], so any platform delay can be plugged
//! in; [SpinDelay] is the hosted default.

use embedded_hal::delay::DelayNs;
use std::hint::spin_loop;
use std::time::{Duration, Instant};

/// Spins on the monotonic clock until the requested time has elapsed.
///
/// Never yields to the scheduler, so a wait cannot be stretched by a context switch
/// in the middle of an enable pulse. It can still be stretched by preemption, which
/// only makes the wait longer and is harmless for the display.
#[derive(Debug, Default, Copy, Clone)]
pub struct SpinDelay;

impl SpinDelay {
    pub fn new() -> Self {
        SpinDelay
    }
}

impl DelayNs for SpinDelay {
    fn delay_ns(&mut self, ns: u32) {
        let deadline = Instant::now() + Duration::from_nanos(ns as u64);
        while Instant::now() < deadline {
            spin_loop();
        }
    }
}
