//! Command transports.
//!
//! A transport turns a logical `(value, mode)` pair into timed pin toggles on one of the
//! supported interconnects, and knows how to bring a display in an unknown state into
//! a known one. See [DisplayTransport] for the interface, and [ParallelTransport] and
//! [ShiftRegTransport] for the implementations.
//!
//! # Timing
//!
//! The busy flag is never read back, so every step is followed by a fixed wait long
//! enough for the slowest controller on the market. The values below are minimums;
//! making them longer only makes the display slower.

mod parallel;
mod shift_reg;

use crate::lcd::command::*;
use crate::lcd::state::{CharSize, DisplayState};
use embedded_hal::delay::DelayNs;
use std::fmt::Debug;
pub use parallel::*;
pub use shift_reg::*;

/// Wait after power-up before the first instruction (datasheet: 40ms after Vcc > 2.7V).
pub const POWER_ON_WAIT_MS: u32 = 100;
/// Waits after each of the three reset writes of the initialization handshake.
pub const HANDSHAKE_WAITS_US: [u32; 3] = [4500, 4500, 150];
/// Execution time of every instruction except clear and home.
pub const EXEC_TIME_US: u32 = 40;
/// Execution time of clear and home.
pub const HOME_CLEAR_EXEC_US: u32 = 2000;
/// High time of the enable pulse.
pub const ENABLE_PULSE_US: u32 = 5;
/// Gap between the two nibbles of a 4-bit transfer.
pub const NIBBLE_GAP_US: u32 = 5;
/// Wait after setting a CGRAM address and after each glyph row.
pub const CGRAM_WRITE_US: u32 = 40;
/// Wait after a backlight change.
pub const BACKLIGHT_US: u32 = 40;

pub const BACKLIGHT_ON: u8 = 255;
pub const BACKLIGHT_OFF: u8 = 0;

/// Selects the register a byte is written to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SendMode {
    /// Instruction register (RS low).
    Command,
    /// Data register (RS high): characters, glyph rows.
    Data,
}

impl SendMode {
    pub fn is_data(self) -> bool {
        self == SendMode::Data
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TransportKind {
    Parallel4Bit,
    Parallel8Bit,
    ShiftRegister,
}

/// Low-level interface of a display interconnect.
///
/// Chosen once when the [crate::lcd::Lcd] handle is built and never swapped afterwards.
pub trait DisplayTransport: Debug {
    fn kind(&self) -> TransportKind;

    /// Bus width flag for the function set instruction.
    fn function_flags(&self) -> u8 {
        match self.kind() {
            TransportKind::Parallel8Bit => EIGHT_BIT_MODE,
            TransportKind::Parallel4Bit | TransportKind::ShiftRegister => FOUR_BIT_MODE,
        }
    }

    /// Sends one byte and waits until the controller has executed it
    /// (except for clear and home, see [HOME_CLEAR_EXEC_US]).
    fn send(&mut self, value: u8, mode: SendMode, delay: &mut dyn DelayNs);

    /// Resets and initializes the display for the given geometry.
    ///
    /// Leaves the display on, cursor and blink off, cleared, writing left to right.
    fn begin(
        &mut self,
        state: &mut DisplayState,
        cols: u8,
        rows: u8,
        char_size: CharSize,
        delay: &mut dyn DelayNs,
    );

    /// Sets the backlight level. None of the built-in transports has a backlight line,
    /// so the default does nothing.
    fn set_backlight(&mut self, _value: u8) {}
}

/// Records the geometry and waits for the controller to power up.
///
/// The bus width bit always comes from `transport`, whatever `state` was created with.
pub(crate) fn power_on<T: DisplayTransport + ?Sized>(
    transport: &T,
    state: &mut DisplayState,
    cols: u8,
    rows: u8,
    char_size: CharSize,
    delay: &mut dyn DelayNs,
) {
    state.function = (state.function & !EIGHT_BIT_MODE) | transport.function_flags();
    state.configure(cols, rows, char_size);
    delay.delay_ms(POWER_ON_WAIT_MS);
}

/// Shared end of every `begin`, once the controller is listening on the right bus width.
pub(crate) fn finish_begin<T: DisplayTransport + ?Sized>(
    transport: &mut T,
    state: &mut DisplayState,
    delay: &mut dyn DelayNs,
) {
    transport.send(FUNCTION_SET | state.function, SendMode::Command, delay);

    state.control = DISPLAY_ON | CURSOR_OFF | BLINK_OFF;
    transport.send(DISPLAY_CONTROL | state.control, SendMode::Command, delay);

    transport.send(CLEAR_DISPLAY, SendMode::Command, delay);
    delay.delay_us(HOME_CLEAR_EXEC_US);

    state.mode = ENTRY_LEFT | ENTRY_SHIFT_DECREMENT;
    transport.send(ENTRY_MODE_SET | state.mode, SendMode::Command, delay);

    state.initialized = true;
}
