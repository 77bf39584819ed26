//! Transport-agnostic display handle.
//!
//! [Lcd] keeps a mirror of the controller's configuration registers ([DisplayState]) and
//! expresses every operation as a sequence of [DisplayTransport::send] calls. Operations
//! are fire-and-forget, like the hardware: nothing is read back, and out-of-range input
//! is clamped or masked. The `try_` variants validate instead and report an [LcdError].

pub mod command;
mod print;
pub mod state;

use crate::transport::*;
use crate::{LcdError, LcdResult};
use command::*;
use embedded_hal::delay::DelayNs;
use log::warn;
pub use state::{CharSize, DisplayState};

/// A character display bound to one transport.
#[derive(Debug)]
pub struct Lcd<T: DisplayTransport, D: DelayNs> {
    transport: T,
    delay: D,
    state: DisplayState,
}

impl<T: DisplayTransport, D: DelayNs> Lcd<T, D> {
    /// Binds the handle to `transport`. Call [Lcd::begin] before anything else.
    pub fn new(transport: T, delay: D) -> Self {
        let state = DisplayState::new(transport.function_flags());
        Lcd {
            transport,
            delay,
            state,
        }
    }

    pub fn kind(&self) -> TransportKind {
        self.transport.kind()
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Resets the display and configures it for `cols` x `rows` characters.
    ///
    /// Afterwards the display is on and empty, with the cursor hidden in the top-left
    /// corner, and text flows left to right.
    pub fn begin(&mut self, cols: u8, rows: u8, char_size: CharSize) {
        self.transport
            .begin(&mut self.state, cols, rows, char_size, &mut self.delay);
    }

    /// Sends a raw instruction byte.
    pub fn command(&mut self, value: u8) {
        self.transport.send(value, SendMode::Command, &mut self.delay);
    }

    /// Sends a raw data byte, i.e. writes a character at the cursor.
    pub fn write(&mut self, value: u8) {
        self.transport.send(value, SendMode::Data, &mut self.delay);
    }

    /// Clears the display and moves the cursor home. Slow.
    pub fn clear(&mut self) {
        self.command(CLEAR_DISPLAY);
        self.delay.delay_us(HOME_CLEAR_EXEC_US);
    }

    /// Moves the cursor to the top-left corner and undoes any display shift. Slow.
    pub fn home(&mut self) {
        self.command(RETURN_HOME);
        self.delay.delay_us(HOME_CLEAR_EXEC_US);
    }

    /// Moves the cursor to `col` on `row`. Rows past the last line go to the last line.
    pub fn set_cursor(&mut self, col: u8, row: u8) {
        if row >= self.state.lines {
            warn!("Row {} clamped to {}", row, self.state.lines - 1);
        }
        let address = self.state.ddram_address(col, row);
        self.command(SET_DDRAM_ADDR | address);
    }

    /// Like [Lcd::set_cursor], but rejects positions outside the configured geometry.
    pub fn try_set_cursor(&mut self, col: u8, row: u8) -> LcdResult<()> {
        if !self.state.initialized {
            return Err(LcdError::NotInitialized);
        }
        if row >= self.state.lines {
            return Err(LcdError::RowOutOfRange { row, lines: self.state.lines });
        }
        if col >= self.state.cols {
            return Err(LcdError::ColumnOutOfRange { col, cols: self.state.cols });
        }
        self.set_cursor(col, row);
        Ok(())
    }

    fn update_control(&mut self, bits: u8, on: bool) {
        if on {
            self.state.control |= bits;
        } else {
            self.state.control &= !bits;
        }
        self.command(DISPLAY_CONTROL | self.state.control);
    }

    fn update_mode(&mut self, bits: u8, on: bool) {
        if on {
            self.state.mode |= bits;
        } else {
            self.state.mode &= !bits;
        }
        self.command(ENTRY_MODE_SET | self.state.mode);
    }

    /// Turns the display off without losing its contents.
    pub fn no_display(&mut self) {
        self.update_control(DISPLAY_ON, false);
    }

    pub fn display(&mut self) {
        self.update_control(DISPLAY_ON, true);
    }

    pub fn no_cursor(&mut self) {
        self.update_control(CURSOR_ON, false);
    }

    /// Shows the underline cursor.
    pub fn cursor(&mut self) {
        self.update_control(CURSOR_ON, true);
    }

    pub fn no_blink(&mut self) {
        self.update_control(BLINK_ON, false);
    }

    /// Makes the cursor cell blink.
    pub fn blink(&mut self) {
        self.update_control(BLINK_ON, true);
    }

    /// Shifts the whole display one cell left, without touching DDRAM.
    pub fn scroll_display_left(&mut self) {
        self.command(CURSOR_SHIFT | DISPLAY_MOVE | MOVE_LEFT);
    }

    pub fn scroll_display_right(&mut self) {
        self.command(CURSOR_SHIFT | DISPLAY_MOVE | MOVE_RIGHT);
    }

    pub fn move_cursor_left(&mut self) {
        self.command(CURSOR_SHIFT | CURSOR_MOVE | MOVE_LEFT);
    }

    pub fn move_cursor_right(&mut self) {
        self.command(CURSOR_SHIFT | CURSOR_MOVE | MOVE_RIGHT);
    }

    /// Subsequent characters go left to right. The default.
    pub fn left_to_right(&mut self) {
        self.update_mode(ENTRY_LEFT, true);
    }

    pub fn right_to_left(&mut self) {
        self.update_mode(ENTRY_LEFT, false);
    }

    /// Shifts the display on every character, so text appears to be pushed out of a
    /// fixed cursor position.
    pub fn autoscroll(&mut self) {
        self.update_mode(ENTRY_SHIFT_INCREMENT, true);
    }

    pub fn no_autoscroll(&mut self) {
        self.update_mode(ENTRY_SHIFT_INCREMENT, false);
    }

    /// Uploads a custom glyph to CGRAM slot `location` (masked to 0-7).
    ///
    /// Each row uses its 5 low bits. Print the glyph by writing its slot number as a
    /// character. Leaves the address counter in CGRAM, so call [Lcd::set_cursor],
    /// [Lcd::home] or [Lcd::clear] before printing again.
    pub fn create_char(&mut self, location: u8, glyph: &[u8; 8]) {
        if location >= GLYPH_SLOTS {
            warn!("CGRAM slot {} masked to {}", location, location & 0x7);
        }
        let location = location & 0x7;

        self.command(SET_CGRAM_ADDR | (location << 3));
        self.delay.delay_us(CGRAM_WRITE_US);

        for &row in glyph {
            self.write(row);
            self.delay.delay_us(CGRAM_WRITE_US);
        }
    }

    /// Like [Lcd::create_char], but rejects slots outside 0-7.
    pub fn try_create_char(&mut self, location: u8, glyph: &[u8; 8]) -> LcdResult<()> {
        if location >= GLYPH_SLOTS {
            return Err(LcdError::GlyphSlotOutOfRange(location));
        }
        self.create_char(location, glyph);
        Ok(())
    }

    /// Sets the backlight level through the transport, if it has one.
    pub fn set_backlight(&mut self, value: u8) {
        self.transport.set_backlight(value);
        self.delay.delay_us(BACKLIGHT_US);
    }

    pub fn backlight(&mut self) {
        self.set_backlight(BACKLIGHT_ON);
    }

    pub fn no_backlight(&mut self) {
        self.set_backlight(BACKLIGHT_OFF);
    }

    /// Turns both the display and the backlight on.
    pub fn on(&mut self) {
        self.display();
        self.backlight();
    }

    /// Turns both the backlight and the display off.
    pub fn off(&mut self) {
        self.no_backlight();
        self.no_display();
    }
}
