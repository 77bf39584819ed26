use crate::lcd::command::*;
use log::warn;

/// Character font height.
///
/// The 5x10 font only exists on single-line displays; it is ignored when more than
/// one line is configured, as the controller does not support that combination.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum CharSize {
    #[default] Dots5x8,
    Dots5x10,
}

/// Mirror of the controller's configuration registers.
///
/// Every bit here has been sent to the display: the handle updates a field and
/// re-sends the whole register in the same call.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DisplayState {
    pub(crate) function: u8,
    pub(crate) control: u8,
    pub(crate) mode: u8,
    pub(crate) lines: u8,
    pub(crate) cols: u8,
    pub(crate) initialized: bool,
}

impl DisplayState {
    /// The controller addresses at most 4 rows.
    pub const MAX_LINES: u8 = 4;

    /// Creates the state for a transport whose bus width flag is `function`.
    pub fn new(function: u8) -> Self {
        DisplayState {
            function: function | ONE_LINE | DOTS_5X8,
            control: DISPLAY_OFF | CURSOR_OFF | BLINK_OFF,
            mode: ENTRY_LEFT | ENTRY_SHIFT_DECREMENT,
            lines: 1,
            cols: 0,
            initialized: false,
        }
    }

    /// Function set bits: bus width, line count and font.
    pub fn function(&self) -> u8 {
        self.function
    }

    /// Display control bits: display, cursor and blink.
    pub fn control(&self) -> u8 {
        self.control
    }

    /// Entry mode bits: text direction and autoscroll.
    pub fn mode(&self) -> u8 {
        self.mode
    }

    pub fn lines(&self) -> u8 {
        self.lines
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Records the geometry given to `begin` and derives the line/font bits.
    pub(crate) fn configure(&mut self, cols: u8, rows: u8, char_size: CharSize) {
        let lines = rows.clamp(1, Self::MAX_LINES);
        if lines != rows {
            warn!("Display with {} rows is not supported, using {}", rows, lines);
        }

        self.function &= !(TWO_LINE | DOTS_5X10);
        if lines > 1 {
            self.function |= TWO_LINE;
        }
        if char_size == CharSize::Dots5x10 && lines == 1 {
            self.function |= DOTS_5X10;
        }

        self.lines = lines;
        self.cols = cols;
    }

    /// DDRAM address of `col` on `row`, with `row` clamped to the last line.
    pub(crate) fn ddram_address(&self, col: u8, row: u8) -> u8 {
        let row = row.min(self.lines - 1) as usize;
        let offsets = if self.cols == 16 && self.lines == 4 {
            &ROW_OFFSETS_16X4
        } else {
            &ROW_OFFSETS_DEFAULT
        };
        col.wrapping_add(offsets[row]) & DDRAM_ADDR_MASK
    }
}
