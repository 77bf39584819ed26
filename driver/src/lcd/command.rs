//! HD44780 instruction bytes and the flags OR-ed into them.

// Instructions
pub const CLEAR_DISPLAY: u8 = 0b00000001;
pub const RETURN_HOME: u8 = 0b00000010;
pub const ENTRY_MODE_SET: u8 = 0b00000100;
pub const DISPLAY_CONTROL: u8 = 0b00001000;
pub const CURSOR_SHIFT: u8 = 0b00010000;
pub const FUNCTION_SET: u8 = 0b00100000;
pub const SET_CGRAM_ADDR: u8 = 0b01000000;
pub const SET_DDRAM_ADDR: u8 = 0b10000000;

// Entry mode
pub const ENTRY_RIGHT: u8 = 0b00000000;
pub const ENTRY_LEFT: u8 = 0b00000010;
pub const ENTRY_SHIFT_INCREMENT: u8 = 0b00000001;
pub const ENTRY_SHIFT_DECREMENT: u8 = 0b00000000;

// Display control
pub const DISPLAY_ON: u8 = 0b00000100;
pub const DISPLAY_OFF: u8 = 0b00000000;
pub const CURSOR_ON: u8 = 0b00000010;
pub const CURSOR_OFF: u8 = 0b00000000;
pub const BLINK_ON: u8 = 0b00000001;
pub const BLINK_OFF: u8 = 0b00000000;

// Cursor/display shift
pub const DISPLAY_MOVE: u8 = 0b00001000;
pub const CURSOR_MOVE: u8 = 0b00000000;
pub const MOVE_RIGHT: u8 = 0b00000100;
pub const MOVE_LEFT: u8 = 0b00000000;

// Function set
pub const EIGHT_BIT_MODE: u8 = 0b00010000;
pub const FOUR_BIT_MODE: u8 = 0b00000000;
pub const TWO_LINE: u8 = 0b00001000;
pub const ONE_LINE: u8 = 0b00000000;
pub const DOTS_5X10: u8 = 0b00000100;
pub const DOTS_5X8: u8 = 0b00000000;

/// DDRAM row start addresses for most geometries (16x2, 20x2, 20x4, ...).
pub const ROW_OFFSETS_DEFAULT: [u8; 4] = [0x00, 0x40, 0x14, 0x54];
/// DDRAM row start addresses for 16x4 modules, where rows 2 and 3 continue rows 0 and 1.
pub const ROW_OFFSETS_16X4: [u8; 4] = [0x00, 0x40, 0x10, 0x50];

/// Highest DDRAM address; addresses are 7 bits wide.
pub const DDRAM_ADDR_MASK: u8 = 0b01111111;
/// Number of CGRAM glyph slots.
pub const GLYPH_SLOTS: u8 = 8;
