//! Driver for HD44780-compatible character LCDs wired to raw byte-wide I/O ports.
//!
//! The display is driven over one of three interconnects, see [transport]:
//! 4-bit parallel, 8-bit parallel, or a 3-wire shift register. All of them sit
//! on top of the [port] primitives and are wrapped by the transport-agnostic
//! [lcd::Lcd] handle.
pub mod delay;
pub mod lcd;
pub mod port;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum LcdError {
    #[error("pin index {0} does not exist on a byte-wide port")]
    InvalidPin(u8),
    #[error("pin {0} is assigned to more than one line")]
    PinConflict(u8),
    #[error("8-bit data port cannot be shared with the control port")]
    SharedPort,
    #[error("display has not been initialized with begin()")]
    NotInitialized,
    #[error("row {row} is out of range for a {lines}-line display")]
    RowOutOfRange { row: u8, lines: u8 },
    #[error("column {col} is out of range for a {cols}-column display")]
    ColumnOutOfRange { col: u8, cols: u8 },
    #[error("CGRAM slot {0} does not exist (0-7)")]
    GlyphSlotOutOfRange(u8),
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
}

impl From<std::io::Error> for LcdError {
    fn from(err: std::io::Error) -> Self {
        LcdError::Io(err.kind())
    }
}

pub type LcdResult<T> = Result<T, LcdError>;
