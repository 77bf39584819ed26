use crate::lcd::Lcd;
use crate::transport::DisplayTransport;
use embedded_hal::delay::DelayNs;
use log::warn;
use std::fmt;

/// Sign plus the five digits of a 16-bit value.
const DIGITS_CAPACITY: usize = 6;

/// Formats `magnitude` in decimal into the tail of `buffer`, prefixed with `-` when
/// `negative`, and returns the used part.
fn format_decimal(magnitude: u16, negative: bool, buffer: &mut [u8; DIGITS_CAPACITY]) -> &[u8] {
    let mut start = DIGITS_CAPACITY;
    let mut value = magnitude;
    loop {
        start -= 1;
        buffer[start] = b'0' + (value % 10) as u8;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    if negative {
        start -= 1;
        buffer[start] = b'-';
    }
    &buffer[start..]
}

impl<T: DisplayTransport, D: DelayNs> Lcd<T, D> {
    /// Writes one character code at the cursor. Codes 0-7 are the CGRAM glyphs.
    pub fn print_char(&mut self, value: u8) {
        self.write(value);
    }

    /// Writes raw character codes up to the end of `bytes` or the first NUL.
    ///
    /// There is no wrapping: characters past the last column go wherever the
    /// controller's DDRAM layout puts them.
    pub fn print_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes.iter().take_while(|&&b| b != 0) {
            self.write(byte);
        }
    }

    /// Writes a string up to its end or the first NUL. The character ROM only covers
    /// ASCII reliably, so anything else is shown as `?`.
    pub fn print_str(&mut self, s: &str) {
        for c in s.chars().take_while(|&c| c != '\0') {
            if c.is_ascii() {
                self.write(c as u8);
            } else {
                warn!("Non-ASCII character: {}", c);
                self.write(b'?');
            }
        }
    }

    pub fn print_uint(&mut self, value: u16) {
        let mut buffer = [0u8; DIGITS_CAPACITY];
        for &digit in format_decimal(value, false, &mut buffer) {
            self.write(digit);
        }
    }

    pub fn print_sint(&mut self, value: i16) {
        let mut buffer = [0u8; DIGITS_CAPACITY];
        for &digit in format_decimal(value.unsigned_abs(), value < 0, &mut buffer) {
            self.write(digit);
        }
    }
}

impl<T: DisplayTransport, D: DelayNs> fmt::Write for Lcd<T, D> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print_str(s);
        Ok(())
    }
}
