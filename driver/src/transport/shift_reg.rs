use crate::lcd::command::{EIGHT_BIT_MODE, FOUR_BIT_MODE, FUNCTION_SET, RETURN_HOME};
use crate::lcd::state::{CharSize, DisplayState};
use crate::port::{shift_out, BitOrder, IoPort, PinSet};
use crate::transport::*;
use crate::LcdResult;
use embedded_hal::delay::DelayNs;
use log::{debug, trace};

/// 3-wire interface through a latched shift register (e.g. 74HC595).
///
/// Each byte shifted out carries one LCD nibble in bits 0-3 and the LCD control lines
/// in the upper half: E in bit 4, RW in bit 5 (always low, the display is never read)
/// and RS in bit 6. The strobe line copies the shifted byte to the register outputs.
#[derive(Debug)]
pub struct ShiftRegTransport<'a, P: IoPort + ?Sized> {
    port: &'a P,
    data_pin: u8,
    clock_pin: u8,
    strobe_pin: u8,
}

impl<'a, P: IoPort + ?Sized> ShiftRegTransport<'a, P> {
    const EN_BIT: u8 = 0b00010000;
    const RW_BIT: u8 = 0b00100000;
    const RS_BIT: u8 = 0b01000000;

    /// Strobe high time (register needs > 450ns).
    const STROBE_PULSE_US: u32 = 1;
    /// Settle time after each strobe.
    const SETTLE_US: u32 = 40;

    /// Creates the transport on `port` and pulses the LCD enable line once, so it is
    /// known to be low before the first transfer.
    pub fn new(
        port: &'a P,
        data_pin: u8,
        clock_pin: u8,
        strobe_pin: u8,
        delay: &mut dyn DelayNs,
    ) -> LcdResult<Self> {
        PinSet::claim(&[data_pin, clock_pin, strobe_pin])?;

        let transport = ShiftRegTransport {
            port,
            data_pin,
            clock_pin,
            strobe_pin,
        };

        transport.port.clear_bit(strobe_pin);
        transport.write_nibble(0, delay);

        debug!("{:?} created.", transport);
        Ok(transport)
    }

    /// Shifts `byte` into the register and latches it onto the outputs.
    fn push_out(&self, byte: u8, delay: &mut dyn DelayNs) {
        shift_out(self.port, self.data_pin, self.clock_pin, BitOrder::LsbFirst, byte);

        self.port.set_bit(self.strobe_pin);
        delay.delay_us(Self::STROBE_PULSE_US);
        self.port.clear_bit(self.strobe_pin);
        delay.delay_us(Self::SETTLE_US);
    }

    /// Presents `nibble` (with RS already in place) and pulses E via two pushes.
    fn write_nibble(&self, nibble: u8, delay: &mut dyn DelayNs) {
        trace!("Pushing nibble: {:08b}", nibble);
        let nibble = (nibble & !Self::RW_BIT) | Self::EN_BIT;
        self.push_out(nibble, delay);
        self.push_out(nibble & !Self::EN_BIT, delay);
    }
}

impl<P: IoPort + ?Sized> DisplayTransport for ShiftRegTransport<'_, P> {
    fn kind(&self) -> TransportKind {
        TransportKind::ShiftRegister
    }

    fn send(&mut self, value: u8, mode: SendMode, delay: &mut dyn DelayNs) {
        trace!("Sending data: {:08b}, RS: {}", value, mode.is_data());

        let rs = if mode.is_data() { Self::RS_BIT } else { 0 };
        self.write_nibble((value >> 4) | rs, delay);
        self.write_nibble((value & 0x0F) | rs, delay);
    }

    fn begin(
        &mut self,
        state: &mut DisplayState,
        cols: u8,
        rows: u8,
        char_size: CharSize,
        delay: &mut dyn DelayNs,
    ) {
        debug!("Initializing {:?} display, {}x{}", self.kind(), cols, rows);
        power_on(&*self, state, cols, rows, char_size, delay);

        // RS state is unknown here, so the handshake bypasses send and pushes
        // command nibbles directly.
        for wait in HANDSHAKE_WAITS_US {
            self.write_nibble((FUNCTION_SET | EIGHT_BIT_MODE) >> 4, delay);
            delay.delay_us(wait);
        }
        self.write_nibble((FUNCTION_SET | FOUR_BIT_MODE) >> 4, delay);

        finish_begin(self, state, delay);

        self.send(RETURN_HOME, SendMode::Command, delay);
        delay.delay_us(HOME_CLEAR_EXEC_US);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcd::command::*;
    use crate::testing::*;
    use crate::LcdError;

    const PORT: usize = 0;
    const DATA_PIN: u8 = 2;
    const CLOCK_PIN: u8 = 3;
    const STROBE_PIN: u8 = 4;

    fn latches(bus: &Bus) -> Vec<Latch> {
        shift_reg_latches(&bus.writes(), PORT, DATA_PIN, CLOCK_PIN, STROBE_PIN)
    }

    #[test]
    fn construction_leaves_enable_low() {
        let bus = Bus::new();
        let port = MockPort::new(&bus, PORT, 1 << STROBE_PIN);
        let mut delay = bus.delay();

        ShiftRegTransport::new(&port, DATA_PIN, CLOCK_PIN, STROBE_PIN, &mut delay).unwrap();

        let latches = latches(&bus);
        assert_eq!(latches, vec![Latch { rs: false, value: 0, at_ns: latches[0].at_ns }]);
        assert_eq!(port.read() & (1 << STROBE_PIN), 0);
    }

    #[test]
    fn construction_rejects_bad_wiring() {
        let bus = Bus::new();
        let port = MockPort::new(&bus, PORT, 0);
        let mut delay = bus.delay();

        assert_eq!(
            ShiftRegTransport::new(&port, 1, 1, 2, &mut delay).unwrap_err(),
            LcdError::PinConflict(1)
        );
        assert_eq!(
            ShiftRegTransport::new(&port, 1, 2, 9, &mut delay).unwrap_err(),
            LcdError::InvalidPin(9)
        );
    }

    #[test]
    fn send_pushes_two_nibbles_with_rs() {
        let bus = Bus::new();
        let port = MockPort::new(&bus, PORT, 0);
        let mut delay = bus.delay();
        let mut transport =
            ShiftRegTransport::new(&port, DATA_PIN, CLOCK_PIN, STROBE_PIN, &mut delay).unwrap();
        bus.clear();

        transport.send(b'H', SendMode::Data, &mut delay);
        transport.send(CLEAR_DISPLAY, SendMode::Command, &mut delay);

        let latches = latches(&bus);
        assert_eq!(latches.len(), 4);
        let bytes = join_nibbles(&latches);
        assert_eq!((bytes[0].value, bytes[0].rs), (b'H', true));
        assert_eq!((bytes[1].value, bytes[1].rs), (CLEAR_DISPLAY, false));
    }

    #[test]
    fn each_push_settles() {
        let bus = Bus::new();
        let port = MockPort::new(&bus, PORT, 0);
        let mut delay = bus.delay();
        let mut transport =
            ShiftRegTransport::new(&port, DATA_PIN, CLOCK_PIN, STROBE_PIN, &mut delay).unwrap();

        let start = bus.clock.now_ns();
        transport.send(0x00, SendMode::Command, &mut delay);
        // Two nibbles, two pushes each.
        assert!(bus.clock.now_ns() - start >= 4 * 41_000);
    }

    #[test]
    fn begin_sequence() {
        let bus = Bus::new();
        let port = MockPort::new(&bus, PORT, 0);
        let mut delay = bus.delay();
        let mut transport =
            ShiftRegTransport::new(&port, DATA_PIN, CLOCK_PIN, STROBE_PIN, &mut delay).unwrap();
        let mut state = DisplayState::new(transport.function_flags());
        bus.clear();
        let start = bus.clock.now_ns();

        transport.begin(&mut state, 20, 4, CharSize::Dots5x8, &mut delay);

        let latches = latches(&bus);
        let handshake: Vec<u8> = latches[..4].iter().map(|l| l.value).collect();
        assert_eq!(handshake, vec![0x3, 0x3, 0x3, 0x2]);
        assert!(latches[..4].iter().all(|l| !l.rs));
        assert!(latches[0].at_ns - start >= POWER_ON_WAIT_MS as u64 * 1_000_000);
        assert!(latches[1].at_ns - latches[0].at_ns >= 4_100_000);
        assert!(latches[2].at_ns - latches[1].at_ns >= 4_100_000);
        assert!(latches[3].at_ns - latches[2].at_ns >= 100_000);

        let commands = join_nibbles(&latches[4..]);
        let values: Vec<u8> = commands.iter().map(|c| c.value).collect();
        assert_eq!(
            values,
            vec![
                FUNCTION_SET | FOUR_BIT_MODE | TWO_LINE,
                DISPLAY_CONTROL | DISPLAY_ON,
                CLEAR_DISPLAY,
                ENTRY_MODE_SET | ENTRY_LEFT,
                RETURN_HOME,
            ]
        );
        assert!(commands[3].at_ns - commands[2].at_ns >= HOME_CLEAR_EXEC_US as u64 * 1000);
        assert_eq!(state.lines(), 4);
    }

    #[test]
    fn begin_ignores_width_bits_of_the_given_state() {
        let bus = Bus::new();
        let port = MockPort::new(&bus, PORT, 0);
        let mut delay = bus.delay();
        let mut transport =
            ShiftRegTransport::new(&port, DATA_PIN, CLOCK_PIN, STROBE_PIN, &mut delay).unwrap();
        let mut state = DisplayState::new(EIGHT_BIT_MODE);
        bus.clear();

        transport.begin(&mut state, 16, 2, CharSize::Dots5x8, &mut delay);

        let commands = join_nibbles(&latches(&bus)[4..]);
        assert_eq!(commands[0].value, FUNCTION_SET | FOUR_BIT_MODE | TWO_LINE);
        assert_eq!(state.function() & EIGHT_BIT_MODE, 0);
    }
}
