use crate::lcd::command::FUNCTION_SET;
use crate::lcd::state::{CharSize, DisplayState};
use crate::port::{IoPort, PinSet};
use crate::transport::*;
use crate::{LcdError, LcdResult};
use embedded_hal::delay::DelayNs;
use log::{debug, trace};

/// Which half of the data port carries D4-D7 in 4-bit mode.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum NibblePosition {
    /// Port bits 0-3.
    #[default] Low,
    /// Port bits 4-7.
    High,
}

impl NibblePosition {
    pub fn mask(self) -> u8 {
        match self {
            NibblePosition::Low => 0x0F,
            NibblePosition::High => 0xF0,
        }
    }

    fn place(self, nibble: u8) -> u8 {
        match self {
            NibblePosition::Low => nibble & 0x0F,
            NibblePosition::High => (nibble & 0x0F) << 4,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ParallelBus {
    FourBit(NibblePosition),
    EightBit,
}

/// Parallel interface: data lines on one port, RS and E on a control port.
///
/// In 4-bit mode only one nibble of the data port is touched, so the other half (and the
/// control lines) may live on the same register. In 8-bit mode the whole data port is
/// overwritten on every transfer and must be a register of its own.
///
/// Both ports have the same type `P`; use `dyn IoPort` to mix port kinds.
#[derive(Debug)]
pub struct ParallelTransport<'a, P: IoPort + ?Sized> {
    data_port: &'a P,
    control_port: &'a P,
    rs_pin: u8,
    enable_pin: u8,
    bus: ParallelBus,
}

impl<'a, P: IoPort + ?Sized> ParallelTransport<'a, P> {
    /// Creates a 4-bit transport with D4-D7 on the low nibble of `data_port`.
    pub fn new_4bit(
        data_port: &'a P,
        control_port: &'a P,
        rs_pin: u8,
        enable_pin: u8,
    ) -> LcdResult<Self> {
        Self::create(data_port, control_port, rs_pin, enable_pin, ParallelBus::FourBit(NibblePosition::Low))
    }

    /// Creates a 4-bit transport with D4-D7 on the given half of `data_port`.
    pub fn new_4bit_at(
        data_port: &'a P,
        control_port: &'a P,
        rs_pin: u8,
        enable_pin: u8,
        nibble: NibblePosition,
    ) -> LcdResult<Self> {
        Self::create(data_port, control_port, rs_pin, enable_pin, ParallelBus::FourBit(nibble))
    }

    /// Creates an 8-bit transport with D0-D7 on bits 0-7 of `data_port`.
    pub fn new_8bit(
        data_port: &'a P,
        control_port: &'a P,
        rs_pin: u8,
        enable_pin: u8,
    ) -> LcdResult<Self> {
        Self::create(data_port, control_port, rs_pin, enable_pin, ParallelBus::EightBit)
    }

    fn create(
        data_port: &'a P,
        control_port: &'a P,
        rs_pin: u8,
        enable_pin: u8,
        bus: ParallelBus,
    ) -> LcdResult<Self> {
        let control_pins = PinSet::claim(&[rs_pin, enable_pin])?;

        if std::ptr::addr_eq(data_port, control_port) {
            match bus {
                ParallelBus::EightBit => return Err(LcdError::SharedPort),
                ParallelBus::FourBit(nibble) => {
                    if let Some(pin) = control_pins.first_overlap(nibble.mask()) {
                        return Err(LcdError::PinConflict(pin));
                    }
                }
            }
        }

        let transport = ParallelTransport {
            data_port,
            control_port,
            rs_pin,
            enable_pin,
            bus,
        };

        // Both low before anything else, E must not see a stray edge.
        transport.control_port.clear_bit(rs_pin);
        transport.control_port.clear_bit(enable_pin);

        debug!("{:?} created.", transport);
        Ok(transport)
    }

    pub fn bus(&self) -> ParallelBus {
        self.bus
    }

    fn pulse_enable(&self, delay: &mut dyn DelayNs) {
        self.control_port.set_bit(self.enable_pin);
        delay.delay_us(ENABLE_PULSE_US);
        self.control_port.clear_bit(self.enable_pin);
    }

    fn write_nibble(&self, nibble: u8, position: NibblePosition, delay: &mut dyn DelayNs) {
        trace!("Writing nibble: {:04b}", nibble & 0x0F);
        self.data_port.modify(position.mask(), position.place(nibble));
        self.pulse_enable(delay);
    }

    fn write_byte(&self, value: u8, delay: &mut dyn DelayNs) {
        self.data_port.write(value);
        self.pulse_enable(delay);
    }
}

impl<P: IoPort + ?Sized> DisplayTransport for ParallelTransport<'_, P> {
    fn kind(&self) -> TransportKind {
        match self.bus {
            ParallelBus::FourBit(_) => TransportKind::Parallel4Bit,
            ParallelBus::EightBit => TransportKind::Parallel8Bit,
        }
    }

    fn send(&mut self, value: u8, mode: SendMode, delay: &mut dyn DelayNs) {
        trace!("Sending data: {:08b}, RS: {}", value, mode.is_data());

        self.control_port.write_bit(self.rs_pin, mode.is_data());

        match self.bus {
            ParallelBus::EightBit => self.write_byte(value, delay),
            ParallelBus::FourBit(position) => {
                self.write_nibble(value >> 4, position, delay);
                delay.delay_us(NIBBLE_GAP_US);
                self.write_nibble(value, position, delay);
            }
        }

        delay.delay_us(EXEC_TIME_US);
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

        self.control_port.clear_bit(self.rs_pin);
        self.control_port.clear_bit(self.enable_pin);

        // A microcontroller reset does not reset the display, so it may be in 4-bit
        // mode halfway through a byte. Three 8-bit function sets get it back in sync
        // (HD44780 datasheet, figures 23 and 24).
        match self.bus {
            ParallelBus::FourBit(position) => {
                for wait in HANDSHAKE_WAITS_US {
                    self.write_nibble(0x03, position, delay);
                    delay.delay_us(wait);
                }
                self.write_nibble(0x02, position, delay);
                delay.delay_us(EXEC_TIME_US);
            }
            ParallelBus::EightBit => {
                for wait in HANDSHAKE_WAITS_US {
                    self.send(FUNCTION_SET | state.function, SendMode::Command, delay);
                    delay.delay_us(wait);
                }
            }
        }

        finish_begin(self, state, delay);
    }
}
