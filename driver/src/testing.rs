//! Simulated hardware shared by the unit tests: a virtual clock, recording ports and
//! decoders that replay the recorded writes the way the controller would see them.

use crate::lcd::state::{CharSize, DisplayState};
use crate::port::IoPort;
use crate::transport::{finish_begin, power_on, DisplayTransport, SendMode, TransportKind, EXEC_TIME_US};
use embedded_hal::delay::DelayNs;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Clone, Debug, Default)]
pub struct SimClock {
    now_ns: Rc<Cell<u64>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ns(&self) -> u64 {
        self.now_ns.get()
    }

    fn advance(&self, ns: u64) {
        self.now_ns.set(self.now_ns.get() + ns);
    }
}

/// Delay that advances a [SimClock] instead of waiting.
#[derive(Debug)]
pub struct SimDelay {
    clock: SimClock,
}

impl SimDelay {
    pub fn new(clock: &SimClock) -> Self {
        SimDelay { clock: clock.clone() }
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance(ns as u64);
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PortWrite {
    pub port: usize,
    pub value: u8,
    pub at_ns: u64,
}

/// Shared write log of all mock ports, in program order.
#[derive(Clone, Debug, Default)]
pub struct Bus {
    pub clock: SimClock,
    writes: Rc<RefCell<Vec<PortWrite>>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay::new(&self.clock)
    }

    pub fn writes(&self) -> Vec<PortWrite> {
        self.writes.borrow().clone()
    }

    pub fn clear(&self) {
        self.writes.borrow_mut().clear();
    }
}

#[derive(Debug)]
pub struct MockPort {
    id: usize,
    value: Cell<u8>,
    bus: Bus,
}

impl MockPort {
    /// Creates a port; `id` must be below 4 for the decoders.
    pub fn new(bus: &Bus, id: usize, initial: u8) -> Self {
        MockPort {
            id,
            value: Cell::new(initial),
            bus: bus.clone(),
        }
    }
}

impl IoPort for MockPort {
    fn read(&self) -> u8 {
        self.value.get()
    }

    fn write(&self, value: u8) {
        self.value.set(value);
        self.bus.writes.borrow_mut().push(PortWrite {
            port: self.id,
            value,
            at_ns: self.bus.clock.now_ns(),
        });
    }
}

/// One transfer as seen by the controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Latch {
    pub rs: bool,
    pub value: u8,
    pub at_ns: u64,
}

fn rising(before: u8, after: u8, pin: u8) -> bool {
    before & (1 << pin) == 0 && after & (1 << pin) != 0
}

fn falling(before: u8, after: u8, pin: u8) -> bool {
    rising(after, before, pin)
}

/// Replays a parallel bus; the controller latches the data port on the falling edge of E.
///
/// `value` is the whole data port byte at that moment.
pub fn parallel_latches(
    writes: &[PortWrite],
    data_port: usize,
    control_port: usize,
    rs_pin: u8,
    enable_pin: u8,
) -> Vec<Latch> {
    let mut ports = [0u8; 4];
    let mut latches = Vec::new();
    for write in writes {
        let before = ports[write.port];
        ports[write.port] = write.value;
        if write.port == control_port && falling(before, write.value, enable_pin) {
            latches.push(Latch {
                rs: write.value & (1 << rs_pin) != 0,
                value: ports[data_port],
                at_ns: write.at_ns,
            });
        }
    }
    latches
}

/// Extracts the 4-bit nibble at `shift` from each latch.
pub fn nibbles(latches: &[Latch], shift: u8) -> Vec<Latch> {
    latches
        .iter()
        .map(|l| Latch { value: (l.value >> shift) & 0x0F, ..*l })
        .collect()
}

/// Joins consecutive high/low nibble latches into bytes.
pub fn join_nibbles(nibbles: &[Latch]) -> Vec<Latch> {
    nibbles
        .chunks_exact(2)
        .map(|pair| Latch {
            rs: pair[0].rs,
            value: (pair[0].value << 4) | pair[1].value,
            at_ns: pair[1].at_ns,
        })
        .collect()
}

pub const SR_EN_BIT: u8 = 0b00010000;
pub const SR_RW_BIT: u8 = 0b00100000;
pub const SR_RS_BIT: u8 = 0b01000000;

/// Replays a 3-wire shift register bus.
///
/// Bits are clocked in on the rising clock edge, first bit ending up in bit 0 after
/// eight clocks, and copied to the outputs on the rising strobe edge. The controller
/// latches the low output nibble when the EN output falls.
pub fn shift_reg_latches(
    writes: &[PortWrite],
    port: usize,
    data_pin: u8,
    clock_pin: u8,
    strobe_pin: u8,
) -> Vec<Latch> {
    let mut pins = 0u8;
    let mut shift = 0u8;
    let mut outputs = 0u8;
    let mut latches = Vec::new();
    for write in writes.iter().filter(|w| w.port == port) {
        if rising(pins, write.value, clock_pin) {
            let bit = (write.value >> data_pin) & 1;
            shift = (shift >> 1) | (bit << 7);
        }
        if rising(pins, write.value, strobe_pin) {
            let before = outputs;
            outputs = shift;
            assert_eq!(outputs & SR_RW_BIT, 0, "RW must stay low");
            if before & SR_EN_BIT != 0 && outputs & SR_EN_BIT == 0 {
                latches.push(Latch {
                    rs: outputs & SR_RS_BIT != 0,
                    value: outputs & 0x0F,
                    at_ns: write.at_ns,
                });
            }
        }
        pins = write.value;
    }
    latches
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Sent {
    pub value: u8,
    pub mode: SendMode,
    pub at_ns: u64,
}

/// Transport that records every byte instead of driving pins.
#[derive(Debug)]
pub struct RecordingTransport {
    clock: SimClock,
    pub sent: Vec<Sent>,
    pub backlight: Vec<u8>,
}

impl RecordingTransport {
    pub fn new(clock: &SimClock) -> Self {
        RecordingTransport {
            clock: clock.clone(),
            sent: Vec::new(),
            backlight: Vec::new(),
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.sent.iter().map(|s| s.value).collect()
    }

    pub fn take(&mut self) -> Vec<Sent> {
        std::mem::take(&mut self.sent)
    }
}

impl DisplayTransport for RecordingTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Parallel4Bit
    }

    fn send(&mut self, value: u8, mode: SendMode, delay: &mut dyn DelayNs) {
        self.sent.push(Sent {
            value,
            mode,
            at_ns: self.clock.now_ns(),
        });
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
        power_on(&*self, state, cols, rows, char_size, delay);
        finish_begin(self, state, delay);
    }

    fn set_backlight(&mut self, value: u8) {
        self.backlight.push(value);
    }
}
