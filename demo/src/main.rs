mod config;

use std::fmt::Write;
use std::thread;
use std::time::Duration;
use dotenv::dotenv;
use hdlcd_driver::delay::SpinDelay;
use hdlcd_driver::lcd::Lcd;
use hdlcd_driver::transport::{DisplayTransport, NibblePosition, ParallelTransport, ShiftRegTransport};
use log::{debug, info};
use crate::config::{Config, TransportConfig};

const HEART: [u8; 8] = [
    0b00000,
    0b01010,
    0b11111,
    0b11111,
    0b01110,
    0b00100,
    0b00000,
    0b00000,
];

fn run<T: DisplayTransport>(lcd: &mut Lcd<T, SpinDelay>, config: &Config) -> eyre::Result<()> {
    lcd.begin(config.cols, config.rows, config.char_size());
    debug!("{:?} initialized.", lcd);

    lcd.create_char(0, &HEART);
    lcd.clear();
    lcd.print_str("hdlcd ");
    lcd.print_char(0);

    if lcd.state().lines() > 1 {
        lcd.try_set_cursor(0, 1)?;
        write!(lcd, "v{}", env!("CARGO_PKG_VERSION"))?;
    }

    thread::sleep(Duration::from_secs(1));

    info!("Counting...");
    lcd.clear();
    lcd.blink();
    for i in 0..=200u16 {
        lcd.home();
        lcd.print_uint(i * 300);
        lcd.print_str(" ");
        lcd.print_sint(-(i as i16) * 150);
        lcd.print_str("   ");
        thread::sleep(Duration::from_millis(50));
    }
    lcd.no_blink();

    info!("Scrolling...");
    for _ in 0..config.cols {
        lcd.scroll_display_left();
        thread::sleep(Duration::from_millis(150));
    }
    for _ in 0..config.cols {
        lcd.scroll_display_right();
        thread::sleep(Duration::from_millis(150));
    }

    lcd.off();
    thread::sleep(Duration::from_millis(500));
    lcd.on();

    info!("Demo finished.");
    Ok(())
}

fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv().ok();
    pretty_env_logger::init();

    info!("hdlcd demo starting...");

    debug!("Trying to load config...");
    let config = if let Some(config) = Config::try_load()? {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        let config = Config::default();
        config.save()?;
        info!("Default config saved.");
        config
    };
    debug!("{:?}", config);

    let mut delay = SpinDelay::new();

    match config.transport {
        TransportConfig::Parallel4 {
            data_register,
            control_register,
            rs_pin,
            enable_pin,
            upper_nibble,
        } => {
            let data_port = config.device.map(data_register)?;
            let control_port = config.device.map(control_register)?;
            let nibble = if upper_nibble { NibblePosition::High } else { NibblePosition::Low };
            let transport =
                ParallelTransport::new_4bit_at(&data_port, &control_port, rs_pin, enable_pin, nibble)?;
            run(&mut Lcd::new(transport, delay), &config)
        }
        TransportConfig::Parallel8 {
            data_register,
            control_register,
            rs_pin,
            enable_pin,
        } => {
            let data_port = config.device.map(data_register)?;
            let control_port = config.device.map(control_register)?;
            let transport = ParallelTransport::new_8bit(&data_port, &control_port, rs_pin, enable_pin)?;
            run(&mut Lcd::new(transport, delay), &config)
        }
        TransportConfig::ShiftRegister {
            register,
            data_pin,
            clock_pin,
            strobe_pin,
        } => {
            let port = config.device.map(register)?;
            let transport = ShiftRegTransport::new(&port, data_pin, clock_pin, strobe_pin, &mut delay)?;
            run(&mut Lcd::new(transport, delay), &config)
        }
    }
}
