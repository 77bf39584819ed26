use std::env::var_os;
use std::path::{Path, PathBuf};
use eyre::WrapErr;
use hdlcd_driver::lcd::CharSize;
use hdlcd_driver::port::MmapPort;
use hdlcd_driver::LcdResult;
use serde::{Deserialize, Serialize};

/// Character device the registers are mapped from.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// `/dev/mem`, addresses are physical. Needs root.
    Mem,
    /// `/dev/gpiomem`, addresses are offsets into the GPIO block.
    #[default]
    GpioMem,
}

impl Device {
    pub fn map(self, address: u64) -> LcdResult<MmapPort> {
        match self {
            Device::Mem => MmapPort::new_mem(address),
            Device::GpioMem => MmapPort::new_gpiomem(address),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportConfig {
    Parallel4 {
        data_register: u64,
        control_register: u64,
        rs_pin: u8,
        enable_pin: u8,
        #[serde(default)]
        upper_nibble: bool,
    },
    Parallel8 {
        data_register: u64,
        control_register: u64,
        rs_pin: u8,
        enable_pin: u8,
    },
    ShiftRegister {
        register: u64,
        data_pin: u8,
        clock_pin: u8,
        strobe_pin: u8,
    },
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Config {
    #[serde(default)]
    pub device: Device,
    pub transport: TransportConfig,
    pub cols: u8,
    pub rows: u8,
    #[serde(default)]
    pub tall_font: bool,
}

impl Config {
    fn path() -> PathBuf {
        var_os("CONFIG_FILE").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("lcd.json"))
    }

    /// Loads the config file, or returns `None` if there is none. A file that exists
    /// but does not parse is an error.
    pub fn try_load() -> eyre::Result<Option<Self>> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(config_path: &Path) -> eyre::Result<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(config_path)?;
        let reader = std::io::BufReader::new(file);
        let config = serde_json::from_reader(reader)
            .wrap_err_with(|| format!("Invalid config file {}", config_path.display()))?;
        Ok(Some(config))
    }

    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, config_path: &Path) -> std::io::Result<()> {
        let file = std::fs::File::create(config_path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn char_size(&self) -> CharSize {
        if self.tall_font {
            CharSize::Dots5x10
        } else {
            CharSize::Dots5x8
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        // Placeholder wiring: the register offsets must be set for the actual board.
        // They point past the single `/dev/gpiomem` page, so an unedited config fails
        // to map instead of poking unrelated registers.
        Config {
            device: Device::GpioMem,
            transport: TransportConfig::Parallel4 {
                data_register: 0x1000,
                control_register: 0x1001,
                rs_pin: 0,
                enable_pin: 1,
                upper_nibble: false,
            },
            cols: 16,
            rows: 2,
            tall_font: false,
        }
    }
}
