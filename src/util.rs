use log::{info, error};

use structopt::StructOpt;

use embedded_hal::digital::v2::{InputPin, OutputPin};
pub use linux_embedded_hal::sysfs_gpio::{Direction, Error as PinError};
pub use linux_embedded_hal::{Delay, Pin as Pindev};

use simplelog::{TermLogger, LevelFilter, TerminalMode};

use ihex::{Record, Reader};

use i2c_memory::{bitbang::BitBang, series24::Eeprom, Config};

use std::fmt::Debug;

#[derive(Debug, PartialEq, StructOpt)]
struct Options {
    #[structopt(subcommand)]
    operation: Operations,

    /// Clock line (SCL) GPIO number
    #[structopt(long, default_value = "3", env = "SCL_PIN")]
    scl_pin: u64,

    /// Data line (SDA) GPIO number
    #[structopt(long, default_value = "2", env = "SDA_PIN")]
    sda_pin: u64,

    /// Bus clock in Hz
    #[structopt(long, default_value = "100000", env = "I2C_FREQ")]
    frequency: u32,

    /// EEPROM part, eg. 24c02 or 24c256
    #[structopt(long, default_value = "24c256", env = "EEPROM_PART")]
    part: String,

    /// State of the A2..A0 address pins
    #[structopt(long, default_value = "0", env = "EEPROM_ADDRESS_PINS")]
    address_pins: u8,

    /// Maximum number of acknowledge polls after each page write
    #[structopt(long, env = "WRITE_CYCLE_ATTEMPTS")]
    write_cycle_attempts: Option<u32>,

    /// Configure log level
    #[structopt(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: LevelFilter,
}

#[derive(Debug, PartialEq, StructOpt)]
pub enum Operations {
    /// Check that the device answers
    Info,
    /// Read data from the device
    Read {
        /// EEPROM address for read start in hex
        #[structopt(parse(try_from_str = parse_hex))]
        address: u16,
        /// Length of read in bytes
        #[structopt()]
        length: u16,
    },
    /// Write data starting at the specified address
    Write {
        /// EEPROM address for write start in hex
        #[structopt(parse(try_from_str = parse_hex))]
        address: u16,

        /// Data to write in hexadecimal
        #[structopt(long)]
        data: HexData,
    },
    /// Fill a range with a single byte value
    Fill {
        /// EEPROM address for fill start in hex
        #[structopt(parse(try_from_str = parse_hex))]
        address: u16,

        /// Length of the range in bytes
        #[structopt()]
        length: u16,

        /// Byte value in hex
        #[structopt(long, default_value = "ff", parse(try_from_str = parse_hex_byte))]
        value: u8,
    },
    /// Dump EEPROM contents into a hex file
    Dump {
        /// EEPROM address for read start in hex
        #[structopt(parse(try_from_str = parse_hex))]
        address: u16,

        /// Length of read in bytes
        #[structopt()]
        length: u16,

        /// Output ihex file
        #[structopt(long, default_value = "dump.ihex")]
        file: String,
    },
    /// Load EEPROM contents from a hex file
    Load {
        /// Input ihex file
        file: String,
    },
}

#[derive(Debug, PartialEq)]
pub struct HexData(Vec<u8>);

impl std::str::FromStr for HexData {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex::decode(s).map(HexData)
    }
}

fn parse_hex(s: &str) -> Result<u16, std::num::ParseIntError> {
    u16::from_str_radix(s.trim_start_matches("0x"), 16)
}

fn parse_hex_byte(s: &str) -> Result<u8, std::num::ParseIntError> {
    u8::from_str_radix(s.trim_start_matches("0x"), 16)
}

/// A sysfs GPIO used as an open-drain line: low drives the line, high
/// releases it to the pull-up.
struct OpenDrain(Pindev);

impl OpenDrain {
    fn open(number: u64) -> Result<Self, PinError> {
        let pin = Pindev::new(number);
        pin.export()?;
        pin.set_direction(Direction::In)?;
        Ok(OpenDrain(pin))
    }
}

impl OutputPin for OpenDrain {
    type Error = PinError;

    fn set_low(&mut self) -> Result<(), PinError> {
        self.0.set_direction(Direction::Low)
    }

    fn set_high(&mut self) -> Result<(), PinError> {
        self.0.set_direction(Direction::In)
    }
}

impl InputPin for OpenDrain {
    type Error = PinError;

    fn is_high(&self) -> Result<bool, PinError> {
        Ok(self.0.get_value()? != 0)
    }

    fn is_low(&self) -> Result<bool, PinError> {
        Ok(self.0.get_value()? == 0)
    }
}

trait ResultExt<T, E> {
    fn dbg_err(self, msg: &str) -> Result<T, Box<dyn std::error::Error>>;
}

impl<T, E: Debug> ResultExt<T, E> for Result<T, E> {
    fn dbg_err(self, msg: &str) -> Result<T, Box<dyn std::error::Error>> {
        self.map_err(|e| format!("{}: {:?}", msg, e).into())
    }
}

/// Collects the data records of an ihex file.
fn data_records(data: &str) -> Result<Vec<(u16, Vec<u8>)>, String> {
    let mut records = Vec::new();
    for record in Reader::new(data) {
        match record {
            Ok(Record::Data{offset, value}) => records.push((offset, value)),
            Ok(Record::EndOfFile) => (),
            Err(e) => {
                error!("Reader error: {:?}", e);
                return Err(format!("{:?}", e))
            }
            Ok(other) => {
                error!("Unrecognised record: {:?}", other);
                return Err(format!("unsupported record {:?}", other))
            }
        }
    }
    Ok(records)
}

fn main() -> Result<(), Box<dyn std::error::Error + 'static>> {
    // Load options
    let opts = Options::from_args();

    // Setup logging
    TermLogger::init(opts.log_level, simplelog::Config::default(), TerminalMode::Mixed)?;

    let mut config = Config::from_part(&opts.part)
        .ok_or_else(|| format!("unknown EEPROM part '{}'", opts.part))?
        .with_address_pins(opts.address_pins);
    if let Some(attempts) = opts.write_cycle_attempts {
        config.write_cycle_attempts = attempts;
    }
    info!("Using {} at address 0x{:02x}: {:?}", opts.part, config.address, config);

    // Claim the bus lines
    let scl = OpenDrain::open(opts.scl_pin)?;
    let sda = OpenDrain::open(opts.sda_pin)?;
    let bus = BitBang::new(scl, sda, Delay, opts.frequency);

    let mut eeprom = Eeprom::init(bus, config).dbg_err("initialising EEPROM driver")?;

    // Make sure something answers before touching it
    if !eeprom.probe().dbg_err("probe")? {
        error!("No device acknowledged address 0x{:02x}", config.address);
        return Err(format!("no device at address 0x{:02x}", config.address).into())
    }
    info!("Device at 0x{:02x} acknowledged", config.address);

    // Perform the requested operation
    match &opts.operation {
        Operations::Info => {
            info!("Capacity {} bytes, {} byte pages", config.capacity, config.page_size);
        },
        Operations::Read{address, length} => {
            info!("Reading {} bytes from address 0x{:04x}", length, address);

            let mut buff = vec![0u8; *length as usize];
            eeprom.read_block(*address, &mut buff).dbg_err("read")?;

            info!("Read: {:02x?}", buff);
        },
        Operations::Write{address, data} => {
            info!("Writing {} bytes to address 0x{:04x}", data.0.len(), address);

            eeprom.write_block(*address, &data.0).dbg_err("write")?;

            info!("Write complete");
        },
        Operations::Fill{address, length, value} => {
            info!("Filling {} bytes at address 0x{:04x} with 0x{:02x}", length, address, value);

            let buff = vec![*value; *length as usize];
            eeprom.write_block(*address, &buff).dbg_err("fill")?;

            info!("Fill complete");
        },
        Operations::Dump{address, length, file} => {
            info!("Reading {} bytes from address 0x{:04x} to file {}", length, address, &file);

            let mut buff = vec![0u8; *length as usize];
            eeprom.read_block(*address, &mut buff).dbg_err("read")?;

            let mut records = Vec::new();
            for (c, chunk) in buff.chunks(32).enumerate() {
                records.push(Record::Data{ offset: (*address as usize + c * 32) as u16, value: chunk.to_vec() });
            }
            records.push(Record::EndOfFile);

            let data = ihex::create_object_file_representation(&records).dbg_err("ihex")?;

            std::fs::write(file, data)?;

            info!("Dump complete");
        },
        Operations::Load{file} => {
            info!("Loading file {}", file);

            let data = std::fs::read_to_string(&file)?;

            // Parse everything first so a malformed file writes nothing.
            let records = data_records(&data).dbg_err(file)?;

            for (offset, value) in records {
                info!("Writing {} bytes at address 0x{:04x}", value.len(), offset);
                eeprom.write_block(offset, &value).dbg_err("write")?;
            }

            info!("Load complete");
        },
    }

    Ok(())
}
