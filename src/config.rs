//! Device geometry and driver limits.

/// Base 7-bit address of 24-series EEPROMs.
pub const BASE_ADDRESS: u8 = 0x50;

/// Width of the memory address sent after the device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressWidth {
    /// One address byte. Address bits above the 8th select a 256 byte block
    /// through the low bits of the device address (24C04 to 24C16).
    One,
    /// Two address bytes, most significant byte first.
    Two,
}

/// Configuration of an [`Eeprom`] driver.
///
/// The presets cover the common 24-series densities; adjust the limits with
/// struct update syntax:
///
/// ```
/// use i2c_memory::Config;
///
/// let config = Config {
///     write_cycle_attempts: 50,
///     ..Config::m24c64()
/// };
/// ```
///
/// [`Eeprom`]: crate::series24::Eeprom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// 7-bit device address, including the A2..A0 strap bits.
    pub address: u8,
    /// Width of the memory address.
    pub address_width: AddressWidth,
    /// Page size in bytes. A write never crosses a page. Transfers fail with
    /// [`Error::OutOfBounds`](crate::Error::OutOfBounds) while this is zero.
    pub page_size: u16,
    /// Capacity in bytes.
    pub capacity: u32,
    /// How many times a status flag is polled before giving up with
    /// [`Error::Timeout`](crate::Error::Timeout).
    pub poll_limit: u32,
    /// How many acknowledge polls are issued after a page write before giving
    /// up with [`Error::Timeout`](crate::Error::Timeout).
    pub write_cycle_attempts: u32,
}

const DEFAULT_POLL_LIMIT: u32 = 100_000;
const DEFAULT_WRITE_CYCLE_ATTEMPTS: u32 = 1_000;

impl Config {
    const fn part(address_width: AddressWidth, page_size: u16, capacity: u32) -> Self {
        Config {
            address: BASE_ADDRESS,
            address_width,
            page_size,
            capacity,
            poll_limit: DEFAULT_POLL_LIMIT,
            write_cycle_attempts: DEFAULT_WRITE_CYCLE_ATTEMPTS,
        }
    }

    /// 24C02: 256 bytes, 8 byte pages.
    pub const fn m24c02() -> Self {
        Self::part(AddressWidth::One, 8, 256)
    }

    /// 24C04: 512 bytes, 16 byte pages.
    pub const fn m24c04() -> Self {
        Self::part(AddressWidth::One, 16, 512)
    }

    /// 24C08: 1 KiB, 16 byte pages.
    pub const fn m24c08() -> Self {
        Self::part(AddressWidth::One, 16, 1024)
    }

    /// 24C16: 2 KiB, 16 byte pages.
    pub const fn m24c16() -> Self {
        Self::part(AddressWidth::One, 16, 2048)
    }

    /// 24C32: 4 KiB, 32 byte pages.
    pub const fn m24c32() -> Self {
        Self::part(AddressWidth::Two, 32, 4096)
    }

    /// 24C64: 8 KiB, 32 byte pages.
    pub const fn m24c64() -> Self {
        Self::part(AddressWidth::Two, 32, 8192)
    }

    /// 24C128: 16 KiB, 64 byte pages.
    pub const fn m24c128() -> Self {
        Self::part(AddressWidth::Two, 64, 16384)
    }

    /// 24C256: 32 KiB, 64 byte pages.
    pub const fn m24c256() -> Self {
        Self::part(AddressWidth::Two, 64, 32768)
    }

    /// 24C512: 64 KiB, 128 byte pages.
    pub const fn m24c512() -> Self {
        Self::part(AddressWidth::Two, 128, 65536)
    }

    /// Looks up a preset by part name, eg. `"24c256"`.
    pub fn from_part(name: &str) -> Option<Self> {
        let digits = name
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .trim_start_matches("24")
            .trim_start_matches(|c: char| c.is_ascii_alphabetic());
        Some(match digits {
            "02" => Self::m24c02(),
            "04" => Self::m24c04(),
            "08" => Self::m24c08(),
            "16" => Self::m24c16(),
            "32" => Self::m24c32(),
            "64" => Self::m24c64(),
            "128" => Self::m24c128(),
            "256" => Self::m24c256(),
            "512" => Self::m24c512(),
            _ => return None,
        })
    }

    /// Sets the A2..A0 strap bits of the device address.
    ///
    /// Bits used for block selection on single-byte-address parts are
    /// ignored.
    pub fn with_address_pins(mut self, pins: u8) -> Self {
        self.address = BASE_ADDRESS | (pins & 0b111 & !self.block_mask());
        self
    }

    /// Device address bits taken over by memory address bits 8 and up.
    fn block_mask(&self) -> u8 {
        match self.address_width {
            AddressWidth::One => ((self.capacity >> 8).saturating_sub(1) & 0b111) as u8,
            AddressWidth::Two => 0,
        }
    }

    /// The 7-bit device address used to access `memory_address`.
    pub fn device_address(&self, memory_address: u16) -> u8 {
        let block = (memory_address >> 8) as u8 & self.block_mask();
        (self.address & !self.block_mask()) | block
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::m24c256()
    }
}
