//! An [`embedded-hal`]-based I2C EEPROM driver.
//!
//! This crate drives 24-series EEPROMs through a phase-level [`Bus`]: start,
//! address, data and stop phases are issued one by one and their completion
//! is observed through status flags. Reads and writes of any length are split
//! at page boundaries, and after every page written the device is polled
//! until it has finished its internal write cycle. Every wait is bounded and
//! reports [`Error::Timeout`] instead of hanging on an absent device.
//!
//! A software implementation of [`Bus`] on top of `embedded-hal` GPIO pins is
//! provided in the [`bitbang`] module.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal/
//! [`Bus`]: bus::Bus

#![doc(html_root_url = "https://docs.rs/i2c-memory/0.1.0")]
#![warn(missing_debug_implementations, rust_2018_idioms)]
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;
pub mod bitbang;
pub mod bus;
mod config;
mod error;
pub mod page;
pub mod prelude;
pub mod series24;
#[cfg(test)]
mod sim;
mod utils;

pub use crate::config::{AddressWidth, Config, BASE_ADDRESS};
pub use crate::error::Error;

use crate::bus::Bus;

/// A trait for reading operations from a memory chip.
pub trait Read<Addr, B: Bus> {
    /// Reads bytes from a memory chip.
    ///
    /// # Parameters
    /// * `addr`: The address to start reading at.
    /// * `buf`: The buffer to read `buf.len()` bytes into.
    fn read(&mut self, addr: Addr, buf: &mut [u8]) -> Result<(), Error<B::Error>>;
}

/// A trait for writing operations on a memory chip.
pub trait Write<Addr, B: Bus> {
    /// Writes bytes onto the memory chip.
    ///
    /// Returns once the device has committed all of `data`.
    ///
    /// # Parameters
    /// * `addr`: The address to write to.
    /// * `data`: The bytes to write to `addr`.
    fn write_bytes(&mut self, addr: Addr, data: &[u8]) -> Result<(), Error<B::Error>>;
}
