//! Phase-level I2C bus primitives.
//!
//! The driver does not talk to an `embedded-hal` I2C master directly: those
//! only offer whole transactions, while EEPROM write-cycle polling and the
//! NACK-before-last-byte rule need control over every individual phase. A
//! [`Bus`] exposes exactly those phases, and their completion is observed
//! through [`Status`] flags the way an I2C peripheral's status registers
//! report it.

use bitflags::bitflags;

/// Transfer direction requested in the address phase (the R/W bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Master transmits.
    Write = 0,
    /// Master receives.
    Read = 1,
}

impl Direction {
    /// Returns the address byte for `address` in this direction.
    pub fn address_byte(self, address: u8) -> u8 {
        (address << 1) | self as u8
    }
}

bitflags! {
    /// Bus controller status flags.
    pub struct Status: u16 {
        /// Start (or repeated start) condition generated.
        const START_SENT = 1 << 0;
        /// Address phase completed and acknowledged.
        const ADDR_SENT = 1 << 1;
        /// The receiver did not acknowledge.
        const ACK_FAILURE = 1 << 2;
        /// Transmit buffer empty, the next byte may be queued.
        const TX_EMPTY = 1 << 3;
        /// A received byte is ready to be read.
        const RX_NOT_EMPTY = 1 << 4;
        /// Communication ongoing on the bus.
        const BUSY = 1 << 8;
        /// The controller is in master mode.
        const MASTER = 1 << 9;
    }
}

/// An I2C master controllable phase by phase.
///
/// Implementations only have to start each phase; the driver waits for its
/// completion by polling [`Bus::status`].
pub trait Bus {
    /// Error returned by the underlying controller or pins.
    type Error;

    /// Generates a start condition, or a repeated start inside a transaction.
    fn start(&mut self) -> Result<(), Self::Error>;

    /// Generates a stop condition.
    fn stop(&mut self) -> Result<(), Self::Error>;

    /// Transmits a 7-bit device address together with the R/W bit.
    fn send_address(&mut self, address: u8, direction: Direction) -> Result<(), Self::Error>;

    /// Queues one data byte for transmission.
    fn send_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Takes one received data byte.
    fn recv_byte(&mut self) -> Result<u8, Self::Error>;

    /// Selects whether received bytes get acknowledged.
    fn set_ack(&mut self, enabled: bool) -> Result<(), Self::Error>;

    /// Reads the current status flags.
    fn status(&mut self) -> Result<Status, Self::Error>;

    /// Clears [`Status::ACK_FAILURE`].
    fn clear_ack_failure(&mut self) -> Result<(), Self::Error>;
}

impl<B: Bus + ?Sized> Bus for &mut B {
    type Error = B::Error;

    fn start(&mut self) -> Result<(), Self::Error> {
        (**self).start()
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        (**self).stop()
    }

    fn send_address(&mut self, address: u8, direction: Direction) -> Result<(), Self::Error> {
        (**self).send_address(address, direction)
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        (**self).send_byte(byte)
    }

    fn recv_byte(&mut self) -> Result<u8, Self::Error> {
        (**self).recv_byte()
    }

    fn set_ack(&mut self, enabled: bool) -> Result<(), Self::Error> {
        (**self).set_ack(enabled)
    }

    fn status(&mut self) -> Result<Status, Self::Error> {
        (**self).status()
    }

    fn clear_ack_failure(&mut self) -> Result<(), Self::Error> {
        (**self).clear_ack_failure()
    }
}
