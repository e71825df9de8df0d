//! Software I2C master on two GPIO pins.
//!
//! Both pins must be configured as open-drain outputs with pull-ups on the
//! bus: driving a pin high releases the line, and SDA is read back to sample
//! data and acknowledge bits. Clock stretching is not supported.

use crate::bus::{Bus, Direction, Status};
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

/// Bit-banged [`Bus`] implementation.
///
/// Every phase runs to completion inside the call that starts it, so the
/// status flags are already final when the driver polls them.
///
/// # Type Parameters
///
/// * **`SCL`**: The clock line.
/// * **`SDA`**: The data line, readable while released.
/// * **`D`**: Delay provider timing the clock half periods.
#[derive(Debug)]
pub struct BitBang<SCL, SDA, D> {
    scl: SCL,
    sda: SDA,
    delay: D,
    half_period_us: u32,
    status: Status,
    ack: bool,
    /// Addressed for reading and no byte taken yet.
    unread: bool,
    receiving: bool,
}

impl<SCL, SDA, D, E> BitBang<SCL, SDA, D>
where
    SCL: OutputPin<Error = E>,
    SDA: OutputPin<Error = E> + InputPin<Error = E>,
    D: DelayUs<u32>,
{
    /// Creates a bus clocked at roughly `frequency_hz`.
    ///
    /// The actual rate is lower, since pin accesses add to every half period.
    pub fn new(scl: SCL, sda: SDA, delay: D, frequency_hz: u32) -> Self {
        BitBang {
            scl,
            sda,
            delay,
            half_period_us: (500_000 / frequency_hz.max(1)).max(1),
            status: Status::empty(),
            ack: true,
            unread: false,
            receiving: false,
        }
    }

    /// Returns the pins and the delay provider.
    pub fn free(self) -> (SCL, SDA, D) {
        (self.scl, self.sda, self.delay)
    }

    fn half_period(&mut self) {
        self.delay.delay_us(self.half_period_us);
    }

    fn set_sda(&mut self, high: bool) -> Result<(), E> {
        if high {
            self.sda.set_high()
        } else {
            self.sda.set_low()
        }
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), E> {
        self.set_sda(bit)?;
        self.half_period();
        self.scl.set_high()?;
        self.half_period();
        self.scl.set_low()
    }

    fn read_bit(&mut self) -> Result<bool, E> {
        self.sda.set_high()?;
        self.half_period();
        self.scl.set_high()?;
        self.half_period();
        let bit = self.sda.is_high()?;
        self.scl.set_low()?;
        Ok(bit)
    }

    /// Shifts out `byte` MSB first and returns whether it was acknowledged.
    fn write_byte(&mut self, byte: u8) -> Result<bool, E> {
        for i in (0..8).rev() {
            self.write_bit(byte & (1 << i) != 0)?;
        }
        let nack = self.read_bit()?;
        Ok(!nack)
    }

    fn read_byte(&mut self, ack: bool) -> Result<u8, E> {
        let mut byte = 0;
        for _ in 0..8 {
            byte = (byte << 1) | self.read_bit()? as u8;
        }
        self.write_bit(!ack)?;
        self.sda.set_high()?;
        Ok(byte)
    }
}

impl<SCL, SDA, D, E> Bus for BitBang<SCL, SDA, D>
where
    SCL: OutputPin<Error = E>,
    SDA: OutputPin<Error = E> + InputPin<Error = E>,
    D: DelayUs<u32>,
{
    type Error = E;

    fn start(&mut self) -> Result<(), E> {
        // Both lines high, then SDA falls while SCL is high. For a repeated
        // start SCL is low here, so SDA can be released first.
        self.sda.set_high()?;
        self.half_period();
        self.scl.set_high()?;
        self.half_period();
        self.sda.set_low()?;
        self.half_period();
        self.scl.set_low()?;

        self.status &= Status::ACK_FAILURE;
        self.status |= Status::START_SENT | Status::BUSY | Status::MASTER;
        self.receiving = false;
        self.unread = false;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), E> {
        if self.receiving && self.unread {
            // The addressed device drives the first data bit; take one byte
            // and NACK it so SDA is free for the stop condition.
            self.read_byte(false)?;
        }

        self.scl.set_low()?;
        self.sda.set_low()?;
        self.half_period();
        self.scl.set_high()?;
        self.half_period();
        self.sda.set_high()?;
        self.half_period();

        self.status &= Status::ACK_FAILURE;
        self.receiving = false;
        self.unread = false;
        Ok(())
    }

    fn send_address(&mut self, address: u8, direction: Direction) -> Result<(), E> {
        self.status.remove(Status::START_SENT);
        if !self.write_byte(direction.address_byte(address))? {
            self.status |= Status::ACK_FAILURE;
            return Ok(());
        }

        self.status |= Status::ADDR_SENT;
        match direction {
            Direction::Write => self.status |= Status::TX_EMPTY,
            Direction::Read => {
                self.receiving = true;
                self.unread = true;
                self.status |= Status::RX_NOT_EMPTY;
            }
        }
        Ok(())
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), E> {
        self.status.remove(Status::ADDR_SENT | Status::TX_EMPTY);
        if !self.write_byte(byte)? {
            self.status |= Status::ACK_FAILURE;
        }
        self.status |= Status::TX_EMPTY;
        Ok(())
    }

    fn recv_byte(&mut self) -> Result<u8, E> {
        self.status.remove(Status::ADDR_SENT);
        let ack = self.ack;
        let byte = self.read_byte(ack)?;
        self.unread = false;
        if !ack {
            self.status.remove(Status::RX_NOT_EMPTY);
        }
        Ok(byte)
    }

    fn set_ack(&mut self, enabled: bool) -> Result<(), E> {
        self.ack = enabled;
        Ok(())
    }

    fn status(&mut self) -> Result<Status, E> {
        Ok(self.status)
    }

    fn clear_ack_failure(&mut self) -> Result<(), E> {
        self.status.remove(Status::ACK_FAILURE);
        Ok(())
    }
}
