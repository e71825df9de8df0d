//! Driver for 24-series I2C EEPROM chips.

use crate::bus::{Bus, Direction, Status};
use crate::config::{AddressWidth, Config};
use crate::page::{self, Chunks};
use crate::utils::HexSlice;
use crate::{Error, Read, Write};

/// Driver for 24-series I2C EEPROM chips.
///
/// # Type Parameters
///
/// * **`B`**: The [`Bus`] the EEPROM is attached to. The driver is its sole
///   user for as long as it exists; get it back with [`Eeprom::free`].
#[derive(Debug)]
pub struct Eeprom<B> {
    bus: B,
    config: Config,
}

impl<B: Bus> Eeprom<B> {
    /// Creates a driver without touching the bus.
    pub fn new(bus: B, config: Config) -> Self {
        Self { bus, config }
    }

    /// Creates a new 24-series EEPROM driver.
    ///
    /// # Parameters
    ///
    /// * **`bus`**: An initialized bus controller, configured for a clock
    ///   rate the device supports.
    /// * **`config`**: Geometry and addressing of the device.
    ///
    /// Fails with [`Error::BusFault`] if the controller is still busy with a
    /// transaction.
    pub fn init(bus: B, config: Config) -> Result<Self, Error<B::Error>> {
        let mut this = Self::new(bus, config);
        let status = this.status()?;
        info!("Eeprom::init: status = {:?}", status);

        if status.intersects(Status::BUSY | Status::MASTER) {
            return Err(Error::BusFault);
        }

        Ok(this)
    }

    /// Returns the configuration the driver was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Destroys the driver and returns the bus.
    pub fn free(self) -> B {
        self.bus
    }

    /// Checks whether the device acknowledges its address.
    ///
    /// Returns `Ok(false)` while the device is absent or busy with a write
    /// cycle.
    pub fn probe(&mut self) -> Result<bool, Error<B::Error>> {
        let device = self.config.address;
        match self.transaction(|this| this.address(device, Direction::Read)) {
            Ok(()) => Ok(true),
            Err(Error::NotAcknowledged) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Writes a single byte and waits for the write cycle to finish.
    pub fn write_byte(&mut self, address: u16, byte: u8) -> Result<(), Error<B::Error>> {
        self.write_block(address, &[byte])
    }

    /// Reads a single byte.
    pub fn read_byte(&mut self, address: u16) -> Result<u8, Error<B::Error>> {
        let mut buf = [0];
        self.read_block(address, &mut buf)?;
        Ok(buf[0])
    }

    /// Writes `data` starting at `address`, splitting it at page boundaries.
    ///
    /// After every page the device is polled until it has committed the data.
    /// A failure aborts the remaining pages; pages written before it keep
    /// their new contents.
    pub fn write_block(&mut self, address: u16, data: &[u8]) -> Result<(), Error<B::Error>> {
        self.check_range(address, data.len())?;
        debug!("write_block: {} bytes at {:#06x}", data.len(), address);

        for chunk in Chunks::new(address, data.len(), self.config.page_size) {
            self.write_unit(chunk.address, &data[chunk.range()])?;
            self.wait_write_cycle()?;
        }
        Ok(())
    }

    /// Fills `buf` with the contents starting at `address`.
    pub fn read_block(&mut self, address: u16, buf: &mut [u8]) -> Result<(), Error<B::Error>> {
        self.check_range(address, buf.len())?;
        debug!("read_block: {} bytes at {:#06x}", buf.len(), address);

        for chunk in Chunks::new(address, buf.len(), self.config.page_size) {
            self.read_unit(chunk.address, &mut buf[chunk.range()])?;
        }
        Ok(())
    }

    /// Writes as much of `data` as fits into the page containing `address`.
    ///
    /// Returns the number of bytes written. Waits for the write cycle.
    pub fn write_page(&mut self, address: u16, data: &[u8]) -> Result<usize, Error<B::Error>> {
        self.check_range(address, 0)?;
        let len = page::chunk_length(address, data.len(), self.config.page_size);
        self.check_range(address, len)?;
        if len == 0 {
            return Ok(0);
        }

        self.write_unit(address, &data[..len])?;
        self.wait_write_cycle()?;
        Ok(len)
    }

    /// Reads as much of `buf` as fits into the page containing `address`.
    ///
    /// Returns the number of bytes read.
    pub fn read_page(&mut self, address: u16, buf: &mut [u8]) -> Result<usize, Error<B::Error>> {
        self.check_range(address, 0)?;
        let len = page::chunk_length(address, buf.len(), self.config.page_size);
        self.check_range(address, len)?;
        if len == 0 {
            return Ok(0);
        }

        self.read_unit(address, &mut buf[..len])?;
        Ok(len)
    }

    fn check_range(&self, address: u16, len: usize) -> Result<(), Error<B::Error>> {
        if self.config.page_size == 0 {
            warn!("page size of 0 configured");
            return Err(Error::OutOfBounds);
        }
        match usize::from(address).checked_add(len) {
            Some(end) if end <= self.config.capacity as usize => Ok(()),
            _ => Err(Error::OutOfBounds),
        }
    }

    /// One write transaction. `data` must not cross a page.
    fn write_unit(&mut self, address: u16, data: &[u8]) -> Result<(), Error<B::Error>> {
        trace!("write_unit: {:#06x} <- {:?}", address, HexSlice(data));
        let device = self.config.device_address(address);

        self.transaction(|this| {
            this.address(device, Direction::Write)?;
            this.expect_status(Status::BUSY | Status::MASTER)?;
            this.send_memory_address(address)?;
            for &byte in data {
                this.send(byte)?;
            }
            Ok(())
        })
    }

    /// One random read transaction. `buf` must not cross a page.
    fn read_unit(&mut self, address: u16, buf: &mut [u8]) -> Result<(), Error<B::Error>> {
        let device = self.config.device_address(address);

        self.transaction(|this| {
            // Dummy write to load the device's address pointer.
            this.address(device, Direction::Write)?;
            this.expect_status(Status::BUSY | Status::MASTER)?;
            this.send_memory_address(address)?;

            // Repeated start, no stop in between.
            this.address(device, Direction::Read)?;
            this.expect_status(Status::BUSY)?;

            this.set_ack(true)?;
            let last = buf.len().saturating_sub(1);
            for (i, byte) in buf.iter_mut().enumerate() {
                // NACK the final byte so the device releases the bus.
                if i == last {
                    this.set_ack(false)?;
                }
                this.wait_for(Status::RX_NOT_EMPTY)?;
                *byte = this.bus.recv_byte().map_err(Error::Bus)?;
            }
            Ok(())
        })?;

        trace!("read_unit: {:#06x} -> {:?}", address, HexSlice(buf));
        Ok(())
    }

    /// Polls the device until it acknowledges again after a page write.
    fn wait_write_cycle(&mut self) -> Result<(), Error<B::Error>> {
        let attempts = self.config.write_cycle_attempts.max(1);
        for attempt in 1..=attempts {
            if self.probe()? {
                trace!("write cycle done after {} polls", attempt);
                return Ok(());
            }
        }

        warn!("device still busy after {} write cycle polls", attempts);
        Err(Error::Timeout)
    }

    /// Runs `body` as one bus transaction.
    ///
    /// The stop condition is issued whatever `body` returns, and the bus is
    /// idle again once this returns `Ok`.
    fn transaction<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T, Error<B::Error>>,
    ) -> Result<T, Error<B::Error>> {
        let result = body(self);
        let stopped = self.stop();
        if let Err(Error::NotAcknowledged) = result {
            self.bus.clear_ack_failure().map_err(Error::Bus)?;
        }
        let value = result?;
        stopped?;
        Ok(value)
    }

    /// Start condition followed by the address phase.
    fn address(&mut self, device: u8, direction: Direction) -> Result<(), Error<B::Error>> {
        self.bus.start().map_err(Error::Bus)?;
        self.wait_for(Status::START_SENT)?;

        self.bus.send_address(device, direction).map_err(Error::Bus)?;
        let status = self.wait_for(Status::ADDR_SENT | Status::ACK_FAILURE)?;
        if !status.contains(Status::ADDR_SENT) {
            debug!("{:#04x} did not acknowledge ({:?})", device, direction);
            return Err(Error::NotAcknowledged);
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Error<B::Error>> {
        self.bus.stop().map_err(Error::Bus)?;

        for _ in 0..self.config.poll_limit.max(1) {
            if !self.status()?.intersects(Status::BUSY | Status::MASTER) {
                return Ok(());
            }
        }
        warn!("bus did not become idle after stop");
        Err(Error::Timeout)
    }

    fn send_memory_address(&mut self, address: u16) -> Result<(), Error<B::Error>> {
        if self.config.address_width == AddressWidth::Two {
            self.send((address >> 8) as u8)?;
        }
        self.send(address as u8)
    }

    fn send(&mut self, byte: u8) -> Result<(), Error<B::Error>> {
        self.bus.send_byte(byte).map_err(Error::Bus)?;
        let status = self.wait_for(Status::TX_EMPTY | Status::ACK_FAILURE)?;
        if status.contains(Status::ACK_FAILURE) {
            // Write-protected parts refuse data bytes.
            debug!("byte {:#04x} not acknowledged", byte);
            return Err(Error::NotAcknowledged);
        }
        Ok(())
    }

    fn set_ack(&mut self, enabled: bool) -> Result<(), Error<B::Error>> {
        self.bus.set_ack(enabled).map_err(Error::Bus)
    }

    /// Fails with `BusFault` unless all of `flags` are set.
    fn expect_status(&mut self, flags: Status) -> Result<(), Error<B::Error>> {
        let status = self.status()?;
        if status.contains(flags) {
            Ok(())
        } else {
            warn!("unexpected bus status {:?}, expected {:?}", status, flags);
            Err(Error::BusFault)
        }
    }

    /// Polls until any of `flags` is set.
    fn wait_for(&mut self, flags: Status) -> Result<Status, Error<B::Error>> {
        for _ in 0..self.config.poll_limit.max(1) {
            let status = self.status()?;
            if status.intersects(flags) {
                return Ok(status);
            }
        }
        warn!("timed out waiting for {:?}", flags);
        Err(Error::Timeout)
    }

    fn status(&mut self) -> Result<Status, Error<B::Error>> {
        self.bus.status().map_err(Error::Bus)
    }
}

impl<B: Bus> Read<u16, B> for Eeprom<B> {
    /// Reads EEPROM contents into `buf`, starting at `addr`.
    ///
    /// The read is split at page boundaries like a write, although the
    /// devices themselves would continue across pages.
    fn read(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), Error<B::Error>> {
        self.read_block(addr, buf)
    }
}

impl<B: Bus> Write<u16, B> for Eeprom<B> {
    fn write_bytes(&mut self, addr: u16, data: &[u8]) -> Result<(), Error<B::Error>> {
        self.write_block(addr, data)
    }
}
