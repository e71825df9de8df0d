//! Simulated 24-series EEPROM behind a phase-level bus, for tests.

use crate::bus::{Bus, Direction, Status};
use core::convert::Infallible;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Start,
    Address(u8, Direction),
    Send(u8),
    Recv { acked: bool },
    Stop,
}

#[derive(Debug, PartialEq)]
enum Phase {
    Idle,
    Started,
    Refused,
    Writing,
    Reading { nacked: bool },
}

#[derive(Debug)]
pub struct SimEeprom {
    pub memory: Vec<u8>,
    page_size: usize,
    device: u8,
    address_bytes: usize,
    block_mask: u8,
    block: u8,
    /// Answers address phases at all.
    pub present: bool,
    /// Address phases refused after each committed write.
    pub write_cycle_polls: u32,
    busy_polls_left: u32,
    busy_refusals: u32,
    /// Drops master mode right after acknowledging the address.
    pub lose_master: bool,
    /// Never reports a generated start condition.
    pub stuck_start: bool,
    /// Refuses read-direction address phases.
    pub refuse_read_address: bool,
    /// Leaves BUSY clear after acknowledging a read-direction address.
    pub drop_busy_on_read: bool,
    /// Refuses data bytes following the memory address.
    pub nack_data: bool,
    /// Keeps BUSY set after a stop condition.
    pub stuck_busy: bool,

    status: Status,
    phase: Phase,
    ack: bool,
    pointer: usize,
    word_address: Vec<u8>,
    pending: Vec<u8>,

    /// Committed page writes as `(address, len)`.
    pub writes: Vec<(usize, usize)>,
    pub events: Vec<Event>,
}

impl SimEeprom {
    pub fn new(capacity: usize, page_size: usize) -> Self {
        SimEeprom {
            memory: vec![0xFF; capacity],
            page_size,
            device: 0x50,
            address_bytes: 2,
            block_mask: 0,
            block: 0,
            present: true,
            write_cycle_polls: 0,
            busy_polls_left: 0,
            busy_refusals: 0,
            lose_master: false,
            stuck_start: false,
            refuse_read_address: false,
            drop_busy_on_read: false,
            nack_data: false,
            stuck_busy: false,
            status: Status::empty(),
            phase: Phase::Idle,
            ack: false,
            pointer: 0,
            word_address: Vec::new(),
            pending: Vec::new(),
            writes: Vec::new(),
            events: Vec::new(),
        }
    }

    /// A part with one address byte and block select bits in the device
    /// address.
    pub fn with_block_select(capacity: usize, page_size: usize) -> Self {
        SimEeprom {
            address_bytes: 1,
            block_mask: ((capacity >> 8).saturating_sub(1) & 0b111) as u8,
            ..Self::new(capacity, page_size)
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle && !self.status.intersects(Status::BUSY | Status::MASTER)
    }

    pub fn count(&self, event: Event) -> usize {
        self.events.iter().filter(|&&e| e == event).count()
    }

    pub fn busy_refusals(&self) -> u32 {
        self.busy_refusals
    }

    fn commit(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        // Writes past the end of a page wrap around inside that page.
        let page_start = self.pointer - self.pointer % self.page_size;
        let mut offset = self.pointer % self.page_size;
        for &byte in &self.pending {
            self.memory[page_start + offset] = byte;
            offset = (offset + 1) % self.page_size;
        }
        self.writes.push((self.pointer, self.pending.len()));
        self.pending.clear();
        self.busy_polls_left = self.write_cycle_polls;
    }
}

impl Bus for SimEeprom {
    type Error = Infallible;

    fn start(&mut self) -> Result<(), Infallible> {
        self.events.push(Event::Start);
        if self.stuck_start {
            return Ok(());
        }
        self.status.remove(Status::ADDR_SENT | Status::TX_EMPTY | Status::RX_NOT_EMPTY);
        self.status |= Status::START_SENT | Status::BUSY | Status::MASTER;
        self.phase = Phase::Started;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Infallible> {
        self.events.push(Event::Stop);
        if self.phase == Phase::Writing {
            self.commit();
        }
        self.word_address.clear();
        self.pending.clear();
        self.status &= Status::ACK_FAILURE;
        if self.stuck_busy {
            self.status |= Status::BUSY;
        }
        self.phase = Phase::Idle;
        Ok(())
    }

    fn send_address(&mut self, address: u8, direction: Direction) -> Result<(), Infallible> {
        self.events.push(Event::Address(address, direction));
        assert_eq!(self.phase, Phase::Started, "address phase without start");
        self.status.remove(Status::START_SENT);

        let refused = direction == Direction::Read && self.refuse_read_address;
        if !self.present || refused || address & !self.block_mask != self.device {
            self.status |= Status::ACK_FAILURE;
            self.phase = Phase::Refused;
            return Ok(());
        }
        if self.busy_polls_left > 0 {
            self.busy_polls_left -= 1;
            self.busy_refusals += 1;
            self.status |= Status::ACK_FAILURE;
            self.phase = Phase::Refused;
            return Ok(());
        }

        self.block = address & self.block_mask;
        self.status |= Status::ADDR_SENT;
        if self.lose_master {
            self.status.remove(Status::MASTER);
        }
        match direction {
            Direction::Write => {
                self.status |= Status::TX_EMPTY;
                self.phase = Phase::Writing;
            }
            Direction::Read => {
                self.status |= Status::RX_NOT_EMPTY;
                if self.drop_busy_on_read {
                    self.status.remove(Status::BUSY);
                }
                self.phase = Phase::Reading { nacked: false };
            }
        }
        Ok(())
    }

    fn send_byte(&mut self, byte: u8) -> Result<(), Infallible> {
        self.events.push(Event::Send(byte));
        assert_eq!(self.phase, Phase::Writing, "byte sent outside a write");
        assert!(self.status.contains(Status::TX_EMPTY), "byte queued before TX_EMPTY");
        self.status.remove(Status::ADDR_SENT);

        if self.word_address.len() < self.address_bytes {
            self.word_address.push(byte);
            if self.word_address.len() == self.address_bytes {
                let address = self
                    .word_address
                    .iter()
                    .fold(usize::from(self.block), |acc, &b| acc << 8 | usize::from(b));
                self.pointer = address % self.memory.len();
            }
        } else if self.nack_data {
            self.status |= Status::ACK_FAILURE;
            self.phase = Phase::Refused;
        } else {
            self.pending.push(byte);
        }
        Ok(())
    }

    fn recv_byte(&mut self) -> Result<u8, Infallible> {
        let acked = self.ack;
        self.events.push(Event::Recv { acked });
        match self.phase {
            Phase::Reading { nacked: false } => {}
            _ => panic!("byte read outside a read or after a NACK"),
        }
        assert!(self.status.contains(Status::RX_NOT_EMPTY), "byte read before RX_NOT_EMPTY");
        self.status.remove(Status::ADDR_SENT);

        let byte = self.memory[self.pointer];
        self.pointer = (self.pointer + 1) % self.memory.len();
        if !acked {
            self.phase = Phase::Reading { nacked: true };
            self.status.remove(Status::RX_NOT_EMPTY);
        }
        Ok(byte)
    }

    fn set_ack(&mut self, enabled: bool) -> Result<(), Infallible> {
        self.ack = enabled;
        Ok(())
    }

    fn status(&mut self) -> Result<Status, Infallible> {
        Ok(self.status)
    }

    fn clear_ack_failure(&mut self) -> Result<(), Infallible> {
        self.status.remove(Status::ACK_FAILURE);
        Ok(())
    }
}
