//! Page boundary arithmetic.
//!
//! A write transaction that runs past the end of a page wraps around to the
//! start of the same page on 24-series parts, so every transfer is split at
//! page boundaries.

/// Returns how many of `requested` bytes starting at `address` fit before the
/// next page boundary.
///
/// All 24-series parts use a power of two for `page_size`.
///
/// # Panics
///
/// Panics if `page_size` is zero.
pub fn chunk_length(address: u16, requested: usize, page_size: u16) -> usize {
    let page_size = usize::from(page_size);
    let room = page_size - usize::from(address) % page_size;
    requested.min(room)
}

/// One page-bounded piece of a larger transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Device address of the first byte.
    pub address: u16,
    /// Offset of the first byte in the caller's buffer.
    pub offset: usize,
    /// Number of bytes.
    pub len: usize,
}

impl Chunk {
    /// The buffer range covered by this chunk.
    pub fn range(&self) -> core::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Iterator over the page-bounded chunks of a transfer.
#[derive(Debug, Clone)]
pub struct Chunks {
    address: u32,
    offset: usize,
    remaining: usize,
    page_size: u16,
}

impl Chunks {
    /// Splits `len` bytes starting at `address` into page-bounded chunks.
    pub fn new(address: u16, len: usize, page_size: u16) -> Self {
        Self {
            address: u32::from(address),
            offset: 0,
            remaining: len,
            page_size,
        }
    }
}

impl Iterator for Chunks {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.remaining == 0 {
            return None;
        }

        // The address stays below 64 KiB while there is data left for any
        // request that fits into the device.
        let address = self.address as u16;
        let len = chunk_length(address, self.remaining, self.page_size);
        let chunk = Chunk {
            address,
            offset: self.offset,
            len,
        };

        self.address += len as u32;
        self.offset += len;
        self.remaining -= len;
        Some(chunk)
    }
}
