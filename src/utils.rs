use core::fmt;

/// Formats a byte buffer as compact hex, eliding the middle of long buffers.
pub struct HexSlice<'a>(pub &'a [u8]);

impl HexSlice<'_> {
    /// Bytes printed from each end before the middle gets elided.
    const EDGE: usize = 8;
}

impl fmt::Debug for HexSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;
        f.write_str("[")?;
        if bytes.len() <= 2 * Self::EDGE {
            write_hex(f, bytes)?;
        } else {
            write_hex(f, &bytes[..Self::EDGE])?;
            write!(f, " .. ({} bytes) .. ", bytes.len() - 2 * Self::EDGE)?;
            write_hex(f, &bytes[bytes.len() - Self::EDGE..])?;
        }
        f.write_str("]")
    }
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for (i, byte) in bytes.iter().enumerate() {
        if i != 0 {
            f.write_str(" ")?;
        }
        write!(f, "{:02x}", byte)?;
    }
    Ok(())
}
