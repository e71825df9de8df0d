use core::fmt::{self, Debug, Display};

mod private {
    #[derive(Debug)]
    pub enum Private {}
}

/// The error type used by this library.
///
/// This can encapsulate an error reported by the [`Bus`] implementation, and
/// adds its own protocol errors on top of that.
///
/// [`Bus`]: crate::bus::Bus
pub enum Error<E> {
    /// A bus primitive failed.
    Bus(E),

    /// The device did not acknowledge its address.
    ///
    /// Either no device answers at the configured address, or the device is
    /// still busy committing a previous write.
    NotAcknowledged,

    /// The bus controller reported an unexpected state.
    ///
    /// This happens when the controller has lost master mode or is not busy
    /// right after an acknowledged address phase, or when it is not idle
    /// while the driver is being initialized.
    BusFault,

    /// A status flag did not show up within the configured number of polls,
    /// or the device kept refusing the write-cycle poll.
    Timeout,

    /// The requested range does not fit into the device, or the configured
    /// page size is zero.
    OutOfBounds,

    #[doc(hidden)]
    __NonExhaustive(private::Private),
}

impl<E> Debug for Error<E>
where
    E: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(bus) => write!(f, "Error::Bus({:?})", bus),
            Error::NotAcknowledged => f.write_str("Error::NotAcknowledged"),
            Error::BusFault => f.write_str("Error::BusFault"),
            Error::Timeout => f.write_str("Error::Timeout"),
            Error::OutOfBounds => f.write_str("Error::OutOfBounds"),
            Error::__NonExhaustive(_) => unreachable!(),
        }
    }
}

impl<E> Display for Error<E>
where
    E: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(bus) => write!(f, "bus error: {}", bus),
            Error::NotAcknowledged => f.write_str("device did not acknowledge its address"),
            Error::BusFault => f.write_str("bus controller in unexpected state"),
            Error::Timeout => f.write_str("timed out waiting for the bus or device"),
            Error::OutOfBounds => f.write_str("address range exceeds device capacity"),
            Error::__NonExhaustive(_) => unreachable!(),
        }
    }
}

impl<E: PartialEq> PartialEq for Error<E> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Error::Bus(a), Error::Bus(b)) => a == b,
            (Error::NotAcknowledged, Error::NotAcknowledged)
            | (Error::BusFault, Error::BusFault)
            | (Error::Timeout, Error::Timeout)
            | (Error::OutOfBounds, Error::OutOfBounds) => true,
            _ => false,
        }
    }
}
