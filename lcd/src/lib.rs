pub mod delay;
pub mod i2c;
pub mod lcd;
#[cfg(test)]
mod testing;

use thiserror::Error;

pub use delay::{Delay, StdDelay};
pub use i2c::I2cSink;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum LcdError {
    #[error("bus transport failure: {0}")]
    Bus(String),
    #[error("no acknowledge from device at address {address:#04x}")]
    Nack { address: u8 },
    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),
    #[error("row {row} is out of range for a display with {rows} rows")]
    InvalidRow { row: u8, rows: u8 },
    #[error("controller RAM address {0:#x} is out of range")]
    InvalidAddress(u16),
    #[error("CGRAM slot {0} is out of range (0-7)")]
    InvalidSlot(u8),
    #[error("invalid display configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("display lock poisoned")]
    Poisoned,
}

impl LcdError {
    /// Whether the error came from the bus rather than from a bad argument.
    ///
    /// After a transport error the controller may be left between the two nibbles of a byte, so
    /// the only way back to a known state is [lcd::hd44780::DisplaySession::reinit].
    pub fn is_transport(&self) -> bool {
        matches!(self, LcdError::Bus(_) | LcdError::Nack { .. } | LcdError::Io(_))
    }
}

impl From<std::io::Error> for LcdError {
    fn from(err: std::io::Error) -> Self {
        LcdError::Io(err.kind())
    }
}

pub type LcdResult<T> = Result<T, LcdError>;
