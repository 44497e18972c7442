//! I2C byte sinks.
//!
//! The display driver never reads from the bus. Everything it needs is a way to put one byte on
//! the wire at a given address, which is what [I2cSink] describes.
//!
//! Implementations:
//! - [SoftI2cSink] bit-bangs an I2C master over any pair of open-drain lines ([I2cLines]),
//!   with [GpiodI2cLines] driving them through the Linux GPIO character device.
//! - [HalI2cSink] (feature `embedded-hal`) forwards to an `embedded_hal::i2c::I2c` bus.

#[cfg(feature = "embedded-hal")]
mod hal;
mod soft;

#[cfg(feature = "embedded-hal")]
pub use hal::*;
pub use soft::*;

use crate::LcdResult;
use std::fmt::Debug;

pub trait I2cSink: Debug {
    /// Sends a single byte to the 7-bit `address`.
    ///
    /// Blocks until the transfer completes. An error means the byte may or may not have reached
    /// the device; callers must not assume anything about the device state afterwards.
    fn send(&mut self, address: u8, value: u8) -> LcdResult<()>;
}

impl<S: I2cSink + ?Sized> I2cSink for &mut S {
    fn send(&mut self, address: u8, value: u8) -> LcdResult<()> {
        (**self).send(address, value)
    }
}

impl<S: I2cSink + ?Sized> I2cSink for Box<S> {
    fn send(&mut self, address: u8, value: u8) -> LcdResult<()> {
        (**self).send(address, value)
    }
}
