use crate::i2c::I2cSink;
use crate::{LcdError, LcdResult};
use embedded_hal::i2c::{Error, I2c};
use log::trace;
use std::fmt::{Debug, Formatter};

/// [I2cSink] over any `embedded-hal` 1.0 blocking I2C bus.
pub struct HalI2cSink<I2C> {
    bus: I2C,
}

impl<I2C: I2c> HalI2cSink<I2C> {
    pub fn new(bus: I2C) -> Self {
        Self { bus }
    }

    pub fn release(self) -> I2C {
        self.bus
    }
}

impl<I2C> Debug for HalI2cSink<I2C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "HalI2cSink")
    }
}

impl<I2C: I2c> I2cSink for HalI2cSink<I2C> {
    fn send(&mut self, address: u8, value: u8) -> LcdResult<()> {
        trace!("I2C {:#04x} <- {:08b}", address, value);
        self.bus
            .write(address, &[value])
            .map_err(|err| LcdError::Bus(format!("{:?}", err.kind())))
    }
}
