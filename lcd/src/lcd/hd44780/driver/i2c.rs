use crate::lcd::hd44780::driver::HD44780Driver;
use crate::lcd::hd44780::pin::{ENABLE, REGISTER_SELECT};
use crate::lcd::hd44780::Backlight;
use crate::{Delay, I2cSink, LcdResult};
use log::{debug, trace};
use std::fmt::{Debug, Formatter};

/// Minimum width of the enable pulse.
pub const ENABLE_PULSE_US: u32 = 2;
/// Time the controller needs to latch a nibble after the falling enable edge.
pub const NIBBLE_SETTLE_US: u32 = 50;

/// Nibble transport to an HD44780 through a one-byte I2C expander.
///
/// Every byte the controller sees is split into two nibbles, high nibble first. Each nibble is
/// presented on `D4..D7` with the enable bit set, held for [ENABLE_PULSE_US], then presented again
/// with enable cleared and left to settle for [NIBBLE_SETTLE_US]. That is two bus writes per nibble
/// and four per byte.
///
/// A failed bus write stops the transfer at once. The controller might then be holding half of a
/// byte, and only a full re-initialization brings it back in sync.
pub struct I2cHD44780Driver<S: I2cSink, D: Delay> {
    sink: S,
    delay: D,
    address: u8,
    backlight: Backlight,
}

impl<S: I2cSink, D: Delay> I2cHD44780Driver<S, D> {
    /// Creates the transport with the backlight off. Nothing is sent.
    pub fn new(sink: S, delay: D, address: u8) -> Self {
        Self {
            sink,
            delay,
            address,
            backlight: Backlight::Off,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn backlight(&self) -> Backlight {
        self.backlight
    }

    /// Switches the backlight by writing an otherwise empty byte with the new backlight bit.
    ///
    /// The cached state is only changed if the write succeeds.
    pub fn set_backlight(&mut self, backlight: Backlight) -> LcdResult<()> {
        let previous = self.backlight;
        self.backlight = backlight;
        if let Err(err) = self.transmit(0) {
            self.backlight = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Writes one raw byte to the expander, with the backlight bit OR-ed in and no strobe.
    pub fn transmit(&mut self, value: u8) -> LcdResult<()> {
        self.sink.send(self.address, value | self.backlight.bits())
    }

    /// Strobes one nibble into the controller.
    ///
    /// `value` carries the nibble in its upper four bits and the control bits in the lower four.
    pub fn write_nibble(&mut self, value: u8) -> LcdResult<()> {
        self.transmit(value | ENABLE)?;
        self.delay.delay_us(ENABLE_PULSE_US);
        self.transmit(value & !ENABLE)?;
        self.delay.delay_us(NIBBLE_SETTLE_US);
        Ok(())
    }

    /// Writes a full byte as two nibbles, high nibble first, with `mode` in the low bits of both.
    pub fn write_byte(&mut self, value: u8, mode: u8) -> LcdResult<()> {
        trace!("Sending data: {:08b}, RS: {}", value, mode & REGISTER_SELECT != 0);

        let high_nibble = value & 0xF0;
        let low_nibble = (value << 4) & 0xF0;
        self.write_nibble(high_nibble | mode)?;
        self.write_nibble(low_nibble | mode)?;
        Ok(())
    }

    pub fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Gives back the bus and the delay source.
    pub fn release(self) -> (S, D) {
        (self.sink, self.delay)
    }
}

impl<S: I2cSink, D: Delay> Debug for I2cHD44780Driver<S, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "I2cHD44780Driver({:?} @ {:#04x})", self.sink, self.address)
    }
}

impl<S: I2cSink, D: Delay> HD44780Driver for I2cHD44780Driver<S, D> {
    fn send_command(&mut self, command: u8) -> LcdResult<()> {
        debug!("Command: {:08b}", command);
        self.write_byte(command, 0)
    }

    fn send_data(&mut self, data: u8) -> LcdResult<()> {
        self.write_byte(data, REGISTER_SELECT)
    }
}
