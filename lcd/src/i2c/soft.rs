use crate::i2c::I2cSink;
use crate::{LcdError, LcdResult};
use log::{trace, warn};
use std::fmt::Debug;
use std::thread::sleep;
use std::time::Duration;

/// A pair of open-drain lines an I2C master can drive.
///
/// Writing `true` releases the line (the pull-up takes it high), writing `false` pulls it low.
pub trait I2cLines: Debug {
    fn set_sda(&mut self, high: bool) -> LcdResult<()>;
    fn set_scl(&mut self, high: bool) -> LcdResult<()>;
    /// Samples the SDA level. Only meaningful while SDA is released.
    fn read_sda(&mut self) -> LcdResult<bool>;
}

/// Shortest clock phase for standard-mode I2C.
pub const DEFAULT_HALF_PERIOD: Duration = Duration::from_micros(5);

/// Bit-banged, write-only I2C master.
///
/// Each [I2cSink::send] is a full transaction: start, address byte with the write bit, data byte,
/// stop. A missing acknowledge on either byte ends the transaction with a stop condition and
/// reports [LcdError::Nack].
#[derive(Debug)]
pub struct SoftI2cSink<L: I2cLines> {
    lines: L,
    half_period: Duration,
}

impl<L: I2cLines> SoftI2cSink<L> {
    /// Creates a sink clocked at no more than about 100 kHz. Each clock phase is held for at least
    /// [DEFAULT_HALF_PERIOD]. Both lines are released.
    pub fn new(lines: L) -> LcdResult<Self> {
        let mut sink = Self {
            lines,
            half_period: DEFAULT_HALF_PERIOD,
        };
        sink.lines.set_sda(true)?;
        sink.lines.set_scl(true)?;
        Ok(sink)
    }

    /// Sets the time each clock phase is held.
    pub fn with_half_period(mut self, half_period: Duration) -> Self {
        self.half_period = half_period;
        self
    }

    pub fn release(self) -> L {
        self.lines
    }

    fn wait(&self) {
        if !self.half_period.is_zero() {
            sleep(self.half_period);
        }
    }

    fn start(&mut self) -> LcdResult<()> {
        self.lines.set_sda(true)?;
        self.lines.set_scl(true)?;
        self.wait();
        self.lines.set_sda(false)?;
        self.wait();
        self.lines.set_scl(false)?;
        Ok(())
    }

    fn stop(&mut self) -> LcdResult<()> {
        self.lines.set_sda(false)?;
        self.wait();
        self.lines.set_scl(true)?;
        self.wait();
        self.lines.set_sda(true)?;
        self.wait();
        Ok(())
    }

    /// Clocks out one byte MSb first and returns whether the receiver acknowledged it.
    fn write_byte(&mut self, byte: u8) -> LcdResult<bool> {
        for bit in (0..8).rev() {
            self.lines.set_sda(byte & (1 << bit) != 0)?;
            self.wait();
            self.lines.set_scl(true)?;
            self.wait();
            self.lines.set_scl(false)?;
        }

        // Ninth clock: receiver pulls SDA low to acknowledge
        self.lines.set_sda(true)?;
        self.wait();
        self.lines.set_scl(true)?;
        self.wait();
        let nack = self.lines.read_sda()?;
        self.lines.set_scl(false)?;
        Ok(!nack)
    }
}

impl<L: I2cLines> I2cSink for SoftI2cSink<L> {
    fn send(&mut self, address: u8, value: u8) -> LcdResult<()> {
        trace!("I2C {:#04x} <- {:08b}", address, value);

        self.start()?;
        let acked = self.write_byte(address << 1)? && self.write_byte(value)?;
        self.stop()?;

        if !acked {
            warn!("No ACK from {:#04x}", address);
            return Err(LcdError::Nack { address });
        }
        Ok(())
    }
}

/// SDA and SCL requested as open-drain outputs from a Linux GPIO chip.
#[cfg(feature = "gpiod")]
pub struct GpiodI2cLines {
    chip_name: String,
    pins: (u32, u32),
    sda: gpiod::Lines<gpiod::Output>,
    scl: gpiod::Lines<gpiod::Output>,
}

#[cfg(feature = "gpiod")]
impl GpiodI2cLines {
    pub fn new(chip: &gpiod::Chip, sda_pin: u32, scl_pin: u32) -> LcdResult<Self> {
        let request = |pin: u32| {
            chip.request_lines(
                gpiod::Options::output([pin])
                    .consumer(env!("CARGO_PKG_NAME"))
                    .drive(gpiod::Drive::OpenDrain)
                    .bias(gpiod::Bias::PullUp),
            )
        };
        let sda = request(sda_pin)?;
        let scl = request(scl_pin)?;
        Ok(Self {
            chip_name: chip.name().to_string(),
            pins: (sda_pin, scl_pin),
            sda,
            scl,
        })
    }
}

#[cfg(feature = "gpiod")]
impl Debug for GpiodI2cLines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GpiodI2cLines({})[sda: {}, scl: {}]",
            self.chip_name, self.pins.0, self.pins.1
        )
    }
}

#[cfg(feature = "gpiod")]
impl I2cLines for GpiodI2cLines {
    fn set_sda(&mut self, high: bool) -> LcdResult<()> {
        self.sda.set_values([high])?;
        Ok(())
    }

    fn set_scl(&mut self, high: bool) -> LcdResult<()> {
        self.scl.set_values([high])?;
        Ok(())
    }

    fn read_sda(&mut self) -> LcdResult<bool> {
        let values = self.sda.get_values([false])?;
        Ok(values[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Open-drain lines with a simulated receiver that latches SDA on every rising SCL edge.
    #[derive(Debug)]
    struct SimulatedLines {
        sda: bool,
        scl: bool,
        sampled: Vec<bool>,
        starts: usize,
        stops: usize,
        nack_after_bytes: Option<usize>,
        acks_read: usize,
    }

    impl SimulatedLines {
        fn idle() -> Self {
            Self {
                sda: true,
                scl: true,
                sampled: Vec::new(),
                starts: 0,
                stops: 0,
                nack_after_bytes: None,
                acks_read: 0,
            }
        }
    }

    impl I2cLines for SimulatedLines {
        fn set_sda(&mut self, high: bool) -> LcdResult<()> {
            if self.scl && self.sda && !high {
                self.starts += 1;
            }
            if self.scl && !self.sda && high {
                self.stops += 1;
            }
            self.sda = high;
            Ok(())
        }

        fn set_scl(&mut self, high: bool) -> LcdResult<()> {
            if !self.scl && high {
                self.sampled.push(self.sda);
            }
            self.scl = high;
            Ok(())
        }

        fn read_sda(&mut self) -> LcdResult<bool> {
            self.acks_read += 1;
            let nack = self
                .nack_after_bytes
                .is_some_and(|n| self.acks_read > n);
            Ok(nack)
        }
    }

    fn bytes_of(bits: &[bool]) -> Vec<u8> {
        // 8 data clocks plus the acknowledge clock; the stop condition adds one trailing edge
        bits.chunks_exact(9)
            .map(|chunk| chunk[..8].iter().fold(0u8, |acc, &b| (acc << 1) | b as u8))
            .collect()
    }

    #[test]
    fn send_clocks_address_then_value() {
        let lines = SimulatedLines::idle();
        let mut sink = SoftI2cSink::new(lines)
            .unwrap()
            .with_half_period(Duration::ZERO);

        sink.send(0x27, 0b1010_1100).unwrap();

        let lines = sink.release();
        assert_eq!(lines.starts, 1);
        assert_eq!(lines.stops, 1);
        assert_eq!(bytes_of(&lines.sampled), vec![0x27 << 1, 0b1010_1100]);
        assert!(lines.sda && lines.scl);
    }

    #[test]
    fn missing_ack_is_reported_and_bus_released() {
        let lines = SimulatedLines {
            nack_after_bytes: Some(0),
            ..SimulatedLines::idle()
        };
        let mut sink = SoftI2cSink::new(lines)
            .unwrap()
            .with_half_period(Duration::ZERO);

        let err = sink.send(0x3F, 0x08).unwrap_err();
        assert_eq!(err, LcdError::Nack { address: 0x3F });
        assert!(err.is_transport());

        let lines = sink.release();
        // Data byte is skipped once the address goes unacknowledged
        assert_eq!(bytes_of(&lines.sampled), vec![0x3F << 1]);
        assert_eq!(lines.stops, 1);
    }

    #[test]
    fn default_clock_stays_within_standard_mode() {
        let sink = SoftI2cSink::new(SimulatedLines::idle()).unwrap();
        assert_eq!(sink.half_period, DEFAULT_HALF_PERIOD);
        // One clock cycle is two phases
        assert!(sink.half_period * 2 >= Duration::from_micros(10));
    }
}
