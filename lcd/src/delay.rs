//! Blocking delays used between bus writes.

use std::fmt::Debug;
use std::thread::sleep;
use std::time::Duration;

/// A blocking delay source.
///
/// Every wait the driver requests is a lower bound. Implementations may sleep longer, never shorter.
pub trait Delay: Debug {
    /// Blocks for at least `us` microseconds.
    fn delay_us(&mut self, us: u32);

    /// Blocks for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1000);
        }
    }
}

/// Delay backed by [std::thread::sleep].
#[derive(Debug, Default, Copy, Clone)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay_us(&mut self, us: u32) {
        sleep(Duration::from_micros(us as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        sleep(Duration::from_millis(ms as u64));
    }
}

impl<D: Delay + ?Sized> Delay for &mut D {
    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

/// Adapter for any [embedded_hal::delay::DelayNs] implementation.
#[cfg(feature = "embedded-hal")]
pub struct HalDelay<D>(pub D);

#[cfg(feature = "embedded-hal")]
impl<D> Debug for HalDelay<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HalDelay")
    }
}

#[cfg(feature = "embedded-hal")]
impl<D: embedded_hal::delay::DelayNs> Delay for HalDelay<D> {
    fn delay_us(&mut self, us: u32) {
        self.0.delay_us(us)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.delay_ms(ms)
    }
}

#[cfg(all(test, feature = "embedded-hal"))]
mod tests {
    use super::*;
    use embedded_hal::delay::DelayNs;

    #[derive(Default)]
    struct FakeTimer {
        total_ns: u64,
    }

    impl DelayNs for FakeTimer {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }

    #[test]
    fn hal_delay_forwards_units() {
        let mut delay = HalDelay(FakeTimer::default());
        delay.delay_us(50);
        assert_eq!(delay.0.total_ns, 50_000);

        delay.delay_ms(100);
        assert_eq!(delay.0.total_ns, 100_050_000);
    }

    #[test]
    fn driver_waits_go_through_the_hal_timer() {
        use crate::lcd::hd44780::driver::I2cHD44780Driver;
        use crate::testing::RecordingSink;

        let mut driver =
            I2cHD44780Driver::new(RecordingSink::default(), HalDelay(FakeTimer::default()), 0x27);
        driver.write_nibble(0x30).unwrap();

        // Enable pulse plus settle time
        assert_eq!(driver.delay().0.total_ns, 52_000);
    }
}
