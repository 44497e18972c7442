//! Recording doubles for the bus and the delay source.

use crate::{Delay, I2cSink, LcdError, LcdResult};

/// Records every byte sent, optionally failing the write with the given index.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub writes: Vec<(u8, u8)>,
    pub fail_at: Option<usize>,
}

impl RecordingSink {
    pub fn failing_at(index: usize) -> Self {
        Self {
            writes: Vec::new(),
            fail_at: Some(index),
        }
    }

    /// Values written, without the address.
    pub fn values(&self) -> Vec<u8> {
        self.writes.iter().map(|&(_, value)| value).collect()
    }

    pub fn take(&mut self) -> Vec<u8> {
        let values = self.values();
        self.writes.clear();
        values
    }
}

impl I2cSink for RecordingSink {
    fn send(&mut self, address: u8, value: u8) -> LcdResult<()> {
        if self.fail_at == Some(self.writes.len()) {
            self.fail_at = None;
            return Err(LcdError::Bus("injected failure".to_string()));
        }
        self.writes.push((address, value));
        Ok(())
    }
}

/// Records every requested wait, in microseconds.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub waits: Vec<u32>,
}

impl RecordingDelay {
    /// Waits long enough to matter to the controller, leaving out the per-nibble strobe timing.
    pub fn long_waits(&self) -> Vec<u32> {
        self.waits.iter().copied().filter(|&us| us >= 100).collect()
    }
}

impl Delay for RecordingDelay {
    fn delay_us(&mut self, us: u32) {
        self.waits.push(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.waits.push(ms * 1000);
    }
}

/// The four expander writes carrying `byte` with register select `mode`, with `backlight` OR-ed in.
pub fn byte_writes(byte: u8, mode: u8, backlight: u8) -> Vec<u8> {
    let high = (byte & 0xF0) | mode | backlight;
    let low = ((byte << 4) & 0xF0) | mode | backlight;
    vec![high | 0b100, high, low | 0b100, low]
}
