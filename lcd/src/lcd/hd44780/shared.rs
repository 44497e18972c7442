use crate::lcd::hd44780::DisplaySession;
use crate::{Delay, I2cSink, LcdError, LcdResult};
use std::sync::{Arc, Mutex};

/// A [DisplaySession] that can be used from several threads.
///
/// The lock is held for a whole operation, never for a single nibble. A thread switch between the
/// two nibbles of a byte would leave the controller mid-byte.
#[derive(Debug)]
pub struct SharedDisplay<S: I2cSink, D: Delay> {
    session: Arc<Mutex<DisplaySession<S, D>>>,
}

impl<S: I2cSink, D: Delay> SharedDisplay<S, D> {
    pub fn new(session: DisplaySession<S, D>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Runs `f` with exclusive access to the session.
    ///
    /// # Errors
    /// - [LcdError::Poisoned] if another thread panicked while holding the session. The display
    ///   state is unknown at that point.
    /// - Whatever `f` returns.
    pub fn with<R>(
        &self,
        f: impl FnOnce(&mut DisplaySession<S, D>) -> LcdResult<R>,
    ) -> LcdResult<R> {
        let mut session = self.session.lock().map_err(|_| LcdError::Poisoned)?;
        f(&mut session)
    }
}

impl<S: I2cSink, D: Delay> Clone for SharedDisplay<S, D> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lcd::hd44780::DisplayConfig;
    use crate::testing::{RecordingDelay, RecordingSink};
    use std::thread;

    fn shared() -> SharedDisplay<RecordingSink, RecordingDelay> {
        let session = DisplaySession::init(
            RecordingSink::default(),
            RecordingDelay::default(),
            DisplayConfig::new(0x27, 20, 4),
        )
        .unwrap();
        SharedDisplay::new(session)
    }

    #[test]
    fn whole_operations_never_interleave() {
        let display = shared();
        display
            .with(|session| {
                session.driver_mut().sink_mut().writes.clear();
                Ok(())
            })
            .unwrap();

        let handles: Vec<_> = [b"aaaaaaaaaa", b"bbbbbbbbbb"]
            .into_iter()
            .map(|text| {
                let display = display.clone();
                thread::spawn(move || display.with(|session| session.print(text)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let values = display.with(|session| Ok(session.driver().sink().values())).unwrap();
        let text: Vec<u8> = values
            .chunks_exact(4)
            .map(|writes| (writes[1] & 0xF0) | (writes[3] >> 4))
            .collect();
        assert_eq!(text.len(), 20);
        assert!(text[..10].iter().all(|&c| c == text[0]));
        assert!(text[10..].iter().all(|&c| c == text[10]));
        assert_ne!(text[0], text[10]);
        assert_eq!(display.with(|session| Ok(session.cursor())).unwrap(), (0, 20));
    }

    #[test]
    fn panic_while_locked_poisons_the_display() {
        let display = shared();
        let other = display.clone();
        let result = thread::spawn(move || {
            other.with(|_| -> LcdResult<()> { panic!("writer crashed") })
        })
        .join();
        assert!(result.is_err());

        assert_eq!(display.with(|_| Ok(())), Err(LcdError::Poisoned));
    }
}
