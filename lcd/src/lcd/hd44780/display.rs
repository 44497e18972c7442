use crate::lcd::hd44780::command::{CLEAR_DISPLAY, RETURN_HOME};
use crate::lcd::hd44780::driver::{HD44780Driver, I2cHD44780Driver};
use crate::lcd::hd44780::{
    Backlight, CGRAM_SLOTS, ControlFlags, CursorDirection, DisplayConfig, EntryModeFlags,
    FunctionFlags, ROW_OFFSETS, ShiftFlags,
};
use crate::{Delay, I2cSink, LcdError, LcdResult};
use log::{debug, info, warn};
use std::fmt::{Debug, Formatter};

/// Wait after power-up before talking to the controller. The datasheet asks for 40 ms above 2.7 V.
pub const POWER_ON_DELAY_MS: u32 = 100;
/// Wait after resetting the expander port.
pub const EXPANDER_RESET_DELAY_MS: u32 = 1000;
/// Wait after each of the first two 8-bit function sets. The datasheet asks for 4.1 ms.
pub const INTERFACE_RESET_DELAY_US: u32 = 4500;
/// Wait after the third 8-bit function set.
pub const INTERFACE_SETTLE_DELAY_US: u32 = 150;
/// Execution time of clear display and return home.
pub const HOME_DELAY_US: u32 = 2000;

/// Function set with the 8-bit interface bit, as a nibble: the first step of the reset idiom.
const RESET_NIBBLE: u8 = 0x03 << 4;
/// Function set selecting the 4-bit interface, as a nibble.
const FOUR_BIT_NIBBLE: u8 = 0x02 << 4;

/// A character display and the state last commanded to it.
///
/// The controller is never read back. Instead, the session caches every flag group it has sent,
/// and each mutator sends its command right away, so the cache always matches what the
/// controller holds. Cached state only changes once the command has gone out completely; if the
/// bus fails halfway, the cache keeps the previous value and the caller should [Self::reinit].
///
/// This type is not meant to be shared between threads as-is. See [super::SharedDisplay].
pub struct DisplaySession<S: I2cSink, D: Delay> {
    driver: I2cHD44780Driver<S, D>,
    columns: u8,
    rows: u8,
    function: FunctionFlags,
    control: ControlFlags,
    entry_mode: EntryModeFlags,
    cursor: (u8, u8),
}

impl<S: I2cSink, D: Delay> DisplaySession<S, D> {
    /// Initializes the display and returns the session.
    ///
    /// Takes a bit over 1.1 s, nearly all of it spent waiting for power and the expander to
    /// settle. Afterwards the display is on and cleared, the cursor is hidden at (0, 0), text runs
    /// left to right and the backlight is off.
    pub fn init(sink: S, delay: D, config: DisplayConfig) -> LcdResult<Self> {
        config.validate()?;

        let mut session = Self {
            driver: I2cHD44780Driver::new(sink, delay, config.address),
            columns: config.columns,
            rows: config.rows,
            function: config.function_flags(),
            control: ControlFlags::empty(),
            entry_mode: EntryModeFlags::empty(),
            cursor: (0, 0),
        };
        session.run_init_sequence()?;
        Ok(session)
    }

    /// Runs the whole initialization sequence again.
    ///
    /// This is the only way to recover from a bus failure, since the controller might have been
    /// left holding half of a byte. All cached state goes back to the defaults of [Self::init].
    ///
    /// If the sequence itself fails, the cached flags and cursor keep their previous values. The
    /// backlight state follows what was last written to the expander.
    pub fn reinit(&mut self) -> LcdResult<()> {
        let saved = (self.control, self.entry_mode, self.cursor);
        let result = self.run_init_sequence();
        if result.is_err() {
            (self.control, self.entry_mode, self.cursor) = saved;
        }
        result
    }

    fn run_init_sequence(&mut self) -> LcdResult<()> {
        self.control = ControlFlags::empty();
        self.entry_mode = EntryModeFlags::empty();
        self.cursor = (0, 0);

        debug!("Waiting for the controller to power up...");
        self.driver.delay_ms(POWER_ON_DELAY_MS);

        debug!("Resetting expander...");
        self.driver.set_backlight(Backlight::Off)?;
        self.driver.delay_ms(EXPANDER_RESET_DELAY_MS);

        // Synchronize. The controller may come up in either interface width, so it is put into
        // 8-bit mode three times before switching to 4 bits. The first write has no strobe.
        debug!("Selecting 4-bit interface...");
        self.driver.transmit(RESET_NIBBLE)?;
        self.driver.delay_us(INTERFACE_RESET_DELAY_US);
        self.driver.write_nibble(RESET_NIBBLE)?;
        self.driver.delay_us(INTERFACE_RESET_DELAY_US);
        self.driver.write_nibble(RESET_NIBBLE)?;
        self.driver.delay_us(INTERFACE_SETTLE_DELAY_US);
        self.driver.write_nibble(FOUR_BIT_NIBBLE)?;

        self.driver.function_set(self.function)?;
        self.turn_on_display()?;
        self.clear()?;
        self.set_entry_mode(EntryModeFlags::LEFT_TO_RIGHT)?;
        self.return_home()?;

        info!(
            "{}x{} display at {:#04x} initialized ({:?}).",
            self.columns,
            self.rows,
            self.driver.address(),
            self.function
        );
        Ok(())
    }

    /// Clears the display and moves the cursor to (0, 0).
    ///
    /// The controller resets its address counter as part of the clear, so the cursor is reported
    /// at (0, 0) even if the address write that follows fails.
    pub fn clear(&mut self) -> LcdResult<()> {
        self.driver.send_command(CLEAR_DISPLAY)?;
        self.cursor = (0, 0);
        self.driver.delay_us(HOME_DELAY_US);
        self.set_cursor(0, 0)
    }

    /// Moves the cursor to (0, 0) and undoes any display shift, keeping the contents.
    pub fn return_home(&mut self) -> LcdResult<()> {
        self.driver.send_command(RETURN_HOME)?;
        self.driver.delay_us(HOME_DELAY_US);
        self.cursor = (0, 0);
        Ok(())
    }

    /// Moves the cursor to `column` of `row`.
    ///
    /// # Errors
    /// - [LcdError::InvalidRow] if `row` is past the last row of the display.
    /// - [LcdError::InvalidAddress] if the position lies outside the DDRAM.
    ///
    /// Columns past the visible width are allowed, they address the off-screen part of the row.
    pub fn set_cursor(&mut self, row: u8, column: u8) -> LcdResult<()> {
        let offset = ROW_OFFSETS
            .get(row as usize)
            .filter(|_| row < self.rows)
            .copied()
            .ok_or(LcdError::InvalidRow {
                row,
                rows: self.rows,
            })?;

        let address = offset as u16 + column as u16;
        if address > 0x7F {
            return Err(LcdError::InvalidAddress(address));
        }

        self.driver.set_ddram_address(address as u8)?;
        self.cursor = (row, column);
        Ok(())
    }

    pub fn turn_on_display(&mut self) -> LcdResult<()> {
        self.update_control(ControlFlags::DISPLAY_ON, true)
    }

    /// Blanks the display. DDRAM contents are kept.
    pub fn turn_off_display(&mut self) -> LcdResult<()> {
        self.update_control(ControlFlags::DISPLAY_ON, false)
    }

    pub fn turn_on_cursor(&mut self) -> LcdResult<()> {
        self.update_control(ControlFlags::CURSOR_ON, true)
    }

    pub fn turn_off_cursor(&mut self) -> LcdResult<()> {
        self.update_control(ControlFlags::CURSOR_ON, false)
    }

    pub fn turn_on_blink(&mut self) -> LcdResult<()> {
        self.update_control(ControlFlags::BLINK_ON, true)
    }

    pub fn turn_off_blink(&mut self) -> LcdResult<()> {
        self.update_control(ControlFlags::BLINK_ON, false)
    }

    fn update_control(&mut self, flag: ControlFlags, on: bool) -> LcdResult<()> {
        let control = self.control.with(flag, on);
        self.driver.set_display_control(control)?;
        self.control = control;
        Ok(())
    }

    /// Shifts the whole display one column to the left.
    pub fn scroll_display_left(&mut self) -> LcdResult<()> {
        self.driver.cursor_shift(ShiftFlags::DISPLAY_MOVE)
    }

    /// Shifts the whole display one column to the right.
    pub fn scroll_display_right(&mut self) -> LcdResult<()> {
        self.driver.cursor_shift(ShiftFlags::DISPLAY_MOVE | ShiftFlags::MOVE_RIGHT)
    }

    /// Moves the cursor one position without writing anything.
    pub fn move_cursor(&mut self, direction: CursorDirection) -> LcdResult<()> {
        let (row, column) = self.cursor;
        match direction {
            CursorDirection::Left => {
                self.driver.cursor_shift(ShiftFlags::empty())?;
                self.cursor = (row, column.wrapping_sub(1));
            }
            CursorDirection::Right => {
                self.driver.cursor_shift(ShiftFlags::MOVE_RIGHT)?;
                self.cursor = (row, column.wrapping_add(1));
            }
        }
        Ok(())
    }

    /// Text flows from left to right.
    pub fn left_to_right(&mut self) -> LcdResult<()> {
        self.set_entry_mode(self.entry_mode.with(EntryModeFlags::LEFT_TO_RIGHT, true))
    }

    /// Text flows from right to left.
    pub fn right_to_left(&mut self) -> LcdResult<()> {
        self.set_entry_mode(self.entry_mode.with(EntryModeFlags::LEFT_TO_RIGHT, false))
    }

    /// Shift the display with every character written, so text appears to scroll past the cursor.
    pub fn turn_on_autoscroll(&mut self) -> LcdResult<()> {
        self.set_entry_mode(self.entry_mode.with(EntryModeFlags::AUTOSCROLL, true))
    }

    pub fn turn_off_autoscroll(&mut self) -> LcdResult<()> {
        self.set_entry_mode(self.entry_mode.with(EntryModeFlags::AUTOSCROLL, false))
    }

    fn set_entry_mode(&mut self, entry_mode: EntryModeFlags) -> LcdResult<()> {
        self.driver.set_entry_mode(entry_mode)?;
        self.entry_mode = entry_mode;
        Ok(())
    }

    pub fn turn_on_backlight(&mut self) -> LcdResult<()> {
        self.driver.set_backlight(Backlight::On)
    }

    pub fn turn_off_backlight(&mut self) -> LcdResult<()> {
        self.driver.set_backlight(Backlight::Off)
    }

    /// Uploads an 8-row glyph into CGRAM `slot`. Only the lower 5 bits of each row are used.
    ///
    /// The glyph is then printed with character code `slot`. The controller is left addressing
    /// CGRAM, so call [Self::set_cursor], [Self::clear] or [Self::return_home] before printing.
    ///
    /// # Errors
    /// - [LcdError::InvalidSlot] if `slot` is not in `0..8`. Nothing is sent in that case.
    pub fn create_char(&mut self, slot: u8, pattern: &[u8; 8]) -> LcdResult<()> {
        if slot >= CGRAM_SLOTS {
            return Err(LcdError::InvalidSlot(slot));
        }

        self.driver.set_cgram_address(slot << 3)?;
        for &row in pattern {
            self.driver.send_data(row)?;
        }
        Ok(())
    }

    /// Writes character codes at the cursor, up to the first `0` byte or the end of `text`.
    ///
    /// Nothing is wrapped or clipped: the controller's own address counter decides where text
    /// past the end of a row lands.
    pub fn print(&mut self, text: &[u8]) -> LcdResult<()> {
        for &code in text.iter().take_while(|&&code| code != 0) {
            self.write_code(code)?;
        }
        Ok(())
    }

    /// Writes a string at the cursor. Non-ASCII characters are shown as `?`.
    pub fn print_str(&mut self, text: &str) -> LcdResult<()> {
        for c in text.chars().take_while(|&c| c != '\0') {
            if c.is_ascii() {
                self.write_code(c as u8)?;
            } else {
                warn!("Non-ASCII character: {}", c);
                self.write_code(b'?')?;
            }
        }
        Ok(())
    }

    /// Writes a single character code at the cursor.
    ///
    /// Unlike [Self::print], this also accepts code `0`, the glyph in CGRAM slot 0.
    pub fn write_code(&mut self, code: u8) -> LcdResult<()> {
        self.driver.send_data(code)?;
        let (row, column) = self.cursor;
        self.cursor = if self.entry_mode.contains(EntryModeFlags::LEFT_TO_RIGHT) {
            (row, column.wrapping_add(1))
        } else {
            (row, column.wrapping_sub(1))
        };
        Ok(())
    }

    pub fn address(&self) -> u8 {
        self.driver.address()
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Last known cursor position as `(row, column)`.
    ///
    /// Follows [Self::set_cursor], [Self::print] and the cursor moves. Autoscroll is not
    /// accounted for.
    pub fn cursor(&self) -> (u8, u8) {
        self.cursor
    }

    pub fn backlight(&self) -> Backlight {
        self.driver.backlight()
    }

    pub fn function_flags(&self) -> FunctionFlags {
        self.function
    }

    pub fn control_flags(&self) -> ControlFlags {
        self.control
    }

    pub fn entry_mode_flags(&self) -> EntryModeFlags {
        self.entry_mode
    }

    pub fn driver(&self) -> &I2cHD44780Driver<S, D> {
        &self.driver
    }

    /// Raw access to the transport. Commands sent through it bypass the cached state.
    pub fn driver_mut(&mut self) -> &mut I2cHD44780Driver<S, D> {
        &mut self.driver
    }

    pub fn release(self) -> (S, D) {
        self.driver.release()
    }
}

impl<S: I2cSink, D: Delay> Debug for DisplaySession<S, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplaySession")
            .field("driver", &self.driver)
            .field("geometry", &(self.columns, self.rows))
            .field("control", &self.control)
            .field("entry_mode", &self.entry_mode)
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl<S: I2cSink, D: Delay> std::fmt::Write for DisplaySession<S, D> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.print_str(s).map_err(|_| std::fmt::Error)
    }
}
