//! HD44780 instruction set and the I2C nibble transport.

mod i2c;

use crate::lcd::hd44780::command::*;
use crate::lcd::hd44780::{ControlFlags, EntryModeFlags, FunctionFlags, ShiftFlags};
use crate::{LcdError, LcdResult};
pub use i2c::*;
use std::fmt::Debug;

/// Instruction-level interface to an HD44780 controller.
///
/// The high-level functions compose a command byte from typed flags and hand it to
/// [Self::send_command]. Implementations only need to provide the two raw writes.
pub trait HD44780Driver: Debug {
    /// Clears the display and sets the cursor to the home position.
    ///
    /// The controller needs up to 1.52 ms to finish; this function does not wait.
    fn clear_display(&mut self) -> LcdResult<()> {
        self.send_command(CLEAR_DISPLAY)
    }

    /// Sets the cursor to the home position and undoes any display shift.
    ///
    /// The controller needs up to 1.52 ms to finish; this function does not wait.
    fn return_home(&mut self) -> LcdResult<()> {
        self.send_command(RETURN_HOME)
    }

    fn set_entry_mode(&mut self, flags: EntryModeFlags) -> LcdResult<()> {
        self.send_command(ENTRY_MODE_SET | flags.bits())
    }

    fn set_display_control(&mut self, flags: ControlFlags) -> LcdResult<()> {
        self.send_command(DISPLAY_CONTROL | flags.bits())
    }

    /// Moves the cursor, or with [ShiftFlags::DISPLAY_MOVE] shifts the whole display.
    fn cursor_shift(&mut self, flags: ShiftFlags) -> LcdResult<()> {
        self.send_command(CURSOR_SHIFT | flags.bits())
    }

    fn function_set(&mut self, flags: FunctionFlags) -> LcdResult<()> {
        self.send_command(FUNCTION_SET | flags.bits())
    }

    /// Sets the CGRAM address. Data written afterwards goes to the glyph patterns.
    fn set_cgram_address(&mut self, address: u8) -> LcdResult<()> {
        if address > 0b00111111 {
            return Err(LcdError::InvalidAddress(address as u16));
        }
        self.send_command(SET_CGRAM_ADDRESS | address)
    }

    /// Sets the DDRAM address. Data written afterwards is displayed as characters.
    fn set_ddram_address(&mut self, address: u8) -> LcdResult<()> {
        if address > 0b01111111 {
            return Err(LcdError::InvalidAddress(address as u16));
        }
        self.send_command(SET_DDRAM_ADDRESS | address)
    }

    // Low-level commands, implemented by the transport.

    /// Sends an instruction. RS is low.
    fn send_command(&mut self, command: u8) -> LcdResult<()>;

    /// Sends a data byte (a character code or a CGRAM pattern row). RS is high.
    fn send_data(&mut self, data: u8) -> LcdResult<()>;
}
