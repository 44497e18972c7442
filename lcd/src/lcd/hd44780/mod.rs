//! HD44780 LCD behind a PCF8574-style I2C backpack.
//!
//! The backpack exposes one 8-bit port. Its upper four bits are wired to `D4..D7` of the
//! controller, the lower four to `RS`, `RW`, `E` and the backlight transistor:
//!
//! | bit | 7  | 6  | 5  | 4  | 3         | 2 | 1  | 0  |
//! |-----|----|----|----|----|-----------|---|----|----|
//! |     | D7 | D6 | D5 | D4 | backlight | E | RW | RS |
//!
//! Because of this, the controller is always driven in 4-bit mode, and every byte written to the
//! expander carries the backlight state along with it. See [driver::I2cHD44780Driver] for the
//! transport and [DisplaySession] for the character display API.

pub mod config;
pub mod driver;
mod display;
mod flags;
mod shared;

pub use config::*;
pub use display::*;
pub use flags::*;
pub use shared::*;

/// Instructions understood by the controller. The low bits are filled with the matching flags.
pub mod command {
    pub const CLEAR_DISPLAY: u8 = 0b00000001;
    pub const RETURN_HOME: u8 = 0b00000010;
    pub const ENTRY_MODE_SET: u8 = 0b00000100;
    pub const DISPLAY_CONTROL: u8 = 0b00001000;
    pub const CURSOR_SHIFT: u8 = 0b00010000;
    pub const FUNCTION_SET: u8 = 0b00100000;
    pub const SET_CGRAM_ADDRESS: u8 = 0b01000000;
    pub const SET_DDRAM_ADDRESS: u8 = 0b10000000;
}

/// Bits of the expander port below the data nibble.
pub mod pin {
    /// Backlight transistor.
    pub const BACKLIGHT: u8 = 0b00001000;
    /// Enable strobe. The controller latches the nibble on the falling edge.
    pub const ENABLE: u8 = 0b00000100;
    /// Read/write select. Always low, this driver never reads.
    pub const READ_WRITE: u8 = 0b00000010;
    /// Register select: low for instructions, high for data.
    pub const REGISTER_SELECT: u8 = 0b00000001;
}

/// DDRAM address of the first column of each row.
///
/// Rows 2 and 3 continue rows 0 and 1 in memory, which is why 4-line modules start them at 20 and
/// 84.
pub const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Number of user-definable glyphs in CGRAM.
pub const CGRAM_SLOTS: u8 = 8;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Moves the cursor to the left after writing data.
    Left,
    /// Moves the cursor to the right after writing data.
    Right,
}

/// Character cell height.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, serde::Deserialize)]
pub enum FontSize {
    #[default]
    #[serde(rename = "5x8")]
    Dots5x8,
    /// Only honoured on single-line displays; multi-line ones fall back to 5x8.
    #[serde(rename = "5x10")]
    Dots5x10,
}
