use crate::lcd::hd44780::{FontSize, FunctionFlags};
use crate::{LcdError, LcdResult};
use serde::Deserialize;

/// Geometry and bus address of a display.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// 7-bit I2C address of the expander. Most PCF8574 backpacks answer at `0x27` or `0x3F`.
    pub address: u8,
    pub columns: u8,
    pub rows: u8,
    pub font: FontSize,
}

impl DisplayConfig {
    pub fn new(address: u8, columns: u8, rows: u8) -> Self {
        Self {
            address,
            columns,
            rows,
            font: FontSize::default(),
        }
    }

    pub fn with_font(mut self, font: FontSize) -> Self {
        self.font = font;
        self
    }

    pub fn validate(&self) -> LcdResult<()> {
        if self.address > 0x7F {
            return Err(LcdError::InvalidConfig("address must fit in 7 bits"));
        }
        if !(1..=4).contains(&self.rows) {
            return Err(LcdError::InvalidConfig("rows must be between 1 and 4"));
        }
        if !(1..=40).contains(&self.columns) {
            return Err(LcdError::InvalidConfig("columns must be between 1 and 40"));
        }
        Ok(())
    }

    /// Function set flags for this geometry.
    ///
    /// The interface is always 4 bits wide. Two-line mode is used for anything taller than one
    /// row, and the 5x10 font is only available in one-line mode.
    pub fn function_flags(&self) -> FunctionFlags {
        let mut flags = FunctionFlags::empty();
        flags.assign(FunctionFlags::TWO_LINES, self.rows > 1);
        flags.assign(
            FunctionFlags::FONT_5X10,
            self.font == FontSize::Dots5x10 && self.rows == 1,
        );
        flags
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::new(0x27, 16, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tall_font_needs_a_single_line() {
        let one_line = DisplayConfig::new(0x27, 16, 1).with_font(FontSize::Dots5x10);
        assert_eq!(one_line.function_flags(), FunctionFlags::FONT_5X10);

        let two_lines = DisplayConfig::new(0x27, 16, 2).with_font(FontSize::Dots5x10);
        assert_eq!(two_lines.function_flags(), FunctionFlags::TWO_LINES);
    }

    #[test]
    fn validate_rejects_bad_geometry() {
        assert!(DisplayConfig::default().validate().is_ok());
        assert!(DisplayConfig::new(0x27, 20, 4).validate().is_ok());
        assert!(DisplayConfig::new(0x80, 16, 2).validate().is_err());
        assert!(DisplayConfig::new(0x27, 16, 0).validate().is_err());
        assert!(DisplayConfig::new(0x27, 16, 5).validate().is_err());
        assert!(DisplayConfig::new(0x27, 0, 2).validate().is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: DisplayConfig =
            serde_json::from_str(r#"{ "address": 63, "rows": 4, "columns": 20 }"#).unwrap();
        assert_eq!(config, DisplayConfig::new(0x3F, 20, 4));

        let config: DisplayConfig = serde_json::from_str(r#"{ "rows": 1, "font": "5x10" }"#).unwrap();
        assert_eq!(config.font, FontSize::Dots5x10);
        assert_eq!(config.address, 0x27);
    }
}
