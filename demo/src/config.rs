use dotenv::var;
use lcd_i2c::lcd::hd44780::{DisplayConfig, FontSize};
use serde::Deserialize;
use std::env::var_os;
use std::ffi::OsStr;
use std::path::Path;

/// Pins and display settings, read from the environment.
#[derive(Debug)]
pub struct Config {
    pub gpio_chip: String,
    pub sda_pin: u32,
    pub scl_pin: u32,
    pub display: DisplayConfig,
}

fn parse_u8(value: &str) -> eyre::Result<u8> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16)?,
        None => value.parse()?,
    };
    Ok(parsed)
}

fn parse_font(value: &str) -> eyre::Result<FontSize> {
    match value.trim() {
        "5x8" => Ok(FontSize::Dots5x8),
        "5x10" => Ok(FontSize::Dots5x10),
        other => Err(eyre::eyre!("Unknown font size {:?}, expected 5x8 or 5x10", other)),
    }
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let defaults = DisplayConfig::default();

        let gpio_chip = var("LCD_GPIO_CHIP").unwrap_or_else(|_| "/dev/gpiochip0".to_string());
        let sda_pin: u32 = var("LCD_PIN_SDA")?.parse()?;
        let scl_pin: u32 = var("LCD_PIN_SCL")?.parse()?;

        let address = match var("LCD_I2C_ADDRESS") {
            Ok(value) => parse_u8(&value)?,
            Err(_) => defaults.address,
        };
        let columns = match var("LCD_COLUMNS") {
            Ok(value) => parse_u8(&value)?,
            Err(_) => defaults.columns,
        };
        let rows = match var("LCD_ROWS") {
            Ok(value) => parse_u8(&value)?,
            Err(_) => defaults.rows,
        };
        let font = match var("LCD_FONT") {
            Ok(value) => parse_font(&value)?,
            Err(_) => defaults.font,
        };

        let display = DisplayConfig::new(address, columns, rows).with_font(font);
        display.validate()?;

        Ok(Config {
            gpio_chip,
            sda_pin,
            scl_pin,
            display,
        })
    }
}

/// Custom glyphs to upload into CGRAM, in slot order.
#[derive(Deserialize, Debug, Default)]
pub struct Glyphs {
    pub glyphs: Vec<[u8; 8]>,
}

impl Glyphs {
    pub fn try_load() -> Option<Self> {
        let glyphs_str = var_os("LCD_GLYPHS_FILE");
        let glyphs_str: &OsStr = glyphs_str.as_deref().unwrap_or(OsStr::new("glyphs.json"));
        let glyphs_path = Path::new(glyphs_str);
        if glyphs_path.exists() {
            let file = std::fs::File::open(glyphs_path).ok()?;
            let reader = std::io::BufReader::new(file);
            serde_json::from_reader(reader).ok()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_decimal_bytes() {
        assert_eq!(parse_u8("0x27").unwrap(), 0x27);
        assert_eq!(parse_u8("0X3f").unwrap(), 0x3F);
        assert_eq!(parse_u8(" 20 ").unwrap(), 20);
        assert!(parse_u8("0x100").is_err());
        assert!(parse_u8("two").is_err());
    }

    #[test]
    fn parses_font_names() {
        assert_eq!(parse_font("5x10").unwrap(), FontSize::Dots5x10);
        assert!(parse_font("8x8").is_err());
    }

    #[test]
    fn glyph_file_format() {
        let glyphs: Glyphs =
            serde_json::from_str(r#"{ "glyphs": [[0, 10, 31, 31, 14, 4, 0, 0]] }"#).unwrap();
        assert_eq!(glyphs.glyphs, vec![[0, 10, 31, 31, 14, 4, 0, 0]]);
    }
}
