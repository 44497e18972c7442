mod config;

use crate::config::{Config, Glyphs};
use dotenv::dotenv;
use lcd_i2c::i2c::{GpiodI2cLines, SoftI2cSink};
use lcd_i2c::lcd::hd44780::DisplaySession;
use lcd_i2c::{Delay, I2cSink, LcdResult, StdDelay};
use log::{debug, info, warn};
use std::thread;
use std::time::{Duration, Instant};

/// Redraws the uptime line.
fn draw_uptime<S: I2cSink, D: Delay>(
    lcd: &mut DisplaySession<S, D>,
    started: Instant,
) -> LcdResult<()> {
    let row = lcd.rows() - 1;
    lcd.set_cursor(row, 0)?;
    let secs = started.elapsed().as_secs();
    lcd.print_str(&format!("Up {:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60))
}

fn main() -> eyre::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    info!("LCD demo starting...");

    let config = Config::from_env()?;
    info!(
        "LCD @ {:#04x} on {} (SDA: {}, SCL: {}), {}x{}",
        config.display.address,
        config.gpio_chip,
        config.sda_pin,
        config.scl_pin,
        config.display.columns,
        config.display.rows,
    );

    debug!("Opening GPIO chip...");
    let chip = gpiod::Chip::new(&config.gpio_chip)?;
    let lines = GpiodI2cLines::new(&chip, config.sda_pin, config.scl_pin)?;
    let sink = SoftI2cSink::new(lines)?;
    debug!("{:?} ready.", sink);

    debug!("Initializing LCD...");
    let mut lcd = DisplaySession::init(sink, StdDelay, config.display)?;
    lcd.turn_on_backlight()?;

    let glyphs = Glyphs::try_load().unwrap_or_default();
    for (slot, pattern) in glyphs.glyphs.iter().enumerate().take(8) {
        lcd.create_char(slot as u8, pattern)?;
    }
    if !glyphs.glyphs.is_empty() {
        info!("Uploaded {} custom glyphs.", glyphs.glyphs.len().min(8));
    }

    lcd.clear()?;
    lcd.print_str(concat!("v.", env!("CARGO_PKG_VERSION")))?;
    if !glyphs.glyphs.is_empty() {
        lcd.print(b" ")?;
        // Slot 0 is character code 0, which print would treat as the end of the text
        lcd.write_code(0)?;
    }
    debug!("{:?} initialized.", lcd);

    info!("Starting main loop...");
    let started = Instant::now();
    loop {
        if let Err(err) = draw_uptime(&mut lcd, started) {
            if !err.is_transport() {
                return Err(err.into());
            }
            warn!("Bus error ({}), re-initializing display...", err);
            lcd.reinit()?;
            lcd.turn_on_backlight()?;
        }

        thread::sleep(Duration::from_secs(1));
    }
}
