//! HD44780 16×2 character LCD behind a PCF8574 I2C backpack.
//!
//! The backpack maps its eight port bits onto the LCD control lines and
//! the upper data nibble, so everything goes over the bus in 4-bit mode:
//!
//! ```text
//!  P7 P6 P5 P4 | P3  P2 P1 P0
//!  D7 D6 D5 D4 | BL  EN RW RS
//! ```
//!
//! Frames are written row by row and padded with spaces instead of
//! issuing a clear, which keeps the redraw flicker-free.  Initialisation
//! is lazy and is repeated after any bus error, so a panel that was
//! unplugged at boot comes back on its own.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::app::ports::DisplayPort;
use crate::display::{COLS, Frame, ROWS, Surface};
use crate::error::{DisplayError, Result};

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_LEFT: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

const ROW_OFFSETS: [u8; ROWS] = [0x00, 0x40];

pub struct CharLcd<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    ready: bool,
}

impl<I: I2c, D: DelayNs> CharLcd<I, D> {
    pub fn new(i2c: I, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            ready: false,
        }
    }

    fn expander(&mut self, byte: u8) -> Result<()> {
        self.i2c
            .write(self.address, &[byte | BACKLIGHT])
            .map_err(|_| DisplayError::NoAck.into())
    }

    /// Latch `byte` on the falling edge of EN.  Both edges go out in one
    /// bus write; the PCF8574 holds EN high for a whole byte time.
    fn pulse(&mut self, byte: u8) -> Result<()> {
        let high = byte | EN | BACKLIGHT;
        self.i2c
            .write(self.address, &[high, high & !EN])
            .map_err(|_| DisplayError::NoAck)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn nibble(&mut self, nibble: u8, flags: u8) -> Result<()> {
        self.pulse((nibble << 4) | flags)
    }

    fn send(&mut self, byte: u8, flags: u8) -> Result<()> {
        self.nibble(byte >> 4, flags)?;
        self.nibble(byte & 0x0F, flags)
    }

    fn command(&mut self, cmd: u8) -> Result<()> {
        self.send(cmd, 0)
    }

    /// Datasheet 4-bit power-on sequence.
    pub fn init(&mut self) -> Result<()> {
        self.ready = false;
        self.delay.delay_ms(50);
        self.reset_sequence().map_err(|_| DisplayError::InitFailed)?;
        self.ready = true;
        Ok(())
    }

    fn reset_sequence(&mut self) -> Result<()> {
        self.expander(0)?;
        self.nibble(0x03, 0)?;
        self.delay.delay_us(4_500);
        self.nibble(0x03, 0)?;
        self.delay.delay_us(4_500);
        self.nibble(0x03, 0)?;
        self.delay.delay_us(150);
        self.nibble(0x02, 0)?;

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        self.command(CMD_ENTRY_LEFT)
    }

    /// Write `text` at the start of `row`, padded with spaces to the full
    /// width.  Non-ASCII characters are shown as `?`.
    pub fn write_row(&mut self, row: usize, text: &str) -> Result<()> {
        let offset = ROW_OFFSETS.get(row).copied().unwrap_or(0);
        self.command(CMD_SET_DDRAM | offset)?;
        let mut written = 0;
        for c in text.chars().take(COLS) {
            let byte = if c.is_ascii() { c as u8 } else { b'?' };
            self.send(byte, RS)?;
            written += 1;
        }
        for _ in written..COLS {
            self.send(b' ', RS)?;
        }
        Ok(())
    }

    /// Draw a full frame, initialising the controller first if needed.
    pub fn show(&mut self, frame: &Frame) -> Result<()> {
        if !self.ready {
            self.init()?;
        }
        for row in 0..ROWS {
            if let Err(e) = self.write_row(row, frame.line(row)) {
                self.ready = false;
                return Err(e);
            }
        }
        Ok(())
    }
}

/// The two panels, addressed by [`Surface`].
pub struct DualDisplay<P, S> {
    pub primary: P,
    pub secondary: S,
}

impl<I1, D1, I2, D2> DisplayPort for DualDisplay<CharLcd<I1, D1>, CharLcd<I2, D2>>
where
    I1: I2c,
    D1: DelayNs,
    I2: I2c,
    D2: DelayNs,
{
    fn draw(&mut self, surface: Surface, frame: &Frame) -> Result<()> {
        match surface {
            Surface::Primary => self.primary.show(frame),
            Surface::Secondary => self.secondary.show(frame),
        }
    }
}
