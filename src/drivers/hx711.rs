//! HX711 24-bit load-cell amplifier, bit-banged over `embedded-hal` pins.
//!
//! Both load cells hang off one HX711: the feed hopper on channel A
//! (gain 128) and the bird platform on channel B (gain 32).  The gain /
//! channel for the *next* conversion is selected by the number of extra
//! clock pulses after the 24 data bits, so switching channels costs one
//! conversion whose value belongs to the old channel and is discarded.
//!
//! ```text
//!  DOUT ‾‾‾‾\____ (LOW = conversion ready)
//!  SCK  _____/‾\_/‾\_ … 24 data bits … /‾\ (+1..3 gain pulses)
//! ```
//!
//! Nothing here waits for DOUT to fall: if no conversion is ready the read
//! returns `ScaleSample::Pending` and the main loop retries next cycle.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::ScalePort;
use crate::error::{Result, SensorError};
use crate::sensors::weight::{ScaleSample, WeightChannel};

/// Channel/gain selection, encoded as the number of trailing SCK pulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gain {
    ChannelA128 = 1,
    ChannelB32 = 2,
    ChannelA64 = 3,
}

impl Gain {
    pub fn for_channel(channel: WeightChannel) -> Self {
        match channel {
            WeightChannel::Feed => Self::ChannelA128,
            WeightChannel::Flock => Self::ChannelB32,
        }
    }
}

/// HX711 driver.
pub struct Hx711<DOUT, SCK, D> {
    dout: DOUT,
    sck: SCK,
    delay: D,
    /// Gain the chip will use for the conversion currently in progress.
    armed: Gain,
}

impl<DOUT, SCK, D> Hx711<DOUT, SCK, D>
where
    DOUT: InputPin,
    SCK: OutputPin,
    D: DelayNs,
{
    /// Takes the pins and powers the chip up (SCK low).  The chip defaults
    /// to channel A, gain 128 after power-up.
    pub fn new(dout: DOUT, mut sck: SCK, delay: D) -> Result<Self> {
        sck.set_low().map_err(|_| SensorError::BusFault)?;
        Ok(Self {
            dout,
            sck,
            delay,
            armed: Gain::ChannelA128,
        })
    }

    /// DOUT low means a conversion is waiting to be clocked out.
    pub fn is_ready(&mut self) -> Result<bool> {
        self.dout.is_low().map_err(|_| SensorError::BusFault.into())
    }

    /// Clock out one conversion and arm `next` for the following one.
    /// Returns `Ok(None)` if nothing is ready.
    pub fn read_with(&mut self, next: Gain) -> Result<Option<i32>> {
        if !self.is_ready()? {
            return Ok(None);
        }

        let mut value: u32 = 0;
        for _ in 0..24 {
            self.pulse()?;
            let bit = self.dout.is_high().map_err(|_| SensorError::BusFault)?;
            value = (value << 1) | u32::from(bit);
        }
        for _ in 0..(next as u8) {
            self.pulse()?;
        }
        self.armed = next;

        Ok(Some(sign_extend_24(value)))
    }

    fn pulse(&mut self) -> Result<()> {
        self.sck.set_high().map_err(|_| SensorError::BusFault)?;
        self.delay.delay_us(1);
        self.sck.set_low().map_err(|_| SensorError::BusFault)?;
        self.delay.delay_us(1);
        Ok(())
    }
}

impl<DOUT, SCK, D> ScalePort for Hx711<DOUT, SCK, D>
where
    DOUT: InputPin,
    SCK: OutputPin,
    D: DelayNs,
{
    fn read_raw(&mut self, channel: WeightChannel) -> Result<ScaleSample> {
        let wanted = Gain::for_channel(channel);
        let same_channel = self.armed == wanted;
        Ok(match self.read_with(wanted)? {
            None => ScaleSample::Pending,
            Some(raw) if same_channel => ScaleSample::Ready(raw),
            // The conversion was from the other channel: clocking it out
            // armed the new gain, the value itself is thrown away.
            Some(_) => ScaleSample::Discarded,
        })
    }
}

/// Two's-complement 24-bit → i32.
fn sign_extend_24(raw: u32) -> i32 {
    ((raw << 8) as i32) >> 8
}
