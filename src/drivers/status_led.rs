//! Bicolor status indicator.
//!
//! Red while the feed hopper is running low, green otherwise.  The two
//! LED dies are driven from separate GPIOs; exactly one is lit at a time.

use embedded_hal::digital::OutputPin;

use crate::app::ports::IndicatorPort;
use crate::error::{ActuatorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    Red,
    Green,
}

/// Colour for the current feed level.
pub fn indicator_colour(feed_weight_g: f32, low_feed_g: f32) -> Colour {
    if feed_weight_g < low_feed_g {
        Colour::Red
    } else {
        Colour::Green
    }
}

pub struct BicolorLed<R, G> {
    red: R,
    green: G,
    current: Option<Colour>,
}

impl<R: OutputPin, G: OutputPin> BicolorLed<R, G> {
    pub fn new(red: R, green: G) -> Self {
        Self {
            red,
            green,
            current: None,
        }
    }
}

impl<R: OutputPin, G: OutputPin> IndicatorPort for BicolorLed<R, G> {
    fn set_indicator(&mut self, colour: Colour) -> Result<()> {
        if self.current == Some(colour) {
            return Ok(());
        }
        let (red, green) = match colour {
            Colour::Red => (self.red.set_high(), self.green.set_low()),
            Colour::Green => (self.red.set_low(), self.green.set_high()),
        };
        if red.is_err() || green.is_err() {
            self.current = None;
            return Err(ActuatorError::IndicatorWriteFailed.into());
        }
        self.current = Some(colour);
        Ok(())
    }
}
