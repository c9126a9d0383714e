//! Relay driver lines.
//!
//! Two opto-isolated relay channels on plain GPIOs, active HIGH.  Both are
//! driven LOW at construction so nothing is energised before the first
//! automation pass.

use embedded_hal::digital::OutputPin;

use crate::app::ports::RelayPort;
use crate::error::{ActuatorError, Result};
use crate::state::RelayId;

pub struct RelayOutputs<E, C> {
    exhaust: E,
    curtain: C,
}

impl<E: OutputPin, C: OutputPin> RelayOutputs<E, C> {
    pub fn new(mut exhaust: E, mut curtain: C) -> Result<Self> {
        exhaust
            .set_low()
            .map_err(|_| ActuatorError::RelayWriteFailed)?;
        curtain
            .set_low()
            .map_err(|_| ActuatorError::RelayWriteFailed)?;
        Ok(Self { exhaust, curtain })
    }
}

fn drive(pin: &mut impl OutputPin, on: bool) -> Result<()> {
    let res = if on { pin.set_high() } else { pin.set_low() };
    res.map_err(|_| ActuatorError::RelayWriteFailed.into())
}

impl<E: OutputPin, C: OutputPin> RelayPort for RelayOutputs<E, C> {
    fn set_relay(&mut self, relay: RelayId, on: bool) -> Result<()> {
        match relay {
            RelayId::Exhaust => drive(&mut self.exhaust, on),
            RelayId::Curtain => drive(&mut self.curtain, on),
        }
    }
}
