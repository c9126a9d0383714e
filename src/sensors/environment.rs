//! Environmental sensor bundle: gas and sound on ADC, light and climate
//! on I2C, presented as one [`EnvironmentPort`].

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::app::ports::{Climate, ClockPort, EnvironmentPort};
use crate::drivers::bh1750::Bh1750;
use crate::drivers::sht3x::Sht3x;
use crate::error::{Result, SensorError};

/// Full scale of the 12-bit ADC.
pub const ADC_MAX: u16 = 4_095;

/// One raw ADC channel.
pub trait AnalogInput {
    fn read_raw(&mut self) -> Result<u16>;
}

impl<F: FnMut() -> Result<u16>> AnalogInput for F {
    fn read_raw(&mut self) -> Result<u16> {
        self()
    }
}

fn checked_adc(input: &mut impl AnalogInput) -> Result<u16> {
    let raw = input.read_raw()?;
    if raw > ADC_MAX {
        return Err(SensorError::OutOfRange.into());
    }
    Ok(raw)
}

pub struct EnvironmentSensors<G, S, IL, C, IC, D> {
    gas: G,
    sound: S,
    light: Bh1750<IL, C>,
    climate: Sht3x<IC, D>,
}

impl<G, S, IL, C, IC, D> EnvironmentSensors<G, S, IL, C, IC, D>
where
    G: AnalogInput,
    S: AnalogInput,
    IL: I2c,
    C: ClockPort,
    IC: I2c,
    D: DelayNs,
{
    pub fn new(gas: G, sound: S, light: Bh1750<IL, C>, climate: Sht3x<IC, D>) -> Self {
        Self {
            gas,
            sound,
            light,
            climate,
        }
    }
}

impl<G, S, IL, C, IC, D> EnvironmentPort for EnvironmentSensors<G, S, IL, C, IC, D>
where
    G: AnalogInput,
    S: AnalogInput,
    IL: I2c,
    C: ClockPort,
    IC: I2c,
    D: DelayNs,
{
    fn gas_raw(&mut self) -> Result<u16> {
        checked_adc(&mut self.gas)
    }

    fn lux(&mut self) -> Result<f32> {
        self.light.read_lux()
    }

    fn sound_raw(&mut self) -> Result<u16> {
        checked_adc(&mut self.sound)
    }

    fn climate(&mut self) -> Result<Climate> {
        self.climate.measure()
    }
}
