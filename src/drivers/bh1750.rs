//! BH1750 ambient light sensor (I2C).
//!
//! Run in continuous high-resolution mode: after power-on the chip
//! converts every ~120 ms on its own and a read just fetches the latest
//! result.  Lux = raw / 1.2.
//!
//! The data register reads zero until the first conversion has finished,
//! so for [`MEASUREMENT_MS`] after every (re)start a read reports
//! `NotReady` instead of a bogus 0 lux.

use embedded_hal::i2c::I2c;

use crate::app::ports::ClockPort;
use crate::error::{Result, SensorError};

const CMD_POWER_ON: u8 = 0x01;
const CMD_CONTINUOUS_HIGH_RES: u8 = 0x10;

/// Worst-case high-resolution conversion time (datasheet max).
pub const MEASUREMENT_MS: u32 = 180;

pub struct Bh1750<I, C> {
    i2c: I,
    address: u8,
    clock: C,
    /// When continuous mode was last armed; `None` until started.
    started_at: Option<u32>,
}

impl<I: I2c, C: ClockPort> Bh1750<I, C> {
    pub fn new(i2c: I, address: u8, clock: C) -> Self {
        Self {
            i2c,
            address,
            clock,
            started_at: None,
        }
    }

    /// Power up and start continuous conversions.
    pub fn start(&mut self) -> Result<()> {
        self.i2c
            .write(self.address, &[CMD_POWER_ON])
            .and_then(|()| self.i2c.write(self.address, &[CMD_CONTINUOUS_HIGH_RES]))
            .map_err(|_| SensorError::BusFault)?;
        self.started_at = Some(self.clock.now_ms());
        Ok(())
    }

    /// Latest conversion in lux.
    ///
    /// Starts the sensor if needed and restarts it after a bus fault.
    /// Either way the first conversion is not ready for `MEASUREMENT_MS`.
    pub fn read_lux(&mut self) -> Result<f32> {
        let Some(since) = self.started_at else {
            self.start()?;
            return Err(SensorError::NotReady.into());
        };
        if self.clock.now_ms().wrapping_sub(since) < MEASUREMENT_MS {
            return Err(SensorError::NotReady.into());
        }
        let mut buf = [0u8; 2];
        if self.i2c.read(self.address, &mut buf).is_err() {
            self.started_at = None;
            return Err(SensorError::BusFault.into());
        }
        Ok(f32::from(u16::from_be_bytes(buf)) / 1.2)
    }
}
