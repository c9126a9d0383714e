//! SHT3x temperature / humidity sensor (I2C).
//!
//! Single-shot, high repeatability, no clock stretching: write `0x24 0x00`,
//! wait for the conversion, read six bytes (T msb, T lsb, crc, RH msb,
//! RH lsb, crc).  Each word carries a CRC-8 (poly 0x31, init 0xFF).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::app::ports::Climate;
use crate::error::{Result, SensorError};

const CMD_SINGLE_SHOT_HIGH: [u8; 2] = [0x24, 0x00];
const CONVERSION_MS: u32 = 16;

/// Sensirion CRC-8 over one 16-bit word.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x31
            } else {
                crc << 1
            };
        }
    }
    crc
}

pub struct Sht3x<I, D> {
    i2c: I,
    delay: D,
    address: u8,
}

impl<I: I2c, D: DelayNs> Sht3x<I, D> {
    pub fn new(i2c: I, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    pub fn measure(&mut self) -> Result<Climate> {
        self.i2c
            .write(self.address, &CMD_SINGLE_SHOT_HIGH)
            .map_err(|_| SensorError::BusFault)?;
        self.delay.delay_ms(CONVERSION_MS);

        let mut buf = [0u8; 6];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(|_| SensorError::BusFault)?;

        if crc8(&buf[0..2]) != buf[2] || crc8(&buf[3..5]) != buf[5] {
            return Err(SensorError::Checksum.into());
        }

        let t_raw = f32::from(u16::from_be_bytes([buf[0], buf[1]]));
        let rh_raw = f32::from(u16::from_be_bytes([buf[3], buf[4]]));
        Ok(Climate {
            temperature_c: -45.0 + 175.0 * t_raw / 65_535.0,
            humidity_pct: 100.0 * rh_raw / 65_535.0,
        })
    }
}
