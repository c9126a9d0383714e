//! System configuration parameters
//!
//! All tunable parameters for the CoopWatch controller.  Values are
//! compile-time defaults; there is no persistence layer.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Minimum stable time before a button level change is accepted (ms)
    pub debounce_ms: u32,
    /// Fixed yield at the end of every main-loop iteration (ms)
    pub loop_delay_ms: u32,
    /// Display redraw interval when nothing else requests a refresh (ms)
    pub display_refresh_ms: u32,
    /// Flow pulse sampling window (ms)
    pub flow_window_ms: u32,
    /// Flock (bird) scale cadence outside the weighing screen (ms)
    pub flock_sample_ms: u32,
    /// Temperature / humidity cadence (ms)
    pub climate_sample_ms: u32,
    /// Delay between amplifier polls while taring at startup (ms)
    pub tare_poll_ms: u32,
    /// Unready time before the startup tare reports a stalled amplifier (ms)
    pub tare_stall_ms: u32,

    // --- Calibration ---
    /// Flow sensor pulses per litre (pulses/s ÷ this = L/min)
    pub pulses_per_litre: f32,
    /// Feed scale raw counts per gram (channel A)
    pub scale_factor_feed: f32,
    /// Flock scale raw counts per gram (channel B)
    pub scale_factor_flock: f32,
    /// Ready reads averaged per channel during a tare
    pub tare_samples: u32,
    /// Amplifier polls allowed for a runtime tare before giving up
    pub tare_poll_budget: u32,

    // --- Weighing ---
    /// Feed readings closer than this to the last value are ignored (g)
    pub weight_noise_g: f32,
    /// Samples at or below this are "no bird present" (g)
    pub min_bird_weight_g: f32,
    /// Feed level below which the status indicator turns red (g)
    pub low_feed_g: f32,

    // --- Automation ---
    /// Exhaust relay energises when the gas ADC reading exceeds this
    pub gas_on_above: u16,
    /// Exhaust relay releases only at or below `gas_on_above - band`
    pub gas_release_band: u16,
    /// Curtain relay energises when light drops below this (lux)
    pub lux_on_below: f32,
    /// Curtain relay releases only at or above `lux_on_below + band`
    pub lux_release_band: f32,

    // --- Session ---
    /// Initial telemetry report interval (minutes)
    pub default_data_freq_min: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            debounce_ms: 50,
            loop_delay_ms: 10,
            display_refresh_ms: 250,
            flow_window_ms: 1_000,
            flock_sample_ms: 5_000,
            climate_sample_ms: 2_000,
            tare_poll_ms: 100,
            tare_stall_ms: 1_000,

            // Calibration
            pulses_per_litre: 7.5,
            scale_factor_feed: 420.0,
            scale_factor_flock: 2_280.0,
            tare_samples: 10,
            tare_poll_budget: 500,

            // Weighing
            weight_noise_g: 1.0,
            min_bird_weight_g: 5.0,
            low_feed_g: 50.0,

            // Automation (bang-bang: zero release bands)
            gas_on_above: 4_090,
            gas_release_band: 0,
            lux_on_below: 20.0,
            lux_release_band: 0.0,

            // Session
            default_data_freq_min: 1,
        }
    }
}

impl SystemConfig {
    /// Reject values that would stall a timer or divide by zero.
    pub fn validate(&self) -> Result<(), Error> {
        if self.display_refresh_ms == 0
            || self.flow_window_ms == 0
            || self.flock_sample_ms == 0
            || self.climate_sample_ms == 0
        {
            return Err(Error::Config("cadence must be non-zero"));
        }
        if self.pulses_per_litre <= 0.0 {
            return Err(Error::Config("pulses_per_litre must be positive"));
        }
        if self.scale_factor_feed == 0.0 || self.scale_factor_flock == 0.0 {
            return Err(Error::Config("scale factor must be non-zero"));
        }
        if self.tare_samples == 0 {
            return Err(Error::Config("tare_samples must be non-zero"));
        }
        if self.default_data_freq_min == 0 {
            return Err(Error::Config("data frequency must be at least 1 minute"));
        }
        if self.gas_release_band > self.gas_on_above {
            return Err(Error::Config("gas release band exceeds threshold"));
        }
        Ok(())
    }
}
