//! The single mutable "world" threaded through every component.
//!
//! `WorldState` is constructed once at startup and lives for the device's
//! uptime.  Each field has exactly one writer per cycle:
//!
//! | Field          | Writer                 | Readers                       |
//! |----------------|------------------------|-------------------------------|
//! | `readings`     | `SensorSampler`        | automation, menu, display     |
//! | `relays`       | `AutomationController` | display                       |
//! | `ui`           | menu handlers          | sampler, display              |
//! | `inputs`       | `ButtonBank`           | -                             |
//! | `calibration`  | tare                   | sampler                       |
//!
//! The flow pulse counter is deliberately *not* here: it is shared with
//! interrupt context and lives in a static [`PulseAccumulator`].
//!
//! [`PulseAccumulator`]: crate::sensors::flow::PulseAccumulator

use serde::Serialize;

use crate::config::SystemConfig;
use crate::drivers::button::ButtonBank;
use crate::menu::context::UiState;
use crate::sensors::weight::WeightChannel;

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Most recent successfully sampled value of every sensor.
///
/// A failed or unready sample leaves the prior value in place; there is no
/// "missing" state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Readings {
    /// Feed hopper weight (g), load cell on amplifier channel A.
    pub feed_weight_g: f32,
    /// Bird platform weight (g), load cell on amplifier channel B.
    pub flock_weight_g: f32,
    /// Water flow (L/min), drained from the pulse accumulator once per window.
    pub flow_l_per_min: f32,
    /// Gas sensor raw ADC count (0 – 4095).
    pub gas_raw: u16,
    /// Ambient light (lux).
    pub lux: f32,
    /// False until the light sensor has delivered its first reading.
    #[serde(skip)]
    pub lux_valid: bool,
    /// Sound level raw ADC count.  Display only.
    pub sound_raw: u16,
    /// Air temperature (°C).
    pub temperature_c: f32,
    /// Relative humidity (%).
    pub humidity_pct: f32,
}

// ---------------------------------------------------------------------------
// Relays
// ---------------------------------------------------------------------------

/// The two relay outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelayId {
    /// Relay 1, driven by gas concentration.
    Exhaust,
    /// Relay 2, driven by ambient light.
    Curtain,
}

impl RelayId {
    pub const ALL: [Self; 2] = [Self::Exhaust, Self::Curtain];

    pub fn name(self) -> &'static str {
        match self {
            Self::Exhaust => "exhaust",
            Self::Curtain => "curtain",
        }
    }
}

/// Last *commanded* state of each relay.  Used for edge detection and
/// display; never re-read from hardware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayState {
    pub exhaust: bool,
    pub curtain: bool,
}

impl RelayState {
    pub fn get(&self, relay: RelayId) -> bool {
        match relay {
            RelayId::Exhaust => self.exhaust,
            RelayId::Curtain => self.curtain,
        }
    }

    pub fn set(&mut self, relay: RelayId, on: bool) {
        match relay {
            RelayId::Exhaust => self.exhaust = on,
            RelayId::Curtain => self.curtain = on,
        }
    }
}

// ---------------------------------------------------------------------------
// Calibration
// ---------------------------------------------------------------------------

/// Load-cell zero offsets (raw counts) and scale factors (counts per gram).
///
/// Offsets change only when a tare completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub zero_offset_a: i32,
    pub zero_offset_b: i32,
    pub scale_factor_a: f32,
    pub scale_factor_b: f32,
}

impl Calibration {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            zero_offset_a: 0,
            zero_offset_b: 0,
            scale_factor_a: config.scale_factor_feed,
            scale_factor_b: config.scale_factor_flock,
        }
    }

    /// Convert a raw amplifier count on `channel` to grams.
    pub fn grams(&self, channel: WeightChannel, raw: i32) -> f32 {
        let (offset, scale) = match channel {
            WeightChannel::Feed => (self.zero_offset_a, self.scale_factor_a),
            WeightChannel::Flock => (self.zero_offset_b, self.scale_factor_b),
        };
        (raw.saturating_sub(offset)) as f32 / scale
    }

    /// Install freshly measured zero offsets.
    pub fn set_offsets(&mut self, feed: i32, flock: i32) {
        self.zero_offset_a = feed;
        self.zero_offset_b = flock;
    }
}

// ---------------------------------------------------------------------------
// WorldState
// ---------------------------------------------------------------------------

/// Everything the main loop knows about the shed.
pub struct WorldState {
    pub readings: Readings,
    pub relays: RelayState,
    pub ui: UiState,
    pub inputs: ButtonBank,
    pub calibration: Calibration,
    /// Set by any component that changed something visible; cleared by the
    /// presenter after it draws.
    pub refresh_pending: bool,
    /// A runtime tare is in progress (weight reads suspended).
    pub taring: bool,
    /// Timestamp of the current cycle (ms since boot).
    pub now_ms: u32,
}

impl WorldState {
    /// Zeroed state.  Offsets are filled in by the startup tare.
    pub fn new(config: &SystemConfig) -> Self {
        let mut ui = UiState::new(config.default_data_freq_min);
        ui.min_bird_weight_g = config.min_bird_weight_g;
        Self {
            readings: Readings::default(),
            relays: RelayState::default(),
            ui,
            inputs: ButtonBank::new(config.debounce_ms),
            calibration: Calibration::from_config(config),
            refresh_pending: true,
            taring: false,
            now_ms: 0,
        }
    }

    pub fn request_refresh(&mut self) {
        self.refresh_pending = true;
    }
}
