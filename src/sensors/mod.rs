//! Sensor subsystem: the multi-rate [`SensorSampler`].
//!
//! Called once per main-loop iteration.  Each source has its own cadence:
//!
//! | Source            | Cadence                                          |
//! |-------------------|--------------------------------------------------|
//! | Feed (scale A)    | every cycle, when no flock read is wanted        |
//! | Flock (scale B)   | every cycle on the weighing screen, else 5 s     |
//! | Flow              | drained once per 1 s window                      |
//! | Gas, light, sound | every cycle                                      |
//! | Temp / humidity   | 2 s                                              |
//!
//! Channels A and B share one amplifier, so at most one of them is read
//! in a cycle.  A due flock read stays pending until it succeeds and
//! pre-empts feed reads until then.
//!
//! Individual read failures are logged and the previous value retained.  A
//! flaky sensor never stalls the loop.

pub mod environment;
pub mod flow;
pub mod weight;

use log::{debug, warn};

use crate::app::ports::{EnvironmentPort, ScalePort};
use crate::config::SystemConfig;
use crate::error::{Error, SensorError};
use crate::menu::ScreenId;
use crate::scheduler::PeriodicTimer;
use crate::state::WorldState;
use flow::{PulseAccumulator, flow_rate_l_per_min};
use weight::{ScaleSample, WeightChannel, passes_noise_gate};

/// What changed during one [`SensorSampler::sample`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleReport {
    pub feed_updated: bool,
    pub flock_updated: bool,
    pub flow_updated: bool,
    pub climate_updated: bool,
}

/// Multi-rate sampler that refreshes `WorldState::readings`.
pub struct SensorSampler {
    pulses: &'static PulseAccumulator,
    flow_timer: PeriodicTimer,
    flock_timer: PeriodicTimer,
    climate_timer: PeriodicTimer,
    flock_pending: bool,
    pulses_per_litre: f32,
    noise_g: f32,
}

impl SensorSampler {
    pub fn new(config: &SystemConfig, pulses: &'static PulseAccumulator) -> Self {
        Self {
            pulses,
            flow_timer: PeriodicTimer::new("flow", config.flow_window_ms),
            flock_timer: PeriodicTimer::new("flock", config.flock_sample_ms),
            climate_timer: PeriodicTimer::new("climate", config.climate_sample_ms),
            flock_pending: false,
            pulses_per_litre: config.pulses_per_litre,
            noise_g: config.weight_noise_g,
        }
    }

    /// Restart every cadence from `now_ms` and discard pulses counted so
    /// far (the first window would otherwise include the boot time).
    pub fn restart(&mut self, now_ms: u32) {
        self.flow_timer.reset(now_ms);
        self.flock_timer.reset(now_ms);
        self.climate_timer.reset(now_ms);
        self.pulses.drain();
    }

    /// True if the next weight read will be on the flock channel.
    pub fn flock_pending(&self) -> bool {
        self.flock_pending
    }

    /// One sampling pass.  `world.taring` suspends weight reads.
    pub fn sample(
        &mut self,
        world: &mut WorldState,
        hw: &mut (impl ScalePort + EnvironmentPort),
    ) -> SampleReport {
        let now = world.now_ms;
        let mut report = SampleReport::default();

        // ── Weight (one channel per cycle) ────────────────────
        if self.flock_timer.poll(now) {
            self.flock_pending = true;
        }
        if !world.taring {
            let weighing = world.ui.screen == ScreenId::Weighing;
            if weighing || self.flock_pending {
                report.flock_updated = self.sample_flock(world, hw);
            } else {
                report.feed_updated = self.sample_feed(world, hw);
            }
        }

        // ── Flow (window drain) ───────────────────────────────
        let window_ms = self.flow_timer.elapsed_ms(now);
        if self.flow_timer.poll(now) {
            let count = self.pulses.drain();
            world.readings.flow_l_per_min =
                flow_rate_l_per_min(count, window_ms, self.pulses_per_litre);
            report.flow_updated = true;
        }

        // ── Fast environmental reads ──────────────────────────
        match hw.gas_raw() {
            Ok(raw) => world.readings.gas_raw = raw,
            Err(e) => warn!("gas read failed: {}", e),
        }
        match hw.lux() {
            Ok(lux) => {
                world.readings.lux = lux;
                world.readings.lux_valid = true;
            }
            Err(Error::Sensor(SensorError::NotReady)) => debug!("light sensor warming up"),
            Err(e) => warn!("light read failed: {}", e),
        }
        match hw.sound_raw() {
            Ok(raw) => world.readings.sound_raw = raw,
            Err(e) => debug!("sound read failed: {}", e),
        }

        // ── Climate (slow cadence) ────────────────────────────
        if self.climate_timer.poll(now) {
            match hw.climate() {
                Ok(c) => {
                    world.readings.temperature_c = c.temperature_c;
                    world.readings.humidity_pct = c.humidity_pct;
                    report.climate_updated = true;
                }
                Err(e) => warn!("climate read failed: {}", e),
            }
        }

        report
    }

    fn sample_feed(&mut self, world: &mut WorldState, scale: &mut impl ScalePort) -> bool {
        let Some(raw) = read_scale(scale, WeightChannel::Feed) else {
            return false;
        };
        let grams = world.calibration.grams(WeightChannel::Feed, raw);
        if passes_noise_gate(world.readings.feed_weight_g, grams, self.noise_g) {
            world.readings.feed_weight_g = grams;
            true
        } else {
            false
        }
    }

    fn sample_flock(&mut self, world: &mut WorldState, scale: &mut impl ScalePort) -> bool {
        let Some(raw) = read_scale(scale, WeightChannel::Flock) else {
            return false;
        };
        world.readings.flock_weight_g = world.calibration.grams(WeightChannel::Flock, raw);
        self.flock_pending = false;
        true
    }
}

/// Read one channel, folding "not ready" and bus faults into `None`.
fn read_scale(scale: &mut impl ScalePort, channel: WeightChannel) -> Option<i32> {
    match scale.read_raw(channel) {
        Ok(ScaleSample::Ready(raw)) => Some(raw),
        Ok(ScaleSample::Discarded | ScaleSample::Pending)
        | Err(Error::Sensor(SensorError::NotReady)) => None,
        Err(e) => {
            warn!("{:?} scale read failed: {}", channel, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::Climate;
    use crate::error::Result;

    static PULSES: PulseAccumulator = PulseAccumulator::new();

    #[derive(Default)]
    struct Bench {
        feed_raw: Option<i32>,
        flock_raw: Option<i32>,
        reads: Vec<WeightChannel>,
        gas: u16,
        lux: f32,
        climate_ok: bool,
    }

    impl ScalePort for Bench {
        fn read_raw(&mut self, channel: WeightChannel) -> Result<ScaleSample> {
            self.reads.push(channel);
            let raw = match channel {
                WeightChannel::Feed => self.feed_raw,
                WeightChannel::Flock => self.flock_raw,
            };
            Ok(raw.map_or(ScaleSample::Pending, ScaleSample::Ready))
        }
    }

    impl EnvironmentPort for Bench {
        fn gas_raw(&mut self) -> Result<u16> {
            Ok(self.gas)
        }
        fn lux(&mut self) -> Result<f32> {
            Ok(self.lux)
        }
        fn sound_raw(&mut self) -> Result<u16> {
            Err(SensorError::BusFault.into())
        }
        fn climate(&mut self) -> Result<Climate> {
            if self.climate_ok {
                Ok(Climate {
                    temperature_c: 24.5,
                    humidity_pct: 61.0,
                })
            } else {
                Err(SensorError::Checksum.into())
            }
        }
    }

    fn world() -> WorldState {
        WorldState::new(&SystemConfig {
            scale_factor_feed: 1.0,
            scale_factor_flock: 1.0,
            ..SystemConfig::default()
        })
    }

    fn sampler() -> SensorSampler {
        SensorSampler::new(&SystemConfig::default(), &PULSES)
    }

    #[test]
    fn feed_update_respects_noise_gate() {
        let mut s = sampler();
        let mut w = world();
        let mut hw = Bench {
            feed_raw: Some(500),
            ..Bench::default()
        };
        w.now_ms = 10;
        assert!(s.sample(&mut w, &mut hw).feed_updated);
        assert!((w.readings.feed_weight_g - 500.0).abs() < 1e-3);

        hw.feed_raw = Some(501);
        w.now_ms = 20;
        assert!(!s.sample(&mut w, &mut hw).feed_updated);
        assert!((w.readings.feed_weight_g - 500.0).abs() < 1e-3);

        hw.feed_raw = Some(503);
        w.now_ms = 30;
        assert!(s.sample(&mut w, &mut hw).feed_updated);
        assert!((w.readings.feed_weight_g - 503.0).abs() < 1e-3);
    }

    #[test]
    fn unready_scale_keeps_previous_value() {
        let mut s = sampler();
        let mut w = world();
        w.readings.feed_weight_g = 250.0;
        let mut hw = Bench::default();
        w.now_ms = 10;
        let report = s.sample(&mut w, &mut hw);
        assert!(!report.feed_updated);
        assert!((w.readings.feed_weight_g - 250.0).abs() < 1e-3);
    }

    #[test]
    fn flock_read_every_five_seconds_and_stays_pending_until_ready() {
        let mut s = sampler();
        let mut w = world();
        let mut hw = Bench {
            feed_raw: Some(100),
            flock_raw: None,
            ..Bench::default()
        };

        w.now_ms = 4_990;
        s.sample(&mut w, &mut hw);
        assert_eq!(hw.reads.last(), Some(&WeightChannel::Feed));

        w.now_ms = 5_000;
        s.sample(&mut w, &mut hw);
        assert_eq!(hw.reads.last(), Some(&WeightChannel::Flock));
        assert!(s.flock_pending());

        hw.flock_raw = Some(1_800);
        w.now_ms = 5_010;
        assert!(s.sample(&mut w, &mut hw).flock_updated);
        assert!((w.readings.flock_weight_g - 1_800.0).abs() < 1e-3);
        assert!(!s.flock_pending());

        w.now_ms = 5_020;
        s.sample(&mut w, &mut hw);
        assert_eq!(hw.reads.last(), Some(&WeightChannel::Feed));
    }

    #[test]
    fn weighing_screen_reads_flock_every_cycle() {
        let mut s = sampler();
        let mut w = world();
        w.ui.screen = ScreenId::Weighing;
        let mut hw = Bench {
            feed_raw: Some(100),
            flock_raw: Some(900),
            ..Bench::default()
        };
        for t in [10, 20, 30] {
            w.now_ms = t;
            s.sample(&mut w, &mut hw);
        }
        assert_eq!(hw.reads, vec![WeightChannel::Flock; 3]);
    }

    #[test]
    fn taring_suspends_weight_reads() {
        let mut s = sampler();
        let mut w = world();
        w.taring = true;
        let mut hw = Bench {
            feed_raw: Some(100),
            ..Bench::default()
        };
        w.now_ms = 10;
        s.sample(&mut w, &mut hw);
        assert!(hw.reads.is_empty());
    }

    #[test]
    fn environment_read_every_cycle_climate_on_cadence() {
        let mut s = sampler();
        let mut w = world();
        let mut hw = Bench {
            gas: 4_095,
            lux: 12.0,
            climate_ok: true,
            ..Bench::default()
        };
        w.now_ms = 10;
        let report = s.sample(&mut w, &mut hw);
        assert_eq!(w.readings.gas_raw, 4_095);
        assert!((w.readings.lux - 12.0).abs() < 1e-6);
        assert!(!report.climate_updated);

        w.now_ms = 2_000;
        assert!(s.sample(&mut w, &mut hw).climate_updated);
        assert!((w.readings.temperature_c - 24.5).abs() < 1e-6);
    }

    #[test]
    fn flow_rate_uses_the_measured_window() {
        static LATE: PulseAccumulator = PulseAccumulator::new();
        let mut s = SensorSampler::new(&SystemConfig::default(), &LATE);
        let mut w = world();
        let mut hw = Bench::default();
        s.restart(0);
        for _ in 0..15 {
            LATE.record_pulse();
        }
        // The loop reaches the window edge 100 ms late.
        w.now_ms = 1_100;
        assert!(s.sample(&mut w, &mut hw).flow_updated);
        assert!((w.readings.flow_l_per_min - 15.0 / 1.1 / 7.5).abs() < 1e-4);
    }

    #[test]
    fn failed_climate_read_retains_values() {
        let mut s = sampler();
        let mut w = world();
        w.readings.humidity_pct = 55.0;
        let mut hw = Bench::default();
        w.now_ms = 2_000;
        assert!(!s.sample(&mut w, &mut hw).climate_updated);
        assert!((w.readings.humidity_pct - 55.0).abs() < 1e-6);
    }
}
