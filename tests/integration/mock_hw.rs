//! Mock board for integration tests.
//!
//! One struct implements every port.  Inputs (button levels, scale counts,
//! environment readings) are plain fields the test sets between cycles;
//! outputs (relay writes, indicator colour, drawn frames) are recorded so
//! tests can assert on the full history without touching real GPIO or I2C.

use coopwatch::app::events::AppEvent;
use coopwatch::app::ports::{
    Climate, ClockPort, DisplayPort, EnvironmentPort, EventSink, IndicatorPort, InputPort,
    RelayPort, ScalePort,
};
use coopwatch::display::{Frame, Surface};
use coopwatch::drivers::button::{Button, Level};
use coopwatch::drivers::status_led::Colour;
use coopwatch::error::Result;
use coopwatch::sensors::weight::{ScaleSample, WeightChannel};
use coopwatch::state::RelayId;
use embedded_hal::delay::DelayNs;

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    pub levels: [Level; 4],

    pub feed_raw: i32,
    pub flock_raw: i32,
    /// Reads answered with "not ready" before the scale responds again.
    pub not_ready: u32,
    /// Spend one conversion on every channel change, as the HX711 does.
    pub switch_costs_a_read: bool,
    armed: WeightChannel,
    pub scale_reads: Vec<WeightChannel>,

    pub gas: u16,
    pub lux: f32,
    pub sound: u16,
    pub climate: Climate,

    pub relay_writes: Vec<(RelayId, bool)>,
    pub indicator: Option<Colour>,
    pub draws: Vec<(Surface, Frame)>,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self {
            levels: [Level::High; 4],
            feed_raw: 1_000,
            flock_raw: 2_000,
            not_ready: 0,
            switch_costs_a_read: false,
            armed: WeightChannel::Feed,
            scale_reads: Vec::new(),
            gas: 100,
            lux: 150.0,
            sound: 800,
            climate: Climate {
                temperature_c: 24.0,
                humidity_pct: 60.0,
            },
            relay_writes: Vec::new(),
            indicator: None,
            draws: Vec::new(),
        }
    }

    pub fn hold(&mut self, button: Button) {
        self.set(button, Level::Low);
    }

    pub fn release(&mut self, button: Button) {
        self.set(button, Level::High);
    }

    fn set(&mut self, button: Button, level: Level) {
        let idx = Button::ALL
            .iter()
            .position(|b| *b == button)
            .expect("known button");
        self.levels[idx] = level;
    }

    /// Most recent frame drawn on `surface`.
    pub fn last_frame(&self, surface: Surface) -> Option<&Frame> {
        self.draws
            .iter()
            .rev()
            .find(|(s, _)| *s == surface)
            .map(|(_, f)| f)
    }
}

impl InputPort for MockBoard {
    fn button_levels(&mut self) -> Result<[Level; 4]> {
        Ok(self.levels)
    }
}

impl ScalePort for MockBoard {
    fn read_raw(&mut self, channel: WeightChannel) -> Result<ScaleSample> {
        self.scale_reads.push(channel);
        if self.not_ready > 0 {
            self.not_ready -= 1;
            return Ok(ScaleSample::Pending);
        }
        if self.switch_costs_a_read && channel != self.armed {
            self.armed = channel;
            return Ok(ScaleSample::Discarded);
        }
        Ok(ScaleSample::Ready(match channel {
            WeightChannel::Feed => self.feed_raw,
            WeightChannel::Flock => self.flock_raw,
        }))
    }
}

impl EnvironmentPort for MockBoard {
    fn gas_raw(&mut self) -> Result<u16> {
        Ok(self.gas)
    }

    fn lux(&mut self) -> Result<f32> {
        Ok(self.lux)
    }

    fn sound_raw(&mut self) -> Result<u16> {
        Ok(self.sound)
    }

    fn climate(&mut self) -> Result<Climate> {
        Ok(self.climate)
    }
}

impl RelayPort for MockBoard {
    fn set_relay(&mut self, relay: RelayId, on: bool) -> Result<()> {
        self.relay_writes.push((relay, on));
        Ok(())
    }
}

impl IndicatorPort for MockBoard {
    fn set_indicator(&mut self, colour: Colour) -> Result<()> {
        self.indicator = Some(colour);
        Ok(())
    }
}

impl DisplayPort for MockBoard {
    fn draw(&mut self, surface: Surface, frame: &Frame) -> Result<()> {
        self.draws.push((surface, frame.clone()));
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Time ──────────────────────────────────────────────────────

pub struct FakeClock(pub u32);

impl ClockPort for FakeClock {
    fn now_ms(&self) -> u32 {
        self.0
    }
}

pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
