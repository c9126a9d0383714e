//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  On the device they become
//! lines on the diagnostic serial stream; tests record them.

use serde::Serialize;

use crate::drivers::button::Button;
use crate::menu::ScreenId;
use crate::state::RelayId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Startup banner.
    Started { version: &'static str },

    /// A tare began (at boot or from the menu).
    TareStarted,
    /// The amplifier was polled during a startup tare and had nothing ready.
    TareWaiting { polls: u32 },
    /// Both channels zeroed.
    TareComplete { feed_offset: i32, flock_offset: i32 },
    /// A runtime tare gave up; previous offsets kept.
    TareFailed,

    /// A debounced button press (input echo).
    ButtonPressed(Button),
    /// The menu moved to another screen.
    ScreenChanged { from: ScreenId, to: ScreenId },
    /// A weighing sample was counted.
    SampleAccepted { grams: f32, count: u32, avg_g: f32 },
    /// A weighing sample was at or below the "bird present" threshold.
    SampleRejected { grams: f32 },
    /// The telemetry interval was edited.
    DataFreqChanged(u16),

    /// A relay was commanded to a new state.
    RelayChanged { relay: RelayId, on: bool },

    /// Periodic readings summary (every `dataFreq` minutes).
    Telemetry(TelemetryReport),
}

/// A point-in-time summary suitable for logging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryReport {
    pub uptime_s: u32,
    pub feed_weight_g: f32,
    /// Water flow (L/min).
    pub water_intake: f32,
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub avg_weight_g: f32,
    pub birds_weighed: u32,
    pub gas_raw: u16,
    pub lux: f32,
    pub exhaust_on: bool,
    pub curtain_on: bool,
}
