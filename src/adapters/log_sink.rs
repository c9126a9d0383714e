//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the logger
//! (UART on the device).  Telemetry goes out as one JSON object per line
//! so it can be scraped off the serial console.

use log::{info, warn};

use crate::app::events::{AppEvent, TelemetryReport};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

/// One-line JSON rendering of a telemetry report.
pub fn telemetry_json(t: &TelemetryReport) -> Option<String> {
    serde_json::to_string(t).ok()
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { version } => {
                info!("START | CoopWatch v{}", version);
            }
            AppEvent::TareStarted => info!("TARE  | started"),
            AppEvent::TareWaiting { polls } => {
                info!("TARE  | scale not ready (poll {})", polls);
            }
            AppEvent::TareComplete {
                feed_offset,
                flock_offset,
            } => {
                info!("TARE  | done feed={} flock={}", feed_offset, flock_offset);
            }
            AppEvent::TareFailed => warn!("TARE  | failed, offsets unchanged"),
            AppEvent::ButtonPressed(b) => info!("INPUT | {}", b.name()),
            AppEvent::ScreenChanged { from, to } => {
                info!("MENU  | {:?} -> {:?}", from, to);
            }
            AppEvent::SampleAccepted {
                grams,
                count,
                avg_g,
            } => {
                info!(
                    "WEIGH | +{:.1}g  n={}  avg={:.1}g",
                    grams, count, avg_g
                );
            }
            AppEvent::SampleRejected { grams } => {
                info!("WEIGH | {:.1}g ignored (no bird)", grams);
            }
            AppEvent::DataFreqChanged(minutes) => {
                info!("CFG   | data frequency {} min", minutes);
            }
            AppEvent::RelayChanged { relay, on } => {
                info!("RELAY | {} {}", relay.name(), if *on { "ON" } else { "OFF" });
            }
            AppEvent::Telemetry(t) => match telemetry_json(t) {
                Some(line) => info!("TELEM | {}", line),
                None => warn!("TELEM | serialisation failed"),
            },
        }
    }
}
