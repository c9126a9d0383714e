//! Application service: the cooperative scheduler core.
//!
//! [`AppService`] owns the [`WorldState`] and every per-cycle component.
//! It exposes a hardware-agnostic API: all I/O flows through port traits
//! injected at call sites, so the entire loop runs under test with mock
//! adapters and virtual time.
//!
//! ```text
//!  InputPort ──▶ ┌──────────────────────────────────────┐ ──▶ EventSink
//!  ScalePort ──▶ │             AppService               │
//!  Environment ─▶│  Menu · Sampler · Automation ·       │ ──▶ RelayPort
//!                │  Presenter · Indicator · Telemetry   │ ──▶ DisplayPort
//!                └──────────────────────────────────────┘ ──▶ IndicatorPort
//! ```
//!
//! One call to [`AppService::cycle`] is one main-loop iteration, in a
//! fixed order: inputs → sampler (and any runtime tare step) → automation
//! → presenter → indicator → telemetry.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::control::automation::AutomationController;
use crate::display::{Presenter, Surface, render_startup};
use crate::drivers::status_led::indicator_colour;
use crate::menu::Menu;
use crate::menu::context::MenuAction;
use crate::scheduler::{PeriodicTimer, minutes_to_ms};
use crate::sensors::{SampleReport, SensorSampler};
use crate::sensors::flow::PulseAccumulator;
use crate::sensors::weight::{Tare, TareStatus};
use crate::state::WorldState;

use super::events::{AppEvent, TelemetryReport};
use super::ports::{BoardPorts, ClockPort, EventSink, ScalePort};

/// Firmware version shown on the Info screen and in the start banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    config: SystemConfig,
    world: WorldState,
    menu: Menu,
    sampler: SensorSampler,
    automation: AutomationController,
    presenter: Presenter,
    telemetry: PeriodicTimer,
    /// Runtime tare in progress, advanced one poll per cycle.
    tare: Option<Tare>,
}

impl AppService {
    /// Construct the service.  Call [`startup`](Self::startup) next.
    pub fn new(config: SystemConfig, pulses: &'static PulseAccumulator) -> Self {
        let world = WorldState::new(&config);
        let telemetry = PeriodicTimer::new("telemetry", minutes_to_ms(world.ui.data_freq_min));
        Self {
            menu: Menu::new(),
            sampler: SensorSampler::new(&config, pulses),
            automation: AutomationController::new(&config),
            presenter: Presenter::new(&config, VERSION),
            telemetry,
            tare: None,
            world,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Blocking startup tare, then arm every cadence from "now".
    ///
    /// Waits as long as it takes for the amplifier: without zero offsets
    /// the weights are meaningless.  Once no conversion has been ready for
    /// `tare_stall_ms`, each further unready poll is reported on the event
    /// stream and shown on the primary display, so a dead amplifier is a
    /// visible stall rather than a silent hang.
    pub fn startup(
        &mut self,
        hw: &mut impl BoardPorts,
        clock: &impl ClockPort,
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) {
        sink.emit(&AppEvent::Started { version: VERSION });
        sink.emit(&AppEvent::TareStarted);

        let stall_polls = (self.config.tare_stall_ms / self.config.tare_poll_ms.max(1)).max(1);
        let mut tare = Tare::unbounded(self.config.tare_samples);
        loop {
            match tare.step(hw) {
                TareStatus::Sampling => {}
                TareStatus::NotReady { polls } => {
                    if polls >= stall_polls {
                        sink.emit(&AppEvent::TareWaiting { polls });
                        if let Err(e) = hw.draw(Surface::Primary, &render_startup(polls)) {
                            debug!("startup frame not drawn: {}", e);
                        }
                    }
                    delay.delay_ms(self.config.tare_poll_ms);
                }
                TareStatus::Complete { feed, flock } => {
                    self.finish_tare(feed, flock, sink);
                    break;
                }
                TareStatus::Failed => {
                    warn!("startup tare gave up; weights uncalibrated");
                    break;
                }
            }
        }

        let now = clock.now_ms();
        self.world.now_ms = now;
        self.sampler.restart(now);
        self.presenter.restart(now);
        self.telemetry.reset(now);
        self.world.request_refresh();
        info!("AppService ready at t={}ms", now);
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one main-loop iteration at `now_ms`.
    pub fn cycle(&mut self, now_ms: u32, hw: &mut impl BoardPorts, sink: &mut impl EventSink) {
        self.world.now_ms = now_ms;

        // 1. Inputs → menu
        self.service_inputs(hw, sink);

        // 2. Sensors (a runtime tare owns the amplifier while it runs)
        self.step_tare(hw, sink);
        let report = self.sampler.sample(&mut self.world, hw);
        if report != SampleReport::default() {
            debug!("t={}ms sampled {:?}", now_ms, report);
        }

        // 3. Automation
        for t in self
            .automation
            .apply(&self.world.readings, &mut self.world.relays, hw)
        {
            info!("{} relay -> {}", t.relay.name(), if t.on { "ON" } else { "OFF" });
            sink.emit(&AppEvent::RelayChanged {
                relay: t.relay,
                on: t.on,
            });
            self.world.request_refresh();
        }

        // 4. Presentation
        self.presenter.present(&mut self.world, hw);

        // 5. Indicator
        let colour = indicator_colour(self.world.readings.feed_weight_g, self.config.low_feed_g);
        if let Err(e) = hw.set_indicator(colour) {
            warn!("indicator write failed: {}", e);
        }

        // 6. Telemetry
        if self.telemetry.poll(now_ms) {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }
    }

    fn service_inputs(&mut self, hw: &mut impl BoardPorts, sink: &mut impl EventSink) {
        let levels = match hw.button_levels() {
            Ok(levels) => levels,
            Err(e) => {
                warn!("button scan failed: {}", e);
                return;
            }
        };

        for button in self.world.inputs.poll(levels, self.world.now_ms) {
            sink.emit(&AppEvent::ButtonPressed(button));
            let d = self
                .menu
                .dispatch(&mut self.world.ui, button, &self.world.readings);
            if d.changed() {
                self.world.request_refresh();
            }
            if let Some(to) = d.entered() {
                sink.emit(&AppEvent::ScreenChanged { from: d.from, to });
            }
            if let Some(action) = self.world.ui.take_action() {
                self.handle_action(action, sink);
            }
        }
    }

    fn handle_action(&mut self, action: MenuAction, sink: &mut impl EventSink) {
        match action {
            MenuAction::Tare => {
                if self.tare.is_some() {
                    debug!("tare already running");
                    return;
                }
                info!("runtime tare requested");
                self.tare = Some(Tare::bounded(
                    self.config.tare_samples,
                    self.config.tare_poll_budget,
                ));
                self.world.taring = true;
                self.world.request_refresh();
                sink.emit(&AppEvent::TareStarted);
            }
            MenuAction::SampleAccepted {
                grams,
                count,
                avg_g,
            } => sink.emit(&AppEvent::SampleAccepted {
                grams,
                count,
                avg_g,
            }),
            MenuAction::SampleRejected(grams) => {
                sink.emit(&AppEvent::SampleRejected { grams });
            }
            MenuAction::DataFreqChanged(minutes) => {
                self.telemetry.set_period(minutes_to_ms(minutes));
                sink.emit(&AppEvent::DataFreqChanged(minutes));
            }
        }
    }

    fn step_tare(&mut self, scale: &mut impl ScalePort, sink: &mut impl EventSink) {
        let Some(tare) = self.tare.as_mut() else {
            return;
        };
        match tare.step(scale) {
            TareStatus::Sampling | TareStatus::NotReady { .. } => {}
            TareStatus::Complete { feed, flock } => {
                self.tare = None;
                self.finish_tare(feed, flock, sink);
            }
            TareStatus::Failed => {
                warn!("runtime tare gave up; keeping previous offsets");
                self.tare = None;
                self.world.taring = false;
                self.world.request_refresh();
                sink.emit(&AppEvent::TareFailed);
            }
        }
    }

    fn finish_tare(&mut self, feed: i32, flock: i32, sink: &mut impl EventSink) {
        self.world.calibration.set_offsets(feed, flock);
        self.world.taring = false;
        self.world.request_refresh();
        info!("tare complete: feed={} flock={}", feed, flock);
        sink.emit(&AppEvent::TareComplete {
            feed_offset: feed,
            flock_offset: flock,
        });
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn build_telemetry(&self) -> TelemetryReport {
        let r = &self.world.readings;
        TelemetryReport {
            uptime_s: self.world.now_ms / 1_000,
            feed_weight_g: r.feed_weight_g,
            water_intake: r.flow_l_per_min,
            temperature_c: r.temperature_c,
            humidity_pct: r.humidity_pct,
            avg_weight_g: self.world.ui.session.avg_g,
            birds_weighed: self.world.ui.session.count,
            gas_raw: r.gas_raw,
            lux: r.lux,
            exhaust_on: self.world.relays.exhaust,
            curtain_on: self.world.relays.curtain,
        }
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn tare_in_progress(&self) -> bool {
        self.tare.is_some()
    }
}
