//! Integration tests for the full main-loop pipeline:
//! buttons → menu → sampler → automation → displays → telemetry.
//!
//! These run on the host (x86_64) against the mock board and virtual time,
//! so every cadence can be driven exactly.

use super::mock_hw::{FakeClock, MockBoard, NoDelay, RecordingSink};

use coopwatch::app::events::AppEvent;
use coopwatch::app::service::AppService;
use coopwatch::config::SystemConfig;
use coopwatch::display::Surface;
use coopwatch::drivers::button::Button;
use coopwatch::drivers::status_led::Colour;
use coopwatch::menu::ScreenId;
use coopwatch::sensors::flow::PulseAccumulator;
use coopwatch::state::RelayId;

/// Counts per gram on the flock channel with the default config.
const FLOCK_SCALE: i32 = 2_280;
/// Counts per gram on the feed channel with the default config.
const FEED_SCALE: i32 = 420;

struct Rig {
    app: AppService,
    hw: MockBoard,
    sink: RecordingSink,
    pulses: &'static PulseAccumulator,
    now: u32,
}

impl Rig {
    fn new() -> Self {
        Self::with_board(MockBoard::new())
    }

    fn with_board(mut hw: MockBoard) -> Self {
        let pulses: &'static PulseAccumulator = Box::leak(Box::new(PulseAccumulator::new()));
        let mut app = AppService::new(SystemConfig::default(), pulses);
        let mut sink = RecordingSink::new();
        app.startup(&mut hw, &FakeClock(0), &mut NoDelay, &mut sink);
        Self {
            app,
            hw,
            sink,
            pulses,
            now: 0,
        }
    }

    fn tick(&mut self, ms: u32) {
        self.now += ms;
        self.app.cycle(self.now, &mut self.hw, &mut self.sink);
    }

    fn tick_to(&mut self, now: u32) {
        self.now = now;
        self.app.cycle(self.now, &mut self.hw, &mut self.sink);
    }

    /// Hold `button` past the debounce window, then release it.
    fn press(&mut self, button: Button) {
        self.hw.hold(button);
        self.tick(10);
        self.tick(60);
        self.hw.release(button);
        self.tick(10);
        self.tick(60);
    }

    fn screen(&self) -> ScreenId {
        self.app.world().ui.screen
    }

    fn primary_line(&self, row: usize) -> String {
        self.hw
            .last_frame(Surface::Primary)
            .map(|f| f.line(row).to_string())
            .unwrap_or_default()
    }

    /// Flock raw count for `grams` above the startup tare offset.
    fn set_bird(&mut self, grams: i32) {
        self.hw.flock_raw = 2_000 + grams * FLOCK_SCALE;
    }
}

// ── Startup ──────────────────────────────────────────────────

#[test]
fn startup_tare_waits_for_scale_then_zeroes_both_channels() {
    let mut hw = MockBoard::new();
    // 13 unready polls at 100 ms: the first nine stay under the 1 s
    // stall threshold.
    hw.not_ready = 13;
    let rig = Rig::with_board(hw);

    let waits: Vec<u32> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::TareWaiting { polls } => Some(*polls),
            _ => None,
        })
        .collect();
    assert_eq!(waits, vec![10, 11, 12, 13]);

    assert!(rig.sink.events.contains(&AppEvent::TareComplete {
        feed_offset: 1_000,
        flock_offset: 2_000,
    }));
    let cal = rig.app.world().calibration;
    assert_eq!((cal.zero_offset_a, cal.zero_offset_b), (1_000, 2_000));

    let stalls = rig
        .hw
        .draws
        .iter()
        .filter(|(s, f)| *s == Surface::Primary && f.line(0) == "SCALE NOT READY")
        .count();
    assert_eq!(stalls, 4, "every unready poll past the threshold is shown");
    assert!(!rig.app.world().taring);
}

#[test]
fn healthy_startup_never_reports_a_stall() {
    let mut hw = MockBoard::new();
    hw.switch_costs_a_read = true;
    let rig = Rig::with_board(hw);

    assert!(
        !rig
            .sink
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::TareWaiting { .. })),
        "{:?}",
        rig.sink.events
    );
    assert!(
        !rig
            .hw
            .draws
            .iter()
            .any(|(_, f)| f.line(0) == "SCALE NOT READY")
    );
    assert!(rig.sink.events.contains(&AppEvent::TareComplete {
        feed_offset: 1_000,
        flock_offset: 2_000,
    }));
}

#[test]
fn startup_emits_banner_first() {
    let rig = Rig::new();
    assert!(matches!(rig.sink.events[0], AppEvent::Started { .. }));
    assert_eq!(rig.sink.events[1], AppEvent::TareStarted);
}

// ── Buttons and menu ─────────────────────────────────────────

#[test]
fn select_on_live_data_opens_root_menu() {
    let mut rig = Rig::new();
    rig.tick(10);
    assert_eq!(rig.primary_line(0), "Feed:0g");

    rig.press(Button::Select);

    assert_eq!(rig.screen(), ScreenId::Root);
    assert!(rig.sink.events.contains(&AppEvent::ButtonPressed(Button::Select)));
    assert!(rig.sink.events.contains(&AppEvent::ScreenChanged {
        from: ScreenId::LiveData,
        to: ScreenId::Root,
    }));
    assert_eq!(rig.primary_line(0), ">Weigh birds");
}

#[test]
fn bouncing_contact_produces_one_press() {
    let mut rig = Rig::new();
    rig.hw.hold(Button::Up);
    rig.tick(10);
    rig.hw.release(Button::Up);
    rig.tick(10);
    rig.hw.hold(Button::Up);
    rig.tick(10);
    rig.tick(10);
    rig.tick(50);
    // Release with a bounce.
    rig.hw.release(Button::Up);
    rig.tick(10);
    rig.hw.hold(Button::Up);
    rig.tick(5);
    rig.tick(55);
    rig.hw.release(Button::Up);
    rig.tick(10);
    rig.tick(60);

    let presses = rig
        .sink
        .count(|e| matches!(e, AppEvent::ButtonPressed(Button::Up)));
    assert_eq!(presses, 1);
}

#[test]
fn root_cursor_wraps_both_ways() {
    let mut rig = Rig::new();
    rig.press(Button::Select);

    let mut seen = Vec::new();
    for _ in 0..4 {
        rig.press(Button::Down);
        seen.push(rig.app.world().ui.cursor);
    }
    assert_eq!(seen, vec![1, 2, 3, 0]);

    rig.press(Button::Up);
    assert_eq!(rig.app.world().ui.cursor, 3);
    assert_eq!(rig.primary_line(0), ">Info");

    rig.press(Button::Back);
    assert_eq!(rig.screen(), ScreenId::LiveData);
}

// ── Weighing session ─────────────────────────────────────────

#[test]
fn weighing_keeps_running_mean_and_ignores_empty_platform() {
    let mut rig = Rig::new();
    rig.press(Button::Select);
    rig.press(Button::Select);
    assert_eq!(rig.screen(), ScreenId::Weighing);

    for grams in [520, 500, 540] {
        rig.set_bird(grams);
        rig.tick(10);
        rig.press(Button::Select);
    }
    rig.set_bird(3);
    rig.tick(10);
    rig.press(Button::Select);

    let accepted: Vec<(u32, f32)> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::SampleAccepted { count, avg_g, .. } => Some((*count, *avg_g)),
            _ => None,
        })
        .collect();
    assert_eq!(accepted, vec![(1, 520.0), (2, 510.0), (3, 520.0)]);
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::SampleRejected { grams: 3.0 }));

    let session = rig.app.world().ui.session;
    assert_eq!(session.count, 3);
    assert_eq!(session.avg_g, 520.0);
    assert_eq!(rig.primary_line(1), "Avg:520.0g");
}

#[test]
fn weighing_screen_reads_flock_channel_every_cycle() {
    let mut rig = Rig::new();
    rig.press(Button::Select);
    rig.press(Button::Select);
    rig.hw.scale_reads.clear();

    for _ in 0..5 {
        rig.tick(10);
    }
    assert!(rig
        .hw
        .scale_reads
        .iter()
        .all(|c| *c == coopwatch::sensors::weight::WeightChannel::Flock));
    assert_eq!(rig.hw.scale_reads.len(), 5);
}

// ── Settings / telemetry ─────────────────────────────────────

#[test]
fn data_frequency_clamps_and_drives_telemetry_period() {
    let mut rig = Rig::new();
    rig.press(Button::Select);
    rig.press(Button::Down);
    rig.press(Button::Down);
    rig.press(Button::Select);
    assert_eq!(rig.screen(), ScreenId::Settings);

    rig.press(Button::Down);
    assert_eq!(rig.app.world().ui.data_freq_min, 1);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::DataFreqChanged(_))),
        0
    );

    rig.press(Button::Up);
    rig.press(Button::Up);
    assert_eq!(rig.app.world().ui.data_freq_min, 3);
    assert!(rig.sink.events.contains(&AppEvent::DataFreqChanged(3)));
    assert_eq!(rig.primary_line(1), "< 3 min >");

    rig.tick_to(60_000);
    rig.tick_to(179_999);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 0);
    rig.tick_to(180_000);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 1);
}

#[test]
fn telemetry_reports_once_per_minute_by_default() {
    let mut rig = Rig::new();
    rig.tick_to(59_999);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 0);

    rig.tick_to(60_000);
    let report = rig
        .sink
        .events
        .iter()
        .find_map(|e| match e {
            AppEvent::Telemetry(t) => Some(*t),
            _ => None,
        })
        .expect("telemetry emitted");
    assert_eq!(report.uptime_s, 60);
    assert_eq!(report.temperature_c, 24.0);
    assert_eq!(report.gas_raw, 100);

    rig.tick_to(120_000);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 2);
}

// ── Automation ───────────────────────────────────────────────

#[test]
fn exhaust_relay_is_written_only_on_edges() {
    let mut rig = Rig::new();
    for gas in [100, 4_095, 4_095, 50] {
        rig.hw.gas = gas;
        rig.tick(10);
    }
    assert_eq!(
        rig.hw.relay_writes,
        vec![(RelayId::Exhaust, true), (RelayId::Exhaust, false)]
    );
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::RelayChanged { .. })),
        2
    );
}

#[test]
fn curtain_closes_in_the_dark() {
    let mut rig = Rig::new();
    rig.hw.lux = 5.0;
    rig.tick(10);
    assert_eq!(rig.hw.relay_writes, vec![(RelayId::Curtain, true)]);
    assert!(rig.app.world().relays.curtain);
}

#[test]
fn secondary_panel_marks_running_fan() {
    let mut rig = Rig::new();
    rig.hw.gas = 4_095;
    rig.tick(10);
    let frame = rig.hw.last_frame(Surface::Secondary).expect("drawn");
    assert!(frame.line(1).starts_with("G4095*"), "{:?}", frame.line(1));
}

// ── Flow ─────────────────────────────────────────────────────

#[test]
fn flow_window_converts_pulses_to_litres_per_minute() {
    let mut rig = Rig::new();
    for _ in 0..15 {
        rig.pulses.record_pulse();
    }
    rig.tick_to(999);
    assert_eq!(rig.app.world().readings.flow_l_per_min, 0.0);
    rig.tick_to(1_000);
    assert_eq!(rig.app.world().readings.flow_l_per_min, 2.0);
    assert_eq!(rig.pulses.drain(), 0);
}

// ── Runtime tare ─────────────────────────────────────────────

#[test]
fn menu_tare_runs_without_blocking_the_loop() {
    let mut rig = Rig::new();
    rig.hw.feed_raw = 5_000;
    rig.hw.flock_raw = 7_000;
    rig.sink.clear();

    rig.press(Button::Select);
    rig.press(Button::Down);
    rig.press(Button::Select);

    assert_eq!(rig.screen(), ScreenId::LiveData);
    assert!(rig.app.tare_in_progress());
    assert!(rig.app.world().taring);
    assert_eq!(rig.primary_line(0), "Taring...");

    for _ in 0..50 {
        if !rig.app.tare_in_progress() {
            break;
        }
        rig.tick(10);
    }
    assert!(rig.sink.events.contains(&AppEvent::TareComplete {
        feed_offset: 5_000,
        flock_offset: 7_000,
    }));
    let cal = rig.app.world().calibration;
    assert_eq!((cal.zero_offset_a, cal.zero_offset_b), (5_000, 7_000));
    assert!(!rig.app.world().taring);
}

#[test]
fn menu_tare_gives_up_and_keeps_offsets() {
    let mut rig = Rig::new();
    rig.press(Button::Select);
    rig.press(Button::Down);
    rig.hw.not_ready = u32::MAX;
    rig.press(Button::Select);

    for _ in 0..600 {
        if !rig.app.tare_in_progress() {
            break;
        }
        rig.tick(10);
    }
    assert!(rig.sink.events.contains(&AppEvent::TareFailed));
    let cal = rig.app.world().calibration;
    assert_eq!((cal.zero_offset_a, cal.zero_offset_b), (1_000, 2_000));
    assert!(!rig.app.world().taring);
}

// ── Indicator ────────────────────────────────────────────────

#[test]
fn indicator_follows_feed_level() {
    let mut rig = Rig::new();
    rig.tick(10);
    assert_eq!(rig.hw.indicator, Some(Colour::Red));

    rig.hw.feed_raw = 1_000 + 100 * FEED_SCALE;
    rig.tick(10);
    assert_eq!(rig.app.world().readings.feed_weight_g, 100.0);
    assert_eq!(rig.hw.indicator, Some(Colour::Green));
}
