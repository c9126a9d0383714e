//! Presentation layer: turns `WorldState` into two 16×2 character frames.
//!
//! ```text
//!   Primary (menu)            Secondary (live readings)
//!   ┌────────────────┐        ┌────────────────┐
//!   │Feed:1234g      │        │T:24.5C H:61%   │
//!   │Water:2.0L/m    │        │G312  L180 S45  │
//!   └────────────────┘        └────────────────┘
//! ```
//!
//! Rendering is pure (`render_*` take state, return a [`Frame`]); the
//! [`Presenter`] decides *when* to draw and pushes frames through the
//! [`DisplayPort`].  Lines longer than the panel are truncated.

use core::fmt::{self, Write};

use heapless::String;
use log::warn;

use crate::app::ports::DisplayPort;
use crate::config::SystemConfig;
use crate::menu::ScreenId;
use crate::menu::screens::ROOT_ITEMS;
use crate::scheduler::PeriodicTimer;
use crate::state::{Readings, RelayState, WorldState};

pub const COLS: usize = 16;
pub const ROWS: usize = 2;

/// Which physical panel a frame is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Primary,
    Secondary,
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One screenful of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    lines: [String<COLS>; ROWS],
}

/// `fmt::Write` sink that silently drops anything past the panel width.
struct Truncating<'a>(&'a mut String<COLS>);

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace row `row` with formatted text.  Out-of-range rows are ignored.
    pub fn set(&mut self, row: usize, args: fmt::Arguments<'_>) {
        if let Some(line) = self.lines.get_mut(row) {
            line.clear();
            // Truncating never reports an error.
            let _ = Truncating(line).write_fmt(args);
        }
    }

    pub fn line(&self, row: usize) -> &str {
        self.lines.get(row).map_or("", |l| l.as_str())
    }
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

/// Menu panel for the active screen.
pub fn render_primary(world: &WorldState, version: &str) -> Frame {
    let mut f = Frame::new();
    let r = &world.readings;

    if world.taring {
        f.set(0, format_args!("Taring..."));
        f.set(1, format_args!("Clear the scales"));
        return f;
    }

    match world.ui.screen {
        ScreenId::LiveData => {
            f.set(0, format_args!("Feed:{:.0}g", r.feed_weight_g));
            f.set(1, format_args!("Water:{:.1}L/m", r.flow_l_per_min));
        }
        ScreenId::Root => {
            let n = ROOT_ITEMS.len();
            let cur = usize::from(world.ui.cursor) % n;
            f.set(0, format_args!(">{}", ROOT_ITEMS[cur]));
            f.set(1, format_args!(" {}", ROOT_ITEMS[(cur + 1) % n]));
        }
        ScreenId::Weighing => {
            let s = &world.ui.session;
            f.set(0, format_args!("W:{:.0}g n:{}", r.flock_weight_g, s.count));
            f.set(1, format_args!("Avg:{:.1}g", s.avg_g));
        }
        ScreenId::Settings => {
            f.set(0, format_args!("Data freq:"));
            f.set(1, format_args!("< {} min >", world.ui.data_freq_min));
        }
        ScreenId::Info => {
            f.set(0, format_args!("CoopWatch v{}", version));
            f.set(
                1,
                format_args!(
                    "Up:{}s E{} C{}",
                    world.now_ms / 1_000,
                    u8::from(world.relays.exhaust),
                    u8::from(world.relays.curtain)
                ),
            );
        }
    }
    f
}

/// Live readings panel.
pub fn render_secondary(r: &Readings, relays: &RelayState) -> Frame {
    let mut f = Frame::new();
    f.set(
        0,
        format_args!("T:{:.1}C H:{:.0}%", r.temperature_c, r.humidity_pct),
    );
    let fan = if relays.exhaust { '*' } else { ' ' };
    f.set(
        1,
        format_args!("G{}{} L{:.0} S{}", r.gas_raw, fan, r.lux, r.sound_raw),
    );
    f
}

/// Shown while the startup tare waits for the amplifier.
pub fn render_startup(polls: u32) -> Frame {
    let mut f = Frame::new();
    f.set(0, format_args!("SCALE NOT READY"));
    f.set(1, format_args!("polls:{}", polls));
    f
}

// ---------------------------------------------------------------------------
// Presenter
// ---------------------------------------------------------------------------

/// Redraws both panels every refresh interval, or sooner when something
/// set `world.refresh_pending`.
pub struct Presenter {
    timer: PeriodicTimer,
    version: &'static str,
}

impl Presenter {
    pub fn new(config: &SystemConfig, version: &'static str) -> Self {
        Self {
            timer: PeriodicTimer::new("display", config.display_refresh_ms),
            version,
        }
    }

    pub fn restart(&mut self, now_ms: u32) {
        self.timer.reset(now_ms);
    }

    /// Returns `true` if a redraw was attempted.  Draw failures are logged;
    /// the next interval tries again.
    pub fn present(&mut self, world: &mut WorldState, display: &mut impl DisplayPort) -> bool {
        let due = self.timer.poll(world.now_ms);
        if !due && !world.refresh_pending {
            return false;
        }
        self.timer.reset(world.now_ms);

        let primary = render_primary(world, self.version);
        let secondary = render_secondary(&world.readings, &world.relays);
        for (surface, frame) in [
            (Surface::Primary, &primary),
            (Surface::Secondary, &secondary),
        ] {
            if let Err(e) = display.draw(surface, frame) {
                warn!("{:?} display draw failed: {}", surface, e);
            }
        }
        world.refresh_pending = false;
        true
    }
}
