//! Polled button debouncer for the four menu buttons.
//!
//! ## Hardware
//!
//! Active-low momentary switches with pull-ups.  The main loop samples
//! the raw level of every line once per iteration and feeds it to one
//! [`Debouncer`] per button.
//!
//! ## State machine
//!
//! ```text
//!            raw LOW                 LOW held ≥ window
//!   Idle ─────────────▶ Candidate ─────────────────────▶ Pressed  (emit press)
//!    ▲                   │     ▲                          │
//!    │  HIGH held ≥      │     │ raw change:              │ raw HIGH
//!    │  window           │     │ restart timer            ▼
//!    └───────────────────┘     └──────────────────── Candidate
//! ```
//!
//! A press fires once, on the confirmed falling transition.  Holding the
//! button does not repeat, and the release has to be confirmed for the
//! same window before the next press can register.  Any raw change while
//! in `Candidate` restarts the timer, so chatter shorter than the window
//! never produces an event.

use embedded_hal::digital::InputPin;
use heapless::Vec;

use crate::app::ports::InputPort;
use crate::error::{Result, SensorError};

/// Raw electrical level of a button line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    High,
    Low,
}

impl Level {
    /// Level from an `is_low()` style pin read.
    pub fn from_low(is_low: bool) -> Self {
        if is_low { Self::Low } else { Self::High }
    }
}

/// The four logical menu buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Up,
    Down,
    Select,
    Back,
}

impl Button {
    /// Scan order; also the order of [`InputPort::button_levels`].
    ///
    /// [`InputPort::button_levels`]: crate::app::ports::InputPort::button_levels
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Select, Self::Back];

    pub fn name(self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Select => "SELECT",
            Self::Back => "BACK",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    /// Stable released.
    Idle,
    /// Raw level differs from the last stable level; waiting for it to settle.
    Candidate { stable: Level },
    /// Stable pressed; the press event has already fired.
    Pressed,
}

/// Debounce state for one button line.
#[derive(Debug, Clone)]
pub struct Debouncer {
    state: DebounceState,
    last_raw: Level,
    last_change_ms: u32,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl Debouncer {
    pub const fn new() -> Self {
        Self {
            state: DebounceState::Idle,
            last_raw: Level::High,
            last_change_ms: 0,
        }
    }

    /// Feed one raw sample.  Returns `true` exactly once per confirmed press.
    pub fn update(&mut self, raw: Level, now_ms: u32, window_ms: u32) -> bool {
        if raw != self.last_raw {
            self.last_raw = raw;
            self.last_change_ms = now_ms;
            self.state = match self.state {
                DebounceState::Idle => DebounceState::Candidate { stable: Level::High },
                DebounceState::Pressed => DebounceState::Candidate { stable: Level::Low },
                candidate @ DebounceState::Candidate { .. } => candidate,
            };
        }

        let DebounceState::Candidate { stable } = self.state else {
            return false;
        };
        if now_ms.wrapping_sub(self.last_change_ms) < window_ms {
            return false;
        }

        match (stable, self.last_raw) {
            // Bounced back to where it started.
            (Level::High, Level::High) => {
                self.state = DebounceState::Idle;
                false
            }
            (Level::Low, Level::Low) => {
                self.state = DebounceState::Pressed;
                false
            }
            // Confirmed falling edge.
            (Level::High, Level::Low) => {
                self.state = DebounceState::Pressed;
                true
            }
            // Confirmed release: re-arm.
            (Level::Low, Level::High) => {
                self.state = DebounceState::Idle;
                false
            }
        }
    }
}

/// The four debouncers, scanned together once per loop.
#[derive(Debug, Clone)]
pub struct ButtonBank {
    debouncers: [Debouncer; 4],
    window_ms: u32,
}

impl ButtonBank {
    pub fn new(window_ms: u32) -> Self {
        Self {
            debouncers: [
                Debouncer::new(),
                Debouncer::new(),
                Debouncer::new(),
                Debouncer::new(),
            ],
            window_ms,
        }
    }

    /// Feed one scan of raw levels; returns the presses confirmed this scan
    /// in [`Button::ALL`] order.
    pub fn poll(&mut self, levels: [Level; 4], now_ms: u32) -> Vec<Button, 4> {
        let mut pressed = Vec::new();
        for ((debouncer, level), button) in self
            .debouncers
            .iter_mut()
            .zip(levels)
            .zip(Button::ALL)
        {
            if debouncer.update(level, now_ms, self.window_ms) {
                // Capacity equals the number of buttons; cannot overflow.
                let _ = pressed.push(button);
            }
        }
        pressed
    }
}

// ---------------------------------------------------------------------------
// Pin adapter
// ---------------------------------------------------------------------------

/// The four pulled-up button lines, read as one [`InputPort`] scan.
///
/// [`InputPort`]: crate::app::ports::InputPort
pub struct ButtonPins<U, D, S, B> {
    up: U,
    down: D,
    select: S,
    back: B,
}

impl<U, D, S, B> ButtonPins<U, D, S, B>
where
    U: InputPin,
    D: InputPin,
    S: InputPin,
    B: InputPin,
{
    pub fn new(up: U, down: D, select: S, back: B) -> Self {
        Self {
            up,
            down,
            select,
            back,
        }
    }
}

fn level_of(pin: &mut impl InputPin) -> Result<Level> {
    pin.is_low()
        .map(Level::from_low)
        .map_err(|_| SensorError::BusFault.into())
}

impl<U, D, S, B> InputPort for ButtonPins<U, D, S, B>
where
    U: InputPin,
    D: InputPin,
    S: InputPin,
    B: InputPin,
{
    fn button_levels(&mut self) -> Result<[Level; 4]> {
        Ok([
            level_of(&mut self.up)?,
            level_of(&mut self.down)?,
            level_of(&mut self.select)?,
            level_of(&mut self.back)?,
        ])
    }
}
