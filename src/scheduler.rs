//! Cadence timers for the cooperative main loop.
//!
//! Every periodic job in the firmware is gated by a named [`PeriodicTimer`]
//! that compares the caller-supplied "now" against its last fire time.
//! Nothing here reads a clock, so tests advance virtual time simply by
//! passing larger timestamps.
//!
//! ```text
//!   now_ms ──▶ ┌──────────────────────────────┐
//!              │ cadence      period          │  owner
//!              │  flow      1 s   (drain ISR) │──▶ SensorSampler
//!              │  flock     5 s   (channel B) │──▶ SensorSampler
//!              │  climate   2 s   (T / RH)    │──▶ SensorSampler
//!              │  display 250 ms              │──▶ Presenter
//!              │  telemetry dataFreq minutes  │──▶ AppService
//!              └──────────────────────────────┘
//! ```
//!
//! Timestamps are `u32` milliseconds since boot; all arithmetic uses
//! `wrapping_sub` so the ~49-day rollover is harmless.

use log::debug;

// ═══════════════════════════════════════════════════════════════
//  PeriodicTimer
// ═══════════════════════════════════════════════════════════════

/// Elapsed-time gate for one cadence.
#[derive(Debug, Clone)]
pub struct PeriodicTimer {
    label: &'static str,
    period_ms: u32,
    last_ms: u32,
}

impl PeriodicTimer {
    /// A timer whose first fire is one full period after boot.
    pub const fn new(label: &'static str, period_ms: u32) -> Self {
        Self {
            label,
            period_ms,
            last_ms: 0,
        }
    }

    /// Milliseconds since the timer last fired (or was reset).
    pub fn elapsed_ms(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.last_ms)
    }

    /// True if a full period has elapsed.  Does not re-arm.
    pub fn is_due(&self, now_ms: u32) -> bool {
        self.elapsed_ms(now_ms) >= self.period_ms
    }

    /// If due, re-arm from `now_ms` and return `true`.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        if self.is_due(now_ms) {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Restart the period from `now_ms` without firing.
    pub fn reset(&mut self, now_ms: u32) {
        self.last_ms = now_ms;
    }

    /// Change the period.  The current phase is kept.
    pub fn set_period(&mut self, period_ms: u32) {
        if period_ms != self.period_ms {
            debug!("{} period {} -> {} ms", self.label, self.period_ms, period_ms);
        }
        self.period_ms = period_ms;
    }
}

/// Minutes → milliseconds, saturating.
pub fn minutes_to_ms(minutes: u16) -> u32 {
    u32::from(minutes).saturating_mul(60_000)
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
