//! Hall-effect water flow sensor: interrupt-fed pulse accumulator.
//!
//! The sensor's frequency in Hz is `pulses_per_litre × flow (L/min)`
//! (7.5 for the YF-S201 class).  The GPIO ISR does nothing but increment
//! an atomic counter; once per window (nominally one second) the main loop
//! swaps the counter to zero and converts the count to L/min over the
//! window's measured length.
//!
//! The swap is the only datum shared with interrupt context.  A single
//! `AtomicU32::swap` is the critical section: a pulse landing during the
//! drain is either in the returned count or in the next window, never in
//! both and never lost.

use core::sync::atomic::{AtomicU32, Ordering};

/// Lock-free pulse counter shared between the flow ISR and the main loop.
pub struct PulseAccumulator {
    count: AtomicU32,
}

impl PulseAccumulator {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// ISR side: count one falling edge.  No other work may happen here.
    #[inline]
    pub fn record_pulse(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Main-loop side: read and reset in one atomic step.
    pub fn drain(&self) -> u32 {
        self.count.swap(0, Ordering::AcqRel)
    }
}

impl Default for PulseAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Global counter fed by the flow GPIO interrupt.
/// `static` because ESP-IDF ISR callbacks cannot borrow from `main`.
pub static FLOW_PULSES: PulseAccumulator = PulseAccumulator::new();

/// Register this on the flow GPIO falling edge.
pub fn flow_isr_handler() {
    FLOW_PULSES.record_pulse();
}

/// Convert a pulse count gathered over `window_ms` to litres per minute.
pub fn flow_rate_l_per_min(pulses: u32, window_ms: u32, pulses_per_litre: f32) -> f32 {
    if window_ms == 0 || pulses_per_litre <= 0.0 {
        return 0.0;
    }
    let hz = pulses as f32 * 1000.0 / window_ms as f32;
    hz / pulses_per_litre
}
