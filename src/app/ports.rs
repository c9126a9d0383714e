//! Port traits: the boundary between the main-loop logic and the board.
//!
//! ```text
//!   Driver / mock ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Concrete drivers (`drivers::*`) and test mocks implement these traits.
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the scheduling core never touches hardware directly.
//!
//! Every call is synchronous and expected to return within the device's
//! documented bus latency.  None of them may wait for a sensor to become
//! ready; "not ready" is reported and the caller moves on.

use crate::display::{Frame, Surface};
use crate::drivers::button::Level;
use crate::drivers::status_led::Colour;
use crate::error::Result;
use crate::sensors::weight::{ScaleSample, WeightChannel};
use crate::state::RelayId;

// ───────────────────────────────────────────────────────────────
// Input port (buttons)
// ───────────────────────────────────────────────────────────────

/// Raw levels of the four pulled-up button lines, in
/// [`Button::ALL`](crate::drivers::button::Button::ALL) order.
pub trait InputPort {
    fn button_levels(&mut self) -> Result<[Level; 4]>;
}

// ───────────────────────────────────────────────────────────────
// Scale port (time-multiplexed load-cell amplifier)
// ───────────────────────────────────────────────────────────────

/// The shared weight amplifier.
///
/// Selecting a channel reconfigures gain on the shared device, so only one
/// channel can be read per cycle.
pub trait ScalePort {
    /// Read one conversion from `channel`.
    ///
    /// [`ScaleSample::Pending`] if the amplifier has no conversion ready,
    /// [`ScaleSample::Discarded`] if the read was spent switching channels.
    /// Never blocks waiting.
    fn read_raw(&mut self, channel: WeightChannel) -> Result<ScaleSample>;
}

// ───────────────────────────────────────────────────────────────
// Environment port (gas, light, sound, climate)
// ───────────────────────────────────────────────────────────────

/// Temperature / humidity pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Climate {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Fast environmental reads.
pub trait EnvironmentPort {
    /// Gas sensor raw ADC (0 – 4095).
    fn gas_raw(&mut self) -> Result<u16>;
    /// Ambient light (lux).
    fn lux(&mut self) -> Result<f32>;
    /// Sound level raw ADC.
    fn sound_raw(&mut self) -> Result<u16>;
    /// Temperature and humidity.  Slower than the others; called on its
    /// own cadence.
    fn climate(&mut self) -> Result<Climate>;
}

// ───────────────────────────────────────────────────────────────
// Actuator ports
// ───────────────────────────────────────────────────────────────

/// Relay driver lines (active HIGH = energised).
pub trait RelayPort {
    fn set_relay(&mut self, relay: RelayId, on: bool) -> Result<()>;
}

/// Bicolor status indicator.
pub trait IndicatorPort {
    fn set_indicator(&mut self, colour: Colour) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// Two independent "draw and flush" character surfaces.
pub trait DisplayPort {
    fn draw(&mut self, surface: Surface, frame: &Frame) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds since boot.  Wraps after ~49 days; every
/// consumer compares timestamps with `wrapping_sub`.
pub trait ClockPort {
    fn now_ms(&self) -> u32;
}

impl<C: ClockPort + ?Sized> ClockPort for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → diagnostic stream)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Aggregate
// ───────────────────────────────────────────────────────────────

/// Everything one main-loop iteration touches.  Implemented automatically
/// for any type that provides all the individual ports.
pub trait BoardPorts:
    InputPort + ScalePort + EnvironmentPort + RelayPort + IndicatorPort + DisplayPort
{
}

impl<T> BoardPorts for T where
    T: InputPort + ScalePort + EnvironmentPort + RelayPort + IndicatorPort + DisplayPort
{
}
