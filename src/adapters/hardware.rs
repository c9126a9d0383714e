//! Hardware adapter: bundles the board's drivers behind the port traits.
//!
//! Each field is a driver that already implements one port; this type
//! just forwards, so `AppService` can take a single `&mut impl BoardPorts`
//! and still reach every peripheral without a double mutable borrow.

use crate::app::ports::{
    Climate, DisplayPort, EnvironmentPort, IndicatorPort, InputPort, RelayPort, ScalePort,
};
use crate::display::{Frame, Surface};
use crate::drivers::button::Level;
use crate::drivers::status_led::Colour;
use crate::error::Result;
use crate::sensors::weight::{ScaleSample, WeightChannel};
use crate::state::RelayId;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<IN, SC, EN, RL, LED, DSP> {
    pub buttons: IN,
    pub scale: SC,
    pub environment: EN,
    pub relays: RL,
    pub indicator: LED,
    pub displays: DSP,
}

// ── Sensing ───────────────────────────────────────────────────

impl<IN: InputPort, SC, EN, RL, LED, DSP> InputPort for HardwareAdapter<IN, SC, EN, RL, LED, DSP> {
    fn button_levels(&mut self) -> Result<[Level; 4]> {
        self.buttons.button_levels()
    }
}

impl<IN, SC: ScalePort, EN, RL, LED, DSP> ScalePort for HardwareAdapter<IN, SC, EN, RL, LED, DSP> {
    fn read_raw(&mut self, channel: WeightChannel) -> Result<ScaleSample> {
        self.scale.read_raw(channel)
    }
}

impl<IN, SC, EN: EnvironmentPort, RL, LED, DSP> EnvironmentPort
    for HardwareAdapter<IN, SC, EN, RL, LED, DSP>
{
    fn gas_raw(&mut self) -> Result<u16> {
        self.environment.gas_raw()
    }

    fn lux(&mut self) -> Result<f32> {
        self.environment.lux()
    }

    fn sound_raw(&mut self) -> Result<u16> {
        self.environment.sound_raw()
    }

    fn climate(&mut self) -> Result<Climate> {
        self.environment.climate()
    }
}

// ── Actuation ─────────────────────────────────────────────────

impl<IN, SC, EN, RL: RelayPort, LED, DSP> RelayPort for HardwareAdapter<IN, SC, EN, RL, LED, DSP> {
    fn set_relay(&mut self, relay: RelayId, on: bool) -> Result<()> {
        self.relays.set_relay(relay, on)
    }
}

impl<IN, SC, EN, RL, LED: IndicatorPort, DSP> IndicatorPort
    for HardwareAdapter<IN, SC, EN, RL, LED, DSP>
{
    fn set_indicator(&mut self, colour: Colour) -> Result<()> {
        self.indicator.set_indicator(colour)
    }
}

impl<IN, SC, EN, RL, LED, DSP: DisplayPort> DisplayPort
    for HardwareAdapter<IN, SC, EN, RL, LED, DSP>
{
    fn draw(&mut self, surface: Surface, frame: &Frame) -> Result<()> {
        self.displays.draw(surface, frame)
    }
}
