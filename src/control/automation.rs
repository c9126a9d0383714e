//! Threshold automation for the two relays.
//!
//! | Relay   | Energised when            |
//! |---------|---------------------------|
//! | Exhaust | `gas_raw > gas_on_above`  |
//! | Curtain | `lux < lux_on_below`      |
//!
//! With the default zero release bands this is plain bang-bang control:
//! the desired state is a pure function of the latest readings.  A
//! non-zero band makes the release threshold asymmetric (the relay stays
//! on until the reading clears the band), which suppresses chatter around
//! the boundary at the cost of changing when the relay drops out.
//!
//! Relays are written only on an edge: when the desired state differs
//! from the last commanded state.  A failed write leaves the recorded
//! state untouched so the edge is retried on the next cycle.

use heapless::Vec;
use log::warn;

use crate::app::ports::RelayPort;
use crate::config::SystemConfig;
use crate::state::{Readings, RelayId, RelayState};

/// A relay that was successfully commanded to a new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayTransition {
    pub relay: RelayId,
    pub on: bool,
}

/// Edge-triggered threshold controller.
#[derive(Debug, Clone)]
pub struct AutomationController {
    gas_on_above: u16,
    gas_release_band: u16,
    lux_on_below: f32,
    lux_release_band: f32,
}

impl AutomationController {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            gas_on_above: config.gas_on_above,
            gas_release_band: config.gas_release_band,
            lux_on_below: config.lux_on_below,
            lux_release_band: config.lux_release_band,
        }
    }

    /// Desired relay states for `readings`, given what is currently on.
    pub fn desired(&self, readings: &Readings, current: RelayState) -> RelayState {
        let exhaust = if current.exhaust {
            readings.gas_raw > self.gas_on_above.saturating_sub(self.gas_release_band)
        } else {
            readings.gas_raw > self.gas_on_above
        };

        let curtain = if !readings.lux_valid {
            current.curtain
        } else if current.curtain {
            readings.lux < self.lux_on_below + self.lux_release_band
        } else {
            readings.lux < self.lux_on_below
        };

        RelayState { exhaust, curtain }
    }

    /// Evaluate and write any relay whose desired state changed.
    pub fn apply(
        &self,
        readings: &Readings,
        relays: &mut RelayState,
        port: &mut impl RelayPort,
    ) -> Vec<RelayTransition, 2> {
        let want = self.desired(readings, *relays);
        let mut transitions = Vec::new();

        for relay in RelayId::ALL {
            let on = want.get(relay);
            if on == relays.get(relay) {
                continue;
            }
            match port.set_relay(relay, on) {
                Ok(()) => {
                    relays.set(relay, on);
                    // At most one transition per relay; capacity is 2.
                    let _ = transitions.push(RelayTransition { relay, on });
                }
                Err(e) => warn!("{} relay write failed: {}", relay.name(), e),
            }
        }

        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ActuatorError, Result};

    #[derive(Default)]
    struct RecordingRelays {
        writes: std::vec::Vec<(RelayId, bool)>,
        fail: bool,
    }

    impl RelayPort for RecordingRelays {
        fn set_relay(&mut self, relay: RelayId, on: bool) -> Result<()> {
            if self.fail {
                return Err(ActuatorError::RelayWriteFailed.into());
            }
            self.writes.push((relay, on));
            Ok(())
        }
    }

    fn bright(gas_raw: u16) -> Readings {
        Readings {
            gas_raw,
            lux: 500.0,
            lux_valid: true,
            ..Readings::default()
        }
    }

    #[test]
    fn exhaust_edges_once_each_way() {
        let ctl = AutomationController::new(&SystemConfig::default());
        let mut relays = RelayState::default();
        let mut port = RecordingRelays::default();

        let mut edges = std::vec::Vec::new();
        for gas in [100, 4_095, 4_095, 50] {
            edges.push(ctl.apply(&bright(gas), &mut relays, &mut port));
        }

        assert!(edges[0].is_empty());
        assert_eq!(
            edges[1].as_slice(),
            &[RelayTransition {
                relay: RelayId::Exhaust,
                on: true
            }]
        );
        assert!(edges[2].is_empty());
        assert_eq!(
            edges[3].as_slice(),
            &[RelayTransition {
                relay: RelayId::Exhaust,
                on: false
            }]
        );
        assert_eq!(
            port.writes,
            vec![(RelayId::Exhaust, true), (RelayId::Exhaust, false)]
        );
    }

    #[test]
    fn gas_threshold_is_strict() {
        let ctl = AutomationController::new(&SystemConfig::default());
        let off = RelayState::default();
        assert!(!ctl.desired(&bright(4_090), off).exhaust);
        assert!(ctl.desired(&bright(4_091), off).exhaust);
    }

    #[test]
    fn curtain_closes_in_the_dark() {
        let ctl = AutomationController::new(&SystemConfig::default());
        let off = RelayState::default();
        let dark = Readings {
            lux: 19.9,
            lux_valid: true,
            ..Readings::default()
        };
        let dusk = Readings {
            lux: 20.0,
            lux_valid: true,
            ..Readings::default()
        };
        assert!(ctl.desired(&dark, off).curtain);
        assert!(!ctl.desired(&dusk, off).curtain);
    }

    #[test]
    fn curtain_waits_for_first_light_reading() {
        let ctl = AutomationController::new(&SystemConfig::default());
        let mut relays = RelayState::default();
        let mut port = RecordingRelays::default();

        // Boot state: lux still at its zero default.
        ctl.apply(&Readings::default(), &mut relays, &mut port);
        assert!(port.writes.is_empty());

        ctl.apply(&bright(100), &mut relays, &mut port);
        assert!(port.writes.is_empty());
    }

    #[test]
    fn zero_band_is_pure_bang_bang() {
        let ctl = AutomationController::new(&SystemConfig::default());
        let on = RelayState {
            exhaust: true,
            curtain: true,
        };
        let r = Readings {
            gas_raw: 4_090,
            lux: 20.0,
            lux_valid: true,
            ..Readings::default()
        };
        assert_eq!(ctl.desired(&r, on), RelayState::default());
    }

    #[test]
    fn release_band_holds_relay_until_cleared() {
        let ctl = AutomationController::new(&SystemConfig {
            gas_release_band: 40,
            lux_release_band: 5.0,
            ..SystemConfig::default()
        });
        let on = RelayState {
            exhaust: true,
            curtain: true,
        };
        let near = Readings {
            gas_raw: 4_060,
            lux: 24.0,
            lux_valid: true,
            ..Readings::default()
        };
        assert_eq!(ctl.desired(&near, on), on);

        let clear = Readings {
            gas_raw: 4_050,
            lux: 25.0,
            lux_valid: true,
            ..Readings::default()
        };
        assert_eq!(ctl.desired(&clear, on), RelayState::default());
    }

    #[test]
    fn failed_write_is_retried_next_cycle() {
        let ctl = AutomationController::new(&SystemConfig::default());
        let mut relays = RelayState::default();
        let mut port = RecordingRelays {
            fail: true,
            ..RecordingRelays::default()
        };

        assert!(ctl.apply(&bright(4_095), &mut relays, &mut port).is_empty());
        assert!(!relays.exhaust);

        port.fail = false;
        assert_eq!(ctl.apply(&bright(4_095), &mut relays, &mut port).len(), 1);
        assert!(relays.exhaust);
    }
}
