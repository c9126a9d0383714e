//! Concrete screen handlers and table builder.
//!
//! ```text
//!  LIVE DATA ──[Select]──▶ ROOT ──[Select: Weigh]────▶ WEIGHING
//!      ▲                   │  │ ──[Select: Settings]─▶ SETTINGS
//!      │                   │  │ ──[Select: Info]─────▶ INFO
//!      └──[Back / Tare]────┘  ◀──[Back]── (all three)
//! ```

use super::context::{MenuAction, UiState};
use super::{ScreenDescriptor, ScreenId, Step};
use crate::drivers::button::Button;
use crate::state::Readings;

/// Root menu rows, in cursor order.
pub const ROOT_ITEMS: [&str; 4] = ["Weigh birds", "Tare scales", "Settings", "Info"];

const ROOT_WEIGH: u8 = 0;
const ROOT_TARE: u8 = 1;
const ROOT_SETTINGS: u8 = 2;
const ROOT_INFO: u8 = 3;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the screen table.  Called once at startup.
pub fn build_screen_table() -> [ScreenDescriptor; ScreenId::COUNT] {
    [
        // Index 0: LiveData
        ScreenDescriptor {
            id: ScreenId::LiveData,
            name: "LiveData",
            options: 0,
            on_button: live_data_button,
        },
        // Index 1: Root
        ScreenDescriptor {
            id: ScreenId::Root,
            name: "Root",
            options: ROOT_ITEMS.len() as u8,
            on_button: root_button,
        },
        // Index 2: Weighing
        ScreenDescriptor {
            id: ScreenId::Weighing,
            name: "Weighing",
            options: 0,
            on_button: weighing_button,
        },
        // Index 3: Settings
        ScreenDescriptor {
            id: ScreenId::Settings,
            name: "Settings",
            options: 0,
            on_button: settings_button,
        },
        // Index 4: Info
        ScreenDescriptor {
            id: ScreenId::Info,
            name: "Info",
            options: 0,
            on_button: info_button,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  LIVE DATA
// ═══════════════════════════════════════════════════════════════════════════

fn live_data_button(_ui: &mut UiState, button: Button, _readings: &Readings) -> Step {
    match button {
        Button::Select => Step::Goto(ScreenId::Root),
        _ => Step::Ignore,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ROOT
// ═══════════════════════════════════════════════════════════════════════════

fn root_button(ui: &mut UiState, button: Button, _readings: &Readings) -> Step {
    let n = ROOT_ITEMS.len() as u8;
    match button {
        Button::Up => {
            ui.cursor = (ui.cursor + n - 1) % n;
            Step::Update
        }
        Button::Down => {
            ui.cursor = (ui.cursor + 1) % n;
            Step::Update
        }
        Button::Select => match ui.cursor {
            ROOT_WEIGH => Step::Goto(ScreenId::Weighing),
            ROOT_TARE => {
                ui.request(MenuAction::Tare);
                Step::Goto(ScreenId::LiveData)
            }
            ROOT_SETTINGS => Step::Goto(ScreenId::Settings),
            ROOT_INFO => Step::Goto(ScreenId::Info),
            _ => Step::Ignore,
        },
        Button::Back => Step::Goto(ScreenId::LiveData),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  WEIGHING
// ═══════════════════════════════════════════════════════════════════════════

fn weighing_button(ui: &mut UiState, button: Button, readings: &Readings) -> Step {
    match button {
        Button::Select => {
            let grams = readings.flock_weight_g;
            if ui.session.accept(grams, ui.min_bird_weight_g) {
                ui.request(MenuAction::SampleAccepted {
                    grams,
                    count: ui.session.count,
                    avg_g: ui.session.avg_g,
                });
                Step::Update
            } else {
                ui.request(MenuAction::SampleRejected(grams));
                Step::Ignore
            }
        }
        Button::Back => Step::Goto(ScreenId::Root),
        Button::Up | Button::Down => Step::Ignore,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  SETTINGS
// ═══════════════════════════════════════════════════════════════════════════

fn settings_button(ui: &mut UiState, button: Button, _readings: &Readings) -> Step {
    let delta = match button {
        Button::Up => 1,
        Button::Down => -1,
        Button::Select | Button::Back => return Step::Goto(ScreenId::Root),
    };
    if ui.adjust_data_freq(delta) {
        ui.request(MenuAction::DataFreqChanged(ui.data_freq_min));
        Step::Update
    } else {
        Step::Ignore
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  INFO
// ═══════════════════════════════════════════════════════════════════════════

fn info_button(_ui: &mut UiState, button: Button, _readings: &Readings) -> Step {
    match button {
        Button::Back => Step::Goto(ScreenId::Root),
        _ => Step::Ignore,
    }
}
