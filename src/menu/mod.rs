//! Menu state machine: function-pointer screen table.
//!
//! Same shape as a classic embedded FSM table, driven by button events
//! instead of ticks:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ScreenTable                                                │
//! │  ┌───────────┬─────────┬──────────────────────────────────┐ │
//! │  │ ScreenId  │ options │ on_button(ctx, button, readings) │ │
//! │  ├───────────┼─────────┼──────────────────────────────────┤ │
//! │  │ LiveData  │ 0       │ Select → Root                    │ │
//! │  │ Root      │ 4       │ Up/Down wrap · Select · Back     │ │
//! │  │ Weighing  │ 0       │ Select accept · Back → Root      │ │
//! │  │ Settings  │ 0       │ Up/Down edit · Select/Back → Root│ │
//! │  │ Info      │ 0       │ Back → Root                      │ │
//! │  └───────────┴─────────┴──────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each handler is the row for (screen × button) and returns a [`Step`]:
//! ignore the press, record that it mutated the context, or move to
//! another screen.  The engine owns the cross-cutting rules: the cursor is
//! reset to 0 on every screen change (so it is always inside the new
//! screen's option range) and every non-ignored press requests a redraw.

pub mod context;
pub mod screens;

use context::UiState;
use log::info;
use serde::Serialize;

use crate::drivers::button::Button;
use crate::state::Readings;

// ---------------------------------------------------------------------------
// Screen identity
// ---------------------------------------------------------------------------

/// Every screen the primary display can show.
/// Must stay in sync with the table built in [`screens::build_screen_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum ScreenId {
    LiveData = 0,
    Root = 1,
    Weighing = 2,
    Settings = 3,
    Info = 4,
}

impl ScreenId {
    /// Total number of screens: sizes the table array.
    pub const COUNT: usize = 5;
}

// ---------------------------------------------------------------------------
// Handler types
// ---------------------------------------------------------------------------

/// Result of one (screen × button) handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The button means nothing on this screen.
    Ignore,
    /// The context was mutated; stay on this screen.
    Update,
    /// Move to another screen.
    Goto(ScreenId),
}

/// Signature for a screen's button handler.
pub type ButtonHandlerFn = fn(&mut UiState, Button, &Readings) -> Step;

/// Static descriptor for a single screen.
pub struct ScreenDescriptor {
    pub id: ScreenId,
    pub name: &'static str,
    /// Number of selectable rows (0 for non-list screens).
    pub options: u8,
    pub on_button: ButtonHandlerFn,
}

/// What a dispatched press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub step: Step,
    pub from: ScreenId,
}

impl Dispatch {
    /// The press changed something visible.
    pub fn changed(&self) -> bool {
        self.step != Step::Ignore
    }

    /// The screen that became active, if any.
    pub fn entered(&self) -> Option<ScreenId> {
        match self.step {
            Step::Goto(to) if to != self.from => Some(to),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The menu engine.  Stateless apart from its table; the active screen and
/// all session data live in [`UiState`].
pub struct Menu {
    table: [ScreenDescriptor; ScreenId::COUNT],
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

impl Menu {
    pub fn new() -> Self {
        Self {
            table: screens::build_screen_table(),
        }
    }

    pub fn descriptor(&self, id: ScreenId) -> &ScreenDescriptor {
        &self.table[id as usize]
    }

    /// Route one debounced press to the active screen's handler.
    pub fn dispatch(&self, ui: &mut UiState, button: Button, readings: &Readings) -> Dispatch {
        let from = ui.screen;
        let step = (self.descriptor(from).on_button)(ui, button, readings);

        if let Step::Goto(to) = step {
            info!(
                "Menu: {} -> {}",
                self.descriptor(from).name,
                self.descriptor(to).name
            );
            ui.screen = to;
            ui.cursor = 0;
        }

        debug_assert!(
            ui.cursor < self.descriptor(ui.screen).options.max(1),
            "cursor {} outside {}",
            ui.cursor,
            self.descriptor(ui.screen).name
        );

        Dispatch { step, from }
    }
}
