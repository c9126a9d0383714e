//! Mutable context threaded through every screen handler.
//!
//! `UiState` holds the active screen, the list cursor, the user-editable
//! reporting interval and the flock-weighing tally.  Handlers never touch
//! hardware; anything with a side effect outside the UI is left in
//! `action` for the service to pick up after dispatch.

use super::ScreenId;

/// Inclusive bounds for the reporting interval, in minutes.
pub const DATA_FREQ_MIN: u16 = 1;
pub const DATA_FREQ_MAX: u16 = 1_440;

/// Side effect requested by a screen handler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuAction {
    /// Re-zero both load cells.
    Tare,
    /// A flock sample was added to the tally.
    SampleAccepted { grams: f32, count: u32, avg_g: f32 },
    /// A flock sample was at or below the minimum bird weight.
    SampleRejected(f32),
    /// The reporting interval was edited.
    DataFreqChanged(u16),
}

// ---------------------------------------------------------------------------
// Weighing session
// ---------------------------------------------------------------------------

/// Running tally of accepted bird weights.  Lives for the whole session;
/// leaving and re-entering the weighing screen does not reset it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeighingSession {
    pub count: u32,
    pub avg_g: f32,
}

impl WeighingSession {
    /// Fold `grams` into the running mean if it is strictly above
    /// `min_bird_g`.  Returns whether the sample was accepted.
    pub fn accept(&mut self, grams: f32, min_bird_g: f32) -> bool {
        if grams <= min_bird_g {
            return false;
        }
        self.count = self.count.saturating_add(1);
        self.avg_g += (grams - self.avg_g) / self.count as f32;
        true
    }
}

// ---------------------------------------------------------------------------
// UiState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct UiState {
    pub screen: ScreenId,
    /// Highlighted row; always `< options` of the active screen.
    pub cursor: u8,
    pub data_freq_min: u16,
    pub session: WeighingSession,
    pub min_bird_weight_g: f32,
    action: Option<MenuAction>,
}

impl UiState {
    pub fn new(data_freq_min: u16) -> Self {
        Self {
            screen: ScreenId::LiveData,
            cursor: 0,
            data_freq_min: data_freq_min.clamp(DATA_FREQ_MIN, DATA_FREQ_MAX),
            session: WeighingSession::default(),
            min_bird_weight_g: 5.0,
            action: None,
        }
    }

    pub fn request(&mut self, action: MenuAction) {
        self.action = Some(action);
    }

    /// Take the action left by the last handler, if any.
    pub fn take_action(&mut self) -> Option<MenuAction> {
        self.action.take()
    }

    /// Step the reporting interval by `delta`, clamped to
    /// [`DATA_FREQ_MIN`]..=[`DATA_FREQ_MAX`].  Returns true if it moved.
    pub fn adjust_data_freq(&mut self, delta: i32) -> bool {
        let next = (i32::from(self.data_freq_min) + delta)
            .clamp(i32::from(DATA_FREQ_MIN), i32::from(DATA_FREQ_MAX)) as u16;
        let moved = next != self.data_freq_min;
        self.data_freq_min = next;
        moved
    }
}
