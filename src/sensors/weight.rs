//! Load-cell helpers: channel identity, the feed noise gate, and tare.
//!
//! Taring is an incremental job rather than a blocking call.  Each
//! [`Tare::step`] polls the amplifier once; the startup path loops on it
//! with a delay, while a tare requested from the menu is advanced one step
//! per main-loop iteration so inputs and relays keep being serviced.

use crate::app::ports::ScalePort;
use crate::error::{Error, SensorError};

/// Which load cell an amplifier read refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightChannel {
    /// Channel A: feed hopper.
    Feed,
    /// Channel B: bird platform.
    Flock,
}

/// Outcome of one amplifier poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleSample {
    /// A conversion for the requested channel (raw counts).
    Ready(i32),
    /// A conversion was clocked out but belonged to the other channel; the
    /// amplifier is now armed for the requested one.
    Discarded,
    /// No conversion ready yet.
    Pending,
}

/// Accept `candidate` only if it moved more than `noise_g` from `previous`.
pub fn passes_noise_gate(previous: f32, candidate: f32, noise_g: f32) -> bool {
    (candidate - previous).abs() > noise_g
}

// ═══════════════════════════════════════════════════════════════
//  Tare
// ═══════════════════════════════════════════════════════════════

/// Outcome of one [`Tare::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TareStatus {
    /// A sample was taken (or a channel switch consumed the conversion).
    Sampling,
    /// The amplifier had nothing ready; `polls` counts consecutive unready
    /// polls since the last conversion.
    NotReady { polls: u32 },
    /// Both channels averaged.
    Complete { feed: i32, flock: i32 },
    /// The poll budget ran out.
    Failed,
}

/// Averages `samples` ready reads on the feed channel, then on the flock
/// channel.
#[derive(Debug, Clone)]
pub struct Tare {
    channel: WeightChannel,
    samples: u32,
    taken: u32,
    sum: i64,
    feed_offset: i32,
    unready_streak: u32,
    total_polls: u32,
    /// `None` = wait forever (startup).
    budget: Option<u32>,
}

impl Tare {
    /// A tare that keeps polling until the amplifier answers.
    pub fn unbounded(samples: u32) -> Self {
        Self::with_budget(samples, None)
    }

    /// A tare that gives up after `budget` polls.
    pub fn bounded(samples: u32, budget: u32) -> Self {
        Self::with_budget(samples, Some(budget))
    }

    fn with_budget(samples: u32, budget: Option<u32>) -> Self {
        Self {
            channel: WeightChannel::Feed,
            samples: samples.max(1),
            taken: 0,
            sum: 0,
            feed_offset: 0,
            unready_streak: 0,
            total_polls: 0,
            budget,
        }
    }

    /// Channel currently being averaged.
    pub fn channel(&self) -> WeightChannel {
        self.channel
    }

    fn unready(&mut self) -> TareStatus {
        self.unready_streak = self.unready_streak.saturating_add(1);
        TareStatus::NotReady {
            polls: self.unready_streak,
        }
    }

    /// Poll the amplifier once.
    pub fn step(&mut self, scale: &mut impl ScalePort) -> TareStatus {
        self.total_polls = self.total_polls.saturating_add(1);
        if self.budget.is_some_and(|b| self.total_polls > b) {
            return TareStatus::Failed;
        }

        let raw = match scale.read_raw(self.channel) {
            Ok(ScaleSample::Ready(raw)) => raw,
            Ok(ScaleSample::Discarded) => {
                self.unready_streak = 0;
                return TareStatus::Sampling;
            }
            Ok(ScaleSample::Pending) | Err(Error::Sensor(SensorError::NotReady)) => {
                return self.unready();
            }
            Err(e) => {
                log::warn!("tare: {:?} read failed: {}", self.channel, e);
                return self.unready();
            }
        };
        self.unready_streak = 0;

        self.sum += i64::from(raw);
        self.taken += 1;
        if self.taken < self.samples {
            return TareStatus::Sampling;
        }

        let mean = (self.sum / i64::from(self.samples)) as i32;
        self.sum = 0;
        self.taken = 0;
        match self.channel {
            WeightChannel::Feed => {
                self.feed_offset = mean;
                self.channel = WeightChannel::Flock;
                TareStatus::Sampling
            }
            WeightChannel::Flock => TareStatus::Complete {
                feed: self.feed_offset,
                flock: mean,
            },
        }
    }
}
