//! The decryption mini-game that gates document pickup.
//!
//! The player mashes keys to fill a progress bar. Halfway through, and again at the end, an
//! authentication error interrupts and a timing slider has to be stopped on the center of its
//! track. Running out of time fails the whole level.

use std::time::Duration;

use strum_macros::{Display, IntoStaticStr};
use tracing::{debug, info};

use crate::config::MiniGameTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum MiniGamePhase {
    Typing,
    /// Authentication error shown before the first slider.
    Checkpoint1,
    Slider1,
    /// Authentication error shown before the second slider.
    Checkpoint2,
    Slider2,
    Complete,
    Failed,
}

impl MiniGamePhase {
    pub fn is_slider(self) -> bool {
        matches!(self, MiniGamePhase::Slider1 | MiniGamePhase::Slider2)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, MiniGamePhase::Complete | MiniGamePhase::Failed)
    }
}

/// Result of confirming while a slider is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderOutcome {
    Hit,
    Miss,
}

/// A marker bouncing between `0` and the track width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slider {
    pub position: f32,
    pub direction: f32,
}

impl Slider {
    fn reset(&mut self) {
        self.position = 0.0;
        self.direction = 1.0;
    }

    fn advance(&mut self, distance: f32, width: f32) {
        self.position += distance * self.direction;
        if self.position >= width {
            self.position = width;
            self.direction = -1.0;
        } else if self.position <= 0.0 {
            self.position = 0.0;
            self.direction = 1.0;
        }
    }
}

/// One run of the mini-game for a single document.
#[derive(Debug, Clone)]
pub struct MiniGame {
    document: usize,
    text: String,
    phase: MiniGamePhase,
    chars_typed: u32,
    checkpoint1_passed: bool,
    deadline: Duration,
    interstitial_until: Option<Duration>,
    slider: Slider,
    miss_until: Option<Duration>,
    tuning: MiniGameTuning,
}

impl MiniGame {
    pub fn new(document: usize, text: impl Into<String>, tuning: MiniGameTuning, now: Duration) -> Self {
        info!(document, "Mini-game started");
        Self {
            document,
            text: text.into(),
            phase: MiniGamePhase::Typing,
            chars_typed: 0,
            checkpoint1_passed: false,
            deadline: now + tuning.time_limit,
            interstitial_until: None,
            slider: Slider {
                position: 0.0,
                direction: 1.0,
            },
            miss_until: None,
            tuning,
        }
    }

    pub fn document(&self) -> usize {
        self.document
    }

    pub fn phase(&self) -> MiniGamePhase {
        self.phase
    }

    pub fn chars_typed(&self) -> u32 {
        self.chars_typed
    }

    pub fn slider(&self) -> Slider {
        self.slider
    }

    /// Whether the "missed" message is currently showing.
    pub fn is_showing_miss(&self) -> bool {
        self.miss_until.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn remaining(&self, now: Duration) -> Duration {
        self.deadline.saturating_sub(now)
    }

    /// Raw progress, `chars_typed / required`, clamped to `[0, 1]`.
    pub fn progress(&self) -> f32 {
        (self.chars_typed as f32 / self.tuning.chars_required as f32).clamp(0.0, 1.0)
    }

    /// Progress as shown to the player: held at one half until the first slider is beaten.
    pub fn display_progress(&self) -> f32 {
        if self.checkpoint1_passed {
            self.progress()
        } else {
            self.progress().min(0.5)
        }
    }

    /// The decrypted prefix of the document text.
    pub fn revealed_text(&self) -> &str {
        let total = self.text.chars().count();
        let shown = (total as f32 * self.display_progress()).floor() as usize;
        match self.text.char_indices().nth(shown) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }

    /// Counts typed characters. Ignored outside the typing phase.
    pub fn type_chars(&mut self, count: u32, now: Duration) {
        if self.expire(now) || self.phase != MiniGamePhase::Typing || count == 0 {
            return;
        }
        for _ in 0..count {
            self.chars_typed += 1;
            if !self.checkpoint1_passed && self.chars_typed * 2 >= self.tuning.chars_required {
                self.enter_checkpoint(MiniGamePhase::Checkpoint1, now);
                return;
            }
            if self.checkpoint1_passed && self.chars_typed >= self.tuning.chars_required {
                self.enter_checkpoint(MiniGamePhase::Checkpoint2, now);
                return;
            }
        }
    }

    /// Fails the run once `now` reaches the deadline. Returns whether the run has failed.
    fn expire(&mut self, now: Duration) -> bool {
        if self.phase == MiniGamePhase::Failed {
            return true;
        }
        if self.phase != MiniGamePhase::Complete && now >= self.deadline {
            info!(document = self.document, phase = %self.phase, "Mini-game timed out");
            self.phase = MiniGamePhase::Failed;
            return true;
        }
        false
    }

    fn enter_checkpoint(&mut self, phase: MiniGamePhase, now: Duration) {
        debug!(document = self.document, chars = self.chars_typed, phase = %phase, "Mini-game checkpoint");
        self.phase = phase;
        self.interstitial_until = Some(now + self.tuning.interstitial);
    }

    /// Stops the slider. Returns `None` when no slider is accepting input, including once the
    /// time limit has passed.
    pub fn confirm(&mut self, now: Duration) -> Option<SliderOutcome> {
        if self.expire(now) || !self.phase.is_slider() || self.miss_until.is_some() {
            return None;
        }

        let center = self.tuning.track_width / 2.0;
        if (self.slider.position - center).abs() <= self.tuning.tolerance {
            self.phase = match self.phase {
                MiniGamePhase::Slider1 => {
                    self.checkpoint1_passed = true;
                    MiniGamePhase::Typing
                }
                _ => {
                    info!(document = self.document, "Mini-game complete");
                    MiniGamePhase::Complete
                }
            };
            Some(SliderOutcome::Hit)
        } else {
            debug!(document = self.document, position = self.slider.position, "Slider missed");
            self.miss_until = Some(now + self.tuning.miss_display);
            Some(SliderOutcome::Miss)
        }
    }

    /// Advances timers and the slider marker.
    pub fn update(&mut self, now: Duration, dt: Duration) {
        if self.expire(now) || self.phase.is_terminal() {
            return;
        }

        match self.phase {
            MiniGamePhase::Checkpoint1 | MiniGamePhase::Checkpoint2 => {
                if self.interstitial_until.is_some_and(|until| now >= until) {
                    self.interstitial_until = None;
                    self.slider.reset();
                    self.phase = if self.phase == MiniGamePhase::Checkpoint1 {
                        MiniGamePhase::Slider1
                    } else {
                        MiniGamePhase::Slider2
                    };
                }
            }
            MiniGamePhase::Slider1 | MiniGamePhase::Slider2 => match self.miss_until {
                Some(until) if now >= until => {
                    self.miss_until = None;
                    self.slider.reset();
                }
                Some(_) => {}
                None => self
                    .slider
                    .advance(self.tuning.slider_speed * dt.as_secs_f32(), self.tuning.track_width),
            },
            _ => {}
        }
    }
}
