//! Per-tick input snapshots.
//!
//! Whatever reads the keyboard or gamepad boils its state down to an [`InputSnapshot`] once
//! per tick; the session only ever sees snapshots.

use bitflags::bitflags;
use glam::Vec2;

bitflags! {
    /// Buttons held down this tick.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        const SPRINT = 1 << 0;
        /// Interact with documents, doors and puzzle points; also stops the mini-game slider.
        const INTERACT = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    /// Raw movement axes, each in `[-1, 1]`.
    pub movement: Vec2,
    pub buttons: Buttons,
    /// Character keys pressed since the previous snapshot, for the mini-game.
    pub keystrokes: u32,
}

impl InputSnapshot {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn moving(movement: Vec2) -> Self {
        Self {
            movement,
            ..Self::default()
        }
    }

    pub fn with_buttons(mut self, buttons: Buttons) -> Self {
        self.buttons |= buttons;
        self
    }

    pub fn with_keystrokes(mut self, keystrokes: u32) -> Self {
        self.keystrokes = keystrokes;
        self
    }

    /// Movement snapped to the eight directions and normalized.
    ///
    /// Each axis becomes `-1`, `0` or `1` depending on which side of the dead zone it is on.
    pub fn direction(&self, dead_zone: f32) -> Vec2 {
        let snap = |axis: f32| {
            if axis > dead_zone {
                1.0
            } else if axis < -dead_zone {
                -1.0
            } else {
                0.0
            }
        };
        Vec2::new(snap(self.movement.x), snap(self.movement.y)).normalize_or_zero()
    }
}

/// Turns held buttons into press edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputTracker {
    previous: Buttons,
}

impl InputTracker {
    /// Buttons that went down since the previous call.
    pub fn pressed(&mut self, snapshot: &InputSnapshot) -> Buttons {
        let pressed = snapshot.buttons - self.previous;
        self.previous = snapshot.buttons;
        pressed
    }

    pub fn reset(&mut self) {
        self.previous = Buttons::empty();
    }
}
