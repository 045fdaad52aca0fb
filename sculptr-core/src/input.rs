//! Already-classified viewer input
//!
//! Key and mouse event delivery happens elsewhere; this is the per-tick
//! summary the camera integrates.
use std::collections::HashSet;

use nalgebra::Vector2;

/// A held movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
}

/// Input accumulated since the last tick
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Directions currently held
    pub held: HashSet<Movement>,
    /// Speed modifier (shift)
    pub fast: bool,
    /// Mouse-look delta in pixels, +x right, +y down
    pub look_delta: Vector2<f32>,
    /// Scroll wheel notches, positive away from the user
    pub scroll_delta: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, movement: Movement) {
        self.held.insert(movement);
    }

    pub fn release(&mut self, movement: Movement) {
        self.held.remove(&movement);
    }

    pub fn is_held(&self, movement: Movement) -> bool {
        self.held.contains(&movement)
    }

    pub fn add_look(&mut self, dx: f32, dy: f32) {
        self.look_delta += Vector2::new(dx, dy);
    }

    pub fn add_scroll(&mut self, notches: f32) {
        self.scroll_delta += notches;
    }

    /// Drop the one-shot deltas once a tick has consumed them
    pub fn end_frame(&mut self) {
        self.look_delta = Vector2::zeros();
        self.scroll_delta = 0.0;
    }

    /// `+1` when only `positive` is held, `-1` when only `negative` is, else `0`
    pub fn axis(&self, positive: Movement, negative: Movement) -> f32 {
        match (self.is_held(positive), self.is_held(negative)) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }
}
