//! Suspendable waits
//!
//! A wait is a durable countdown advanced by the tick delta. Nothing advances
//! it while the game is paused, so resuming continues the remaining wait
//! instead of restarting it.

use serde::{Deserialize, Serialize};

/// A countdown in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delay {
    remaining: f32,
}

impl Delay {
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: crate::finite_or_zero(seconds).max(0.0),
        }
    }

    /// Consume `dt`. Returns true once the wait has elapsed.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= crate::finite_or_zero(dt).max(0.0);
        self.remaining <= 0.0
    }

    /// Seconds still to wait (0 once elapsed)
    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }
}

/// A multi-step sequence: the current stage plus the wait before it runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Routine<S> {
    stage: S,
    wait: Delay,
}

impl<S: Copy> Routine<S> {
    /// Run `stage` after `seconds`
    pub fn new(stage: S, seconds: f32) -> Self {
        Self {
            stage,
            wait: Delay::new(seconds),
        }
    }

    /// Advance the wait. Returns the stage whose wait just elapsed.
    /// The stage keeps firing on every tick until `then` schedules the next one.
    pub fn tick(&mut self, dt: f32) -> Option<S> {
        if self.wait.tick(dt) { Some(self.stage) } else { None }
    }

    /// Schedule the continuation
    pub fn then(&mut self, stage: S, seconds: f32) {
        self.stage = stage;
        self.wait = Delay::new(seconds);
    }

    pub fn stage(&self) -> S {
        self.stage
    }

    pub fn remaining(&self) -> f32 {
        self.wait.remaining()
    }
}
