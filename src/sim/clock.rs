//! Timebase for the simulation
//!
//! The clock is passed explicitly into every tick. Pausing freezes the time
//! scale, so game time and the per-tick delta both stop advancing.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS};

/// Game time source: elapsed time and delta-time of the current tick
#[derive(Debug, Clone)]
pub struct Clock {
    /// Scaled game time in seconds
    time: f64,
    /// Scaled delta of the last advance
    dt: f32,
    /// 1.0 while running, 0.0 while paused
    time_scale: f32,
    /// Scale to restore on resume
    saved_scale: f32,
    /// Number of advances since creation
    frame: u64,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self::at(0.0)
    }

    /// Create a clock starting at the given game time
    pub fn at(time: f64) -> Self {
        Self {
            time,
            dt: 0.0,
            time_scale: 1.0,
            saved_scale: 1.0,
            frame: 0,
        }
    }

    /// Advance by an unscaled delta. Negative or non-finite deltas count as 0.
    pub fn advance(&mut self, real_dt: f32) {
        let real_dt = crate::finite_or_zero(real_dt).max(0.0);
        self.dt = real_dt * self.time_scale;
        self.time += self.dt as f64;
        self.frame += 1;
    }

    /// Current game time (seconds)
    pub fn now(&self) -> f64 {
        self.time
    }

    /// Delta of the current tick (0 while paused)
    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn is_paused(&self) -> bool {
        self.time_scale == 0.0
    }

    /// Freeze time, remembering the running scale
    pub fn pause(&mut self) {
        if self.is_paused() {
            return;
        }
        self.saved_scale = self.time_scale;
        self.time_scale = 0.0;
        self.dt = 0.0;
    }

    /// Restore the scale saved by `pause`
    pub fn resume(&mut self) {
        if !self.is_paused() {
            return;
        }
        self.time_scale = self.saved_scale;
    }
}

/// Fixed timestep accumulator for the host frame loop
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        let frame_dt = crate::finite_or_zero(frame_dt).clamp(0.0, MAX_FRAME_DT);
        self.accumulator += frame_dt;
        let mut steps = 0;
        while self.accumulator >= self.dt && steps < MAX_SUBSTEPS {
            self.accumulator -= self.dt;
            steps += 1;
        }
        // Drop what the substep cap could not consume
        if steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(self.dt);
        }
        steps
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }
}
