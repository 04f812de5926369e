//! Sack-race minigame
//!
//! Alternate Left and Right to hop toward the goal. Each correct press while
//! standing launches a jump; the world scrolls only while airborne. Pressing
//! the wrong key while standing is a mistake, and too many mistakes lose.
//!
//! The body is a minimal ballistic integrator: only its velocity and ground
//! contact drive the jump state machine.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::check_secs;
use crate::config::ConfigError;
use crate::sim::{
    Clock, Direction, InputSnapshot, Lifecycle, Minigame, MinigameDescriptor, MinigameEvent,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SackRaceConfig {
    pub max_errors: u32,
    /// Vertical launch speed (units/s)
    pub jump_speed: f32,
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// World scroll speed while airborne (units/s)
    pub scroll_speed: f32,
    /// Distance to the finish line (units)
    pub goal_distance: f32,
    /// Speed below which a grounded body counts as landed
    pub landing_speed: f32,
}

impl Default for SackRaceConfig {
    fn default() -> Self {
        Self {
            max_errors: 3,
            jump_speed: 4.0,
            gravity: 9.8,
            scroll_speed: 2.0,
            goal_distance: 12.0,
            landing_speed: 0.1,
        }
    }
}

impl SackRaceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_errors == 0 {
            return Err(ConfigError::Invalid(
                "sack race max_errors must be at least 1".to_string(),
            ));
        }
        if self.jump_speed <= 0.0 || self.gravity <= 0.0 {
            return Err(ConfigError::Invalid(
                "sack race jump_speed and gravity must be positive".to_string(),
            ));
        }
        check_secs("scroll_speed", self.scroll_speed)?;
        check_secs("goal_distance", self.goal_distance)?;
        check_secs("landing_speed", self.landing_speed)
    }
}

/// Ballistic body resting on a flat ground at y = 0
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub grounded: bool,
}

impl Body {
    fn grounded() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            grounded: true,
        }
    }

    fn launch(&mut self, speed: f32) {
        self.velocity.y = speed;
        self.grounded = false;
    }

    fn step(&mut self, gravity: f32, dt: f32) {
        if self.grounded {
            return;
        }
        self.velocity.y -= gravity * dt;
        self.position += self.velocity * dt;
        if self.position.y <= 0.0 {
            self.position.y = 0.0;
            self.velocity = Vec2::ZERO;
            self.grounded = true;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpState {
    /// Standing, waiting for the next key
    Waiting,
    /// Rising
    Jumping,
    /// Coming down
    Falling,
}

pub struct SackRace {
    lifecycle: Lifecycle,
    config: SackRaceConfig,
    body: Body,
    state: JumpState,
    expected: Direction,
    errors: u32,
    distance: f32,
}

impl SackRace {
    pub fn new(descriptor: MinigameDescriptor, config: SackRaceConfig) -> Self {
        Self {
            lifecycle: Lifecycle::new(descriptor),
            config,
            body: Body::grounded(),
            state: JumpState::Waiting,
            expected: Direction::Left,
            errors: 0,
            distance: 0.0,
        }
    }

    pub fn state(&self) -> JumpState {
        self.state
    }

    /// Key that launches the next jump
    pub fn expected(&self) -> Direction {
        self.expected
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Progress toward the goal, in [0, 1]
    pub fn progress01(&self) -> f32 {
        crate::inverse_lerp(0.0, self.config.goal_distance, self.distance)
    }

    /// A press while waiting: the expected direction jumps, anything else is a mistake
    fn handle_press(&mut self, pressed: Option<Direction>) {
        if self.state != JumpState::Waiting {
            return;
        }
        if pressed == Some(self.expected) {
            self.body.launch(self.config.jump_speed);
            self.state = JumpState::Jumping;
            self.expected = match self.expected {
                Direction::Left => Direction::Right,
                _ => Direction::Left,
            };
            self.lifecycle.emit(MinigameEvent::Jumped);
            return;
        }

        self.errors += 1;
        log::debug!("Sack race mistake {}/{}", self.errors, self.config.max_errors);
        self.lifecycle.emit(MinigameEvent::Mistake { errors: self.errors });
        if self.errors >= self.config.max_errors {
            self.lifecycle.lose();
        }
    }
}

impl Minigame for SackRace {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    fn reset(&mut self, _clock: &Clock) {
        self.body = Body::grounded();
        self.state = JumpState::Waiting;
        self.expected = Direction::Left;
        self.errors = 0;
        self.distance = 0.0;
    }

    fn update(&mut self, clock: &Clock, input: &InputSnapshot) {
        let dt = clock.dt();

        if input.direction.is_some() || input.any_pressed {
            self.handle_press(input.direction);
            if !self.lifecycle.is_playing() {
                return;
            }
        }

        self.body.step(self.config.gravity, dt);
        if !self.body.grounded {
            self.distance += self.config.scroll_speed * dt;
        }

        match self.state {
            JumpState::Jumping if self.body.velocity.y < 0.0 => {
                self.state = JumpState::Falling;
            }
            // Touching down from the rise directly counts as falling
            JumpState::Jumping | JumpState::Falling
                if self.body.grounded && self.body.velocity.length() < self.config.landing_speed =>
            {
                self.state = JumpState::Waiting;
                self.lifecycle.emit(MinigameEvent::Landed);
            }
            _ => {}
        }

        if self.distance >= self.config.goal_distance {
            self.lifecycle.won();
        } else if self.lifecycle.time_left01(clock.now()) <= 0.0 {
            self.lifecycle.lose();
        }
    }
}
