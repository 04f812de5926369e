//! 1-D balance meter physics
//!
//! A knob on a [-1, 1] track drifts away from center; player input pushes
//! back by adding velocity. Staying outside the centered safe zone for longer
//! than the grace time fails the meter.
//!
//! Two drift models:
//! - `AutoDrift`: accelerate toward whichever side the knob sits on, holding
//!   the last direction inside a small dead zone around center
//! - `NoiseQuake`: a seeded coherent noise force
//!
//! Both ramp with a curve over the minigame's progress.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::curve::Curve;
use super::noise::SmoothNoise;

/// Which drift model pushes the knob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DriftMode {
    #[default]
    AutoDrift,
    NoiseQuake,
}

/// Tuning for one meter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Half-width of the safe zone, as a fraction of the [-1, 1] track
    pub safe_half_width: f32,
    pub mode: DriftMode,

    /// Initial speed, toward a random side
    pub start_speed: f32,
    /// Auto-drift acceleration (units/s²), scaled by the curve
    pub auto_accel_base: f32,
    pub auto_accel_over_time: Curve,
    /// Band around center where the drift direction is held
    pub center_dead_zone: f32,
    pub max_speed: f32,
    /// Exponential damping rate (0 = none)
    pub friction: f32,

    /// Velocity added per second at full input
    pub input_speed: f32,

    pub quake_amplitude: f32,
    pub quake_frequency: f32,
    pub quake_over_time: Curve,

    /// Seconds allowed outside the safe zone
    pub grace_time: f32,
    /// Seconds the knob pulse takes to fade after input release
    pub press_lerp_duration: f32,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            safe_half_width: 0.35,
            mode: DriftMode::AutoDrift,
            start_speed: 0.06,
            auto_accel_base: 0.12,
            auto_accel_over_time: Curve::ease_in_out(0.3, 2.0),
            center_dead_zone: 0.02,
            max_speed: 2.0,
            friction: 0.0,
            input_speed: 1.4,
            quake_amplitude: 0.9,
            quake_frequency: 0.7,
            quake_over_time: Curve::linear(0.7, 1.2),
            grace_time: 0.15,
            press_lerp_duration: 0.15,
        }
    }
}

/// Mutable state of a meter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceState {
    /// -1..1, 0 centered
    pub position: f32,
    pub velocity: f32,
    /// Last non-zero drift direction (±1)
    pub last_dir: f32,
    /// Continuous time spent outside the safe zone
    pub outside_timer: f32,
    pub inside_safe: bool,
    /// Axis value of the previous tick, for press/release edges
    pub prev_axis: f32,
}

impl Default for BalanceState {
    fn default() -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            last_dir: 1.0,
            outside_timer: 0.0,
            inside_safe: true,
            prev_axis: 0.0,
        }
    }
}

/// A balance meter: state plus the seeded sources driving it
#[derive(Debug, Clone)]
pub struct BalanceMeter {
    config: BalanceConfig,
    state: BalanceState,
    rng: Pcg32,
    noise: SmoothNoise,
    /// Seconds ticked since reset (noise time axis)
    elapsed: f32,
    /// Knob feedback: 1 while input is held, fading to 0 after release
    press_pulse: f32,
    pulse_fading: bool,
}

impl BalanceMeter {
    pub fn new(config: BalanceConfig, seed: u64) -> Self {
        let mut meter = Self {
            config,
            state: BalanceState::default(),
            rng: Pcg32::seed_from_u64(seed),
            noise: SmoothNoise::new(seed),
            elapsed: 0.0,
            press_pulse: 0.0,
            pulse_fading: false,
        };
        meter.reset(0.0, seed);
        meter
    }

    /// Re-center (or place) the knob and reseed. Same seed, same trajectory.
    pub fn reset(&mut self, start_pos: f32, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
        self.noise = SmoothNoise::new(seed);
        self.elapsed = 0.0;
        self.press_pulse = 0.0;
        self.pulse_fading = false;

        let last_dir = if self.rng.random_bool(0.5) { -1.0 } else { 1.0 };
        self.state = BalanceState {
            position: crate::finite_or_zero(start_pos).clamp(-1.0, 1.0),
            velocity: self.config.start_speed * last_dir,
            last_dir,
            outside_timer: 0.0,
            inside_safe: true,
            prev_axis: 0.0,
        };
    }

    /// Advance by `dt` with player input `axis` in [-1, 1] and the minigame's
    /// `progress01` through its time budget.
    pub fn tick(&mut self, axis: f32, progress01: f32, dt: f32) {
        let axis = crate::finite_or_zero(axis).clamp(-1.0, 1.0);
        let progress01 = crate::finite_or_zero(progress01).clamp(0.0, 1.0);
        let dt = crate::finite_or_zero(dt).max(0.0);
        let cfg = &self.config;
        let s = &mut self.state;

        self.elapsed += dt;

        // Knob feedback edges
        let was_idle = s.prev_axis == 0.0;
        let is_idle = axis == 0.0;
        if was_idle && !is_idle {
            self.press_pulse = 1.0;
            self.pulse_fading = false;
        } else if !was_idle && is_idle {
            self.pulse_fading = true;
        }
        if self.pulse_fading && self.press_pulse > 0.0 {
            let fade = if cfg.press_lerp_duration > 0.0 {
                dt / cfg.press_lerp_duration
            } else {
                1.0
            };
            self.press_pulse = (self.press_pulse - fade).max(0.0);
        }

        // Player input adds velocity, not acceleration
        s.velocity += cfg.input_speed * axis * dt;

        match cfg.mode {
            DriftMode::AutoDrift => {
                let dir = if s.position.abs() < cfg.center_dead_zone {
                    s.last_dir
                } else {
                    s.position.signum()
                };
                s.last_dir = dir;
                let accel =
                    cfg.auto_accel_base * cfg.auto_accel_over_time.evaluate(progress01).max(0.0);
                s.velocity += dir * accel * dt;
            }
            DriftMode::NoiseQuake => {
                let t = self.elapsed * cfg.quake_frequency;
                let force = self.noise.sample(t)
                    * cfg.quake_amplitude
                    * cfg.quake_over_time.evaluate(progress01).max(0.05);
                s.velocity += force * dt;
            }
        }

        if cfg.friction > 0.0 {
            s.velocity *= (-cfg.friction * dt).exp();
        }
        s.velocity = crate::finite_or_zero(s.velocity).clamp(-cfg.max_speed, cfg.max_speed);

        s.position = (s.position + s.velocity * dt).clamp(-1.0, 1.0);

        let half_safe = cfg.safe_half_width.clamp(0.0, 1.0);
        s.inside_safe = s.position.abs() <= half_safe;
        s.outside_timer = if s.inside_safe { 0.0 } else { s.outside_timer + dt };
        s.prev_axis = axis;
    }

    /// Outside the safe zone for at least the grace time
    pub fn has_failed(&self) -> bool {
        !self.state.inside_safe && self.state.outside_timer >= self.config.grace_time
    }

    pub fn is_inside_safe(&self) -> bool {
        self.state.inside_safe
    }

    pub fn position(&self) -> f32 {
        self.state.position
    }

    /// Position remapped to [0, 1] for display
    pub fn position01(&self) -> f32 {
        crate::inverse_lerp(-1.0, 1.0, self.state.position)
    }

    pub fn velocity(&self) -> f32 {
        self.state.velocity
    }

    pub fn state(&self) -> &BalanceState {
        &self.state
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    /// Knob press feedback intensity in [0, 1]
    pub fn press_pulse01(&self) -> f32 {
        self.press_pulse
    }
}
