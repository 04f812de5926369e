//! Balance-beam minigame
//!
//! Keep one knob (or two, one per axis) inside its safe zone until time
//! runs out. The drift gets stronger as the minigame progresses.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::check_secs;
use crate::config::ConfigError;
use crate::sim::{
    BalanceConfig, BalanceMeter, Clock, InputSnapshot, Lifecycle, Minigame, MinigameDescriptor,
    MinigameEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BeamMode {
    /// One meter driven by the horizontal axis
    #[default]
    HorizontalBar,
    /// Horizontal meter plus a vertical one driven by the vertical axis
    TwoBars,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceBeamConfig {
    pub mode: BeamMode,
    pub horizontal: BalanceConfig,
    pub vertical: BalanceConfig,
}

impl Default for BalanceBeamConfig {
    fn default() -> Self {
        Self {
            mode: BeamMode::HorizontalBar,
            horizontal: BalanceConfig::default(),
            vertical: BalanceConfig::default(),
        }
    }
}

impl BalanceBeamConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for meter in [&self.horizontal, &self.vertical] {
            check_secs("balance grace_time", meter.grace_time)?;
            check_secs("balance press_lerp_duration", meter.press_lerp_duration)?;
            if !(0.0..=1.0).contains(&meter.safe_half_width) {
                return Err(ConfigError::Invalid(format!(
                    "balance safe_half_width must be within [0, 1], got {}",
                    meter.safe_half_width
                )));
            }
            if meter.max_speed <= 0.0 || meter.friction < 0.0 {
                return Err(ConfigError::Invalid(
                    "balance max_speed must be positive and friction non-negative".to_string(),
                ));
            }
        }
        Ok(())
    }
}

pub struct BalanceBeam {
    lifecycle: Lifecycle,
    config: BalanceBeamConfig,
    rng: Pcg32,
    horizontal: BalanceMeter,
    vertical: Option<BalanceMeter>,
}

impl BalanceBeam {
    pub fn new(descriptor: MinigameDescriptor, config: BalanceBeamConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let horizontal = BalanceMeter::new(config.horizontal.clone(), rng.random());
        let vertical = match config.mode {
            BeamMode::HorizontalBar => None,
            BeamMode::TwoBars => Some(BalanceMeter::new(config.vertical.clone(), rng.random())),
        };
        Self {
            lifecycle: Lifecycle::new(descriptor),
            config,
            rng,
            horizontal,
            vertical,
        }
    }

    pub fn horizontal(&self) -> &BalanceMeter {
        &self.horizontal
    }

    pub fn vertical(&self) -> Option<&BalanceMeter> {
        self.vertical.as_ref()
    }

    pub fn mode(&self) -> BeamMode {
        self.config.mode
    }

    /// Lean of the character for animation, each axis in [-1, 1]
    pub fn lean(&self) -> Vec2 {
        let x = self.horizontal.position01() * 2.0 - 1.0;
        let y = self
            .vertical
            .as_ref()
            .map_or(0.0, |m| m.position01() * 2.0 - 1.0);
        Vec2::new(x, y)
    }
}

impl Minigame for BalanceBeam {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    fn reset(&mut self, _clock: &Clock) {
        let seed = self.rng.random();
        self.horizontal.reset(0.0, seed);
        if let Some(vertical) = &mut self.vertical {
            vertical.reset(0.0, self.rng.random());
        }
    }

    fn update(&mut self, clock: &Clock, input: &InputSnapshot) {
        let time_left = self.lifecycle.time_left01(clock.now());
        let progress = 1.0 - time_left;
        let dt = clock.dt();

        self.horizontal.tick(input.axis_x(), progress, dt);
        let mut failed = self.horizontal.has_failed();
        if let Some(vertical) = &mut self.vertical {
            vertical.tick(input.axis_y(), progress, dt);
            failed |= vertical.has_failed();
        }

        if failed {
            self.lifecycle.emit(MinigameEvent::BalanceFailed);
            self.lifecycle.lose();
            return;
        }
        if time_left <= 0.0 {
            self.lifecycle.won();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn beam(mode: BeamMode, horizontal: BalanceConfig) -> BalanceBeam {
        let config = BalanceBeamConfig {
            mode,
            horizontal,
            ..Default::default()
        };
        BalanceBeam::new(MinigameDescriptor::new("Beam", 8.0, "", true), config, 9)
    }

    fn still() -> BalanceConfig {
        BalanceConfig {
            start_speed: 0.0,
            auto_accel_base: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_surviving_wins_at_time_end() {
        let mut game = beam(BeamMode::HorizontalBar, still());
        let mut clock = Clock::new();
        game.start_game(&clock);
        let input = InputSnapshot::default();
        for _ in 0..(8.5 / SIM_DT) as usize {
            clock.advance(SIM_DT);
            game.tick(&clock, &input);
        }
        assert!(game.has_won());
    }

    #[test]
    fn test_pushing_out_loses() {
        let mut game = beam(BeamMode::HorizontalBar, still());
        let mut clock = Clock::new();
        game.start_game(&clock);
        let input = InputSnapshot {
            axis: Vec2::new(1.0, 0.0),
            ..Default::default()
        };
        for _ in 0..(3.0 / SIM_DT) as usize {
            clock.advance(SIM_DT);
            game.tick(&clock, &input);
        }
        assert!(game.lifecycle().is_ended());
        assert!(!game.has_won());
        let events = game.drain_events();
        assert!(events.contains(&MinigameEvent::BalanceFailed));
        assert_eq!(events.last(), Some(&MinigameEvent::Lost));
    }

    #[test]
    fn test_two_bars_uses_vertical_axis() {
        let mut game = beam(BeamMode::TwoBars, still());
        game.vertical = Some(BalanceMeter::new(still(), 4));
        let mut clock = Clock::new();
        game.start_game(&clock);
        let input = InputSnapshot {
            axis: Vec2::new(0.0, -1.0),
            ..Default::default()
        };
        for _ in 0..(3.0 / SIM_DT) as usize {
            clock.advance(SIM_DT);
            game.tick(&clock, &input);
        }
        assert!(game.lifecycle().is_ended());
        assert!(!game.has_won());
        assert!(game.lean().y < 0.0);
    }

    #[test]
    fn test_restart_recenters() {
        let mut game = beam(BeamMode::HorizontalBar, still());
        let mut clock = Clock::new();
        game.start_game(&clock);
        let input = InputSnapshot {
            axis: Vec2::new(1.0, 0.0),
            ..Default::default()
        };
        for _ in 0..60 {
            clock.advance(SIM_DT);
            game.tick(&clock, &input);
        }
        assert!(game.horizontal().position() > 0.0);
        game.start_game(&clock);
        assert_eq!(game.horizontal().position(), 0.0);
        assert_eq!(game.lean(), Vec2::ZERO);
    }

    #[test]
    fn test_validate_rejects_bad_safe_zone() {
        let mut config = BalanceBeamConfig::default();
        assert!(config.validate().is_ok());
        config.horizontal.safe_half_width = 1.5;
        assert!(config.validate().is_err());
    }
}
