//! Hopscotch minigame
//!
//! Hold confirm to charge the throw, release to throw the stone. It lands
//! after a fixed flight time; landing close enough to the target square wins.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{check_range, check_secs};
use crate::config::ConfigError;
use crate::sim::pick::range_f32;
use crate::sim::{
    Clock, Curve, InputSnapshot, Lifecycle, Minigame, MinigameDescriptor, MinigameEvent,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HopscotchConfig {
    /// Charge gained per second of holding
    pub force_speed: f32,
    /// Range the target force is drawn from
    pub target_min: f32,
    pub target_max: f32,
    /// Accepted distance from the target
    pub margin: f32,
    /// Seconds from release to landing
    pub time_to_flight: f32,
    /// Stone travel over normalized flight time
    pub flight_curve: Curve,
}

impl Default for HopscotchConfig {
    fn default() -> Self {
        Self {
            force_speed: 0.8,
            target_min: 0.35,
            target_max: 0.9,
            margin: 0.08,
            time_to_flight: 1.0,
            flight_curve: Curve::ease_in_out(0.0, 1.0),
        }
    }
}

impl HopscotchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("hopscotch target", self.target_min, self.target_max)?;
        if self.target_max > 1.0 {
            return Err(ConfigError::Invalid(format!(
                "hopscotch target_max must be at most 1, got {}",
                self.target_max
            )));
        }
        if self.force_speed <= 0.0 {
            return Err(ConfigError::Invalid(
                "hopscotch force_speed must be positive".to_string(),
            ));
        }
        check_secs("hopscotch margin", self.margin)?;
        check_secs("time_to_flight", self.time_to_flight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ThrowState {
    Aiming,
    Charging,
    Flying { elapsed: f32 },
    Landed,
}

pub struct Hopscotch {
    lifecycle: Lifecycle,
    config: HopscotchConfig,
    rng: Pcg32,
    state: ThrowState,
    force: f32,
    target: f32,
}

impl Hopscotch {
    pub fn new(descriptor: MinigameDescriptor, config: HopscotchConfig, seed: u64) -> Self {
        Self {
            lifecycle: Lifecycle::new(descriptor),
            config,
            rng: Pcg32::seed_from_u64(seed),
            state: ThrowState::Aiming,
            force: 0.0,
            target: 0.0,
        }
    }

    pub fn state(&self) -> ThrowState {
        self.state
    }

    /// Charged force, in [0, 1]
    pub fn force(&self) -> f32 {
        self.force
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Distance the stone has travelled, in [0, force]
    pub fn stone_distance(&self) -> f32 {
        match self.state {
            ThrowState::Aiming | ThrowState::Charging => 0.0,
            ThrowState::Flying { elapsed } => {
                let t = crate::inverse_lerp(0.0, self.config.time_to_flight, elapsed);
                self.config.flight_curve.evaluate(t) * self.force
            }
            ThrowState::Landed => self.force,
        }
    }

    fn land(&mut self) {
        self.state = ThrowState::Landed;
        let hit = (self.force - self.target).abs() <= self.config.margin;
        log::debug!(
            "Stone landed at {:.2}, target {:.2} (hit: {})",
            self.force,
            self.target,
            hit
        );
        self.lifecycle.emit(MinigameEvent::Landing { hit });
        if hit {
            self.lifecycle.won();
        } else {
            self.lifecycle.lose();
        }
    }
}

impl Minigame for Hopscotch {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    fn reset(&mut self, _clock: &Clock) {
        self.state = ThrowState::Aiming;
        self.force = 0.0;
        self.target = range_f32(&mut self.rng, self.config.target_min, self.config.target_max);
    }

    fn update(&mut self, clock: &Clock, input: &InputSnapshot) {
        let dt = clock.dt();

        match self.state {
            ThrowState::Aiming => {
                if input.confirm.pressed || input.confirm.held {
                    self.state = ThrowState::Charging;
                    self.force = 0.0;
                }
            }
            ThrowState::Charging => {
                if input.confirm.released || !input.confirm.held {
                    self.state = ThrowState::Flying { elapsed: 0.0 };
                    self.lifecycle.emit(MinigameEvent::Thrown { force: self.force });
                } else {
                    self.force = (self.force + self.config.force_speed * dt).clamp(0.0, 1.0);
                }
            }
            ThrowState::Flying { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= self.config.time_to_flight {
                    self.land();
                    return;
                }
                self.state = ThrowState::Flying { elapsed };
            }
            ThrowState::Landed => {}
        }

        if self.lifecycle.is_playing() && self.lifecycle.time_left01(clock.now()) <= 0.0 {
            self.lifecycle.lose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::ButtonState;

    fn hopscotch() -> Hopscotch {
        Hopscotch::new(
            MinigameDescriptor::new("Hop", 10.0, "", false),
            HopscotchConfig::default(),
            31,
        )
    }

    /// Hold until the force reaches `aim`, then release and wait for landing
    fn throw_at(game: &mut Hopscotch, clock: &mut Clock, aim: f32) {
        clock.advance(SIM_DT);
        let press = InputSnapshot {
            confirm: ButtonState::press(),
            ..Default::default()
        };
        game.tick(clock, &press);

        let hold = InputSnapshot {
            confirm: ButtonState::hold(),
            ..Default::default()
        };
        while game.force() < aim {
            clock.advance(SIM_DT);
            game.tick(clock, &hold);
        }

        let release = InputSnapshot {
            confirm: ButtonState::release(),
            ..Default::default()
        };
        clock.advance(SIM_DT);
        game.tick(clock, &release);

        for _ in 0..(1.5 / SIM_DT) as usize {
            clock.advance(SIM_DT);
            game.tick(clock, &InputSnapshot::default());
        }
    }

    #[test]
    fn test_throw_on_target_wins() {
        let mut game = hopscotch();
        let mut clock = Clock::new();
        game.start_game(&clock);
        let target = game.target();
        throw_at(&mut game, &mut clock, target);
        assert_eq!(game.state(), ThrowState::Landed);
        assert!(game.has_won());
        assert_eq!(game.stone_distance(), game.force());
    }

    #[test]
    fn test_overthrow_loses() {
        let mut game = hopscotch();
        let mut clock = Clock::new();
        game.start_game(&clock);
        throw_at(&mut game, &mut clock, 1.0);
        assert!((game.force() - 1.0).abs() < 1e-6);
        assert!(game.lifecycle().is_ended());
        assert!(!game.has_won());
        let events = game.drain_events();
        assert!(events.contains(&MinigameEvent::Landing { hit: false }));
    }

    #[test]
    fn test_stone_follows_curve_during_flight() {
        let mut game = hopscotch();
        let mut clock = Clock::new();
        game.start_game(&clock);
        game.force = 0.8;
        game.state = ThrowState::Flying { elapsed: 0.0 };

        let mut prev = 0.0;
        for _ in 0..100 {
            clock.advance(SIM_DT);
            game.tick(&clock, &InputSnapshot::default());
            let d = game.stone_distance();
            assert!(d >= prev && d <= 0.8);
            prev = d;
        }
        assert!(prev > 0.4);
    }

    #[test]
    fn test_target_within_range() {
        let mut game = hopscotch();
        let clock = Clock::new();
        for _ in 0..50 {
            game.start_game(&clock);
            assert!((0.35..=0.9).contains(&game.target()));
        }
    }

    #[test]
    fn test_never_throwing_loses_on_time() {
        let mut game = hopscotch();
        let mut clock = Clock::new();
        game.start_game(&clock);
        for _ in 0..(10.5 / SIM_DT) as usize {
            clock.advance(SIM_DT);
            game.tick(&clock, &InputSnapshot::default());
        }
        assert!(game.lifecycle().is_ended());
        assert!(!game.has_won());
    }
}
