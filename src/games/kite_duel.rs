//! Kite-duel minigame: enter the arrow sequence of each round before its
//! budget runs out

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::check_secs;
use crate::config::ConfigError;
use crate::sim::{
    Clock, InputSnapshot, Lifecycle, Minigame, MinigameDescriptor, SequenceConfig,
    SequenceMatcher, SequenceStatus,
};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KiteDuelConfig {
    pub sequence: SequenceConfig,
}

impl KiteDuelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.sequence;
        if s.round_lengths.is_empty() {
            return Err(ConfigError::Invalid(
                "kite duel needs at least one round".to_string(),
            ));
        }
        if !(s.round_time_multiplier > 0.0 && s.round_time_multiplier <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "round_time_multiplier must be within (0, 1], got {}",
                s.round_time_multiplier
            )));
        }
        check_secs("round_time", s.round_time)?;
        check_secs("min_round_time", s.min_round_time)?;
        check_secs("between_rounds_delay", s.between_rounds_delay)
    }
}

pub struct KiteDuel {
    lifecycle: Lifecycle,
    rng: Pcg32,
    matcher: SequenceMatcher,
}

impl KiteDuel {
    pub fn new(descriptor: MinigameDescriptor, config: KiteDuelConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let matcher = SequenceMatcher::new(config.sequence, rng.random());
        Self {
            lifecycle: Lifecycle::new(descriptor),
            rng,
            matcher,
        }
    }

    pub fn matcher(&self) -> &SequenceMatcher {
        &self.matcher
    }
}

impl Minigame for KiteDuel {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    fn reset(&mut self, _clock: &Clock) {
        let config = self.matcher.config().clone();
        self.matcher = SequenceMatcher::new(config, self.rng.random());
        self.matcher.start(self.lifecycle.events_mut());
    }

    fn update(&mut self, clock: &Clock, input: &InputSnapshot) {
        let status = self
            .matcher
            .tick(clock.dt(), input.direction, self.lifecycle.events_mut());
        match status {
            SequenceStatus::Completed => self.lifecycle.won(),
            SequenceStatus::Failed => self.lifecycle.lose(),
            SequenceStatus::Running => {
                if self.lifecycle.uses_time() && self.lifecycle.time_left01(clock.now()) <= 0.0 {
                    self.lifecycle.lose();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::{Direction, MinigameEvent, SequencePhase};

    fn duel(limit: f32, lengths: Vec<usize>) -> KiteDuel {
        let config = KiteDuelConfig {
            sequence: SequenceConfig {
                round_lengths: lengths,
                ..Default::default()
            },
        };
        KiteDuel::new(MinigameDescriptor::new("Kites", limit, "", false), config, 17)
    }

    /// Press the expected symbol whenever one is awaited
    fn play_perfectly(game: &mut KiteDuel, clock: &mut Clock, seconds: f32) {
        for _ in 0..(seconds / SIM_DT) as usize {
            clock.advance(SIM_DT);
            let input = match game.matcher().expected() {
                Some(d) => InputSnapshot::direction(d),
                None => InputSnapshot::default(),
            };
            game.tick(clock, &input);
        }
    }

    #[test]
    fn test_perfect_play_wins() {
        let mut game = duel(15.0, vec![1, 3, 5]);
        let mut clock = Clock::new();
        game.start_game(&clock);
        play_perfectly(&mut game, &mut clock, 5.0);
        assert!(game.has_won());
        assert_eq!(game.matcher().phase(), SequencePhase::Completed);
    }

    #[test]
    fn test_wrong_input_loses() {
        let mut game = duel(15.0, vec![3]);
        let mut clock = Clock::new();
        game.start_game(&clock);
        let expected = game.matcher().expected().unwrap();
        let wrong = Direction::from_index(expected.index() + 2);
        clock.advance(SIM_DT);
        game.tick(&clock, &InputSnapshot::direction(wrong));
        assert!(game.lifecycle().is_ended());
        assert!(!game.has_won());
    }

    #[test]
    fn test_idle_player_times_out() {
        let mut game = duel(15.0, vec![1, 3, 5]);
        let mut clock = Clock::new();
        game.start_game(&clock);
        let input = InputSnapshot::default();
        for _ in 0..(3.5 / SIM_DT) as usize {
            clock.advance(SIM_DT);
            game.tick(&clock, &input);
        }
        assert!(game.lifecycle().is_ended());
        assert!(
            game.drain_events()
                .iter()
                .any(|e| matches!(e, MinigameEvent::SymbolMissed { .. }))
        );
    }

    #[test]
    fn test_overall_time_out_loses() {
        // Generous round budget, short overall limit
        let config = KiteDuelConfig {
            sequence: SequenceConfig {
                round_lengths: vec![5],
                round_time: 60.0,
                ..Default::default()
            },
        };
        let mut game = KiteDuel::new(MinigameDescriptor::new("Kites", 2.0, "", false), config, 1);
        let mut clock = Clock::new();
        game.start_game(&clock);
        let input = InputSnapshot::default();
        for _ in 0..(2.5 / SIM_DT) as usize {
            clock.advance(SIM_DT);
            game.tick(&clock, &input);
        }
        assert!(game.lifecycle().is_ended());
        assert!(!game.has_won());
    }

    #[test]
    fn test_restart_generates_new_rounds() {
        let mut game = duel(15.0, vec![10]);
        let clock = Clock::new();
        game.start_game(&clock);
        let first = game.matcher().sequence().to_vec();
        game.start_game(&clock);
        assert_eq!(game.matcher().round_index(), 0);
        assert_eq!(game.matcher().sequence().len(), 10);
        assert_ne!(game.matcher().sequence(), first.as_slice());
    }

    #[test]
    fn test_validate() {
        let mut config = KiteDuelConfig::default();
        assert!(config.validate().is_ok());
        config.sequence.round_time_multiplier = 1.5;
        assert!(config.validate().is_err());
        config.sequence.round_time_multiplier = 0.9;
        config.sequence.round_lengths.clear();
        assert!(config.validate().is_err());
    }
}
