//! Concrete minigames
//!
//! Each game is an independent struct implementing [`Minigame`]. A roster
//! entry pairs a descriptor with a [`GameConfig`], which knows how to build
//! the matching game.

pub mod balance_beam;
pub mod count_the_tops;
pub mod hopscotch;
pub mod kite_duel;
pub mod market_sort;
pub mod rain_dance;
pub mod sack_race;
pub mod trivia;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::sim::{Minigame, MinigameDescriptor, SharedSink};

pub use balance_beam::{BalanceBeam, BalanceBeamConfig, BeamMode};
pub use count_the_tops::{CountTheTops, CountTheTopsConfig};
pub use hopscotch::{Hopscotch, HopscotchConfig};
pub use kite_duel::{KiteDuel, KiteDuelConfig};
pub use market_sort::{MarketSort, MarketSortConfig};
pub use rain_dance::{RainDance, RainDanceConfig};
pub use sack_race::{SackRace, SackRaceConfig};
pub use trivia::{Trivia, TriviaConfig, TriviaQuestion, TriviaSet};

/// Capabilities handed to games at construction
#[derive(Clone, Default)]
pub struct Collaborators {
    pub entity_sink: Option<SharedSink>,
}

impl Collaborators {
    pub fn with_sink(sink: SharedSink) -> Self {
        Self {
            entity_sink: Some(sink),
        }
    }
}

/// Per-game tuning, tagged by game kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum GameConfig {
    BalanceBeam(BalanceBeamConfig),
    KiteDuel(KiteDuelConfig),
    CountTheTops(CountTheTopsConfig),
    RainDance(RainDanceConfig),
    SackRace(SackRaceConfig),
    Hopscotch(HopscotchConfig),
    Trivia(TriviaConfig),
    MarketSort(MarketSortConfig),
}

impl GameConfig {
    /// Build a fresh game instance
    pub fn instantiate(
        &self,
        descriptor: MinigameDescriptor,
        seed: u64,
        collaborators: &Collaborators,
    ) -> Box<dyn Minigame> {
        match self {
            Self::BalanceBeam(c) => Box::new(BalanceBeam::new(descriptor, c.clone(), seed)),
            Self::KiteDuel(c) => Box::new(KiteDuel::new(descriptor, c.clone(), seed)),
            Self::CountTheTops(c) => Box::new(CountTheTops::new(
                descriptor,
                c.clone(),
                collaborators.entity_sink.clone(),
                seed,
            )),
            Self::RainDance(c) => Box::new(RainDance::new(descriptor, c.clone())),
            Self::SackRace(c) => Box::new(SackRace::new(descriptor, c.clone())),
            Self::Hopscotch(c) => Box::new(Hopscotch::new(descriptor, c.clone(), seed)),
            Self::Trivia(c) => Box::new(Trivia::new(descriptor, c.clone(), seed)),
            Self::MarketSort(c) => Box::new(MarketSort::new(descriptor, c.clone(), seed)),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::BalanceBeam(c) => c.validate(),
            Self::KiteDuel(c) => c.validate(),
            Self::CountTheTops(c) => c.validate(),
            Self::RainDance(c) => c.validate(),
            Self::SackRace(c) => c.validate(),
            Self::Hopscotch(c) => c.validate(),
            Self::Trivia(c) => c.validate(),
            Self::MarketSort(c) => c.validate(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::BalanceBeam(_) => "BalanceBeam",
            Self::KiteDuel(_) => "KiteDuel",
            Self::CountTheTops(_) => "CountTheTops",
            Self::RainDance(_) => "RainDance",
            Self::SackRace(_) => "SackRace",
            Self::Hopscotch(_) => "Hopscotch",
            Self::Trivia(_) => "Trivia",
            Self::MarketSort(_) => "MarketSort",
        }
    }
}

/// One selectable minigame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(default)]
    pub descriptor: MinigameDescriptor,
    pub game: GameConfig,
}

impl RosterEntry {
    pub fn new(descriptor: MinigameDescriptor, game: GameConfig) -> Self {
        Self { descriptor, game }
    }

    pub fn instantiate(&self, seed: u64, collaborators: &Collaborators) -> Box<dyn Minigame> {
        self.game.instantiate(self.descriptor.clone(), seed, collaborators)
    }
}

/// Check that `lo..=hi` is a non-empty, non-negative range
pub(crate) fn check_range(what: &str, lo: f32, hi: f32) -> Result<(), ConfigError> {
    if !(lo.is_finite() && hi.is_finite()) || lo < 0.0 || lo > hi {
        return Err(ConfigError::Invalid(format!(
            "{what}: expected 0 <= min <= max, got {lo}..{hi}"
        )));
    }
    Ok(())
}

/// Check that a duration is finite and non-negative
pub(crate) fn check_secs(what: &str, secs: f32) -> Result<(), ConfigError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(ConfigError::Invalid(format!(
            "{what}: expected a non-negative duration, got {secs}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Clock, HeadlessSink};

    #[test]
    fn test_roster_entry_json_shape() {
        let json = r#"{
            "descriptor": { "name": "Rain", "time_limit": 6.0 },
            "game": { "kind": "RainDance", "target_taps": 10 }
        }"#;
        let entry: RosterEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.descriptor.name, "Rain");
        assert!(!entry.descriptor.win_on_time_end);
        match &entry.game {
            GameConfig::RainDance(c) => assert_eq!(c.target_taps, 10),
            other => panic!("unexpected {}", other.kind()),
        }
    }

    #[test]
    fn test_instantiate_every_kind() {
        let sink = HeadlessSink::shared();
        let collaborators = Collaborators::with_sink(sink);
        let kinds = [
            GameConfig::BalanceBeam(BalanceBeamConfig::default()),
            GameConfig::KiteDuel(KiteDuelConfig::default()),
            GameConfig::CountTheTops(CountTheTopsConfig::default()),
            GameConfig::RainDance(RainDanceConfig::default()),
            GameConfig::SackRace(SackRaceConfig::default()),
            GameConfig::Hopscotch(HopscotchConfig::default()),
            GameConfig::Trivia(TriviaConfig::default()),
            GameConfig::MarketSort(MarketSortConfig::default()),
        ];
        let clock = Clock::new();
        for config in kinds {
            assert!(config.validate().is_ok(), "{}", config.kind());
            let descriptor = MinigameDescriptor::new(config.kind(), 10.0, "", false);
            let mut game = config.instantiate(descriptor, 1, &collaborators);
            assert_eq!(game.name(), config.kind());
            game.start_game(&clock);
            assert!(game.is_playing());
            game.tear_down();
        }
    }
}
