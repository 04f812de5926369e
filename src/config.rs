//! Party configuration: coordinator tuning and the minigame roster
//!
//! Everything has a tuned default, so a config file only needs the fields it
//! overrides. Loading always validates.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_LIVES, IDLE_DWELL_SECS, INSTRUCTIONS_SECS, TRANSITION_SECS};
use crate::games::{
    BalanceBeamConfig, CountTheTopsConfig, GameConfig, HopscotchConfig, KiteDuelConfig,
    MarketSortConfig, RainDanceConfig, RosterEntry, SackRaceConfig, TriviaConfig, check_secs,
};
use crate::sim::MinigameDescriptor;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read or write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyConfig {
    /// Lives at the start of a party
    pub lives: u8,
    /// Outcome banner time before the next minigame
    pub idle_dwell_secs: f32,
    pub transition_secs: f32,
    pub instructions_secs: f32,
    /// Cosmetic transition variants; one is picked per intro
    pub transitions: Vec<String>,
    pub roster: Vec<RosterEntry>,
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self {
            lives: DEFAULT_LIVES,
            idle_dwell_secs: IDLE_DWELL_SECS,
            transition_secs: TRANSITION_SECS,
            instructions_secs: INSTRUCTIONS_SECS,
            transitions: vec!["curtain".to_string(), "confetti".to_string(), "spin".to_string()],
            roster: default_roster(),
        }
    }
}

/// The full minigame roster with its tuned descriptors
pub fn default_roster() -> Vec<RosterEntry> {
    vec![
        RosterEntry::new(
            MinigameDescriptor::new("Balance Beam", 8.0, "Keep your balance!", true),
            GameConfig::BalanceBeam(BalanceBeamConfig::default()),
        ),
        RosterEntry::new(
            MinigameDescriptor::new("Kite Duel", 15.0, "Follow the arrows!", false),
            GameConfig::KiteDuel(KiteDuelConfig::default()),
        ),
        RosterEntry::new(
            MinigameDescriptor::new("Count the Tops", 15.0, "Count the spinning tops!", false),
            GameConfig::CountTheTops(CountTheTopsConfig::default()),
        ),
        RosterEntry::new(
            MinigameDescriptor::new("Rain Dance", 6.0, "Tap to make it rain!", false),
            GameConfig::RainDance(RainDanceConfig::default()),
        ),
        RosterEntry::new(
            MinigameDescriptor::new("Sack Race", 15.0, "Alternate left and right!", false),
            GameConfig::SackRace(SackRaceConfig::default()),
        ),
        RosterEntry::new(
            MinigameDescriptor::new("Hopscotch", 10.0, "Hold and release to throw!", false),
            GameConfig::Hopscotch(HopscotchConfig::default()),
        ),
        RosterEntry::new(
            MinigameDescriptor::new("Trivia", 10.0, "Pick the right answer!", false),
            GameConfig::Trivia(TriviaConfig::default()),
        ),
        RosterEntry::new(
            MinigameDescriptor::new("Market Sort", 15.0, "Sort the produce!", false),
            GameConfig::MarketSort(MarketSortConfig::default()),
        ),
    ]
}

impl PartyConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config = Self::from_json(&json)?;
        log::info!(
            "Loaded party config from {} ({} minigames)",
            path.display(),
            config.roster.len()
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lives == 0 {
            return Err(ConfigError::Invalid("lives must be at least 1".to_string()));
        }
        check_secs("idle_dwell_secs", self.idle_dwell_secs)?;
        check_secs("transition_secs", self.transition_secs)?;
        check_secs("instructions_secs", self.instructions_secs)?;

        for entry in &self.roster {
            let name = &entry.descriptor.name;
            check_secs(&format!("{name} time_limit"), entry.descriptor.time_limit)?;
            entry.game.validate().map_err(|e| match e {
                ConfigError::Invalid(msg) => ConfigError::Invalid(format!("{name}: {msg}")),
                other => other,
            })?;
        }
        Ok(())
    }
}
