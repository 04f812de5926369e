//! Volume settings and the preference store they persist through
//!
//! Volumes are linear in [0, 1] and handed to the audio mixer in decibels.
//! Muting parks the channel at a near-silent floor and remembers the volume
//! to restore on unmute.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Quietest volume a channel is set to; log10(0) is undefined
pub const MUTE_VOLUME: f32 = 0.0001;

/// Key-value preference storage
pub trait PreferenceStore {
    fn get_f32(&self, key: &str) -> Option<f32>;
    fn set_f32(&mut self, key: &str, value: f32);
    /// Persist pending writes
    fn flush(&mut self) -> Result<(), ConfigError>;
}

/// In-memory store, for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, f32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get_f32(&self, key: &str) -> Option<f32> {
        self.values.get(key).copied()
    }

    fn set_f32(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), value);
    }

    fn flush(&mut self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Preferences stored as a flat JSON object in a file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, f32>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No preferences at {}, starting fresh", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(ConfigError::io(&path, e)),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonFileStore {
    fn get_f32(&self, key: &str) -> Option<f32> {
        self.values.get(key).copied()
    }

    fn set_f32(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), value);
    }

    fn flush(&mut self) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json).map_err(|e| ConfigError::io(&self.path, e))?;
        log::debug!("Preferences saved to {}", self.path.display());
        Ok(())
    }
}

/// Mixer channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Music,
    Sound,
}

impl Channel {
    /// Preference key the channel volume is stored under
    pub fn key(self) -> &'static str {
        match self {
            Channel::Music => "music_volume",
            Channel::Sound => "sound_volume",
        }
    }
}

/// Linear volume to mixer decibels
pub fn to_decibels(volume: f32) -> f32 {
    20.0 * crate::finite_or_zero(volume).clamp(MUTE_VOLUME, 1.0).log10()
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sound_volume: f32,
    /// Volumes to restore on unmute
    music_before_mute: Option<f32>,
    sound_before_mute: Option<f32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 1.0,
            sound_volume: 1.0,
            music_before_mute: None,
            sound_before_mute: None,
        }
    }
}

impl Settings {
    /// Read volumes from the store, defaulting to full volume
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let read = |channel: Channel| {
            store
                .get_f32(channel.key())
                .map_or(1.0, |v| crate::finite_or_zero(v).clamp(0.0, 1.0))
        };
        let settings = Self {
            music_volume: read(Channel::Music),
            sound_volume: read(Channel::Sound),
            ..Self::default()
        };
        log::info!(
            "Volumes: music {:.2}, sound {:.2}",
            settings.music_volume,
            settings.sound_volume
        );
        settings
    }

    pub fn volume(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Music => self.music_volume,
            Channel::Sound => self.sound_volume,
        }
    }

    /// Mixer level of a channel
    pub fn decibels(&self, channel: Channel) -> f32 {
        to_decibels(self.volume(channel))
    }

    pub fn is_muted(&self, channel: Channel) -> bool {
        match channel {
            Channel::Music => self.music_before_mute.is_some(),
            Channel::Sound => self.sound_before_mute.is_some(),
        }
    }

    /// Set and persist a channel volume
    pub fn set_volume(
        &mut self,
        channel: Channel,
        volume: f32,
        store: &mut dyn PreferenceStore,
    ) -> Result<(), ConfigError> {
        let volume = crate::finite_or_zero(volume).clamp(0.0, 1.0);
        match channel {
            Channel::Music => self.music_volume = volume,
            Channel::Sound => self.sound_volume = volume,
        }
        store.set_f32(channel.key(), volume);
        store.flush()
    }

    /// Drop a channel to the mute floor, remembering its volume
    pub fn mute(
        &mut self,
        channel: Channel,
        store: &mut dyn PreferenceStore,
    ) -> Result<(), ConfigError> {
        if self.is_muted(channel) {
            return Ok(());
        }
        let previous = self.volume(channel);
        match channel {
            Channel::Music => self.music_before_mute = Some(previous),
            Channel::Sound => self.sound_before_mute = Some(previous),
        }
        self.set_volume(channel, MUTE_VOLUME, store)
    }

    /// Restore the volume saved by `mute`
    pub fn unmute(
        &mut self,
        channel: Channel,
        store: &mut dyn PreferenceStore,
    ) -> Result<(), ConfigError> {
        let previous = match channel {
            Channel::Music => self.music_before_mute.take(),
            Channel::Sound => self.sound_before_mute.take(),
        };
        match previous {
            Some(volume) => self.set_volume(channel, volume, store),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_full_volume() {
        let store = MemoryStore::new();
        let settings = Settings::load(&store);
        assert_eq!(settings.music_volume, 1.0);
        assert_eq!(settings.sound_volume, 1.0);
        assert_eq!(settings.decibels(Channel::Music), 0.0);
    }

    #[test]
    fn test_volume_round_trips_through_store() {
        let mut store = MemoryStore::new();
        let mut settings = Settings::load(&store);
        settings.set_volume(Channel::Music, 0.5, &mut store).unwrap();
        settings.set_volume(Channel::Sound, 2.0, &mut store).unwrap();

        let reloaded = Settings::load(&store);
        assert_eq!(reloaded.music_volume, 0.5);
        assert_eq!(reloaded.sound_volume, 1.0);
    }

    #[test]
    fn test_mute_and_unmute() {
        let mut store = MemoryStore::new();
        let mut settings = Settings::load(&store);
        settings.set_volume(Channel::Sound, 0.3, &mut store).unwrap();

        settings.mute(Channel::Sound, &mut store).unwrap();
        assert!(settings.is_muted(Channel::Sound));
        assert_eq!(settings.sound_volume, MUTE_VOLUME);
        assert!((settings.decibels(Channel::Sound) + 80.0).abs() < 1e-3);

        // Muting twice keeps the original volume
        settings.mute(Channel::Sound, &mut store).unwrap();
        settings.unmute(Channel::Sound, &mut store).unwrap();
        assert_eq!(settings.sound_volume, 0.3);
        assert!(!settings.is_muted(Channel::Sound));
        assert_eq!(store.get_f32("sound_volume"), Some(0.3));
    }

    #[test]
    fn test_decibel_conversion() {
        assert!((to_decibels(0.5) + 6.0206).abs() < 1e-3);
        assert!((to_decibels(0.1) + 20.0).abs() < 1e-3);
        assert_eq!(to_decibels(0.0), to_decibels(MUTE_VOLUME));
    }

    #[test]
    fn test_json_file_store_persists() {
        let path = std::env::temp_dir().join(format!(
            "fonda_party_prefs_{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get_f32("music_volume"), None);
        let mut settings = Settings::load(&store);
        settings.set_volume(Channel::Music, 0.4, &mut store).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(Settings::load(&reopened).music_volume, 0.4);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_json_file_store_rejects_garbage() {
        let path = std::env::temp_dir().join(format!(
            "fonda_party_bad_prefs_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(ConfigError::Parse(_))
        ));
        let _ = std::fs::remove_file(&path);
    }
}
