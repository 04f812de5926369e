//! Rain-dance minigame: tap fast enough to reach the target before time is up

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::sim::{Clock, InputSnapshot, Lifecycle, Minigame, MinigameDescriptor, MinigameEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainDanceConfig {
    pub target_taps: u32,
}

impl Default for RainDanceConfig {
    fn default() -> Self {
        Self { target_taps: 25 }
    }
}

impl RainDanceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_taps == 0 {
            return Err(ConfigError::Invalid(
                "rain dance target_taps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct RainDance {
    lifecycle: Lifecycle,
    config: RainDanceConfig,
    taps: u32,
}

impl RainDance {
    pub fn new(descriptor: MinigameDescriptor, config: RainDanceConfig) -> Self {
        Self {
            lifecycle: Lifecycle::new(descriptor),
            config,
            taps: 0,
        }
    }

    pub fn taps(&self) -> u32 {
        self.taps
    }

    /// Progress toward the target, in [0, 1]
    pub fn progress01(&self) -> f32 {
        (self.taps as f32 / self.config.target_taps.max(1) as f32).min(1.0)
    }
}

impl Minigame for RainDance {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    fn reset(&mut self, _clock: &Clock) {
        self.taps = 0;
    }

    fn update(&mut self, clock: &Clock, input: &InputSnapshot) {
        if input.confirm.pressed {
            self.taps += 1;
            self.lifecycle.emit(MinigameEvent::Counted { count: self.taps });
        }

        // Judged only once the time is up
        if self.lifecycle.time_left01(clock.now()) <= 0.0 {
            if self.taps >= self.config.target_taps {
                self.lifecycle.won();
            } else {
                self.lifecycle.lose();
            }
        }
    }
}
