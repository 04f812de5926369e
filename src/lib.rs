//! Fonda Party - a party-game collection of short timed minigames
//!
//! Core modules:
//! - `sim`: Deterministic building blocks (clock, input, lifecycle, balance
//!   physics, sequence matching, entity spawning)
//! - `games`: The concrete minigames of the roster
//! - `coordinator`: Top-level state machine cycling through the roster
//! - `config`: Data-driven roster and coordinator tuning
//! - `settings`: Volume preferences

pub mod config;
pub mod coordinator;
pub mod games;
pub mod settings;
pub mod sim;

pub use config::{ConfigError, PartyConfig};
pub use coordinator::{Banner, CoordinatorEvent, CoordinatorPhase, Hud, MinigameCoordinator};
pub use settings::{PreferenceStore, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta accepted by the host loop (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Lives at the start of a party
    pub const DEFAULT_LIVES: u8 = 3;
    /// Time the coordinator holds the win/lose banner before the next game
    pub const IDLE_DWELL_SECS: f32 = 2.0;
    /// Length of the transition animation step of the intro
    pub const TRANSITION_SECS: f32 = 1.0;
    /// Length of the instructions step of the intro
    pub const INSTRUCTIONS_SECS: f32 = 1.0;
    /// Shown when a minigame has no instructions of its own
    pub const DEFAULT_INSTRUCTIONS: &str = "Get ready!";

    /// Longest sequence a single round may ask for
    pub const MAX_SEQUENCE_LENGTH: usize = 10;
}

/// Inverse of linear interpolation, clamped to [0, 1].
/// Returns 0 when the range is empty.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Replace NaN/infinite values with zero
#[inline]
pub fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}
