//! Deterministic simulation module
//!
//! All gameplay building blocks live here. This module must be pure and deterministic:
//! - Time comes from an explicit `Clock`, never the wall clock
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod balance;
pub mod clock;
pub mod curve;
pub mod input;
pub mod minigame;
pub mod noise;
pub mod pick;
pub mod routine;
pub mod sequence;
pub mod spawner;

pub use balance::{BalanceConfig, BalanceMeter, BalanceState, DriftMode};
pub use clock::{Clock, FixedTimestep};
pub use curve::{Curve, Easing};
pub use input::{ButtonState, Direction, DropAction, InputSnapshot};
pub use minigame::{
    Lifecycle, LifecycleState, Minigame, MinigameDescriptor, MinigameEvent, MissReason, Outcome,
};
pub use noise::SmoothNoise;
pub use routine::{Delay, Routine};
pub use sequence::{
    SequenceConfig, SequenceMatcher, SequencePhase, SequenceStatus, generate_sequence,
};
pub use spawner::{
    EntityHandle, EntitySink, EntitySpawner, HeadlessSink, SharedSink, SpawnRequest,
    SpawnedEntity, SpawnerConfig,
};
