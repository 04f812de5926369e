//! Procedural timed entity spawner
//!
//! Spawns entities at random intervals until a fixed time before the end of
//! the minigame. Entities travel horizontally at constant velocity while
//! spinning, and are destroyed once they cross the despawn line.
//!
//! The spawner owns entity state. Visual instances live behind an
//! [`EntitySink`], which is told about every spawn, move and destroy.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::minigame::MinigameEvent;
use super::pick::{random_sign, range_f32};
use super::routine::Delay;

/// Shortest wait between two spawns (seconds)
pub const MIN_SPAWN_INTERVAL: f32 = 0.05;
/// Spawns allowed within a single tick
pub const MAX_SPAWNS_PER_TICK: u32 = 4;

/// Opaque handle to a visual instance owned by the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(pub u64);

/// Everything a sink needs to create a visual instance
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub id: u32,
    /// Viewport coordinates
    pub position: Vec2,
    /// Viewport units per second
    pub velocity: Vec2,
    /// Degrees per second
    pub spin: f32,
}

/// Asset instantiation capability
pub trait EntitySink {
    fn spawn(&mut self, request: &SpawnRequest) -> Option<EntityHandle>;

    /// Position/rotation update after a tick
    fn moved(&mut self, _handle: EntityHandle, _position: Vec2, _rotation: f32) {}

    fn destroy(&mut self, handle: EntityHandle);
}

/// Sink shared between the coordinator and the games it creates
pub type SharedSink = Rc<RefCell<dyn EntitySink>>;

/// Sink without visuals: tracks live instances only
#[derive(Debug, Default)]
pub struct HeadlessSink {
    next_handle: u64,
    live: BTreeSet<EntityHandle>,
    spawned: u64,
    destroyed: u64,
}

impl HeadlessSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in the shared form games expect
    pub fn shared() -> Rc<RefCell<HeadlessSink>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn destroyed(&self) -> u64 {
        self.destroyed
    }
}

impl EntitySink for HeadlessSink {
    fn spawn(&mut self, request: &SpawnRequest) -> Option<EntityHandle> {
        let handle = EntityHandle(self.next_handle);
        self.next_handle += 1;
        self.spawned += 1;
        self.live.insert(handle);
        Some(handle)
    }

    fn destroy(&mut self, handle: EntityHandle) {
        if self.live.remove(&handle) {
            self.destroyed += 1;
        }
    }
}

/// Spawner tuning, in viewport coordinates and seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Stop spawning this many seconds before the minigame ends
    pub stop_spawning_before_end: f32,
    pub min_interval: f32,
    pub max_interval: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Vertical band entities spawn in
    pub lane_min: f32,
    pub lane_max: f32,
    pub spawn_x: f32,
    pub despawn_x: f32,
    /// Spin rate range, degrees per second (sign is random)
    pub min_spin: f32,
    pub max_spin: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            stop_spawning_before_end: 4.0,
            min_interval: 0.35,
            max_interval: 1.10,
            min_speed: 0.2,
            max_speed: 0.45,
            lane_min: 0.25,
            lane_max: 0.80,
            spawn_x: 1.15,
            despawn_x: -0.15,
            min_spin: 240.0,
            max_spin: 520.0,
        }
    }
}

/// A live entity
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedEntity {
    pub id: u32,
    pub handle: EntityHandle,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Degrees per second
    pub spin: f32,
    /// Accumulated rotation in degrees
    pub rotation: f32,
    pub despawn_x: f32,
}

impl SpawnedEntity {
    /// Has crossed the despawn line in its direction of travel
    fn is_past_despawn(&self) -> bool {
        if self.velocity.x < 0.0 {
            self.position.x <= self.despawn_x
        } else {
            self.position.x >= self.despawn_x
        }
    }
}

pub struct EntitySpawner {
    config: SpawnerConfig,
    rng: Pcg32,
    sink: Option<SharedSink>,
    /// Stable order: ascending id
    entities: Vec<SpawnedEntity>,
    next_id: u32,
    wait: Delay,
    spawning: bool,
    warned_missing_sink: bool,
    total_spawned: u32,
}

impl EntitySpawner {
    pub fn new(config: SpawnerConfig, sink: Option<SharedSink>, seed: u64) -> Self {
        Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            sink,
            entities: Vec::new(),
            next_id: 0,
            wait: Delay::new(0.0),
            spawning: false,
            warned_missing_sink: false,
            total_spawned: 0,
        }
    }

    /// Begin a spawn loop for a minigame with `remaining_secs` left
    pub fn start(&mut self, remaining_secs: f32) {
        self.clear_entities(None);
        self.total_spawned = 0;

        if self.sink.is_none() {
            if !self.warned_missing_sink {
                log::warn!("No entity sink assigned, spawning disabled");
                self.warned_missing_sink = true;
            }
            self.spawning = false;
            return;
        }

        let until_stop = remaining_secs - self.config.stop_spawning_before_end;
        self.spawning = until_stop > 0.0;
        if self.spawning {
            self.wait = Delay::new(self.next_interval(until_stop));
        }
    }

    /// Random interval capped at the time left before the stop boundary
    fn next_interval(&mut self, until_stop: f32) -> f32 {
        let interval = range_f32(&mut self.rng, self.config.min_interval, self.config.max_interval);
        interval.min(until_stop).max(MIN_SPAWN_INTERVAL)
    }

    /// Advance by `dt`. `remaining_secs` is the minigame time left at the end
    /// of this tick.
    pub fn tick(&mut self, dt: f32, remaining_secs: f32, events: &mut Vec<MinigameEvent>) {
        let dt = crate::finite_or_zero(dt).max(0.0);
        self.move_entities(dt, events);

        if !self.spawning {
            return;
        }

        // Time of this tick not yet consumed by waits
        let mut budget = dt;
        let mut spawned = 0;
        loop {
            if self.wait.remaining() > budget {
                self.wait.tick(budget);
                break;
            }
            budget -= self.wait.remaining();

            let remaining_at = remaining_secs + budget;
            let until_stop = remaining_at - self.config.stop_spawning_before_end;
            if until_stop <= 0.0 {
                log::debug!("Spawning stopped after {} entities", self.total_spawned);
                self.spawning = false;
                break;
            }

            self.spawn_one(budget, events);
            spawned += 1;
            self.wait = Delay::new(self.next_interval(until_stop));
            if spawned >= MAX_SPAWNS_PER_TICK {
                break;
            }
        }
    }

    /// Spawn an entity that has already been travelling for `age` seconds
    fn spawn_one(&mut self, age: f32, events: &mut Vec<MinigameEvent>) {
        let Some(sink) = self.sink.clone() else {
            return;
        };

        let c = &self.config;
        let lane = range_f32(&mut self.rng, c.lane_min, c.lane_max);
        let speed = range_f32(&mut self.rng, c.min_speed, c.max_speed);
        let heading = if c.despawn_x < c.spawn_x { -1.0 } else { 1.0 };
        let spin = range_f32(&mut self.rng, c.min_spin, c.max_spin) * random_sign(&mut self.rng);

        let request = SpawnRequest {
            id: self.next_id,
            position: Vec2::new(c.spawn_x, lane),
            velocity: Vec2::new(speed * heading, 0.0),
            spin,
        };
        let Some(handle) = sink.borrow_mut().spawn(&request) else {
            log::warn!("Entity sink refused spawn {}", request.id);
            return;
        };

        let mut entity = SpawnedEntity {
            id: request.id,
            handle,
            position: request.position + request.velocity * age,
            velocity: request.velocity,
            spin,
            rotation: spin * age,
            despawn_x: c.despawn_x,
        };
        if age > 0.0 {
            sink.borrow_mut().moved(handle, entity.position, entity.rotation);
        }
        entity.rotation %= 360.0;

        self.next_id += 1;
        self.total_spawned += 1;
        events.push(MinigameEvent::EntitySpawned { id: entity.id });
        self.entities.push(entity);
    }

    fn move_entities(&mut self, dt: f32, events: &mut Vec<MinigameEvent>) {
        if self.entities.is_empty() || dt == 0.0 {
            return;
        }
        let sink = self.sink.clone();

        self.entities.retain_mut(|e| {
            e.position += e.velocity * dt;
            e.rotation = (e.rotation + e.spin * dt) % 360.0;

            if e.is_past_despawn() {
                if let Some(sink) = &sink {
                    sink.borrow_mut().destroy(e.handle);
                }
                events.push(MinigameEvent::EntityDespawned { id: e.id });
                return false;
            }
            if let Some(sink) = &sink {
                sink.borrow_mut().moved(e.handle, e.position, e.rotation);
            }
            true
        });
    }

    fn clear_entities(&mut self, mut events: Option<&mut Vec<MinigameEvent>>) {
        for e in self.entities.drain(..) {
            if let Some(sink) = &self.sink {
                sink.borrow_mut().destroy(e.handle);
            }
            if let Some(events) = events.as_deref_mut() {
                events.push(MinigameEvent::EntityDespawned { id: e.id });
            }
        }
    }

    /// Stop spawning and destroy every live entity
    pub fn clear(&mut self, events: &mut Vec<MinigameEvent>) {
        self.spawning = false;
        self.clear_entities(Some(events));
    }

    /// Stop spawning and destroy every live entity without reporting it
    pub fn tear_down(&mut self) {
        self.spawning = false;
        self.clear_entities(None);
    }

    pub fn entities(&self) -> &[SpawnedEntity] {
        &self.entities
    }

    pub fn live_count(&self) -> usize {
        self.entities.len()
    }

    /// Entities spawned since the last `start`
    pub fn total_spawned(&self) -> u32 {
        self.total_spawned
    }

    pub fn is_spawning(&self) -> bool {
        self.spawning
    }

    /// Seconds until the next spawn
    pub fn next_spawn_in(&self) -> f32 {
        self.wait.remaining()
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }
}
