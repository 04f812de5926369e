//! Count-the-tops minigame
//!
//! Spinning tops cross the screen; the player presses once per top. When time
//! runs out the game is won only if the player's count matches the number of
//! tops that were spawned.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{check_range, check_secs};
use crate::config::ConfigError;
use crate::sim::{
    Clock, EntitySpawner, InputSnapshot, Lifecycle, Minigame, MinigameDescriptor, MinigameEvent,
    SharedSink, SpawnerConfig,
};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CountTheTopsConfig {
    pub spawner: SpawnerConfig,
}

impl CountTheTopsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.spawner;
        check_secs("stop_spawning_before_end", s.stop_spawning_before_end)?;
        check_range("spawn interval", s.min_interval, s.max_interval)?;
        check_range("spawn speed", s.min_speed, s.max_speed)?;
        check_range("spawn lane", s.lane_min, s.lane_max)?;
        check_range("spin", s.min_spin, s.max_spin)?;
        if s.max_speed <= 0.0 || s.spawn_x == s.despawn_x {
            return Err(ConfigError::Invalid(
                "tops need a positive speed and distinct spawn/despawn lines".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct CountTheTops {
    lifecycle: Lifecycle,
    rng: Pcg32,
    spawner: EntitySpawner,
    sink: Option<SharedSink>,
    player_count: u32,
}

impl CountTheTops {
    pub fn new(
        descriptor: MinigameDescriptor,
        config: CountTheTopsConfig,
        sink: Option<SharedSink>,
        seed: u64,
    ) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let spawner = EntitySpawner::new(config.spawner, sink.clone(), rng.random());
        Self {
            lifecycle: Lifecycle::new(descriptor),
            rng,
            spawner,
            sink,
            player_count: 0,
        }
    }

    pub fn player_count(&self) -> u32 {
        self.player_count
    }

    /// Tops spawned so far this round
    pub fn actual_count(&self) -> u32 {
        self.spawner.total_spawned()
    }

    pub fn spawner(&self) -> &EntitySpawner {
        &self.spawner
    }
}

impl Minigame for CountTheTops {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    fn reset(&mut self, clock: &Clock) {
        self.spawner.tear_down();
        let config = self.spawner.config().clone();
        self.spawner = EntitySpawner::new(config, self.sink.clone(), self.rng.random());
        self.player_count = 0;
        let remaining = self.lifecycle.seconds_left(clock.now());
        self.spawner.start(remaining);
    }

    fn update(&mut self, clock: &Clock, input: &InputSnapshot) {
        if input.any_pressed {
            self.player_count += 1;
            self.lifecycle.emit(MinigameEvent::Counted {
                count: self.player_count,
            });
        }

        let remaining = self.lifecycle.seconds_left(clock.now());
        self.spawner
            .tick(clock.dt(), remaining, self.lifecycle.events_mut());

        if self.lifecycle.time_left01(clock.now()) <= 0.0 {
            self.spawner.clear(self.lifecycle.events_mut());
            let actual = self.spawner.total_spawned();
            log::info!("Counted {} tops, there were {}", self.player_count, actual);
            if self.player_count == actual {
                self.lifecycle.won();
            } else {
                self.lifecycle.lose();
            }
        }
    }

    fn tear_down(&mut self) {
        self.spawner.tear_down();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::HeadlessSink;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn game(sink: &Rc<RefCell<HeadlessSink>>) -> CountTheTops {
        let shared: SharedSink = sink.clone();
        CountTheTops::new(
            MinigameDescriptor::new("Tops", 15.0, "", false),
            CountTheTopsConfig::default(),
            Some(shared),
            23,
        )
    }

    /// Play to the end, pressing once per spawned top
    fn play_honestly(game: &mut CountTheTops) {
        let mut clock = Clock::new();
        game.start_game(&clock);
        let mut pressed = 0;
        for _ in 0..(16.0 / SIM_DT) as usize {
            clock.advance(SIM_DT);
            let mut input = InputSnapshot::default();
            if pressed < game.actual_count() {
                input.any_pressed = true;
                pressed += 1;
            }
            game.tick(&clock, &input);
        }
    }

    #[test]
    fn test_exact_count_wins() {
        let sink = HeadlessSink::shared();
        let mut g = game(&sink);
        play_honestly(&mut g);
        assert!(g.actual_count() > 0);
        assert!(g.has_won());
        assert_eq!(sink.borrow().live_count(), 0);
    }

    #[test]
    fn test_wrong_count_loses() {
        let sink = HeadlessSink::shared();
        let mut g = game(&sink);
        let mut clock = Clock::new();
        g.start_game(&clock);
        let input = InputSnapshot::default();
        for _ in 0..(16.0 / SIM_DT) as usize {
            clock.advance(SIM_DT);
            g.tick(&clock, &input);
        }
        assert!(g.actual_count() > 0);
        assert_eq!(g.player_count(), 0);
        assert!(g.lifecycle().is_ended());
        assert!(!g.has_won());
    }

    #[test]
    fn test_no_sink_means_zero_tops() {
        let mut g = CountTheTops::new(
            MinigameDescriptor::new("Tops", 5.0, "", false),
            CountTheTopsConfig::default(),
            None,
            1,
        );
        let mut clock = Clock::new();
        g.start_game(&clock);
        for _ in 0..(6.0 / SIM_DT) as usize {
            clock.advance(SIM_DT);
            g.tick(&clock, &InputSnapshot::default());
        }
        // Nothing spawned and nothing counted: counts agree
        assert!(g.has_won());
    }

    #[test]
    fn test_tear_down_destroys_tops() {
        let sink = HeadlessSink::shared();
        let mut g = game(&sink);
        let mut clock = Clock::new();
        g.start_game(&clock);
        for _ in 0..(5.0 / SIM_DT) as usize {
            clock.advance(SIM_DT);
            g.tick(&clock, &InputSnapshot::default());
        }
        assert!(sink.borrow().live_count() > 0);
        g.tear_down();
        assert_eq!(sink.borrow().live_count(), 0);
    }
}
