//! Top-level party state machine
//!
//! Cycles `Idle → WaitingForGame → PlayingGame → Idle` until the lives run
//! out, then stays in `GameOver`:
//! - Idle shows the last outcome for a dwell measured on the game clock
//! - WaitingForGame runs the intro (transition, pick, instructions)
//! - PlayingGame ticks the active minigame and judges its outcome
//!
//! At most one minigame instance is held. Presentation is driven by the
//! buffered [`CoordinatorEvent`]s and the [`Hud`] snapshot.

use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::PartyConfig;
use crate::games::Collaborators;
use crate::sim::pick::pick_different;
use crate::sim::{Clock, InputSnapshot, Minigame, MinigameEvent, Routine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinatorPhase {
    Idle,
    WaitingForGame,
    PlayingGame,
    GameOver,
}

/// Outcome banner on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Banner {
    Won,
    Lost,
    GameOver,
}

/// What the HUD should show this frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hud {
    /// Time slider value, 1 = full
    pub time_left01: f32,
    /// Whether the time slider is visible
    pub uses_time: bool,
    pub banner: Option<Banner>,
    pub instructions: Option<String>,
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorEvent {
    PhaseChanged {
        from: CoordinatorPhase,
        to: CoordinatorPhase,
    },
    TransitionStarted { variant: String },
    MinigameSelected { index: usize, name: String },
    InstructionsShown { text: String },
    InstructionsHidden,
    MinigameStarted { name: String, uses_time: bool },
    /// Forwarded from the active minigame
    Minigame(MinigameEvent),
    Won { name: String },
    Lost { name: String, lives_left: u8 },
    GameOver,
    PauseChanged { paused: bool },
}

/// Steps of the intro that run after a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntroStage {
    /// Transition finished: pick the game and show its instructions
    ChooseGame,
    /// Instructions finished: start the game
    StartGame,
}

pub struct MinigameCoordinator {
    config: PartyConfig,
    collaborators: Collaborators,
    rng: Pcg32,
    lives: u8,
    phase: CoordinatorPhase,
    /// Clock time of the last phase change
    state_changed_time: f64,
    last_index: Option<usize>,
    current_index: Option<usize>,
    current: Option<Box<dyn Minigame>>,
    intro: Option<Routine<IntroStage>>,
    paused: bool,
    instances_created: u64,
    hud: Hud,
    events: Vec<CoordinatorEvent>,
}

impl MinigameCoordinator {
    pub fn new(config: PartyConfig, seed: u64) -> Self {
        Self::with_collaborators(config, Collaborators::default(), seed)
    }

    pub fn with_collaborators(
        config: PartyConfig,
        collaborators: Collaborators,
        seed: u64,
    ) -> Self {
        log::info!(
            "Party starting with {} lives and {} minigames",
            config.lives,
            config.roster.len()
        );
        Self {
            lives: config.lives,
            config,
            collaborators,
            rng: Pcg32::seed_from_u64(seed),
            phase: CoordinatorPhase::Idle,
            state_changed_time: 0.0,
            last_index: None,
            current_index: None,
            current: None,
            intro: None,
            paused: false,
            instances_created: 0,
            hud: Hud {
                time_left01: 1.0,
                ..Default::default()
            },
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> CoordinatorPhase {
        self.phase
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn config(&self) -> &PartyConfig {
        &self.config
    }

    /// The held minigame instance, if any
    pub fn current(&self) -> Option<&dyn Minigame> {
        self.current.as_deref()
    }

    /// Roster index of the held instance
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Minigame instances built so far
    pub fn instances_created(&self) -> u64 {
        self.instances_created
    }

    pub fn drain_events(&mut self) -> Vec<CoordinatorEvent> {
        std::mem::take(&mut self.events)
    }

    fn set_phase(&mut self, to: CoordinatorPhase, now: f64) {
        let from = self.phase;
        if from == to {
            return;
        }
        log::info!("Coordinator {:?} -> {:?}", from, to);
        self.phase = to;
        self.state_changed_time = now;
        self.events.push(CoordinatorEvent::PhaseChanged { from, to });
    }

    /// Advance one tick. Nothing advances while paused, including the intro.
    pub fn tick(&mut self, clock: &Clock, input: &InputSnapshot) {
        if self.paused {
            return;
        }
        match self.phase {
            CoordinatorPhase::Idle => self.tick_idle(clock),
            CoordinatorPhase::WaitingForGame => self.tick_intro(clock),
            CoordinatorPhase::PlayingGame => self.tick_playing(clock, input),
            CoordinatorPhase::GameOver => {}
        }
    }

    fn tick_idle(&mut self, clock: &Clock) {
        let now = clock.now();
        if now - self.state_changed_time < self.config.idle_dwell_secs as f64 {
            return;
        }

        if self.lives == 0 {
            self.enter_game_over(now);
            return;
        }
        if self.config.roster.is_empty() {
            log::warn!("Roster is empty, nothing to play");
            self.enter_game_over(now);
            return;
        }

        self.hud.banner = None;
        self.begin_intro(now);
    }

    fn enter_game_over(&mut self, now: f64) {
        log::info!("Game over");
        self.hud.banner = Some(Banner::GameOver);
        self.intro = None;
        self.set_phase(CoordinatorPhase::GameOver, now);
        self.events.push(CoordinatorEvent::GameOver);
    }

    fn begin_intro(&mut self, now: f64) {
        self.set_phase(CoordinatorPhase::WaitingForGame, now);

        // No transitions configured is fine: go straight to the pick
        let variant = self.config.transitions.choose(&mut self.rng).cloned();
        let wait = match variant {
            Some(variant) => {
                self.events.push(CoordinatorEvent::TransitionStarted { variant });
                self.config.transition_secs
            }
            None => 0.0,
        };
        self.intro = Some(Routine::new(IntroStage::ChooseGame, wait));
    }

    fn tick_intro(&mut self, clock: &Clock) {
        let Some(intro) = self.intro.as_mut() else {
            return;
        };
        let Some(stage) = intro.tick(clock.dt()) else {
            return;
        };

        match stage {
            IntroStage::ChooseGame => {
                if !self.choose_minigame() {
                    self.enter_game_over(clock.now());
                    return;
                }
                let text = self
                    .current
                    .as_ref()
                    .map(|g| g.descriptor().display_instructions().to_string())
                    .unwrap_or_default();
                self.hud.instructions = Some(text.clone());
                self.events.push(CoordinatorEvent::InstructionsShown { text });
                let wait = self.config.instructions_secs;
                if let Some(intro) = self.intro.as_mut() {
                    intro.then(IntroStage::StartGame, wait);
                }
            }
            IntroStage::StartGame => {
                self.intro = None;
                self.hud.instructions = None;
                self.events.push(CoordinatorEvent::InstructionsHidden);
                self.start_current(clock);
            }
        }
    }

    /// Pick a roster entry different from the last one and make sure an
    /// instance of it is held. Returns false when there is nothing to pick.
    fn choose_minigame(&mut self) -> bool {
        let Some(index) = pick_different(&mut self.rng, self.config.roster.len(), self.last_index)
        else {
            log::warn!("Roster is empty, can't choose a minigame");
            return false;
        };

        if self.current.is_none() || self.current_index != Some(index) {
            self.tear_down_current();
            let seed = self.rng.random();
            let entry = &self.config.roster[index];
            self.current = Some(entry.instantiate(seed, &self.collaborators));
            self.instances_created += 1;
            log::debug!("Instantiated {}", entry.descriptor.name);
        } else {
            log::debug!("Reusing {}", self.config.roster[index].descriptor.name);
        }

        self.current_index = Some(index);
        self.last_index = Some(index);
        self.events.push(CoordinatorEvent::MinigameSelected {
            index,
            name: self.config.roster[index].descriptor.name.clone(),
        });
        true
    }

    fn start_current(&mut self, clock: &Clock) {
        let Some(game) = self.current.as_mut() else {
            log::warn!("No minigame to start");
            return;
        };
        game.start_game(clock);
        if self.paused {
            game.pausing(true);
        }
        let name = game.name().to_string();
        let uses_time = game.uses_time();
        let events = game.drain_events();

        self.hud.uses_time = uses_time;
        self.hud.time_left01 = 1.0;
        self.set_phase(CoordinatorPhase::PlayingGame, clock.now());
        log::info!("Starting {}", name);
        self.events.push(CoordinatorEvent::MinigameStarted { name, uses_time });
        self.forward(events);
    }

    fn forward(&mut self, events: Vec<MinigameEvent>) {
        self.events.extend(events.into_iter().map(CoordinatorEvent::Minigame));
    }

    fn tick_playing(&mut self, clock: &Clock, input: &InputSnapshot) {
        let now = clock.now();
        let Some(game) = self.current.as_mut() else {
            log::warn!("Playing without a minigame, returning to idle");
            self.set_phase(CoordinatorPhase::Idle, now);
            return;
        };
        if game.is_paused() {
            return;
        }

        game.tick(clock, input);
        let time_left = game.time_left01(now);
        let out_of_time = game.uses_time() && time_left <= 0.0;
        if out_of_time && game.is_playing() {
            game.time_ended();
        }

        let won = game.has_won();
        let lost = !won && (!game.is_playing() || out_of_time);
        if won || lost {
            game.tear_down();
        }
        let name = game.name().to_string();
        let events = game.drain_events();

        self.hud.time_left01 = time_left;
        self.forward(events);

        if won {
            self.hud.banner = Some(Banner::Won);
            self.events.push(CoordinatorEvent::Won { name });
            self.set_phase(CoordinatorPhase::Idle, now);
        } else if lost {
            self.lives = self.lives.saturating_sub(1);
            log::info!("{} lives left", self.lives);
            self.hud.banner = Some(Banner::Lost);
            self.events.push(CoordinatorEvent::Lost {
                name,
                lives_left: self.lives,
            });
            self.set_phase(CoordinatorPhase::Idle, now);
        }
    }

    /// Choose and start a minigame right away, skipping the intro
    pub fn start_minigame(&mut self, clock: &Clock) {
        self.intro = None;
        self.hud.instructions = None;
        if !self.choose_minigame() {
            self.enter_game_over(clock.now());
            return;
        }
        self.start_current(clock);
    }

    /// Tear down and drop the held instance; the next pick builds a new one
    pub fn tear_down_current(&mut self) {
        if let Some(mut game) = self.current.take() {
            game.tear_down();
            log::debug!("Dropped {}", game.name());
        }
        self.current_index = None;
    }

    /// Freeze or unfreeze the game clock and the active minigame
    pub fn set_paused(&mut self, clock: &mut Clock, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        if paused {
            clock.pause();
        } else {
            clock.resume();
        }

        let events = match self.current.as_mut() {
            Some(game) => {
                game.pausing(paused);
                game.drain_events()
            }
            None => Vec::new(),
        };
        self.forward(events);
        log::info!("{}", if paused { "Paused" } else { "Resumed" });
        self.events.push(CoordinatorEvent::PauseChanged { paused });
    }

    pub fn toggle_pause(&mut self, clock: &mut Clock) {
        let paused = !self.paused;
        self.set_paused(clock, paused);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::games::{GameConfig, RosterEntry, TriviaConfig};
    use crate::sim::MinigameDescriptor;

    /// A minigame that does nothing until its time runs out
    fn waiting_game(name: &str, limit: f32, win_on_time_end: bool) -> RosterEntry {
        RosterEntry::new(
            MinigameDescriptor::new(name, limit, "", win_on_time_end),
            GameConfig::Trivia(TriviaConfig { sets: Vec::new() }),
        )
    }

    fn quick_config(roster: Vec<RosterEntry>) -> PartyConfig {
        PartyConfig {
            idle_dwell_secs: 0.5,
            transition_secs: 0.25,
            instructions_secs: 0.25,
            roster,
            ..Default::default()
        }
    }

    fn run_until(
        coordinator: &mut MinigameCoordinator,
        clock: &mut Clock,
        max_secs: f32,
        mut stop: impl FnMut(&MinigameCoordinator) -> bool,
    ) -> Vec<CoordinatorEvent> {
        let input = InputSnapshot::default();
        let mut events = Vec::new();
        for _ in 0..(max_secs / SIM_DT) as usize {
            clock.advance(SIM_DT);
            coordinator.tick(clock, &input);
            events.extend(coordinator.drain_events());
            if stop(coordinator) {
                break;
            }
        }
        events
    }

    #[test]
    fn test_intro_sequence_order() {
        let mut c = MinigameCoordinator::new(quick_config(vec![waiting_game("A", 5.0, false)]), 1);
        let mut clock = Clock::new();
        let events = run_until(&mut c, &mut clock, 3.0, |c| {
            c.phase() == CoordinatorPhase::PlayingGame
        });

        let kinds: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                CoordinatorEvent::TransitionStarted { .. } => Some("transition"),
                CoordinatorEvent::MinigameSelected { .. } => Some("selected"),
                CoordinatorEvent::InstructionsShown { .. } => Some("shown"),
                CoordinatorEvent::InstructionsHidden => Some("hidden"),
                CoordinatorEvent::MinigameStarted { .. } => Some("started"),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, ["transition", "selected", "shown", "hidden", "started"]);
        assert!(events.contains(&CoordinatorEvent::InstructionsShown {
            text: crate::consts::DEFAULT_INSTRUCTIONS.to_string()
        }));
        // Dwell + transition + instructions
        assert!((clock.now() - 1.0).abs() < 0.05);
        assert!(c.hud().uses_time);
        assert_eq!(c.hud().instructions, None);
    }

    #[test]
    fn test_win_on_time_end_at_limit() {
        let mut c = MinigameCoordinator::new(quick_config(vec![waiting_game("A", 10.0, true)]), 1);
        let mut clock = Clock::new();
        run_until(&mut c, &mut clock, 3.0, |c| {
            c.phase() == CoordinatorPhase::PlayingGame
        });
        let started_at = clock.now();

        let events = run_until(&mut c, &mut clock, 12.0, |c| {
            c.phase() != CoordinatorPhase::PlayingGame
        });
        let elapsed = clock.now() - started_at;
        assert!(elapsed >= 10.0 - 1e-3 && elapsed < 10.0 + 2.0 * SIM_DT as f64);
        assert!(events.contains(&CoordinatorEvent::Won {
            name: "A".to_string()
        }));
        assert_eq!(c.lives(), 3);
        assert_eq!(c.hud().banner, Some(Banner::Won));
        assert_eq!(c.hud().time_left01, 0.0);
    }

    #[test]
    fn test_three_losses_end_the_party() {
        let roster = vec![waiting_game("A", 1.0, false), waiting_game("B", 1.0, false)];
        let mut c = MinigameCoordinator::new(quick_config(roster), 7);
        let mut clock = Clock::new();
        let events = run_until(&mut c, &mut clock, 30.0, |c| {
            c.phase() == CoordinatorPhase::GameOver
        });

        let lives_left: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                CoordinatorEvent::Lost { lives_left, .. } => Some(*lives_left),
                _ => None,
            })
            .collect();
        assert_eq!(lives_left, [2, 1, 0]);
        assert_eq!(c.phase(), CoordinatorPhase::GameOver);
        assert_eq!(events.last(), Some(&CoordinatorEvent::GameOver));
        assert_eq!(c.hud().banner, Some(Banner::GameOver));

        // Terminal
        let after = run_until(&mut c, &mut clock, 5.0, |_| false);
        assert!(after.is_empty());
    }

    #[test]
    fn test_selection_never_repeats() {
        let roster = vec![
            waiting_game("A", 1.0, false),
            waiting_game("B", 1.0, false),
            waiting_game("C", 1.0, false),
        ];
        let mut c = MinigameCoordinator::new(quick_config(roster), 99);
        let mut last = None;
        for _ in 0..1000 {
            assert!(c.choose_minigame());
            assert_ne!(c.current_index(), last);
            last = c.current_index();
        }
        assert_eq!(c.instances_created(), 1000);
    }

    #[test]
    fn test_single_entry_is_reused() {
        let mut c = MinigameCoordinator::new(quick_config(vec![waiting_game("A", 1.0, false)]), 3);
        assert!(c.choose_minigame());
        assert!(c.choose_minigame());
        assert_eq!(c.instances_created(), 1);
        assert_eq!(c.current_index(), Some(0));

        // An unloaded instance has to be rebuilt
        c.tear_down_current();
        assert!(c.current().is_none());
        assert!(c.choose_minigame());
        assert_eq!(c.instances_created(), 2);
    }

    #[test]
    fn test_empty_roster_goes_to_game_over() {
        let mut c = MinigameCoordinator::new(quick_config(Vec::new()), 3);
        let mut clock = Clock::new();
        let events = run_until(&mut c, &mut clock, 2.0, |c| {
            c.phase() == CoordinatorPhase::GameOver
        });
        assert_eq!(c.phase(), CoordinatorPhase::GameOver);
        assert!(events.contains(&CoordinatorEvent::GameOver));
        assert_eq!(c.lives(), 3);
    }

    #[test]
    fn test_no_transitions_skips_the_wait() {
        let mut config = quick_config(vec![waiting_game("A", 5.0, false)]);
        config.transitions.clear();
        let mut c = MinigameCoordinator::new(config, 1);
        let mut clock = Clock::new();
        let events = run_until(&mut c, &mut clock, 3.0, |c| {
            c.phase() == CoordinatorPhase::PlayingGame
        });
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, CoordinatorEvent::TransitionStarted { .. }))
        );
        // Dwell + instructions only
        assert!((clock.now() - 0.75).abs() < 0.05);
    }

    #[test]
    fn test_pause_freezes_the_minigame() {
        let mut c = MinigameCoordinator::new(quick_config(vec![waiting_game("A", 2.0, false)]), 1);
        let mut clock = Clock::new();
        c.start_minigame(&clock);
        assert_eq!(c.phase(), CoordinatorPhase::PlayingGame);

        run_until(&mut c, &mut clock, 1.0, |_| false);
        c.set_paused(&mut clock, true);
        assert!(c.current().unwrap().is_paused());
        let paused_events = c.drain_events();
        assert!(paused_events.contains(&CoordinatorEvent::Minigame(MinigameEvent::Paused)));
        assert_eq!(
            paused_events.last(),
            Some(&CoordinatorEvent::PauseChanged { paused: true })
        );
        let frozen_at = clock.now();

        // Far longer than the limit, but nothing advances
        let events = run_until(&mut c, &mut clock, 10.0, |_| false);
        assert_eq!(clock.now(), frozen_at);
        assert_eq!(c.phase(), CoordinatorPhase::PlayingGame);
        assert!(events.is_empty());

        c.toggle_pause(&mut clock);
        assert!(c.current().unwrap().is_playing());
        let events = run_until(&mut c, &mut clock, 2.0, |c| {
            c.phase() != CoordinatorPhase::PlayingGame
        });
        assert!(events.iter().any(|e| matches!(e, CoordinatorEvent::Lost { .. })));
        // Roughly one second was left when paused
        assert!((clock.now() - frozen_at - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_pause_holds_the_intro() {
        let mut config = quick_config(vec![waiting_game("A", 5.0, false)]);
        config.transitions.clear();
        config.instructions_secs = 0.0;
        let mut c = MinigameCoordinator::new(config, 1);
        let mut clock = Clock::new();
        run_until(&mut c, &mut clock, 2.0, |c| {
            c.phase() == CoordinatorPhase::WaitingForGame
        });
        assert_eq!(c.phase(), CoordinatorPhase::WaitingForGame);

        c.set_paused(&mut clock, true);
        assert_eq!(c.drain_events(), vec![CoordinatorEvent::PauseChanged { paused: true }]);
        // Zero-second waits must not fire on a frozen clock
        let events = run_until(&mut c, &mut clock, 1.0, |_| false);
        assert!(events.is_empty());
        assert_eq!(c.phase(), CoordinatorPhase::WaitingForGame);
        assert!(c.current().is_none());

        c.set_paused(&mut clock, false);
        let events = run_until(&mut c, &mut clock, 1.0, |c| {
            c.phase() == CoordinatorPhase::PlayingGame
        });
        assert!(
            events
                .iter()
                .any(|e| matches!(e, CoordinatorEvent::MinigameSelected { .. }))
        );
        assert_eq!(c.phase(), CoordinatorPhase::PlayingGame);
    }

    #[test]
    fn test_count_the_tops_gets_the_sink() {
        use crate::games::CountTheTopsConfig;
        use crate::sim::HeadlessSink;

        let sink = HeadlessSink::shared();
        let roster = vec![RosterEntry::new(
            MinigameDescriptor::new("Tops", 15.0, "", false),
            GameConfig::CountTheTops(CountTheTopsConfig::default()),
        )];
        let mut c = MinigameCoordinator::with_collaborators(
            quick_config(roster),
            Collaborators::with_sink(sink.clone()),
            5,
        );
        let mut clock = Clock::new();
        c.start_minigame(&clock);
        run_until(&mut c, &mut clock, 5.0, |_| false);
        assert!(sink.borrow().spawned() > 0);

        // Losing tears the tops down
        run_until(&mut c, &mut clock, 12.0, |c| c.phase() == CoordinatorPhase::Idle);
        assert_eq!(sink.borrow().live_count(), 0);
    }
}
