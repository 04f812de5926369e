//! The lifecycle contract every minigame implements
//!
//! `Lifecycle` holds the shared runtime state (state machine, start time,
//! outcome, buffered events). The `Minigame` trait exposes the
//! coordinator-facing surface as provided methods over it, so a concrete game
//! only supplies its own reset and per-tick update.

use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::input::{Direction, InputSnapshot};

/// Identity of a minigame type. Immutable per roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinigameDescriptor {
    pub name: String,
    /// Seconds; 0 means untimed
    pub time_limit: f32,
    pub instructions: String,
    /// Surviving until the time runs out counts as a win
    pub win_on_time_end: bool,
}

impl Default for MinigameDescriptor {
    fn default() -> Self {
        Self {
            name: "Minigame".to_string(),
            time_limit: 10.0,
            instructions: String::new(),
            win_on_time_end: false,
        }
    }
}

impl MinigameDescriptor {
    pub fn new(name: &str, time_limit: f32, instructions: &str, win_on_time_end: bool) -> Self {
        Self {
            name: name.to_string(),
            time_limit,
            instructions: instructions.to_string(),
            win_on_time_end,
        }
    }

    pub fn uses_time(&self) -> bool {
        self.time_limit > 0.0
    }

    /// Instructions to display, falling back to a generic prompt
    pub fn display_instructions(&self) -> &str {
        if self.instructions.is_empty() {
            crate::consts::DEFAULT_INSTRUCTIONS
        } else {
            &self.instructions
        }
    }
}

/// Lifecycle state of a minigame instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Idle,
    Playing,
    Paused,
    Ended,
}

/// How a minigame resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Undetermined,
    Won,
    Lost,
}

/// Why a sequence input failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissReason {
    WrongSymbol,
    Timeout,
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum MinigameEvent {
    Started,
    Won,
    Lost,
    Paused,
    Resumed,

    /// A new sequence round is on screen
    RoundStarted {
        round: usize,
        sequence: Vec<Direction>,
        budget: f32,
    },
    SymbolHit { index: usize },
    SymbolMissed { index: usize, reason: MissReason },
    RoundCleared { round: usize },

    /// A balance meter stayed outside its safe zone past the grace time
    BalanceFailed,

    EntitySpawned { id: u32 },
    EntityDespawned { id: u32 },
    /// A counter moved (taps, counted tops)
    Counted { count: u32 },

    Jumped,
    Landed,
    Mistake { errors: u32 },

    Thrown { force: f32 },
    Landing { hit: bool },

    QuestionAsked { question: String, choices: Vec<String> },

    ItemSorted { item: usize, bin: usize },
    ItemRejected { item: usize },
}

/// Shared runtime state of one minigame instance
#[derive(Debug, Clone)]
pub struct Lifecycle {
    descriptor: MinigameDescriptor,
    state: LifecycleState,
    pre_pause: LifecycleState,
    start_time: f64,
    outcome: Outcome,
    events: Vec<MinigameEvent>,
}

impl Lifecycle {
    pub fn new(descriptor: MinigameDescriptor) -> Self {
        Self {
            descriptor,
            state: LifecycleState::Idle,
            pre_pause: LifecycleState::Idle,
            start_time: 0.0,
            outcome: Outcome::Undetermined,
            events: Vec::new(),
        }
    }

    pub fn descriptor(&self) -> &MinigameDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Reset the outcome and begin playing at `now`
    pub fn start(&mut self, now: f64) {
        self.outcome = Outcome::Undetermined;
        self.start_time = now;
        self.state = LifecycleState::Playing;
        self.pre_pause = LifecycleState::Playing;
        self.events.push(MinigameEvent::Started);
        log::debug!("{} started at {:.2}", self.descriptor.name, now);
    }

    /// Resolve as a win. No-op unless playing.
    pub fn won(&mut self) {
        if self.state != LifecycleState::Playing {
            log::debug!("{}: won() ignored in {:?}", self.descriptor.name, self.state);
            return;
        }
        log::info!("You won the minigame {}!", self.descriptor.name);
        self.outcome = Outcome::Won;
        self.state = LifecycleState::Ended;
        self.events.push(MinigameEvent::Won);
    }

    /// Resolve as a loss. No-op unless playing.
    pub fn lose(&mut self) {
        if self.state != LifecycleState::Playing {
            log::debug!("{}: lose() ignored in {:?}", self.descriptor.name, self.state);
            return;
        }
        log::info!("You lost the minigame {} :(", self.descriptor.name);
        self.outcome = Outcome::Lost;
        self.state = LifecycleState::Ended;
        self.events.push(MinigameEvent::Lost);
    }

    /// The time budget ran out
    pub fn time_ended(&mut self) {
        if self.descriptor.win_on_time_end {
            self.won();
        } else {
            self.lose();
        }
    }

    /// Enter or leave the paused state
    pub fn pausing(&mut self, paused: bool) {
        match (paused, self.state) {
            (true, LifecycleState::Paused)
            | (false, LifecycleState::Idle)
            | (false, LifecycleState::Playing)
            | (false, LifecycleState::Ended) => {}
            (true, state) => {
                self.pre_pause = state;
                self.state = LifecycleState::Paused;
                self.events.push(MinigameEvent::Paused);
            }
            (false, LifecycleState::Paused) => {
                self.state = self.pre_pause;
                self.events.push(MinigameEvent::Resumed);
            }
        }
    }

    /// 1 when all time is left, 0 once it has expired. Always 1 when untimed.
    pub fn time_left01(&self, now: f64) -> f32 {
        if !self.uses_time() {
            return 1.0;
        }
        let limit = self.descriptor.time_limit as f64;
        let passed = ((now - self.start_time) / limit).clamp(0.0, 1.0);
        (1.0 - passed) as f32
    }

    /// Seconds left in the budget (0 when untimed)
    pub fn seconds_left(&self, now: f64) -> f32 {
        if !self.uses_time() {
            return 0.0;
        }
        (self.descriptor.time_limit * self.time_left01(now)).max(0.0)
    }

    pub fn is_playing(&self) -> bool {
        self.state == LifecycleState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state == LifecycleState::Paused
    }

    pub fn is_ended(&self) -> bool {
        self.state == LifecycleState::Ended
    }

    pub fn has_won(&self) -> bool {
        self.outcome == Outcome::Won
    }

    pub fn uses_time(&self) -> bool {
        self.descriptor.uses_time()
    }

    /// Queue a game-specific notification
    pub fn emit(&mut self, event: MinigameEvent) {
        self.events.push(event);
    }

    pub fn events_mut(&mut self) -> &mut Vec<MinigameEvent> {
        &mut self.events
    }

    pub fn drain_events(&mut self) -> Vec<MinigameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// A playable minigame
///
/// Implementors provide access to their `Lifecycle`, a reset hook and a
/// per-tick update. Everything the coordinator calls is provided.
pub trait Minigame {
    fn lifecycle(&self) -> &Lifecycle;
    fn lifecycle_mut(&mut self) -> &mut Lifecycle;

    /// Reset game-specific state. Runs right after the lifecycle restarts.
    fn reset(&mut self, clock: &Clock);

    /// Advance one tick. Only called while playing.
    fn update(&mut self, clock: &Clock, input: &InputSnapshot);

    /// Release anything that outlives a round (spawned entities)
    fn tear_down(&mut self) {}

    fn name(&self) -> &str {
        &self.lifecycle().descriptor().name
    }

    fn descriptor(&self) -> &MinigameDescriptor {
        self.lifecycle().descriptor()
    }

    /// Begin (or restart) the minigame. Safe to call on a reused instance.
    fn start_game(&mut self, clock: &Clock) {
        self.lifecycle_mut().start(clock.now());
        self.reset(clock);
    }

    /// Run the update if playing; paused or ended instances do not advance
    fn tick(&mut self, clock: &Clock, input: &InputSnapshot) {
        if self.lifecycle().is_playing() {
            self.update(clock, input);
        }
    }

    fn time_left01(&self, now: f64) -> f32 {
        self.lifecycle().time_left01(now)
    }

    fn is_playing(&self) -> bool {
        self.lifecycle().is_playing()
    }

    fn is_paused(&self) -> bool {
        self.lifecycle().is_paused()
    }

    fn has_won(&self) -> bool {
        self.lifecycle().has_won()
    }

    fn uses_time(&self) -> bool {
        self.lifecycle().uses_time()
    }

    fn pausing(&mut self, paused: bool) {
        self.lifecycle_mut().pausing(paused);
    }

    fn time_ended(&mut self) {
        self.lifecycle_mut().time_ended();
    }

    fn drain_events(&mut self) -> Vec<MinigameEvent> {
        self.lifecycle_mut().drain_events()
    }
}
