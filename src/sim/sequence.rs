//! Timed input-sequence matching
//!
//! Each round shows a sequence of directions that must be entered in order
//! before the round's time budget runs out. The budget is set once per round
//! (not reset per symbol) and shrinks geometrically with the round index.
//! One wrong input or an expired budget fails the whole sequence.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::input::Direction;
use super::minigame::{MinigameEvent, MissReason};
use super::routine::Delay;
use crate::consts::MAX_SEQUENCE_LENGTH;

/// Tuning for a sequence game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Symbols per round, in order; the number of rounds is its length
    pub round_lengths: Vec<usize>,
    /// Budget of the first round (seconds)
    pub round_time: f32,
    /// Budget multiplier per round, in (0, 1]
    pub round_time_multiplier: f32,
    /// Budget floor (seconds)
    pub min_round_time: f32,
    /// Cosmetic pause between rounds (seconds)
    pub between_rounds_delay: f32,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            round_lengths: vec![1, 3, 5],
            round_time: 3.0,
            round_time_multiplier: 0.9,
            min_round_time: 0.5,
            between_rounds_delay: 0.6,
        }
    }
}

impl SequenceConfig {
    /// Budget for `round_index`: `max(floor, base · multiplier^round)`
    pub fn round_budget(&self, round_index: usize) -> f32 {
        let exponent = i32::try_from(round_index).unwrap_or(i32::MAX);
        (self.round_time * self.round_time_multiplier.powi(exponent)).max(self.min_round_time)
    }

    pub fn round_count(&self) -> usize {
        self.round_lengths.len()
    }

    /// Symbols asked in `round_index`, clamped to 1..=MAX_SEQUENCE_LENGTH
    pub fn round_length(&self, round_index: usize) -> usize {
        let Some(last) = self.round_lengths.len().checked_sub(1) else {
            return 1;
        };
        self.round_lengths[round_index.min(last)].clamp(1, MAX_SEQUENCE_LENGTH)
    }
}

/// Generate `length` directions with no symbol repeated back to back
pub fn generate_sequence<R: Rng + ?Sized>(rng: &mut R, length: usize) -> Vec<Direction> {
    let alphabet = Direction::ALL.len();
    let mut sequence: Vec<Direction> = Vec::with_capacity(length);
    for _ in 0..length {
        let mut idx = rng.random_range(0..alphabet);
        if let Some(last) = sequence.last() {
            if idx == last.index() {
                idx = (idx + rng.random_range(1..alphabet)) % alphabet;
            }
        }
        sequence.push(Direction::from_index(idx));
    }
    sequence
}

/// Where the matcher is within the current round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SequencePhase {
    /// Not started
    Idle,
    /// Expecting the symbol at the cursor
    AwaitInput,
    /// Between rounds; input is ignored
    WaitingNextRound(Delay),
    /// Every round cleared
    Completed,
    /// Wrong symbol or expired budget
    Failed(MissReason),
}

/// Result of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    config: SequenceConfig,
    rng: Pcg32,
    sequence: Vec<Direction>,
    cursor: usize,
    round_index: usize,
    budget: f32,
    time_left: f32,
    phase: SequencePhase,
}

impl SequenceMatcher {
    pub fn new(config: SequenceConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            sequence: Vec::new(),
            cursor: 0,
            round_index: 0,
            budget: 0.0,
            time_left: 0.0,
            phase: SequencePhase::Idle,
        }
    }

    /// Restart from round 0 and generate its sequence
    pub fn start(&mut self, events: &mut Vec<MinigameEvent>) {
        self.round_index = 0;
        self.start_round(events);
    }

    fn start_round(&mut self, events: &mut Vec<MinigameEvent>) {
        let length = self.config.round_length(self.round_index);
        self.sequence = generate_sequence(&mut self.rng, length);
        self.cursor = 0;
        self.budget = self.config.round_budget(self.round_index);
        self.time_left = self.budget;
        self.phase = SequencePhase::AwaitInput;

        log::debug!(
            "Round {}/{}: [{}] in {:.2}s",
            self.round_index + 1,
            self.config.round_count(),
            self.sequence
                .iter()
                .map(|d| d.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            self.budget
        );
        events.push(MinigameEvent::RoundStarted {
            round: self.round_index,
            sequence: self.sequence.clone(),
            budget: self.budget,
        });
    }

    /// Advance by `dt` with this tick's directional press
    pub fn tick(
        &mut self,
        dt: f32,
        input: Option<Direction>,
        events: &mut Vec<MinigameEvent>,
    ) -> SequenceStatus {
        match self.phase {
            SequencePhase::Idle => SequenceStatus::Running,
            SequencePhase::Completed => SequenceStatus::Completed,
            SequencePhase::Failed(_) => SequenceStatus::Failed,
            SequencePhase::WaitingNextRound(mut delay) => {
                if delay.tick(dt) {
                    self.start_round(events);
                } else {
                    self.phase = SequencePhase::WaitingNextRound(delay);
                }
                SequenceStatus::Running
            }
            SequencePhase::AwaitInput => {
                self.time_left -= crate::finite_or_zero(dt).max(0.0);
                if self.time_left <= 0.0 {
                    return self.fail(MissReason::Timeout, events);
                }

                let Some(pressed) = input else {
                    return SequenceStatus::Running;
                };
                if pressed != self.sequence[self.cursor] {
                    return self.fail(MissReason::WrongSymbol, events);
                }

                events.push(MinigameEvent::SymbolHit { index: self.cursor });
                self.cursor += 1;
                if self.cursor < self.sequence.len() {
                    return SequenceStatus::Running;
                }

                events.push(MinigameEvent::RoundCleared {
                    round: self.round_index,
                });
                self.round_index += 1;
                if self.round_index >= self.config.round_count() {
                    self.phase = SequencePhase::Completed;
                    return SequenceStatus::Completed;
                }
                self.phase =
                    SequencePhase::WaitingNextRound(Delay::new(self.config.between_rounds_delay));
                SequenceStatus::Running
            }
        }
    }

    fn fail(&mut self, reason: MissReason, events: &mut Vec<MinigameEvent>) -> SequenceStatus {
        log::debug!("Sequence failed at {} ({:?})", self.cursor, reason);
        events.push(MinigameEvent::SymbolMissed {
            index: self.cursor,
            reason,
        });
        self.phase = SequencePhase::Failed(reason);
        SequenceStatus::Failed
    }

    pub fn sequence(&self) -> &[Direction] {
        &self.sequence
    }

    /// The symbol expected next, if awaiting input
    pub fn expected(&self) -> Option<Direction> {
        match self.phase {
            SequencePhase::AwaitInput => self.sequence.get(self.cursor).copied(),
            _ => None,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn round_index(&self) -> usize {
        self.round_index
    }

    /// Budget of the current round
    pub fn round_budget(&self) -> f32 {
        self.budget
    }

    /// Seconds left in the current round's budget
    pub fn round_time_left(&self) -> f32 {
        self.time_left.max(0.0)
    }

    pub fn phase(&self) -> SequencePhase {
        self.phase
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }
}
