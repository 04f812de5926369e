//! Trivia minigame
//!
//! A question is drawn from a random set. Each set shows a map whose regions
//! are the answer buttons; picking the region named by the answer wins and any
//! other region loses.

use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::sim::{Clock, InputSnapshot, Lifecycle, Minigame, MinigameDescriptor, MinigameEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriviaQuestion {
    pub question: String,
    /// Label of the correct choice
    pub answer: String,
}

impl TriviaQuestion {
    pub fn new(question: &str, answer: &str) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }
}

/// Questions sharing the same map and answer buttons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriviaSet {
    pub name: String,
    pub choices: Vec<String>,
    pub questions: Vec<TriviaQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriviaConfig {
    pub sets: Vec<TriviaSet>,
}

impl Default for TriviaConfig {
    fn default() -> Self {
        let labels =
            |names: &[&str]| -> Vec<String> { names.iter().map(|n| n.to_string()).collect() };
        Self {
            sets: vec![
                TriviaSet {
                    name: "Chile".to_string(),
                    choices: labels(&["North", "Center", "South", "Far South"]),
                    questions: vec![
                        TriviaQuestion::new("Where is the Atacama Desert?", "North"),
                        TriviaQuestion::new("Where is the capital, Santiago?", "Center"),
                        TriviaQuestion::new("Where is the island of Chiloe?", "South"),
                        TriviaQuestion::new("Where is Torres del Paine?", "Far South"),
                    ],
                },
                TriviaSet {
                    name: "South America".to_string(),
                    choices: labels(&["Chile", "Argentina", "Peru", "Bolivia"]),
                    questions: vec![
                        TriviaQuestion::new("Where is Machu Picchu?", "Peru"),
                        TriviaQuestion::new("Where is the Salar de Uyuni?", "Bolivia"),
                        TriviaQuestion::new("Where is the Perito Moreno glacier?", "Argentina"),
                        TriviaQuestion::new(
                            "Which country is the cueca the national dance of?",
                            "Chile",
                        ),
                    ],
                },
            ],
        }
    }
}

impl TriviaConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for set in &self.sets {
            for q in &set.questions {
                if !set.choices.contains(&q.answer) {
                    return Err(ConfigError::Invalid(format!(
                        "trivia set '{}': answer '{}' to '{}' is not one of its choices",
                        set.name, q.answer, q.question
                    )));
                }
            }
        }
        Ok(())
    }
}

/// The question on screen
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveQuestion {
    pub question: String,
    pub choices: Vec<String>,
    /// Index into `choices` of the correct answer
    pub answer_index: usize,
}

pub struct Trivia {
    lifecycle: Lifecycle,
    config: TriviaConfig,
    rng: Pcg32,
    active: Option<ActiveQuestion>,
}

impl Trivia {
    pub fn new(descriptor: MinigameDescriptor, config: TriviaConfig, seed: u64) -> Self {
        Self {
            lifecycle: Lifecycle::new(descriptor),
            config,
            rng: Pcg32::seed_from_u64(seed),
            active: None,
        }
    }

    pub fn active(&self) -> Option<&ActiveQuestion> {
        self.active.as_ref()
    }

    fn draw_question(&mut self) -> Option<ActiveQuestion> {
        let usable: Vec<&TriviaSet> = self
            .config
            .sets
            .iter()
            .filter(|s| !s.questions.is_empty())
            .collect();
        let set = usable.choose(&mut self.rng)?;
        let question = set.questions.choose(&mut self.rng)?;
        let answer_index = set.choices.iter().position(|c| *c == question.answer)?;
        Some(ActiveQuestion {
            question: question.question.clone(),
            choices: set.choices.clone(),
            answer_index,
        })
    }
}

impl Minigame for Trivia {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    fn reset(&mut self, _clock: &Clock) {
        self.active = self.draw_question();
        match &self.active {
            Some(q) => self.lifecycle.emit(MinigameEvent::QuestionAsked {
                question: q.question.clone(),
                choices: q.choices.clone(),
            }),
            None => log::warn!("Trivia bank has no usable question"),
        }
    }

    fn update(&mut self, _clock: &Clock, input: &InputSnapshot) {
        let (Some(active), Some(choice)) = (&self.active, input.choice) else {
            return;
        };
        if choice >= active.choices.len() {
            log::debug!("Ignoring choice {} out of {}", choice, active.choices.len());
            return;
        }
        if choice == active.answer_index {
            self.lifecycle.won();
        } else {
            self.lifecycle.lose();
        }
    }
}
