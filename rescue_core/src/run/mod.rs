//! The corridor run - one playthrough from the castle door to the captive.
//!
//! [`RunEngine`] consumes three logical inputs (move held, interact, answer
//! submission) plus a clock tick, and emits [`EngineEvent`]s. Movement is a
//! one-way walk toward deeper (more negative) depths; there is no way back
//! up, so progress only ever accumulates.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::collections::{HashSet, VecDeque};

use quiz_rules::{
    evaluate, Challenge, MatchBoard, Question, QuestionId, Scenario, Submission, CHEST_DEPTH,
    CHEST_RADIUS, GATE_RADIUS, RESCUE_DEPTH,
};

use crate::events::EngineEvent;

/// Walking speed along the corridor, in depth units per second.
pub const WALK_SPEED: f32 = 8.0;
/// How close to the captive (above `RESCUE_DEPTH`) still counts as arrival.
pub const VICTORY_MARGIN: f32 = 5.0;

/// Gold earned for opening a gate.
pub const GATE_REWARD: u32 = 20;
/// Gold earned for solving the chest riddle.
pub const CHEST_REWARD: u32 = 100;
/// Gold earned for completing the rescue.
pub const VICTORY_REWARD: u32 = 500;

/// What the player is standing next to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interactable {
    Gate(QuestionId),
    Chest,
}

/// An open quiz or riddle overlay. While one exists, movement is suspended.
#[derive(Debug)]
pub struct Interaction {
    pub target: Interactable,
    /// Present only while a card-matching challenge is open. Rebuilt fresh
    /// (and re-shuffled) every time the gate is approached.
    pub board: Option<MatchBoard>,
}

/// Accumulated progress of one run. Solved gates stay solved; nothing here
/// is ever un-done.
#[derive(Debug, Clone, Default)]
pub struct RunProgress {
    pub depth: f32,
    pub solved: HashSet<QuestionId>,
    pub chest_opened: bool,
    pub has_key: bool,
}

/// The per-run engine. Owns its scenario, progress, and RNG; knows nothing
/// about rendering, audio, or the account ledger.
#[derive(Debug)]
pub struct RunEngine {
    scenario: Scenario,
    progress: RunProgress,
    move_held: bool,
    interaction: Option<Interaction>,
    clock: f64,
    victorious: bool,
    events: VecDeque<EngineEvent>,
    rng: Pcg32,
}

impl RunEngine {
    /// Start a run at the corridor entrance. `seed` drives card shuffles.
    pub fn new(scenario: Scenario, seed: u64) -> Self {
        Self {
            scenario,
            progress: RunProgress::default(),
            move_held: false,
            interaction: None,
            clock: 0.0,
            victorious: false,
            events: VecDeque::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn progress(&self) -> &RunProgress {
        &self.progress
    }

    /// Mutable progress, for restoring a saved run.
    pub fn progress_mut(&mut self) -> &mut RunProgress {
        &mut self.progress
    }

    pub fn interaction(&self) -> Option<&Interaction> {
        self.interaction.as_ref()
    }

    /// The run reached its terminal state.
    pub fn is_victorious(&self) -> bool {
        self.victorious
    }

    /// Drain queued events in emission order.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    /// The interactable the player currently stands next to, if any. An
    /// unsolved gate wins within [`GATE_RADIUS`]; the unopened chest within
    /// [`CHEST_RADIUS`] of its depth. Scenario validation spaces gates so
    /// that at most one can be in range; if content slipped through anyway,
    /// the nearest target wins.
    pub fn nearby_interactable(&self) -> Option<Interactable> {
        let depth = self.progress.depth;

        let mut nearest: Option<(f32, Interactable)> = None;
        let mut consider = |distance: f32, target: Interactable| {
            if let Some((best, _)) = nearest {
                log::warn!("two interactables in range at depth {depth}; keeping the nearest");
                if distance < best {
                    nearest = Some((distance, target));
                }
            } else {
                nearest = Some((distance, target));
            }
        };

        for question in &self.scenario.questions {
            if self.progress.solved.contains(&question.id) {
                continue;
            }
            let distance = (depth - question.depth).abs();
            if distance <= GATE_RADIUS {
                consider(distance, Interactable::Gate(question.id));
            }
        }

        if !self.progress.chest_opened {
            let distance = (depth - CHEST_DEPTH).abs();
            if distance <= CHEST_RADIUS {
                consider(distance, Interactable::Chest);
            }
        }

        nearest.map(|(_, target)| target)
    }

    /// Press or release the walk input.
    pub fn set_move_held(&mut self, held: bool) {
        self.move_held = held;
    }

    /// Advance the clock by `dt` seconds. Resolves pending board deadlines,
    /// applies movement, and checks the victory condition.
    pub fn tick(&mut self, dt: f64) {
        self.clock += dt;

        if let Some(interaction) = self.interaction.as_mut() {
            if let Some(board) = interaction.board.as_mut() {
                board.tick(self.clock);
            }
        }

        if self.victorious {
            return;
        }

        // Walking is a hard gate: no overlay open and nothing in range.
        if self.move_held && self.interaction.is_none() && self.nearby_interactable().is_none() {
            self.progress.depth -= WALK_SPEED * dt as f32;
        }

        if self.progress.has_key && self.progress.depth <= RESCUE_DEPTH + VICTORY_MARGIN {
            self.victorious = true;
            self.events.push_back(EngineEvent::CurrencyAwarded(VICTORY_REWARD));
            self.events.push_back(EngineEvent::Victory);
        }
    }

    /// Open the overlay for whatever is in range. Returns the target, or
    /// `None` when nothing is nearby or an overlay is already open.
    pub fn interact(&mut self) -> Option<Interactable> {
        if self.interaction.is_some() || self.victorious {
            return None;
        }
        let target = self.nearby_interactable()?;

        let board = match target {
            Interactable::Gate(id) => match self.scenario.question(id).map(|q| &q.challenge) {
                Some(Challenge::CardMatch { pairs }) => {
                    Some(MatchBoard::new(pairs, &mut self.rng))
                }
                _ => None,
            },
            Interactable::Chest => None,
        };

        self.interaction = Some(Interaction { target, board });
        Some(target)
    }

    /// Close the open overlay without answering. Progress is untouched and
    /// the gate can be re-approached at will.
    pub fn cancel(&mut self) {
        self.interaction = None;
    }

    /// Click a card on the open matching board. Solving the board completes
    /// the gate exactly like a correct text answer would.
    pub fn flip_card(&mut self, index: usize) {
        let Some(interaction) = self.interaction.as_mut() else {
            return;
        };
        let Some(board) = interaction.board.as_mut() else {
            return;
        };

        board.flip(index, self.clock);
        if board.is_solved() {
            self.submit_board();
        }
    }

    /// Resolve a solved matching board against its gate.
    fn submit_board(&mut self) {
        let Some(interaction) = self.interaction.as_ref() else {
            return;
        };
        let Interactable::Gate(id) = interaction.target else {
            return;
        };
        let Some(board) = interaction.board.as_ref() else {
            return;
        };

        let submission = Submission::Matching {
            matched_cards: board.matched_cards(),
        };
        let Some(question) = self.scenario.question(id) else {
            return;
        };
        if evaluate(question, &submission) {
            self.complete_gate(id);
        }
    }

    /// Submit an answer to the open overlay. Wrong answers keep the overlay
    /// open for another try; there is no attempt limit and no penalty.
    pub fn submit(&mut self, submission: &Submission) {
        let Some(interaction) = self.interaction.as_ref() else {
            return;
        };
        let target = interaction.target;

        match target {
            Interactable::Gate(id) => {
                let correct = self
                    .scenario
                    .question(id)
                    .is_some_and(|question| evaluate(question, submission));
                if correct {
                    self.complete_gate(id);
                } else {
                    self.events.push_back(EngineEvent::AnswerRejected);
                }
            }
            Interactable::Chest => {
                let correct = match submission {
                    Submission::Text(text) | Submission::Choice(text) => {
                        quiz_rules::answer_matches(&self.scenario.final_riddle.answer, text)
                    }
                    _ => false,
                };
                if correct {
                    self.progress.chest_opened = true;
                    self.progress.has_key = true;
                    self.interaction = None;
                    self.events.push_back(EngineEvent::ChestOpened);
                    self.events.push_back(EngineEvent::CurrencyAwarded(CHEST_REWARD));
                } else {
                    self.events.push_back(EngineEvent::AnswerRejected);
                }
            }
        }
    }

    fn complete_gate(&mut self, id: QuestionId) {
        self.progress.solved.insert(id);
        self.interaction = None;
        self.events.push_back(EngineEvent::GateOpened(id));
        self.events.push_back(EngineEvent::CurrencyAwarded(GATE_REWARD));
    }

    /// The question behind the currently open gate overlay, for rendering.
    pub fn open_question(&self) -> Option<&Question> {
        match self.interaction.as_ref()?.target {
            Interactable::Gate(id) => self.scenario.question(id),
            Interactable::Chest => None,
        }
    }
}
