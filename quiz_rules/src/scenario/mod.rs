//! Scenario definitions - one playable rescue story and its corridor layout.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::questions::{Question, QuestionId};

/// Distance within which a gate becomes interactable.
pub const GATE_RADIUS: f32 = 4.0;
/// Distance within which the chest becomes interactable.
pub const CHEST_RADIUS: f32 = 5.0;
/// Depth of the riddle chest along the corridor.
pub const CHEST_DEPTH: f32 = -320.0;
/// Depth of the captive waiting at the end of the corridor.
pub const RESCUE_DEPTH: f32 = -350.0;

/// Identifier of a teachable language (e.g. `"english"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageId(pub String);

impl LanguageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LanguageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a proficiency level (e.g. `"A1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(pub String);

impl LevelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LevelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a castle role the player can play, or that can be captive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvatarId(pub String);

impl AvatarId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AvatarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a scenario in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(pub String);

impl ScenarioId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The bonus riddle guarding the end-of-corridor chest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Riddle {
    pub prompt: String,
    pub answer: String,
    pub choices: Vec<String>,
}

/// One playable rescue story: a captive, an intro, ten-odd gated questions
/// and a final riddle chest. Loaded from the static catalog and never
/// mutated during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub language: LanguageId,
    pub level: LevelId,

    /// The character held captive in this story. A player may not pick this
    /// role as their own avatar - nobody rescues themselves.
    pub captive: AvatarId,
    pub captive_name: String,

    pub title: String,
    pub intro: String,

    pub final_riddle: Riddle,

    /// Ordered by strictly decreasing depth; encountered in list order.
    pub questions: Vec<Question>,
}

/// Content-validation failures for a scenario. These are authoring bugs, not
/// runtime conditions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    #[error("scenario {scenario} has no questions")]
    NoQuestions { scenario: ScenarioId },

    #[error("scenario {scenario}: question {question} repeats an id")]
    DuplicateQuestionId {
        scenario: ScenarioId,
        question: QuestionId,
    },

    #[error(
        "scenario {scenario}: question {question} at depth {depth} does not go \
         deeper than the previous gate at {previous}"
    )]
    DepthsNotDecreasing {
        scenario: ScenarioId,
        question: QuestionId,
        depth: f32,
        previous: f32,
    },

    #[error(
        "scenario {scenario}: gates {first} and {second} are only {gap} apart, \
         closer than twice the proximity radius"
    )]
    GatesTooClose {
        scenario: ScenarioId,
        first: QuestionId,
        second: QuestionId,
        gap: f32,
    },

    #[error(
        "scenario {scenario}: last gate at depth {depth} is not in front of \
         the chest at {chest}"
    )]
    ChestBehindGate {
        scenario: ScenarioId,
        depth: f32,
        chest: f32,
    },
}

impl Scenario {
    /// Look up a question by id.
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Check the corridor-layout invariants: depths strictly decrease, gates
    /// are spaced far enough apart that at most one can ever be in proximity
    /// range, and the chest sits beyond the last gate (the rescue target is
    /// a fixed constant beyond the chest).
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.questions.is_empty() {
            return Err(ScenarioError::NoQuestions {
                scenario: self.id.clone(),
            });
        }

        for (index, question) in self.questions.iter().enumerate() {
            if self.questions[..index].iter().any(|q| q.id == question.id) {
                return Err(ScenarioError::DuplicateQuestionId {
                    scenario: self.id.clone(),
                    question: question.id,
                });
            }

            if let Some(previous) = index.checked_sub(1).map(|i| &self.questions[i]) {
                if question.depth >= previous.depth {
                    return Err(ScenarioError::DepthsNotDecreasing {
                        scenario: self.id.clone(),
                        question: question.id,
                        depth: question.depth,
                        previous: previous.depth,
                    });
                }

                let gap = previous.depth - question.depth;
                if gap < GATE_RADIUS * 2.0 {
                    return Err(ScenarioError::GatesTooClose {
                        scenario: self.id.clone(),
                        first: previous.id,
                        second: question.id,
                        gap,
                    });
                }
            }
        }

        if let Some(last) = self.questions.last() {
            if last.depth - CHEST_DEPTH < GATE_RADIUS + CHEST_RADIUS {
                return Err(ScenarioError::ChestBehindGate {
                    scenario: self.id.clone(),
                    depth: last.depth,
                    chest: CHEST_DEPTH,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::Challenge;

    fn gate(id: u32, depth: f32) -> Question {
        Question {
            id: QuestionId(id),
            prompt: format!("question {id}"),
            story_text: None,
            depth,
            challenge: Challenge::Synonym {
                answer: "word".into(),
            },
        }
    }

    fn scenario(questions: Vec<Question>) -> Scenario {
        Scenario {
            id: ScenarioId::new("test"),
            language: LanguageId::new("english"),
            level: LevelId::new("A1"),
            captive: AvatarId::new("king"),
            captive_name: "King George".into(),
            title: "The Golden Crown".into(),
            intro: "intro".into(),
            final_riddle: Riddle {
                prompt: "riddle".into(),
                answer: "A clock".into(),
                choices: vec!["A clock".into(), "The sun".into()],
            },
            questions,
        }
    }

    #[test]
    fn test_valid_layout_passes() {
        let s = scenario(vec![gate(1, -20.0), gate(2, -50.0), gate(3, -80.0)]);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_empty_scenario_rejected() {
        let s = scenario(vec![]);
        assert!(matches!(
            s.validate(),
            Err(ScenarioError::NoQuestions { .. })
        ));
    }

    #[test]
    fn test_non_decreasing_depths_rejected() {
        let s = scenario(vec![gate(1, -50.0), gate(2, -20.0)]);
        assert!(matches!(
            s.validate(),
            Err(ScenarioError::DepthsNotDecreasing { .. })
        ));
    }

    #[test]
    fn test_gates_too_close_rejected() {
        let s = scenario(vec![gate(1, -20.0), gate(2, -25.0)]);
        assert!(matches!(
            s.validate(),
            Err(ScenarioError::GatesTooClose { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let s = scenario(vec![gate(1, -20.0), gate(1, -50.0)]);
        assert!(matches!(
            s.validate(),
            Err(ScenarioError::DuplicateQuestionId { .. })
        ));
    }

    #[test]
    fn test_gate_on_top_of_chest_rejected() {
        let s = scenario(vec![gate(1, -20.0), gate(2, -318.0)]);
        assert!(matches!(
            s.validate(),
            Err(ScenarioError::ChestBehindGate { .. })
        ));
    }

    #[test]
    fn test_question_lookup() {
        let s = scenario(vec![gate(1, -20.0), gate(2, -50.0)]);
        assert!(s.question(QuestionId(2)).is_some());
        assert!(s.question(QuestionId(9)).is_none());
    }
}
