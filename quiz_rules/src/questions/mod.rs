//! Question definitions - the ten quiz challenge kinds and their payloads.

mod evaluate;

pub use evaluate::*;

use serde::{Deserialize, Serialize};

/// Unique identifier for a question within its scenario. Doubles as the
/// gate's spatial marker in the corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(pub u32);

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One front/back word pair for card-matching challenges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPair {
    /// Word in the language being learned.
    pub front: String,
    /// Its translation in the player's language.
    pub back: String,
}

impl CardPair {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }
}

/// The challenge payload of a question. Each variant carries exactly the
/// answer shape its evaluator expects, so no runtime shape-checking of a
/// loose `answer` field is ever needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Challenge {
    /// Spot the grammatically broken sentence and write the corrected form.
    GrammarFix { answer: String },

    /// Find the synonym of a given word inside the prompt paragraph.
    Synonym { answer: String },

    /// Listen to a spoken sentence and transcribe it.
    Dictation { audio_text: String, answer: String },

    /// Pick the sentence that fills the gap in the story paragraph.
    GapFill {
        choices: Vec<String>,
        answer: String,
    },

    /// Rearrange shuffled sentences into the canonical order.
    Ordering {
        sentences: Vec<String>,
        answer: Vec<String>,
    },

    /// Listen to a spoken question and pick the right option.
    ListeningChoice {
        audio_text: String,
        choices: Vec<String>,
        answer: String,
    },

    /// Correct every one of several broken sentences in one free-text field.
    MultiCorrection { answers: Vec<String> },

    /// Translate an ordered word list, comma separated.
    WordTranslation { answers: Vec<String> },

    /// Complete the idiom from the given options.
    IdiomFill {
        choices: Vec<String>,
        answer: String,
    },

    /// Match every front card with its back card on a shuffled double deck.
    CardMatch { pairs: Vec<CardPair> },
}

impl Challenge {
    /// Selectable options, for the multiple-choice kinds.
    pub fn choices(&self) -> Option<&[String]> {
        match self {
            Challenge::GapFill { choices, .. }
            | Challenge::ListeningChoice { choices, .. }
            | Challenge::IdiomFill { choices, .. } => Some(choices),
            _ => None,
        }
    }

    /// Text to feed the speech synthesizer, for the listening kinds.
    pub fn audio_text(&self) -> Option<&str> {
        match self {
            Challenge::Dictation { audio_text, .. }
            | Challenge::ListeningChoice { audio_text, .. } => Some(audio_text),
            _ => None,
        }
    }

    /// Short machine name of the challenge kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Challenge::GrammarFix { .. } => "grammar_fix",
            Challenge::Synonym { .. } => "synonym",
            Challenge::Dictation { .. } => "dictation",
            Challenge::GapFill { .. } => "gap_fill",
            Challenge::Ordering { .. } => "ordering",
            Challenge::ListeningChoice { .. } => "listening_choice",
            Challenge::MultiCorrection { .. } => "multi_correction",
            Challenge::WordTranslation { .. } => "word_translation",
            Challenge::IdiomFill { .. } => "idiom_fill",
            Challenge::CardMatch { .. } => "card_match",
        }
    }
}

/// One quiz unit, tied to a gate in the corridor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,

    /// Instruction text shown to the player.
    pub prompt: String,

    /// Optional narrative fragment advancing the story at this gate.
    #[serde(default)]
    pub story_text: Option<String>,

    /// Depth coordinate of the gate along the corridor. Strictly decreasing
    /// across a scenario's question list.
    pub depth: f32,

    pub challenge: Challenge,
}

/// What the player actually handed in. Built by the input layer; the
/// evaluator treats a shape that does not fit the challenge kind as an
/// incorrect answer, never as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Free text, possibly multi-line.
    Text(String),
    /// A clicked option from the challenge's choices.
    Choice(String),
    /// The player's sentence ordering.
    Ordering(Vec<String>),
    /// State of a pair-matching board at submission time.
    Matching { matched_cards: usize },
}
