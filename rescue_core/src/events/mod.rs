//! Engine events - discrete notifications consumed by presentation layers.
//!
//! The engine does not know how these are rendered; it only queues them.
//! Renderers and audio drains pull them via the engine's `drain_events`.

use quiz_rules::QuestionId;

/// A state change worth showing or sounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// A gate question was answered correctly and the gate swings open.
    GateOpened(QuestionId),

    /// The riddle chest was opened; the golden key is now held.
    ChestOpened,

    /// A submitted answer was wrong; the interaction stays open.
    AnswerRejected,

    /// Currency was earned (gate, chest, or victory bonus).
    CurrencyAwarded(u32),

    /// The captive was reached with the key in hand. Terminal for the run.
    Victory,
}
