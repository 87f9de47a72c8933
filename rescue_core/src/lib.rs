//! # Rescue Core
//!
//! The engine of the Lingo Castle rescue game. This crate interfaces with
//! `quiz_rules`, drives a run through the corridor (movement, proximity,
//! gate interactions), and manages the persistent economy.
//!
//! ## Core Components
//!
//! - **run**: per-playthrough progress, the proximity resolver, and the
//!   corridor engine consuming the three logical inputs
//! - **session**: the top-level state machine from menu to victory
//! - **economy**: currency ledger and the external account store
//! - **events**: discrete notifications for the presentation layers
//!
//! ## Design Philosophy
//!
//! - **Input-Driven**: the engine reacts to logical input events and clock
//!   ticks; it never owns a render or audio loop
//! - **Injected randomness**: scenario draws and card shuffles use a seedable
//!   RNG, so every outcome is reproducible in tests
//! - **No ambient state**: account and session context are explicit values
//!   handed to the engine, never globals

pub mod economy;
pub mod events;
pub mod run;
pub mod session;

pub use economy::*;
pub use events::*;
pub use run::*;
pub use session::*;
