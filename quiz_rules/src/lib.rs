//! # Quiz Rules
//!
//! The "content bible" crate - question model, answer evaluation, the
//! pair-matching board, and the scenario catalog for the Lingo Castle rescue
//! game. This crate is the single source of truth for quiz content and
//! contains no engine or presentation logic.

pub mod catalog;
pub mod matching;
pub mod questions;
pub mod scenario;

pub use catalog::*;
pub use matching::*;
pub use questions::*;
pub use scenario::*;
