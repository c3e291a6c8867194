//! Word-level language model behind the quiz questions.
//!
//! This module provides:
//! - A fixed-order word n-gram model (`NGramModel`) and its builder (`NGramCounter`)
//! - Internal context state management (`State`)
//! - Synthetic fill-in-the-blank generation (`generate_incomplete_lyric`)
//! - Multiple-choice distractor selection (`DistractorSelector`)

/// Weighted random walk over the model producing an incomplete line.
///
/// Picks the blank position and delegates option building to the
/// distractor selector.
pub mod generator;

/// Fixed-order word n-gram model (`n >= 2`).
///
/// Handles tokenization, parallel transition counting, merging
/// and the read-only queries used by question generation.
pub mod ngram_model;

/// Plausible wrong answers, either context-based or length-based.
pub mod distractor;

/// Internal representation of a single n-gram context (prefix).
///
/// Tracks outgoing transitions and supports weighted random sampling.
mod state;

pub use state::State;
