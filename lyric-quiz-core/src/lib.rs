//! Fill-in-the-blank lyric quiz engine.
//!
//! This crate provides:
//! - A word-level n-gram model built from a lyrics corpus
//! - Synthetic question generation with plausible distractors
//! - Ordered playback through the real lines of a song section
//! - Thread-safe game sessions behind a single manager
//!
//! Corpus loading helpers stay internal; callers go through `GameManager`.

/// Word n-gram model, question generator and distractor selection.
pub mod model;

/// Sessions, song catalog and the game manager.
pub mod game;

/// Errors reported by the game core.
pub mod error;

/// Corpus loading (album file, training directory, path helpers).
pub(crate) mod io;

pub use error::GameError;
pub use game::{GameConfig, GameManager};
