//! Quiz sessions over the song catalog and the language model.
//!
//! `GameManager` is the public entry point; the other modules hold the
//! pieces it is built from.

/// Game tunables with serde defaults.
pub mod config;

/// Song catalog: titles, albums and tagged, ordered lyric lines.
pub mod catalog;

/// Difficulty and section names resolved to song parts.
pub mod part;

/// Question, answer outcome and stats payloads.
pub mod question;

/// Per-player score, pending question and ordered playback.
pub mod session;

/// Concurrent map of live sessions with one lock per session.
pub mod store;

/// Session lifecycle and question generation for every caller.
pub mod manager;

pub use config::GameConfig;
pub use manager::GameManager;
