use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::model::distractor::DEFAULT_DISTRACTORS;
use crate::model::ngram_model::DEFAULT_ORDER;

/// Tunables of the game and of its language model.
///
/// Every field has a default, so a partial JSON document is a valid config.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
	/// Order of the word n-gram model.
	pub ngram_order: usize,
	/// Shortest generated line, in words.
	pub min_length: usize,
	/// Longest generated line, in words.
	pub max_length: usize,
	/// Wrong options offered with every question.
	pub distractor_count: usize,
	/// Generative attempts before a question request gives up.
	pub generation_attempts: usize,
	pub starting_score: u32,
	/// Points lost per wrong answer. The score never drops below zero.
	pub wrong_penalty: u32,
}

impl Default for GameConfig {
	fn default() -> Self {
		Self {
			ngram_order: DEFAULT_ORDER,
			min_length: 5,
			max_length: 10,
			distractor_count: DEFAULT_DISTRACTORS,
			generation_attempts: 5,
			starting_score: 100,
			wrong_penalty: 10,
		}
	}
}

impl GameConfig {
	/// Checks the values a game cannot run with.
	///
	/// # Errors
	/// Returns `InvalidParameter` naming the first offending field.
	pub fn validate(&self) -> Result<(), GameError> {
		if self.ngram_order < 2 {
			return Err(GameError::InvalidParameter("ngram_order must be >= 2".to_owned()));
		}
		if self.min_length > self.max_length {
			return Err(GameError::InvalidParameter("min_length must not exceed max_length".to_owned()));
		}
		if self.generation_attempts == 0 {
			return Err(GameError::InvalidParameter("generation_attempts must be >= 1".to_owned()));
		}
		Ok(())
	}
}
