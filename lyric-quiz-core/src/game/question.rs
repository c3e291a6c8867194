use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// A multiple-choice question waiting for an answer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Question {
	pub question_id: String,
	pub incomplete_lyric: String,
	pub correct_answer: String,
	/// The correct answer and its distractors, shuffled.
	pub options: Vec<String>,
}

impl Question {
	pub fn new<R: Rng + ?Sized>(incomplete_lyric: String, correct_answer: String, distractors: Vec<String>, rng: &mut R) -> Self {
		let mut options = Vec::with_capacity(distractors.len() + 1);
		options.push(correct_answer.clone());
		options.extend(distractors);
		options.shuffle(rng);

		Self {
			question_id: format!("q_{}", rng.random_range(10000..=99999)),
			incomplete_lyric,
			correct_answer,
			options,
		}
	}

	/// Case-insensitive exact match against the correct answer.
	pub fn is_correct(&self, answer: &str) -> bool {
		answer.to_lowercase() == self.correct_answer.to_lowercase()
	}
}

/// Result of checking an answer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
	pub correct: bool,
	pub correct_answer: String,
	pub feedback: String,
	pub score: u32,
	pub questions_answered: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionStats {
	pub score: u32,
	pub questions_answered: u32,
	pub correct_answers: u32,
	pub accuracy_percent: f64,
}

/// A catalog song as listed to players.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SongSummary {
	pub title: String,
	pub album: String,
	pub parts: Vec<String>,
}
