use log::debug;
use rand::Rng;

use super::catalog::SongCatalog;
use super::part::PartLabel;
use super::question::{AnswerOutcome, Question, SessionStats};
use crate::error::GameError;
use crate::model::distractor::DistractorSelector;
use crate::model::generator::BLANK;
use crate::model::ngram_model::NGramModel;

/// Progress through the real lines of one song section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Playback {
	/// No song section selected yet.
	#[default]
	Uninitialized,
	/// A song section is selected. `lines` may be empty when the section has
	/// no usable line; the next request rebuilds it.
	Ordered {
		song_key: String,
		part: PartLabel,
		lines: Vec<String>,
		cursor: usize,
	},
}

impl Playback {
	fn needs_rebuild(&self, song_key: &str, part: &PartLabel) -> bool {
		match self {
			Playback::Uninitialized => true,
			Playback::Ordered { song_key: current, part: current_part, lines, .. } => {
				current != song_key || current_part != part || lines.is_empty()
			}
		}
	}
}

/// Score and progress of one player.
///
/// A session holds at most one pending question. Answering it, right or
/// wrong, clears it.
#[derive(Debug, Clone)]
pub struct GameSession {
	id: String,
	score: u32,
	questions_answered: u32,
	correct_answers: u32,
	pending: Option<Question>,
	playback: Playback,
}

impl GameSession {
	pub fn new(id: impl Into<String>, starting_score: u32) -> Self {
		Self {
			id: id.into(),
			score: starting_score,
			questions_answered: 0,
			correct_answers: 0,
			pending: None,
			playback: Playback::Uninitialized,
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn score(&self) -> u32 {
		self.score
	}

	pub fn pending(&self) -> Option<&Question> {
		self.pending.as_ref()
	}

	pub fn playback(&self) -> &Playback {
		&self.playback
	}

	/// Replaces the pending question.
	pub fn set_pending(&mut self, question: Question) {
		self.pending = Some(question);
	}

	/// Next question from the real lines of `song`'s `part`.
	///
	/// The selection is rebuilt whenever the song or the part differs from the
	/// previous call, or when the stored lines are empty. Lines are then served
	/// in order and cycle back to the first one once exhausted.
	///
	/// # Errors
	/// - `SongNotFound` or `UnknownPart` leave the playback untouched.
	/// - `InsufficientData` when the section has no usable line, or when too
	///   few distractors exist for the drawn line.
	pub fn ordered_question<R: Rng + ?Sized>(
		&mut self,
		catalog: &SongCatalog,
		model: &NGramModel,
		song: &str,
		part: &str,
		distractor_count: usize,
		rng: &mut R,
	) -> Result<Question, GameError> {
		let song_key = SongCatalog::key(song);
		let entry = catalog.get(&song_key).ok_or_else(|| GameError::SongNotFound(song.to_owned()))?;
		let part = PartLabel::resolve(part)?;

		if self.playback.needs_rebuild(&song_key, &part) {
			let lines = entry.ordered_lines(&part);
			debug!("Session {}: {} lines for '{}' ({})", self.id, lines.len(), entry.title, part);
			self.playback = Playback::Ordered { song_key, part, lines, cursor: 0 };
		}

		let line = match &mut self.playback {
			Playback::Ordered { lines, cursor, .. } if !lines.is_empty() => {
				let line = lines[*cursor % lines.len()].clone();
				*cursor = (*cursor + 1) % lines.len();
				line
			}
			_ => return Err(GameError::insufficient(format!("no playable line in '{}'", entry.title))),
		};

		let mut words: Vec<&str> = line.split_whitespace().collect();
		if words.len() < 3 {
			return Err(GameError::insufficient("line too short"));
		}
		let position = rng.random_range(1..=words.len() - 2);
		let correct_word = std::mem::replace(&mut words[position], BLANK).to_owned();

		let distractors = DistractorSelector::new(model).similar_length(&correct_word, distractor_count, rng);
		if distractors.len() < distractor_count {
			return Err(GameError::insufficient(format!(
				"only {} of {} distractors available",
				distractors.len(),
				distractor_count
			)));
		}

		Ok(Question::new(words.join(" "), correct_word, distractors, rng))
	}

	/// Checks `answer` against the pending question and clears it.
	///
	/// # Errors
	/// Returns `NoPendingQuestion` when there is nothing to answer.
	pub fn answer(&mut self, answer: &str, wrong_penalty: u32) -> Result<AnswerOutcome, GameError> {
		let question = self.pending.take().ok_or(GameError::NoPendingQuestion)?;
		let correct = question.is_correct(answer);

		self.questions_answered += 1;
		if correct {
			self.correct_answers += 1;
		} else {
			self.score = self.score.saturating_sub(wrong_penalty);
		}

		let feedback = if correct {
			"Correct!".to_owned()
		} else {
			format!("Wrong! The correct answer was '{}'", question.correct_answer)
		};

		Ok(AnswerOutcome {
			correct,
			correct_answer: question.correct_answer,
			feedback,
			score: self.score,
			questions_answered: self.questions_answered,
		})
	}

	pub fn stats(&self) -> SessionStats {
		let accuracy_percent = if self.questions_answered == 0 {
			0.0
		} else {
			self.correct_answers as f64 / self.questions_answered as f64 * 100.0
		};

		SessionStats {
			score: self.score,
			questions_answered: self.questions_answered,
			correct_answers: self.correct_answers,
			accuracy_percent,
		}
	}
}
