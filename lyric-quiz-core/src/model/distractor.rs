use std::collections::{BTreeSet, HashSet};

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use super::ngram_model::NGramModel;

/// Number of wrong options offered with every question.
pub const DEFAULT_DISTRACTORS: usize = 4;

/// Picks plausible wrong answers from a model's vocabulary.
///
/// Two modes are offered:
/// - `contextual`: prefers words that followed a context sharing a word
///   with the question line, then falls back to random vocabulary.
/// - `similar_length`: prefers words whose length is within two characters
///   of the answer, then falls back to random vocabulary.
///
/// Both modes never return the correct word (compared case-insensitively)
/// and never return the same word twice. When the vocabulary holds at least
/// `count` words besides the answer, exactly `count` words are returned.
pub struct DistractorSelector<'m> {
	model: &'m NGramModel,
}

impl<'m> DistractorSelector<'m> {
	pub fn new(model: &'m NGramModel) -> Self {
		Self { model }
	}

	/// Selects up to `count` distractors for a generated line.
	///
	/// `context_words` are the words of the line the answer came from.
	pub fn contextual<S, R>(&self, correct_word: &str, context_words: &[S], count: usize, rng: &mut R) -> Vec<String>
	where
		S: AsRef<str>,
		R: Rng + ?Sized,
	{
		let correct = correct_word.to_lowercase();

		// Followers of every context whose key mentions one of the line's words
		let mut similar: BTreeSet<&str> = BTreeSet::new();
		for word in context_words {
			let word = word.as_ref().to_lowercase();
			for state in self.model.contexts_with_word(&word) {
				similar.extend(state.next_words().iter().map(String::as_str));
			}
		}
		similar.remove(correct.as_str());

		let mut similar: Vec<&str> = similar.into_iter().collect();
		similar.shuffle(rng);

		let mut chosen: Vec<String> = similar.into_iter().take(count).map(str::to_owned).collect();
		self.fill_from_vocabulary(&correct, &mut chosen, count, rng);
		chosen
	}

	/// Selects up to `count` distractors of a length close to the answer's.
	pub fn similar_length<R: Rng + ?Sized>(&self, correct_word: &str, count: usize, rng: &mut R) -> Vec<String> {
		let correct = correct_word.to_lowercase();
		let target = correct_word.chars().count();

		let candidates: Vec<&String> = self
			.model
			.vocabulary()
			.iter()
			.filter(|word| **word != correct && word.chars().count().abs_diff(target) <= 2)
			.collect();

		let mut chosen: Vec<String> = candidates
			.choose_multiple(rng, count)
			.map(|word| (*word).clone())
			.collect();
		self.fill_from_vocabulary(&correct, &mut chosen, count, rng);
		chosen
	}

	/// Tops `chosen` up to `count` with uniformly drawn vocabulary words.
	fn fill_from_vocabulary<R: Rng + ?Sized>(&self, correct: &str, chosen: &mut Vec<String>, count: usize, rng: &mut R) {
		if chosen.len() >= count {
			chosen.truncate(count);
			return;
		}

		let taken: HashSet<&str> = chosen.iter().map(String::as_str).collect();
		let pool: Vec<&String> = self
			.model
			.vocabulary()
			.iter()
			.filter(|word| word.as_str() != correct && !taken.contains(word.as_str()))
			.collect();

		let missing = count - chosen.len();
		let extra: Vec<String> = pool.choose_multiple(rng, missing).map(|word| (*word).clone()).collect();
		chosen.extend(extra);
	}
}
