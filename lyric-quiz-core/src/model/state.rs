use std::collections::HashMap;

use rand::Rng;

use crate::error::GameError;

/// Represents a context in the word n-gram model.
///
/// A `State` corresponds to a fixed (n-1)-word prefix (`key`) and stores
/// every observed continuation of this prefix together with its count.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Lifecycle
/// - While counting, `add_transition` and `merge` accumulate occurrences.
/// - `seal` freezes the transitions into a word list sorted alphabetically
///   plus a cumulative count table, used by `predict` for a binary-search draw.
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
/// - After `seal`, `cumulative.last()` equals the sum of all counts
#[derive(Clone, Debug)]
pub struct State {
	/// Identifier of the state (n-1 word prefix).
	key: Vec<String>,
	/// Outgoing transitions indexed by the next word.
	/// Example: { "stay" => 3, "away" => 1 }
	transitions: HashMap<String, usize>,
	/// Sealed continuations, sorted.
	words: Vec<String>,
	/// Running total of counts aligned with `words`.
	cumulative: Vec<usize>,
}

impl State {
	/// Creates a new empty state for the given prefix.
	pub fn new(key: &[String]) -> Self {
		Self {
			key: key.to_vec(),
			transitions: HashMap::new(),
			words: Vec::new(),
			cumulative: Vec::new(),
		}
	}

	pub fn key(&self) -> &[String] {
		&self.key
	}

	/// Records an occurrence of a transition toward `next_word`.
	pub fn add_transition(&mut self, next_word: &str) {
		*self.transitions.entry(next_word.to_owned()).or_insert(0) += 1;
	}

	/// Freezes the transitions into the cumulative table used for sampling.
	pub fn seal(&mut self) {
		let mut pairs: Vec<(&String, &usize)> = self.transitions.iter().collect();
		pairs.sort_by(|a, b| a.0.cmp(b.0));

		self.words = pairs.iter().map(|(word, _)| (*word).clone()).collect();
		self.cumulative = pairs
			.iter()
			.scan(0usize, |running, (_, occurrence)| {
				*running += **occurrence;
				Some(*running)
			})
			.collect();
	}

	/// Total number of observations of this context.
	pub fn total(&self) -> usize {
		self.transitions.values().sum()
	}

	/// Occurrence count of a single continuation.
	pub fn count(&self, word: &str) -> usize {
		self.transitions.get(word).copied().unwrap_or(0)
	}

	/// Continuations in sealed (alphabetical) order.
	pub fn next_words(&self) -> &[String] {
		&self.words
	}

	/// Normalized probability of every continuation.
	///
	/// Returns an empty map when the state has no observations.
	pub fn distribution(&self) -> HashMap<String, f64> {
		let total = self.total();
		if total == 0 {
			return HashMap::new();
		}
		self.transitions
			.iter()
			.map(|(word, occurrence)| (word.clone(), *occurrence as f64 / total as f64))
			.collect()
	}

	/// Predicts the next word using weighted random sampling.
	///
	/// The probability of selecting a word is proportional to its
	/// occurrence count. A single draw in `0..total` is located in the
	/// cumulative table with a binary search.
	///
	/// Returns `None` if the state has no transitions or was never sealed.
	pub fn predict<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		let total = *self.cumulative.last()?;
		if total == 0 {
			return None;
		}

		let r = rng.random_range(0..total);
		let index = self.cumulative.partition_point(|&running| running <= r);
		self.words.get(index).map(String::as_str)
	}

	/// Merges another state into this one.
	///
	/// Both states must represent the same prefix (`key`).
	/// Transition occurrence counts are summed. The merged state must be
	/// sealed again before sampling.
	///
	/// # Errors
	/// Returns an error if the state keys do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), GameError> {
		if self.key != other.key {
			return Err(GameError::InvalidParameter("Key mismatch".to_owned()));
		}

		for (next_word, occurrence) in &other.transitions {
			*self.transitions.entry(next_word.clone()).or_insert(0) += *occurrence;
		}

		Ok(())
	}
}
