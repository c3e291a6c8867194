use std::collections::{HashMap, HashSet};
use std::sync::mpsc;
use std::thread;

use log::{info, warn};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

use super::state::State;
use crate::error::GameError;

/// Default n-gram order (trigrams).
pub const DEFAULT_ORDER: usize = 3;

/// Lines with more tokens than this are not indexed.
pub const MAX_LINE_TOKENS: usize = 500;

/// Splits a line into lowercase words.
///
/// Words are maximal runs of ASCII letters; everything else
/// (punctuation, digits, non-ASCII letters, whitespace) separates them.
pub fn tokenize(line: &str) -> Vec<String> {
	line.split(|c: char| !c.is_ascii_alphabetic())
		.filter(|word| !word.is_empty())
		.map(str::to_ascii_lowercase)
		.collect()
}

/// Summary counts exposed to callers.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelStats {
	pub vocabulary_size: usize,
	pub context_count: usize,
	pub total_observations: usize,
}

/// Mutable n-gram counts for a set of lines.
///
/// Counters built over disjoint chunks of a corpus can be merged, which is
/// how `NGramModel::build` spreads the work over several threads.
///
/// # Invariants
/// - `n` is always >= 2
/// - Each state corresponds to a unique prefix of length `n-1`
/// - N-grams never span two lines
#[derive(Debug)]
pub struct NGramCounter {
	n: usize,
	vocabulary: HashSet<String>,
	states: HashMap<Vec<String>, State>,
	accepted: usize,
	skipped: usize,
}

impl NGramCounter {
	/// Creates an empty counter of order `n`.
	///
	/// # Errors
	/// Returns an error if `n < 2`.
	pub fn new(n: usize) -> Result<Self, GameError> {
		if n < 2 {
			return Err(GameError::InvalidParameter("n must be >= 2".to_owned()));
		}
		Ok(Self::blank(n))
	}

	fn blank(n: usize) -> Self {
		Self {
			n,
			vocabulary: HashSet::new(),
			states: HashMap::new(),
			accepted: 0,
			skipped: 0,
		}
	}

	/// Adds one raw line to the counts.
	///
	/// The line is skipped when it yields fewer than `n` or more than
	/// `MAX_LINE_TOKENS` words. Returns whether the line was indexed.
	pub fn add_line(&mut self, line: &str) -> bool {
		let words = tokenize(line);
		if words.len() < self.n || words.len() > MAX_LINE_TOKENS {
			self.skipped += 1;
			return false;
		}

		self.vocabulary.extend(words.iter().cloned());

		for window in words.windows(self.n) {
			let (prefix, next) = window.split_at(self.n - 1);
			self.states
				.entry(prefix.to_vec())
				.or_insert_with(|| State::new(prefix))
				.add_transition(&next[0]);
		}

		self.accepted += 1;
		true
	}

	/// Merges another counter of the same order into this one.
	///
	/// # Errors
	/// Returns an error if the orders do not match.
	pub fn merge(&mut self, other: NGramCounter) -> Result<(), GameError> {
		if self.n != other.n {
			return Err(GameError::InvalidParameter("N mismatch".to_owned()));
		}

		for (key, state) in other.states {
			if let Some(existing) = self.states.get_mut(&key) {
				existing.merge(&state)?;
			} else {
				self.states.insert(key, state);
			}
		}

		self.vocabulary.extend(other.vocabulary);
		self.accepted += other.accepted;
		self.skipped += other.skipped;

		Ok(())
	}

	/// Freezes the counts into a read-only model.
	pub fn seal(self) -> NGramModel {
		let mut states: Vec<State> = self.states.into_values().collect();
		states.sort_by(|a, b| a.key().cmp(b.key()));

		let mut index = HashMap::with_capacity(states.len());
		let mut word_contexts: HashMap<String, Vec<usize>> = HashMap::new();
		for (position, state) in states.iter_mut().enumerate() {
			state.seal();
			index.insert(state.key().to_vec(), position);

			let mut seen = HashSet::new();
			for word in state.key() {
				if seen.insert(word.as_str()) {
					word_contexts.entry(word.clone()).or_default().push(position);
				}
			}
		}

		let mut vocabulary: Vec<String> = self.vocabulary.into_iter().collect();
		vocabulary.sort();

		NGramModel {
			n: self.n,
			vocabulary,
			states,
			index,
			word_contexts,
		}
	}
}

/// Read-only word n-gram model.
///
/// Holds the vocabulary and, for every observed (n-1)-word context, the
/// counts of the words that followed it. Built once, then shared between
/// any number of readers.
///
/// Contexts are kept sorted by key so that a seeded random source always
/// walks the model the same way.
#[derive(Debug)]
pub struct NGramModel {
	/// Order of the model (number of words in an n-gram).
	n: usize,
	/// Sorted unique words.
	vocabulary: Vec<String>,
	/// One sealed state per context.
	states: Vec<State>,
	/// Context key -> position in `states`.
	index: HashMap<Vec<String>, usize>,
	/// Word -> positions of the contexts whose key contains it.
	word_contexts: HashMap<String, Vec<usize>>,
}

impl NGramModel {
	/// An order-`n` model without any data.
	pub fn empty(n: usize) -> Result<Self, GameError> {
		Ok(NGramCounter::new(n)?.seal())
	}

	/// Builds a model from raw lines.
	///
	/// # Behavior
	/// - Splits the lines into chunks (based on CPU cores * factor).
	/// - Spawns threads to count each chunk into a partial `NGramCounter`.
	/// - Merges all partial counters, then seals the result.
	///
	/// # Notes
	/// - Merging only sums counts, so the model is identical to a
	///   sequential build over the same lines.
	/// - An empty input, or one where every line is rejected, yields an empty
	///   but usable model.
	pub fn build(lines: &[String], n: usize) -> Result<Self, GameError> {
		let mut counter = NGramCounter::new(n)?;

		if !lines.is_empty() {
			let cpus = num_cpus::get();
			let factor = 8;
			let chunks = cpus * factor;
			let chunk_size = lines.len().div_ceil(chunks).max(1);

			let (tx, rx) = mpsc::channel();
			for chunk in lines.chunks(chunk_size) {
				let tx = tx.clone();
				let chunk: Vec<String> = chunk.to_vec();

				thread::spawn(move || {
					let mut partial = NGramCounter::blank(n);
					for line in &chunk {
						partial.add_line(line);
					}
					// The receiver outlives every sender
					let _ = tx.send(partial);
				});
			}
			drop(tx);

			for partial in rx.iter() {
				counter.merge(partial)?;
			}
		}

		let (accepted, skipped) = (counter.accepted, counter.skipped);
		let model = counter.seal();

		info!(
			"Built model: {} words, {} contexts ({} lines indexed, {} skipped)",
			model.vocabulary.len(),
			model.states.len(),
			accepted,
			skipped
		);
		if accepted == 0 {
			warn!("No valid lyrics processed, question generation will be unavailable");
		}

		Ok(model)
	}

	pub fn order(&self) -> usize {
		self.n
	}

	/// Sorted unique words.
	pub fn vocabulary(&self) -> &[String] {
		&self.vocabulary
	}

	pub fn context_count(&self) -> usize {
		self.states.len()
	}

	/// True when no context was ever observed.
	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Sum of every context's counts, i.e. the number of indexed n-grams.
	pub fn total_observations(&self) -> usize {
		self.states.iter().map(State::total).sum()
	}

	pub fn stats(&self) -> ModelStats {
		ModelStats {
			vocabulary_size: self.vocabulary.len(),
			context_count: self.context_count(),
			total_observations: self.total_observations(),
		}
	}

	/// Looks up the state of a context.
	pub fn state<S: AsRef<str>>(&self, context: &[S]) -> Option<&State> {
		let key: Vec<String> = context.iter().map(|w| w.as_ref().to_owned()).collect();
		self.index.get(&key).map(|&position| &self.states[position])
	}

	/// Normalized next-word probabilities for a context.
	///
	/// Empty when the context was never observed.
	pub fn next_word_distribution<S: AsRef<str>>(&self, context: &[S]) -> HashMap<String, f64> {
		self.state(context).map(State::distribution).unwrap_or_default()
	}

	/// Returns a uniformly chosen context, used to seed a generation.
	///
	/// Returns `None` if the model has no states.
	pub fn get_random_context<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&State> {
		self.states.choose(rng)
	}

	/// Every context whose key contains `word`.
	pub fn contexts_with_word<'a>(&'a self, word: &str) -> impl Iterator<Item = &'a State> + use<'a> {
		self.word_contexts
			.get(word)
			.into_iter()
			.flatten()
			.map(|&position| &self.states[position])
	}
}
