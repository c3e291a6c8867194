use rand::Rng;

use super::distractor::DistractorSelector;
use super::ngram_model::NGramModel;
use crate::error::GameError;

/// Marker replacing the removed word in a question line.
pub const BLANK: &str = "___";

/// A synthetic lyric line with one interior word blanked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteLyric {
	pub incomplete_line: String,
	pub correct_word: String,
	pub distractors: Vec<String>,
}

/// Generates a fill-in-the-blank line by walking the model.
///
/// # Behavior
/// - Seeds the walk with the words of a uniformly chosen context.
/// - Draws a target length in `min_length..=max_length`.
/// - Appends weighted samples of the trailing context until the target is
///   reached or the trailing context has no continuation.
/// - Blanks a uniformly chosen word that is neither the first nor the last.
/// - Picks `distractor_count` contextual distractors, using the whole line
///   (removed word included) as context.
///
/// # Errors
/// - `InvalidParameter` if `min_length > max_length`.
/// - `InsufficientData` if the model is empty, the walk yields fewer than
///   three words, or fewer than `distractor_count` distractors exist.
pub fn generate_incomplete_lyric<R: Rng + ?Sized>(
	model: &NGramModel,
	min_length: usize,
	max_length: usize,
	distractor_count: usize,
	rng: &mut R,
) -> Result<IncompleteLyric, GameError> {
	if min_length > max_length {
		return Err(GameError::InvalidParameter(format!(
			"min_length ({min_length}) is greater than max_length ({max_length})"
		)));
	}

	let seed = model
		.get_random_context(rng)
		.ok_or_else(|| GameError::insufficient("the model has no contexts"))?;

	let mut words: Vec<String> = seed.key().to_vec();
	let context_len = model.order() - 1;
	let target = rng.random_range(min_length..=max_length);

	for _ in 0..target.saturating_sub(words.len()) {
		let trailing = &words[words.len() - context_len..];
		let next = match model.state(trailing).and_then(|state| state.predict(rng)) {
			Some(word) => word.to_owned(),
			None => break,
		};
		words.push(next);
	}

	if words.len() < 3 {
		return Err(GameError::insufficient(format!("generated line too short ({} words)", words.len())));
	}

	let position = rng.random_range(1..=words.len() - 2);
	let correct_word = words[position].clone();

	let distractors = DistractorSelector::new(model).contextual(&correct_word, &words, distractor_count, rng);
	if distractors.len() < distractor_count {
		return Err(GameError::insufficient(format!(
			"only {} of {} distractors available",
			distractors.len(),
			distractor_count
		)));
	}

	words[position] = BLANK.to_owned();
	Ok(IncompleteLyric {
		incomplete_line: words.join(" "),
		correct_word,
		distractors,
	})
}
