use std::path::Path;

use log::{debug, info, warn};
use rand::Rng;
use uuid::Uuid;

use super::catalog::SongCatalog;
use super::config::GameConfig;
use super::question::{AnswerOutcome, Question, SessionStats, SongSummary};
use super::session::GameSession;
use super::store::{SessionStore, SharedSession, lock_session};
use crate::error::GameError;
use crate::io;
use crate::model::generator::generate_incomplete_lyric;
use crate::model::ngram_model::{ModelStats, NGramModel};

/// Entry point of the game.
///
/// Owns the read-only model and catalog, plus the live sessions. Every
/// method takes `&self`, so one manager can be shared by any number of
/// request handlers.
#[derive(Debug)]
pub struct GameManager {
	model: NGramModel,
	catalog: SongCatalog,
	config: GameConfig,
	sessions: SessionStore,
}

impl GameManager {
	pub fn new(model: NGramModel, catalog: SongCatalog, config: GameConfig) -> Self {
		Self {
			model,
			catalog,
			config,
			sessions: SessionStore::new(),
		}
	}

	/// Loads the catalog and the training corpus, then builds the model.
	///
	/// # Behavior
	/// - `albums`: structured album file feeding the catalog and the corpus.
	/// - `corpus_dir`: directory of `.txt` files feeding the corpus.
	/// - A source that is missing or malformed is logged and skipped; the
	///   manager then starts with whatever could be loaded, possibly nothing.
	///
	/// # Errors
	/// Returns `InvalidParameter` if `config` is unusable.
	pub fn load(albums: Option<&Path>, corpus_dir: Option<&Path>, config: GameConfig) -> Result<Self, GameError> {
		config.validate()?;

		let catalog = match albums.map(io::load_albums) {
			Some(Ok(raw)) => SongCatalog::from_albums(&raw),
			Some(Err(e)) => {
				warn!("Failed to load albums: {e}");
				SongCatalog::new()
			}
			None => SongCatalog::new(),
		};

		let extra = match corpus_dir.map(io::read_corpus_dir) {
			Some(Ok(lines)) => lines,
			Some(Err(e)) => {
				warn!("Failed to read corpus directory: {e}");
				Vec::new()
			}
			None => Vec::new(),
		};

		let mut texts: Vec<&str> = catalog.texts().collect();
		// Catalog order is a hash order; sort it so training input is stable
		texts.sort_unstable();
		let lines = io::training_lines(texts.into_iter().chain(extra.iter().map(String::as_str)));
		info!("Training corpus: {} unique lines", lines.len());

		let model = NGramModel::build(&lines, config.ngram_order)?;
		Ok(Self::new(model, catalog, config))
	}

	pub fn model(&self) -> &NGramModel {
		&self.model
	}

	pub fn catalog(&self) -> &SongCatalog {
		&self.catalog
	}

	pub fn config(&self) -> &GameConfig {
		&self.config
	}

	pub fn session_count(&self) -> usize {
		self.sessions.len()
	}

	/// Starts a new session and returns its id.
	pub fn create_session(&self) -> String {
		let id = Uuid::new_v4().to_string();
		self.sessions.insert(GameSession::new(id.clone(), self.config.starting_score));
		debug!("Created session {id}");
		id
	}

	/// Produces the next question of a session and makes it the pending one.
	///
	/// With both `song` and `part`, the question comes from the real lines of
	/// that song section. Otherwise, or when that fails, it is generated from
	/// the model.
	///
	/// # Errors
	/// - `SessionNotFound` for an unknown id.
	/// - `InsufficientData` when every generation attempt failed.
	pub fn get_question(&self, session_id: &str, song: Option<&str>, part: Option<&str>) -> Result<Question, GameError> {
		self.get_question_with_rng(session_id, song, part, &mut rand::rng())
	}

	/// `get_question` with a caller-provided random source.
	pub fn get_question_with_rng<R: Rng + ?Sized>(
		&self,
		session_id: &str,
		song: Option<&str>,
		part: Option<&str>,
		rng: &mut R,
	) -> Result<Question, GameError> {
		let handle = self.session(session_id)?;
		let mut session = lock_session(&handle);

		let selection = match (song, part) {
			(Some(song), Some(part)) if !song.trim().is_empty() && !part.trim().is_empty() => Some((song, part)),
			_ => None,
		};

		let mut question = None;
		if let Some((song, part)) = selection {
			match session.ordered_question(&self.catalog, &self.model, song, part, self.config.distractor_count, rng) {
				Ok(ordered) => question = Some(ordered),
				Err(e) => debug!("Session {session_id}: falling back to generated question ({e})"),
			}
		}

		let question = match question {
			Some(question) => question,
			None => self.generate_question(rng)?,
		};

		session.set_pending(question.clone());
		Ok(question)
	}

	fn generate_question<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Question, GameError> {
		let mut last_error = GameError::insufficient("no generation attempted");
		for attempt in 1..=self.config.generation_attempts {
			match generate_incomplete_lyric(
				&self.model,
				self.config.min_length,
				self.config.max_length,
				self.config.distractor_count,
				rng,
			) {
				Ok(lyric) => return Ok(Question::new(lyric.incomplete_line, lyric.correct_word, lyric.distractors, rng)),
				Err(e) if e.is_retryable() => {
					debug!("Generation attempt {attempt} failed: {e}");
					last_error = e;
				}
				Err(e) => return Err(e),
			}
		}
		Err(last_error)
	}

	/// Checks an answer against the session's pending question.
	///
	/// # Errors
	/// - `SessionNotFound` for an unknown id.
	/// - `NoPendingQuestion` when no question waits for an answer.
	pub fn check_answer(&self, session_id: &str, answer: &str) -> Result<AnswerOutcome, GameError> {
		let handle = self.session(session_id)?;
		let mut session = lock_session(&handle);
		session.answer(answer, self.config.wrong_penalty)
	}

	pub fn get_session_stats(&self, session_id: &str) -> Result<SessionStats, GameError> {
		let handle = self.session(session_id)?;
		let session = lock_session(&handle);
		Ok(session.stats())
	}

	/// Returns whether the session existed.
	pub fn delete_session(&self, session_id: &str) -> bool {
		self.sessions.remove(session_id)
	}

	pub fn list_songs(&self) -> Vec<SongSummary> {
		self.catalog.list_songs()
	}

	pub fn get_model_stats(&self) -> ModelStats {
		self.model.stats()
	}

	fn session(&self, session_id: &str) -> Result<SharedSession, GameError> {
		self.sessions
			.get(session_id)
			.ok_or_else(|| GameError::SessionNotFound(session_id.to_owned()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::game::catalog::{LyricLine, Song};
	use crate::model::generator::BLANK;
	use rand::SeedableRng;
	use rand::rngs::StdRng;
	use std::sync::Arc;
	use std::thread;

	const CHORUS_ONE: &str = "Romeo take me somewhere we can be alone";
	const CHORUS_TWO: &str = "Its a love story baby just say yes";

	fn manager() -> GameManager {
		let mut catalog = SongCatalog::new();
		catalog.insert(Song::new(
			"Love Story",
			"Fearless",
			vec![
				LyricLine::new(CHORUS_ONE, "Chorus", Some(1)),
				LyricLine::new("We were both young when I first saw you", "Verse", Some(1)),
				LyricLine::new(CHORUS_TWO, "Chorus", Some(2)),
			],
		));
		let lines: Vec<String> = [
			CHORUS_ONE,
			CHORUS_TWO,
			"we are never ever getting back together like ever",
			"i knew you were trouble when you walked in",
			"shake it off shake it off the players gonna play",
		]
		.iter()
		.map(|l| l.to_string())
		.collect();
		let model = NGramModel::build(&lines, 3).unwrap();
		GameManager::new(model, catalog, GameConfig::default())
	}

	fn unblank(question: &Question) -> String {
		question.incomplete_lyric.replacen(BLANK, &question.correct_answer, 1)
	}

	#[test]
	fn test_love_story_scenario() {
		let manager = manager();
		let mut rng = StdRng::seed_from_u64(21);
		let id = manager.create_session();

		let lines: Vec<String> = (0..3)
			.map(|_| {
				let q = manager.get_question_with_rng(&id, Some("Love Story"), Some("easy"), &mut rng).unwrap();
				assert_eq!(q.options.len(), 5);
				unblank(&q)
			})
			.collect();
		assert_eq!(lines, vec![CHORUS_ONE, CHORUS_TWO, CHORUS_ONE]);
	}

	#[test]
	fn test_unknown_song_falls_back_without_corrupting_playback() {
		let manager = manager();
		let mut rng = StdRng::seed_from_u64(22);
		let id = manager.create_session();

		let first = manager.get_question_with_rng(&id, Some("Love Story"), Some("easy"), &mut rng).unwrap();
		assert_eq!(unblank(&first), CHORUS_ONE);

		let generated = manager.get_question_with_rng(&id, Some("Blank Space"), Some("easy"), &mut rng).unwrap();
		assert_eq!(generated.options.len(), 5);
		let generated = manager.get_question_with_rng(&id, None, None, &mut rng).unwrap();
		assert_eq!(generated.options.len(), 5);

		let next = manager.get_question_with_rng(&id, Some("Love Story"), Some("easy"), &mut rng).unwrap();
		assert_eq!(unblank(&next), CHORUS_TWO);
	}

	#[test]
	fn test_question_becomes_pending_and_is_answered_once() {
		let manager = manager();
		let id = manager.create_session();

		assert_eq!(manager.check_answer(&id, "anything").unwrap_err(), GameError::NoPendingQuestion);

		let question = manager.get_question(&id, None, None).unwrap();
		let outcome = manager.check_answer(&id, &question.correct_answer.to_uppercase()).unwrap();
		assert!(outcome.correct);
		assert_eq!(outcome.score, 100);
		assert_eq!(outcome.questions_answered, 1);
		assert_eq!(manager.check_answer(&id, "again").unwrap_err(), GameError::NoPendingQuestion);

		manager.get_question(&id, None, None).unwrap();
		let outcome = manager.check_answer(&id, "definitely not a lyric").unwrap();
		assert!(!outcome.correct);
		assert_eq!(outcome.score, 90);

		let stats = manager.get_session_stats(&id).unwrap();
		assert_eq!(stats.questions_answered, 2);
		assert!((stats.accuracy_percent - 50.0).abs() < 1e-9);
	}

	#[test]
	fn test_unknown_session_is_not_found() {
		let manager = manager();
		assert!(manager.get_question("nope", None, None).unwrap_err().is_not_found());
		assert!(manager.check_answer("nope", "x").unwrap_err().is_not_found());
		assert!(manager.get_session_stats("nope").unwrap_err().is_not_found());
		assert!(!manager.delete_session("nope"));
	}

	#[test]
	fn test_delete_session() {
		let manager = manager();
		let id = manager.create_session();
		assert_eq!(manager.session_count(), 1);
		assert!(manager.delete_session(&id));
		assert!(manager.get_session_stats(&id).is_err());
		assert_eq!(manager.session_count(), 0);
	}

	#[test]
	fn test_empty_manager_reports_insufficient_data() {
		let manager = GameManager::new(NGramModel::empty(3).unwrap(), SongCatalog::new(), GameConfig::default());
		let id = manager.create_session();
		let err = manager.get_question(&id, Some("Love Story"), Some("easy")).unwrap_err();
		assert!(err.is_retryable());
		assert!(manager.list_songs().is_empty());
		assert_eq!(manager.get_model_stats().vocabulary_size, 0);
	}

	#[test]
	fn test_load_survives_missing_sources() {
		let manager = GameManager::load(
			Some(Path::new("/definitely/not/albums.json")),
			Some(Path::new("/definitely/not/a/dir")),
			GameConfig::default(),
		)
		.unwrap();
		assert!(manager.model().is_empty());
		assert!(manager.catalog().is_empty());

		let bad = GameConfig { ngram_order: 1, ..GameConfig::default() };
		assert!(GameManager::load(None, None, bad).is_err());
	}

	#[test]
	fn test_load_trains_on_albums_and_corpus_dir() {
		let dir = tempfile::tempdir().unwrap();
		let albums = dir.path().join("albums.json");
		std::fs::write(
			&albums,
			r#"[{ "Title": "Fearless", "Songs": [{ "Title": "Love Story", "Lyrics": [
				{ "Text": "Romeo take me somewhere we can be alone", "SongPart": "Chorus", "Order": 1 }
			]}]}]"#,
		)
		.unwrap();
		let corpus = dir.path().join("corpus");
		std::fs::create_dir(&corpus).unwrap();
		std::fs::write(corpus.join("extra.txt"), "shake it off shake it off the players gonna play\n").unwrap();

		let manager = GameManager::load(Some(&albums), Some(&corpus), GameConfig::default()).unwrap();
		assert_eq!(manager.list_songs().len(), 1);
		let vocabulary = manager.model().vocabulary();
		assert!(vocabulary.contains(&"romeo".to_string()));
		assert!(vocabulary.contains(&"players".to_string()));
	}

	#[test]
	fn test_sessions_progress_independently_across_threads() {
		let manager = Arc::new(manager());
		let ids: Vec<String> = (0..4).map(|_| manager.create_session()).collect();

		let handles: Vec<_> = ids
			.iter()
			.cloned()
			.map(|id| {
				let manager = Arc::clone(&manager);
				thread::spawn(move || {
					for _ in 0..20 {
						manager.get_question(&id, Some("Love Story"), Some("easy")).unwrap();
						manager.check_answer(&id, "wrong answer here").unwrap();
					}
				})
			})
			.collect();
		for handle in handles {
			handle.join().unwrap();
		}

		for id in &ids {
			let stats = manager.get_session_stats(id).unwrap();
			assert_eq!(stats.questions_answered, 20);
			assert_eq!(stats.score, 0);
		}
	}
}
