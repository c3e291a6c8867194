use std::collections::HashMap;

use log::info;

use super::part::PartLabel;
use super::question::SongSummary;
use crate::io::RawAlbum;

/// One lyric line of a song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
	pub text: String,
	/// Structural tag as found in the source (e.g. `Verse`).
	pub part: String,
	/// Explicit position in the song, `None` when the source value was unreadable.
	pub order: Option<i64>,
}

impl LyricLine {
	pub fn new(text: impl Into<String>, part: impl Into<String>, order: Option<i64>) -> Self {
		Self {
			text: text.into(),
			part: part.into(),
			order,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
	pub title: String,
	pub album: String,
	pub lines: Vec<LyricLine>,
}

impl Song {
	pub fn new(title: impl Into<String>, album: impl Into<String>, lines: Vec<LyricLine>) -> Self {
		Self {
			title: title.into(),
			album: album.into(),
			lines,
		}
	}

	/// Distinct non-blank part tags in order of first appearance.
	pub fn parts(&self) -> Vec<String> {
		let mut parts: Vec<String> = Vec::new();
		for line in &self.lines {
			let part = line.part.trim();
			if !part.is_empty() && !parts.iter().any(|p| p == part) {
				parts.push(part.to_owned());
			}
		}
		parts
	}

	/// Lines of `part` that can carry a question, in playback order.
	///
	/// Lines are sorted by their order index. If any index is unreadable the
	/// source order is kept. Lines with fewer than three words are dropped.
	pub fn ordered_lines(&self, part: &PartLabel) -> Vec<String> {
		let mut lines: Vec<&LyricLine> = self.lines.iter().filter(|line| part.matches(&line.part)).collect();

		if lines.iter().all(|line| line.order.is_some()) {
			lines.sort_by_key(|line| line.order);
		}

		lines
			.into_iter()
			.filter(|line| line.text.split_whitespace().count() >= 3)
			.map(|line| line.text.clone())
			.collect()
	}
}

/// Read-only song index keyed by case-insensitive title.
#[derive(Debug, Clone, Default)]
pub struct SongCatalog {
	songs: HashMap<String, Song>,
}

impl SongCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds the catalog from parsed album data.
	///
	/// Songs with a blank title are ignored. When two songs share a title
	/// (ignoring case) the later one wins.
	pub(crate) fn from_albums(albums: &[RawAlbum]) -> Self {
		let mut catalog = Self::new();
		for album in albums {
			for raw in &album.songs {
				let lines = raw
					.lyrics
					.iter()
					.map(|line| {
						LyricLine::new(
							line.text.clone().unwrap_or_default(),
							line.song_part.clone().unwrap_or_default(),
							line.order_index(),
						)
					})
					.collect();
				catalog.insert(Song::new(raw.title.trim(), album.title.clone(), lines));
			}
		}
		info!("Loaded song catalog: {} songs from {} albums", catalog.len(), albums.len());
		catalog
	}

	/// Adds a song, replacing any song with the same title.
	pub fn insert(&mut self, song: Song) {
		let key = Self::key(&song.title);
		if !key.is_empty() {
			self.songs.insert(key, song);
		}
	}

	pub fn get(&self, title: &str) -> Option<&Song> {
		self.songs.get(&Self::key(title))
	}

	/// Normalized lookup key of a title.
	pub fn key(title: &str) -> String {
		title.trim().to_lowercase()
	}

	pub fn len(&self) -> usize {
		self.songs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.songs.is_empty()
	}

	/// Text of every catalog line, used as training input.
	pub fn texts(&self) -> impl Iterator<Item = &str> {
		self.songs.values().flat_map(|song| song.lines.iter().map(|line| line.text.as_str()))
	}

	/// Every song with its album and parts, sorted by album then title.
	pub fn list_songs(&self) -> Vec<SongSummary> {
		let mut songs: Vec<SongSummary> = self
			.songs
			.values()
			.map(|song| SongSummary {
				title: song.title.clone(),
				album: song.album.clone(),
				parts: song.parts(),
			})
			.collect();
		songs.sort_by(|a, b| (&a.album, &a.title).cmp(&(&b.album, &b.title)));
		songs
	}
}
