use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Album entry of the structured lyrics file.
#[derive(Deserialize, Debug, Clone, Default)]
pub(crate) struct RawAlbum {
	#[serde(rename = "Title", default)]
	pub title: String,
	#[serde(rename = "Songs", default)]
	pub songs: Vec<RawSong>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub(crate) struct RawSong {
	#[serde(rename = "Title", default)]
	pub title: String,
	#[serde(rename = "Lyrics", default)]
	pub lyrics: Vec<RawLine>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub(crate) struct RawLine {
	#[serde(rename = "Text", default)]
	pub text: Option<String>,
	#[serde(rename = "SongPart", default)]
	pub song_part: Option<String>,
	/// Number or numeric string. `None` when the key is absent, while an
	/// explicit `null` is kept as `Value::Null`.
	#[serde(rename = "Order", default, deserialize_with = "present")]
	pub order: Option<Value>,
}

/// Wraps any present value, `null` included, so it differs from an absent key.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
	Value::deserialize(deserializer).map(Some)
}

impl RawLine {
	/// Sort key of the line.
	///
	/// A missing value counts as 0. `None` means the value cannot be read as
	/// an integer.
	pub fn order_index(&self) -> Option<i64> {
		match &self.order {
			None => Some(0),
			Some(Value::Number(number)) => number.as_i64().or_else(|| number.as_f64().map(|f| f.trunc() as i64)),
			Some(Value::String(text)) => text.trim().parse().ok(),
			Some(_) => None,
		}
	}
}

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub(crate) fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists all files with a given extension in a directory, sorted by name.
///
/// Returns file names only (no paths).
pub(crate) fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

/// Parses the structured album file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not a JSON array of albums.
pub(crate) fn load_albums<P: AsRef<Path>>(path: P) -> Result<Vec<RawAlbum>, Box<dyn std::error::Error>> {
	let contents = fs::read_to_string(path)?;
	let albums: Vec<RawAlbum> = serde_json::from_str(&contents)?;
	Ok(albums)
}

/// Reads every `.txt` file directly inside `dir`, one entry per line.
///
/// # Errors
/// Returns an error if the path is not a directory or a file cannot be read.
pub(crate) fn read_corpus_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<String>, Box<dyn std::error::Error>> {
	let string_path = match dir.as_ref().to_str() {
		Some(s) => s,
		None => return Err("Invalid corpus path".into()),
	};
	// Normalize "folder" / "folder/"
	let folder = normalize_folder(string_path);

	if !folder.is_dir() {
		return Err(format!("Expected a directory, got: {}", folder.display()).into());
	}

	let mut lines = Vec::new();
	for file in list_files(&folder, "txt")? {
		lines.extend(read_file(folder.join(&file))?.into_iter().map(|line| line.trim().to_owned()));
	}
	Ok(lines)
}

/// True for strings worth training on: a space, more than 20 characters
/// and not only digits.
pub(crate) fn is_training_text(text: &str) -> bool {
	text.contains(' ') && text.chars().count() > 20 && !text.chars().all(|c| c.is_ascii_digit())
}

/// Keeps the training-worthy strings, first occurrence only, in input order.
pub(crate) fn training_lines<I, S>(texts: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut seen = HashSet::new();
	let mut lines = Vec::new();
	for text in texts {
		let text = text.as_ref();
		if is_training_text(text) && seen.insert(text.to_owned()) {
			lines.push(text.to_owned());
		}
	}
	lines
}
