use std::fmt;

use crate::error::GameError;

/// Structural section of a song a question can be drawn from.
///
/// Difficulty names map onto sections: `easy` is the chorus, `medium` a
/// verse and `hard` (or one of its spellings) the bridge. Section names are
/// accepted directly, in any case. Any other non-blank label is kept as is
/// and matched case-insensitively against the catalog.
#[derive(Debug, Clone)]
pub enum PartLabel {
	Chorus,
	Verse,
	Bridge,
	Other(String),
}

impl PartLabel {
	/// Resolves a requested difficulty or part name.
	///
	/// # Errors
	/// Returns `UnknownPart` for a blank label.
	pub fn resolve(label: &str) -> Result<Self, GameError> {
		let trimmed = label.trim();
		match trimmed.to_lowercase().as_str() {
			"" => Err(GameError::UnknownPart(label.to_owned())),
			"easy" | "chorus" => Ok(PartLabel::Chorus),
			"medium" | "verse" => Ok(PartLabel::Verse),
			"hard" | "difficult" | "difficultly" | "difficulty" | "difficult-level" | "bridge" => Ok(PartLabel::Bridge),
			_ => Ok(PartLabel::Other(trimmed.to_owned())),
		}
	}

	pub fn as_str(&self) -> &str {
		match self {
			PartLabel::Chorus => "Chorus",
			PartLabel::Verse => "Verse",
			PartLabel::Bridge => "Bridge",
			PartLabel::Other(name) => name,
		}
	}

	/// True when a catalog line tagged `tag` belongs to this part.
	pub fn matches(&self, tag: &str) -> bool {
		tag.trim().eq_ignore_ascii_case(self.as_str())
	}
}

impl PartialEq for PartLabel {
	fn eq(&self, other: &Self) -> bool {
		self.as_str().eq_ignore_ascii_case(other.as_str())
	}
}

impl Eq for PartLabel {}

impl fmt::Display for PartLabel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
