use std::fmt;

/// Every failure the game core can report.
///
/// Variants fall into four groups:
/// - not found: `SessionNotFound`, `SongNotFound`, `UnknownPart`
/// - insufficient data: `InsufficientData`, retryable, the caller may try
///   again or take the other question path
/// - invalid state: `NoPendingQuestion`
/// - invalid construction arguments: `InvalidParameter`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
	SessionNotFound(String),
	SongNotFound(String),
	UnknownPart(String),
	InsufficientData(String),
	NoPendingQuestion,
	InvalidParameter(String),
}

impl GameError {
	/// True for the not-found family.
	pub fn is_not_found(&self) -> bool {
		matches!(
			self,
			GameError::SessionNotFound(_) | GameError::SongNotFound(_) | GameError::UnknownPart(_)
		)
	}

	/// True when calling again may produce a result.
	pub fn is_retryable(&self) -> bool {
		matches!(self, GameError::InsufficientData(_))
	}

	pub(crate) fn insufficient(reason: impl Into<String>) -> Self {
		GameError::InsufficientData(reason.into())
	}
}

impl fmt::Display for GameError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			GameError::SessionNotFound(id) => write!(f, "Session not found: {id}"),
			GameError::SongNotFound(title) => write!(f, "Song not found: {title}"),
			GameError::UnknownPart(part) => write!(f, "Unknown song part: '{part}'"),
			GameError::InsufficientData(reason) => write!(f, "Could not generate question: {reason}"),
			GameError::NoPendingQuestion => write!(f, "No current question"),
			GameError::InvalidParameter(reason) => write!(f, "Invalid parameter: {reason}"),
		}
	}
}

impl std::error::Error for GameError {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_families() {
		assert!(GameError::SessionNotFound("x".into()).is_not_found());
		assert!(GameError::UnknownPart("".into()).is_not_found());
		assert!(!GameError::NoPendingQuestion.is_not_found());
		assert!(GameError::insufficient("empty model").is_retryable());
		assert!(!GameError::SongNotFound("x".into()).is_retryable());
	}

	#[test]
	fn test_display_mentions_subject() {
		let message = GameError::SongNotFound("Love Story".into()).to_string();
		assert!(message.contains("Love Story"));
		assert_eq!(GameError::NoPendingQuestion.to_string(), "No current question");
	}
}
