/// A lexical error with the character index where the offending text starts.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("index {index}: {type}")]
pub struct ScanError {
	/// Character index of the offending text.
	pub index:  usize,
	/// The type of scanning error.
	pub r#type: ScanErrorType,
}

impl ScanError {
	pub fn new(index: usize, r#type: ScanErrorType) -> Self { Self { index, r#type } }
}

/// Types of scanning errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanErrorType {
	/// A character no token can start with.
	UnexpectedCharacter(char),
	/// A lexeme that is neither a keyword, a symbol, a number nor a valid
	/// identifier, e.g. an identifier longer than ten letters.
	InvalidToken(String),
	/// A digit run too large for a 64-bit integer.
	NumberOutOfRange(String),
}

impl std::fmt::Display for ScanErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use ScanErrorType::*;
		match self {
			UnexpectedCharacter(c) => {
				write!(f, "Unexpected character '{c}'")
			}
			InvalidToken(text) => {
				write!(f, "Invalid token '{text}'")
			}
			NumberOutOfRange(text) => {
				write!(f, "Number '{text}' out of range")
			}
		}
	}
}
