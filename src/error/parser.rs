use crate::scanner::{Token, TokenKind};

/// A syntax error, carrying the token the parser was looking at.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{type}, found {}", found.as_ref().map_or_else(|| "end of input".to_string(), |token| token.to_string()))]
pub struct ParseError {
	/// The offending lookahead token, `None` at end of input.
	pub found:  Option<Token>,
	pub r#type: ParseErrorType,
}

impl ParseError {
	pub fn new(found: Option<Token>, r#type: ParseErrorType) -> Self { Self { found, r#type } }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorType {
	/// A specific token kind was required.
	Expected(TokenKind),
	/// `(`, a number or an identifier was required.
	ExpectedFactor,
	/// One of `= # < <= > >=` was required.
	ExpectedCondOp,
	/// Tokens follow the terminating `.`.
	TrailingInput,
	/// A number token whose text is not a valid integer.
	InvalidNumber,
}

impl std::fmt::Display for ParseErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use ParseErrorType::*;
		match self {
			Expected(kind) => {
				write!(f, "Expected '{kind}'")
			}
			ExpectedFactor => {
				write!(f, "Expected '(', number or identifier")
			}
			ExpectedCondOp => {
				write!(f, "Expected relational operator")
			}
			TrailingInput => {
				write!(f, "Expected end of input after '.'")
			}
			InvalidNumber => {
				write!(f, "Invalid number literal")
			}
		}
	}
}
