use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Identifiers are at most this many letters long.
pub const MAX_IDENTIFIER_LEN: usize = 10;

/// A token produced by the scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	pub kind:  TokenKind,
	/// Character index of the first character of the lexeme.
	pub index: usize,
	pub text:  String,
}

impl Token {
	pub fn new(kind: TokenKind, index: usize, text: impl Into<String>) -> Self {
		Self { kind, index, text: text.into() }
	}
}

impl Display for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "'{}' at index {}", self.text, self.index)
	}
}

/// The different kinds of tokens in PL/0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
	/// Left parenthesis `(`.
	#[serde(rename = "(")]
	LeftParen,
	/// Right parenthesis `)`.
	#[serde(rename = ")")]
	RightParen,
	/// Plus `+`.
	#[serde(rename = "+")]
	Plus,
	/// Minus `-`.
	#[serde(rename = "-")]
	Minus,
	/// Asterisk `*`.
	#[serde(rename = "*")]
	Star,
	/// Slash `/`.
	#[serde(rename = "/")]
	Slash,
	/// Assignment `:=`.
	#[serde(rename = ":=")]
	Assign,
	/// Equal `=`.
	#[serde(rename = "=")]
	Equal,
	/// Less than `<`.
	#[serde(rename = "<")]
	Less,
	/// Less than or equal `<=`.
	#[serde(rename = "<=")]
	LessEqual,
	/// Greater than `>`.
	#[serde(rename = ">")]
	Greater,
	/// Greater than or equal `>=`.
	#[serde(rename = ">=")]
	GreaterEqual,
	/// Not equal `#`.
	#[serde(rename = "#")]
	Hash,
	/// Semicolon `;`.
	#[serde(rename = ";")]
	Semicolon,
	/// Comma `,`.
	#[serde(rename = ",")]
	Comma,
	/// Dot `.`, terminates a program.
	#[serde(rename = ".")]
	Dot,
	/// Left bracket `[`.
	#[serde(rename = "[")]
	LeftBracket,
	/// Right bracket `]`.
	#[serde(rename = "]")]
	RightBracket,
	#[serde(rename = "const")]
	Const,
	#[serde(rename = "var")]
	Var,
	#[serde(rename = "procedure")]
	Procedure,
	#[serde(rename = "begin")]
	Begin,
	#[serde(rename = "end")]
	End,
	#[serde(rename = "if")]
	If,
	#[serde(rename = "then")]
	Then,
	#[serde(rename = "call")]
	Call,
	#[serde(rename = "while")]
	While,
	#[serde(rename = "do")]
	Do,
	#[serde(rename = "read")]
	Read,
	#[serde(rename = "write")]
	Write,
	#[serde(rename = "odd")]
	Odd,
	/// 1 to 10 letters that are not a keyword.
	Identifier,
	/// A run of decimal digits.
	Number,
}

impl TokenKind {
	/// Classify a finished lexeme, `None` if it is not a valid token.
	pub fn classify(text: &str) -> Option<Self> {
		if let Some(kind) = Self::symbol(text).or_else(|| Self::keyword(text)) {
			return Some(kind);
		}
		if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
			return Some(TokenKind::Number);
		}
		let letters = text.chars().count();
		if (1..=MAX_IDENTIFIER_LEN).contains(&letters) && text.chars().all(|c| c.is_ascii_alphabetic()) {
			return Some(TokenKind::Identifier);
		}
		None
	}

	pub fn symbol(text: &str) -> Option<Self> {
		use TokenKind::*;

		Some(match text {
			"(" => LeftParen,
			")" => RightParen,
			"+" => Plus,
			"-" => Minus,
			"*" => Star,
			"/" => Slash,
			":=" => Assign,
			"=" => Equal,
			"<" => Less,
			"<=" => LessEqual,
			">" => Greater,
			">=" => GreaterEqual,
			"#" => Hash,
			";" => Semicolon,
			"," => Comma,
			"." => Dot,
			"[" => LeftBracket,
			"]" => RightBracket,
			_ => return None,
		})
	}

	pub fn keyword(text: &str) -> Option<Self> {
		use TokenKind::*;

		Some(match text {
			"const" => Const,
			"var" => Var,
			"procedure" => Procedure,
			"begin" => Begin,
			"end" => End,
			"if" => If,
			"then" => Then,
			"call" => Call,
			"while" => While,
			"do" => Do,
			"read" => Read,
			"write" => Write,
			"odd" => Odd,
			_ => return None,
		})
	}
}

impl Display for TokenKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use TokenKind::*;

		let text = match self {
			LeftParen => "(",
			RightParen => ")",
			Plus => "+",
			Minus => "-",
			Star => "*",
			Slash => "/",
			Assign => ":=",
			Equal => "=",
			Less => "<",
			LessEqual => "<=",
			Greater => ">",
			GreaterEqual => ">=",
			Hash => "#",
			Semicolon => ";",
			Comma => ",",
			Dot => ".",
			LeftBracket => "[",
			RightBracket => "]",
			Const => "const",
			Var => "var",
			Procedure => "procedure",
			Begin => "begin",
			End => "end",
			If => "if",
			Then => "then",
			Call => "call",
			While => "while",
			Do => "do",
			Read => "read",
			Write => "write",
			Odd => "odd",
			Identifier => "identifier",
			Number => "number",
		};
		write!(f, "{text}")
	}
}
