//! Turns PL/0 source characters into tokens.
//!
//! The scanner is a small finite-state machine fed one character at a time:
//!
//! |State|Meaning
//! --|--
//! `Begin`|between lexemes
//! `PartSym`|saw `<`, `>` or `:`, waiting to see whether `=` follows
//! `Id`|accumulating letters
//! `Integer`|accumulating digits
//!
//! A character that ends an `Id`, `Integer` or `PartSym` run is not consumed
//! by that run: the pending lexeme is emitted, the machine goes back to
//! `Begin` and the same character is dispatched again from there.
//!
//! Because the machine only ever looks at the current character, it can be
//! driven incrementally with [`Scanner::push`] and [`Scanner::finish`], or
//! lazily through the [`Tokens`] iterator.
mod token;

use std::collections::VecDeque;

use log::trace;
pub use token::*;

use crate::error::scanner::{ScanError, ScanErrorType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	Begin,
	PartSym { start: usize },
	Id { start: usize },
	Integer { start: usize },
}

/// An incremental scanner for PL/0 source code
#[derive(Debug)]
pub struct Scanner {
	state:  State,
	/// Index of the next character to be pushed
	cursor: usize,
	/// Text of the lexeme currently being accumulated
	buffer: String,
	/// Tokens emitted but not yet taken
	ready:  VecDeque<Token>,
}

impl Default for Scanner {
	fn default() -> Self { Self::new() }
}

impl Scanner {
	pub fn new() -> Self { Self { state: State::Begin, cursor: 0, buffer: String::new(), ready: VecDeque::new() } }

	/// Scan a whole source text into a token list.
	pub fn scan(source: &str) -> Result<Vec<Token>, ScanError> { Tokens::new(source.chars()).collect() }

	/// Feed the next source character.
	pub fn push(&mut self, c: char) -> Result<(), ScanError> {
		let index = self.cursor;
		self.cursor += 1;
		self.dispatch(index, c)
	}

	/// Signal end of input, flushing any pending lexeme.
	pub fn finish(&mut self) -> Result<(), ScanError> {
		match self.state {
			State::Begin => Ok(()),
			State::PartSym { start } | State::Id { start } | State::Integer { start } => {
				self.state = State::Begin;
				self.flush(start)
			}
		}
	}

	/// Take the oldest token emitted so far.
	pub fn next_token(&mut self) -> Option<Token> { self.ready.pop_front() }

	fn dispatch(&mut self, index: usize, c: char) -> Result<(), ScanError> {
		match self.state {
			State::Begin => match c {
				'(' | ')' | '+' | '-' | '*' | '/' | '=' | ';' | ',' | '#' | '[' | ']' | '.' => {
					self.buffer.push(c);
					self.flush(index)?;
				}
				'<' | '>' | ':' => {
					self.buffer.push(c);
					self.state = State::PartSym { start: index };
				}
				' ' | '\r' | '\n' => {}
				c if c.is_ascii_alphabetic() => {
					self.buffer.push(c);
					self.state = State::Id { start: index };
				}
				c if c.is_ascii_digit() => {
					self.buffer.push(c);
					self.state = State::Integer { start: index };
				}
				_ => return Err(ScanError::new(index, ScanErrorType::UnexpectedCharacter(c))),
			},
			State::PartSym { start } => {
				self.state = State::Begin;
				if c == '=' {
					self.buffer.push(c);
					self.flush(start)?;
				} else {
					self.flush(start)?;
					self.dispatch(index, c)?;
				}
			}
			State::Id { start } => {
				if c.is_ascii_alphabetic() {
					self.buffer.push(c);
				} else {
					self.state = State::Begin;
					self.flush(start)?;
					self.dispatch(index, c)?;
				}
			}
			State::Integer { start } => {
				if c.is_ascii_digit() {
					self.buffer.push(c);
				} else {
					self.state = State::Begin;
					self.flush(start)?;
					self.dispatch(index, c)?;
				}
			}
		}
		Ok(())
	}

	/// Classify the buffered lexeme and emit it as a token starting at `index`.
	fn flush(&mut self, index: usize) -> Result<(), ScanError> {
		let text = std::mem::take(&mut self.buffer);
		let kind = match TokenKind::classify(&text) {
			Some(kind) => kind,
			None => return Err(ScanError::new(index, ScanErrorType::InvalidToken(text))),
		};
		if kind == TokenKind::Number && text.parse::<i64>().is_err() {
			return Err(ScanError::new(index, ScanErrorType::NumberOutOfRange(text)));
		}
		let token = Token::new(kind, index, text);
		trace!("token {:?} {token}", token.kind);
		self.ready.push_back(token);
		Ok(())
	}
}

/// Lazily scans tokens out of a character iterator.
///
/// Tokens completed before a lexical error are still yielded, then the error,
/// then nothing.
pub struct Tokens<I> {
	chars:   I,
	scanner: Scanner,
	error:   Option<ScanError>,
	done:    bool,
}

impl<I: Iterator<Item = char>> Tokens<I> {
	pub fn new(chars: I) -> Self { Self { chars, scanner: Scanner::new(), error: None, done: false } }
}

impl<I: Iterator<Item = char>> Iterator for Tokens<I> {
	type Item = Result<Token, ScanError>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			if let Some(token) = self.scanner.next_token() {
				return Some(Ok(token));
			}
			if let Some(error) = self.error.take() {
				return Some(Err(error));
			}
			if self.done {
				return None;
			}
			let step = match self.chars.next() {
				Some(c) => self.scanner.push(c),
				None => {
					self.done = true;
					self.scanner.finish()
				}
			};
			if let Err(error) = step {
				self.done = true;
				self.error = Some(error);
			}
		}
	}
}
