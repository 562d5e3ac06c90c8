pub mod generator;
pub mod parser;
pub mod scanner;
pub mod vm;

use generator::{GenerateError, GeneratorError};
use parser::ParseError;
use scanner::ScanError;
use vm::{RuntimeError, VmError};

/// Pl0Error is the top-level error type, one variant per phase.
#[derive(thiserror::Error, Debug)]
pub enum Pl0Error {
	/// Environment failure or compiler bug, never caused by the program text
	#[error("internal error: {0:#}")]
	InternalError(#[from] anyhow::Error),
	#[error("scan error: {0}")]
	ScanError(#[from] ScanError),
	#[error("syntax error: {0}")]
	ParseError(#[from] ParseError),
	#[error("generation error: {0}")]
	GenerateError(#[from] GenerateError),
	#[error("runtime error: {0}")]
	RuntimeError(#[from] RuntimeError),
}

impl From<GeneratorError> for Pl0Error {
	fn from(error: GeneratorError) -> Self {
		match error {
			GeneratorError::InternalError(error) => Self::InternalError(error),
			GeneratorError::GenerateError(error) => Self::GenerateError(error),
		}
	}
}

impl From<VmError> for Pl0Error {
	fn from(error: VmError) -> Self {
		match error {
			VmError::InternalError(error) => Self::InternalError(error),
			VmError::RuntimeError(error) => Self::RuntimeError(error),
		}
	}
}
