/// Code generation related errors
#[derive(thiserror::Error, Debug)]
pub enum GeneratorError {
	/// Internal compiler error, should never happen
	#[error("{0}")]
	InternalError(#[from] anyhow::Error),
	/// Errors in the program being generated
	#[error(transparent)]
	GenerateError(#[from] GenerateError),
}

/// A name that could not be resolved at its point of use.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("index {index}: {type} '{name}'")]
pub struct GenerateError {
	pub name:   String,
	/// Source index of the offending identifier.
	pub index:  usize,
	pub r#type: GenerateErrorType,
}

impl GenerateError {
	pub fn new(name: impl Into<String>, index: usize, r#type: GenerateErrorType) -> Self {
		Self { name: name.into(), index, r#type }
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateErrorType {
	/// Not declared in the current scope nor any enclosing one.
	UndeclaredIdentifier,
}

impl std::fmt::Display for GenerateErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			GenerateErrorType::UndeclaredIdentifier => write!(f, "Undeclared identifier"),
		}
	}
}
