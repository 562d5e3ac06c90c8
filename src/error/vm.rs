#[derive(thiserror::Error, Debug)]
/// Errors that can occur while executing bytecode
pub enum VmError {
	/// Failure outside the program itself, e.g. the output sink
	#[error("{0}")]
	InternalError(#[from] anyhow::Error),
	#[error(transparent)]
	RuntimeError(#[from] RuntimeError),
}

/// A fault raised by the instruction at `address`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("instruction {address}: {type}")]
pub struct RuntimeError {
	pub address: usize,
	pub r#type:  RuntimeErrorType,
}

impl RuntimeError {
	pub fn new(address: usize, r#type: RuntimeErrorType) -> Self { Self { address, r#type } }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeErrorType {
	/// `read` with nothing left in the input queue.
	InputExhausted,
	/// A level/offset pair naming no slot of the block stack.
	InvalidAddress { level: usize, offset: i64 },
	/// Control transferred outside the program.
	CodeAddressOutOfRange(i64),
	/// An operand the opcode cannot use.
	InvalidOperand,
	/// Pop from an empty operand stack.
	StackUnderflow,
	/// Block exit with no block to leave.
	NoActiveBlock,
	/// `INT` asking for more slots than a block may hold.
	BlockTooLarge(usize),
	DivisionByZero,
	Overflow,
}

impl std::fmt::Display for RuntimeErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use RuntimeErrorType::*;
		match self {
			InputExhausted => write!(f, "Input exhausted"),
			InvalidAddress { level, offset } => write!(f, "Invalid address level {level} offset {offset}"),
			CodeAddressOutOfRange(address) => write!(f, "Code address {address} out of range"),
			InvalidOperand => write!(f, "Invalid operand"),
			StackUnderflow => write!(f, "Operand stack underflow"),
			NoActiveBlock => write!(f, "No active block to leave"),
			BlockTooLarge(size) => write!(f, "Block of {size} slots too large"),
			DivisionByZero => write!(f, "Division by zero"),
			Overflow => write!(f, "Integer overflow"),
		}
	}
}
