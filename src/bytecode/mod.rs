//! Stack machine instructions and the buffer they are generated into.
//!
//! Every instruction is an `{op, level, offset}` triple. The buffer is
//! append-only: an emitted instruction keeps its index forever, and only its
//! `level`/`offset` may be overwritten later to fill in forward jump targets.

use std::fmt::Display;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpCode {
	/// Push `offset` as a literal.
	#[serde(rename = "LIT")]
	Lit,
	/// Push the value at `level`/`offset`.
	#[serde(rename = "LOD")]
	Lod,
	/// Pop into `level`/`offset`.
	#[serde(rename = "STO")]
	Sto,
	/// Call the address stored at `level`/`offset`.
	#[serde(rename = "CAL")]
	Cal,
	/// Allocate a block of `offset` slots.
	#[serde(rename = "INT")]
	Int,
	/// Jump to `offset`.
	#[serde(rename = "JMP")]
	Jmp,
	/// Pop, jump to `offset` when zero.
	#[serde(rename = "JPC")]
	Jpc,
	/// Return when `offset` is 0, otherwise apply the operator.
	#[serde(rename = "OPR")]
	Opr,
}

impl Display for OpCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let text = match self {
			OpCode::Lit => "LIT",
			OpCode::Lod => "LOD",
			OpCode::Sto => "STO",
			OpCode::Cal => "CAL",
			OpCode::Int => "INT",
			OpCode::Jmp => "JMP",
			OpCode::Jpc => "JPC",
			OpCode::Opr => "OPR",
		};
		write!(f, "{text}")
	}
}

/// Operators applied by `OPR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
	#[serde(rename = "+")]
	Add,
	#[serde(rename = "-")]
	Sub,
	#[serde(rename = "*")]
	Mul,
	#[serde(rename = "/")]
	Div,
	#[serde(rename = "=")]
	Eq,
	#[serde(rename = "#")]
	Ne,
	#[serde(rename = "<")]
	Lt,
	#[serde(rename = "<=")]
	Le,
	#[serde(rename = ">")]
	Gt,
	#[serde(rename = ">=")]
	Ge,
	/// The only unary operator.
	#[serde(rename = "odd")]
	Odd,
}

impl Display for Operator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let text = match self {
			Operator::Add => "+",
			Operator::Sub => "-",
			Operator::Mul => "*",
			Operator::Div => "/",
			Operator::Eq => "=",
			Operator::Ne => "#",
			Operator::Lt => "<",
			Operator::Le => "<=",
			Operator::Gt => ">",
			Operator::Ge => ">=",
			Operator::Odd => "odd",
		};
		write!(f, "{text}")
	}
}

/// The `offset` field: a number, or an operator symbol for `OPR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
	Number(i64),
	Operator(Operator),
}

impl Display for Operand {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Operand::Number(n) => write!(f, "{n}"),
			Operand::Operator(op) => write!(f, "{op}"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
	pub op:     OpCode,
	pub level:  usize,
	pub offset: Operand,
}

impl Instruction {
	pub fn new(op: OpCode, level: usize, offset: i64) -> Self { Self { op, level, offset: Operand::Number(offset) } }

	pub fn operator(op: Operator) -> Self { Self { op: OpCode::Opr, level: 0, offset: Operand::Operator(op) } }

	/// `OPR 0 0`, leave the current block.
	pub fn ret() -> Self { Self::new(OpCode::Opr, 0, 0) }
}

impl Display for Instruction {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} {} {}", self.op, self.level, self.offset)
	}
}

/// Which numeric field of an instruction to backpatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
	Level,
	Offset,
}

/// The growable instruction buffer shared by one compilation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Code {
	instructions: Vec<Instruction>,
}

impl Code {
	pub fn new() -> Self { Self::default() }

	/// Append `instruction`, returning its address.
	pub fn emit(&mut self, instruction: Instruction) -> usize {
		self.instructions.push(instruction);
		self.instructions.len() - 1
	}

	/// Address the next emitted instruction will get.
	pub fn next_address(&self) -> usize { self.instructions.len() }

	/// Overwrite one numeric field of an already emitted instruction.
	pub fn patch(&mut self, address: usize, field: Field, value: usize) -> anyhow::Result<()> {
		let instruction = self
			.instructions
			.get_mut(address)
			.with_context(|| format!("Backpatch of unemitted address {address}"))?;
		match field {
			Field::Level => instruction.level = value,
			Field::Offset => instruction.offset = Operand::Number(i64::try_from(value)?),
		}
		Ok(())
	}

	pub fn instructions(&self) -> &[Instruction] { &self.instructions }

	pub fn into_instructions(self) -> Vec<Instruction> { self.instructions }
}

/// Render a program as a JSON array of `{op, level, offset}`.
pub fn to_json(instructions: &[Instruction]) -> anyhow::Result<String> {
	serde_json::to_string_pretty(instructions).context("Failed serialize bytecode")
}

/// Load a program previously rendered by [`to_json`].
pub fn from_json(json: &str) -> anyhow::Result<Vec<Instruction>> {
	serde_json::from_str(json).context("Failed parse bytecode")
}

/// A numbered, one instruction per line listing.
pub fn listing(instructions: &[Instruction]) -> String {
	let width = instructions.len().saturating_sub(1).to_string().len();
	instructions
		.iter()
		.enumerate()
		.map(|(address, instruction)| format!("{address:>width$}: {instruction}\n"))
		.collect()
}
