use std::{fs::read_to_string, path::Path};

use anyhow::Context;
use log::debug;

use crate::{Pl0Error, bytecode::{self, Instruction}, generator::Generator, parser::{Parser, ast::Program, printer::DotPrinter}, scanner::{Scanner, Token}, vm::{Vm, io::{Input, Output}}};

/// Pl0 drives source text through every phase of the toolchain.
pub struct Pl0;

impl Pl0 {
	/// Read a source or artifact file.
	pub fn read_file<P: AsRef<Path>>(&self, path: P) -> Result<String, Pl0Error> {
		let path = path.as_ref();
		Ok(read_to_string(path).with_context(|| format!("Failed open file {}", path.display()))?)
	}

	pub fn tokens(&self, source: &str) -> Result<Vec<Token>, Pl0Error> {
		let tokens = Scanner::scan(source)?;
		debug!("scanned {} tokens", tokens.len());
		Ok(tokens)
	}

	pub fn parse(&self, source: &str) -> Result<Program, Pl0Error> {
		let tokens = self.tokens(source)?;
		Ok(Parser::new(tokens).parse()?)
	}

	/// The syntax tree as a Graphviz `digraph`.
	pub fn dot(&self, source: &str) -> Result<String, Pl0Error> {
		let program = self.parse(source)?;
		Ok(DotPrinter::new().print(&program))
	}

	pub fn compile(&self, source: &str) -> Result<Vec<Instruction>, Pl0Error> {
		let program = self.parse(source)?;
		Ok(Generator::new().generate(&program)?)
	}

	/// Compile `source` to a JSON bytecode artifact.
	pub fn compile_to_json(&self, source: &str) -> Result<String, Pl0Error> {
		let instructions = self.compile(source)?;
		Ok(bytecode::to_json(&instructions)?)
	}

	pub fn listing(&self, source: &str) -> Result<String, Pl0Error> {
		let instructions = self.compile(source)?;
		Ok(bytecode::listing(&instructions))
	}

	/// Execute already generated code until it halts.
	pub fn execute<I: Input, O: Output>(&self, program: &[Instruction], input: I, output: O) -> Result<(), Pl0Error> {
		debug!("executing {} instructions", program.len());
		Vm::new(program, input, output).run()?;
		Ok(())
	}

	/// Execute a JSON bytecode artifact.
	pub fn execute_json<I: Input, O: Output>(&self, json: &str, input: I, output: O) -> Result<(), Pl0Error> {
		let program = bytecode::from_json(json)?;
		self.execute(&program, input, output)
	}

	/// Compile and execute `source`.
	pub fn run<I: Input, O: Output>(&self, source: &str, input: I, output: O) -> Result<(), Pl0Error> {
		let program = self.compile(source)?;
		self.execute(&program, input, output)
	}
}
