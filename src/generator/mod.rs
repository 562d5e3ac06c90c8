//! Second pass: walk the syntax tree and emit stack machine code.
//!
//! Each `Subprogram` opens a scope and brackets its code with `INT n` and
//! `OPR 0`, where `n` is only known once all of its declarations have been
//! seen, so the `INT` is emitted with a placeholder and patched afterwards.
//! Procedure entry points and forward jumps are patched the same way.
//!
//! Names are resolved against the scopes open at the moment a node is
//! visited, giving the `(level, offset)` pairs used by `LOD`, `STO` and `CAL`.
//! Constants and procedure entry addresses occupy ordinary slots, so they are
//! loaded and called through the same addressing as variables.

use anyhow::anyhow;
use log::{debug, warn};

use crate::{bytecode::{Code, Field, Instruction, OpCode, Operator}, environment::{Address, Environment, READ_PORT, SymbolKind, WRITE_PORT}, error::generator::{GenerateError, GenerateErrorType, GeneratorError}, parser::ast::*};

pub struct Generator {
	code: Code,
	env:  Environment,
}

impl Default for Generator {
	fn default() -> Self { Self::new() }
}

impl Generator {
	pub fn new() -> Self { Self { code: Code::new(), env: Environment::new() } }

	pub fn generate(mut self, program: &Program) -> Result<Vec<Instruction>, GeneratorError> {
		self.subprogram(&program.block)?;
		debug!("generated {} instructions", self.code.next_address());
		Ok(self.code.into_instructions())
	}

	fn subprogram(&mut self, subprogram: &Subprogram) -> Result<(), GeneratorError> {
		self.env.enter();
		let int = self.code.emit(Instruction::new(OpCode::Int, 0, 0));
		if let Some(ConstDecls(decls)) = &subprogram.consts {
			for decl in decls {
				self.const_decl(decl)?;
			}
		}
		if let Some(VarDecls(names)) = &subprogram.vars {
			for name in names {
				self.declare(name, SymbolKind::Var, None);
			}
		}
		if let Some(ProcedureDecls(decls)) = &subprogram.procedures {
			for decl in decls {
				self.procedure_decl(decl)?;
			}
		}
		if let Some(body) = &subprogram.body {
			self.statement(body)?;
		}
		let size = self.env.current().len();
		self.code.patch(int, Field::Offset, size)?;
		self.code.emit(Instruction::ret());
		self.env.exit();
		Ok(())
	}

	fn const_decl(&mut self, decl: &ConstDecl) -> Result<(), GeneratorError> {
		let offset = self.declare(&decl.name, SymbolKind::Const, Some(decl.value.value));
		self.code.emit(Instruction::new(OpCode::Lit, 0, decl.value.value));
		self.code.emit(slot(OpCode::Sto, 0, offset)?);
		Ok(())
	}

	fn procedure_decl(&mut self, decl: &ProcedureDecl) -> Result<(), GeneratorError> {
		let offset = self.declare(&decl.header.name, SymbolKind::Procedure, None);
		let entry = self.code.emit(Instruction::new(OpCode::Lit, 0, 0));
		self.code.emit(slot(OpCode::Sto, 0, offset)?);
		let skip = self.code.emit(Instruction::new(OpCode::Jmp, 0, 0));
		self.code.patch(entry, Field::Offset, self.code.next_address())?;
		self.subprogram(&decl.body)?;
		self.code.patch(skip, Field::Offset, self.code.next_address())?;
		Ok(())
	}

	/// Declare `name` in the current scope, returning its slot.
	fn declare(&mut self, name: &Ident, kind: SymbolKind, value: Option<i64>) -> usize {
		match self.env.define(&name.name, kind, value) {
			Ok(symbol) => symbol.offset,
			Err(existing) => {
				warn!("index {}: '{}' already declared in this scope, reusing slot {}", name.index, name.name, existing.offset);
				existing.offset
			}
		}
	}

	fn statement(&mut self, statement: &Statement) -> Result<(), GeneratorError> {
		match statement {
			Statement::Block(Stmts(stmts)) => {
				for stmt in stmts.iter().flatten() {
					self.statement(stmt)?;
				}
			}
			Statement::Read(ReadStmt { targets }) => {
				let port = self.port(READ_PORT)?;
				for target in targets {
					let address = self.resolve(target)?;
					if address.symbol.kind != SymbolKind::Var {
						warn!("index {}: reading into '{}', which is not a variable", target.index, target.name);
					}
					self.code.emit(slot(OpCode::Lod, port.level, port.symbol.offset)?);
					self.code.emit(slot(OpCode::Sto, address.level, address.symbol.offset)?);
				}
			}
			Statement::Write(WriteStmt { values }) => {
				let port = self.port(WRITE_PORT)?;
				for value in values {
					self.expr(value)?;
					self.code.emit(slot(OpCode::Sto, port.level, port.symbol.offset)?);
				}
			}
			Statement::Call(CallStmt { callee }) => {
				let address = self.resolve(callee)?;
				if address.symbol.kind != SymbolKind::Procedure {
					warn!("index {}: calling '{}', which is not a procedure", callee.index, callee.name);
				}
				self.code.emit(slot(OpCode::Cal, address.level, address.symbol.offset)?);
			}
			Statement::While(WhileStmt { condition, body }) => {
				let top = self.code.next_address();
				self.cond_expr(condition)?;
				let exit = self.code.emit(Instruction::new(OpCode::Jpc, 0, 0));
				if let Some(body) = body {
					self.statement(body)?;
				}
				self.code.emit(slot(OpCode::Jmp, 0, top)?);
				self.code.patch(exit, Field::Offset, self.code.next_address())?;
			}
			Statement::Assign(AssignStmt { target, value }) => {
				self.expr(value)?;
				let address = self.resolve(target)?;
				if address.symbol.kind != SymbolKind::Var {
					warn!("index {}: assigning to '{}', which is not a variable", target.index, target.name);
				}
				self.code.emit(slot(OpCode::Sto, address.level, address.symbol.offset)?);
			}
			Statement::Cond(CondStmt { condition, body }) => {
				self.cond_expr(condition)?;
				let skip = self.code.emit(Instruction::new(OpCode::Jpc, 0, 0));
				if let Some(body) = body {
					self.statement(body)?;
				}
				self.code.patch(skip, Field::Offset, self.code.next_address())?;
			}
		}
		Ok(())
	}

	fn cond_expr(&mut self, condition: &CondExpr) -> Result<(), GeneratorError> {
		match condition {
			CondExpr::Odd(expr) => {
				self.expr(expr)?;
				self.code.emit(Instruction::operator(Operator::Odd));
			}
			CondExpr::Compare { left, op, right } => {
				self.expr(left)?;
				self.expr(right)?;
				self.code.emit(Instruction::operator(compare_operator(*op)));
			}
		}
		Ok(())
	}

	fn expr(&mut self, expr: &Expr) -> Result<(), GeneratorError> {
		if let Some(sign) = expr.sign {
			// A leading sign is accepted by the grammar but has no code.
			warn!("leading '{sign}' on expression '{expr}' generates no code");
		}
		self.term(&expr.first)?;
		for (op, term) in &expr.rest {
			self.term(term)?;
			self.code.emit(Instruction::operator(arithmetic_operator(*op)));
		}
		Ok(())
	}

	fn term(&mut self, term: &Term) -> Result<(), GeneratorError> {
		self.factor(&term.first)?;
		for (op, factor) in &term.rest {
			self.factor(factor)?;
			self.code.emit(Instruction::operator(arithmetic_operator(*op)));
		}
		Ok(())
	}

	fn factor(&mut self, factor: &Factor) -> Result<(), GeneratorError> {
		match factor {
			Factor::Ident(ident) => {
				let address = self.resolve(ident)?;
				self.code.emit(slot(OpCode::Lod, address.level, address.symbol.offset)?);
			}
			Factor::Number(number) => {
				self.code.emit(Instruction::new(OpCode::Lit, 0, number.value));
			}
			Factor::Group(expr) => self.expr(expr)?,
		}
		Ok(())
	}

	fn resolve(&self, ident: &Ident) -> Result<Address, GeneratorError> {
		self.env
			.resolve(&ident.name)
			.ok_or_else(|| GenerateError::new(&ident.name, ident.index, GenerateErrorType::UndeclaredIdentifier).into())
	}

	fn port(&self, name: &str) -> Result<Address, GeneratorError> {
		self.env.resolve(name).ok_or_else(|| anyhow!("I/O port '{name}' missing from the outermost scope").into())
	}
}

/// An instruction with an unsigned offset: a slot `level` scopes out, or a
/// code address.
fn slot(op: OpCode, level: usize, offset: usize) -> anyhow::Result<Instruction> {
	Ok(Instruction::new(op, level, i64::try_from(offset)?))
}

fn arithmetic_operator(op: BinaryOp) -> Operator {
	match op {
		BinaryOp::Add => Operator::Add,
		BinaryOp::Sub => Operator::Sub,
		BinaryOp::Mul => Operator::Mul,
		BinaryOp::Div => Operator::Div,
	}
}

fn compare_operator(op: CondOp) -> Operator {
	match op {
		CondOp::Eq => Operator::Eq,
		CondOp::Ne => Operator::Ne,
		CondOp::Lt => Operator::Lt,
		CondOp::Le => Operator::Le,
		CondOp::Gt => Operator::Gt,
		CondOp::Ge => Operator::Ge,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{bytecode::listing, parser::Parser, scanner::Scanner};

	fn generate(input: &str) -> Result<Vec<Instruction>, GeneratorError> {
		let tokens = Scanner::scan(input).unwrap();
		let program = Parser::new(tokens).parse().unwrap();
		Generator::new().generate(&program)
	}

	fn assert_listing(input: &str, expected: &[&str]) {
		let code = generate(input).unwrap();
		let actual = code.iter().map(|instruction| instruction.to_string()).collect::<Vec<String>>();
		assert_eq!(actual, expected, "\n{}", listing(&code));
	}

	#[test]
	fn generate_constants_and_write() {
		assert_listing("const a = 5; var b; begin b := a + 1; write(b) end .", &[
			"INT 0 2", "LIT 0 5", "STO 0 0", "LOD 0 0", "LIT 0 1", "OPR 0 +", "STO 0 1", "LOD 0 1", "STO 1 1",
			"OPR 0 0",
		]);
	}

	#[test]
	fn generate_read() {
		assert_listing("var x, y; read(x, y) .", &["INT 0 2", "LOD 1 0", "STO 0 0", "LOD 1 0", "STO 0 1", "OPR 0 0"]);
	}

	#[test]
	fn generate_precedence() {
		assert_listing("write(1 + 2 * 3) .", &[
			"INT 0 0", "LIT 0 1", "LIT 0 2", "LIT 0 3", "OPR 0 *", "OPR 0 +", "STO 1 1", "OPR 0 0",
		]);
	}

	#[test]
	fn generate_procedure() {
		assert_listing("var x; procedure p; x := 1; begin call p; write(x) end .", &[
			"INT 0 2", "LIT 0 4", "STO 0 1", "JMP 0 8", "INT 0 0", "LIT 0 1", "STO 1 0", "OPR 0 0", "CAL 0 1", "LOD 0 0",
			"STO 1 1", "OPR 0 0",
		]);
	}

	#[test]
	fn generate_sibling_procedures() {
		assert_listing("var x; procedure p; ; procedure q; call p; call q .", &[
			"INT 0 3", "LIT 0 4", "STO 0 1", "JMP 0 6", "INT 0 0", "OPR 0 0", "LIT 0 9", "STO 0 2", "JMP 0 12",
			"INT 0 0", "CAL 1 1", "OPR 0 0", "CAL 0 2", "OPR 0 0",
		]);
	}

	#[test]
	fn generate_while() {
		assert_listing("var i; while i < 3 do i := i + 1 .", &[
			"INT 0 1", "LOD 0 0", "LIT 0 3", "OPR 0 <", "JPC 0 10", "LOD 0 0", "LIT 0 1", "OPR 0 +", "STO 0 0",
			"JMP 0 1", "OPR 0 0",
		]);
	}

	#[test]
	fn generate_if_and_odd() {
		assert_listing("var i; if odd i then write(i) .", &[
			"INT 0 1", "LOD 0 0", "OPR 0 odd", "JPC 0 6", "LOD 0 0", "STO 1 1", "OPR 0 0",
		]);
	}

	#[test]
	fn generate_nested_levels() {
		assert_listing("var x; procedure p; var y; procedure q; y := x; ; .", &[
			"INT 0 2", "LIT 0 4", "STO 0 1", "JMP 0 13", "INT 0 2", "LIT 0 8", "STO 0 1", "JMP 0 12", "INT 0 0",
			"LOD 2 0", "STO 1 0", "OPR 0 0", "OPR 0 0", "OPR 0 0",
		]);
	}

	#[test]
	fn leading_sign_generates_nothing() {
		assert_eq!(generate("write(-5) .").unwrap(), generate("write(5) .").unwrap());
	}

	#[test]
	fn read_into_constant_stores_to_its_slot() {
		assert_listing("const c = 1; read(c) .", &["INT 0 1", "LIT 0 1", "STO 0 0", "LOD 1 0", "STO 0 0", "OPR 0 0"]);
	}

	#[test]
	fn slot_offsets_are_checked() {
		assert_eq!(slot(OpCode::Jmp, 0, 12).unwrap(), Instruction::new(OpCode::Jmp, 0, 12));
		assert!(slot(OpCode::Lod, 1, usize::MAX).is_err());
	}

	#[test]
	fn undeclared_identifier() {
		let error = generate("begin x := 1 end .").unwrap_err();
		let GeneratorError::GenerateError(error) = error else { panic!("expected generate error") };
		assert_eq!(error, GenerateError::new("x", 6, GenerateErrorType::UndeclaredIdentifier));

		assert!(generate("call nowhere .").is_err());
		assert!(generate("write(y) .").is_err());
		assert!(generate("var a; read(a, b) .").is_err());
	}

	#[test]
	fn procedure_cannot_see_later_declarations() {
		// `y` belongs to `p`'s sibling scope, not an enclosing one.
		assert!(generate("procedure p; y := 1; procedure q; var y; ; .").is_err());
		assert!(generate("var y; procedure p; y := 1; .").is_ok());
	}

	#[test]
	fn ports_are_not_visible_by_name() {
		assert!(generate("var x; x := 1 .").is_ok());
		assert!(Scanner::scan("write(readmemory) .").is_ok());
		assert!(generate("write(readmemory) .").is_err());
	}
}
