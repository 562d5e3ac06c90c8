//! Renders a syntax tree as a Graphviz `digraph`.
//!
//! Keywords and punctuation the tree does not store (`:=`, `while`, `do` ...)
//! are shown as extra leaf nodes so the picture reads like the source. They
//! exist only in the output; the tree is borrowed immutably.

use super::ast::*;

#[derive(Debug, Default)]
pub struct DotPrinter {
	nodes:   String,
	edges:   String,
	next_id: usize,
}

impl DotPrinter {
	pub fn new() -> Self { Self::default() }

	/// Print `program`, consuming the printer.
	pub fn print(mut self, program: &Program) -> String {
		let root = self.node(None, "Program");
		self.subprogram(root, &program.block);
		format!("digraph ast {{\n{}{}}}\n", self.nodes, self.edges)
	}

	fn node(&mut self, parent: Option<usize>, label: &str) -> usize {
		let id = self.next_id;
		self.next_id += 1;
		self.nodes.push_str(&format!("{id} [label=\"{}\"];\n", label.replace('"', "\\\"")));
		if let Some(parent) = parent {
			self.edges.push_str(&format!("{parent}->{id};\n"));
		}
		id
	}

	fn subprogram(&mut self, parent: usize, subprogram: &Subprogram) {
		let id = self.node(Some(parent), "Subprogram");
		if let Some(ConstDecls(decls)) = &subprogram.consts {
			let decls_id = self.node(Some(id), "ConstDecls");
			for decl in decls {
				let decl_id = self.node(Some(decls_id), "ConstDecl");
				self.ident(decl_id, &decl.name);
				self.node(Some(decl_id), "=");
				self.number(decl_id, &decl.value);
			}
		}
		if let Some(VarDecls(names)) = &subprogram.vars {
			let decls_id = self.node(Some(id), "VarDecls");
			for name in names {
				self.ident(decls_id, name);
			}
		}
		if let Some(ProcedureDecls(decls)) = &subprogram.procedures {
			let decls_id = self.node(Some(id), "ProcedureDecls");
			for decl in decls {
				let decl_id = self.node(Some(decls_id), "ProcedureDecl");
				let header_id = self.node(Some(decl_id), "ProcedureHeader");
				self.ident(header_id, &decl.header.name);
				self.node(Some(header_id), ";");
				self.subprogram(decl_id, &decl.body);
			}
		}
		if let Some(statement) = &subprogram.body {
			self.statement(id, statement);
		}
	}

	fn statement(&mut self, parent: usize, statement: &Statement) {
		match statement {
			Statement::Block(Stmts(stmts)) => {
				let id = self.node(Some(parent), "Stmts");
				for stmt in stmts.iter().flatten() {
					self.statement(id, stmt);
				}
			}
			Statement::Read(ReadStmt { targets }) => {
				let id = self.node(Some(parent), "ReadStmt");
				self.node(Some(id), "read");
				for target in targets {
					self.ident(id, target);
				}
			}
			Statement::Write(WriteStmt { values }) => {
				let id = self.node(Some(parent), "WriteStmt");
				self.node(Some(id), "write");
				for value in values {
					self.expr(id, value);
				}
			}
			Statement::Call(CallStmt { callee }) => {
				let id = self.node(Some(parent), "CallStmt");
				self.node(Some(id), "call");
				self.ident(id, callee);
			}
			Statement::While(WhileStmt { condition, body }) => {
				let id = self.node(Some(parent), "WhileStmt");
				self.node(Some(id), "while");
				self.cond_expr(id, condition);
				self.node(Some(id), "do");
				if let Some(body) = body {
					self.statement(id, body);
				}
			}
			Statement::Assign(AssignStmt { target, value }) => {
				let id = self.node(Some(parent), "AssignStmt");
				self.ident(id, target);
				self.node(Some(id), ":=");
				self.expr(id, value);
			}
			Statement::Cond(CondStmt { condition, body }) => {
				let id = self.node(Some(parent), "CondStmt");
				self.node(Some(id), "if");
				self.cond_expr(id, condition);
				self.node(Some(id), "then");
				if let Some(body) = body {
					self.statement(id, body);
				}
			}
		}
	}

	fn cond_expr(&mut self, parent: usize, condition: &CondExpr) {
		let id = self.node(Some(parent), "CondExpr");
		match condition {
			CondExpr::Odd(expr) => {
				self.node(Some(id), "UnaryOp odd");
				self.expr(id, expr);
			}
			CondExpr::Compare { left, op, right } => {
				self.expr(id, left);
				self.node(Some(id), &format!("CondOp {op}"));
				self.expr(id, right);
			}
		}
	}

	fn expr(&mut self, parent: usize, expr: &Expr) {
		let id = self.node(Some(parent), "Expr");
		if let Some(sign) = expr.sign {
			self.node(Some(id), &format!("UnaryOp {sign}"));
		}
		self.term(id, &expr.first);
		for (op, term) in &expr.rest {
			self.node(Some(id), &format!("BinaryOp {op}"));
			self.term(id, term);
		}
	}

	fn term(&mut self, parent: usize, term: &Term) {
		let id = self.node(Some(parent), "Term");
		self.factor(id, &term.first);
		for (op, factor) in &term.rest {
			self.node(Some(id), &format!("BinaryOp {op}"));
			self.factor(id, factor);
		}
	}

	fn factor(&mut self, parent: usize, factor: &Factor) {
		let id = self.node(Some(parent), "Factor");
		match factor {
			Factor::Ident(ident) => self.ident(id, ident),
			Factor::Number(number) => self.number(id, number),
			Factor::Group(expr) => self.expr(id, expr),
		}
	}

	fn ident(&mut self, parent: usize, ident: &Ident) { self.node(Some(parent), &format!("Id {}", ident.name)); }

	fn number(&mut self, parent: usize, number: &NumberLit) { self.node(Some(parent), &format!("Num {}", number.value)); }
}
