//! Syntax tree nodes.
//!
//! The tree mirrors the grammar one node kind per rule. Optional pieces of a
//! rule are `Option`s, and an empty statement is simply `None` wherever a
//! statement may appear.

use std::fmt::Display;

/// `program := subprogram '.'`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
	pub block: Subprogram,
}

/// Declarations in fixed order followed by one statement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Subprogram {
	pub consts:     Option<ConstDecls>,
	pub vars:       Option<VarDecls>,
	pub procedures: Option<ProcedureDecls>,
	pub body:       Option<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstDecls(pub Vec<ConstDecl>);

/// `identifier '=' number`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstDecl {
	pub name:  Ident,
	pub value: NumberLit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecls(pub Vec<Ident>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureDecls(pub Vec<ProcedureDecl>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureDecl {
	pub header: ProcedureHeader,
	pub body:   Box<Subprogram>,
}

/// `'procedure' identifier ';'`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureHeader {
	pub name: Ident,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
	/// `begin ... end`, each element possibly empty.
	Block(Stmts),
	Read(ReadStmt),
	Write(WriteStmt),
	Call(CallStmt),
	While(WhileStmt),
	Assign(AssignStmt),
	Cond(CondStmt),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmts(pub Vec<Option<Statement>>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadStmt {
	pub targets: Vec<Ident>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteStmt {
	pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStmt {
	pub callee: Ident,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStmt {
	pub condition: CondExpr,
	pub body:      Option<Box<Statement>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignStmt {
	pub target: Ident,
	pub value:  Expr,
}

/// `if` without `else`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CondStmt {
	pub condition: CondExpr,
	pub body:      Option<Box<Statement>>,
}

/// `[('+'|'-')] term (('+'|'-') term)*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
	pub sign:  Option<UnaryOp>,
	pub first: Term,
	pub rest:  Vec<(BinaryOp, Term)>,
}

/// `factor (('*'|'/') factor)*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
	pub first: Factor,
	pub rest:  Vec<(BinaryOp, Factor)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Factor {
	Ident(Ident),
	Number(NumberLit),
	Group(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CondExpr {
	Odd(Expr),
	Compare { left: Expr, op: CondOp, right: Expr },
}

/// A reference to a declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
	pub name:  String,
	/// Source index of the identifier token.
	pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLit {
	pub value: i64,
	pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
	Plus,
	Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
	Add,
	Sub,
	Mul,
	Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondOp {
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
}

impl Display for UnaryOp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			UnaryOp::Plus => write!(f, "+"),
			UnaryOp::Minus => write!(f, "-"),
		}
	}
}

impl Display for BinaryOp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			BinaryOp::Add => write!(f, "+"),
			BinaryOp::Sub => write!(f, "-"),
			BinaryOp::Mul => write!(f, "*"),
			BinaryOp::Div => write!(f, "/"),
		}
	}
}

impl Display for CondOp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			CondOp::Eq => write!(f, "="),
			CondOp::Ne => write!(f, "#"),
			CondOp::Lt => write!(f, "<"),
			CondOp::Le => write!(f, "<="),
			CondOp::Gt => write!(f, ">"),
			CondOp::Ge => write!(f, ">="),
		}
	}
}

// Expressions print as prefix s-expressions in evaluation order, e.g.
// `1 + 2 * 3` is `(+ 1 (* 2 3))`.

impl Display for Expr {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut text = self.first.to_string();
		for (op, term) in &self.rest {
			text = format!("({op} {text} {term})");
		}
		match self.sign {
			Some(sign) => write!(f, "({sign} {text})"),
			None => write!(f, "{text}"),
		}
	}
}

impl Display for Term {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut text = self.first.to_string();
		for (op, factor) in &self.rest {
			text = format!("({op} {text} {factor})");
		}
		write!(f, "{text}")
	}
}

impl Display for Factor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Factor::Ident(ident) => write!(f, "{}", ident.name),
			Factor::Number(number) => write!(f, "{}", number.value),
			Factor::Group(expr) => write!(f, "(group {expr})"),
		}
	}
}

impl Display for CondExpr {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			CondExpr::Odd(expr) => write!(f, "(odd {expr})"),
			CondExpr::Compare { left, op, right } => write!(f, "({op} {left} {right})"),
		}
	}
}

impl Display for Statement {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Statement::Block(Stmts(stmts)) => {
				let inner = stmts
					.iter()
					.map(|stmt| stmt.as_ref().map_or_else(|| "()".to_string(), |stmt| stmt.to_string()))
					.collect::<Vec<String>>()
					.join(" ");
				write!(f, "(begin {inner})")
			}
			Statement::Read(ReadStmt { targets }) => write!(
				f,
				"(read {})",
				targets.iter().map(|target| target.name.as_str()).collect::<Vec<&str>>().join(" ")
			),
			Statement::Write(WriteStmt { values }) => write!(
				f,
				"(write {})",
				values.iter().map(|value| value.to_string()).collect::<Vec<String>>().join(" ")
			),
			Statement::Call(CallStmt { callee }) => write!(f, "(call {})", callee.name),
			Statement::While(WhileStmt { condition, body }) => write!(f, "(while {condition} {})", optional(body)),
			Statement::Assign(AssignStmt { target, value }) => write!(f, "(:= {} {value})", target.name),
			Statement::Cond(CondStmt { condition, body }) => write!(f, "(if {condition} {})", optional(body)),
		}
	}
}

fn optional(statement: &Option<Box<Statement>>) -> String {
	statement.as_ref().map_or_else(|| "()".to_string(), |statement| statement.to_string())
}
