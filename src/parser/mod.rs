//! The `Scanner` works on the `lexical grammar`, whose alphabet is characters.
//! The `Parser` works on the `syntactic grammar`, whose alphabet is tokens.
//!
//! A recursive descent parser with one token of lookahead. The only place that
//! needs a second token is telling an assignment (`identifier :=`) apart from
//! an empty statement.
//!
//! ``` BNF
//! program         → subprogram "." ;
//! subprogram      → constDecls? varDecls? procedureDecls? statement ;
//! constDecls      → "const" constDecl ( "," constDecl )* ";" ;
//! constDecl       → IDENTIFIER "=" NUMBER ;
//! varDecls        → "var" IDENTIFIER ( "," IDENTIFIER )* ";" ;
//! procedureDecls  → procedureDecl+ ;
//! procedureDecl   → procedureHeader subprogram ";" ;
//! procedureHeader → "procedure" IDENTIFIER ";" ;
//! statement       → block | simpleStatement ;
//! block           → "begin" statement ( ";" statement )* "end" ;
//! simpleStatement → whileStmt | condStmt | readStmt | writeStmt | callStmt | assignStmt | ε ;
//! assignStmt      → IDENTIFIER ":=" expr ;
//! whileStmt       → "while" condExpr "do" statement ;
//! condStmt        → "if" condExpr "then" statement ;
//! readStmt        → "read" "(" IDENTIFIER ( "," IDENTIFIER )* ")" ;
//! writeStmt       → "write" "(" expr ( "," expr )* ")" ;
//! callStmt        → "call" IDENTIFIER ;
//! condExpr        → "odd" expr | expr condOp expr ;
//! expr            → ( "+" | "-" )? term ( ( "+" | "-" ) term )* ;
//! term            → factor ( ( "*" | "/" ) factor )* ;
//! factor          → "(" expr ")" | NUMBER | IDENTIFIER ;
//! condOp          → "=" | "#" | "<" | "<=" | ">" | ">=" ;
//! ```

pub mod ast;
pub mod printer;

use ast::*;
use log::debug;

use crate::{error::parser::{ParseError, ParseErrorType}, scanner::{Token, TokenKind::{self, *}}};

pub struct Parser {
	/// The tokens to parse.
	tokens: Vec<Token>,
	/// Index of the lookahead token.
	cursor: usize,
}

impl Parser {
	pub fn new(tokens: Vec<Token>) -> Self { Self { tokens, cursor: 0 } }

	/// Parse a whole program, which must consume every token.
	pub fn parse(mut self) -> Result<Program, ParseError> {
		let block = self.subprogram()?;
		self.expect(Dot)?;
		if self.peek().is_some() {
			return Err(self.error(ParseErrorType::TrailingInput));
		}
		debug!("parsed {} tokens", self.tokens.len());
		Ok(Program { block })
	}

	fn subprogram(&mut self) -> Result<Subprogram, ParseError> {
		let consts = if self.check(Const) { Some(self.const_decls()?) } else { None };
		let vars = if self.check(Var) { Some(self.var_decls()?) } else { None };
		let procedures = if self.check(Procedure) { Some(self.procedure_decls()?) } else { None };
		let body = self.statement()?;
		Ok(Subprogram { consts, vars, procedures, body })
	}

	fn const_decls(&mut self) -> Result<ConstDecls, ParseError> {
		self.expect(Const)?;
		let mut decls = vec![self.const_decl()?];
		while self.consume(Comma) {
			decls.push(self.const_decl()?);
		}
		self.expect(Semicolon)?;
		Ok(ConstDecls(decls))
	}

	fn const_decl(&mut self) -> Result<ConstDecl, ParseError> {
		let name = self.ident()?;
		self.expect(Equal)?;
		let value = self.number()?;
		Ok(ConstDecl { name, value })
	}

	fn var_decls(&mut self) -> Result<VarDecls, ParseError> {
		self.expect(Var)?;
		let mut names = vec![self.ident()?];
		while self.consume(Comma) {
			names.push(self.ident()?);
		}
		self.expect(Semicolon)?;
		Ok(VarDecls(names))
	}

	fn procedure_decls(&mut self) -> Result<ProcedureDecls, ParseError> {
		let mut decls = vec![self.procedure_decl()?];
		while self.check(Procedure) {
			decls.push(self.procedure_decl()?);
		}
		Ok(ProcedureDecls(decls))
	}

	fn procedure_decl(&mut self) -> Result<ProcedureDecl, ParseError> {
		let header = self.procedure_header()?;
		let body = Box::new(self.subprogram()?);
		self.expect(Semicolon)?;
		Ok(ProcedureDecl { header, body })
	}

	fn procedure_header(&mut self) -> Result<ProcedureHeader, ParseError> {
		self.expect(Procedure)?;
		let name = self.ident()?;
		self.expect(Semicolon)?;
		Ok(ProcedureHeader { name })
	}

	/// `None` is the empty statement.
	fn statement(&mut self) -> Result<Option<Statement>, ParseError> {
		if self.check(Begin) {
			return self.block().map(|stmts| Some(Statement::Block(stmts)));
		}
		self.simple_statement()
	}

	fn block(&mut self) -> Result<Stmts, ParseError> {
		self.expect(Begin)?;
		let mut stmts = vec![self.statement()?];
		while self.consume(Semicolon) {
			stmts.push(self.statement()?);
		}
		self.expect(End)?;
		Ok(Stmts(stmts))
	}

	fn simple_statement(&mut self) -> Result<Option<Statement>, ParseError> {
		Ok(Some(match self.peek_kind() {
			Some(While) => Statement::While(self.while_stmt()?),
			Some(If) => Statement::Cond(self.cond_stmt()?),
			Some(Read) => Statement::Read(self.read_stmt()?),
			Some(Write) => Statement::Write(self.write_stmt()?),
			Some(Call) => Statement::Call(self.call_stmt()?),
			Some(Identifier) if self.peek_second_kind() == Some(Assign) => Statement::Assign(self.assign_stmt()?),
			_ => return Ok(None),
		}))
	}

	fn while_stmt(&mut self) -> Result<WhileStmt, ParseError> {
		self.expect(While)?;
		let condition = self.cond_expr()?;
		self.expect(Do)?;
		let body = self.statement()?.map(Box::new);
		Ok(WhileStmt { condition, body })
	}

	fn cond_stmt(&mut self) -> Result<CondStmt, ParseError> {
		self.expect(If)?;
		let condition = self.cond_expr()?;
		self.expect(Then)?;
		let body = self.statement()?.map(Box::new);
		Ok(CondStmt { condition, body })
	}

	fn read_stmt(&mut self) -> Result<ReadStmt, ParseError> {
		self.expect(Read)?;
		self.expect(LeftParen)?;
		let mut targets = vec![self.ident()?];
		while self.consume(Comma) {
			targets.push(self.ident()?);
		}
		self.expect(RightParen)?;
		Ok(ReadStmt { targets })
	}

	fn write_stmt(&mut self) -> Result<WriteStmt, ParseError> {
		self.expect(Write)?;
		self.expect(LeftParen)?;
		let mut values = vec![self.expr()?];
		while self.consume(Comma) {
			values.push(self.expr()?);
		}
		self.expect(RightParen)?;
		Ok(WriteStmt { values })
	}

	fn call_stmt(&mut self) -> Result<CallStmt, ParseError> {
		self.expect(Call)?;
		let callee = self.ident()?;
		Ok(CallStmt { callee })
	}

	fn assign_stmt(&mut self) -> Result<AssignStmt, ParseError> {
		let target = self.ident()?;
		self.expect(Assign)?;
		let value = self.expr()?;
		Ok(AssignStmt { target, value })
	}

	fn cond_expr(&mut self) -> Result<CondExpr, ParseError> {
		if self.consume(Odd) {
			return Ok(CondExpr::Odd(self.expr()?));
		}
		let left = self.expr()?;
		let op = self.cond_op()?;
		let right = self.expr()?;
		Ok(CondExpr::Compare { left, op, right })
	}

	fn expr(&mut self) -> Result<Expr, ParseError> {
		let sign = match self.peek_kind() {
			Some(Plus) => Some(UnaryOp::Plus),
			Some(Minus) => Some(UnaryOp::Minus),
			_ => None,
		};
		if sign.is_some() {
			self.cursor += 1;
		}
		let first = self.term()?;
		let mut rest = Vec::new();
		while let Some(op) = self.additive_op() {
			rest.push((op, self.term()?));
		}
		Ok(Expr { sign, first, rest })
	}

	fn term(&mut self) -> Result<Term, ParseError> {
		let first = self.factor()?;
		let mut rest = Vec::new();
		while let Some(op) = self.multiplicative_op() {
			rest.push((op, self.factor()?));
		}
		Ok(Term { first, rest })
	}

	fn factor(&mut self) -> Result<Factor, ParseError> {
		match self.peek_kind() {
			Some(LeftParen) => {
				self.cursor += 1;
				let expr = self.expr()?;
				self.expect(RightParen)?;
				Ok(Factor::Group(Box::new(expr)))
			}
			Some(Number) => Ok(Factor::Number(self.number()?)),
			Some(Identifier) => Ok(Factor::Ident(self.ident()?)),
			_ => Err(self.error(ParseErrorType::ExpectedFactor)),
		}
	}

	fn additive_op(&mut self) -> Option<BinaryOp> {
		let op = match self.peek_kind()? {
			Plus => BinaryOp::Add,
			Minus => BinaryOp::Sub,
			_ => return None,
		};
		self.cursor += 1;
		Some(op)
	}

	fn multiplicative_op(&mut self) -> Option<BinaryOp> {
		let op = match self.peek_kind()? {
			Star => BinaryOp::Mul,
			Slash => BinaryOp::Div,
			_ => return None,
		};
		self.cursor += 1;
		Some(op)
	}

	fn cond_op(&mut self) -> Result<CondOp, ParseError> {
		let op = match self.peek_kind() {
			Some(Equal) => CondOp::Eq,
			Some(Hash) => CondOp::Ne,
			Some(Less) => CondOp::Lt,
			Some(LessEqual) => CondOp::Le,
			Some(Greater) => CondOp::Gt,
			Some(GreaterEqual) => CondOp::Ge,
			_ => return Err(self.error(ParseErrorType::ExpectedCondOp)),
		};
		self.cursor += 1;
		Ok(op)
	}

	fn ident(&mut self) -> Result<Ident, ParseError> {
		let token = self.expect(Identifier)?;
		Ok(Ident { name: token.text, index: token.index })
	}

	fn number(&mut self) -> Result<NumberLit, ParseError> {
		let token = self.expect(Number)?;
		match token.text.parse() {
			Ok(value) => Ok(NumberLit { value, index: token.index }),
			Err(_) => Err(ParseError::new(Some(token), ParseErrorType::InvalidNumber)),
		}
	}

	/// Consume the lookahead if it is of `kind`, otherwise fail on it.
	fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
		match self.tokens.get(self.cursor) {
			Some(token) if token.kind == kind => {
				self.cursor += 1;
				Ok(token.clone())
			}
			_ => Err(self.error(ParseErrorType::Expected(kind))),
		}
	}

	/// Consume the lookahead if it is of `kind`.
	fn consume(&mut self, kind: TokenKind) -> bool {
		let matched = self.check(kind);
		if matched {
			self.cursor += 1;
		}
		matched
	}

	fn check(&self, kind: TokenKind) -> bool { self.peek_kind() == Some(kind) }

	fn peek(&self) -> Option<&Token> { self.tokens.get(self.cursor) }

	fn peek_kind(&self) -> Option<TokenKind> { self.peek().map(|token| token.kind) }

	fn peek_second_kind(&self) -> Option<TokenKind> { self.tokens.get(self.cursor + 1).map(|token| token.kind) }

	fn error(&self, r#type: ParseErrorType) -> ParseError { ParseError::new(self.peek().cloned(), r#type) }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scanner::Scanner;

	fn parse(input: &str) -> Result<Program, ParseError> {
		let tokens = Scanner::scan(input).unwrap();
		Parser::new(tokens).parse()
	}

	fn body(input: &str, equals: &str) {
		let program = parse(input).unwrap();
		let body = program.block.body.map_or_else(|| "()".to_string(), |stmt| stmt.to_string());
		assert_eq!(body, equals);
	}

	#[test]
	fn parse_precedence() {
		body("var x; x := 1+2*3 .", "(:= x (+ 1 (* 2 3)))");
		body("var x; x := 1*2+3 .", "(:= x (+ (* 1 2) 3))");
		body("var x; x := (1+2)*3 .", "(:= x (* (group (+ 1 2)) 3))");
		body("var x; x := 8-4-2 .", "(:= x (- (- 8 4) 2))");
		body("var x; x := 8/4/2 .", "(:= x (/ (/ 8 4) 2))");
	}

	#[test]
	fn parse_unary_sign_is_kept() {
		body("var x; x := -1+2 .", "(:= x (- (+ 1 2)))");
		let program = parse("var x; x := +x .").unwrap();
		let Some(Statement::Assign(assign)) = program.block.body else { panic!("expected assignment") };
		assert_eq!(assign.value.sign, Some(UnaryOp::Plus));
	}

	#[test]
	fn parse_statements() {
		body("var x; begin x := 1; write(x) end .", "(begin (:= x 1) (write x))");
		body("var a, b; read(a, b) .", "(read a b)");
		body("write(1, 2+3) .", "(write 1 (+ 2 3))");
		body("var i; while i < 10 do i := i + 1 .", "(while (< i 10) (:= i (+ i 1)))");
		body("var i; if odd i then write(i) .", "(if (odd i) (write i))");
		body("procedure p; ; call p .", "(call p)");
	}

	#[test]
	fn parse_relational_operators() {
		body("if 1 = 2 then .", "(if (= 1 2) ())");
		body("if 1 # 2 then .", "(if (# 1 2) ())");
		body("if 1 <= 2 then .", "(if (<= 1 2) ())");
		body("if 1 >= 2 then .", "(if (>= 1 2) ())");
		body("if 1 > 2 then .", "(if (> 1 2) ())");
	}

	#[test]
	fn parse_empty_statements() {
		body(".", "()");
		body("begin end .", "(begin ())");
		body("begin ; ; end .", "(begin () () ())");
		body("while 1 = 1 do .", "(while (= 1 1) ())");
	}

	#[test]
	fn parse_declarations() {
		let program = parse("const a = 5, b = 7; var x, y; procedure p; var z; z := a; procedure q; ; x := b .").unwrap();
		let block = program.block;
		let ConstDecls(consts) = block.consts.unwrap();
		assert_eq!(consts.len(), 2);
		assert_eq!(consts[1].name.name, "b");
		assert_eq!(consts[1].value.value, 7);
		assert_eq!(block.vars.unwrap().0.len(), 2);
		let ProcedureDecls(procedures) = block.procedures.unwrap();
		assert_eq!(procedures.len(), 2);
		assert_eq!(procedures[0].header.name.name, "p");
		assert!(procedures[0].body.vars.is_some());
		assert_eq!(procedures[1].header.name.name, "q");
		assert!(procedures[1].body.body.is_none());
	}

	#[test]
	fn parse_nested_procedures() {
		let program = parse("procedure outer; procedure inner; ; call inner; call outer .").unwrap();
		let ProcedureDecls(outer) = program.block.procedures.unwrap();
		let ProcedureDecls(inner) = outer[0].body.procedures.clone().unwrap();
		assert_eq!(inner[0].header.name.name, "inner");
	}

	#[test]
	fn parse_errors() {
		let error = parse("var x; x := 1").unwrap_err();
		assert_eq!(error, ParseError::new(None, ParseErrorType::Expected(Dot)));

		let error = parse("var x x := 1 .").unwrap_err();
		assert_eq!(error.r#type, ParseErrorType::Expected(Semicolon));
		assert_eq!(error.found.unwrap().text, "x");

		let error = parse("var x; x := * .").unwrap_err();
		assert_eq!(error.r#type, ParseErrorType::ExpectedFactor);

		let error = parse("if 1 then .").unwrap_err();
		assert_eq!(error.r#type, ParseErrorType::ExpectedCondOp);

		let error = parse(". x").unwrap_err();
		assert_eq!(error.r#type, ParseErrorType::TrailingInput);

		let error = parse("const a = x; .").unwrap_err();
		assert_eq!(error.r#type, ParseErrorType::Expected(Number));
	}

	#[test]
	fn identifier_without_assign_is_empty_statement() {
		let error = parse("var x; x .").unwrap_err();
		assert_eq!(error.r#type, ParseErrorType::Expected(Dot));
		assert_eq!(error.found.unwrap().index, 7);
	}
}
