//! Compile-time scopes.
//!
//! Scopes form a stack: one frame per `Subprogram` being generated, on top
//! of a bottom frame holding the two I/O ports. A name resolves to the
//! number of frames crossed outward (`level`) and its slot in the frame that
//! declares it (`offset`), which is exactly how the VM addresses its block
//! stack.

use std::collections::HashMap;

/// Name of the input port symbol. Longer than any legal identifier.
pub const READ_PORT: &str = "read_memory";
/// Name of the output port symbol.
pub const WRITE_PORT: &str = "write_memory";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
	Const,
	Var,
	Procedure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
	pub kind:   SymbolKind,
	/// Declared value, constants only.
	pub value:  Option<i64>,
	/// Slot in the declaring scope's activation block.
	pub offset: usize,
}

/// A resolved reference to a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
	pub level:  usize,
	pub symbol: Symbol,
}

/// One lexical scope.
#[derive(Debug, Default, Clone)]
pub struct Scope {
	symbols: HashMap<String, Symbol>,
}

impl Scope {
	/// Number of slots this scope's activation block needs.
	pub fn len(&self) -> usize { self.symbols.len() }

	pub fn is_empty(&self) -> bool { self.symbols.is_empty() }

	pub fn get(&self, name: &str) -> Option<&Symbol> { self.symbols.get(name) }
}

/// The stack of scopes active at the current point of generation.
#[derive(Debug, Clone)]
pub struct Environment {
	frames: Vec<Scope>,
}

impl Default for Environment {
	fn default() -> Self { Self::new() }
}

impl Environment {
	/// An environment holding only the I/O ports, in slots 0 and 1.
	pub fn new() -> Self {
		let mut io = Scope::default();
		io.symbols.insert(READ_PORT.to_string(), Symbol { kind: SymbolKind::Var, value: None, offset: 0 });
		io.symbols.insert(WRITE_PORT.to_string(), Symbol { kind: SymbolKind::Var, value: None, offset: 1 });
		Self { frames: vec![io] }
	}

	/// Open a scope nested in the current one.
	pub fn enter(&mut self) { self.frames.push(Scope::default()); }

	/// Close the current scope. The I/O scope is never closed.
	pub fn exit(&mut self) -> Option<Scope> {
		if self.frames.len() > 1 { self.frames.pop() } else { None }
	}

	/// Number of scopes above the I/O scope.
	pub fn depth(&self) -> usize { self.frames.len() - 1 }

	pub fn current(&self) -> &Scope {
		// `frames` always holds at least the I/O scope.
		&self.frames[self.frames.len() - 1]
	}

	/// Declare `name` in the current scope at the next free slot.
	///
	/// A name already declared in this scope keeps its first slot, and that
	/// symbol is returned as `Err`.
	pub fn define(&mut self, name: &str, kind: SymbolKind, value: Option<i64>) -> Result<Symbol, Symbol> {
		let last = self.frames.len() - 1;
		let scope = &mut self.frames[last];
		if let Some(existing) = scope.symbols.get(name) {
			return Err(*existing);
		}
		let symbol = Symbol { kind, value, offset: scope.symbols.len() };
		scope.symbols.insert(name.to_string(), symbol);
		Ok(symbol)
	}

	/// Resolve `name` from the innermost scope outward.
	pub fn resolve(&self, name: &str) -> Option<Address> {
		self.frames
			.iter()
			.rev()
			.enumerate()
			.find_map(|(level, scope)| scope.get(name).map(|symbol| Address { level, symbol: *symbol }))
	}
}
