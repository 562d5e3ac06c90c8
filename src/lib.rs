//! # From PL/0 text to a running stack machine
//!
//! User's source code: `var x; begin read(x); write(x + 1) end .`

//! ## Scanning
//!
//! A small state machine reads the characters one at a time and groups them
//! into tokens. Keywords, identifiers of at most ten letters, unsigned
//! integers and the punctuation `+ - * / ( ) = # < <= > >= := ; , . [ ]` are
//! tokens; spaces and line breaks separate them and are dropped.
//!
//! `["var", "x", ";", "begin", "read", "(", "x", ")", ";", ...]`

//! ## Parsing
//!
//! A recursive-descent parser builds the syntax tree. Every statement form is
//! recognised by its first token except assignment, which is an identifier
//! followed by `:=`, so the parser looks two tokens ahead there.
//!
//! ``` markdown
//! Program
//! └── Subprogram
//!     ├── VarDecls [x]
//!     └── begin
//!         ├── read x
//!         └── write
//!             └── + (Expr)
//!                 ├── x (Id)
//!                 └── 1 (Num)
//! ```

//! ## Code generation
//!
//! The generator walks the tree with a stack of scopes. Each declaration gets
//! the next slot of the innermost scope and each use of a name turns into a
//! `(level, offset)` pair: how many scopes up the name lives, and its slot
//! there. Instruction addresses that are not known yet (block sizes, jump
//! targets, procedure entries) are emitted as placeholders and patched once
//! the code they point at exists.
//!
//! The outermost scope is not user visible: its two slots are the I/O ports,
//! so `read(x)` loads from it and `write(e)` stores into it.

//! ## Execution
//!
//! The virtual machine runs the instruction list against an operand stack and
//! a stack of memory blocks. `INT n` opens a block of `n` slots, `OPR 0`
//! closes it and returns to the address the matching `CAL` left on the
//! operand stack, or halts when there is none.

pub mod bytecode;
pub mod cli;
mod compiler;
pub mod environment;
mod error;
pub mod generator;
pub mod parser;
pub mod scanner;
pub mod vm;

pub use compiler::Pl0;
pub use error::{Pl0Error, generator::{GenerateError, GenerateErrorType, GeneratorError}, parser::{ParseError, ParseErrorType}, scanner::{ScanError, ScanErrorType}, vm::{RuntimeError, RuntimeErrorType, VmError}};
