use std::path::PathBuf;

use palc::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "zpl0", after_long_help = "A PL/0 compiler and stack machine. Set RUST_LOG for diagnostics.")]
pub struct Cli {
	#[command(subcommand)]
	pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
	/// Compile and execute a source file
	Run {
		path:  PathBuf,
		/// Value for the next `read`, may be repeated
		#[arg(short, long)]
		input: Vec<i64>,
	},
	/// Print the token sequence as JSON
	Tokens { path: PathBuf },
	/// Print the syntax tree as a Graphviz digraph
	Ast {
		path:   PathBuf,
		/// Write to a file instead of stdout
		#[arg(short, long)]
		output: Option<PathBuf>,
	},
	/// Write the bytecode artifact as JSON
	Compile {
		path:   PathBuf,
		/// Write to a file instead of stdout
		#[arg(short, long)]
		output: Option<PathBuf>,
	},
	/// Execute a bytecode artifact
	Exec {
		path:  PathBuf,
		/// Value for the next `read`, may be repeated
		#[arg(short, long)]
		input: Vec<i64>,
	},
	/// Print a numbered instruction listing
	Listing { path: PathBuf },
}
