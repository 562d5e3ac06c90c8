use std::{collections::VecDeque, fs, io, path::Path, process::ExitCode};

use anyhow::Context;
use palc::Parser;
use zpl0::{Pl0, Pl0Error, cli::*, vm::io::LineOutput};

fn main() -> ExitCode {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

	match dispatch(Cli::parse().mode) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			eprintln!("{e}");
			ExitCode::FAILURE
		}
	}
}

fn dispatch(mode: Mode) -> Result<(), Pl0Error> {
	let pl0 = Pl0;
	match mode {
		Mode::Run { path, input } => {
			let source = pl0.read_file(&path)?;
			pl0.run(&source, VecDeque::from(input), LineOutput::new(io::stdout().lock()))
		}
		Mode::Tokens { path } => {
			let tokens = pl0.tokens(&pl0.read_file(&path)?)?;
			let json = serde_json::to_string_pretty(&tokens).context("Failed serialize tokens")?;
			println!("{json}");
			Ok(())
		}
		Mode::Ast { path, output } => emit(&pl0.dot(&pl0.read_file(&path)?)?, output.as_deref()),
		Mode::Compile { path, output } => emit(&pl0.compile_to_json(&pl0.read_file(&path)?)?, output.as_deref()),
		Mode::Exec { path, input } => {
			let json = pl0.read_file(&path)?;
			pl0.execute_json(&json, VecDeque::from(input), LineOutput::new(io::stdout().lock()))
		}
		Mode::Listing { path } => {
			print!("{}", pl0.listing(&pl0.read_file(&path)?)?);
			Ok(())
		}
	}
}

fn emit(text: &str, output: Option<&Path>) -> Result<(), Pl0Error> {
	match output {
		Some(path) => fs::write(path, text).with_context(|| format!("Failed write {}", path.display()))?,
		None => println!("{}", text.trim_end()),
	}
	Ok(())
}
