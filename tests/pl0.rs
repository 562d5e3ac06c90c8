#[cfg(test)]
mod tests {
	use std::{collections::VecDeque, path::PathBuf};

	use zpl0::{GenerateErrorType, ParseErrorType, Pl0, Pl0Error, RuntimeErrorType, ScanErrorType, vm::io::LineOutput};

	fn source(name: &str) -> String {
		let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("programs").join(name);
		Pl0.read_file(&path).unwrap()
	}

	fn run(name: &str, input: &[i64]) -> Result<Vec<i64>, Pl0Error> {
		let mut output = Vec::new();
		Pl0.run(&source(name), VecDeque::from(input.to_vec()), &mut output)?;
		Ok(output)
	}

	#[test]
	fn squares_countdown() {
		assert_eq!(run("square.pl0", &[3]).unwrap(), vec![9, 4, 1]);
		assert_eq!(run("square.pl0", &[0]).unwrap(), Vec::<i64>::new());
	}

	#[test]
	fn gcd() {
		assert_eq!(run("gcd.pl0", &[12, 18]).unwrap(), vec![6]);
		assert_eq!(run("gcd.pl0", &[2000, 3000]).unwrap(), vec![1000]);
	}

	#[test]
	fn primes() {
		assert_eq!(run("primes.pl0", &[20]).unwrap(), vec![2, 3, 5, 7, 11, 13, 17, 19]);
	}

	#[test]
	fn nested_and_sibling_procedures() {
		assert_eq!(run("nested.pl0", &[]).unwrap(), vec![24]);
	}

	#[test]
	fn missing_input() {
		assert!(matches!(
			run("gcd.pl0", &[12]),
			Err(Pl0Error::RuntimeError(error)) if error.r#type == RuntimeErrorType::InputExhausted
		));
	}

	#[test]
	fn scan_error() {
		let error = run("bad_char.pl0", &[]).unwrap_err();
		assert!(matches!(
			&error,
			Pl0Error::ScanError(error) if error.index == 23 && error.r#type == ScanErrorType::UnexpectedCharacter('!')
		));
		assert!(error.to_string().starts_with("scan error"));
	}

	#[test]
	fn syntax_error() {
		let error = run("missing_semicolon.pl0", &[]).unwrap_err();
		let Pl0Error::ParseError(parse_error) = &error else { panic!("expected syntax error, got {error}") };
		assert_eq!(parse_error.r#type, ParseErrorType::Expected(zpl0::scanner::TokenKind::End));
		assert_eq!(parse_error.found.as_ref().map(|token| token.text.as_str()), Some("write"));
		assert!(error.to_string().starts_with("syntax error"));
	}

	#[test]
	fn generation_error() {
		let error = run("undeclared.pl0", &[]).unwrap_err();
		assert!(matches!(
			&error,
			Pl0Error::GenerateError(error)
				if error.name == "y" && error.index == 33 && error.r#type == GenerateErrorType::UndeclaredIdentifier
		));
		assert!(error.to_string().starts_with("generation error"));
	}

	#[test]
	fn artifact_round_trip() {
		let json = Pl0.compile_to_json(&source("square.pl0")).unwrap();
		let mut output = Vec::new();
		Pl0.execute_json(&json, VecDeque::from([2]), &mut output).unwrap();
		assert_eq!(output, vec![4, 1]);
	}

	#[test]
	fn malformed_artifacts_fault() {
		let deep = r#"[{"op":"INT","level":0,"offset":1},{"op":"LOD","level":18446744073709551615,"offset":0}]"#;
		assert!(matches!(
			Pl0.execute_json(deep, VecDeque::new(), Vec::new()),
			Err(Pl0Error::RuntimeError(error))
				if error.address == 1 && matches!(error.r#type, RuntimeErrorType::InvalidAddress { .. })
		));

		let huge = r#"[{"op":"INT","level":0,"offset":9223372036854775807}]"#;
		assert!(matches!(
			Pl0.execute_json(huge, VecDeque::new(), Vec::new()),
			Err(Pl0Error::RuntimeError(error)) if matches!(error.r#type, RuntimeErrorType::BlockTooLarge(_))
		));
	}

	#[test]
	fn listing_matches_compiled_code() {
		let source = source("square.pl0");
		let listing = Pl0.listing(&source).unwrap();
		let program = Pl0.compile(&source).unwrap();
		assert_eq!(listing.lines().count(), program.len());
		assert!(listing.lines().next().unwrap().ends_with("INT 0 3"));
		assert!(listing.lines().last().unwrap().ends_with("OPR 0 0"));
	}

	#[test]
	fn tokens_and_dot() {
		let source = source("gcd.pl0");
		let tokens = Pl0.tokens(&source).unwrap();
		assert_eq!(tokens.first().map(|token| token.text.as_str()), Some("const"));
		assert_eq!(tokens.last().map(|token| token.text.as_str()), Some("."));

		let dot = Pl0.dot(&source).unwrap();
		assert!(dot.starts_with("digraph ast {"));
		assert!(dot.contains("[label=\"Id limit\"]"));
	}

	#[test]
	fn line_output_writes_one_value_per_line() {
		let mut output = LineOutput::new(Vec::new());
		Pl0.run(&source("square.pl0"), VecDeque::from([2]), &mut output).unwrap();
		assert_eq!(output.into_inner(), b"4\n1\n");
	}

	#[test]
	fn missing_file() {
		assert!(matches!(Pl0.read_file("tests/programs/none.pl0"), Err(Pl0Error::InternalError(_))));
	}
}
