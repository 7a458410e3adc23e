use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};

use pygmy::fixtures::{CaseClass, load_cases};
use pygmy::lexer::Lexer;
use pygmy::{interpreter, parser};

fn normalize_output(output: &str) -> String {
    output.replace("\r\n", "\n").trim_end().to_string()
}

fn frontend(source: &str) -> Result<pygmy::ast::Statement> {
    let lexer = Lexer::new(source)?;
    parser::parse(lexer)
}

#[test]
fn runs_fixture_programs() -> Result<()> {
    let cases = load_cases(Path::new("tests/programs"))?;

    for case in cases {
        let source = fs::read_to_string(&case.program_path)
            .with_context(|| format!("Reading {}", case.name))?;
        match case.spec.class {
            CaseClass::RuntimeSuccess => {
                let stdout_file = case
                    .spec
                    .expected
                    .stdout_file
                    .as_deref()
                    .with_context(|| format!("Missing stdout_file in {}", case.name))?;
                let expected = case.read_text(stdout_file)?;
                let program =
                    frontend(&source).with_context(|| format!("Parsing {}", case.name))?;
                let output = interpreter::run(&program)
                    .with_context(|| format!("Running {}", case.name))?;
                assert_eq!(
                    normalize_output(&output),
                    normalize_output(&expected),
                    "Output mismatch for {}",
                    case.name
                );
            }
            CaseClass::FrontendError => {
                let expected_error = case
                    .spec
                    .expected
                    .error_contains
                    .as_deref()
                    .with_context(|| format!("Missing error_contains in {}", case.name))?;
                let result = frontend(&source);
                ensure!(
                    result.is_err(),
                    "Expected frontend error in {}, but parsing succeeded",
                    case.name
                );
                let actual = result
                    .expect_err("result checked as err")
                    .to_string();
                ensure!(
                    actual.contains(expected_error),
                    "Expected frontend error containing '{expected_error}' in {}, got '{actual}'",
                    case.name
                );
            }
            CaseClass::RuntimeError => {
                let expected_error = case
                    .spec
                    .expected
                    .error_contains
                    .as_deref()
                    .with_context(|| format!("Missing error_contains in {}", case.name))?;
                let program =
                    frontend(&source).with_context(|| format!("Parsing {}", case.name))?;
                let result = interpreter::run(&program);
                ensure!(
                    result.is_err(),
                    "Expected runtime error for {}",
                    case.name
                );
                let actual = result.expect_err("result checked as err").to_string();
                ensure!(
                    actual.contains(expected_error),
                    "Expected runtime error containing '{expected_error}' in {}, got '{actual}'",
                    case.name
                );
            }
        }
    }

    Ok(())
}
