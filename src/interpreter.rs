//! Tree-walking evaluation.
//!
//! The parser hands over a top-level `Compound`; `run` executes it against a
//! fresh global closure and a context that captures everything `print`
//! writes. Per-node behavior lives in `exec`.

use crate::ast::Statement;
use crate::runtime::context::SimpleContext;
use crate::runtime::error::RuntimeResult;
use crate::runtime::object::Closure;

mod exec;

/// Executes a parsed program and returns the captured output.
pub fn run(program: &Statement) -> RuntimeResult<String> {
    let mut output = String::new();
    {
        let mut context = SimpleContext::new(&mut output);
        let mut globals = Closure::new();
        program.execute(&mut globals, &mut context)?;
    }
    Ok(output)
}
