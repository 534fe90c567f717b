// ABOUTME: D language core — lexer, parser, evaluator, and the embedding API

pub mod ast;
pub mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

use std::rc::Rc;

pub use ast::Program;
pub use env::Environment;
pub use error::{DError, ParseError, RuntimeError};
pub use value::Value;

/// Parses D source into a program (spec §6).
pub fn parse(source: &str) -> Result<Program, ParseError> {
    parser::parse(source)
}

/// Creates a fresh top-level environment with nothing bound in it — not
/// even the builtins a host typically registers (spec §6).
pub fn new_env() -> Rc<Environment> {
    Environment::new()
}

/// Executes `program` against `env`, returning the value of its last
/// statement (spec §6).
pub fn exec(env: &Rc<Environment>, program: &Program) -> Result<Value, RuntimeError> {
    eval::exec(env, program)
}

/// Convenience wrapper for hosts that don't care to distinguish parse
/// errors from runtime errors: parses and runs `source` against `env`.
pub fn run(env: &Rc<Environment>, source: &str) -> Result<Value, DError> {
    let program = parse(source)?;
    Ok(exec(env, &program)?)
}
