//! WebBubble: a tiny server-side web DSL.
//!
//! A script declares named HTTP routes whose bodies are small imperative
//! statements — assignments, expressions, and a `response` statement. The
//! runtime parses a script once at startup (see [`Script::parse`]) and then
//! serves requests by matching the request path against each declared
//! route in turn and executing its body in a fresh, request-scoped
//! environment.

pub mod ast;
pub mod dispatcher;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod parser;
pub mod response;
pub mod router;
pub mod scanner;
pub mod value;

use ast::Program;
use error::ScriptError;
use parser::Parser;

/// A parsed, ready-to-serve program.
pub struct Script {
    pub program: Program,
}

impl Script {
    /// Scans and parses `source` in full, or returns the first error
    /// encountered. This is the only fallible entry point in the crate;
    /// everything downstream of a successful parse (routing, evaluation) is
    /// infallible by design.
    pub fn parse(source: &str) -> Result<Script, ScriptError> {
        let program = Parser::new(source)?.parse_program()?;
        Ok(Script { program })
    }
}
