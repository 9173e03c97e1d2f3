//! Error types for the scan/parse ("compile the script once at startup")
//! pipeline. Evaluation-time failures do not appear here — per the spec's
//! error taxonomy they are non-fatal and are reported through `tracing`
//! instead of `Result`.

use thiserror::Error;

/// Failures that can occur while turning source text into a token stream.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScanError {
    #[error("line {line}, column {column}: unterminated string literal")]
    UnterminatedString { line: u32, column: u32 },
}

/// Failures that can occur while turning a token stream into a syntax tree,
/// or while scanning tokens for it. This is the error type returned by
/// `Script::parse`, the single fallible entry point used at startup.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScriptError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: u32,
        expected: String,
        found: String,
    },

    #[error("line {line}: expected a route path string")]
    MissingRoutePath { line: u32 },

    #[error("line {line}: malformed number literal {lexeme:?}")]
    MalformedNumber { line: u32, lexeme: String },
}
