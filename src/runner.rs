use crate::error::BlockError;
use crate::interpreter::{Config, Interpreter, RunSummary};
use std::io;

/// Runs a whole source text to stdout. Parse errors are rendered against
/// `source`; returns the summary when every program was at least parsed.
pub fn run(source: &str, filename: Option<&str>, config: Config) -> Option<RunSummary> {
    let stdout = io::stdout();
    let mut interpreter = Interpreter::new(config, stdout.lock());

    match interpreter.run_source(source) {
        Ok(summary) => Some(summary),
        Err(BlockError::Parse(error)) => {
            error.report(source, filename);
            None
        }
        Err(error) => {
            eprintln!("Error: {}", error);
            None
        }
    }
}
