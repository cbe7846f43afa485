use crate::ast::Program;
use crate::error::{BlockError, RuntimeCondition};
use crate::evaluator::{Abort, Environment, Evaluator, Flow};
use crate::parser::Parser;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    /// Trace every statement and put each printed value on its own line.
    pub verbose: bool,
}

/// How one program run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed,
    Returned,
    Aborted(RuntimeCondition),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub outcomes: Vec<Outcome>,
}

impl RunSummary {
    pub fn programs(&self) -> usize {
        self.outcomes.len()
    }

    pub fn aborted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, Outcome::Aborted(_)))
            .count()
    }
}

/// Runs every `start … end` program of a source text, each against its own
/// environment.
pub struct Interpreter<W: Write> {
    config: Config,
    out: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(config: Config, out: W) -> Self {
        Self { config, out }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Parses and runs programs one after another. A parse error stops the
    /// run; programs before it have already produced their output.
    #[tracing::instrument(level = "debug", skip_all, fields(verbose = self.config.verbose))]
    pub fn run_source(&mut self, source: &str) -> Result<RunSummary, BlockError> {
        let mut parser = Parser::new(source);
        let mut summary = RunSummary::default();

        while parser.has_program() {
            let program = match parser.next_program() {
                Ok(program) => program,
                Err(error) => {
                    self.out.flush()?;
                    return Err(error.into());
                }
            };
            let outcome = self.run_program(&program, summary.programs() + 1)?;
            summary.outcomes.push(outcome);
        }

        if !parser.is_exhausted() {
            tracing::warn!(
                offset = parser.next_span().start,
                "ignoring input after the last program"
            );
        }

        self.out.flush()?;
        Ok(summary)
    }

    /// Runs already parsed programs.
    pub fn run_programs(&mut self, programs: &[Program]) -> Result<RunSummary, BlockError> {
        let mut summary = RunSummary::default();
        for (index, program) in programs.iter().enumerate() {
            summary.outcomes.push(self.run_program(program, index + 1)?);
        }
        self.out.flush()?;
        Ok(summary)
    }

    fn run_program(&mut self, program: &Program, number: usize) -> Result<Outcome, BlockError> {
        if self.config.verbose {
            writeln!(self.out, "-- program {} --", number)?;
        }

        let mut env = Environment::new();
        let flow = Evaluator::new(&mut self.out, self.config.verbose)
            .run(&program.statements, &mut env)?;

        if !self.config.verbose {
            writeln!(self.out)?;
        }

        let outcome = match flow {
            Flow::Continue => Outcome::Completed,
            Flow::Abort(Abort::Return(value)) => {
                tracing::debug!(program = number, value = %value.lexeme, "program returned");
                Outcome::Returned
            }
            Flow::Abort(Abort::Condition(condition)) => {
                tracing::debug!(program = number, %condition, "program aborted");
                Outcome::Aborted(condition)
            }
        };
        tracing::trace!(program = number, variables = env.len(), "program finished");
        Ok(outcome)
    }
}
