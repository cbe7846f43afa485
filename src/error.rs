use crate::lexer::TokenKind;
use crate::value::ValueType;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::io;
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A required token was not found at the cursor.
    UnexpectedToken { expected: TokenKind },
    /// A `var`/`set` name collides with a keyword or literal.
    ReservedName { found: TokenKind },
    /// Neither a statement nor the block terminator starts here.
    UnrecognizedStatement { terminator: TokenKind },
}

/// Grammar violation in the source text. Fatal for the whole run.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub message: String,
    pub help: Option<String>,
    /// Unconsumed input at the point of failure.
    pub remaining: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, message: String, remaining: &str) -> Self {
        Self {
            kind,
            span,
            message,
            help: None,
            remaining: remaining.to_string(),
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn unexpected_token(span: Span, expected: TokenKind, remaining: &str) -> Self {
        let message = match first_word(remaining) {
            Some(found) => format!(
                "Expected {} (pattern `{}`), found '{}'",
                expected.describe(),
                expected.pattern(),
                found
            ),
            None => format!(
                "Expected {} (pattern `{}`), found end of input",
                expected.describe(),
                expected.pattern()
            ),
        };
        Self::new(
            ParseErrorKind::UnexpectedToken { expected },
            span,
            message,
            remaining,
        )
    }

    pub fn reserved_name(span: Span, found: TokenKind, lexeme: &str, remaining: &str) -> Self {
        Self::new(
            ParseErrorKind::ReservedName { found },
            span,
            format!(
                "'{}' matches {} and cannot be used as a variable name",
                lexeme,
                found.describe()
            ),
            remaining,
        )
        .with_help("Variable names must not be keywords, booleans or integers.")
    }

    pub fn unrecognized_statement(span: Span, terminator: TokenKind, remaining: &str) -> Self {
        let message = match first_word(remaining) {
            Some(found) => format!(
                "Expected a statement or {}, found '{}'",
                terminator.describe(),
                found
            ),
            None => format!(
                "Expected a statement or {}, found end of input",
                terminator.describe()
            ),
        };
        Self::new(
            ParseErrorKind::UnrecognizedStatement { terminator },
            span,
            message,
            remaining,
        )
        .with_help("Statements start with 'print', 'return', 'if', 'var' or 'set'.")
    }

    /// True when the parser ran out of input rather than meeting a bad token.
    pub fn is_at_end_of_input(&self) -> bool {
        self.remaining.trim().is_empty()
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<repl>");
        let color = Color::Yellow;
        let range = label_range(self.span, source);
        let start = range.start;

        let mut report_builder = Report::build(ReportKind::Error, filename, start)
            .with_message(format!("{}: {}", "Parse Error".fg(color), self.message))
            .with_label(
                Label::new((filename, range))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        if let Err(error) = report_builder
            .finish()
            .eprint((filename, Source::from(source)))
        {
            tracing::warn!(%error, "failed to render parse error");
        }
    }
}

fn first_word(input: &str) -> Option<&str> {
    input.split_whitespace().next()
}

/// Clamps `span` into `source`, widening an empty span at end of input to
/// cover the last byte.
fn label_range(span: Span, source: &str) -> Range<usize> {
    let start = span.start.min(source.len().saturating_sub(1));
    let end = span.end.max(start + 1).min(source.len());
    start..end
}

/// Condition raised while executing a program. Aborts that program only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeCondition {
    #[error("duplicate var declaration '{name}'")]
    DuplicateDeclaration { name: String },
    #[error("variable '{name}' not found")]
    UndeclaredVariable { name: String },
    #[error("condition '{name}' is not of type boolean (found {})", found_name(.found))]
    TypeMismatch {
        name: String,
        found: Option<ValueType>,
    },
}

fn found_name(found: &Option<ValueType>) -> &'static str {
    found.map_or("undeclared variable", ValueType::name)
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("expected a program count on the first line, found '{line}'")]
    InvalidHeader { line: String },
}

#[derive(Debug, Error)]
pub enum BlockError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("failed to write program output: {0}")]
    Output(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn label_range_keeps_spans_inside_the_source() {
        assert_eq!(label_range(Span::new(2, 6), "  stop here"), 2..6);
    }

    #[test]
    fn label_range_widens_empty_span_at_end_of_input() {
        let source = "start print a";
        let span = Span::new(source.len(), source.len());
        assert_eq!(label_range(span, source), 12..13);
    }

    #[test]
    fn label_range_on_empty_source() {
        assert_eq!(label_range(Span::new(0, 0), ""), 0..0);
    }
}
