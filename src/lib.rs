// blocklang interpreter library
//
// Parses and runs `start … end` programs built from print, return, if/else,
// var and set statements. Each program runs against its own environment.

// Public modules
pub mod ast;
pub mod error;
pub mod evaluator;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod source;
pub mod value;

// Re-export commonly used items
pub use ast::{Condition, Program, StatementKind, Stmt, TypedValue};
pub use error::{BlockError, LoadError, ParseError, ParseErrorKind, RuntimeCondition, Span};
pub use evaluator::{Abort, Environment, Evaluator, Flow};
pub use interpreter::{Config, Interpreter, Outcome, RunSummary};
pub use lexer::{Cursor, Token, TokenKind};
pub use parser::Parser;
pub use source::{Header, SourceFile};
pub use value::{Value, ValueType};

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::run;
