use crate::error::Span;
use crate::lexer::Token;
use crate::value::Value;

/// One `start … end` block.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Print,
    Return,
    If,
    Var,
    Set,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Print {
        operand: Token,
        span: Span,
    },
    Return {
        operand: Token,
        span: Span,
    },
    If {
        condition: Condition,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
        span: Span,
    },
    Var {
        name: String,
        value: TypedValue,
        span: Span,
    },
    Set {
        name: String,
        value: TypedValue,
        span: Span,
    },
}

impl Stmt {
    pub fn kind(&self) -> StatementKind {
        match self {
            Stmt::Print { .. } => StatementKind::Print,
            Stmt::Return { .. } => StatementKind::Return,
            Stmt::If { .. } => StatementKind::If,
            Stmt::Var { .. } => StatementKind::Var,
            Stmt::Set { .. } => StatementKind::Set,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Literal(bool),
    /// Bare word naming a variable; must hold a boolean at run time.
    Variable(String),
}

/// Right-hand side of `var`/`set`, classified when parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    Boolean(bool),
    /// Digits as written; never used arithmetically.
    Integer(String),
    /// Copies the named variable if it exists at run time, otherwise the
    /// word itself as a string.
    Anything(String),
}

impl TypedValue {
    pub fn resolve(&self, lookup: impl Fn(&str) -> Option<Value>) -> Value {
        match self {
            TypedValue::Boolean(b) => Value::Boolean(*b),
            TypedValue::Integer(digits) => Value::Integer(digits.clone()),
            TypedValue::Anything(word) => lookup(word).unwrap_or_else(|| Value::String(word.clone())),
        }
    }
}
