use crate::ast::{Condition, Program, StatementKind, Stmt, TypedValue};
use crate::error::{ParseError, Span};
use crate::lexer::{Cursor, Token, TokenKind, RESERVED_KINDS};

/// A parser for one statement kind, selected by its leading keyword.
pub trait StatementParser {
    fn kind(&self) -> StatementKind;

    fn can_start(&self, cursor: &Cursor) -> bool;

    fn parse(&self, cursor: &mut Cursor) -> Result<Stmt, ParseError>;
}

pub struct PrintParser;
pub struct ReturnParser;
pub struct IfParser;
pub struct VarParser;
pub struct SetParser;

/// Dispatch order: first parser whose keyword matches wins.
pub const STATEMENT_PARSERS: [&dyn StatementParser; 5] =
    [&PrintParser, &ReturnParser, &IfParser, &VarParser, &SetParser];

const OPERAND_KINDS: [TokenKind; 3] = [TokenKind::Boolean, TokenKind::Integer, TokenKind::Anything];

impl StatementParser for PrintParser {
    fn kind(&self) -> StatementKind {
        StatementKind::Print
    }

    fn can_start(&self, cursor: &Cursor) -> bool {
        cursor.peek(TokenKind::Print)
    }

    fn parse(&self, cursor: &mut Cursor) -> Result<Stmt, ParseError> {
        let keyword = cursor.require_consume(TokenKind::Print)?;
        let operand = operand(cursor)?;
        let span = keyword.span.to(operand.span);
        Ok(Stmt::Print { operand, span })
    }
}

impl StatementParser for ReturnParser {
    fn kind(&self) -> StatementKind {
        StatementKind::Return
    }

    fn can_start(&self, cursor: &Cursor) -> bool {
        cursor.peek(TokenKind::Return)
    }

    fn parse(&self, cursor: &mut Cursor) -> Result<Stmt, ParseError> {
        let keyword = cursor.require_consume(TokenKind::Return)?;
        let operand = operand(cursor)?;
        let span = keyword.span.to(operand.span);
        Ok(Stmt::Return { operand, span })
    }
}

impl StatementParser for IfParser {
    fn kind(&self) -> StatementKind {
        StatementKind::If
    }

    fn can_start(&self, cursor: &Cursor) -> bool {
        cursor.peek(TokenKind::If)
    }

    fn parse(&self, cursor: &mut Cursor) -> Result<Stmt, ParseError> {
        let keyword = cursor.require_consume(TokenKind::If)?;

        let condition = match cursor.try_consume(TokenKind::Boolean) {
            Some(token) => Condition::Literal(token.lexeme == "true"),
            None => Condition::Variable(cursor.require_consume(TokenKind::Anything)?.lexeme),
        };

        let then_branch = parse_block(cursor, TokenKind::End)?;
        cursor.require_consume(TokenKind::Else).map_err(|error| {
            error.with_help("An if statement needs both branches: if <condition> … end else … end")
        })?;
        let else_branch = parse_block(cursor, TokenKind::End)?;

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            span: Span::new(keyword.span.start, cursor.position()),
        })
    }
}

impl StatementParser for VarParser {
    fn kind(&self) -> StatementKind {
        StatementKind::Var
    }

    fn can_start(&self, cursor: &Cursor) -> bool {
        cursor.peek(TokenKind::Var)
    }

    fn parse(&self, cursor: &mut Cursor) -> Result<Stmt, ParseError> {
        let keyword = cursor.require_consume(TokenKind::Var)?;
        let name = variable_name(cursor)?;
        let value = typed_value(cursor)?;
        Ok(Stmt::Var {
            name,
            value,
            span: Span::new(keyword.span.start, cursor.position()),
        })
    }
}

impl StatementParser for SetParser {
    fn kind(&self) -> StatementKind {
        StatementKind::Set
    }

    fn can_start(&self, cursor: &Cursor) -> bool {
        cursor.peek(TokenKind::Set)
    }

    fn parse(&self, cursor: &mut Cursor) -> Result<Stmt, ParseError> {
        let keyword = cursor.require_consume(TokenKind::Set)?;
        let name = variable_name(cursor)?;
        let value = typed_value(cursor)?;
        Ok(Stmt::Set {
            name,
            value,
            span: Span::new(keyword.span.start, cursor.position()),
        })
    }
}

fn operand(cursor: &mut Cursor) -> Result<Token, ParseError> {
    match cursor.try_consume_any(&OPERAND_KINDS) {
        Some(token) => Ok(token),
        None => cursor.require_consume(TokenKind::Anything),
    }
}

fn variable_name(cursor: &mut Cursor) -> Result<String, ParseError> {
    for kind in RESERVED_KINDS {
        if let Some(token) = cursor.try_consume(kind) {
            return Err(ParseError::reserved_name(
                token.span,
                kind,
                &token.lexeme,
                cursor.remaining(),
            ));
        }
    }
    Ok(cursor.require_consume(TokenKind::Anything)?.lexeme)
}

fn typed_value(cursor: &mut Cursor) -> Result<TypedValue, ParseError> {
    if let Some(token) = cursor.try_consume(TokenKind::Boolean) {
        return Ok(TypedValue::Boolean(token.lexeme == "true"));
    }
    if let Some(token) = cursor.try_consume(TokenKind::Integer) {
        return Ok(TypedValue::Integer(token.lexeme));
    }
    Ok(TypedValue::Anything(
        cursor.require_consume(TokenKind::Anything)?.lexeme,
    ))
}

/// Parses the statement at the cursor with the first parser that accepts it.
pub fn parse_statement(cursor: &mut Cursor) -> Option<Result<Stmt, ParseError>> {
    let parser = STATEMENT_PARSERS
        .iter()
        .find(|parser| parser.can_start(cursor))?;
    tracing::trace!(kind = ?parser.kind(), position = cursor.position(), "parsing statement");
    Some(parser.parse(cursor))
}

/// Parses statements until `terminator` is consumed.
pub fn parse_block(cursor: &mut Cursor, terminator: TokenKind) -> Result<Vec<Stmt>, ParseError> {
    let mut statements = Vec::new();

    loop {
        if cursor.peek(terminator) {
            cursor.require_consume(terminator)?;
            return Ok(statements);
        }

        match parse_statement(cursor) {
            Some(statement) => statements.push(statement?),
            None => {
                return Err(ParseError::unrecognized_statement(
                    cursor.next_span(),
                    terminator,
                    cursor.remaining(),
                ))
            }
        }
    }
}

#[tracing::instrument(level = "debug", skip_all, fields(position = cursor.position()))]
pub fn parse_program(cursor: &mut Cursor) -> Result<Program, ParseError> {
    let start = cursor.require_consume(TokenKind::Start)?;
    let statements = parse_block(cursor, TokenKind::End)?;
    tracing::debug!(statements = statements.len(), "parsed program");
    Ok(Program {
        statements,
        span: Span::new(start.span.start, cursor.position()),
    })
}

/// Parses the `start … end` programs of one source text.
pub struct Parser<'src> {
    cursor: Cursor<'src>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Another program follows.
    pub fn has_program(&self) -> bool {
        self.cursor.peek(TokenKind::Start)
    }

    pub fn next_program(&mut self) -> Result<Program, ParseError> {
        parse_program(&mut self.cursor)
    }

    /// Parses every program up front.
    pub fn parse(&mut self) -> Result<Vec<Program>, ParseError> {
        let mut programs = Vec::new();
        while self.has_program() {
            programs.push(self.next_program()?);
        }
        if !self.cursor.is_exhausted() {
            return Err(ParseError::unexpected_token(
                self.cursor.next_span(),
                TokenKind::Start,
                self.cursor.remaining(),
            ));
        }
        Ok(programs)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_exhausted()
    }

    pub fn next_span(&self) -> Span {
        self.cursor.next_span()
    }
}
