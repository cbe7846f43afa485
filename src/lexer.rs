use crate::error::{ParseError, Span};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Start,
    End,
    Print,
    Return,
    If,
    Else,
    Var,
    Set,

    // Literals
    Boolean,
    Integer,

    // Catch-all: any run of non-whitespace
    Anything,
}

/// Kinds a variable name must not match, in probe order.
pub const RESERVED_KINDS: [TokenKind; 10] = [
    TokenKind::Start,
    TokenKind::End,
    TokenKind::Print,
    TokenKind::Return,
    TokenKind::If,
    TokenKind::Else,
    TokenKind::Var,
    TokenKind::Set,
    TokenKind::Boolean,
    TokenKind::Integer,
];

impl TokenKind {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            TokenKind::Start => Some("start"),
            TokenKind::End => Some("end"),
            TokenKind::Print => Some("print"),
            TokenKind::Return => Some("return"),
            TokenKind::If => Some("if"),
            TokenKind::Else => Some("else"),
            TokenKind::Var => Some("var"),
            TokenKind::Set => Some("set"),
            TokenKind::Boolean | TokenKind::Integer | TokenKind::Anything => None,
        }
    }

    /// Pattern text shown in parse errors.
    pub fn pattern(self) -> &'static str {
        match self {
            TokenKind::Start => r"start\b",
            TokenKind::End => r"end\b",
            TokenKind::Print => r"print\b",
            TokenKind::Return => r"return\b",
            TokenKind::If => r"if\b",
            TokenKind::Else => r"else\b",
            TokenKind::Var => r"var\b",
            TokenKind::Set => r"set\b",
            TokenKind::Boolean => r"(true\b)|(false\b)",
            TokenKind::Integer => r"[1-9][0-9]*",
            TokenKind::Anything => r"[^\s]+",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Start => "'start'",
            TokenKind::End => "'end'",
            TokenKind::Print => "'print'",
            TokenKind::Return => "'return'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::Var => "'var'",
            TokenKind::Set => "'set'",
            TokenKind::Boolean => "boolean literal",
            TokenKind::Integer => "integer literal",
            TokenKind::Anything => "word",
        }
    }

    /// Length in bytes of the non-empty prefix of `input` this kind matches.
    pub fn match_len(self, input: &str) -> Option<usize> {
        let len = match self {
            TokenKind::Boolean => ["true", "false"]
                .into_iter()
                .find_map(|word| match_word(input, word))?,
            TokenKind::Integer => {
                let mut chars = input.char_indices();
                match chars.next() {
                    Some((_, '1'..='9')) => {}
                    _ => return None,
                }
                chars
                    .find(|(_, c)| !c.is_ascii_digit())
                    .map_or(input.len(), |(i, _)| i)
            }
            TokenKind::Anything => input
                .char_indices()
                .find(|(_, c)| c.is_whitespace())
                .map_or(input.len(), |(i, _)| i),
            keyword => match_word(input, keyword.keyword()?)?,
        };

        (len > 0).then_some(len)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `word` followed by a word boundary.
fn match_word(input: &str, word: &str) -> Option<usize> {
    let rest = input.strip_prefix(word)?;
    match rest.chars().next() {
        Some(c) if is_word_char(c) => None,
        _ => Some(word.len()),
    }
}

fn whitespace_len(input: &str) -> usize {
    input
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(input.len(), |(i, _)| i)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whitespace {
    Skip,
    Keep,
}

/// Anchored match of `kind` against `input`. Returns the whitespace length
/// skipped and the token length.
pub fn scan(input: &str, kind: TokenKind, whitespace: Whitespace) -> Option<(usize, usize)> {
    let skipped = match whitespace {
        Whitespace::Skip => whitespace_len(input),
        Whitespace::Keep => 0,
    };
    let len = kind.match_len(&input[skipped..])?;
    Some((skipped, len))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

/// Parse position over the source text.
#[derive(Debug, Clone)]
pub struct Cursor<'src> {
    source: &'src str,
    pos: usize,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { source, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> &'src str {
        &self.source[self.pos..]
    }

    /// Only whitespace is left.
    pub fn is_exhausted(&self) -> bool {
        self.remaining().trim_start().is_empty()
    }

    pub fn peek(&self, kind: TokenKind) -> bool {
        scan(self.remaining(), kind, Whitespace::Skip).is_some()
    }

    pub fn try_consume(&mut self, kind: TokenKind) -> Option<Token> {
        self.scan(kind, Whitespace::Skip)
    }

    pub fn require_consume(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        self.try_consume(kind).ok_or_else(|| self.expected(kind))
    }

    /// Consumes the first kind in `kinds` that matches.
    pub fn try_consume_any(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        kinds.iter().find_map(|&kind| self.try_consume(kind))
    }

    pub fn scan(&mut self, kind: TokenKind, whitespace: Whitespace) -> Option<Token> {
        let (skipped, len) = scan(self.remaining(), kind, whitespace)?;
        let start = self.pos + skipped;
        let end = start + len;
        self.pos = end;
        Some(Token::new(
            kind,
            self.source[start..end].to_string(),
            Span::new(start, end),
        ))
    }

    /// Span of the next non-whitespace word, or of the end of input.
    pub fn next_span(&self) -> Span {
        let start = self.pos + whitespace_len(self.remaining());
        let len = TokenKind::Anything
            .match_len(&self.source[start..])
            .unwrap_or(0);
        Span::new(start, start + len)
    }

    fn expected(&self, kind: TokenKind) -> ParseError {
        ParseError::unexpected_token(self.next_span(), kind, self.remaining())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keywords_need_a_word_boundary() {
        assert_eq!(TokenKind::Print.match_len("print x"), Some(5));
        assert_eq!(TokenKind::Print.match_len("print"), Some(5));
        assert_eq!(TokenKind::Print.match_len("printer"), None);
        assert_eq!(TokenKind::End.match_len("end!"), Some(3));
        assert_eq!(TokenKind::Set.match_len("set_x"), None);
    }

    #[test]
    fn integer_pattern_rejects_leading_zero() {
        assert_eq!(TokenKind::Integer.match_len("42 rest"), Some(2));
        assert_eq!(TokenKind::Integer.match_len("12abc"), Some(2));
        assert_eq!(TokenKind::Integer.match_len("0"), None);
        assert_eq!(TokenKind::Integer.match_len("07"), None);
        assert_eq!(TokenKind::Anything.match_len("0"), Some(1));
    }

    #[test]
    fn booleans_match_whole_words_only() {
        assert_eq!(TokenKind::Boolean.match_len("true"), Some(4));
        assert_eq!(TokenKind::Boolean.match_len("false end"), Some(5));
        assert_eq!(TokenKind::Boolean.match_len("trueish"), None);
    }

    #[test]
    fn anything_stops_at_whitespace() {
        assert_eq!(TokenKind::Anything.match_len("héllo\tworld"), Some(6));
        assert_eq!(TokenKind::Anything.match_len(""), None);
        assert_eq!(TokenKind::Anything.match_len(" x"), None);
    }

    #[test]
    fn scan_can_keep_whitespace() {
        assert_eq!(scan("  var", TokenKind::Var, Whitespace::Skip), Some((2, 3)));
        assert_eq!(scan("  var", TokenKind::Var, Whitespace::Keep), None);
    }

    #[test]
    fn cursor_consumes_tokens_in_order() {
        let mut cursor = Cursor::new("  start\n print hello end");
        assert!(cursor.peek(TokenKind::Start));
        assert_eq!(cursor.position(), 0);

        let start = cursor.require_consume(TokenKind::Start).unwrap();
        assert_eq!(start.lexeme, "start");
        assert_eq!(start.span, Span::new(2, 7));

        assert!(cursor.try_consume(TokenKind::End).is_none());
        assert_eq!(cursor.position(), 7);

        cursor.require_consume(TokenKind::Print).unwrap();
        let word = cursor
            .try_consume_any(&[TokenKind::Boolean, TokenKind::Integer, TokenKind::Anything])
            .unwrap();
        assert_eq!(word.kind, TokenKind::Anything);
        assert_eq!(word.lexeme, "hello");

        cursor.require_consume(TokenKind::End).unwrap();
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn require_consume_reports_remaining_input() {
        let mut cursor = Cursor::new("  stop here");
        let error = cursor.require_consume(TokenKind::Start).unwrap_err();
        assert_eq!(
            error.kind,
            crate::error::ParseErrorKind::UnexpectedToken {
                expected: TokenKind::Start
            }
        );
        assert_eq!(error.remaining, "  stop here");
        assert_eq!(error.span, Span::new(2, 6));
        assert!(error.message.contains("found 'stop'"));
        assert!(!error.is_at_end_of_input());
    }

    #[test]
    fn require_consume_at_end_of_input() {
        let mut cursor = Cursor::new("   ");
        let error = cursor.require_consume(TokenKind::End).unwrap_err();
        assert!(error.is_at_end_of_input());
        assert!(error.message.contains("end of input"));
    }
}
