//! Token and keyword definitions.
//!
//! Tokens are classified lexemes borrowing directly from the input query
//! text. String literals are the one exception to pure zero-copy: escape
//! sequences decode at lex time, so the token holds a [`Cow`] that only
//! allocates when an escape was present. Each token travels with its source
//! position inside a [`TokenInfo`] record; tokens are immutable once the
//! lexer produced them.

use std::borrow::Cow;

/// Byte range of a lexeme within the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Reserved CPQL keywords, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Select,
    Distinct,
    From,
    Where,
    Group,
    By,
    Having,
    Order,
    Asc,
    Desc,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    On,
    As,
    And,
    Or,
    Not,
    In,
    Like,
    Is,
    Null,
    True,
    False,
    Update,
    Set,
    Delete,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Select => "SELECT",
            Keyword::Distinct => "DISTINCT",
            Keyword::From => "FROM",
            Keyword::Where => "WHERE",
            Keyword::Group => "GROUP",
            Keyword::By => "BY",
            Keyword::Having => "HAVING",
            Keyword::Order => "ORDER",
            Keyword::Asc => "ASC",
            Keyword::Desc => "DESC",
            Keyword::Join => "JOIN",
            Keyword::Inner => "INNER",
            Keyword::Left => "LEFT",
            Keyword::Right => "RIGHT",
            Keyword::Full => "FULL",
            Keyword::Outer => "OUTER",
            Keyword::On => "ON",
            Keyword::As => "AS",
            Keyword::And => "AND",
            Keyword::Or => "OR",
            Keyword::Not => "NOT",
            Keyword::In => "IN",
            Keyword::Like => "LIKE",
            Keyword::Is => "IS",
            Keyword::Null => "NULL",
            Keyword::True => "TRUE",
            Keyword::False => "FALSE",
            Keyword::Update => "UPDATE",
            Keyword::Set => "SET",
            Keyword::Delete => "DELETE",
        }
    }
}

/// A classified lexeme. Identifier and numeric tokens borrow from the input;
/// numeric lexemes keep their raw text and are converted to values by the
/// parser with locale-independent rules.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Keyword(Keyword),
    Ident(&'a str),
    String(Cow<'a, str>),
    Integer(&'a str),
    Float(&'a str),
    /// Named parameter: `:name` in source text, stored without the sigil.
    Parameter(&'a str),
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
    Dot,
    Eof,
}

impl<'a> Token<'a> {
    /// Short human-readable description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Keyword(k) => format!("keyword {}", k.as_str()),
            Token::Ident(s) => format!("identifier '{s}'"),
            Token::String(_) => "string literal".to_string(),
            Token::Integer(s) | Token::Float(s) => format!("number '{s}'"),
            Token::Parameter(s) => format!("parameter ':{s}'"),
            Token::Eq => "'='".to_string(),
            Token::NotEq => "'<>'".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::LtEq => "'<='".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::GtEq => "'>='".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Percent => "'%'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

/// A token plus its source position, as produced by the eager tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo<'a> {
    pub token: Token<'a>,
    pub span: Span,
    pub line: u32,
    pub column: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_end() {
        let span = Span::new(7, 5);
        assert_eq!(span.end(), 12);
    }

    #[test]
    fn keyword_as_str_round_trip() {
        assert_eq!(Keyword::Select.as_str(), "SELECT");
        assert_eq!(Keyword::Order.as_str(), "ORDER");
        assert_eq!(Keyword::Delete.as_str(), "DELETE");
    }

    #[test]
    fn describe_covers_operators() {
        assert_eq!(Token::NotEq.describe(), "'<>'");
        assert_eq!(Token::Eof.describe(), "end of input");
        assert_eq!(Token::Parameter("uid").describe(), "parameter ':uid'");
    }

    #[test]
    fn string_token_borrows_when_unescaped() {
        let tok = Token::String(Cow::Borrowed("hello"));
        assert!(matches!(tok, Token::String(Cow::Borrowed("hello"))));
    }
}
