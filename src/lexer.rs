//! CPQL lexer.
//!
//! A single-pass, byte-at-a-time tokenizer. All identifier and numeric
//! tokens are borrowed slices pointing directly into the input string;
//! string literals decode their escape sequences at scan time and only
//! allocate when an escape was present.
//!
//! The lexer recognizes:
//!
//! - **Keywords**: reserved CPQL words (SELECT, FROM, WHERE, ...), matched
//!   case-insensitively through a compile-time perfect hash map
//! - **Identifiers**: entity, property, and alias names
//! - **Literals**: strings ('it''s', 'a\nb'), integers (42), floats
//!   (3.14, .5, 1e10) with a fixed `.` decimal separator regardless of the
//!   host locale
//! - **Parameters**: `:name`
//! - **Operators**: =, <>, !=, <, <=, >, >=, +, -, *, /, %
//! - **Punctuation**: parentheses, comma, dot
//! - **Comments**: `-- ...` to end of line, `/* ... */` non-nesting; both
//!   are skipped without emitting tokens
//!
//! [`tokenize`] drives the scanner eagerly and returns the complete token
//! list, terminated by an explicit [`Token::Eof`] entry, so the parser has
//! unlimited lookahead over an immutable slice. Any unrecognized character
//! or malformed literal aborts tokenization with [`Error::Lexical`].

use crate::error::{Error, Result};
use crate::token::{Keyword, Span, Token, TokenInfo};
use phf::phf_map;
use std::borrow::Cow;

static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "SELECT" => Keyword::Select,
    "DISTINCT" => Keyword::Distinct,
    "FROM" => Keyword::From,
    "WHERE" => Keyword::Where,
    "GROUP" => Keyword::Group,
    "BY" => Keyword::By,
    "HAVING" => Keyword::Having,
    "ORDER" => Keyword::Order,
    "ASC" => Keyword::Asc,
    "DESC" => Keyword::Desc,
    "JOIN" => Keyword::Join,
    "INNER" => Keyword::Inner,
    "LEFT" => Keyword::Left,
    "RIGHT" => Keyword::Right,
    "FULL" => Keyword::Full,
    "OUTER" => Keyword::Outer,
    "ON" => Keyword::On,
    "AS" => Keyword::As,
    "AND" => Keyword::And,
    "OR" => Keyword::Or,
    "NOT" => Keyword::Not,
    "IN" => Keyword::In,
    "LIKE" => Keyword::Like,
    "IS" => Keyword::Is,
    "NULL" => Keyword::Null,
    "TRUE" => Keyword::True,
    "FALSE" => Keyword::False,
    "UPDATE" => Keyword::Update,
    "SET" => Keyword::Set,
    "DELETE" => Keyword::Delete,
};

/// Tokenizes the whole input eagerly. The returned list always ends with a
/// single [`Token::Eof`] entry; input consisting only of whitespace and
/// comments therefore yields exactly one token.
pub fn tokenize(input: &str) -> Result<Vec<TokenInfo<'_>>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let info = lexer.next_token()?;
        let done = matches!(info.token, Token::Eof);
        tokens.push(info);
        if done {
            return Ok(tokens);
        }
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
    token_start: usize,
    token_line: u32,
    token_column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            token_start: 0,
            token_line: 1,
            token_column: 1,
        }
    }

    pub fn next_token(&mut self) -> Result<TokenInfo<'a>> {
        self.skip_trivia()?;
        self.token_start = self.pos;
        self.token_line = self.line;
        self.token_column = self.column;

        if self.is_eof() {
            return Ok(self.emit(Token::Eof));
        }

        let ch = self.current();

        if ch.is_ascii_alphabetic() || ch == b'_' {
            let token = self.scan_identifier_or_keyword();
            return Ok(self.emit(token));
        }

        if ch.is_ascii_digit() {
            let token = self.scan_number()?;
            return Ok(self.emit(token));
        }

        let token = match ch {
            b'\'' => self.scan_string()?,
            b':' => self.scan_parameter()?,
            b'=' => {
                self.advance();
                Token::Eq
            }
            b'<' => self.scan_less_than(),
            b'>' => self.scan_greater_than(),
            b'!' => self.scan_exclamation()?,
            b'+' => {
                self.advance();
                Token::Plus
            }
            b'-' => {
                self.advance();
                Token::Minus
            }
            b'*' => {
                self.advance();
                Token::Star
            }
            b'/' => {
                self.advance();
                Token::Slash
            }
            b'%' => {
                self.advance();
                Token::Percent
            }
            b'(' => {
                self.advance();
                Token::LParen
            }
            b')' => {
                self.advance();
                Token::RParen
            }
            b',' => {
                self.advance();
                Token::Comma
            }
            b'.' => self.scan_dot()?,
            _ => {
                let offending = self.input[self.pos..].chars().next().unwrap_or('?');
                return Err(self.error_here(format!("unexpected character '{offending}'")));
            }
        };

        Ok(self.emit(token))
    }

    fn emit(&self, token: Token<'a>) -> TokenInfo<'a> {
        TokenInfo {
            token,
            span: Span::new(self.token_start, self.pos - self.token_start),
            line: self.token_line,
            column: self.token_column,
        }
    }

    fn error_here(&self, message: String) -> Error {
        Error::lexical(message, self.token_line, self.token_column)
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn current(&self) -> u8 {
        self.bytes[self.pos]
    }

    fn peek_char(&self) -> Option<u8> {
        self.bytes.get(self.pos + 1).copied()
    }

    fn advance(&mut self) {
        if !self.is_eof() {
            if self.current() == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.pos += 1;
        }
    }

    /// Skips whitespace, line comments, and block comments. Comments never
    /// reach the token list.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            if self.is_eof() {
                return Ok(());
            }
            match self.current() {
                b' ' | b'\t' | b'\r' | b'\n' => self.advance(),
                b'-' if self.peek_char() == Some(b'-') => {
                    while !self.is_eof() && self.current() != b'\n' {
                        self.advance();
                    }
                }
                b'/' if self.peek_char() == Some(b'*') => {
                    self.token_line = self.line;
                    self.token_column = self.column;
                    self.advance();
                    self.advance();
                    // Non-nesting: the first */ closes the comment.
                    loop {
                        if self.is_eof() {
                            return Err(self.error_here("unterminated block comment".to_string()));
                        }
                        if self.current() == b'*' && self.peek_char() == Some(b'/') {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn scan_identifier_or_keyword(&mut self) -> Token<'a> {
        let start = self.pos;
        while !self.is_eof() && (self.current().is_ascii_alphanumeric() || self.current() == b'_') {
            self.advance();
        }

        let ident = &self.input[start..self.pos];
        let upper = ident.to_ascii_uppercase();

        if let Some(&keyword) = KEYWORDS.get(&upper) {
            Token::Keyword(keyword)
        } else {
            Token::Ident(ident)
        }
    }

    fn scan_number(&mut self) -> Result<Token<'a>> {
        let start = self.pos;

        while !self.is_eof() && self.current().is_ascii_digit() {
            self.advance();
        }

        let mut is_float = false;

        if !self.is_eof() && self.current() == b'.' {
            is_float = true;
            self.advance();
            while !self.is_eof() && self.current().is_ascii_digit() {
                self.advance();
            }
        }

        if !self.is_eof() && (self.current() == b'e' || self.current() == b'E') {
            is_float = true;
            self.advance();
            if !self.is_eof() && (self.current() == b'+' || self.current() == b'-') {
                self.advance();
            }
            if self.is_eof() || !self.current().is_ascii_digit() {
                return Err(self.error_here("malformed numeric literal: missing exponent digits".to_string()));
            }
            while !self.is_eof() && self.current().is_ascii_digit() {
                self.advance();
            }
        }

        let num_str = &self.input[start..self.pos];
        if is_float {
            Ok(Token::Float(num_str))
        } else {
            Ok(Token::Integer(num_str))
        }
    }

    /// A leading dot is either a float like `.5` or the member-access dot.
    fn scan_dot(&mut self) -> Result<Token<'a>> {
        if self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            let start = self.pos;
            self.advance();
            while !self.is_eof() && self.current().is_ascii_digit() {
                self.advance();
            }
            if !self.is_eof() && (self.current() == b'e' || self.current() == b'E') {
                self.advance();
                if !self.is_eof() && (self.current() == b'+' || self.current() == b'-') {
                    self.advance();
                }
                if self.is_eof() || !self.current().is_ascii_digit() {
                    return Err(
                        self.error_here("malformed numeric literal: missing exponent digits".to_string())
                    );
                }
                while !self.is_eof() && self.current().is_ascii_digit() {
                    self.advance();
                }
            }
            Ok(Token::Float(&self.input[start..self.pos]))
        } else {
            self.advance();
            Ok(Token::Dot)
        }
    }

    /// Single-quoted string with `''` doubling and backslash escapes. The
    /// common no-escape case stays borrowed.
    fn scan_string(&mut self) -> Result<Token<'a>> {
        self.advance();
        let start = self.pos;
        let mut decoded: Option<String> = None;

        loop {
            if self.is_eof() {
                return Err(self.error_here("unterminated string literal".to_string()));
            }

            match self.current() {
                b'\'' => {
                    if self.peek_char() == Some(b'\'') {
                        let buf = decoded.get_or_insert_with(|| self.input[start..self.pos].to_string());
                        buf.push('\'');
                        self.advance();
                        self.advance();
                    } else {
                        let end = self.pos;
                        self.advance();
                        return Ok(match decoded {
                            Some(buf) => Token::String(Cow::Owned(buf)),
                            None => Token::String(Cow::Borrowed(&self.input[start..end])),
                        });
                    }
                }
                b'\\' => {
                    let buf = decoded.get_or_insert_with(|| self.input[start..self.pos].to_string());
                    self.advance();
                    if self.is_eof() {
                        return Err(self.error_here("unterminated string literal".to_string()));
                    }
                    let escaped = match self.current() {
                        b'\'' => '\'',
                        b'\\' => '\\',
                        b'n' => '\n',
                        b't' => '\t',
                        b'r' => '\r',
                        other => {
                            return Err(self.error_here(format!(
                                "invalid escape sequence '\\{}'",
                                other as char
                            )));
                        }
                    };
                    buf.push(escaped);
                    self.advance();
                }
                _ => {
                    // Step over a full char so a decode buffer never splits
                    // a multi-byte sequence.
                    let ch = self.input[self.pos..].chars().next().unwrap_or('\u{FFFD}');
                    if let Some(buf) = decoded.as_mut() {
                        buf.push(ch);
                    }
                    for _ in 0..ch.len_utf8() {
                        self.advance();
                    }
                }
            }
        }
    }

    fn scan_parameter(&mut self) -> Result<Token<'a>> {
        self.advance();

        if self.is_eof() || !(self.current().is_ascii_alphabetic() || self.current() == b'_') {
            return Err(self.error_here("expected parameter name after ':'".to_string()));
        }

        let start = self.pos;
        while !self.is_eof() && (self.current().is_ascii_alphanumeric() || self.current() == b'_') {
            self.advance();
        }
        Ok(Token::Parameter(&self.input[start..self.pos]))
    }

    fn scan_less_than(&mut self) -> Token<'a> {
        self.advance();
        if self.is_eof() {
            return Token::Lt;
        }
        match self.current() {
            b'=' => {
                self.advance();
                Token::LtEq
            }
            b'>' => {
                self.advance();
                Token::NotEq
            }
            _ => Token::Lt,
        }
    }

    fn scan_greater_than(&mut self) -> Token<'a> {
        self.advance();
        if !self.is_eof() && self.current() == b'=' {
            self.advance();
            Token::GtEq
        } else {
            Token::Gt
        }
    }

    fn scan_exclamation(&mut self) -> Result<Token<'a>> {
        self.advance();
        if !self.is_eof() && self.current() == b'=' {
            self.advance();
            Ok(Token::NotEq)
        } else {
            Err(self.error_here("expected '=' after '!'".to_string()))
        }
    }
}
