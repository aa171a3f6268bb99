//! C1: Text -> token stream with positions.
//!
//! Mirrors the position-tracking, char-by-char scanning style of the
//! teacher's `lexer::core` module, but produces a flat token stream
//! (instead of an indentation-aware token tree) since FTML has no
//! significant indentation.

use crate::error::LexError;
use crate::position::Position;
use crate::token::{Token, TokenKind};

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    pos: Position,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        Self {
            chars: input.chars().peekable(),
            pos: Position::start(),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.pos.advance(ch);
        Some(ch)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek2(&self) -> Option<char> {
        let mut it = self.chars.clone();
        it.next();
        it.next()
    }

    /// Tokenize the whole input, always terminating with `Eof`.
    #[tracing::instrument(skip(self), level = "trace")]
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let start = self.pos;
            let Some(ch) = self.peek() else {
                tokens.push(Token::new(TokenKind::Eof, start));
                break;
            };
            let tok = match ch {
                '\n' => {
                    self.bump();
                    Token::new(TokenKind::Newline, start)
                }
                '\r' => {
                    self.bump();
                    if self.peek() == Some('\n') {
                        self.bump();
                        Token::new(TokenKind::Newline, start)
                    } else {
                        self.consume_whitespace_run(start)
                    }
                }
                ' ' | '\t' => self.consume_whitespace_run(start),
                '{' => {
                    self.bump();
                    Token::new(TokenKind::LBrace, start)
                }
                '}' => {
                    self.bump();
                    Token::new(TokenKind::RBrace, start)
                }
                '[' => {
                    self.bump();
                    Token::new(TokenKind::LBracket, start)
                }
                ']' => {
                    self.bump();
                    Token::new(TokenKind::RBracket, start)
                }
                '=' => {
                    self.bump();
                    Token::new(TokenKind::Equal, start)
                }
                ':' => {
                    self.bump();
                    Token::new(TokenKind::Colon, start)
                }
                '|' => {
                    self.bump();
                    Token::new(TokenKind::Pipe, start)
                }
                '<' => {
                    self.bump();
                    Token::new(TokenKind::LAngle, start)
                }
                '>' => {
                    self.bump();
                    Token::new(TokenKind::RAngle, start)
                }
                ',' => {
                    self.bump();
                    Token::new(TokenKind::Comma, start)
                }
                '?' => {
                    self.bump();
                    Token::new(TokenKind::Question, start)
                }
                '/' if self.peek2() == Some('/') || self.starts_slash_comment() => {
                    self.consume_comment(start)
                }
                '"' => self.consume_double_string(start)?,
                '\'' => self.consume_single_string(start)?,
                c if c == '-' || c == '+' || c.is_ascii_digit() => self.consume_number(start)?,
                c if c.is_alphabetic() || c == '_' => self.consume_ident(start),
                c => return Err(LexError::UnexpectedChar { pos: start, ch: c }),
            };
            tokens.push(tok);
        }
        Ok(tokens)
    }

    fn starts_slash_comment(&self) -> bool {
        let mut it = self.chars.clone();
        it.next() == Some('/')
    }

    fn consume_whitespace_run(&mut self, start: Position) -> Token {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.bump();
        }
        if self.peek() == Some('\r') && self.peek2() != Some('\n') {
            self.bump();
        }
        Token::new(TokenKind::Whitespace, start)
    }

    /// `//!` -> InnerDoc, `///` -> OuterDoc, else `//` -> Comment.
    /// Longest-prefix wins: `//!`/`///` are checked before plain `//`.
    /// The captured text is the full raw line (prefix included) so the
    /// serializer (C8) can reproduce it byte-for-byte.
    fn consume_comment(&mut self, start: Position) -> Token {
        let mut text = String::new();
        text.push(self.bump().unwrap()); // first '/'
        text.push(self.bump().unwrap()); // second '/'
        let is_inner = self.peek() == Some('!');
        let is_outer = !is_inner && self.peek() == Some('/');
        if is_inner || is_outer {
            text.push(self.bump().unwrap());
        }
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            text.push(c);
            self.bump();
        }
        let kind = if is_inner {
            TokenKind::InnerDoc(text)
        } else if is_outer {
            TokenKind::OuterDoc(text)
        } else {
            TokenKind::Comment(text)
        };
        Token::new(kind, start)
    }

    fn consume_ident(&mut self, start: Position) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        match text.as_str() {
            "true" => Token::new(TokenKind::Bool(true), start),
            "false" => Token::new(TokenKind::Bool(false), start),
            "null" => Token::new(TokenKind::Null, start),
            _ => Token::new(TokenKind::Ident(text), start),
        }
    }

    fn consume_double_string(&mut self, start: Position) -> Result<Token, LexError> {
        self.bump(); // opening quote
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(LexError::UnterminatedString { pos: start }),
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some('"') => text.push('"'),
                    Some('\\') => text.push('\\'),
                    Some('n') => text.push('\n'),
                    Some('r') => text.push('\r'),
                    Some('t') => text.push('\t'),
                    Some('b') => text.push('\u{8}'),
                    Some('f') => text.push('\u{c}'),
                    Some(other) => {
                        text.push('\\');
                        text.push(other);
                    }
                    None => return Err(LexError::UnterminatedString { pos: start }),
                },
                Some(c) => text.push(c),
            }
        }
        Ok(Token::new(TokenKind::String(text), start))
    }

    fn consume_single_string(&mut self, start: Position) -> Result<Token, LexError> {
        self.bump(); // opening quote
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(LexError::UnterminatedString { pos: start }),
                Some('\'') => {
                    if self.peek() == Some('\'') {
                        self.bump();
                        text.push('\'');
                    } else {
                        break;
                    }
                }
                Some(c) => text.push(c),
            }
        }
        Ok(Token::new(TokenKind::SingleString(text), start))
    }

    fn consume_number(&mut self, start: Position) -> Result<Token, LexError> {
        let mut text = String::new();
        if matches!(self.peek(), Some('-') | Some('+')) {
            text.push(self.bump().unwrap());
        }
        let mut saw_digit = false;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            text.push(self.bump().unwrap());
            saw_digit = true;
        }
        if !saw_digit {
            // a lone sign followed by non-digit is not a valid number token
            return Err(LexError::MalformedNumber { pos: start, text });
        }
        let mut is_float = false;
        if self.peek() == Some('.') {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            if matches!(lookahead.peek(), Some(c) if c.is_ascii_digit()) {
                is_float = true;
                text.push(self.bump().unwrap());
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    text.push(self.bump().unwrap());
                }
            }
        }
        if is_float {
            let value: f64 = text
                .parse()
                .map_err(|_| LexError::MalformedNumber { pos: start, text: text.clone() })?;
            Ok(Token::new(TokenKind::Float(value), start))
        } else {
            let value: i64 = text
                .parse()
                .map_err(|_| LexError::MalformedNumber { pos: start, text: text.clone() })?;
            Ok(Token::new(TokenKind::Int(value), start))
        }
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("// hi", TokenKind::Comment("// hi".into()))]
    #[case("/// hi", TokenKind::OuterDoc("/// hi".into()))]
    #[case("//! hi", TokenKind::InnerDoc("//! hi".into()))]
    fn classifies_comments(#[case] src: &str, #[case] expected: TokenKind) {
        let toks = tokenize(src).unwrap();
        assert_eq!(toks[0].kind, expected);
    }

    #[test]
    fn numbers() {
        let toks = tokenize("42 -7 3.14 -0.5").unwrap();
        let kinds: Vec<_> = toks
            .iter()
            .filter(|t| !matches!(t.kind, TokenKind::Whitespace))
            .map(|t| t.kind.clone())
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Int(42),
                TokenKind::Int(-7),
                TokenKind::Float(3.14),
                TokenKind::Float(-0.5),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn single_quote_escape() {
        let toks = tokenize("'it''s'").unwrap();
        assert_eq!(toks[0].kind, TokenKind::SingleString("it's".into()));
    }

    #[test]
    fn unterminated_string_errors() {
        let err = tokenize("\"abc").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { .. }));
    }
}
