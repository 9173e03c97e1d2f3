//! Source text → token stream.
//!
//! Mirrors the original implementation's `lexer.c`: a single forward cursor
//! over the source, whitespace and `//` line comments skipped between
//! tokens, a fixed keyword table, and two-character operators checked before
//! their single-character prefix. Unlike the original, an unrecognized byte
//! does not abort the process — it is logged and surfaces as
//! `TokenKind::Unknown`, per the non-fatal half of the error taxonomy.

use crate::error::ScanError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Route,
    Response,
    Html,
    If,
    Else,
    While,
    For,
    Function,
    Return,

    Identifier,
    String,
    Number,

    LBrace,
    RBrace,
    LParen,
    RParen,
    Equals,
    Plus,
    Minus,
    Star,
    Slash,
    Comma,
    Dot,
    Colon,
    Semicolon,

    Lt,
    Gt,
    Lte,
    Gte,
    EqEq,
    Neq,
    AndAnd,
    OrOr,

    Unknown,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Text of the token: the literal body of a string literal (copied
    /// verbatim, no escapes), the raw digits/dots of a number, or an
    /// identifier's name. `None` for punctuation and `Eof`.
    pub lexeme: Option<String>,
    pub line: u32,
    pub column: u32,
}

#[derive(Clone)]
pub struct Scanner<'a> {
    source: &'a str,
    chars: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Scanner {
            source,
            chars: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn advance_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance_char();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while self.peek().is_some() && self.peek() != Some('\n') {
                        self.advance_char();
                    }
                }
                _ => break,
            }
        }
    }

    fn make(&self, kind: TokenKind, lexeme: Option<String>, line: u32, column: u32) -> Token {
        Token {
            kind,
            lexeme,
            line,
            column,
        }
    }

    /// Copies every character up to the next `"` literally — no escapes, as
    /// `spec.md` §4.1/§6 require and `lexer.c`'s `read_string` implements.
    fn read_string(&mut self, line: u32, column: u32) -> Result<Token, ScanError> {
        let mut value = String::new();
        loop {
            match self.advance_char() {
                None | Some('\n') => {
                    return Err(ScanError::UnterminatedString { line, column });
                }
                Some('"') => break,
                Some(c) => value.push(c),
            }
        }
        Ok(self.make(TokenKind::String, Some(value), line, column))
    }

    fn read_number(&mut self, first: char, line: u32, column: u32) -> Token {
        let mut lexeme = String::new();
        lexeme.push(first);
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                lexeme.push(c);
                self.advance_char();
            } else {
                break;
            }
        }
        self.make(TokenKind::Number, Some(lexeme), line, column)
    }

    fn read_identifier(&mut self, first: char, line: u32, column: u32) -> Token {
        let mut lexeme = String::new();
        lexeme.push(first);
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                lexeme.push(c);
                self.advance_char();
            } else {
                break;
            }
        }
        let kind = match lexeme.as_str() {
            "route" => TokenKind::Route,
            "response" => TokenKind::Response,
            "html" => TokenKind::Html,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            _ => TokenKind::Identifier,
        };
        let lexeme = matches!(kind, TokenKind::Identifier).then_some(lexeme);
        self.make(kind, lexeme, line, column)
    }

    pub fn next_token(&mut self) -> Result<Token, ScanError> {
        self.skip_whitespace_and_comments();
        let (line, column) = (self.line, self.column);

        let Some(c) = self.advance_char() else {
            return Ok(self.make(TokenKind::Eof, None, line, column));
        };

        let two_char = |s: &mut Self, expected_second: char, with: TokenKind, without: TokenKind| {
            if s.peek() == Some(expected_second) {
                s.advance_char();
                s.make(with, None, line, column)
            } else {
                s.make(without, None, line, column)
            }
        };

        let token = match c {
            '{' => self.make(TokenKind::LBrace, None, line, column),
            '}' => self.make(TokenKind::RBrace, None, line, column),
            '(' => self.make(TokenKind::LParen, None, line, column),
            ')' => self.make(TokenKind::RParen, None, line, column),
            ',' => self.make(TokenKind::Comma, None, line, column),
            '.' => self.make(TokenKind::Dot, None, line, column),
            ':' => self.make(TokenKind::Colon, None, line, column),
            ';' => self.make(TokenKind::Semicolon, None, line, column),
            '+' => self.make(TokenKind::Plus, None, line, column),
            '-' => self.make(TokenKind::Minus, None, line, column),
            '*' => self.make(TokenKind::Star, None, line, column),
            '/' => self.make(TokenKind::Slash, None, line, column),
            '=' => two_char(self, '=', TokenKind::EqEq, TokenKind::Equals),
            '!' => two_char(self, '=', TokenKind::Neq, TokenKind::Unknown),
            '<' => two_char(self, '=', TokenKind::Lte, TokenKind::Lt),
            '>' => two_char(self, '=', TokenKind::Gte, TokenKind::Gt),
            '&' => two_char(self, '&', TokenKind::AndAnd, TokenKind::Unknown),
            '|' => two_char(self, '|', TokenKind::OrOr, TokenKind::Unknown),
            '"' => return self.read_string(line, column),
            c if c.is_ascii_digit() => self.read_number(c, line, column),
            c if c.is_alphabetic() || c == '_' => self.read_identifier(c, line, column),
            other => {
                tracing::warn!(
                    line,
                    column,
                    byte = %other,
                    "scanner: unrecognized character"
                );
                self.make(TokenKind::Unknown, Some(other.to_string()), line, column)
            }
        };
        Ok(token)
    }

    pub fn source(&self) -> &'a str {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(source);
        let mut out = Vec::new();
        loop {
            let token = scanner.next_token().expect("scan should not fail");
            let done = token.kind == TokenKind::Eof;
            out.push(token.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn scans_route_declaration() {
        let k = kinds(r#"route "/hello" { response "hi" }"#);
        assert_eq!(
            k,
            vec![
                TokenKind::Route,
                TokenKind::String,
                TokenKind::LBrace,
                TokenKind::Response,
                TokenKind::String,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_char_operators_win_over_prefix() {
        let k = kinds("== != <= >= && ||");
        assert_eq!(
            k,
            vec![
                TokenKind::EqEq,
                TokenKind::Neq,
                TokenKind::Lte,
                TokenKind::Gte,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn line_comments_are_skipped() {
        let mut scanner = Scanner::new("route // a comment\n\"/x\"");
        let first = scanner.next_token().unwrap();
        assert_eq!(first.kind, TokenKind::Route);
        let second = scanner.next_token().unwrap();
        assert_eq!(second.kind, TokenKind::String);
        assert_eq!(second.line, 2);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut scanner = Scanner::new("\"never closes");
        let err = scanner.next_token().unwrap_err();
        assert_eq!(
            err,
            ScanError::UnterminatedString { line: 1, column: 1 }
        );
    }

    #[test]
    fn unknown_byte_is_non_fatal() {
        let mut scanner = Scanner::new("route ~ \"/x\"");
        let _ = scanner.next_token().unwrap();
        let unknown = scanner.next_token().unwrap();
        assert_eq!(unknown.kind, TokenKind::Unknown);
        let s = scanner.next_token().unwrap();
        assert_eq!(s.kind, TokenKind::String);
    }

    #[test]
    fn string_literals_have_no_escapes() {
        let mut scanner = Scanner::new(r#""a\b""#);
        let tok = scanner.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::String);
        assert_eq!(tok.lexeme.as_deref(), Some("a\\b"));
    }

    #[test]
    fn a_backslash_does_not_escape_the_closing_quote() {
        let mut scanner = Scanner::new(r#""\""#);
        let tok = scanner.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::String);
        assert_eq!(tok.lexeme.as_deref(), Some("\\"));
    }

    #[test]
    fn dot_colon_semicolon_are_their_own_token_kinds() {
        let k = kinds(". : ;");
        assert_eq!(
            k,
            vec![
                TokenKind::Dot,
                TokenKind::Colon,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn number_lexeme_preserves_multiple_dots_for_parser_to_reject() {
        let mut scanner = Scanner::new("1.2.3");
        let tok = scanner.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Number);
        assert_eq!(tok.lexeme.as_deref(), Some("1.2.3"));
    }
}
