//! Lexer/Scanner for Monkey source code.

use crate::lexer::token::{Token, TokenKind};
use crate::span::Span;

/// The lexer transforms source code into a stream of tokens.
///
/// Lexing never fails: characters outside the language become
/// `TokenKind::Illegal` tokens, which the parser rejects.
pub struct Scanner<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    source_len: usize,
    current_pos: usize,
    line: usize,
    column: usize,
    start_pos: usize,
    start_line: usize,
    start_column: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
            source_len: source.len(),
            current_pos: 0,
            line: 1,
            column: 1,
            start_pos: 0,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Scan all tokens from the source, ending with an Eof token.
    pub fn scan_tokens(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }

    /// Scan the next token.
    fn scan_token(&mut self) -> Token {
        self.skip_whitespace();
        self.mark_start();

        let Some(c) = self.advance() else {
            return Token::eof(self.source_len, self.line, self.column);
        };

        match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            '{' => self.make_token(TokenKind::LeftBrace),
            '}' => self.make_token(TokenKind::RightBrace),
            '[' => self.make_token(TokenKind::LeftBracket),
            ']' => self.make_token(TokenKind::RightBracket),
            ',' => self.make_token(TokenKind::Comma),
            ';' => self.make_token(TokenKind::Semicolon),
            ':' => self.make_token(TokenKind::Colon),
            '+' => self.make_token(TokenKind::Plus),
            '-' => self.make_token(TokenKind::Minus),
            '*' => self.make_token(TokenKind::Star),
            '/' => self.make_token(TokenKind::Slash),
            '<' => self.make_token(TokenKind::Less),
            '>' => self.make_token(TokenKind::Greater),
            '=' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::EqualEqual)
                } else {
                    self.make_token(TokenKind::Equal)
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::BangEqual)
                } else {
                    self.make_token(TokenKind::Bang)
                }
            }
            '"' => self.scan_string(),
            c if c.is_ascii_digit() => self.scan_number(c),
            c if is_identifier_start(c) => self.scan_identifier(c),
            other => self.make_token(TokenKind::Illegal(other)),
        }
    }

    /// Scan a string literal. The opening quote has been consumed.
    ///
    /// Strings have no escape sequences; an unterminated string runs to the
    /// end of the input.
    fn scan_string(&mut self) -> Token {
        let mut value = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c == '"' {
                self.advance();
                break;
            }
            value.push(c);
            self.advance();
        }
        self.make_token(TokenKind::StringLiteral(value))
    }

    /// Scan an integer literal. The first digit has been consumed.
    fn scan_number(&mut self, first: char) -> Token {
        let mut digits = String::from(first);
        while let Some(&(_, c)) = self.chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.advance();
        }
        self.make_token(TokenKind::IntLiteral(digits))
    }

    /// Scan an identifier or keyword. The first character has been consumed.
    fn scan_identifier(&mut self, first: char) -> Token {
        let mut name = String::from(first);
        while let Some(&(_, c)) = self.chars.peek() {
            if !is_identifier_continue(c) {
                break;
            }
            name.push(c);
            self.advance();
        }
        match TokenKind::keyword(&name) {
            Some(kind) => self.make_token(kind),
            None => self.make_token(TokenKind::Identifier(name)),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn mark_start(&mut self) {
        self.start_pos = self.current_pos;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.current_pos = pos + c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if let Some(&(_, c)) = self.chars.peek() {
            if c == expected {
                self.advance();
                return true;
            }
        }
        false
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            Span::new(
                self.start_pos,
                self.current_pos,
                self.start_line,
                self.start_column,
            ),
        )
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_token() {
        let input = r#"let five = 5;
let ten = 10;

let add = fn(x, y) {
  x + y;
};

let result = add(five, ten);
!-/*5;
5 < 10 > 5;

if (5 < 10) {
    return true;
} else {
    return false;
}

10 == 10;
10 != 9;
"foobar"
"foo bar"
[1, 2];
{"foo": "bar"}
"#;

        let expected = vec![
            TokenKind::Let,
            TokenKind::Identifier("five".to_string()),
            TokenKind::Equal,
            TokenKind::IntLiteral("5".to_string()),
            TokenKind::Semicolon,
            TokenKind::Let,
            TokenKind::Identifier("ten".to_string()),
            TokenKind::Equal,
            TokenKind::IntLiteral("10".to_string()),
            TokenKind::Semicolon,
            TokenKind::Let,
            TokenKind::Identifier("add".to_string()),
            TokenKind::Equal,
            TokenKind::Fn,
            TokenKind::LeftParen,
            TokenKind::Identifier("x".to_string()),
            TokenKind::Comma,
            TokenKind::Identifier("y".to_string()),
            TokenKind::RightParen,
            TokenKind::LeftBrace,
            TokenKind::Identifier("x".to_string()),
            TokenKind::Plus,
            TokenKind::Identifier("y".to_string()),
            TokenKind::Semicolon,
            TokenKind::RightBrace,
            TokenKind::Semicolon,
            TokenKind::Let,
            TokenKind::Identifier("result".to_string()),
            TokenKind::Equal,
            TokenKind::Identifier("add".to_string()),
            TokenKind::LeftParen,
            TokenKind::Identifier("five".to_string()),
            TokenKind::Comma,
            TokenKind::Identifier("ten".to_string()),
            TokenKind::RightParen,
            TokenKind::Semicolon,
            TokenKind::Bang,
            TokenKind::Minus,
            TokenKind::Slash,
            TokenKind::Star,
            TokenKind::IntLiteral("5".to_string()),
            TokenKind::Semicolon,
            TokenKind::IntLiteral("5".to_string()),
            TokenKind::Less,
            TokenKind::IntLiteral("10".to_string()),
            TokenKind::Greater,
            TokenKind::IntLiteral("5".to_string()),
            TokenKind::Semicolon,
            TokenKind::If,
            TokenKind::LeftParen,
            TokenKind::IntLiteral("5".to_string()),
            TokenKind::Less,
            TokenKind::IntLiteral("10".to_string()),
            TokenKind::RightParen,
            TokenKind::LeftBrace,
            TokenKind::Return,
            TokenKind::True,
            TokenKind::Semicolon,
            TokenKind::RightBrace,
            TokenKind::Else,
            TokenKind::LeftBrace,
            TokenKind::Return,
            TokenKind::False,
            TokenKind::Semicolon,
            TokenKind::RightBrace,
            TokenKind::IntLiteral("10".to_string()),
            TokenKind::EqualEqual,
            TokenKind::IntLiteral("10".to_string()),
            TokenKind::Semicolon,
            TokenKind::IntLiteral("10".to_string()),
            TokenKind::BangEqual,
            TokenKind::IntLiteral("9".to_string()),
            TokenKind::Semicolon,
            TokenKind::StringLiteral("foobar".to_string()),
            TokenKind::StringLiteral("foo bar".to_string()),
            TokenKind::LeftBracket,
            TokenKind::IntLiteral("1".to_string()),
            TokenKind::Comma,
            TokenKind::IntLiteral("2".to_string()),
            TokenKind::RightBracket,
            TokenKind::Semicolon,
            TokenKind::LeftBrace,
            TokenKind::StringLiteral("foo".to_string()),
            TokenKind::Colon,
            TokenKind::StringLiteral("bar".to_string()),
            TokenKind::RightBrace,
            TokenKind::Eof,
        ];

        let tokens = Scanner::new(input).scan_tokens();
        let kinds: Vec<TokenKind> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn test_illegal_character() {
        let tokens = Scanner::new("let x = 1 @ 2;").scan_tokens();
        assert!(tokens
            .iter()
            .any(|t| matches!(t.kind, TokenKind::Illegal('@'))));
    }

    #[test]
    fn test_spans_track_lines() {
        let tokens = Scanner::new("let x = 1;\nlet y = 2;").scan_tokens();
        let second_let = &tokens[5];
        assert_eq!(second_let.kind, TokenKind::Let);
        assert_eq!(second_let.span.line, 2);
        assert_eq!(second_let.span.column, 1);
    }
}
