//! Parser module for Monkey.

mod expressions;
mod precedence;


use crate::ast::{BlockStmt, Expr, Program, Stmt};
use crate::error::ParserError;
use crate::lexer::{Token, TokenKind};
use crate::span::Span;

use precedence::Precedence;

pub type ParseResult<T> = Result<T, ParserError>;

/// The parser for Monkey.
///
/// Errors are collected rather than aborting the parse; the parser recovers
/// at the next statement boundary and reports everything it found.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<ParserError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    /// Parse a complete program, returning all collected errors on failure.
    pub fn parse(&mut self) -> Result<Program, Vec<ParserError>> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            match self.statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                }
            }
        }

        if self.errors.is_empty() {
            Ok(Program::new(statements))
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }

    // ===== Statements =====

    pub(crate) fn statement(&mut self) -> ParseResult<Stmt> {
        match self.peek().kind {
            TokenKind::Let => self.let_statement(),
            TokenKind::Return => self.return_statement(),
            _ => self.expression_statement(),
        }
    }

    fn let_statement(&mut self) -> ParseResult<Stmt> {
        self.advance(); // consume `let`
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Equal)?;

        let mut value = self.expression(Precedence::Lowest)?;

        // Name the function literal after its binding so the compiler can
        // create the self-reference.
        if let Expr::Function {
            name: ref mut fn_name,
            ..
        } = value
        {
            *fn_name = name.clone();
        }

        self.match_token(&TokenKind::Semicolon);
        Ok(Stmt::Let { name, value })
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        self.advance(); // consume `return`
        let value = self.expression(Precedence::Lowest)?;
        self.match_token(&TokenKind::Semicolon);
        Ok(Stmt::Return { value })
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression(Precedence::Lowest)?;
        self.match_token(&TokenKind::Semicolon);
        Ok(Stmt::Expression { expr })
    }

    pub(crate) fn block_statement(&mut self) -> ParseResult<BlockStmt> {
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.statement()?);
        }
        self.expect(&TokenKind::RightBrace)?;
        Ok(BlockStmt { statements })
    }

    /// Skip tokens until a likely statement boundary.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if self.match_token(&TokenKind::Semicolon) {
                return;
            }
            match self.peek().kind {
                TokenKind::Let | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ===== Token manipulation =====

    pub(crate) fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.tokens[self.current - 1].clone()
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        if self.is_at_end() {
            false
        } else {
            std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
        }
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParserError::unexpected_token(
                format!("{}", kind),
                format!("{}", self.peek().kind),
                self.current_span(),
            ))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> ParseResult<String> {
        match &self.peek().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(ParserError::unexpected_token(
                "identifier",
                format!("{}", self.peek().kind),
                self.current_span(),
            )),
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }
}
