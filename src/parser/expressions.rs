//! Expression parsing using Pratt precedence.

use crate::ast::{Expr, InfixOp, PrefixOp};
use crate::error::ParserError;
use crate::lexer::TokenKind;

use super::precedence::{get_precedence, Precedence};
use super::{ParseResult, Parser};

impl Parser {
    pub(crate) fn expression(&mut self, min_precedence: Precedence) -> ParseResult<Expr> {
        let mut left = self.parse_prefix()?;

        while !self.check(&TokenKind::Semicolon)
            && min_precedence < get_precedence(&self.peek().kind)
        {
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        let token = self.advance();

        match &token.kind {
            TokenKind::Identifier(name) => Ok(Expr::Identifier(name.clone())),
            TokenKind::IntLiteral(digits) => match digits.parse::<i64>() {
                Ok(value) => Ok(Expr::IntegerLiteral(value)),
                Err(_) => Err(ParserError::InvalidInteger(digits.clone(), token.span)),
            },
            TokenKind::StringLiteral(value) => Ok(Expr::StringLiteral(value.clone())),
            TokenKind::True => Ok(Expr::BooleanLiteral(true)),
            TokenKind::False => Ok(Expr::BooleanLiteral(false)),

            TokenKind::Bang => self.prefix_expression(PrefixOp::Bang),
            TokenKind::Minus => self.prefix_expression(PrefixOp::Minus),

            TokenKind::LeftParen => {
                let expr = self.expression(Precedence::Lowest)?;
                self.expect(&TokenKind::RightParen)?;
                Ok(expr)
            }

            TokenKind::LeftBracket => self.array_literal(),
            TokenKind::LeftBrace => self.hash_literal(),
            TokenKind::If => self.if_expression(),
            TokenKind::Fn => self.function_literal(),

            other => Err(ParserError::general(
                format!("no prefix parse rule for {}", other),
                token.span,
            )),
        }
    }

    fn parse_infix(&mut self, left: Expr) -> ParseResult<Expr> {
        let token = self.advance();
        let precedence = get_precedence(&token.kind);

        let operator = match token.kind {
            TokenKind::Plus => InfixOp::Add,
            TokenKind::Minus => InfixOp::Sub,
            TokenKind::Star => InfixOp::Mul,
            TokenKind::Slash => InfixOp::Div,
            TokenKind::Less => InfixOp::Less,
            TokenKind::Greater => InfixOp::Greater,
            TokenKind::EqualEqual => InfixOp::Equal,
            TokenKind::BangEqual => InfixOp::NotEqual,
            TokenKind::LeftParen => return self.call_expression(left),
            TokenKind::LeftBracket => return self.index_expression(left),
            other => {
                return Err(ParserError::general(
                    format!("no infix parse rule for {}", other),
                    token.span,
                ))
            }
        };

        let right = self.expression(precedence)?;
        Ok(Expr::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn prefix_expression(&mut self, operator: PrefixOp) -> ParseResult<Expr> {
        let right = self.expression(Precedence::Prefix)?;
        Ok(Expr::Prefix {
            operator,
            right: Box::new(right),
        })
    }

    fn if_expression(&mut self) -> ParseResult<Expr> {
        self.expect(&TokenKind::LeftParen)?;
        let condition = self.expression(Precedence::Lowest)?;
        self.expect(&TokenKind::RightParen)?;

        self.expect(&TokenKind::LeftBrace)?;
        let consequence = self.block_statement()?;

        let alternative = if self.match_token(&TokenKind::Else) {
            self.expect(&TokenKind::LeftBrace)?;
            Some(self.block_statement()?)
        } else {
            None
        };

        Ok(Expr::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn function_literal(&mut self) -> ParseResult<Expr> {
        self.expect(&TokenKind::LeftParen)?;

        let mut parameters = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            parameters.push(self.expect_identifier()?);
            while self.match_token(&TokenKind::Comma) {
                parameters.push(self.expect_identifier()?);
            }
        }
        self.expect(&TokenKind::RightParen)?;

        self.expect(&TokenKind::LeftBrace)?;
        let body = self.block_statement()?;

        Ok(Expr::Function {
            parameters,
            body,
            name: String::new(),
        })
    }

    fn call_expression(&mut self, function: Expr) -> ParseResult<Expr> {
        let arguments = self.expression_list(&TokenKind::RightParen)?;
        Ok(Expr::Call {
            function: Box::new(function),
            arguments,
        })
    }

    fn index_expression(&mut self, left: Expr) -> ParseResult<Expr> {
        let index = self.expression(Precedence::Lowest)?;
        self.expect(&TokenKind::RightBracket)?;
        Ok(Expr::Index {
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn array_literal(&mut self) -> ParseResult<Expr> {
        let elements = self.expression_list(&TokenKind::RightBracket)?;
        Ok(Expr::Array { elements })
    }

    fn hash_literal(&mut self) -> ParseResult<Expr> {
        let mut pairs = Vec::new();

        while !self.check(&TokenKind::RightBrace) {
            let key = self.expression(Precedence::Lowest)?;
            self.expect(&TokenKind::Colon)?;
            let value = self.expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightBrace)?;

        Ok(Expr::Hash { pairs })
    }

    /// Parse a comma-separated expression list up to `end` (exclusive),
    /// consuming the end token.
    fn expression_list(&mut self, end: &TokenKind) -> ParseResult<Vec<Expr>> {
        let mut list = Vec::new();

        if !self.check(end) {
            list.push(self.expression(Precedence::Lowest)?);
            while self.match_token(&TokenKind::Comma) {
                list.push(self.expression(Precedence::Lowest)?);
            }
        }
        self.expect(end)?;

        Ok(list)
    }
}
