//! Token stream → syntax tree.
//!
//! A recursive-descent parser with precedence climbing, ported from the
//! original's `parser.c`. The original disambiguates `IDENT '=' expr` from a
//! bare `IDENT` statement by snapshotting the lexer cursor, peeking a
//! token, and restoring the cursor if it guessed wrong. This parser instead
//! keeps the current token in a field and, for the one place that needs a
//! second token of lookahead, clones the (cheap, `Copy`-like) scanner and
//! reads from the clone — no cursor to restore.

use crate::ast::{BinaryOp, Block, Expr, Program, Response, ResponseBody, Route, Stmt};
use crate::error::ScriptError;
use crate::scanner::{Scanner, Token, TokenKind};

pub struct Parser<'a> {
    scanner: Scanner<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, ScriptError> {
        let mut scanner = Scanner::new(source);
        let current = scanner.next_token()?;
        Ok(Parser { scanner, current })
    }

    fn advance(&mut self) -> Result<Token, ScriptError> {
        let next = self.scanner.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn peek_second(&self) -> Result<Token, ScriptError> {
        let mut lookahead = self.scanner.clone();
        Ok(lookahead.next_token()?)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current.kind == kind
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Result<Token, ScriptError> {
        if !self.check(&kind) {
            return Err(ScriptError::UnexpectedToken {
                line: self.current.line,
                expected: format!("{kind:?} ({context})"),
                found: format!("{:?}", self.current.kind),
            });
        }
        self.advance()
    }

    pub fn parse_program(&mut self) -> Result<Program, ScriptError> {
        let mut routes = Vec::new();
        while !self.check(&TokenKind::Eof) {
            routes.push(self.parse_route()?);
        }
        Ok(Program { routes })
    }

    fn parse_route(&mut self) -> Result<Route, ScriptError> {
        self.expect(TokenKind::Route, "route declaration")?;
        if !self.check(&TokenKind::String) {
            return Err(ScriptError::MissingRoutePath {
                line: self.current.line,
            });
        }
        let path_token = self.advance()?;
        let path = path_token.lexeme.unwrap_or_default();
        let body = self.parse_block()?;
        Ok(Route { path, body })
    }

    fn parse_block(&mut self) -> Result<Block, ScriptError> {
        self.expect(TokenKind::LBrace, "block")?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.check(&TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace, "end of block")?;
        Ok(Block { statements })
    }

    fn parse_statement(&mut self) -> Result<Stmt, ScriptError> {
        match self.current.kind {
            TokenKind::Response => self.parse_response(),
            TokenKind::Identifier => {
                if self.peek_second()?.kind == TokenKind::Equals {
                    self.parse_assignment()
                } else {
                    let name = self.current.lexeme.clone().unwrap_or_default();
                    self.advance()?;
                    Ok(Stmt::Identifier(name))
                }
            }
            _ => Err(ScriptError::UnexpectedToken {
                line: self.current.line,
                expected: "a statement".into(),
                found: format!("{:?}", self.current.kind),
            }),
        }
    }

    fn parse_assignment(&mut self) -> Result<Stmt, ScriptError> {
        let name_token = self.expect(TokenKind::Identifier, "assignment target")?;
        let name = name_token.lexeme.unwrap_or_default();
        self.expect(TokenKind::Equals, "'=' in assignment")?;
        let value = self.parse_expression()?;
        Ok(Stmt::Assignment { name, value })
    }

    fn parse_response(&mut self) -> Result<Stmt, ScriptError> {
        self.expect(TokenKind::Response, "response statement")?;
        let (body, html) = if self.check(&TokenKind::Html) {
            self.advance()?;
            (ResponseBody::Block(self.parse_block()?), true)
        } else {
            (ResponseBody::Expr(self.parse_expression()?), false)
        };
        Ok(Stmt::Response(Response { body, html }))
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ScriptError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_and()?;
        while self.check(&TokenKind::OrOr) {
            self.advance()?;
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_equality()?;
        while self.check(&TokenKind::AndAnd) {
            self.advance()?;
            let right = self.parse_equality()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.current.kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::Neq => BinaryOp::Ne,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_comparison()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Lte => BinaryOp::Le,
                TokenKind::Gte => BinaryOp::Ge,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.parse_primary()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_primary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expr, ScriptError> {
        match self.current.kind.clone() {
            TokenKind::String => {
                let token = self.advance()?;
                Ok(Expr::String(token.lexeme.unwrap_or_default()))
            }
            TokenKind::Number => {
                let token = self.advance()?;
                let lexeme = token.lexeme.unwrap_or_default();
                if lexeme.matches('.').count() > 1 {
                    return Err(ScriptError::MalformedNumber {
                        line: token.line,
                        lexeme,
                    });
                }
                let value = lexeme.parse::<f64>().map_err(|_| ScriptError::MalformedNumber {
                    line: token.line,
                    lexeme: lexeme.clone(),
                })?;
                Ok(Expr::Number(value))
            }
            TokenKind::Identifier => {
                let token = self.advance()?;
                Ok(Expr::Identifier(token.lexeme.unwrap_or_default()))
            }
            TokenKind::LParen => {
                self.advance()?;
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, "closing ')'")?;
                Ok(inner)
            }
            other => Err(ScriptError::UnexpectedToken {
                line: self.current.line,
                expected: "an expression".into(),
                found: format!("{other:?}"),
            }),
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        Parser::new(source).unwrap().parse_program().unwrap()
    }

    #[test]
    fn parses_a_minimal_route() {
        let program = parse(r#"route "/hello" { response "hi" }"#);
        assert_eq!(program.routes.len(), 1);
        assert_eq!(program.routes[0].path, "/hello");
    }

    #[test]
    fn disambiguates_assignment_from_bare_identifier() {
        let program = parse(r#"route "/a" { x = 1 x }"#);
        let stmts = &program.routes[0].body.statements;
        assert!(matches!(stmts[0], Stmt::Assignment { .. }));
        assert!(matches!(stmts[1], Stmt::Identifier(_)));
    }

    #[test]
    fn precedence_climbs_correctly() {
        let program = parse(r#"route "/a" { response 1 + 2 * 3 }"#);
        let Stmt::Response(Response { body: ResponseBody::Expr(expr), .. }) =
            &program.routes[0].body.statements[0]
        else {
            panic!("expected an expression response");
        };
        match expr {
            Expr::Binary { op: BinaryOp::Add, right, .. } => {
                assert!(matches!(**right, Expr::Binary { op: BinaryOp::Mul, .. }));
            }
            _ => panic!("expected addition at the top"),
        }
    }

    #[test]
    fn html_response_parses_its_block() {
        let program = parse(r#"route "/a" { name = "x" response html { name } }"#);
        let Stmt::Response(Response { body: ResponseBody::Block(block), html }) =
            &program.routes[0].body.statements[1]
        else {
            panic!("expected a block response");
        };
        assert!(html);
        assert_eq!(block.statements.len(), 1);
    }

    #[test]
    fn rejects_number_with_two_dots() {
        let err = Parser::new(r#"route "/a" { response 1.2.3 }"#)
            .unwrap()
            .parse_program()
            .unwrap_err();
        assert!(matches!(err, ScriptError::MalformedNumber { .. }));
    }

    #[test]
    fn missing_route_path_is_reported() {
        let err = Parser::new("route { }").unwrap().parse_program().unwrap_err();
        assert!(matches!(err, ScriptError::MissingRoutePath { .. }));
    }
}
