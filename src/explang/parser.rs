// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Recursive-descent/Pratt parser for the explang surface grammar (spec
//! §4.5): ternary, `||`, `&&`, equality, relational, additive,
//! multiplicative, unary, and a postfix path chain of `.field`,
//! `.call(args)`, and `[index]`.

use super::ast::{BinOp, Expr, Literal, Path, Segment, UnOp};
use super::lexer::{tokenize_explang, ExplangTok, ExplangToken};
use crate::position::Position;

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("{pos}: {message}")]
pub struct ExplangSyntaxError {
    pub pos: Position,
    pub message: String,
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<ExplangTok<'a>>,
    pos: usize,
    base_pos: Position,
}

impl<'a> Parser<'a> {
    /// `base_pos` is the position of `source`'s first byte within the
    /// overall template file. Embedded expressions are assumed to stay on
    /// a single source line, so positions are derived by column offset
    /// rather than a full line-tracking pass.
    pub fn new(source: &'a str, base_pos: Position) -> Self {
        Self {
            source,
            tokens: tokenize_explang(source),
            pos: 0,
            base_pos,
        }
    }

    pub fn parse(mut self) -> Result<Expr, ExplangSyntaxError> {
        let expr = self.parse_ternary()?;
        if !self.at(ExplangToken::Eof) {
            return Err(self.error(format!("unexpected trailing token {:?}", self.current())));
        }
        Ok(expr)
    }

    fn current(&self) -> ExplangToken {
        self.tokens[self.pos].kind
    }

    fn at(&self, kind: ExplangToken) -> bool {
        self.current() == kind
    }

    fn token_pos(&self) -> Position {
        let offset = u32::from(self.tokens[self.pos].range.start());
        Position::new(
            self.base_pos.line,
            self.base_pos.column + offset,
            self.base_pos.offset + offset,
        )
    }

    fn bump(&mut self) -> ExplangTok<'a> {
        let token = self.tokens[self.pos];
        self.pos += 1;
        token
    }

    fn eat(&mut self, kind: ExplangToken) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: ExplangToken) -> Result<ExplangTok<'a>, ExplangSyntaxError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.error(format!("expected {kind:?}, found {:?}", self.current())))
        }
    }

    fn error(&self, message: String) -> ExplangSyntaxError {
        ExplangSyntaxError {
            pos: self.token_pos(),
            message,
        }
    }

    fn parse_ternary(&mut self) -> Result<Expr, ExplangSyntaxError> {
        let cond = self.parse_or()?;
        if self.eat(ExplangToken::Question) {
            let then = self.parse_ternary()?;
            self.expect(ExplangToken::Colon)?;
            let alt = self.parse_ternary()?;
            Ok(Expr::Ternary(Box::new(cond), Box::new(then), Box::new(alt)))
        } else {
            Ok(cond)
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ExplangSyntaxError> {
        let mut lhs = self.parse_and()?;
        while self.eat(ExplangToken::OrOr) {
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ExplangSyntaxError> {
        let mut lhs = self.parse_equality()?;
        while self.eat(ExplangToken::AndAnd) {
            let rhs = self.parse_equality()?;
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, ExplangSyntaxError> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.current() {
                ExplangToken::EqEq => BinOp::Eq,
                ExplangToken::NotEq => BinOp::NotEq,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_relational()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr, ExplangSyntaxError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.current() {
                ExplangToken::Lt => BinOp::Lt,
                ExplangToken::LtEq => BinOp::LtEq,
                ExplangToken::Gt => BinOp::Gt,
                ExplangToken::GtEq => BinOp::GtEq,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, ExplangSyntaxError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.current() {
                ExplangToken::Plus => BinOp::Add,
                ExplangToken::Minus => BinOp::Sub,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ExplangSyntaxError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current() {
                ExplangToken::Star => BinOp::Mul,
                ExplangToken::Slash => BinOp::Div,
                ExplangToken::Percent => BinOp::Mod,
                _ => break,
            };
            self.bump();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExplangSyntaxError> {
        if self.eat(ExplangToken::Bang) {
            Ok(Expr::Unary(UnOp::Not, Box::new(self.parse_unary()?)))
        } else if self.eat(ExplangToken::Minus) {
            Ok(Expr::Unary(UnOp::Neg, Box::new(self.parse_unary()?)))
        } else {
            self.parse_primary()
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExplangSyntaxError> {
        match self.current() {
            ExplangToken::Ident => Ok(Expr::Path(self.parse_path()?)),
            ExplangToken::Integer => {
                let tok = self.bump();
                let value = tok
                    .text
                    .parse()
                    .map_err(|_| self.error(format!("invalid integer literal {:?}", tok.text)))?;
                Ok(Expr::Literal(Literal::Int(value)))
            }
            ExplangToken::Float => {
                let tok = self.bump();
                let value = tok
                    .text
                    .parse()
                    .map_err(|_| self.error(format!("invalid float literal {:?}", tok.text)))?;
                Ok(Expr::Literal(Literal::Float(value)))
            }
            ExplangToken::StringLiteral => {
                let tok = self.bump();
                let inner = &tok.text[1..tok.text.len() - 1];
                Ok(Expr::Literal(Literal::Str(inner.to_owned())))
            }
            ExplangToken::True => {
                self.bump();
                Ok(Expr::Literal(Literal::Bool(true)))
            }
            ExplangToken::False => {
                self.bump();
                Ok(Expr::Literal(Literal::Bool(false)))
            }
            ExplangToken::Null => {
                self.bump();
                Ok(Expr::Literal(Literal::Null))
            }
            ExplangToken::LParen => {
                self.bump();
                let inner = self.parse_ternary()?;
                self.expect(ExplangToken::RParen)?;
                Ok(inner)
            }
            ExplangToken::LBracket => {
                self.bump();
                let mut items = Vec::new();
                if !self.at(ExplangToken::RBracket) {
                    loop {
                        items.push(self.parse_ternary()?);
                        if !self.eat(ExplangToken::Comma) {
                            break;
                        }
                    }
                }
                self.expect(ExplangToken::RBracket)?;
                Ok(Expr::List(items))
            }
            ExplangToken::LBrace => {
                self.bump();
                let mut entries = Vec::new();
                if !self.at(ExplangToken::RBrace) {
                    loop {
                        let key = self.parse_ternary()?;
                        self.expect(ExplangToken::Colon)?;
                        let value = self.parse_ternary()?;
                        entries.push((key, value));
                        if !self.eat(ExplangToken::Comma) {
                            break;
                        }
                    }
                }
                self.expect(ExplangToken::RBrace)?;
                Ok(Expr::Map(entries))
            }
            other => Err(self.error(format!("unexpected token {other:?}"))),
        }
    }

    fn parse_path(&mut self) -> Result<Path, ExplangSyntaxError> {
        let root_pos = self.token_pos();
        let root_tok = self.expect(ExplangToken::Ident)?;
        let mut segments = Vec::new();

        if self.at(ExplangToken::LParen) {
            let args = self.parse_call_args()?;
            segments.push((
                Segment::Call {
                    name: root_tok.text.to_owned(),
                    args,
                },
                root_pos,
            ));
        } else {
            segments.push((Segment::Root(root_tok.text.to_owned()), root_pos));
        }

        loop {
            match self.current() {
                ExplangToken::Dot => {
                    self.bump();
                    let seg_pos = self.token_pos();
                    let name_tok = self.expect(ExplangToken::Ident)?;
                    if self.at(ExplangToken::LParen) {
                        let args = self.parse_call_args()?;
                        segments.push((
                            Segment::Call {
                                name: name_tok.text.to_owned(),
                                args,
                            },
                            seg_pos,
                        ));
                    } else {
                        segments.push((Segment::Field(name_tok.text.to_owned()), seg_pos));
                    }
                }
                ExplangToken::LBracket => {
                    let seg_pos = self.token_pos();
                    self.bump();
                    let start = u32::from(self.tokens[self.pos].range.start());
                    let index_expr = self.parse_ternary()?;
                    let end = u32::from(self.tokens[self.pos - 1].range.end());
                    self.expect(ExplangToken::RBracket)?;
                    segments.push((
                        Segment::Index {
                            text: self.source[start as usize..end as usize].to_owned(),
                            expr: Box::new(index_expr),
                        },
                        seg_pos,
                    ));
                }
                _ => break,
            }
        }

        Ok(Path { segments })
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ExplangSyntaxError> {
        self.expect(ExplangToken::LParen)?;
        let mut args = Vec::new();
        if !self.at(ExplangToken::RParen) {
            loop {
                args.push(self.parse_ternary()?);
                if !self.eat(ExplangToken::Comma) {
                    break;
                }
            }
        }
        self.expect(ExplangToken::RParen)?;
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explang::ast::StepKind;

    fn parse(src: &str) -> Expr {
        Parser::new(src, Position::START).parse().unwrap()
    }

    #[test]
    fn parses_simple_dotted_path() {
        let expr = parse("user.profile.name");
        let Expr::Path(path) = expr else {
            panic!("expected path")
        };
        let steps = path.to_steps();
        assert_eq!(steps[0].kind, StepKind::Root);
        assert_eq!(steps[0].value, "user");
        assert_eq!(steps[2].value, "name");
    }

    #[test]
    fn parses_index_and_call() {
        let expr = parse("items[0].first().upper()");
        let Expr::Path(path) = expr else {
            panic!("expected path")
        };
        assert_eq!(path.segments.len(), 4);
    }

    #[test]
    fn parses_binary_and_ternary() {
        let expr = parse("active ? 1 : 0");
        assert!(matches!(expr, Expr::Ternary(..)));
    }

    #[test]
    fn parses_logical_precedence() {
        let expr = parse("a == 1 && b == 2 || c");
        // top level should be Or, since || binds loosest
        assert!(matches!(expr, Expr::Binary(BinOp::Or, _, _)));
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(Parser::new("a b", Position::START).parse().is_err());
    }
}
