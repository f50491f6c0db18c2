// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Marker/checkpoint parser over a token stream, building a lossless
//! [`rowan`] tree (spec §2, component C). Mirrors the grammar functions in
//! [`crate::grammar`] and [`crate::directive`], which only ever see this API
//! and never touch the lexer directly.

use crate::lexer::{PositionedToken, TokenKind};
use crate::position::Position;
use crate::syntax::{SyntaxKind, SyntaxNode};
use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};

/// Parser-level syntax error, accumulated rather than raised: a malformed
/// statement still produces a best-effort tree (spec §4.3).
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("unknown statement kind")]
    UnknownStatement,
    #[error("missing required clause: {0}")]
    MissingRequiredClause(&'static str),
    #[error("unclosed parenthesis")]
    UnclosedParen,
    #[error("expected {expected}, found {found}")]
    Expected { expected: String, found: String },
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("{pos}: {error}")]
pub struct ParserError {
    pub pos: Position,
    pub error: SyntaxError,
}

/// Output of a parse: the lossless tree plus whatever errors were
/// accumulated along the way.
pub struct Parse {
    green: GreenNode,
    pub errors: Vec<ParserError>,
}

impl Parse {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct Parser<'a> {
    tokens: Vec<PositionedToken<'a>>,
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<ParserError>,
}

impl<'a> Parser<'a> {
    /// Builds a parser over an already-tokenized input. Tokenizing is
    /// component A's job and can fail outright (spec §7); by the time a
    /// `Parser` exists, the token stream is assumed well-formed lexically.
    pub fn new(tokens: Vec<PositionedToken<'a>>) -> Self {
        let mut builder = GreenNodeBuilder::new();
        builder.start_node(SyntaxKind::Root.into());
        Self {
            tokens,
            pos: 0,
            builder,
            errors: Vec::new(),
        }
    }

    /// Pushes every leading trivia token (whitespace, comments, directive
    /// comments) onto whichever node is currently open, without consuming
    /// the next significant token. Directive comments are trivia at the
    /// token-stream level (spec §4.3) but still end up in the tree, attached
    /// to whatever clause they lexically sit inside.
    fn bump_trivia(&mut self) {
        while self.tokens[self.pos].kind.is_trivia() {
            self.bump_raw();
        }
    }

    fn bump_raw(&mut self) {
        let token = &self.tokens[self.pos];
        self.builder
            .token(SyntaxKind::from(token.kind).into(), token.text);
        self.pos += 1;
    }

    /// The next significant token kind, flushing any pending trivia into the
    /// tree as a side effect.
    pub fn current(&mut self) -> TokenKind {
        self.bump_trivia();
        self.tokens[self.pos].kind
    }

    pub fn current_text(&mut self) -> &'a str {
        self.bump_trivia();
        self.tokens[self.pos].text
    }

    pub fn current_pos(&mut self) -> Position {
        self.bump_trivia();
        self.tokens[self.pos].pos
    }

    /// Looks `n` significant tokens ahead without consuming or committing
    /// anything, for the handful of two-token decisions the grammar needs
    /// (`GROUP BY`, `FOR UPDATE` vs. `FOR SHARE`, ...).
    pub fn nth_significant(&self, n: usize) -> TokenKind {
        let mut idx = self.pos;
        let mut seen = 0;
        loop {
            let kind = self.tokens[idx].kind;
            if kind.is_trivia() {
                idx += 1;
                continue;
            }
            if seen == n {
                return kind;
            }
            seen += 1;
            idx += 1;
        }
    }

    pub fn at(&mut self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    pub fn at_eof(&mut self) -> bool {
        self.at(TokenKind::Eof)
    }

    /// Bumps whatever the current significant token is, without checking
    /// its kind.
    pub fn bump_any(&mut self) {
        self.bump_trivia();
        if self.tokens[self.pos].kind != TokenKind::Eof {
            self.bump_raw();
        }
    }

    /// Bumps the current token, asserting it is `kind`. Callers must have
    /// already checked with [`Parser::at`].
    pub fn bump(&mut self, kind: TokenKind) {
        debug_assert_eq!(self.current(), kind);
        self.bump_any();
    }

    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump_any();
            true
        } else {
            false
        }
    }

    /// Bumps `kind` if present, otherwise records a [`SyntaxError::Expected`]
    /// at the current position and leaves the token stream untouched.
    pub fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            let found = self.current();
            self.error(SyntaxError::Expected {
                expected: format!("{kind:?}"),
                found: format!("{found:?}"),
            });
            false
        }
    }

    pub fn error(&mut self, error: SyntaxError) {
        let pos = self.current_pos();
        self.errors.push(ParserError { pos, error });
    }

    pub fn start(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind.into());
    }

    pub fn finish(&mut self) {
        self.builder.finish_node();
    }

    pub fn checkpoint(&mut self) -> Checkpoint {
        self.bump_trivia();
        self.builder.checkpoint()
    }

    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    /// Flushes trailing trivia, closes the implicit root node, and returns
    /// the finished tree.
    pub fn build(mut self) -> Parse {
        self.bump_trivia();
        self.builder.finish_node();
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(input: &str, f: impl FnOnce(&mut Parser)) -> Parse {
        let tokens = tokenize(input).unwrap();
        let mut parser = Parser::new(tokens);
        f(&mut parser);
        parser.build()
    }

    #[test]
    fn bumps_plain_tokens_into_a_node() {
        let parse = parse("foo", |p| {
            p.start(SyntaxKind::Expression);
            p.bump(TokenKind::Ident);
            p.finish();
        });
        assert!(parse.ok());
        let root = parse.syntax();
        assert_eq!(format!("{root:?}"), "Root@0..3");
    }

    #[test]
    fn trivia_is_attached_to_the_open_node() {
        let parse = parse("  foo", |p| {
            p.start(SyntaxKind::Expression);
            p.bump(TokenKind::Ident);
            p.finish();
        });
        assert!(parse.ok());
        let expr = parse
            .syntax()
            .children()
            .find(|n| n.kind() == SyntaxKind::Expression)
            .unwrap();
        assert_eq!(expr.text_range(), rowan::TextRange::new(0.into(), 5.into()));
    }

    #[test]
    fn expect_records_error_without_consuming() {
        let parse = parse("foo", |p| {
            p.start(SyntaxKind::Expression);
            p.expect(TokenKind::Integer);
            p.finish();
        });
        assert!(!parse.ok());
        assert_eq!(parse.errors[0].error, SyntaxError::Expected {
            expected: format!("{:?}", TokenKind::Integer),
            found: format!("{:?}", TokenKind::Ident),
        });
    }

    #[test]
    fn checkpoint_wraps_already_bumped_tokens() {
        let parse = parse("1 + 2", |p| {
            let checkpoint = p.checkpoint();
            p.bump(TokenKind::Integer);
            p.bump_any(); // '+'
            p.bump(TokenKind::Integer);
            p.start_node_at(checkpoint, SyntaxKind::Expression);
            p.finish();
        });
        assert!(parse.ok());
        let expr = parse
            .syntax()
            .children()
            .find(|n| n.kind() == SyntaxKind::Expression)
            .unwrap();
        assert_eq!(expr.text_range(), rowan::TextRange::new(0.into(), 5.into()));
    }
}
