// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Streaming lexical analysis over SQL template source text (spec §4.1).

mod token;

use crate::position::{LineIndex, Position};
use logos::Logos;
use rowan::{TextRange, TextSize};
use std::ops::Range as StdRange;
pub use token::{TokenCategory, TokenKind};

#[derive(Debug)]
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let kind = result.unwrap_or(TokenKind::Error);
        let text = self.inner.slice();

        let range = {
            let StdRange { start, end } = self.inner.span();
            let start = TextSize::try_from(start).unwrap();
            let end = TextSize::try_from(end).unwrap();

            TextRange::new(start, end)
        };

        Some(Self::Item { kind, text, range })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub range: TextRange,
}

/// A token with its source position stamped on, ready for the directive
/// parser and statement parser. This is the output of "component A" in
/// spec §2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub range: TextRange,
    pub pos: Position,
}

/// Runs the lexer to completion over `input`, stamping every token with its
/// line/column position and appending a synthetic [`TokenKind::Eof`].
///
/// Fails with [`TokenizeError`] on the first lexer-level error token (an
/// unterminated quote or block comment, per spec §4.1/§7).
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, TokenizeError> {
    let mut out = Vec::new();
    let mut line_index = LineIndex::default();

    for token in Lexer::new(input) {
        let pos = line_index.position(u32::from(token.range.start()));
        line_index.advance(token.text);

        if token.kind == TokenKind::Error {
            return Err(TokenizeError {
                pos,
                text: token.text.to_owned(),
            });
        }

        out.push(PositionedToken {
            kind: token.kind,
            text: token.text,
            range: token.range,
            pos,
        });
    }

    let eof_offset = u32::try_from(input.len()).unwrap_or(u32::MAX);
    out.push(PositionedToken {
        kind: TokenKind::Eof,
        text: "",
        range: TextRange::new(TextSize::from(eof_offset), TextSize::from(eof_offset)),
        pos: line_index.position(eof_offset),
    });

    Ok(out)
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("unrecognized token {text:?} at {pos}")]
pub struct TokenizeError {
    pub pos: Position,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_simple_select() {
        let tokens = tokenize("SELECT id FROM users").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::SelectKw,
                TokenKind::Whitespace,
                TokenKind::Ident,
                TokenKind::Whitespace,
                TokenKind::FromKw,
                TokenKind::Whitespace,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn recognizes_eval_directive_comment() {
        let tokens = tokenize("/*= active */true").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::EvalComment);
        assert_eq!(tokens[0].text, "/*= active */");
    }

    #[test]
    fn recognizes_block_directive_comment() {
        let tokens = tokenize("/*# if x */").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::DirectiveComment);
    }

    #[test]
    fn recognizes_dialect_comment() {
        let tokens = tokenize("/*@ postgres */").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::DialectComment);
    }

    #[test]
    fn plain_block_comment_is_not_a_directive() {
        let tokens = tokenize("/* just a comment */").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::BlockComment);
    }

    #[test]
    fn tracks_positions_across_lines() {
        let tokens = tokenize("SELECT 1\nFROM t").unwrap();
        let from = tokens.iter().find(|t| t.kind == TokenKind::FromKw).unwrap();
        assert_eq!(from.pos, Position::new(2, 1, 9));
    }

    #[test]
    fn dollar_quoted_string_is_a_literal() {
        let tokens = tokenize("$$hello world$$").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::DollarQuoted);
        assert_eq!(tokens[0].text, "$$hello world$$");
    }

    #[test]
    fn tagged_dollar_quoted_string() {
        let tokens = tokenize("$tag$it's fine$tag$").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::DollarQuoted);
        assert_eq!(tokens[0].text, "$tag$it's fine$tag$");
    }
}
