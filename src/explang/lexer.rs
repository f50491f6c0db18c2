// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Tokenizer for the embedded CEL-subset expression language (spec §4.5).
//! Independent of the SQL tokenizer: explang sees only the raw text inside
//! a directive/eval comment, not the surrounding SQL.

use logos::Logos;
use rowan::{TextRange, TextSize};

#[derive(logos::Logos, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExplangToken {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+\.[0-9]+")]
    Float,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"'([^']|\\.)*'")]
    #[regex(r#""([^"]|\\.)*""#)]
    StringLiteral,

    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    Eof,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplangTok<'a> {
    pub kind: ExplangToken,
    pub text: &'a str,
    pub range: TextRange,
}

/// Tokenizes `input`, dropping whitespace and appending a synthetic
/// [`ExplangToken::Eof`]. Unlike the SQL tokenizer, explang has no trivia
/// that needs preserving for reconstruction — the expression's `source`
/// string is kept verbatim alongside the parsed steps (spec §3).
pub fn tokenize_explang(input: &str) -> Vec<ExplangTok<'_>> {
    let mut out = Vec::new();
    let mut lexer = ExplangToken::lexer(input);
    while let Some(result) = lexer.next() {
        let kind = result.unwrap_or(ExplangToken::Error);
        if kind == ExplangToken::Whitespace {
            continue;
        }
        let span = lexer.span();
        out.push(ExplangTok {
            kind,
            text: lexer.slice(),
            range: TextRange::new(
                TextSize::try_from(span.start).unwrap(),
                TextSize::try_from(span.end).unwrap(),
            ),
        });
    }
    let end = TextSize::try_from(input.len()).unwrap();
    out.push(ExplangTok {
        kind: ExplangToken::Eof,
        text: "",
        range: TextRange::new(end, end),
    });
    out
}
