// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Token definition for the [`logos`] lexer.

use std::fmt;

/// Lexical token kinds recognized by the SQL-template tokenizer (spec §4.1).
///
/// This is the *internal*, grammar-facing token set: it distinguishes
/// individual keywords so the statement parser can match on them directly.
/// [`TokenKind::category`] collapses this down to the closed, public token
/// kind set of spec §3 (`keyword | identifier | literal | operator | ...`).
#[derive(logos::Logos, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"--[^\n]*")]
    LineComment,

    /// `/*# ... */` — block/loop directive.
    #[regex(r"/\*#([^*]|\*[^/])*\*/", priority = 20)]
    DirectiveComment,

    /// `/*= ... */` — variable-substitution directive.
    #[regex(r"/\*=([^*]|\*[^/])*\*/", priority = 20)]
    EvalComment,

    /// `/*@ ... */` — dialect selector.
    #[regex(r"/\*@([^*]|\*[^/])*\*/", priority = 20)]
    DialectComment,

    /// Any other `/* ... */` block comment; never interpreted as a directive.
    #[regex(r"/\*([^*]|\*[^/])*\*/", priority = 1)]
    BlockComment,

    #[regex(r"[A-Za-z_][A-Za-z0-9_$]*")]
    Ident,

    #[regex(r#""([^"]|"")*""#)]
    QuotedIdent,

    #[regex(r"`([^`]|``)*`")]
    BacktickIdent,

    #[regex(r"[0-9]+\.[0-9]+")]
    Float,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"'([^']|'')*'")]
    StringLiteral,

    /// `$$ ... $$` or `$tag$ ... $tag$` (Postgres dollar-quoted string).
    #[token("$", lex_dollar_quote)]
    DollarQuoted,

    #[token(":")]
    Colon,

    #[token("::")]
    DoubleColon,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token(".")]
    Dot,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("=")]
    Eq,

    #[token("<>")]
    NotEq,

    #[token("!=")]
    NotEqBang,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Asterisk,

    #[token("/")]
    Slash,

    #[token("||")]
    Concat,

    #[token("select", ignore(case))]
    SelectKw,
    #[token("from", ignore(case))]
    FromKw,
    #[token("where", ignore(case))]
    WhereKw,
    #[token("group", ignore(case))]
    GroupKw,
    #[token("by", ignore(case))]
    ByKw,
    #[token("having", ignore(case))]
    HavingKw,
    #[token("order", ignore(case))]
    OrderKw,
    #[token("limit", ignore(case))]
    LimitKw,
    #[token("offset", ignore(case))]
    OffsetKw,
    #[token("insert", ignore(case))]
    InsertKw,
    #[token("into", ignore(case))]
    IntoKw,
    #[token("values", ignore(case))]
    ValuesKw,
    #[token("update", ignore(case))]
    UpdateKw,
    #[token("set", ignore(case))]
    SetKw,
    #[token("delete", ignore(case))]
    DeleteKw,
    #[token("returning", ignore(case))]
    ReturningKw,
    #[token("for", ignore(case))]
    ForKw,
    #[token("share", ignore(case))]
    ShareKw,
    #[token("with", ignore(case))]
    WithKw,
    #[token("as", ignore(case))]
    AsKw,
    #[token("join", ignore(case))]
    JoinKw,
    #[token("inner", ignore(case))]
    InnerKw,
    #[token("left", ignore(case))]
    LeftKw,
    #[token("outer", ignore(case))]
    OuterKw,
    #[token("on", ignore(case))]
    OnKw,
    #[token("and", priority = 100, ignore(case))]
    AndKw,
    #[token("or", priority = 100, ignore(case))]
    OrKw,
    #[token("not", ignore(case))]
    NotKw,
    #[token("null", ignore(case))]
    NullKw,
    #[token("true", ignore(case))]
    TrueKw,
    #[token("false", ignore(case))]
    FalseKw,
    #[token("cast", ignore(case))]
    CastKw,
    #[token("distinct", ignore(case))]
    DistinctKw,
    #[token("asc", ignore(case))]
    AscKw,
    #[token("desc", ignore(case))]
    DescKw,
    #[token("in", ignore(case))]
    InKw,
    #[token("like", ignore(case))]
    LikeKw,
    #[token("between", ignore(case))]
    BetweenKw,
    #[token("is", ignore(case))]
    IsKw,
    #[token("union", ignore(case))]
    UnionKw,
    #[token("all", ignore(case))]
    AllKw,

    /// Synthetic end-of-file marker, never produced by the logos lexer
    /// itself; appended by [`super::Lexer`] so the parser always has a
    /// lookahead token to compare against.
    Eof,

    Error,
}

/// Scans a dollar-quoted string starting right after the first `$` that was
/// already consumed by the `$` token rule. Returns `true` (and bumps the
/// lexer past the closing tag) on a well-formed dollar-quoted string.
fn lex_dollar_quote(lex: &mut logos::Lexer<TokenKind>) -> bool {
    let rest = lex.remainder();
    let Some(tag_end) = rest.find('$') else {
        return false;
    };
    let tag = &rest[..tag_end];
    if !tag.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return false;
    }

    let body_start = tag_end + 1;
    let closing = format!("${tag}$");
    match rest[body_start..].find(closing.as_str()) {
        Some(body_len) => {
            lex.bump(body_start + body_len + closing.len());
            true
        }
        None => false,
    }
}

/// The closed, public token-kind set of spec §3.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TokenCategory {
    Keyword,
    Identifier,
    NumericLiteral,
    StringLiteral,
    BooleanLiteral,
    NullLiteral,
    Operator,
    Punctuation,
    Whitespace,
    LineComment,
    BlockComment,
    DummyLiteral,
    Directive,
}

impl TokenKind {
    pub fn category(self) -> TokenCategory {
        use TokenCategory as C;
        match self {
            TokenKind::Whitespace => C::Whitespace,
            TokenKind::LineComment => C::LineComment,
            TokenKind::BlockComment => C::BlockComment,
            TokenKind::DirectiveComment | TokenKind::EvalComment | TokenKind::DialectComment => {
                C::Directive
            }
            TokenKind::Ident | TokenKind::QuotedIdent | TokenKind::BacktickIdent => C::Identifier,
            TokenKind::Integer | TokenKind::Float => C::NumericLiteral,
            TokenKind::StringLiteral | TokenKind::DollarQuoted => C::StringLiteral,
            TokenKind::TrueKw | TokenKind::FalseKw => C::BooleanLiteral,
            TokenKind::NullKw => C::NullLiteral,
            TokenKind::Colon
            | TokenKind::DoubleColon
            | TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::NotEqBang
            | TokenKind::LtEq
            | TokenKind::GtEq
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Asterisk
            | TokenKind::Slash
            | TokenKind::Concat => C::Operator,
            TokenKind::Comma
            | TokenKind::Semicolon
            | TokenKind::Dot
            | TokenKind::LParen
            | TokenKind::RParen => C::Punctuation,
            TokenKind::Eof | TokenKind::Error => C::Punctuation,
            _ => C::Keyword,
        }
    }

    /// Whether the token carries no semantic weight for clause-boundary
    /// detection: whitespace, comments, and (crucially) directive comments,
    /// which are "directive-transparent" per spec §4.3/§9.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::LineComment
                | TokenKind::BlockComment
                | TokenKind::DirectiveComment
                | TokenKind::EvalComment
                | TokenKind::DialectComment
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
