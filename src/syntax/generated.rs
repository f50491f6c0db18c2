// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

use crate::lexer::TokenKind;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::ToPrimitive;

/// Represents all possible kinds of syntax items the parser can process:
/// both token kinds (leaves) and node kinds (clauses, statements,
/// expressions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, FromPrimitive, ToPrimitive)]
#[repr(u16)]
pub enum SyntaxKind {
    Whitespace,
    LineComment,
    BlockComment,
    DirectiveComment,
    EvalComment,
    DialectComment,
    Keyword,
    Ident,
    IdentGroup,
    Integer,
    Float,
    StringLiteral,
    DollarQuoted,
    BooleanLiteral,
    NullLiteral,
    Colon,
    DoubleColon,
    Comma,
    Semicolon,
    Dot,
    LParen,
    RParen,
    ArithmeticOp,
    ComparisonOp,
    LogicOp,
    Concat,
    Error,

    /// The root node wrapping a single statement plus leading/trailing trivia.
    Root,
    WithClause,
    SelectStmt,
    InsertStmt,
    UpdateStmt,
    DeleteStmt,

    SelectClause,
    ColumnExpr,
    FromClause,
    JoinClause,
    WhereClause,
    GroupByClause,
    HavingClause,
    OrderByClause,
    LimitClause,
    OffsetClause,
    ForUpdateClause,

    IntoClause,
    TableClause,
    ColumnList,
    ValuesList,
    ValueTuple,
    SelectSource,
    ReturningClause,

    SetClause,
    Assignment,

    Expression,
    ArgumentList,
    FunctionInvocation,
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        rowan::SyntaxKind(kind.to_u16().unwrap())
    }
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Whitespace => SyntaxKind::Whitespace,
            TokenKind::LineComment => SyntaxKind::LineComment,
            TokenKind::BlockComment => SyntaxKind::BlockComment,
            TokenKind::DirectiveComment => SyntaxKind::DirectiveComment,
            TokenKind::EvalComment => SyntaxKind::EvalComment,
            TokenKind::DialectComment => SyntaxKind::DialectComment,
            TokenKind::Ident | TokenKind::QuotedIdent | TokenKind::BacktickIdent => {
                SyntaxKind::Ident
            }
            TokenKind::Integer => SyntaxKind::Integer,
            TokenKind::Float => SyntaxKind::Float,
            TokenKind::StringLiteral => SyntaxKind::StringLiteral,
            TokenKind::DollarQuoted => SyntaxKind::DollarQuoted,
            TokenKind::TrueKw | TokenKind::FalseKw => SyntaxKind::BooleanLiteral,
            TokenKind::NullKw => SyntaxKind::NullLiteral,
            TokenKind::Colon => SyntaxKind::Colon,
            TokenKind::DoubleColon => SyntaxKind::DoubleColon,
            TokenKind::Comma => SyntaxKind::Comma,
            TokenKind::Semicolon => SyntaxKind::Semicolon,
            TokenKind::Dot => SyntaxKind::Dot,
            TokenKind::LParen => SyntaxKind::LParen,
            TokenKind::RParen => SyntaxKind::RParen,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Asterisk | TokenKind::Slash => {
                SyntaxKind::ArithmeticOp
            }
            TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::NotEqBang
            | TokenKind::LtEq
            | TokenKind::GtEq
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::LikeKw
            | TokenKind::InKw
            | TokenKind::BetweenKw
            | TokenKind::IsKw => SyntaxKind::ComparisonOp,
            TokenKind::AndKw | TokenKind::OrKw | TokenKind::NotKw => SyntaxKind::LogicOp,
            TokenKind::Concat => SyntaxKind::Concat,
            TokenKind::Error => SyntaxKind::Error,
            TokenKind::Eof => unreachable!("Eof is never bumped into the tree"),
            _ => SyntaxKind::Keyword,
        }
    }
}
