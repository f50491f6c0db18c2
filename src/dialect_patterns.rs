// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Dialect-specific SQL idiom detection (spec §4.9, component I): which
//! surface syntax a statement used for type casts, boolean literals, and
//! pagination, so a `/*@ dialect */` directive can rewrite between them.

use crate::dialect::Dialect;
use crate::lexer::{PositionedToken, TokenKind};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CastStyle {
    /// `expr::type`
    DoubleColon,
    /// `CAST(expr AS type)`
    CastFunction,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BooleanLiteralStyle {
    /// `TRUE` / `FALSE`
    Keyword,
    /// `1` / `0`
    Integer,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PaginationStyle {
    /// `LIMIT n OFFSET m`
    LimitOffset,
    /// `OFFSET m ROWS FETCH NEXT n ROWS ONLY`
    OffsetFetch,
}

/// The idiom a dialect is expected to use for each of the conversions the
/// engine knows about. Postgres/MySQL/SQLite share the `LIMIT`/`TRUE`
/// idioms; only the generic "no dialect pinned" default and any dialect
/// requiring the SQL-standard `FETCH` form diverge.
pub fn cast_style(dialect: Dialect) -> CastStyle {
    match dialect {
        Dialect::Postgres => CastStyle::DoubleColon,
        Dialect::Mysql | Dialect::Sqlite | Dialect::Default => CastStyle::CastFunction,
    }
}

pub fn boolean_literal_style(dialect: Dialect) -> BooleanLiteralStyle {
    match dialect {
        Dialect::Postgres | Dialect::Sqlite | Dialect::Default => BooleanLiteralStyle::Keyword,
        Dialect::Mysql => BooleanLiteralStyle::Integer,
    }
}

/// Postgres/MySQL/SQLite all accept `LIMIT n OFFSET m`; only the generic
/// "no dialect pinned" default falls back to the SQL-standard `FETCH` form,
/// since it can't assume any vendor extension is available.
pub fn pagination_style(dialect: Dialect) -> PaginationStyle {
    match dialect {
        Dialect::Postgres | Dialect::Mysql | Dialect::Sqlite => PaginationStyle::LimitOffset,
        Dialect::Default => PaginationStyle::OffsetFetch,
    }
}

/// Renders a type cast in the target dialect's idiom, used when lowering
/// an explicit `/*@ dialect */` branch into parallel `EMIT_STATIC` arms.
pub fn render_cast(style: CastStyle, expr: &str, ty: &str) -> String {
    match style {
        CastStyle::DoubleColon => format!("{expr}::{ty}"),
        CastStyle::CastFunction => format!("CAST({expr} AS {ty})"),
    }
}

pub fn render_boolean_literal(style: BooleanLiteralStyle, value: bool) -> String {
    match (style, value) {
        (BooleanLiteralStyle::Keyword, true) => "TRUE".to_owned(),
        (BooleanLiteralStyle::Keyword, false) => "FALSE".to_owned(),
        (BooleanLiteralStyle::Integer, true) => "1".to_owned(),
        (BooleanLiteralStyle::Integer, false) => "0".to_owned(),
    }
}

pub fn render_pagination(style: PaginationStyle, limit_param: &str, offset_param: &str) -> String {
    match style {
        PaginationStyle::LimitOffset => format!(" LIMIT {limit_param} OFFSET {offset_param}"),
        PaginationStyle::OffsetFetch => {
            format!(" OFFSET {offset_param} ROWS FETCH NEXT {limit_param} ROWS ONLY")
        }
    }
}

/// A dialect-divergent fragment found following a `/*@ ... */` directive:
/// which of the three idioms the detector recognizes, and the operand text
/// captured verbatim from the source.
#[derive(Debug, Clone, PartialEq)]
pub enum DialectConversion {
    Cast { expr: String, ty: String },
    BooleanLiteral { value: bool },
    Pagination { limit: String, offset: String },
}

impl DialectConversion {
    pub fn selector(&self) -> &'static str {
        match self {
            DialectConversion::Cast { .. } => "cast",
            DialectConversion::BooleanLiteral { .. } => "boolean_literal",
            DialectConversion::Pagination { .. } => "pagination",
        }
    }

    /// Renders the fragment in `dialect`'s idiom.
    pub fn render(&self, dialect: Dialect) -> String {
        match self {
            DialectConversion::Cast { expr, ty } => render_cast(cast_style(dialect), expr, ty),
            DialectConversion::BooleanLiteral { value } => {
                render_boolean_literal(boolean_literal_style(dialect), *value)
            }
            DialectConversion::Pagination { limit, offset } => {
                render_pagination(pagination_style(dialect), limit, offset)
            }
        }
    }
}

fn next_significant(tokens: &[PositionedToken], mut idx: usize) -> usize {
    while tokens.get(idx).map_or(false, |t| t.kind.is_trivia()) {
        idx += 1;
    }
    idx
}

/// Scans forward from `start` (the token right after a `/*@ ... */`
/// directive, skipping trivia) for one of the three dialect-divergent
/// idioms the detector recognizes: a boolean literal, a `LIMIT n OFFSET m`
/// pagination tail, or an `expr::type` cast.
///
/// Returns the detected conversion together with how many raw tokens
/// (starting at `start`) it consumed, so the caller can skip them rather
/// than re-emitting them as plain text.
pub fn detect(tokens: &[PositionedToken], start: usize) -> Option<(DialectConversion, usize)> {
    let idx = next_significant(tokens, start);
    let first = tokens.get(idx)?;

    match first.kind {
        TokenKind::TrueKw => Some((DialectConversion::BooleanLiteral { value: true }, idx + 1 - start)),
        TokenKind::FalseKw => Some((DialectConversion::BooleanLiteral { value: false }, idx + 1 - start)),
        TokenKind::LimitKw => {
            let limit_idx = next_significant(tokens, idx + 1);
            let limit_tok = tokens.get(limit_idx)?;
            let offset_kw_idx = next_significant(tokens, limit_idx + 1);
            let offset_kw = tokens.get(offset_kw_idx)?;
            if offset_kw.kind != TokenKind::OffsetKw {
                return None;
            }
            let offset_idx = next_significant(tokens, offset_kw_idx + 1);
            let offset_tok = tokens.get(offset_idx)?;
            Some((
                DialectConversion::Pagination {
                    limit: limit_tok.text.to_owned(),
                    offset: offset_tok.text.to_owned(),
                },
                offset_idx + 1 - start,
            ))
        }
        _ => {
            let colon_idx = next_significant(tokens, idx + 1);
            let colon = tokens.get(colon_idx)?;
            if colon.kind != TokenKind::DoubleColon {
                return None;
            }
            let type_idx = next_significant(tokens, colon_idx + 1);
            let type_tok = tokens.get(type_idx)?;
            Some((
                DialectConversion::Cast {
                    expr: first.text.to_owned(),
                    ty: type_tok.text.to_owned(),
                },
                type_idx + 1 - start,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_uses_double_colon_casts() {
        assert_eq!(cast_style(Dialect::Postgres), CastStyle::DoubleColon);
        assert_eq!(render_cast(CastStyle::DoubleColon, "x", "int"), "x::int");
    }

    #[test]
    fn mysql_uses_cast_function_and_integer_booleans() {
        assert_eq!(cast_style(Dialect::Mysql), CastStyle::CastFunction);
        assert_eq!(boolean_literal_style(Dialect::Mysql), BooleanLiteralStyle::Integer);
        assert_eq!(render_boolean_literal(BooleanLiteralStyle::Integer, true), "1");
    }

    #[test]
    fn default_dialect_falls_back_to_standard_cast_function() {
        assert_eq!(cast_style(Dialect::Default), CastStyle::CastFunction);
    }

    #[test]
    fn limit_offset_pagination_renders_both_clauses() {
        let rendered = render_pagination(PaginationStyle::LimitOffset, ":limit", ":offset");
        assert_eq!(rendered, " LIMIT :limit OFFSET :offset");
    }

    #[test]
    fn default_dialect_paginates_with_offset_fetch() {
        assert_eq!(pagination_style(Dialect::Default), PaginationStyle::OffsetFetch);
        assert_eq!(
            render_pagination(PaginationStyle::OffsetFetch, ":limit", ":offset"),
            " OFFSET :offset ROWS FETCH NEXT :limit ROWS ONLY"
        );
    }

    fn tokens(source: &str) -> Vec<PositionedToken> {
        crate::lexer::tokenize(source).unwrap()
    }

    #[test]
    fn detects_boolean_literal() {
        let t = tokens("TRUE");
        let (conversion, consumed) = detect(&t, 0).unwrap();
        assert_eq!(conversion, DialectConversion::BooleanLiteral { value: true });
        assert_eq!(consumed, 1);
        assert_eq!(conversion.selector(), "boolean_literal");
        assert_eq!(conversion.render(Dialect::Mysql), "1");
    }

    #[test]
    fn detects_cast() {
        let t = tokens("active::boolean");
        let (conversion, consumed) = detect(&t, 0).unwrap();
        assert_eq!(
            conversion,
            DialectConversion::Cast {
                expr: "active".to_owned(),
                ty: "boolean".to_owned(),
            }
        );
        assert_eq!(consumed, 3);
        assert_eq!(conversion.render(Dialect::Mysql), "CAST(active AS boolean)");
    }

    #[test]
    fn detects_pagination() {
        let t = tokens("LIMIT 10 OFFSET 20");
        let (conversion, consumed) = detect(&t, 0).unwrap();
        assert_eq!(
            conversion,
            DialectConversion::Pagination {
                limit: "10".to_owned(),
                offset: "20".to_owned(),
            }
        );
        assert_eq!(consumed, 7);
        assert_eq!(conversion.render(Dialect::Default), " OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY");
    }

    #[test]
    fn no_recognizable_conversion_returns_none() {
        let t = tokens("users");
        assert!(detect(&t, 0).is_none());
    }
}
