// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! `SELECT` clause grammar (spec §4.8's SELECT-tail pagination is layered
//! on top of this by [`crate::instructions`], not here).

use super::clause_body;
use crate::lexer::TokenKind;
use crate::parser::{Parser, SyntaxError};
use crate::syntax::SyntaxKind;

pub fn parse_select(p: &mut Parser) {
    p.start(SyntaxKind::SelectStmt);

    p.start(SyntaxKind::SelectClause);
    p.bump(TokenKind::SelectKw);
    clause_body(p, |k| k == TokenKind::FromKw);
    p.finish();

    if !p.expect(TokenKind::FromKw) {
        p.error(SyntaxError::MissingRequiredClause("FROM"));
        p.finish();
        return;
    }
    p.start(SyntaxKind::FromClause);
    clause_body(p, at_post_from_clause_start);
    p.finish();

    if p.eat(TokenKind::WhereKw) {
        p.start(SyntaxKind::WhereClause);
        clause_body(p, at_post_where_clause_start);
        p.finish();
    }

    if p.current() == TokenKind::GroupKw {
        p.start(SyntaxKind::GroupByClause);
        p.bump(TokenKind::GroupKw);
        p.expect(TokenKind::ByKw);
        clause_body(p, at_post_group_by_clause_start);
        p.finish();
    }

    if p.eat(TokenKind::HavingKw) {
        p.start(SyntaxKind::HavingClause);
        clause_body(p, at_post_having_clause_start);
        p.finish();
    }

    if p.current() == TokenKind::OrderKw {
        p.start(SyntaxKind::OrderByClause);
        p.bump(TokenKind::OrderKw);
        p.expect(TokenKind::ByKw);
        clause_body(p, at_post_order_by_clause_start);
        p.finish();
    }

    if p.eat(TokenKind::LimitKw) {
        p.start(SyntaxKind::LimitClause);
        clause_body(p, |k| k == TokenKind::OffsetKw || k == TokenKind::ForKw);
        p.finish();
    }

    if p.eat(TokenKind::OffsetKw) {
        p.start(SyntaxKind::OffsetClause);
        clause_body(p, |k| k == TokenKind::ForKw);
        p.finish();
    }

    if p.current() == TokenKind::ForKw {
        p.start(SyntaxKind::ForUpdateClause);
        p.bump(TokenKind::ForKw);
        clause_body(p, |_| false);
        p.finish();
    }

    p.finish();
}

fn at_post_from_clause_start(k: TokenKind) -> bool {
    matches!(
        k,
        TokenKind::WhereKw
            | TokenKind::GroupKw
            | TokenKind::HavingKw
            | TokenKind::OrderKw
            | TokenKind::LimitKw
            | TokenKind::OffsetKw
            | TokenKind::ForKw
    )
}

fn at_post_where_clause_start(k: TokenKind) -> bool {
    matches!(
        k,
        TokenKind::GroupKw
            | TokenKind::HavingKw
            | TokenKind::OrderKw
            | TokenKind::LimitKw
            | TokenKind::OffsetKw
            | TokenKind::ForKw
    )
}

fn at_post_group_by_clause_start(k: TokenKind) -> bool {
    matches!(
        k,
        TokenKind::HavingKw
            | TokenKind::OrderKw
            | TokenKind::LimitKw
            | TokenKind::OffsetKw
            | TokenKind::ForKw
    )
}

fn at_post_having_clause_start(k: TokenKind) -> bool {
    matches!(
        k,
        TokenKind::OrderKw | TokenKind::LimitKw | TokenKind::OffsetKw | TokenKind::ForKw
    )
}

fn at_post_order_by_clause_start(k: TokenKind) -> bool {
    matches!(k, TokenKind::LimitKw | TokenKind::OffsetKw | TokenKind::ForKw)
}

#[cfg(test)]
mod tests {
    use crate::lexer::tokenize;
    use crate::parser::Parser;
    use crate::syntax::SyntaxKind;

    fn clauses(input: &str) -> Vec<SyntaxKind> {
        let tokens = tokenize(input).unwrap();
        let mut p = Parser::new(tokens);
        super::parse_select(&mut p);
        let parse = p.build();
        assert!(parse.ok());
        let stmt = parse
            .syntax()
            .children()
            .find(|n| n.kind() == SyntaxKind::SelectStmt)
            .unwrap();
        stmt.children().map(|n| n.kind()).collect()
    }

    #[test]
    fn minimal_select_has_select_and_from_only() {
        assert_eq!(
            clauses("SELECT id FROM users"),
            vec![SyntaxKind::SelectClause, SyntaxKind::FromClause]
        );
    }

    #[test]
    fn full_select_orders_clauses_correctly() {
        assert_eq!(
            clauses(
                "SELECT id FROM users WHERE active = true GROUP BY id HAVING count(*) > 1 ORDER BY id LIMIT 10 OFFSET 5 FOR UPDATE"
            ),
            vec![
                SyntaxKind::SelectClause,
                SyntaxKind::FromClause,
                SyntaxKind::WhereClause,
                SyntaxKind::GroupByClause,
                SyntaxKind::HavingClause,
                SyntaxKind::OrderByClause,
                SyntaxKind::LimitClause,
                SyntaxKind::OffsetClause,
                SyntaxKind::ForUpdateClause,
            ]
        );
    }
}
