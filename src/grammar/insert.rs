// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! `INSERT INTO ... (cols) VALUES (...) | SELECT ... [RETURNING ...]`.

use super::clause_body;
use crate::lexer::TokenKind;
use crate::parser::{Parser, SyntaxError};
use crate::syntax::SyntaxKind;

pub fn parse_insert(p: &mut Parser) {
    p.start(SyntaxKind::InsertStmt);
    p.bump(TokenKind::InsertKw);
    p.expect(TokenKind::IntoKw);

    p.start(SyntaxKind::IntoClause);
    clause_body(p, |k| k == TokenKind::LParen);
    p.finish();

    if p.current() == TokenKind::LParen {
        p.start(SyntaxKind::ColumnList);
        p.bump(TokenKind::LParen);
        clause_body(p, |_| false);
        p.expect(TokenKind::RParen);
        p.finish();
    }

    match p.current() {
        TokenKind::ValuesKw => {
            p.start(SyntaxKind::ValuesList);
            p.bump(TokenKind::ValuesKw);
            loop {
                if p.current() != TokenKind::LParen {
                    break;
                }
                p.start(SyntaxKind::ValueTuple);
                p.bump(TokenKind::LParen);
                clause_body(p, |_| false);
                p.expect(TokenKind::RParen);
                p.finish();
                if !p.eat(TokenKind::Comma) {
                    break;
                }
            }
            p.finish();
        }
        TokenKind::SelectKw => {
            p.start(SyntaxKind::SelectSource);
            clause_body(p, |k| k == TokenKind::ReturningKw);
            p.finish();
        }
        _ => p.error(SyntaxError::MissingRequiredClause("VALUES or SELECT")),
    }

    if p.eat(TokenKind::ReturningKw) {
        p.start(SyntaxKind::ReturningClause);
        clause_body(p, |_| false);
        p.finish();
    }

    p.finish();
}

#[cfg(test)]
mod tests {
    use crate::lexer::tokenize;
    use crate::parser::Parser;
    use crate::syntax::SyntaxKind;

    fn clauses(input: &str) -> Vec<SyntaxKind> {
        let tokens = tokenize(input).unwrap();
        let mut p = Parser::new(tokens);
        super::parse_insert(&mut p);
        let parse = p.build();
        assert!(parse.ok());
        let stmt = parse
            .syntax()
            .children()
            .find(|n| n.kind() == SyntaxKind::InsertStmt)
            .unwrap();
        stmt.children().map(|n| n.kind()).collect()
    }

    #[test]
    fn single_row_insert() {
        assert_eq!(
            clauses("INSERT INTO users (id, name) VALUES (1, 'a')"),
            vec![
                SyntaxKind::IntoClause,
                SyntaxKind::ColumnList,
                SyntaxKind::ValuesList
            ]
        );
    }

    #[test]
    fn bulk_insert_has_multiple_value_tuples() {
        let tokens = tokenize("INSERT INTO users (id) VALUES (1), (2), (3)").unwrap();
        let mut p = Parser::new(tokens);
        super::parse_insert(&mut p);
        let parse = p.build();
        assert!(parse.ok());
        let stmt = parse
            .syntax()
            .children()
            .find(|n| n.kind() == SyntaxKind::InsertStmt)
            .unwrap();
        let values = stmt
            .children()
            .find(|n| n.kind() == SyntaxKind::ValuesList)
            .unwrap();
        let tuples: Vec<_> = values
            .children()
            .filter(|n| n.kind() == SyntaxKind::ValueTuple)
            .collect();
        assert_eq!(tuples.len(), 3);
    }

    #[test]
    fn insert_with_returning_clause() {
        assert_eq!(
            clauses("INSERT INTO users (id) VALUES (1) RETURNING id"),
            vec![
                SyntaxKind::IntoClause,
                SyntaxKind::ColumnList,
                SyntaxKind::ValuesList,
                SyntaxKind::ReturningClause
            ]
        );
    }

    #[test]
    fn insert_from_select_source() {
        assert_eq!(
            clauses("INSERT INTO users (id) SELECT id FROM staging_users"),
            vec![SyntaxKind::IntoClause, SyntaxKind::ColumnList, SyntaxKind::SelectSource]
        );
    }
}
