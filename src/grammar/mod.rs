// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Statement grammar (spec §2, component C): classifies the statement kind
//! and carves the token stream into clause nodes, directive-transparently.
//! Mirrors the teacher's `grammar::dml`/`grammar::query` split between
//! query and data-modification statements.

mod delete;
mod insert;
mod select;
mod update;

use crate::lexer::TokenKind;
use crate::parser::{Parse, Parser, SyntaxError};
use crate::syntax::SyntaxKind;

pub fn parse(tokens: Vec<crate::lexer::PositionedToken>) -> Parse {
    let mut p = Parser::new(tokens);
    skip_with_clause(&mut p);

    match p.current() {
        TokenKind::SelectKw => select::parse_select(&mut p),
        TokenKind::InsertKw => insert::parse_insert(&mut p),
        TokenKind::UpdateKw => update::parse_update(&mut p),
        TokenKind::DeleteKw => delete::parse_delete(&mut p),
        _ => p.error(SyntaxError::UnknownStatement),
    }

    p.build()
}

/// `WITH name AS (...), ...` preceding the real statement. Parsed as one
/// opaque clause: the CTE bodies aren't needed by any downstream component,
/// only the fact that they precede the statement keyword.
fn skip_with_clause(p: &mut Parser) {
    if p.current() != TokenKind::WithKw {
        return;
    }
    p.start(SyntaxKind::WithClause);
    p.bump(TokenKind::WithKw);
    bump_clause_body(p, is_statement_start);
    p.finish();
}

fn is_statement_start(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::SelectKw | TokenKind::InsertKw | TokenKind::UpdateKw | TokenKind::DeleteKw
    )
}

/// Bumps tokens until `stop` matches the current significant token at
/// paren-depth zero, or EOF is reached. Parenthesized subqueries and
/// argument lists are swallowed whole so their keywords never look like
/// clause boundaries.
fn bump_clause_body(p: &mut Parser, stop: impl Fn(TokenKind) -> bool) {
    let mut depth = 0usize;
    loop {
        let kind = p.current();
        if kind == TokenKind::Eof {
            return;
        }
        if depth == 0 && stop(kind) {
            return;
        }
        match kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                if depth == 0 {
                    return;
                }
                depth -= 1;
            }
            _ => {}
        }
        p.bump_any();
    }
}

pub(crate) use bump_clause_body as clause_body;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::syntax::SyntaxKind;
    use expect_test::expect;

    fn parse_str(input: &str) -> Parse {
        parse(tokenize(input).unwrap())
    }

    #[test]
    fn select_statement_tree_shape() {
        let parse = parse_str("SELECT id FROM users");
        assert!(parse.ok());
        expect![[r#"Root@0..20"#]].assert_eq(&format!("{:?}", parse.syntax()));
    }

    #[test]
    fn classifies_select_statement() {
        let parse = parse_str("SELECT id FROM users WHERE active = true");
        assert!(parse.ok());
        let root = parse.syntax();
        assert!(root.children().any(|n| n.kind() == SyntaxKind::SelectStmt));
    }

    #[test]
    fn classifies_insert_statement() {
        let parse = parse_str("INSERT INTO users (id) VALUES (1)");
        assert!(parse.ok());
        assert!(parse
            .syntax()
            .children()
            .any(|n| n.kind() == SyntaxKind::InsertStmt));
    }

    #[test]
    fn with_clause_is_skipped_before_classification() {
        let parse = parse_str("WITH recent AS (SELECT 1) SELECT id FROM users");
        assert!(parse.ok());
        let root = parse.syntax();
        assert!(root.children().any(|n| n.kind() == SyntaxKind::WithClause));
        assert!(root.children().any(|n| n.kind() == SyntaxKind::SelectStmt));
    }

    #[test]
    fn unknown_statement_kind_is_an_error() {
        let parse = parse_str("VACUUM users");
        assert!(!parse.ok());
        assert_eq!(parse.errors[0].error, SyntaxError::UnknownStatement);
    }

    #[test]
    fn paren_depth_keeps_subquery_keywords_out_of_clause_boundaries() {
        let parse = parse_str("SELECT id FROM users WHERE id IN (SELECT user_id FROM orders)");
        assert!(parse.ok());
        let root = parse.syntax();
        let select_stmt = root
            .children()
            .find(|n| n.kind() == SyntaxKind::SelectStmt)
            .unwrap();
        let where_clause = select_stmt
            .children()
            .find(|n| n.kind() == SyntaxKind::WhereClause)
            .unwrap();
        assert!(where_clause.text().to_string().contains("FROM orders"));
    }
}
