// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! `DELETE FROM table [WHERE ...] [RETURNING ...]`.

use super::clause_body;
use crate::lexer::TokenKind;
use crate::parser::{Parser, SyntaxError};
use crate::syntax::SyntaxKind;

pub fn parse_delete(p: &mut Parser) {
    p.start(SyntaxKind::DeleteStmt);
    p.bump(TokenKind::DeleteKw);

    if !p.expect(TokenKind::FromKw) {
        p.error(SyntaxError::MissingRequiredClause("FROM"));
        p.finish();
        return;
    }
    p.start(SyntaxKind::TableClause);
    clause_body(p, |k| k == TokenKind::WhereKw || k == TokenKind::ReturningKw);
    p.finish();

    if p.eat(TokenKind::WhereKw) {
        p.start(SyntaxKind::WhereClause);
        clause_body(p, |k| k == TokenKind::ReturningKw);
        p.finish();
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

    #[test]
    fn delete_with_where_clause() {
        let tokens = tokenize("DELETE FROM users WHERE id = 1").unwrap();
        let mut p = Parser::new(tokens);
        super::parse_delete(&mut p);
        let parse = p.build();
        assert!(parse.ok());
        let stmt = parse
            .syntax()
            .children()
            .find(|n| n.kind() == SyntaxKind::DeleteStmt)
            .unwrap();
        let kinds: Vec<_> = stmt.children().map(|n| n.kind()).collect();
        assert_eq!(kinds, vec![SyntaxKind::TableClause, SyntaxKind::WhereClause]);
    }

    #[test]
    fn delete_without_where_is_unconditional() {
        let tokens = tokenize("DELETE FROM sessions").unwrap();
        let mut p = Parser::new(tokens);
        super::parse_delete(&mut p);
        let parse = p.build();
        assert!(parse.ok());
    }
}
