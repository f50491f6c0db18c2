// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! `UPDATE table SET col = expr, ... [WHERE ...] [RETURNING ...]`.

use super::clause_body;
use crate::lexer::TokenKind;
use crate::parser::{Parser, SyntaxError};
use crate::syntax::SyntaxKind;

pub fn parse_update(p: &mut Parser) {
    p.start(SyntaxKind::UpdateStmt);
    p.bump(TokenKind::UpdateKw);

    p.start(SyntaxKind::TableClause);
    clause_body(p, |k| k == TokenKind::SetKw);
    p.finish();

    if !p.expect(TokenKind::SetKw) {
        p.error(SyntaxError::MissingRequiredClause("SET"));
        p.finish();
        return;
    }
    p.start(SyntaxKind::SetClause);
    loop {
        p.start(SyntaxKind::Assignment);
        clause_body(p, |k| k == TokenKind::Comma);
        p.finish();
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
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
