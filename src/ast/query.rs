// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! `SELECT` statement and its clauses.

use super::{split_top_level_commas, typed_syntax_node, AstNode};
use crate::affinity::{JoinKind, SelectedColumn};
use crate::syntax::SyntaxKind;
use std::collections::HashSet;

typed_syntax_node!(
    SelectStmt,
    SelectClause,
    FromClause,
    WhereClause,
    GroupByClause,
    HavingClause,
    OrderByClause,
    LimitClause,
    OffsetClause,
    ForUpdateClause
);

impl SelectStmt {
    pub fn select_clause(&self) -> Option<SelectClause> {
        self.syntax.children().find_map(SelectClause::cast)
    }

    pub fn from_clause(&self) -> Option<FromClause> {
        self.syntax.children().find_map(FromClause::cast)
    }

    pub fn where_clause(&self) -> Option<WhereClause> {
        self.syntax.children().find_map(WhereClause::cast)
    }

    pub fn group_by_clause(&self) -> Option<GroupByClause> {
        self.syntax.children().find_map(GroupByClause::cast)
    }

    pub fn having_clause(&self) -> Option<HavingClause> {
        self.syntax.children().find_map(HavingClause::cast)
    }

    pub fn order_by_clause(&self) -> Option<OrderByClause> {
        self.syntax.children().find_map(OrderByClause::cast)
    }

    pub fn limit_clause(&self) -> Option<LimitClause> {
        self.syntax.children().find_map(LimitClause::cast)
    }

    pub fn offset_clause(&self) -> Option<OffsetClause> {
        self.syntax.children().find_map(OffsetClause::cast)
    }

    pub fn for_update_clause(&self) -> Option<ForUpdateClause> {
        self.syntax.children().find_map(ForUpdateClause::cast)
    }
}

impl SelectClause {
    /// The SELECT-list columns, parsed only well enough for
    /// response-affinity classification (spec §4.7): `alias.col`,
    /// `col`, or `col AS alias` (the alias is dropped).
    pub fn columns(&self) -> Vec<SelectedColumn> {
        let text = self.syntax.text().to_string();
        let body = text
            .trim_start_matches(|c: char| !c.is_whitespace())
            .trim();
        split_top_level_commas(body)
            .into_iter()
            .filter_map(|item| {
                let item = item.split_whitespace().next()?;
                let (prefix, name) = match item.rsplit_once('.') {
                    Some((p, n)) => (Some(p.trim_matches('"').to_owned()), n),
                    None => (None, item),
                };
                Some(SelectedColumn {
                    table_prefix: prefix,
                    name: name.trim_matches('"').to_owned(),
                })
            })
            .collect()
    }
}

impl FromClause {
    /// The first table named in the FROM clause — the driving table for
    /// response-affinity purposes (spec §4.7).
    pub fn driving_table(&self) -> Option<String> {
        self.syntax
            .children_with_tokens()
            .filter_map(|el| el.into_token())
            .find(|t| matches!(t.kind(), SyntaxKind::Ident))
            .map(|t| t.text().trim_matches('"').to_owned())
    }

    /// Scans for `JOIN` keywords and classifies each by the qualifier word
    /// immediately preceding it, defaulting to inner (spec §4.7).
    pub fn joins(&self) -> Vec<JoinKind> {
        let tokens: Vec<_> = self
            .syntax
            .children_with_tokens()
            .filter_map(|el| el.into_token())
            .filter(|t| !t.kind().is_trivia_kind())
            .collect();

        let mut joins = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            if token.kind() != SyntaxKind::Keyword || !token.text().eq_ignore_ascii_case("join") {
                continue;
            }
            let kind = match i.checked_sub(1).map(|j| tokens[j].text().to_ascii_lowercase()) {
                Some(ref w) if w == "left" => JoinKind::Left,
                Some(ref w) if w == "inner" => JoinKind::Inner,
                Some(ref w) if w == "right" || w == "full" => JoinKind::Other,
                _ => JoinKind::Inner,
            };
            joins.push(kind);
        }
        joins
    }
}

impl WhereClause {
    /// `(qualifier, column)` pairs constrained by top-level `=` (spec
    /// §4.7). Only looks at direct equality comparisons; anything joined
    /// by `OR`, or comparisons nested inside a subquery, isn't a reliable
    /// key constraint and is intentionally left out.
    pub fn equalities(&self) -> HashSet<(Option<String>, String)> {
        let tokens: Vec<_> = self
            .syntax
            .children_with_tokens()
            .filter_map(|el| el.into_token())
            .filter(|t| !t.kind().is_trivia_kind())
            .collect();

        let mut out = HashSet::new();
        for (i, token) in tokens.iter().enumerate() {
            if token.kind() != SyntaxKind::ComparisonOp || token.text() != "=" {
                continue;
            }
            let Some(before) = i.checked_sub(1) else { continue };
            let col_token = &tokens[before];
            if col_token.kind() != SyntaxKind::Ident {
                continue;
            }
            let qualifier = before
                .checked_sub(2)
                .filter(|_| tokens[before - 1].kind() == SyntaxKind::Dot)
                .map(|j| tokens[j].text().trim_matches('"').to_owned());
            out.insert((qualifier, col_token.text().trim_matches('"').to_owned()));
        }
        out
    }
}

impl LimitClause {
    pub fn is_literal_one(&self) -> bool {
        self.syntax.text().to_string().trim() == "1"
    }
}
