// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Classifies a statement's response cardinality as `one`, `many`, or
//! `none` (spec §4.7, component G). Operates over plain fact structs the
//! statement AST layer extracts, rather than the AST itself, so the
//! classification rules can be tested in isolation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseAffinity {
    One,
    Many,
    None,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum JoinKind {
    Inner,
    Left,
    Other,
}

/// A column referenced in the SELECT list: `table_prefix` is `Some` either
/// for an explicit `table.column`/`alias.column` reference, or for the
/// `table__column` double-underscore convention identifying a joined row
/// (spec §4.7).
#[derive(Debug, Clone)]
pub struct SelectedColumn {
    pub table_prefix: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct SelectFacts {
    pub has_limit_1: bool,
    pub driving_table: Option<String>,
    /// `(qualifier, column)` pairs constrained by `=` in the WHERE clause.
    /// `qualifier` is `None` for an unqualified column reference.
    pub where_equalities: HashSet<(Option<String>, String)>,
    pub joins: Vec<JoinKind>,
    pub selected_columns: Vec<SelectedColumn>,
}

pub fn classify_select(facts: &SelectFacts, primary_key: &[&str]) -> ResponseAffinity {
    if facts.has_limit_1 {
        return ResponseAffinity::One;
    }

    if primary_key.is_empty() {
        return ResponseAffinity::Many;
    }

    let driving = facts.driving_table.as_deref();
    let pk_constrained = primary_key.iter().all(|pk| {
        facts
            .where_equalities
            .contains(&(driving.map(str::to_owned), (*pk).to_owned()))
            || facts.where_equalities.contains(&(None, (*pk).to_owned()))
    });
    if !pk_constrained {
        return ResponseAffinity::Many;
    }

    let joins_preserve_one = facts
        .joins
        .iter()
        .all(|kind| matches!(kind, JoinKind::Inner | JoinKind::Left));
    if !joins_preserve_one {
        return ResponseAffinity::Many;
    }

    let columns_ok = facts.selected_columns.iter().all(|col| {
        let from_driving = match (&col.table_prefix, driving) {
            (None, _) => true,
            (Some(prefix), Some(driving)) => prefix == driving,
            (Some(_), None) => false,
        };
        from_driving || col.name.contains("__")
    });

    if columns_ok {
        ResponseAffinity::One
    } else {
        ResponseAffinity::Many
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DmlKind {
    Insert { bulk: bool },
    Update,
    Delete,
}

pub fn classify_dml(kind: DmlKind, has_returning: bool) -> ResponseAffinity {
    if !has_returning {
        return ResponseAffinity::None;
    }
    match kind {
        DmlKind::Insert { bulk: true } => ResponseAffinity::Many,
        DmlKind::Insert { bulk: false } => ResponseAffinity::One,
        DmlKind::Update | DmlKind::Delete => ResponseAffinity::Many,
    }
}

/// Spec §9 open question (ii): an INSERT is bulk iff its VALUES clause has
/// more than one tuple, or its source is a SELECT.
pub fn insert_is_bulk(value_tuple_count: usize, source_is_select: bool) -> bool {
    source_is_select || value_tuple_count > 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_1_is_always_one() {
        let facts = SelectFacts {
            has_limit_1: true,
            ..Default::default()
        };
        assert_eq!(classify_select(&facts, &["id"]), ResponseAffinity::One);
    }

    #[test]
    fn pk_equality_without_limit_is_one() {
        let mut facts = SelectFacts::default();
        facts.driving_table = Some("users".to_owned());
        facts
            .where_equalities
            .insert((Some("users".to_owned()), "id".to_owned()));
        facts.selected_columns.push(SelectedColumn {
            table_prefix: None,
            name: "name".to_owned(),
        });
        assert_eq!(classify_select(&facts, &["id"]), ResponseAffinity::One);
    }

    #[test]
    fn no_pk_constraint_is_many() {
        let facts = SelectFacts::default();
        assert_eq!(classify_select(&facts, &["id"]), ResponseAffinity::Many);
    }

    #[test]
    fn no_tables_schema_is_many() {
        let mut facts = SelectFacts::default();
        facts
            .where_equalities
            .insert((None, "id".to_owned()));
        assert_eq!(classify_select(&facts, &[]), ResponseAffinity::Many);
    }

    #[test]
    fn joined_column_with_prefix_preserves_one() {
        let mut facts = SelectFacts::default();
        facts.driving_table = Some("users".to_owned());
        facts
            .where_equalities
            .insert((Some("users".to_owned()), "id".to_owned()));
        facts.joins.push(JoinKind::Left);
        facts.selected_columns.push(SelectedColumn {
            table_prefix: None,
            name: "orders__total".to_owned(),
        });
        assert_eq!(classify_select(&facts, &["id"]), ResponseAffinity::One);
    }

    #[test]
    fn right_join_breaks_one_affinity() {
        let mut facts = SelectFacts::default();
        facts.driving_table = Some("users".to_owned());
        facts
            .where_equalities
            .insert((Some("users".to_owned()), "id".to_owned()));
        facts.joins.push(JoinKind::Other);
        assert_eq!(classify_select(&facts, &["id"]), ResponseAffinity::Many);
    }

    #[test]
    fn dml_without_returning_is_none() {
        assert_eq!(
            classify_dml(DmlKind::Update, false),
            ResponseAffinity::None
        );
    }

    #[test]
    fn single_row_insert_returning_is_one() {
        assert_eq!(
            classify_dml(DmlKind::Insert { bulk: false }, true),
            ResponseAffinity::One
        );
    }

    #[test]
    fn bulk_insert_returning_is_many() {
        assert_eq!(
            classify_dml(DmlKind::Insert { bulk: true }, true),
            ResponseAffinity::Many
        );
    }

    #[test]
    fn insert_from_select_is_bulk() {
        assert!(insert_is_bulk(1, true));
        assert!(insert_is_bulk(2, false));
        assert!(!insert_is_bulk(1, false));
    }
}
