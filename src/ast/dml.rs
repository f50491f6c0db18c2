// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! `INSERT`/`UPDATE`/`DELETE` statements and their clauses.

use super::{split_top_level_commas, typed_syntax_node, AstNode};
use crate::syntax::SyntaxKind;

typed_syntax_node!(
    InsertStmt,
    UpdateStmt,
    DeleteStmt,
    IntoClause,
    TableClause,
    ColumnList,
    ValuesList,
    ValueTuple,
    SelectSource,
    SetClause,
    Assignment,
    ReturningClause
);

impl InsertStmt {
    pub fn into_clause(&self) -> Option<IntoClause> {
        self.syntax.children().find_map(IntoClause::cast)
    }

    pub fn column_list(&self) -> Option<ColumnList> {
        self.syntax.children().find_map(ColumnList::cast)
    }

    pub fn values_list(&self) -> Option<ValuesList> {
        self.syntax.children().find_map(ValuesList::cast)
    }

    pub fn select_source(&self) -> Option<SelectSource> {
        self.syntax.children().find_map(SelectSource::cast)
    }

    pub fn returning_clause(&self) -> Option<ReturningClause> {
        self.syntax.children().find_map(ReturningClause::cast)
    }

    /// Spec §9 open question (ii): bulk iff the VALUES clause has more
    /// than one tuple, or the source is a SELECT.
    pub fn is_bulk(&self) -> bool {
        crate::affinity::insert_is_bulk(
            self.values_list().map_or(0, |v| v.tuple_count()),
            self.select_source().is_some(),
        )
    }
}

impl IntoClause {
    pub fn table_name(&self) -> Option<String> {
        table_name_from(self.syntax.text().to_string().trim())
    }
}

impl ColumnList {
    pub fn columns(&self) -> Vec<String> {
        let text = self.syntax.text().to_string();
        let body = text.trim().trim_start_matches('(').trim_end_matches(')');
        split_top_level_commas(body)
            .into_iter()
            .map(|c| c.trim_matches('"').to_owned())
            .collect()
    }
}

impl ValuesList {
    pub fn tuple_count(&self) -> usize {
        self.syntax
            .children()
            .filter(|n| n.kind() == SyntaxKind::ValueTuple)
            .count()
    }
}

impl UpdateStmt {
    pub fn table_clause(&self) -> Option<TableClause> {
        self.syntax.children().find_map(TableClause::cast)
    }

    pub fn set_clause(&self) -> Option<SetClause> {
        self.syntax.children().find_map(SetClause::cast)
    }

    pub fn where_clause(&self) -> Option<super::WhereClause> {
        self.syntax.children().find_map(super::WhereClause::cast)
    }

    pub fn returning_clause(&self) -> Option<ReturningClause> {
        self.syntax.children().find_map(ReturningClause::cast)
    }
}

impl TableClause {
    pub fn table_name(&self) -> Option<String> {
        table_name_from(self.syntax.text().to_string().trim())
    }
}

impl SetClause {
    /// Column names assigned in the `SET` list — the left-hand side of
    /// each `col = expr` assignment.
    pub fn assigned_columns(&self) -> Vec<String> {
        self.syntax
            .children()
            .filter(|n| n.kind() == SyntaxKind::Assignment)
            .filter_map(|assignment| {
                let text = assignment.text().to_string();
                let (lhs, _) = text.split_once('=')?;
                Some(lhs.trim().trim_matches('"').to_owned())
            })
            .collect()
    }
}

impl DeleteStmt {
    pub fn table_clause(&self) -> Option<TableClause> {
        self.syntax.children().find_map(TableClause::cast)
    }

    pub fn where_clause(&self) -> Option<super::WhereClause> {
        self.syntax.children().find_map(super::WhereClause::cast)
    }

    pub fn returning_clause(&self) -> Option<ReturningClause> {
        self.syntax.children().find_map(ReturningClause::cast)
    }
}

fn table_name_from(clause_text: &str) -> Option<String> {
    let first = clause_text.split_whitespace().next()?;
    Some(first.trim_matches('"').to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar;
    use crate::lexer::tokenize;

    #[test]
    fn insert_extracts_table_columns_and_bulk_flag() {
        let parse = grammar::parse(tokenize("INSERT INTO users (id, name) VALUES (1, 'a'), (2, 'b')").unwrap());
        assert!(parse.ok());
        let stmt = parse.syntax().children().find_map(InsertStmt::cast).unwrap();
        assert_eq!(stmt.into_clause().unwrap().table_name(), Some("users".to_owned()));
        assert_eq!(stmt.column_list().unwrap().columns(), vec!["id", "name"]);
        assert!(stmt.is_bulk());
    }

    #[test]
    fn single_row_insert_is_not_bulk() {
        let parse = grammar::parse(tokenize("INSERT INTO users (id) VALUES (1)").unwrap());
        let stmt = parse.syntax().children().find_map(InsertStmt::cast).unwrap();
        assert!(!stmt.is_bulk());
    }

    #[test]
    fn update_extracts_assigned_columns() {
        let parse = grammar::parse(tokenize("UPDATE users SET name = 'x', age = 5 WHERE id = 1").unwrap());
        let stmt = parse.syntax().children().find_map(UpdateStmt::cast).unwrap();
        assert_eq!(stmt.table_clause().unwrap().table_name(), Some("users".to_owned()));
        assert_eq!(stmt.set_clause().unwrap().assigned_columns(), vec!["name", "age"]);
    }

    #[test]
    fn delete_extracts_table_name() {
        let parse = grammar::parse(tokenize("DELETE FROM sessions WHERE expired = true").unwrap());
        let stmt = parse.syntax().children().find_map(DeleteStmt::cast).unwrap();
        assert_eq!(stmt.table_clause().unwrap().table_name(), Some("sessions".to_owned()));
    }
}
