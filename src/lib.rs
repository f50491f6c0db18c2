// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Compile-time SQL template engine: lowers directive-annotated SQL into a
//! typed instruction IR (spec §2). [`compile`] is the single entry point,
//! running the full pipeline: tokenize, parse the function header, parse
//! the statement grammar, lower directives into the instruction list,
//! classify response affinity, and reconcile system fields.

pub mod affinity;
pub mod ast;
pub mod config;
pub mod dialect;
pub mod dialect_patterns;
pub mod directive;
pub mod error;
pub mod explang;
pub mod function_header;
pub mod grammar;
pub mod instructions;
pub mod ir;
mod lower;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod schema;
pub mod syntax;
pub mod system_fields;
pub mod util;

use ast::AstNode;
use config::{DialectConfig, TablesSchemaConfig};
use dialect::Dialect;
use error::CompileError;
use instructions::{Event, Generator};
use ir::{InterfaceSchema, IrDocument, StatementKind};
use lexer::{tokenize, PositionedToken, TokenKind};
use position::Position;
use schema::{EnvironmentTree, FunctionDefinition};
use std::collections::HashSet;
use system_fields::{SystemFieldPlan, SystemFieldProcessor};
use syntax::SyntaxNode;

/// The side inputs [`compile`] needs beyond the template source itself —
/// all optional, matching spec §6's "everything but the source is
/// optional" framing.
#[derive(Debug, Default)]
pub struct CompileInput<'a> {
    pub source: &'a str,
    pub dialect: Dialect,
    pub tables_schema: Option<&'a TablesSchemaConfig>,
    pub dialect_config: Option<&'a DialectConfig>,
}

pub fn compile(input: CompileInput) -> Result<IrDocument, CompileError> {
    let tokens = tokenize(input.source)?;
    log::debug!("tokenized {} tokens", tokens.len());
    let (header, body) = split_header(&tokens);
    log::trace!("function header: name={:?}, {} declared parameter(s)", header.name, header.parameters.len());

    let mut env_tree = EnvironmentTree::new(header.root_type());

    let parse = grammar::parse(body.to_vec());
    if let Some(err) = parse.errors.into_iter().next() {
        return Err(CompileError::Statement {
            pos: err.pos,
            error: err.error,
        });
    }
    let root = parse.syntax();
    let (kind, stmt_node) = classify_statement(&root)?;
    log::debug!("classified statement as {kind:?}");

    let clause_starts = lower::clause_boundaries(&stmt_node);
    let mut events = lower::lower(body, &clause_starts)?;
    log::debug!("lowered to {} event(s) across {} clause boundary(ies)", events.len(), clause_starts.len());

    let declared_params: HashSet<String> = header.parameters.keys().cloned().collect();
    let plan = reconcile_system_fields(
        &stmt_node,
        kind,
        &declared_params,
        input.dialect_config,
        body.last().map_or(Position::START, |t| t.pos),
    )?;
    if !plan.columns_to_append.is_empty() {
        events = splice_system_field_columns(events, body, &stmt_node, kind, &plan.columns_to_append);
        log::debug!(
            "spliced {} system-field column(s) into the event stream",
            plan.columns_to_append.len()
        );
    }

    let mut generator = Generator::new(&mut env_tree);
    generator.run_events(&events)?;

    if kind == StatementKind::Select {
        let select = ast::SelectStmt::cast(stmt_node.clone()).expect("classified as select");
        let has_limit = select.limit_clause().is_some();
        let has_offset = select.offset_clause().is_some();
        let has_for_update = select.for_update_clause().is_some();
        generator.select_tail(
            body.last().map_or(Position::START, |t| t.pos),
            has_limit,
            has_offset,
            has_for_update,
        );
    }

    let (instructions, expressions) = generator.finish();
    log::debug!(
        "generated {} instruction(s), {} expression(s)",
        instructions.len(),
        expressions.len()
    );

    let primary_key = primary_key_for(&stmt_node, kind, input.tables_schema);
    let response_affinity = classify_affinity(&stmt_node, kind, &primary_key);
    log::debug!(
        "response affinity: {response_affinity:?}, {} implicit parameter(s)",
        plan.implicit_parameters.len()
    );

    Ok(IrDocument {
        source: input.source.to_owned(),
        dialect: input.dialect,
        statement_kind: kind,
        interface: InterfaceSchema {
            name: header.name,
            function_name: header.function_name,
            description: header.description,
            parameters: ir::serialize_parameters(&header.parameters),
        },
        response_affinity,
        implicit_parameters: plan.implicit_parameters,
        expressions: expressions.iter().map(ir::SerializedExpression::from).collect(),
        environments: env_tree.environments,
        instructions,
    })
}

/// Recognizes the leading `/*# ... */` function header positionally: the
/// first non-whitespace, non-line-comment token in the source (spec §4.4).
/// Everything from there on is handed to the statement grammar and
/// directive lowering untouched.
fn split_header<'a>(tokens: &'a [PositionedToken<'a>]) -> (FunctionDefinition, &'a [PositionedToken<'a>]) {
    let header_idx = tokens
        .iter()
        .position(|t| !matches!(t.kind, TokenKind::Whitespace | TokenKind::LineComment));

    match header_idx {
        Some(idx) if tokens[idx].kind == TokenKind::DirectiveComment => {
            match function_header::parse_function_header(tokens[idx].text, tokens[idx].pos) {
                Ok(def) => (def, &tokens[idx + 1..]),
                Err(_) => (FunctionDefinition::default(), tokens),
            }
        }
        _ => (FunctionDefinition::default(), tokens),
    }
}

fn classify_statement(root: &SyntaxNode) -> Result<(StatementKind, SyntaxNode), CompileError> {
    for child in root.children() {
        let kind = match child.kind() {
            syntax::SyntaxKind::SelectStmt => Some(StatementKind::Select),
            syntax::SyntaxKind::InsertStmt => Some(StatementKind::Insert),
            syntax::SyntaxKind::UpdateStmt => Some(StatementKind::Update),
            syntax::SyntaxKind::DeleteStmt => Some(StatementKind::Delete),
            _ => None,
        };
        if let Some(kind) = kind {
            return Ok((kind, child));
        }
    }
    Err(CompileError::Statement {
        pos: Position::START,
        error: parser::SyntaxError::UnknownStatement,
    })
}

fn primary_key_for(
    stmt: &SyntaxNode,
    kind: StatementKind,
    tables_schema: Option<&TablesSchemaConfig>,
) -> Vec<String> {
    if kind != StatementKind::Select {
        return Vec::new();
    }
    let Some(tables_schema) = tables_schema else {
        return Vec::new();
    };
    let select = ast::SelectStmt::cast(stmt.clone()).expect("select statement");
    let Some(driving_table) = select.from_clause().and_then(|f| f.driving_table()) else {
        return Vec::new();
    };
    tables_schema
        .tables
        .get(&driving_table)
        .map(|t| t.primary_key_columns().into_iter().map(str::to_owned).collect())
        .unwrap_or_default()
}

fn classify_affinity(
    stmt: &SyntaxNode,
    kind: StatementKind,
    primary_key: &[String],
) -> affinity::ResponseAffinity {
    let pk: Vec<&str> = primary_key.iter().map(String::as_str).collect();
    match kind {
        StatementKind::Select => {
            let select = ast::SelectStmt::cast(stmt.clone()).expect("select statement");
            let facts = affinity::SelectFacts {
                has_limit_1: select.limit_clause().map(|l| l.is_literal_one()).unwrap_or(false),
                driving_table: select.from_clause().and_then(|f| f.driving_table()),
                where_equalities: select.where_clause().map(|w| w.equalities()).unwrap_or_default(),
                joins: select.from_clause().map(|f| f.joins()).unwrap_or_default(),
                selected_columns: select.select_clause().map(|s| s.columns()).unwrap_or_default(),
            };
            affinity::classify_select(&facts, &pk)
        }
        StatementKind::Insert => {
            let insert = ast::InsertStmt::cast(stmt.clone()).expect("insert statement");
            let has_returning = insert.returning_clause().is_some();
            affinity::classify_dml(
                affinity::DmlKind::Insert { bulk: insert.is_bulk() },
                has_returning,
            )
        }
        StatementKind::Update => {
            let update = ast::UpdateStmt::cast(stmt.clone()).expect("update statement");
            affinity::classify_dml(affinity::DmlKind::Update, update.returning_clause().is_some())
        }
        StatementKind::Delete => {
            let delete = ast::DeleteStmt::cast(stmt.clone()).expect("delete statement");
            affinity::classify_dml(affinity::DmlKind::Delete, delete.returning_clause().is_some())
        }
    }
}

fn reconcile_system_fields(
    stmt: &SyntaxNode,
    kind: StatementKind,
    declared_params: &HashSet<String>,
    dialect_config: Option<&DialectConfig>,
    pos: Position,
) -> Result<SystemFieldPlan, CompileError> {
    let Some(dialect_config) = dialect_config else {
        return Ok(SystemFieldPlan::default());
    };

    let (sf_kind, included_columns) = match kind {
        StatementKind::Insert => {
            let insert = ast::InsertStmt::cast(stmt.clone()).expect("insert statement");
            let cols = insert.column_list().map(|c| c.columns()).unwrap_or_default();
            (system_fields::StatementKind::Insert, cols.into_iter().collect())
        }
        StatementKind::Update => {
            let update = ast::UpdateStmt::cast(stmt.clone()).expect("update statement");
            let cols = update.set_clause().map(|s| s.assigned_columns()).unwrap_or_default();
            (system_fields::StatementKind::Update, cols.into_iter().collect())
        }
        StatementKind::Select | StatementKind::Delete => return Ok(SystemFieldPlan::default()),
    };

    let processor = SystemFieldProcessor::new(&dialect_config.system.fields);
    processor
        .process(sf_kind, declared_params, &included_columns, pos)
        .map_err(|violations| {
            for violation in &violations {
                log::warn!("{violation}");
            }
            CompileError::SystemFieldViolations(violations)
        })
}

/// Splices the columns/assignments an `implicit`/`default` system-field
/// policy contributes into the event stream, at the exact byte offsets the
/// column list, VALUES tuple(s), or SET clause end at. This is the explicit
/// system-field rewrite of the statement's columns/values the lifecycle
/// allows ahead of instruction generation (spec §3, §4.6).
fn splice_system_field_columns(
    events: Vec<Event>,
    body: &[PositionedToken],
    stmt: &SyntaxNode,
    kind: StatementKind,
    columns: &[String],
) -> Vec<Event> {
    match kind {
        StatementKind::Insert => {
            let insert = ast::InsertStmt::cast(stmt.clone()).expect("insert statement");
            let Some(column_list) = insert.column_list() else {
                // Without an explicit column list we don't know the table's
                // full column order, so there's nowhere safe to append.
                return events;
            };

            let column_offset = u32::from(column_list.syntax().text_range().end()) - 1;
            let column_pos = position_for_offset(body, column_offset);
            let column_extra: Vec<Event> = columns
                .iter()
                .map(|name| Event::Text(format!(", {name}"), column_pos))
                .collect();
            let mut events = insert_events_at_offset(events, column_offset, &column_extra);

            if let Some(values_list) = insert.values_list() {
                for tuple in values_list
                    .syntax()
                    .children()
                    .filter(|n| n.kind() == syntax::SyntaxKind::ValueTuple)
                {
                    let offset = u32::from(tuple.text_range().end()) - 1;
                    let pos = position_for_offset(body, offset);
                    let mut extra = Vec::new();
                    for name in columns {
                        extra.push(Event::Text(", ".to_owned(), pos));
                        extra.push(Event::SystemValue { name: name.clone(), pos });
                    }
                    events = insert_events_at_offset(events, offset, &extra);
                }
            }
            events
        }
        StatementKind::Update => {
            let update = ast::UpdateStmt::cast(stmt.clone()).expect("update statement");
            let Some(set_clause) = update.set_clause() else {
                return events;
            };
            let offset = u32::from(set_clause.syntax().text_range().end());
            let pos = position_for_offset(body, offset);
            let mut extra = Vec::new();
            for name in columns {
                extra.push(Event::Text(format!(", {name} = "), pos));
                extra.push(Event::SystemValue { name: name.clone(), pos });
            }
            insert_events_at_offset(events, offset, &extra)
        }
        StatementKind::Select | StatementKind::Delete => events,
    }
}

/// The position of the first token starting at or after `offset`, falling
/// back to the last token — close enough for the synthetic splice points
/// above, which never cross a line boundary in practice.
fn position_for_offset(tokens: &[PositionedToken], offset: u32) -> Position {
    tokens
        .iter()
        .find(|t| u32::from(t.range.start()) >= offset)
        .map(|t| t.pos)
        .unwrap_or_else(|| tokens.last().map_or(Position::START, |t| t.pos))
}

fn event_pos(event: &Event) -> Position {
    match event {
        Event::Text(_, pos)
        | Event::If { pos, .. }
        | Event::ElseIf { pos, .. }
        | Event::Else(pos)
        | Event::For { pos, .. }
        | Event::End(pos)
        | Event::Eval { pos, .. }
        | Event::SystemValue { pos, .. }
        | Event::Dialect { pos, .. }
        | Event::ClauseBoundary(pos) => *pos,
    }
}

/// Inserts `extra` right at `offset`: splitting whichever `Text` event's
/// span straddles it, or ahead of whichever event starts exactly there.
/// Appends at the end if `offset` falls past every event (e.g. an UPDATE
/// with no trailing clause after SET).
fn insert_events_at_offset(events: Vec<Event>, offset: u32, extra: &[Event]) -> Vec<Event> {
    let mut result = Vec::with_capacity(events.len() + extra.len());
    let mut inserted = false;
    for event in events {
        if !inserted {
            if let Event::Text(text, pos) = &event {
                let start = pos.offset;
                let end = start + text.len() as u32;
                if offset > start && offset < end {
                    let split_at = (offset - start) as usize;
                    let (left, right) = text.split_at(split_at);
                    if !left.is_empty() {
                        result.push(Event::Text(left.to_owned(), *pos));
                    }
                    result.extend(extra.iter().cloned());
                    if !right.is_empty() {
                        let right_pos = Position::new(pos.line, pos.column + (offset - start), offset);
                        result.push(Event::Text(right.to_owned(), right_pos));
                    }
                    inserted = true;
                    continue;
                }
            }
            if event_pos(&event).offset == offset {
                result.extend(extra.iter().cloned());
                inserted = true;
            }
        }
        result.push(event);
    }
    if !inserted {
        result.extend(extra.iter().cloned());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_source(source: &str) -> IrDocument {
        let _ = env_logger::builder().is_test(true).try_init();
        compile(CompileInput {
            source,
            dialect: Dialect::Postgres,
            tables_schema: None,
            dialect_config: None,
        })
        .unwrap()
    }

    #[test]
    fn compiles_header_and_simple_select() {
        let doc = compile_source(
            "/*#\nname: find_active_user\nfunction_name: find_active_user\nparameters:\n  active: bool\n*/\nSELECT id FROM users WHERE active = /*= active */true",
        );
        assert_eq!(doc.interface.name, "find_active_user");
        assert_eq!(doc.statement_kind, StatementKind::Select);
        assert!(doc.instructions.iter().any(|i| matches!(i, instructions::Instruction::EmitEval { .. })));
        assert!(doc
            .instructions
            .iter()
            .any(|i| matches!(i, instructions::Instruction::EmitForClause { .. })));
    }

    #[test]
    fn compiles_conditional_select_list_with_delimiter_elision() {
        let doc = compile_source(
            "/*#\nname: find_user\nparameters:\n  include_email: bool\n*/\nSELECT id, name/*# if include_email */, email/*# end */ FROM users",
        );
        assert!(doc.instructions.iter().any(|i| matches!(
            i,
            instructions::Instruction::EmitUnlessBoundary { value, .. } if value == ","
        )));
    }

    #[test]
    fn compiles_without_header_using_empty_schema() {
        let doc = compile_source("SELECT 1");
        assert_eq!(doc.interface.name, "");
        assert_eq!(doc.statement_kind, StatementKind::Select);
    }

    #[test]
    fn unknown_statement_kind_is_an_error() {
        let err = compile(CompileInput {
            source: "VACUUM users",
            dialect: Dialect::Default,
            tables_schema: None,
            dialect_config: None,
        })
        .unwrap_err();
        assert!(matches!(err, CompileError::Statement { .. }));
    }
}
