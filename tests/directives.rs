// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

use sqltpl::dialect::Dialect;
use sqltpl::error::CompileError;
use sqltpl::instructions::Instruction;
use sqltpl::ir::StatementKind;
use sqltpl::{compile, CompileInput};

fn compile_source(source: &str) -> sqltpl::ir::IrDocument {
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
fn conditional_trailing_column_elides_leading_comma() {
    let doc = compile_source(
        "/*#\nparameters:\n  include_email: bool\n*/\nSELECT id, name /*# if include_email */, email /*# end */ FROM users",
    );
    let unless_boundary = doc.instructions.iter().find_map(|i| match i {
        Instruction::EmitUnlessBoundary { value, .. } => Some(value.clone()),
        _ => None,
    });
    assert_eq!(unless_boundary.as_deref(), Some(","));
}

#[test]
fn conditional_set_column_elides_leading_comma() {
    let doc = compile_source(
        "/*#\nparameters:\n  name: string\n  email: string\n*/\nUPDATE users SET name=/*= name */'x' /*# if email!=\"\" */, email=/*= email */'y' /*# end */ WHERE id=1",
    );
    assert_eq!(doc.statement_kind, StatementKind::Update);
    let unless_boundary = doc.instructions.iter().find_map(|i| match i {
        Instruction::EmitUnlessBoundary { value, .. } => Some(value.clone()),
        _ => None,
    });
    assert_eq!(unless_boundary.as_deref(), Some(","));
}

#[test]
fn for_loop_opens_and_closes_a_loop_environment() {
    let doc = compile_source(
        "/*#\nparameters:\n  ids:\n    - int\n*/\nSELECT id FROM users WHERE id IN (/*# for id : ids */ /*= id */, /*# end */)",
    );
    assert!(doc.instructions.iter().any(|i| matches!(i, Instruction::LoopStart { .. })));
    assert!(doc.instructions.iter().any(|i| matches!(i, Instruction::LoopEnd { .. })));
}

#[test]
fn unbalanced_if_without_end_is_a_directive_error() {
    let err = compile(CompileInput {
        source: "SELECT id /*# if x */ FROM users",
        dialect: Dialect::Default,
        tables_schema: None,
        dialect_config: None,
    })
    .unwrap_err();
    assert!(matches!(err, CompileError::Directive(_)));
}
