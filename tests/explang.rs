// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

use sqltpl::dialect::Dialect;
use sqltpl::error::CompileError;
use sqltpl::explang::ExplangValidationError;
use sqltpl::{compile, CompileInput};

fn compile_result(source: &str) -> Result<sqltpl::ir::IrDocument, CompileError> {
    let _ = env_logger::builder().is_test(true).try_init();
    compile(CompileInput {
        source,
        dialect: Dialect::Postgres,
        tables_schema: None,
        dialect_config: None,
    })
}

#[test]
fn unknown_field_is_reported_at_its_position() {
    let err = compile_result(
        "/*#\nparameters:\n  user:\n    profile:\n      name: string\n*/\nSELECT id FROM users WHERE name = /*= user.profile.nickname */'x'",
    )
    .unwrap_err();

    match err {
        CompileError::ExplangValidation(ExplangValidationError::UnknownField { name, .. }) => {
            assert_eq!(name, "nickname");
        }
        other => panic!("expected an unknown-field explang validation error, got {other:?}"),
    }
}

#[test]
fn known_nested_field_resolves() {
    let doc = compile_result(
        "/*#\nparameters:\n  user:\n    profile:\n      name: string\n*/\nSELECT id FROM users WHERE name = /*= user.profile.name */'x'",
    )
    .unwrap();
    assert!(!doc.expressions.is_empty());
}

#[test]
fn loop_variable_is_resolvable_inside_its_own_body_only() {
    let doc = compile_result(
        "/*#\nparameters:\n  ids:\n    - int\n*/\nSELECT id FROM users WHERE id IN (/*# for id : ids */ /*= id */, /*# end */)",
    )
    .unwrap();
    assert!(doc.expressions.iter().any(|e| e.source == "id"));
}
