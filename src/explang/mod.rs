// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! The embedded expression language (spec §4.5, component E): parses the
//! CEL-subset text found inside `/*= EXPR */` and directive condition/
//! collection bodies, and validates it against the parameter/environment
//! schema.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod validate;

use crate::position::Position;
use crate::schema::EnvironmentTree;
pub use ast::{Expr, Step};
pub use parser::ExplangSyntaxError;
pub use validate::ExplangValidationError;

/// A single parsed, validated expression (spec §3's `CELExpression`):
/// `{id, source, envIndex, pos}` plus the parsed tree used for validation.
/// Only the first four fields are part of the serialized IR (spec §6) —
/// the parsed form is compile-time-only.
#[derive(Debug, Clone, PartialEq)]
pub struct CelExpression {
    pub id: u32,
    pub source: String,
    pub env_index: usize,
    pub pos: Position,
    pub expr: Expr,
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ExplangError {
    #[error(transparent)]
    Syntax(#[from] ExplangSyntaxError),
    #[error(transparent)]
    Validation(#[from] ExplangValidationError),
}

/// Parses and validates `source` (the raw text of a `/*= ... */` or
/// directive condition/collection) in the environment named by
/// `env_index`, assigning it `id`.
pub fn compile_expression(
    id: u32,
    source: &str,
    pos: Position,
    env_index: usize,
    tree: &EnvironmentTree,
) -> Result<CelExpression, ExplangError> {
    let expr = parser::Parser::new(source, pos).parse()?;
    validate::validate_expr(&expr, tree, env_index)?;
    Ok(CelExpression {
        id,
        source: source.to_owned(),
        env_index,
        pos,
        expr,
    })
}
