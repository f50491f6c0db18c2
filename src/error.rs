// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! The closed set of error kinds a compilation can fail with (spec §7),
//! and the human-readable rendering contract (spec §6): `file:line:col:
//! message`, followed by the source line and a caret when available.

use crate::config::ConfigError;
use crate::directive::DirectiveError;
use crate::explang::{ExplangSyntaxError, ExplangValidationError};
use crate::function_header::FunctionHeaderError;
use crate::instructions::GeneratorError;
use crate::lexer::TokenizeError;
use crate::parser::SyntaxError as ParserSyntaxError;
use crate::position::Position;
use crate::system_fields::SystemFieldViolation;
use std::fmt;

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error(transparent)]
    Directive(#[from] DirectiveError),
    #[error("{pos}: {error}")]
    Statement { pos: Position, error: ParserSyntaxError },
    #[error(transparent)]
    FunctionHeader(#[from] FunctionHeaderError),
    #[error(transparent)]
    ExplangSyntax(#[from] ExplangSyntaxError),
    #[error(transparent)]
    ExplangValidation(#[from] ExplangValidationError),
    /// The only error kind that accumulates rather than aborting on the
    /// first occurrence (spec §7).
    #[error("{} system field violation(s)", .0.len())]
    SystemFieldViolations(Vec<SystemFieldViolation>),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{pos}: invalid position: {reason}")]
    InvalidPosition { pos: Position, reason: &'static str },
    #[error("{0}")]
    Generator(#[from] GeneratorError),
}

/// A fully-rendered diagnostic, carrying the optional source file name and
/// source line needed for the `file:line:col: message` + caret form
/// described in spec §6.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub source_file: Option<String>,
    pub pos: Position,
    pub source_line: Option<String>,
}

impl Diagnostic {
    pub fn from_error(error: &CompileError, source_file: Option<&str>, source: &str) -> Self {
        let pos = error_position(error);
        let source_line = source.lines().nth((pos.line as usize).saturating_sub(1));
        Self {
            message: error.to_string(),
            source_file: source_file.map(str::to_owned),
            pos,
            source_line: source_line.map(str::to_owned),
        }
    }
}

fn error_position(error: &CompileError) -> Position {
    match error {
        CompileError::Tokenize(e) => e.pos,
        CompileError::Directive(e) => directive_error_pos(e),
        CompileError::Statement { pos, .. } => *pos,
        CompileError::FunctionHeader(e) => e.pos,
        CompileError::ExplangSyntax(e) => e.pos,
        CompileError::ExplangValidation(e) => explang_validation_pos(e),
        CompileError::SystemFieldViolations(violations) => violations
            .first()
            .map(system_field_violation_pos)
            .unwrap_or(Position::START),
        CompileError::Config(_) => Position::START,
        CompileError::InvalidPosition { pos, .. } => *pos,
        CompileError::Generator(_) => Position::START,
    }
}

fn directive_error_pos(error: &DirectiveError) -> Position {
    match error {
        DirectiveError::UnknownDirective { pos, .. }
        | DirectiveError::MalformedDirective { pos, .. }
        | DirectiveError::UnbalancedDirective { pos, .. } => *pos,
    }
}

fn explang_validation_pos(error: &ExplangValidationError) -> Position {
    match error {
        ExplangValidationError::UnknownRoot { pos, .. }
        | ExplangValidationError::UnknownField { pos, .. }
        | ExplangValidationError::NotIndexable { pos, .. }
        | ExplangValidationError::WrongArity { pos, .. } => *pos,
    }
}

fn system_field_violation_pos(violation: &SystemFieldViolation) -> Position {
    match violation {
        SystemFieldViolation::ParameterNotProvided { pos, .. }
        | SystemFieldViolation::SystemFieldNotIncluded { pos, .. }
        | SystemFieldViolation::ParameterConfiguredError { pos, .. } => *pos,
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self.source_file.as_deref().unwrap_or("<input>");
        writeln!(f, "{file}:{}:{}: {}", self.pos.line, self.pos.column, self.message)?;
        if let Some(line) = &self.source_line {
            writeln!(f, "{line}")?;
            let caret_col = self.pos.column.saturating_sub(1) as usize;
            writeln!(f, "{}^", " ".repeat(caret_col))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_file_line_col_and_caret() {
        let error = CompileError::InvalidPosition {
            pos: Position::new(2, 5, 10),
            reason: "bad offset",
        };
        let diag = Diagnostic::from_error(&error, Some("q.sql"), "SELECT 1\nFROM users");
        let rendered = diag.to_string();
        assert!(rendered.starts_with("q.sql:2:5:"));
        assert!(rendered.contains("FROM users"));
        assert!(rendered.contains("    ^"));
    }
}
