// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Reconciles declared system (auto-managed) columns with a statement's
//! type and the caller's declared parameters (spec §4.6, component F).

use crate::config::{SystemFieldOperationConfig, SystemFieldParameterMode, SystemFieldSpec};
use crate::position::Position;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub enum SystemFieldPolicy {
    Implicit,
    Explicit,
    Error,
    Default(String),
}

impl SystemFieldOperationConfig {
    pub fn policy(&self) -> SystemFieldPolicy {
        if let Some(default) = &self.default {
            return SystemFieldPolicy::Default(default.clone());
        }
        match self.parameter {
            Some(SystemFieldParameterMode::Explicit) => SystemFieldPolicy::Explicit,
            Some(SystemFieldParameterMode::Error) => SystemFieldPolicy::Error,
            Some(SystemFieldParameterMode::Implicit) | None => SystemFieldPolicy::Implicit,
        }
    }
}

/// A parameter contributed by the system-field mechanism rather than
/// declared by the caller (spec §3 glossary "Implicit parameter").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplicitParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SystemFieldViolation {
    #[error("{pos}: parameter {field:?} was not provided")]
    ParameterNotProvided { field: String, pos: Position },
    #[error("{pos}: system field {field:?} was not included in the statement")]
    SystemFieldNotIncluded { field: String, pos: Position },
    #[error("{pos}: parameter {field:?} must not be provided by the caller")]
    ParameterConfiguredError { field: String, pos: Position },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StatementKind {
    Insert,
    Update,
}

pub struct SystemFieldProcessor<'a> {
    fields: &'a [SystemFieldSpec],
}

/// The outcome of reconciling one statement against the configured system
/// fields: implicit parameters to add to the function signature, plus the
/// field names that must be appended to the statement's column/assignment
/// list if not already present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SystemFieldPlan {
    pub implicit_parameters: Vec<ImplicitParameter>,
    pub columns_to_append: Vec<String>,
}

impl<'a> SystemFieldProcessor<'a> {
    pub fn new(fields: &'a [SystemFieldSpec]) -> Self {
        Self { fields }
    }

    pub fn process(
        &self,
        kind: StatementKind,
        declared_params: &HashSet<String>,
        included_columns: &HashSet<String>,
        pos: Position,
    ) -> Result<SystemFieldPlan, Vec<SystemFieldViolation>> {
        let mut plan = SystemFieldPlan::default();
        let mut violations = Vec::new();

        for field in self.fields {
            let op = match kind {
                StatementKind::Insert => field.on_insert.as_ref(),
                StatementKind::Update => field.on_update.as_ref(),
            };
            let Some(op) = op else { continue };

            match op.policy() {
                SystemFieldPolicy::Implicit => {
                    plan.implicit_parameters.push(ImplicitParameter {
                        name: field.name.clone(),
                        ty: field.ty.clone(),
                        default: None,
                    });
                    plan.columns_to_append.push(field.name.clone());
                }
                SystemFieldPolicy::Explicit => {
                    if !declared_params.contains(&field.name) {
                        violations.push(SystemFieldViolation::ParameterNotProvided {
                            field: field.name.clone(),
                            pos,
                        });
                    }
                    if !included_columns.contains(&field.name) {
                        violations.push(SystemFieldViolation::SystemFieldNotIncluded {
                            field: field.name.clone(),
                            pos,
                        });
                    }
                }
                SystemFieldPolicy::Error => {
                    if declared_params.contains(&field.name) {
                        violations.push(SystemFieldViolation::ParameterConfiguredError {
                            field: field.name.clone(),
                            pos,
                        });
                    }
                }
                SystemFieldPolicy::Default(expr) => {
                    if !declared_params.contains(&field.name) {
                        plan.implicit_parameters.push(ImplicitParameter {
                            name: field.name.clone(),
                            ty: field.ty.clone(),
                            default: Some(expr),
                        });
                        plan.columns_to_append.push(field.name.clone());
                    }
                }
            }
        }

        if violations.is_empty() {
            Ok(plan)
        } else {
            Err(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SystemFieldOperationConfig as OpCfg;

    fn field(
        name: &str,
        on_insert: Option<OpCfg>,
        on_update: Option<OpCfg>,
    ) -> SystemFieldSpec {
        SystemFieldSpec {
            name: name.to_owned(),
            ty: "timestamp".to_owned(),
            on_insert,
            on_update,
        }
    }

    #[test]
    fn implicit_policy_adds_parameter_and_column() {
        let fields = vec![field(
            "created_at",
            Some(OpCfg {
                default: None,
                parameter: Some(SystemFieldParameterMode::Implicit),
            }),
            None,
        )];
        let processor = SystemFieldProcessor::new(&fields);
        let plan = processor
            .process(
                StatementKind::Insert,
                &HashSet::new(),
                &HashSet::new(),
                Position::START,
            )
            .unwrap();
        assert_eq!(plan.implicit_parameters[0].name, "created_at");
        assert_eq!(plan.columns_to_append, vec!["created_at"]);
    }

    #[test]
    fn explicit_policy_requires_parameter_and_column() {
        let fields = vec![field(
            "updated_by",
            None,
            Some(OpCfg {
                default: None,
                parameter: Some(SystemFieldParameterMode::Explicit),
            }),
        )];
        let processor = SystemFieldProcessor::new(&fields);
        let declared: HashSet<String> = ["name".to_owned()].into();
        let included: HashSet<String> = ["name".to_owned()].into();
        let violations = processor
            .process(StatementKind::Update, &declared, &included, Position::START)
            .unwrap_err();
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn error_policy_rejects_caller_supplied_parameter() {
        let fields = vec![field(
            "id",
            Some(OpCfg {
                default: None,
                parameter: Some(SystemFieldParameterMode::Error),
            }),
            None,
        )];
        let processor = SystemFieldProcessor::new(&fields);
        let declared: HashSet<String> = ["id".to_owned()].into();
        let violations = processor
            .process(
                StatementKind::Insert,
                &declared,
                &HashSet::new(),
                Position::START,
            )
            .unwrap_err();
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn default_policy_only_applies_when_caller_omits_parameter() {
        let fields = vec![field(
            "updated_at",
            None,
            Some(OpCfg {
                default: Some("now()".to_owned()),
                parameter: None,
            }),
        )];
        let processor = SystemFieldProcessor::new(&fields);
        let declared: HashSet<String> = ["updated_at".to_owned()].into();
        let plan = processor
            .process(StatementKind::Update, &declared, &HashSet::new(), Position::START)
            .unwrap();
        assert!(plan.implicit_parameters.is_empty());
    }
}
