// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! The serialized IR document (spec §6): the final output of [`crate::compile`].

use crate::affinity::ResponseAffinity;
use crate::dialect::Dialect;
use crate::explang::CelExpression;
use crate::instructions::Instruction;
use crate::position::Position;
use crate::schema::{Environment, ParamType};
use crate::system_fields::ImplicitParameter;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A parameter in the documented wire shape: a `{name, type, children?}`
/// array element rather than the internal `IndexMap<String, ParamType>`
/// object, with nested object/array element types recursing through
/// `children` instead of `fields`/`items` (spec §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SerializedParameter>,
}

impl SerializedParameter {
    /// Lowers one `(name, ParamType)` pair into the wire shape. An array's
    /// element type becomes a single synthetic `"element"` child, since the
    /// wire format has no separate slot for an array's item type.
    pub fn from_pair(name: &str, ty: &ParamType) -> Self {
        match ty {
            ParamType::Scalar { name: type_name } => SerializedParameter {
                name: name.to_owned(),
                ty: type_name.clone(),
                children: Vec::new(),
            },
            ParamType::Array { element } => SerializedParameter {
                name: name.to_owned(),
                ty: "array".to_owned(),
                children: vec![SerializedParameter::from_pair("element", element)],
            },
            ParamType::Object { fields } => SerializedParameter {
                name: name.to_owned(),
                ty: "object".to_owned(),
                children: serialize_parameters(fields),
            },
        }
    }
}

/// Lowers a declared-parameters map into the documented wire array (spec §6).
pub fn serialize_parameters(parameters: &IndexMap<String, ParamType>) -> Vec<SerializedParameter> {
    parameters
        .iter()
        .map(|(name, ty)| SerializedParameter::from_pair(name, ty))
        .collect()
}

/// Only the serialized fields of a [`CelExpression`] (spec §6): the parsed
/// tree is compile-time-only and never reaches the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedExpression {
    pub id: u32,
    pub source: String,
    pub env_index: usize,
    pub pos: Position,
}

impl From<&CelExpression> for SerializedExpression {
    fn from(expr: &CelExpression) -> Self {
        Self {
            id: expr.id,
            source: expr.source.clone(),
            env_index: expr.env_index,
            pos: expr.pos,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceSchema {
    pub name: String,
    pub function_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub parameters: Vec<SerializedParameter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrDocument {
    pub source: String,
    pub dialect: Dialect,
    pub statement_kind: StatementKind,
    pub interface: InterfaceSchema,
    pub response_affinity: ResponseAffinity,
    pub implicit_parameters: Vec<ImplicitParameter>,
    pub expressions: Vec<SerializedExpression>,
    pub environments: Vec<Environment>,
    pub instructions: Vec<Instruction>,
}
