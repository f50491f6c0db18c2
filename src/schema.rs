// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Shared data model for the function header (component D) and the
//! expression validator (component E): parameter types and the
//! expression-environment tree (spec §3).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A parameter's declared type, recursively: scalars are leaves, `Array`
/// wraps a single element type, `Object` is an ordered field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamType {
    Scalar {
        #[serde(rename = "type")]
        name: String,
    },
    Array {
        #[serde(rename = "items")]
        element: Box<ParamType>,
    },
    Object {
        fields: IndexMap<String, ParamType>,
    },
}

impl ParamType {
    pub fn scalar(name: impl Into<String>) -> Self {
        ParamType::Scalar { name: name.into() }
    }

    pub fn field(&self, name: &str) -> Option<&ParamType> {
        match self {
            ParamType::Object { fields } => fields.get(name),
            _ => None,
        }
    }

    pub fn element_type(&self) -> Option<&ParamType> {
        match self {
            ParamType::Array { element } => Some(element),
            _ => None,
        }
    }

    pub fn is_indexable(&self) -> bool {
        matches!(self, ParamType::Array { .. })
    }
}

/// `{name, functionName, description, parameters}` parsed from the leading
/// `/*# ... */` YAML header (spec §4.4).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default)]
    pub function_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: IndexMap<String, ParamType>,
}

impl FunctionDefinition {
    /// The schema the expression validator sees as environment 0: an
    /// implicit object whose fields are the declared parameters.
    pub fn root_type(&self) -> ParamType {
        ParamType::Object {
            fields: self.parameters.clone(),
        }
    }
}

/// One frame of the expression-environment tree (spec §3, §4.5): a flat,
/// index-addressed list rather than an object graph, so lookups and
/// serialization stay trivial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_index: Option<usize>,
    pub additional_variables: Vec<EnvironmentVariable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParamType,
}

/// Owns the environment list and answers the chain-lookup questions the
/// validator needs (spec §4.5 "Environment resolution").
#[derive(Debug, Clone, Default)]
pub struct EnvironmentTree {
    pub environments: Vec<Environment>,
}

impl EnvironmentTree {
    pub fn new(root_params: ParamType) -> Self {
        let root_fields = match root_params {
            ParamType::Object { fields } => fields
                .into_iter()
                .map(|(name, ty)| EnvironmentVariable { name, ty })
                .collect(),
            _ => Vec::new(),
        };
        Self {
            environments: vec![Environment {
                index: 0,
                parent_index: None,
                additional_variables: root_fields,
            }],
        }
    }

    /// Pushes a new environment introduced by a `for VAR : COLL` directive,
    /// visible as a child of `parent`, and returns its index.
    pub fn push_child(&mut self, parent: usize, var: String, element_type: ParamType) -> usize {
        let index = self.environments.len();
        self.environments.push(Environment {
            index,
            parent_index: Some(parent),
            additional_variables: vec![EnvironmentVariable {
                name: var,
                ty: element_type,
            }],
        });
        index
    }

    /// Looks up `name` starting at `env_index`, walking the parent chain.
    /// The root environment's variables are always reachable this way,
    /// since every chain terminates at environment 0.
    pub fn resolve(&self, env_index: usize, name: &str) -> Option<&ParamType> {
        let mut current = Some(env_index);
        while let Some(idx) = current {
            let env = &self.environments[idx];
            if let Some(var) = env.additional_variables.iter().find(|v| v.name == name) {
                return Some(&var.ty);
            }
            current = env.parent_index;
        }
        None
    }
}
