// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! The three optional YAML side-inputs (spec §6): a parameter schema, a
//! table schema (for response-affinity primary-key lookups), and a dialect
//! configuration (dialect choice plus system-field policies).

use crate::dialect::Dialect;
use indexmap::IndexMap;
use serde::Deserialize;

/// Recognized keys: `name`, `function_name`, `description`, `parameters`.
/// Structurally identical to the embedded header (spec §4.4); kept as a
/// separate type since the two are loaded from different places even
/// though [`crate::function_header::parse_function_header`] does the
/// actual parameter-tree lowering for both.
pub type FunctionHeaderConfig = crate::schema::FunctionDefinition;

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnSchema {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, rename = "primary_key")]
    pub primary_key: bool,
    #[serde(default, rename = "max_length")]
    pub max_length: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableSchema {
    pub columns: IndexMap<String, ColumnSchema>,
}

impl TableSchema {
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, col)| col.primary_key)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TablesSchemaConfig {
    #[serde(default)]
    pub tables: IndexMap<String, TableSchema>,
}

#[derive(Debug, Clone, Copy, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SystemFieldParameterMode {
    Implicit,
    Explicit,
    Error,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct SystemFieldOperationConfig {
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub parameter: Option<SystemFieldParameterMode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemFieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, rename = "on_insert")]
    pub on_insert: Option<SystemFieldOperationConfig>,
    #[serde(default, rename = "on_update")]
    pub on_update: Option<SystemFieldOperationConfig>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DialectConfig {
    #[serde(default)]
    pub dialect: Dialect,
    #[serde(default)]
    pub system: SystemConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SystemConfig {
    #[serde(default)]
    pub fields: Vec<SystemFieldSpec>,
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("failed to parse {kind} config: {message}")]
pub struct ConfigError {
    pub kind: &'static str,
    pub message: String,
}

pub fn load_tables_schema(yaml: &str) -> Result<TablesSchemaConfig, ConfigError> {
    serde_yaml::from_str(yaml).map_err(|e| ConfigError {
        kind: "tables schema",
        message: e.to_string(),
    })
}

pub fn load_dialect_config(yaml: &str) -> Result<DialectConfig, ConfigError> {
    serde_yaml::from_str(yaml).map_err(|e| ConfigError {
        kind: "dialect",
        message: e.to_string(),
    })
}
