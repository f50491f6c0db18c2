// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! The SQL dialect the tokenizer and dialect pattern detector are
//! parameterized over (spec §4.1, §4.9).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Default,
    Postgres,
    Mysql,
    Sqlite,
}

impl Dialect {
    /// Every supported dialect, in the fixed order the dialect pattern
    /// detector emits parallel `EMIT_STATIC` branches in (spec §4.9).
    pub const ALL: [Dialect; 4] = [Dialect::Default, Dialect::Postgres, Dialect::Mysql, Dialect::Sqlite];

    /// Whether `$$ ... $$` / `$tag$ ... $tag$` dollar-quoted strings are
    /// recognized by the tokenizer (spec §4.1).
    pub fn supports_dollar_quoting(self) -> bool {
        matches!(self, Dialect::Postgres | Dialect::Default)
    }

    /// Whether backtick-quoted identifiers are recognized (MySQL).
    pub fn supports_backtick_idents(self) -> bool {
        matches!(self, Dialect::Mysql)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Default => "default",
            Dialect::Postgres => "postgres",
            Dialect::Mysql => "mysql",
            Dialect::Sqlite => "sqlite",
        };
        f.write_str(name)
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Dialect::Default),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::Mysql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            other => Err(format!("unknown dialect: {other}")),
        }
    }
}
