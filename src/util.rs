// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Miscellaneous helpers shared across the pipeline.

use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A SQL identifier, with the case-folding/quoting rules column names and
/// system-field names are compared under (spec §4.6): quoted identifiers
/// compare case-sensitively and exactly, unquoted ones case-insensitively.
#[derive(Clone, Debug, Eq, Serialize)]
pub struct SqlIdent {
    name: String,
    is_quoted: bool,
}

impl SqlIdent {
    pub fn new<S>(name: S, is_quoted: bool) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            is_quoted,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl From<&str> for SqlIdent {
    fn from(s: &str) -> Self {
        if let Some(inner) = s.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
            Self::new(inner.replace("\"\"", "\""), true)
        } else {
            Self::new(s, false)
        }
    }
}

impl fmt::Display for SqlIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let escape = |s: &str| s.replace('\"', "\"\"");

        if self.is_quoted {
            write!(f, "\"{}\"", escape(&self.name))
        } else {
            write!(f, "{}", self.name)
        }
    }
}

impl PartialEq for SqlIdent {
    fn eq(&self, other: &Self) -> bool {
        if self.is_quoted != other.is_quoted {
            return false;
        }

        if self.is_quoted {
            self.name == other.name
        } else {
            self.name.to_lowercase() == other.name.to_lowercase()
        }
    }
}

impl Hash for SqlIdent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.is_quoted.hash(state);

        if self.is_quoted {
            self.name.hash(state);
        } else {
            self.name.to_lowercase().hash(state);
        }
    }
}
