// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Source positions, tracked independently of the [`rowan`] tree so error
//! reporting works even before a tree exists (tokenizer / directive errors).

use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A 1-based line/column position plus a 0-based byte offset into the source.
///
/// Serializes as the `[line, col, offset]` triple the IR wire format calls
/// for (spec §6), not as a `{line, column, offset}` object.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: u32,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: u32) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    pub const START: Position = Position {
        line: 1,
        column: 1,
        offset: 0,
    };
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Serialize for Position {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut tup = serializer.serialize_tuple(3)?;
        tup.serialize_element(&self.line)?;
        tup.serialize_element(&self.column)?;
        tup.serialize_element(&self.offset)?;
        tup.end()
    }
}

struct PositionVisitor;

impl<'de> Visitor<'de> for PositionVisitor {
    type Value = Position;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a [line, column, offset] triple")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let line = seq
            .next_element()?
            .ok_or_else(|| serde::de::Error::invalid_length(0, &self))?;
        let column = seq
            .next_element()?
            .ok_or_else(|| serde::de::Error::invalid_length(1, &self))?;
        let offset = seq
            .next_element()?
            .ok_or_else(|| serde::de::Error::invalid_length(2, &self))?;
        Ok(Position::new(line, column, offset))
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_tuple(3, PositionVisitor)
    }
}

/// Tracks line/column as bytes are consumed, so the lexer can stamp every
/// token with a [`Position`] in a single left-to-right pass.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line: u32,
    column: u32,
}

impl Default for LineIndex {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl LineIndex {
    pub fn position(&self, offset: u32) -> Position {
        Position::new(self.line, self.column, offset)
    }

    /// Advances the index past `text`, which must be the literal source text
    /// between the previous and next call's offsets.
    pub fn advance(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}
