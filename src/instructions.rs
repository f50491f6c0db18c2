// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Lowers a clause-tagged token stream into the closed IR instruction set
//! (spec §4.8, component H), including the delimiter-elision algorithm and
//! the SELECT-tail pagination sequence.

use crate::dialect::Dialect;
use crate::dialect_patterns::DialectConversion;
use crate::explang::{self, CelExpression, ExplangError};
use crate::position::Position;
use crate::schema::EnvironmentTree;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Instruction {
    EmitStatic {
        pos: Position,
        value: String,
    },
    EmitEval {
        pos: Position,
        exp: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    EmitParam {
        pos: Position,
        param: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    EmitSystemValue {
        pos: Position,
        param: String,
    },
    If {
        pos: Position,
        exp: u32,
    },
    ElseIf {
        pos: Position,
        exp: u32,
    },
    Else {
        pos: Position,
    },
    End {
        pos: Position,
    },
    LoopStart {
        pos: Position,
        variable: String,
        #[serde(rename = "exp")]
        collection: u32,
        end_label: u32,
    },
    LoopEnd {
        pos: Position,
        variable: String,
        label: u32,
    },
    Boundary {
        pos: Position,
    },
    EmitUnlessBoundary {
        pos: Position,
        value: String,
    },
    IfSystemLimit {
        pos: Position,
    },
    EmitSystemLimit {
        pos: Position,
    },
    IfSystemOffset {
        pos: Position,
    },
    EmitSystemOffset {
        pos: Position,
    },
    EmitForClause {
        pos: Position,
    },
    Dialect {
        pos: Position,
        selector: String,
    },
}

/// A unit of input the generator consumes, in source order. Built by the
/// statement parser/directive walker from the token stream: literal text
/// runs, directive markers, and clause boundaries.
#[derive(Debug, Clone)]
pub enum Event {
    Text(String, Position),
    If { condition: String, pos: Position },
    ElseIf { condition: String, pos: Position },
    Else(Position),
    For { var: String, collection: String, pos: Position },
    End(Position),
    Eval { expr: String, pos: Position },
    SystemValue { name: String, pos: Position },
    /// A detected `/*@ ... */` dialect conversion (spec §4.9, component I):
    /// `selector` is the directive's own label, `conversion` is what the
    /// detector found immediately following it in the token stream.
    Dialect {
        selector: String,
        conversion: DialectConversion,
        pos: Position,
    },
    /// A clause boundary: entering WHERE, FROM, ORDER BY, the end of a
    /// parenthesized list, etc. (spec §4.8).
    ClauseBoundary(Position),
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum GeneratorError {
    #[error("{0}")]
    Explang(String),
    #[error("end without a matching if/for")]
    UnmatchedEnd,
}

impl From<ExplangError> for GeneratorError {
    fn from(e: ExplangError) -> Self {
        GeneratorError::Explang(e.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
enum BlockKind {
    Conditional,
    Loop,
}

struct OpenBlock {
    start: usize,
    kind: BlockKind,
    /// Loop-only: variable name and label, needed for `LOOP_END`.
    loop_var: Option<String>,
    label: u32,
}

pub struct Generator<'a> {
    env_tree: &'a mut EnvironmentTree,
    expressions: Vec<CelExpression>,
    output: Vec<Instruction>,
    static_buf: String,
    static_pos: Option<Position>,
    blocks: Vec<OpenBlock>,
    env_stack: Vec<usize>,
    next_expr_id: u32,
    next_label: u32,
}

impl<'a> Generator<'a> {
    pub fn new(env_tree: &'a mut EnvironmentTree) -> Self {
        Self {
            env_tree,
            expressions: Vec::new(),
            output: Vec::new(),
            static_buf: String::new(),
            static_pos: None,
            blocks: Vec::new(),
            env_stack: vec![0],
            next_expr_id: 0,
            next_label: 0,
        }
    }

    pub fn current_env(&self) -> usize {
        *self.env_stack.last().unwrap()
    }

    fn compile_expr(&mut self, source: &str, pos: Position) -> Result<u32, GeneratorError> {
        let id = self.next_expr_id;
        self.next_expr_id += 1;
        log::trace!("{pos}: expression #{id} {source:?} in env {}", self.current_env());
        let expr = explang::compile_expression(id, source, pos, self.current_env(), self.env_tree)?;
        self.expressions.push(expr);
        Ok(id)
    }

    fn push_text(&mut self, text: &str, pos: Position) {
        if self.static_pos.is_none() {
            self.static_pos = Some(pos);
        }
        self.static_buf.push_str(text);
    }

    fn flush_static(&mut self) {
        if !self.static_buf.is_empty() {
            self.output.push(Instruction::EmitStatic {
                pos: self.static_pos.take().unwrap(),
                value: std::mem::take(&mut self.static_buf),
            });
        }
        self.static_pos = None;
    }

    /// Applies delimiter elision to the instructions emitted since `start`
    /// (spec §4.8): a leading `,`/`AND`/`OR` becomes `EMIT_UNLESS_BOUNDARY`
    /// at the top of the block; a trailing `,` becomes
    /// `EMIT_UNLESS_BOUNDARY` at the bottom.
    fn elide_delimiters(&mut self, start: usize) {
        if start < self.output.len() {
            if let Instruction::EmitStatic { pos, value } = &self.output[start] {
                if let Some((delim, rest)) = split_leading_delimiter(value) {
                    let pos = *pos;
                    let rest = rest.to_owned();
                    self.output[start] = Instruction::EmitUnlessBoundary {
                        pos,
                        value: delim.to_owned(),
                    };
                    if !rest.is_empty() {
                        self.output.insert(
                            start + 1,
                            Instruction::EmitStatic {
                                pos,
                                value: rest,
                            },
                        );
                    }
                }
            }
        }

        let last = self.output.len().saturating_sub(1);
        if last >= start {
            if let Instruction::EmitStatic { pos, value } = &self.output[last] {
                if let Some((prefix, delim)) = split_trailing_comma(value) {
                    let pos = *pos;
                    let prefix = prefix.to_owned();
                    let delim = delim.to_owned();
                    if prefix.is_empty() {
                        self.output[last] = Instruction::EmitUnlessBoundary { pos, value: delim };
                    } else {
                        self.output[last] = Instruction::EmitStatic { pos, value: prefix };
                        self.output
                            .push(Instruction::EmitUnlessBoundary { pos, value: delim });
                    }
                }
            }
        }
    }

    fn close_block(&mut self) -> Result<OpenBlock, GeneratorError> {
        self.flush_static();
        let block = self.blocks.pop().ok_or(GeneratorError::UnmatchedEnd)?;
        self.elide_delimiters(block.start);
        Ok(block)
    }

    pub fn text(&mut self, text: &str, pos: Position) {
        self.push_text(text, pos);
    }

    pub fn eval(&mut self, expr: &str, pos: Position) -> Result<(), GeneratorError> {
        self.flush_static();
        let id = self.compile_expr(expr, pos)?;
        self.output.push(Instruction::EmitEval {
            pos,
            exp: id,
            placeholder: None,
        });
        Ok(())
    }

    pub fn system_value(&mut self, name: &str, pos: Position) {
        self.flush_static();
        self.output.push(Instruction::EmitSystemValue {
            pos,
            param: name.to_owned(),
        });
    }

    /// Lowers a detected dialect conversion into a `DIALECT` selector
    /// followed by one `EMIT_STATIC` branch per supported dialect, in
    /// [`Dialect::ALL`] order (spec §4.9).
    pub fn dialect(&mut self, selector: &str, conversion: &DialectConversion, pos: Position) {
        self.flush_static();
        self.output.push(Instruction::Dialect {
            pos,
            selector: selector.to_owned(),
        });
        for dialect in Dialect::ALL {
            self.output.push(Instruction::EmitStatic {
                pos,
                value: conversion.render(dialect),
            });
        }
    }

    pub fn param(&mut self, name: &str, pos: Position) {
        self.flush_static();
        self.output.push(Instruction::EmitParam {
            pos,
            param: name.to_owned(),
            placeholder: None,
        });
    }

    pub fn if_start(&mut self, condition: &str, pos: Position) -> Result<(), GeneratorError> {
        self.flush_static();
        let id = self.compile_expr(condition, pos)?;
        self.output.push(Instruction::If { pos, exp: id });
        self.blocks.push(OpenBlock {
            start: self.output.len(),
            kind: BlockKind::Conditional,
            loop_var: None,
            label: 0,
        });
        Ok(())
    }

    pub fn elseif(&mut self, condition: &str, pos: Position) -> Result<(), GeneratorError> {
        self.close_block()?;
        let id = self.compile_expr(condition, pos)?;
        self.output.push(Instruction::ElseIf { pos, exp: id });
        self.blocks.push(OpenBlock {
            start: self.output.len(),
            kind: BlockKind::Conditional,
            loop_var: None,
            label: 0,
        });
        Ok(())
    }

    pub fn else_branch(&mut self, pos: Position) -> Result<(), GeneratorError> {
        self.close_block()?;
        self.output.push(Instruction::Else { pos });
        self.blocks.push(OpenBlock {
            start: self.output.len(),
            kind: BlockKind::Conditional,
            loop_var: None,
            label: 0,
        });
        Ok(())
    }

    /// Spec §4.5: the collection expression is validated in the *parent*
    /// environment, since the loop variable is not yet bound.
    pub fn for_start(
        &mut self,
        var: &str,
        collection: &str,
        pos: Position,
    ) -> Result<(), GeneratorError> {
        self.flush_static();
        let collection_id = self.compile_expr(collection, pos)?;
        let element_type = crate::schema::ParamType::scalar("any");
        let child = self
            .env_tree
            .push_child(self.current_env(), var.to_owned(), element_type);
        self.env_stack.push(child);

        let label = self.next_label;
        self.next_label += 1;
        self.output.push(Instruction::LoopStart {
            pos,
            variable: var.to_owned(),
            collection: collection_id,
            end_label: label,
        });
        self.blocks.push(OpenBlock {
            start: self.output.len(),
            kind: BlockKind::Loop,
            loop_var: Some(var.to_owned()),
            label,
        });
        Ok(())
    }

    pub fn end(&mut self, pos: Position) -> Result<(), GeneratorError> {
        let block = self.close_block()?;
        match block.kind {
            BlockKind::Conditional => self.output.push(Instruction::End { pos }),
            BlockKind::Loop => {
                self.env_stack.pop();
                self.output.push(Instruction::LoopEnd {
                    pos,
                    variable: block.loop_var.unwrap(),
                    label: block.label,
                });
            }
        }
        Ok(())
    }

    pub fn boundary(&mut self, pos: Position) {
        self.flush_static();
        self.output.push(Instruction::Boundary { pos });
    }

    /// Appends the fixed SELECT-tail pagination sequence (spec §4.8):
    /// `IF_SYSTEM_LIMIT`/`IF_SYSTEM_OFFSET` pairs and a trailing
    /// `EMIT_FOR_CLAUSE`, each only when the source didn't already carry
    /// the corresponding clause.
    pub fn select_tail(
        &mut self,
        pos: Position,
        has_limit: bool,
        has_offset: bool,
        has_for_update: bool,
    ) {
        self.flush_static();
        if !has_limit {
            self.output.push(Instruction::IfSystemLimit { pos });
            self.output.push(Instruction::EmitStatic {
                pos,
                value: " LIMIT ".to_owned(),
            });
            self.output.push(Instruction::EmitSystemLimit { pos });
            self.output.push(Instruction::End { pos });
        }
        if !has_offset {
            self.output.push(Instruction::IfSystemOffset { pos });
            self.output.push(Instruction::EmitStatic {
                pos,
                value: " OFFSET ".to_owned(),
            });
            self.output.push(Instruction::EmitSystemOffset { pos });
            self.output.push(Instruction::End { pos });
        }
        if !has_for_update {
            self.output.push(Instruction::EmitForClause { pos });
        }
    }

    /// Replays a linear [`Event`] sequence produced by [`crate::lower::lower`]
    /// through the generator in order.
    pub fn run_events(&mut self, events: &[Event]) -> Result<(), GeneratorError> {
        for event in events {
            match event {
                Event::Text(text, pos) => self.text(text, *pos),
                Event::If { condition, pos } => self.if_start(condition, *pos)?,
                Event::ElseIf { condition, pos } => self.elseif(condition, *pos)?,
                Event::Else(pos) => self.else_branch(*pos)?,
                Event::For { var, collection, pos } => self.for_start(var, collection, *pos)?,
                Event::End(pos) => self.end(*pos)?,
                Event::Eval { expr, pos } => self.eval(expr, *pos)?,
                Event::SystemValue { name, pos } => self.system_value(name, *pos),
                Event::Dialect {
                    selector,
                    conversion,
                    pos,
                } => self.dialect(selector, conversion, *pos),
                Event::ClauseBoundary(pos) => self.boundary(*pos),
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> (Vec<Instruction>, Vec<CelExpression>) {
        self.flush_static();
        (self.output, self.expressions)
    }
}

fn split_leading_delimiter(text: &str) -> Option<(&str, &str)> {
    let trimmed_start = text.len() - text.trim_start().len();
    let body = &text[trimmed_start..];
    let delim_len = if body.starts_with(',') {
        1
    } else if body.len() >= 3 && body[..3].eq_ignore_ascii_case("and") && word_boundary(body, 3) {
        3
    } else if body.len() >= 2 && body[..2].eq_ignore_ascii_case("or") && word_boundary(body, 2) {
        2
    } else {
        return None;
    };
    Some((&text[..trimmed_start + delim_len], &text[trimmed_start + delim_len..]))
}

fn word_boundary(s: &str, at: usize) -> bool {
    s[at..].chars().next().map_or(true, |c| !c.is_alphanumeric())
}

fn split_trailing_comma(text: &str) -> Option<(&str, &str)> {
    let trimmed_end = text.trim_end();
    if trimmed_end.ends_with(',') {
        let delim_start = trimmed_end.len() - 1;
        Some((&text[..delim_start], &text[delim_start..]))
    } else {
        None
    }
}
