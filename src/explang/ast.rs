// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! The explang AST (spec §4.5): full operator trees for parsing, reduced to
//! flat [`Step`] paths for the schema validator and the serialized IR.

use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Root,
    Field,
    Index,
    Call,
}

/// One element of a path expression's spine, exactly as spec §3 describes:
/// `{kind, value, pos}`. `value` is the root/field/function name, or the
/// index expression's raw source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub kind: StepKind,
    pub value: String,
    pub pos: Position,
}

/// A single segment of a path, richer than [`Step`]: index and call
/// segments keep their nested sub-expressions (for arity checking and for
/// finding the paths nested inside an index/argument), which don't survive
/// into the serialized `Step` form.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Root(String),
    Field(String),
    Index { text: String, expr: Box<Expr> },
    Call { name: String, args: Vec<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub segments: Vec<(Segment, Position)>,
}

impl Path {
    pub fn to_steps(&self) -> Vec<Step> {
        self.segments
            .iter()
            .map(|(segment, pos)| {
                let (kind, value) = match segment {
                    Segment::Root(name) => (StepKind::Root, name.clone()),
                    Segment::Field(name) => (StepKind::Field, name.clone()),
                    Segment::Index { text, .. } => (StepKind::Index, text.clone()),
                    Segment::Call { name, .. } => (StepKind::Call, name.clone()),
                };
                Step {
                    kind,
                    value,
                    pos: *pos,
                }
            })
            .collect()
    }

    pub fn root_name(&self) -> Option<&str> {
        match self.segments.first() {
            Some((Segment::Root(name), _)) => Some(name),
            _ => None,
        }
    }

    /// True when the path opens with a free function call (`size(x)`)
    /// rather than a schema-rooted name (`x.size()`).
    pub fn starts_with_call(&self) -> bool {
        matches!(self.segments.first(), Some((Segment::Call { .. }, _)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Path(Path),
    Literal(Literal),
    List(Vec<Expr>),
    Map(Vec<(Expr, Expr)>),
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
}

/// Collects every path sub-expression appearing anywhere in `expr`,
/// including ones nested inside index brackets and call arguments. Each
/// path is validated independently against the schema (spec §4.5); explang
/// does not type-check arithmetic/logical combination itself.
pub fn collect_paths(expr: &Expr) -> Vec<&Path> {
    let mut out = Vec::new();
    walk_expr(expr, &mut out);
    out
}

fn walk_expr<'a>(expr: &'a Expr, out: &mut Vec<&'a Path>) {
    match expr {
        Expr::Path(path) => {
            out.push(path);
            for (segment, _) in &path.segments {
                match segment {
                    Segment::Index { expr, .. } => walk_expr(expr, out),
                    Segment::Call { args, .. } => args.iter().for_each(|e| walk_expr(e, out)),
                    Segment::Root(_) | Segment::Field(_) => {}
                }
            }
        }
        Expr::Literal(_) => {}
        Expr::List(items) => items.iter().for_each(|e| walk_expr(e, out)),
        Expr::Map(entries) => entries.iter().for_each(|(k, v)| {
            walk_expr(k, out);
            walk_expr(v, out);
        }),
        Expr::Unary(_, inner) => walk_expr(inner, out),
        Expr::Binary(_, lhs, rhs) => {
            walk_expr(lhs, out);
            walk_expr(rhs, out);
        }
        Expr::Ternary(cond, then, alt) => {
            walk_expr(cond, out);
            walk_expr(then, out);
            walk_expr(alt, out);
        }
    }
}
