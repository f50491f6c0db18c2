// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Validates explang paths against the parameter/environment schema
//! (spec §4.5): root existence, field/index descent, and call arity.

use super::ast::{collect_paths, Expr, Segment};
use crate::position::Position;
use crate::schema::{EnvironmentTree, ParamType};

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ExplangValidationError {
    #[error("{pos}: unknown root {name:?}")]
    UnknownRoot { name: String, pos: Position },
    #[error("{pos}: unknown field {name:?}")]
    UnknownField { name: String, pos: Position },
    #[error("{pos}: {name:?} is not indexable")]
    NotIndexable { name: String, pos: Position },
    #[error("{pos}: wrong number of arguments calling {name:?}")]
    WrongArity { name: String, pos: Position },
}

/// Builtins with a known arity (spec §4.5), expressed as the set of
/// argument counts accepted under either calling convention: the CEL
/// free-function form `f(recv, ...)` or the dotted method form
/// `recv.f(...)`, which leaves the receiver implicit.
fn builtin_arities(name: &str) -> Option<&'static [usize]> {
    match name {
        "size" | "has" | "string" | "upper" | "lower" => Some(&[0, 1]),
        "startsWith" | "in" => Some(&[1, 2]),
        _ => None,
    }
}

/// Validates every path found anywhere inside `expr` (including ones
/// nested in index brackets or call arguments) against the schema visible
/// at `env_index`. Returns the first violation found, since explang errors
/// are fatal (spec §7) — there is no value in accumulating more than one.
pub fn validate_expr(
    expr: &Expr,
    tree: &EnvironmentTree,
    env_index: usize,
) -> Result<(), ExplangValidationError> {
    for path in collect_paths(expr) {
        validate_path_segments(&path.segments, tree, env_index)?;
    }
    Ok(())
}

fn validate_path_segments(
    segments: &[(Segment, Position)],
    tree: &EnvironmentTree,
    env_index: usize,
) -> Result<(), ExplangValidationError> {
    let mut current: Option<ParamType> = None;

    for (segment, pos) in segments {
        match segment {
            Segment::Root(name) => match tree.resolve(env_index, name) {
                Some(ty) => current = Some(ty.clone()),
                None => {
                    return Err(ExplangValidationError::UnknownRoot {
                        name: name.clone(),
                        pos: *pos,
                    })
                }
            },
            Segment::Field(name) => {
                let Some(ty) = current.as_ref() else {
                    continue;
                };
                match ty.field(name) {
                    Some(field_ty) => current = Some(field_ty.clone()),
                    None => {
                        return Err(ExplangValidationError::UnknownField {
                            name: name.clone(),
                            pos: *pos,
                        })
                    }
                }
            }
            Segment::Index { text, .. } => {
                let Some(ty) = current.as_ref() else {
                    continue;
                };
                if !ty.is_indexable() {
                    return Err(ExplangValidationError::NotIndexable {
                        name: text.clone(),
                        pos: *pos,
                    });
                }
                current = ty.element_type().cloned();
            }
            Segment::Call { name, args } => {
                if let Some(allowed) = builtin_arities(name) {
                    if !allowed.contains(&args.len()) {
                        return Err(ExplangValidationError::WrongArity {
                            name: name.clone(),
                            pos: *pos,
                        });
                    }
                }
                current = Some(ParamType::scalar("any"));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explang::parser::Parser;
    use indexmap::IndexMap;

    fn tree() -> EnvironmentTree {
        let mut user_fields = IndexMap::new();
        user_fields.insert("name".to_owned(), ParamType::scalar("string"));
        let mut profile_fields = IndexMap::new();
        profile_fields.insert(
            "profile".to_owned(),
            ParamType::Object {
                fields: user_fields,
            },
        );
        let mut root = IndexMap::new();
        root.insert(
            "user".to_owned(),
            ParamType::Object {
                fields: profile_fields,
            },
        );
        root.insert(
            "tags".to_owned(),
            ParamType::Array {
                element: Box::new(ParamType::scalar("string")),
            },
        );
        EnvironmentTree::new(ParamType::Object { fields: root })
    }

    fn parse(src: &str) -> Expr {
        Parser::new(src, Position::START).parse().unwrap()
    }

    #[test]
    fn validates_known_nested_field() {
        let expr = parse("user.profile.name");
        validate_expr(&expr, &tree(), 0).unwrap();
    }

    #[test]
    fn rejects_unknown_field() {
        let expr = parse("user.profile.nickname");
        let err = validate_expr(&expr, &tree(), 0).unwrap_err();
        assert!(matches!(err, ExplangValidationError::UnknownField { name, .. } if name == "nickname"));
    }

    #[test]
    fn rejects_unknown_root() {
        let expr = parse("bogus.field");
        let err = validate_expr(&expr, &tree(), 0).unwrap_err();
        assert!(matches!(err, ExplangValidationError::UnknownRoot { .. }));
    }

    #[test]
    fn validates_array_index() {
        let expr = parse("tags[0]");
        validate_expr(&expr, &tree(), 0).unwrap();
    }

    #[test]
    fn rejects_indexing_a_non_array() {
        let expr = parse("user[0]");
        let err = validate_expr(&expr, &tree(), 0).unwrap_err();
        assert!(matches!(err, ExplangValidationError::NotIndexable { .. }));
    }

    #[test]
    fn accepts_known_builtin_call() {
        let expr = parse("tags.size()");
        validate_expr(&expr, &tree(), 0).unwrap();
    }

    #[test]
    fn rejects_wrong_arity_builtin_call() {
        let expr = parse("user.startsWith(a, b, c)");
        let err = validate_expr(&expr, &tree(), 0).unwrap_err();
        assert!(matches!(err, ExplangValidationError::WrongArity { .. }));
    }
}
