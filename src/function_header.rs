// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Parses the leading `/*# ... */` YAML header into a [`FunctionDefinition`]
//! (spec §4.4): `name`, `function_name`, `description`, and a `parameters`
//! tree whose YAML shape (scalar string / one-element sequence / mapping)
//! is recursively lowered into [`ParamType`].

use crate::position::Position;
use crate::schema::{FunctionDefinition, ParamType};
use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("{pos}: function header parse error: {message}")]
pub struct FunctionHeaderError {
    pub pos: Position,
    pub message: String,
}

/// The raw shape parameters take in YAML, before being lowered to
/// [`ParamType`]: a leaf type name, a one-element sequence naming the
/// array's element type, or a mapping of nested fields.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawParamSpec {
    Scalar(String),
    Array([Box<RawParamSpec>; 1]),
    Object(IndexMap<String, RawParamSpec>),
}

impl From<RawParamSpec> for ParamType {
    fn from(raw: RawParamSpec) -> Self {
        match raw {
            RawParamSpec::Scalar(name) => ParamType::Scalar { name },
            RawParamSpec::Array([element]) => ParamType::Array {
                element: Box::new(ParamType::from(*element)),
            },
            RawParamSpec::Object(fields) => ParamType::Object {
                fields: fields
                    .into_iter()
                    .map(|(name, spec)| (name, ParamType::from(spec)))
                    .collect(),
            },
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawHeader {
    #[serde(default)]
    name: String,
    #[serde(default)]
    function_name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    parameters: IndexMap<String, RawParamSpec>,
}

/// Strips the `/*# ... */` delimiters from the header comment's raw text
/// and parses its body as YAML.
pub fn parse_function_header(
    comment_text: &str,
    pos: Position,
) -> Result<FunctionDefinition, FunctionHeaderError> {
    let body = comment_text
        .strip_prefix("/*#")
        .and_then(|s| s.strip_suffix("*/"))
        .unwrap_or(comment_text);

    let raw: RawHeader = serde_yaml::from_str(body).map_err(|e| FunctionHeaderError {
        pos,
        message: e.to_string(),
    })?;

    Ok(FunctionDefinition {
        name: raw.name,
        function_name: raw.function_name,
        description: raw.description,
        parameters: raw
            .parameters
            .into_iter()
            .map(|(name, spec)| (name, ParamType::from(spec)))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: Position = Position::START;

    #[test]
    fn parses_scalar_parameters() {
        let def = parse_function_header(
            "/*#\nname: find_user\nfunction_name: find_user\nparameters:\n  active: bool\n*/",
            P,
        )
        .unwrap();
        assert_eq!(def.name, "find_user");
        assert_eq!(
            def.parameters.get("active"),
            Some(&ParamType::scalar("bool"))
        );
    }

    #[test]
    fn parses_nested_object_and_array_parameters() {
        let def = parse_function_header(
            "/*#\nname: x\nparameters:\n  user:\n    name: string\n  tags:\n    - string\n*/",
            P,
        )
        .unwrap();
        match def.parameters.get("user").unwrap() {
            ParamType::Object { fields } => {
                assert_eq!(fields.get("name"), Some(&ParamType::scalar("string")));
            }
            other => panic!("expected object, got {other:?}"),
        }
        match def.parameters.get("tags").unwrap() {
            ParamType::Array { element } => {
                assert_eq!(**element, ParamType::scalar("string"));
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn preserves_parameter_order() {
        let def = parse_function_header(
            "/*#\nname: x\nparameters:\n  b: int\n  a: int\n*/",
            P,
        )
        .unwrap();
        let keys: Vec<_> = def.parameters.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let err = parse_function_header("/*# : : : */", P).unwrap_err();
        assert_eq!(err.pos, P);
    }
}
