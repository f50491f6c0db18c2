// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Typed AST over the [`crate::syntax::SyntaxNode`] tree built by
//! [`crate::grammar`], exposing the per-clause accessors the rest of the
//! pipeline (system fields, response affinity, instruction generation)
//! needs without re-walking raw tokens.

mod dml;
mod query;

pub use dml::*;
pub use query::*;
pub use rowan::ast::AstNode;

use crate::syntax::{SyntaxKind, SyntaxToken};

impl SyntaxKind {
    pub(crate) fn is_trivia_kind(self) -> bool {
        matches!(
            self,
            SyntaxKind::Whitespace
                | SyntaxKind::LineComment
                | SyntaxKind::BlockComment
                | SyntaxKind::DirectiveComment
                | SyntaxKind::EvalComment
                | SyntaxKind::DialectComment
        )
    }
}

/// Splits `text` on top-level occurrences of `,`, respecting parentheses
/// and quoted strings — just enough structure to pull apart a SELECT list
/// or VALUES tuple without a full expression parser.
pub(crate) fn split_top_level_commas(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut current = String::new();

    for ch in text.chars() {
        match quote {
            Some(q) => {
                current.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                '(' => {
                    depth += 1;
                    current.push(ch);
                }
                ')' => {
                    depth -= 1;
                    current.push(ch);
                }
                ',' if depth == 0 => {
                    out.push(std::mem::take(&mut current).trim().to_owned());
                }
                _ => current.push(ch),
            },
        }
    }
    let last = current.trim();
    if !last.is_empty() {
        out.push(last.to_owned());
    }
    out
}

macro_rules! typed_syntax {
    ($synty:ty, $astty:ty, $name:ident $(; { $( $additional:item )+ } )? ) => {
        #[derive(Debug, Eq, PartialEq)]
        pub struct $name {
            pub(crate) syntax: $synty,
        }

        impl $astty for $name {
            $( $( $additional )+ )?

            fn can_cast(kind: crate::syntax::SyntaxKind) -> bool {
                kind == crate::syntax::SyntaxKind::$name
            }

            fn cast(syntax: $synty) -> Option<Self> {
                if Self::can_cast(syntax.kind()) {
                    Some(Self { syntax })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &$synty {
                &self.syntax
            }
        }
    };
}

macro_rules! typed_syntax_node {
    ($( $name:ident ),+ $(,)?) => {
        $(
            crate::ast::typed_syntax!(crate::syntax::SyntaxNode, crate::ast::AstNode, $name; {
                type Language = crate::syntax::SqlTemplateLang;
            });
        )+
    };
}

macro_rules! typed_syntax_token {
    ($( $name:ident ),+ $(,)?) => {
        $( crate::ast::typed_syntax!(crate::syntax::SyntaxToken, crate::ast::AstToken, $name); )+
    };
}

pub(self) use {typed_syntax, typed_syntax_node, typed_syntax_token};

pub trait AstToken {
    fn can_cast(kind: SyntaxKind) -> bool
    where
        Self: Sized;

    fn cast(token: SyntaxToken) -> Option<Self>
    where
        Self: Sized;

    fn syntax(&self) -> &SyntaxToken;

    fn text(&self) -> &str {
        self.syntax().text()
    }
}

typed_syntax_node!(Root);

impl Root {
    pub fn select_stmt(&self) -> Option<SelectStmt> {
        self.syntax.children().find_map(SelectStmt::cast)
    }

    pub fn insert_stmt(&self) -> Option<InsertStmt> {
        self.syntax.children().find_map(InsertStmt::cast)
    }

    pub fn update_stmt(&self) -> Option<UpdateStmt> {
        self.syntax.children().find_map(UpdateStmt::cast)
    }

    pub fn delete_stmt(&self) -> Option<DeleteStmt> {
        self.syntax.children().find_map(DeleteStmt::cast)
    }

    pub fn has_with_clause(&self) -> bool {
        self.syntax
            .children()
            .any(|n| n.kind() == SyntaxKind::WithClause)
    }
}
