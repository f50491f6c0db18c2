// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Implements a syntax-level representation of the input.

use num_traits::{FromPrimitive, ToPrimitive};

pub use generated::SyntaxKind;

mod generated;

/// Dummy type for our SQL template language definition, for use with rowan.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum SqlTemplateLang {}

impl rowan::Language for SqlTemplateLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        Self::Kind::from_u16(raw.0).unwrap()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind.to_u16().unwrap())
    }
}

/// Typed [`SyntaxNode`] with our [`SqlTemplateLang`] language definition.
pub type SyntaxNode = rowan::SyntaxNode<SqlTemplateLang>;
/// Typed [`SyntaxToken`] with our [`SqlTemplateLang`] language definition.
pub type SyntaxToken = rowan::SyntaxToken<SqlTemplateLang>;
/// Typed [`SyntaxElement`] with our [`SqlTemplateLang`] language definition.
#[allow(unused)]
pub type SyntaxElement = rowan::SyntaxElement<SqlTemplateLang>;
