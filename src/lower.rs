// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: 2024 sqltpl contributors

//! Bridges the tokenized/parsed source (components A–C) to the instruction
//! generator (component H): turns a token stream plus its parsed clause
//! tree into the linear [`crate::instructions::Event`] sequence the
//! generator consumes.

use crate::dialect_patterns;
use crate::directive::{self, Directive, DirectiveValidator};
use crate::error::CompileError;
use crate::instructions::Event;
use crate::lexer::{PositionedToken, TokenKind};
use crate::syntax::SyntaxNode;
use std::collections::HashSet;

/// Converts a tokenized document into generator events, validating
/// directive balance as it goes (spec §4.2). `clause_starts` are byte
/// offsets at which a [`Event::ClauseBoundary`] should be inserted —
/// typically the start offsets of every clause node after the first.
pub fn lower(
    tokens: &[PositionedToken],
    clause_starts: &HashSet<u32>,
) -> Result<Vec<Event>, CompileError> {
    let mut events = Vec::new();
    let mut validator = DirectiveValidator::new();
    let mut text_buf = String::new();
    let mut text_pos = None;

    macro_rules! flush_text {
        () => {
            if !text_buf.is_empty() {
                events.push(Event::Text(std::mem::take(&mut text_buf), text_pos.unwrap()));
                text_pos = None;
            }
        };
    }

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token.kind == TokenKind::Eof {
            break;
        }

        let offset = u32::from(token.range.start());
        if clause_starts.contains(&offset) {
            flush_text!();
            events.push(Event::ClauseBoundary(token.pos));
        }

        match token.kind {
            TokenKind::DirectiveComment => {
                let directive = directive::parse_directive_comment(token.text, token.pos)?;
                validator.visit(&directive, token.pos)?;
                flush_text!();
                push_directive_event(&mut events, directive, token.pos);
                i += 1;
            }
            TokenKind::EvalComment => {
                let directive = directive::parse_eval_comment(token.text);
                flush_text!();
                push_directive_event(&mut events, directive, token.pos);
                i += 1;
            }
            TokenKind::DialectComment => {
                let Directive::Dialect { name } = directive::parse_dialect_comment(token.text) else {
                    unreachable!("parse_dialect_comment always returns Directive::Dialect");
                };
                flush_text!();
                match dialect_patterns::detect(tokens, i + 1) {
                    Some((conversion, consumed)) => {
                        log::trace!("{}: dialect conversion {conversion:?} (selector {name:?})", token.pos);
                        events.push(Event::Dialect {
                            selector: name,
                            conversion,
                            pos: token.pos,
                        });
                        i += 1 + consumed;
                    }
                    None => {
                        log::trace!("{}: dialect directive {name:?} matched no known conversion", token.pos);
                        i += 1;
                    }
                }
            }
            _ => {
                if text_pos.is_none() {
                    text_pos = Some(token.pos);
                }
                text_buf.push_str(token.text);
                i += 1;
            }
        }
    }
    flush_text!();

    let eof_pos = tokens.last().map_or(crate::position::Position::START, |t| t.pos);
    validator.finish(eof_pos)?;

    Ok(events)
}

fn push_directive_event(events: &mut Vec<Event>, directive: Directive, pos: crate::position::Position) {
    log::trace!("{pos}: directive {directive:?}");
    events.push(match directive {
        Directive::If { condition } => Event::If { condition, pos },
        Directive::ElseIf { condition } => Event::ElseIf { condition, pos },
        Directive::Else => Event::Else(pos),
        Directive::For { var, collection } => Event::For { var, collection, pos },
        Directive::End => Event::End(pos),
        Directive::SystemValue { name } => Event::SystemValue { name, pos },
        Directive::Eval { expr } => Event::Eval { expr, pos },
        Directive::Dialect { .. } => {
            unreachable!("dialect directives are detected and consumed directly in lower()")
        }
    });
}

/// Byte offsets at which every non-first direct child node of `stmt`
/// begins — the clause boundaries the generator should emit `BOUNDARY`
/// instructions at (spec §4.8).
pub fn clause_boundaries(stmt: &SyntaxNode) -> HashSet<u32> {
    stmt.children()
        .skip(1)
        .map(|n| u32::from(n.text_range().start()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar;
    use crate::lexer::tokenize;

    #[test]
    fn produces_boundary_and_directive_events() {
        let source = "SELECT id, name/*# if include_email */, email/*# end */ FROM users";
        let tokens = tokenize(source).unwrap();
        let parse = grammar::parse(tokens.clone());
        assert!(parse.ok());
        let stmt = parse.syntax().children().next().unwrap();
        let boundaries = clause_boundaries(&stmt);

        let events = lower(&tokens, &boundaries).unwrap();
        assert!(events.iter().any(|e| matches!(e, Event::If { .. })));
        assert!(events.iter().any(|e| matches!(e, Event::End(_))));
        assert!(events.iter().any(|e| matches!(e, Event::ClauseBoundary(_))));
    }

    #[test]
    fn unbalanced_directive_is_an_error() {
        let source = "SELECT id /*# if x */ FROM users";
        let tokens = tokenize(source).unwrap();
        let err = lower(&tokens, &HashSet::new()).unwrap_err();
        assert!(matches!(err, CompileError::Directive(_)));
    }

    #[test]
    fn dialect_comment_followed_by_cast_becomes_a_dialect_event() {
        let source = "SELECT /*@ pg */active::boolean FROM users";
        let tokens = tokenize(source).unwrap();
        let events = lower(&tokens, &HashSet::new()).unwrap();
        let dialect_event = events
            .iter()
            .find_map(|e| match e {
                Event::Dialect { selector, conversion, .. } => Some((selector, conversion)),
                _ => None,
            })
            .expect("expected a Dialect event");
        assert_eq!(dialect_event.0, "pg");
        assert_eq!(
            dialect_event.1,
            &crate::dialect_patterns::DialectConversion::Cast {
                expr: "active".to_owned(),
                ty: "boolean".to_owned(),
            }
        );
        // the consumed cast tokens must not also appear as plain text
        assert!(!events.iter().any(|e| matches!(e, Event::Text(text, _) if text.contains("active"))));
    }

    #[test]
    fn dialect_comment_with_no_recognizable_conversion_is_dropped() {
        let source = "SELECT /*@ pg */ id FROM users";
        let tokens = tokenize(source).unwrap();
        let events = lower(&tokens, &HashSet::new()).unwrap();
        assert!(!events.iter().any(|e| matches!(e, Event::Dialect { .. })));
        assert!(events.iter().any(|e| matches!(e, Event::Text(text, _) if text.contains("id"))));
    }
}
