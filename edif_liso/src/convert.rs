//! Helpers for lifting netlist declarations out of S-expression trees.
//!
//! This module provides the [`FromSexpr`] trait, a borrowing [`Parser`]
//! cursor over the elements of a list, and [`visit_lists`] for walking a
//! whole tree.

use std::{borrow::Cow, slice::Iter};

use edif_sexpr::{Sexpr, SexprList};

use crate::{reduce::Tag, LisoError, SexprKind};

pub trait FromSexpr<'a>: Sized {
    fn from_sexpr(parser: Parser<'a>) -> Result<Self, LisoError>;
}

pub trait SexprListExt {
    fn tag(&self) -> Tag;
}

impl SexprListExt for [Sexpr] {
    fn tag(&self) -> Tag {
        Tag::of(self)
    }
}

/// A parser used internally for easily lifting fields out of S-expression
/// trees without copying them.
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    inner: Iter<'a, Sexpr>,
}

impl<'a> Parser<'a> {
    pub fn new(inner: &'a [Sexpr]) -> Self {
        Self {
            inner: inner.iter(),
        }
    }

    fn expect_next(&mut self) -> Result<&'a Sexpr, LisoError> {
        self.inner.next().ok_or(LisoError::UnexpectedEndOfList)
    }

    /// Expects the next sexpr to be a list and returns a parser for it.
    ///
    /// If the next sexpr is not a list, an error is returned.
    pub fn expect_list(&mut self) -> Result<Parser<'a>, LisoError> {
        let next = self.expect_next()?;

        let Sexpr::List(list) = next else {
            return Err(LisoError::UnexpectedSexprType {
                expected: SexprKind::List,
            });
        };

        Ok(Parser::new(list))
    }

    /// Expects the next sexpr to be a token (or quoted string) equal to
    /// `expected`.
    pub fn expect_token_matching(&mut self, expected: &str) -> Result<(), LisoError> {
        let next = self.expect_next()?;

        if !next.is_token(expected) {
            return Err(LisoError::NonMatchingToken {
                found: next.to_string(),
                expected: expected.into(),
            });
        }

        Ok(())
    }

    /// Expects the next sexpr to be an atom with a textual reading and
    /// returns that text.
    pub fn expect_text(&mut self) -> Result<Cow<'a, str>, LisoError> {
        self.expect_next()?
            .as_text()
            .ok_or(LisoError::UnexpectedSexprType {
                expected: SexprKind::Text,
            })
    }

    /// Returns the lists among the remaining elements, skipping atoms.
    pub fn remaining_lists(self) -> impl Iterator<Item = &'a SexprList> {
        self.inner.filter_map(Sexpr::as_list)
    }
}

/// Visits every list below `root` in document order, parents before their
/// children. When `visit` returns `true` the list counts as handled and its
/// elements are not searched.
///
/// The walk keeps its own stack, so deeply nested netlists do not exhaust the
/// call stack.
pub fn visit_lists<'a, F>(root: &'a Sexpr, mut visit: F) -> Result<(), LisoError>
where
    F: FnMut(&'a SexprList) -> Result<bool, LisoError>,
{
    let Sexpr::List(root) = root else {
        return Ok(());
    };

    let mut stack: Vec<&'a SexprList> = root.iter().rev().filter_map(Sexpr::as_list).collect();

    while let Some(list) = stack.pop() {
        if visit(list)? {
            continue;
        }

        stack.extend(list.iter().rev().filter_map(Sexpr::as_list));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use edif_sexpr::from_str;

    use super::*;

    #[test]
    fn test_parser_expectations() {
        let sexpr = from_str(r#"(Property Value "10k" (x))"#).unwrap();
        let mut parser = Parser::new(sexpr.as_list().unwrap());

        parser.expect_token_matching("Property").unwrap();
        assert_eq!(parser.expect_text().unwrap(), "Value");
        assert_eq!(parser.expect_text().unwrap(), "10k");
        assert_eq!(parser.remaining_lists().count(), 1);
    }

    #[test]
    fn test_parser_errors() {
        let sexpr = from_str("(Net (a))").unwrap();
        let mut parser = Parser::new(sexpr.as_list().unwrap());

        assert_eq!(
            parser.expect_token_matching("Instance"),
            Err(LisoError::NonMatchingToken {
                found: "Net".to_string(),
                expected: "Instance".to_string(),
            })
        );
        assert_eq!(
            parser.expect_text(),
            Err(LisoError::UnexpectedSexprType {
                expected: SexprKind::Text
            })
        );
        assert!(matches!(
            parser.expect_list(),
            Err(LisoError::UnexpectedEndOfList)
        ));
    }

    #[test]
    fn test_visit_lists_in_document_order() {
        let sexpr = from_str("(root (a (b) (c)) x (d (e)))").unwrap();
        let mut seen = Vec::new();

        visit_lists(&sexpr, |list| {
            let name = list[0].as_text().unwrap().into_owned();
            let handled = name == "d";
            seen.push(name);
            Ok(handled)
        })
        .unwrap();

        assert_eq!(seen, ["a", "b", "c", "d"]);
    }
}
