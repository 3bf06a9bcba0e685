//! Loop scopes and name resolution.
//!
//! Each `#each` level pushes a frame binding its alias to the current
//! record. Lookups search frames innermost-first, then the bindings, so an
//! inner alias shadows an outer alias or binding of the same name.

use crate::binder::{Bindings, BoundValue, Record};
use crate::document::VarPath;

const INDEX: &str = "@index";

struct Frame<'a> {
    alias: &'a str,
    record: &'a Record,
    index: usize,
}

pub(super) struct Scope<'a> {
    frames: Vec<Frame<'a>>,
}

/// Outcome of resolving a reference.
#[derive(Debug, PartialEq)]
pub(super) enum Resolved<'a> {
    /// A whole bound value.
    Value(&'a BoundValue),
    /// A loop alias on its own: the current record.
    Record(&'a Record),
    /// A field of a record.
    Field(&'a str),
    /// `@index` inside a loop.
    Index(usize),
    /// The head resolved but the field path did not.
    Missing,
    /// The head is neither a loop alias nor a binding.
    Unbound,
}

impl Resolved<'_> {
    /// Truthiness for `{{#if}}`: missing and empty are false.
    pub(super) fn is_truthy(&self) -> bool {
        match self {
            Resolved::Value(value) => value.is_truthy(),
            Resolved::Record(_) | Resolved::Index(_) => true,
            Resolved::Field(field) => !field.is_empty(),
            Resolved::Missing | Resolved::Unbound => false,
        }
    }

    pub(super) fn describe(&self) -> &'static str {
        match self {
            Resolved::Value(value) => value.describe(),
            Resolved::Record(_) => "a record",
            Resolved::Field(_) | Resolved::Index(_) => "a scalar",
            Resolved::Missing | Resolved::Unbound => "missing",
        }
    }
}

impl<'a> Scope<'a> {
    pub(super) fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub(super) fn push(&mut self, alias: &'a str, record: &'a Record, index: usize) {
        self.frames.push(Frame {
            alias,
            record,
            index,
        });
    }

    pub(super) fn pop(&mut self) {
        self.frames.pop();
    }

    /// Resolve a dotted reference.
    pub(super) fn resolve(&self, path: &VarPath, bindings: &'a Bindings) -> Resolved<'a> {
        let head = path.head();

        if head == INDEX {
            return match (self.frames.last(), path.rest().is_empty()) {
                (Some(frame), true) => Resolved::Index(frame.index),
                (Some(_), false) => Resolved::Missing,
                (None, _) => Resolved::Unbound,
            };
        }

        if let Some(frame) = self.frame(head) {
            return match path.rest() {
                [] => Resolved::Record(frame.record),
                [field] => field_of(frame.record, field),
                _ => Resolved::Missing,
            };
        }

        match bindings.get(head) {
            None => Resolved::Unbound,
            Some(value) => match (value, path.rest()) {
                (_, []) => Resolved::Value(value),
                (BoundValue::Record(record), [field]) => field_of(record, field),
                _ => Resolved::Missing,
            },
        }
    }

    /// Resolve the target of `#each`, which is always a bare name.
    pub(super) fn lookup_iterable(&self, name: &str, bindings: &'a Bindings) -> Resolved<'a> {
        if let Some(frame) = self.frame(name) {
            return Resolved::Record(frame.record);
        }
        match bindings.get(name) {
            Some(value) => Resolved::Value(value),
            None => Resolved::Unbound,
        }
    }

    fn frame(&self, alias: &str) -> Option<&Frame<'a>> {
        self.frames.iter().rev().find(|frame| frame.alias == alias)
    }
}

fn field_of<'a>(record: &'a Record, field: &str) -> Resolved<'a> {
    match record.get(field) {
        Some(value) => Resolved::Field(value),
        None => Resolved::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn path(dotted: &str) -> VarPath {
        VarPath::parse(dotted).unwrap()
    }

    #[test]
    fn inner_alias_shadows_outer() {
        let bindings = Bindings::new();
        let outer = record(&[("name", "outer")]);
        let inner = record(&[("name", "inner")]);

        let mut scope = Scope::new();
        scope.push("this", &outer, 0);
        assert_eq!(scope.resolve(&path("this.name"), &bindings), Resolved::Field("outer"));

        scope.push("this", &inner, 3);
        assert_eq!(scope.resolve(&path("this.name"), &bindings), Resolved::Field("inner"));
        assert_eq!(scope.resolve(&path("@index"), &bindings), Resolved::Index(3));

        scope.pop();
        assert_eq!(scope.resolve(&path("this.name"), &bindings), Resolved::Field("outer"));
    }

    #[test]
    fn alias_shadows_binding_of_same_name() {
        let bindings: Bindings = [("row", BoundValue::Scalar("bound".into()))]
            .into_iter()
            .collect();
        let row = record(&[("x", "1")]);

        let mut scope = Scope::new();
        assert_eq!(
            scope.resolve(&path("row"), &bindings),
            Resolved::Value(&BoundValue::Scalar("bound".into()))
        );
        scope.push("row", &row, 0);
        assert_eq!(scope.resolve(&path("row.x"), &bindings), Resolved::Field("1"));
    }

    #[test]
    fn unknown_heads_are_unbound_and_unknown_fields_missing() {
        let bindings: Bindings = [("profile", BoundValue::Record(record(&[("name", "Ada")])))]
            .into_iter()
            .collect();
        let scope = Scope::new();

        assert_eq!(scope.resolve(&path("nope"), &bindings), Resolved::Unbound);
        assert_eq!(scope.resolve(&path("this"), &bindings), Resolved::Unbound);
        assert_eq!(scope.resolve(&path("@index"), &bindings), Resolved::Unbound);
        assert_eq!(scope.resolve(&path("profile.name"), &bindings), Resolved::Field("Ada"));
        assert_eq!(scope.resolve(&path("profile.age"), &bindings), Resolved::Missing);
        assert_eq!(scope.resolve(&path("profile.name.x"), &bindings), Resolved::Missing);
    }

    #[test]
    fn truthiness_of_resolutions() {
        assert!(!Resolved::Unbound.is_truthy());
        assert!(!Resolved::Missing.is_truthy());
        assert!(!Resolved::Field("").is_truthy());
        assert!(Resolved::Field("x").is_truthy());
        assert!(Resolved::Index(0).is_truthy());
    }
}
