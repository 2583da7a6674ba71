//! Symbolic values manipulated by the simulator.

use std::collections::BTreeSet;
use std::fmt;

use jaxan_ir::{Literal, MethodIdentifier, types};

use crate::json::JsonValue;
use crate::response::HttpResponse;

/// Target of a lambda or method reference, with the values captured at the call site.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodHandle {
    pub target: MethodIdentifier,
    pub captured: Vec<Element>,
}

/// One concrete or structured value an element may hold.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    Literal(Literal),
    Json(JsonValue),
    Response(HttpResponse),
    Handle(MethodHandle),
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Self::Json(json)
    }
}

impl From<HttpResponse> for Value {
    fn from(response: HttpResponse) -> Self {
        Self::Response(response)
    }
}

impl From<MethodHandle> for Value {
    fn from(handle: MethodHandle) -> Self {
        Self::Handle(handle)
    }
}

/// A possible runtime value: the static types it was seen with and the values it may hold.
///
/// Elements form a join-semilattice under [`Element::merge`], which is plain set union on
/// both dimensions. An element with types but no values is "unknown" of those types; the
/// default element (no types, no values) is the identity of the merge.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Element {
    types: BTreeSet<String>,
    values: BTreeSet<Value>,
}

impl Element {
    /// An element of the given type with no known value.
    pub fn unknown(static_type: &str) -> Self {
        Self {
            types: BTreeSet::from([static_type.to_string()]),
            values: BTreeSet::new(),
        }
    }

    /// The top of the lattice for reference values.
    pub fn object() -> Self {
        Self::unknown(types::OBJECT)
    }

    /// An element of the given type with a single possible value.
    pub fn new(static_type: &str, value: impl Into<Value>) -> Self {
        Self {
            types: BTreeSet::from([static_type.to_string()]),
            values: BTreeSet::from([value.into()]),
        }
    }

    /// An element of the given type with the given possible values.
    pub fn from_values<I, V>(static_type: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            types: BTreeSet::from([static_type.to_string()]),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// A constant of the given type.
    pub fn literal(static_type: &str, literal: Literal) -> Self {
        Self::new(static_type, literal)
    }

    /// A `String` constant.
    pub fn string(value: &str) -> Self {
        Self::literal(types::STRING, Literal::string(value))
    }

    /// An `int` constant.
    pub fn int(value: i64) -> Self {
        Self::literal(types::PRIMITIVE_INT, Literal::Int(value))
    }

    /// Possible static types.
    pub const fn types(&self) -> &BTreeSet<String> {
        &self.types
    }

    /// Possible values; empty when nothing is known.
    pub const fn values(&self) -> &BTreeSet<Value> {
        &self.values
    }

    /// No type and no value: the merge identity.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.values.is_empty()
    }

    /// Whether `static_type` is among the possible types.
    pub fn has_type(&self, static_type: &str) -> bool {
        self.types.contains(static_type)
    }

    /// Union of both elements.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        merged.merge_in(other);
        merged
    }

    /// In-place union with another element.
    pub fn merge_in(&mut self, other: &Self) {
        self.types.extend(other.types.iter().cloned());
        self.values.extend(other.values.iter().cloned());
    }

    /// Same values under exactly one static type.
    #[must_use]
    pub fn retyped(mut self, static_type: &str) -> Self {
        self.types = BTreeSet::from([static_type.to_string()]);
        self
    }

    /// Add one more possible value.
    pub fn add_value(&mut self, value: impl Into<Value>) {
        self.values.insert(value.into());
    }

    /// Constant values.
    pub fn literals(&self) -> impl Iterator<Item = &Literal> {
        self.values.iter().filter_map(|value| match value {
            Value::Literal(literal) => Some(literal),
            _ => None,
        })
    }

    /// Integer literals, e.g. status codes.
    pub fn ints(&self) -> impl Iterator<Item = i64> + '_ {
        self.literals().filter_map(Literal::as_int)
    }

    /// String literals, e.g. header names or media types.
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.literals().filter_map(Literal::as_str)
    }

    /// JSON structures, including builders under construction.
    pub fn json_values(&self) -> impl Iterator<Item = &JsonValue> {
        self.values.iter().filter_map(|value| match value {
            Value::Json(json) => Some(json),
            _ => None,
        })
    }

    /// HTTP response facts.
    pub fn responses(&self) -> impl Iterator<Item = &HttpResponse> {
        self.values.iter().filter_map(|value| match value {
            Value::Response(response) => Some(response),
            _ => None,
        })
    }

    /// Lambda and method-reference targets.
    pub fn handles(&self) -> impl Iterator<Item = &MethodHandle> {
        self.values.iter().filter_map(|value| match value {
            Value::Handle(handle) => Some(handle),
            _ => None,
        })
    }

    /// Possible values that are plain entities rather than response facts.
    pub fn entity_values(&self) -> impl Iterator<Item = &Value> {
        self.values
            .iter()
            .filter(|value| !matches!(value, Value::Response(_)))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<&str> = self.types.iter().map(String::as_str).collect();
        write!(f, "{{{}}}", types.join(", "))?;
        if !self.values.is_empty() {
            write!(f, " = {} value(s)", self.values.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<Element> {
        vec![
            Element::string("a"),
            Element::string("b"),
            Element::int(3),
            Element::unknown(types::OBJECT),
            Element::default(),
            Element::new(
                "Ljavax/ws/rs/core/Response;",
                HttpResponse::with_status(404),
            ),
        ]
    }

    #[test]
    fn test_merge_is_union() {
        let merged = Element::string("a").merge(&Element::string("b"));
        assert_eq!(merged.types().len(), 1);
        assert_eq!(merged.strings().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_merge_is_a_join() {
        let samples = samples();
        for a in &samples {
            assert_eq!(a.merge(a), *a);
            for b in &samples {
                assert_eq!(a.merge(b), b.merge(a));
                for c in &samples {
                    assert_eq!(a.merge(&b.merge(c)), a.merge(b).merge(c));
                }
            }
        }
    }

    #[test]
    fn test_default_is_identity() {
        let a = Element::string("a");
        assert_eq!(a.merge(&Element::default()), a);
        assert!(Element::default().is_empty());
        assert!(!Element::object().is_empty());
    }

    #[test]
    fn test_partition_values() {
        let mut element = Element::string("body");
        element.add_value(HttpResponse::with_status(200));
        assert_eq!(element.responses().count(), 1);
        assert_eq!(element.entity_values().count(), 1);
    }

    #[test]
    fn test_retyped() {
        let element = Element::int(1).merge(&Element::unknown(types::INTEGER));
        assert_eq!(element.types().len(), 2);
        let element = element.retyped(types::LONG);
        assert!(element.has_type(types::LONG));
        assert_eq!(element.ints().collect::<Vec<_>>(), vec![1]);
    }
}
