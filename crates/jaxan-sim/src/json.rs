//! JSON structures assembled through the JSON-P builder API.

use std::collections::BTreeMap;

use crate::element::Element;

/// A JSON object or array whose members are themselves symbolic elements.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JsonValue {
    Object(BTreeMap<String, Element>),
    Array(Vec<Element>),
}

impl JsonValue {
    /// An object with no members.
    pub const fn empty_object() -> Self {
        Self::Object(BTreeMap::new())
    }

    /// An array with no elements.
    pub const fn empty_array() -> Self {
        Self::Array(Vec::new())
    }

    /// Whether this is a JSON object.
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Whether this is a JSON array.
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Object with `key` set to `value`; later writes to a key replace earlier ones.
    /// Arrays are returned unchanged.
    #[must_use]
    pub fn with_member(&self, key: &str, value: Element) -> Self {
        match self {
            Self::Object(members) => {
                let mut members = members.clone();
                members.insert(key.to_string(), value);
                Self::Object(members)
            }
            Self::Array(_) => self.clone(),
        }
    }

    /// Object without `key`.
    #[must_use]
    pub fn without_member(&self, key: &str) -> Self {
        match self {
            Self::Object(members) => {
                let mut members = members.clone();
                members.remove(key);
                Self::Object(members)
            }
            Self::Array(_) => self.clone(),
        }
    }

    /// Array with `value` appended. Objects are returned unchanged.
    #[must_use]
    pub fn with_element(&self, value: Element) -> Self {
        match self {
            Self::Array(elements) => {
                let mut elements = elements.clone();
                elements.push(value);
                Self::Array(elements)
            }
            Self::Object(_) => self.clone(),
        }
    }

    /// Combine two structures of the same kind.
    ///
    /// Object keys from `other` overwrite ours; array elements are appended. Mixing an
    /// object with an array yields `None`.
    pub fn merge(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::Object(ours), Self::Object(theirs)) => {
                let mut members = ours.clone();
                members.extend(theirs.iter().map(|(k, v)| (k.clone(), v.clone())));
                Some(Self::Object(members))
            }
            (Self::Array(ours), Self::Array(theirs)) => {
                let mut elements = ours.clone();
                elements.extend(theirs.iter().cloned());
                Some(Self::Array(elements))
            }
            _ => None,
        }
    }

    /// Member `key` of an object.
    pub fn get(&self, key: &str) -> Option<&Element> {
        match self {
            Self::Object(members) => members.get(key),
            Self::Array(_) => None,
        }
    }

    /// Number of members or elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Object(members) => members.len(),
            Self::Array(elements) => elements.len(),
        }
    }

    /// Whether there are no members or elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
