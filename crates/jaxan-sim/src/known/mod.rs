//! Built-in semantics for runtime APIs whose bodies are never simulated.
//!
//! Covers the JAX-RS response builders, the JSON-P builders (both under `javax` and
//! `jakarta`) and the `java.lang` boxing and string conversions.

mod jaxrs;
mod jsonp;
mod lang;

use jaxan_ir::{MethodIdentifier, types};

use crate::element::Element;

/// Outcome of a call handled by a built-in rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnownCall {
    /// The call's result, or the initialized object for constructors.
    pub result: Element,
    /// Whether the receiver was mutated into `result` (builders, constructors).
    pub updates_receiver: bool,
}

impl KnownCall {
    pub(crate) const fn value(result: Element) -> Self {
        Self {
            result,
            updates_receiver: false,
        }
    }

    pub(crate) const fn update(result: Element) -> Self {
        Self {
            result,
            updates_receiver: true,
        }
    }
}

/// Apply a built-in rule to a call, if one matches.
pub fn simulate_call(
    identifier: &MethodIdentifier,
    receiver: Option<&Element>,
    arguments: &[Element],
) -> Option<KnownCall> {
    match types::strip_api_namespace(identifier.owner()) {
        Some(class) if class.starts_with(jaxrs::PACKAGE) => {
            jaxrs::simulate(class, identifier, receiver, arguments)
        }
        Some(class) if class.starts_with(jsonp::PACKAGE) => {
            jsonp::simulate(class, identifier, receiver, arguments)
        }
        Some(_) => None,
        None => lang::simulate(identifier, receiver, arguments),
    }
}

/// Value of a well-known static field that is not a compile-time constant.
pub fn static_field(owner: &str, name: &str, field_type: &str) -> Option<Element> {
    let class = types::strip_api_namespace(types::owner_name(owner))?;
    jaxrs::static_field(class, name, field_type)
}
