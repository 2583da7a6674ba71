//! `Json`, `JsonObjectBuilder` and `JsonArrayBuilder`.

use jaxan_ir::{Literal, MethodIdentifier, types};

use super::KnownCall;
use crate::element::Element;
use crate::json::JsonValue;

pub const PACKAGE: &str = "json/";

const JSON: &str = "json/Json";
const BUILDER_FACTORY: &str = "json/JsonBuilderFactory";
const OBJECT_BUILDER: &str = "json/JsonObjectBuilder";
const ARRAY_BUILDER: &str = "json/JsonArrayBuilder";

pub fn simulate(
    class: &str,
    identifier: &MethodIdentifier,
    receiver: Option<&Element>,
    arguments: &[Element],
) -> Option<KnownCall> {
    match class {
        JSON | BUILDER_FACTORY => factory(identifier, arguments),
        OBJECT_BUILDER => object_builder(identifier, receiver?, arguments),
        ARRAY_BUILDER => array_builder(identifier, receiver?, arguments),
        _ => None,
    }
}

fn factory(identifier: &MethodIdentifier, arguments: &[Element]) -> Option<KnownCall> {
    let return_type = identifier.return_type();
    let result = match identifier.name() {
        "createObjectBuilder" => Element::from_values(
            return_type,
            initial(arguments.first(), JsonValue::is_object, JsonValue::empty_object),
        ),
        "createArrayBuilder" => Element::from_values(
            return_type,
            initial(arguments.first(), JsonValue::is_array, JsonValue::empty_array),
        ),
        "createValue" => Element::from_values(
            return_type,
            arguments.first()?.literals().cloned().collect::<Vec<_>>(),
        ),
        _ => return None,
    };
    Some(KnownCall::value(result))
}

/// Structures a fresh builder starts from: a copy of the argument, or an empty one.
fn initial(
    source: Option<&Element>,
    kind: fn(&JsonValue) -> bool,
    empty: fn() -> JsonValue,
) -> Vec<JsonValue> {
    let copied: Vec<JsonValue> = source
        .into_iter()
        .flat_map(|element| element.json_values())
        .filter(|json| kind(json))
        .cloned()
        .collect();
    if copied.is_empty() {
        vec![empty()]
    } else {
        copied
    }
}

fn object_builder(
    identifier: &MethodIdentifier,
    receiver: &Element,
    arguments: &[Element],
) -> Option<KnownCall> {
    let objects = initial(Some(receiver), JsonValue::is_object, JsonValue::empty_object);
    let name = identifier.name();
    let updated: Vec<JsonValue> = match name {
        "add" => {
            let (key, value) = (arguments.first()?, arguments.get(1)?);
            with_members(&objects, key, value)
        }
        "addNull" => with_members(&objects, arguments.first()?, &null()),
        "addAll" => {
            let others: Vec<&JsonValue> = arguments.first()?.json_values().collect();
            objects
                .iter()
                .flat_map(|object| others.iter().filter_map(move |other| object.merge(other)))
                .collect()
        }
        "remove" => {
            let keys: Vec<&str> = arguments.first()?.strings().collect();
            objects
                .iter()
                .map(|object| {
                    keys.iter()
                        .fold(object.clone(), |object, key| object.without_member(key))
                })
                .collect()
        }
        "build" => objects,
        _ => return None,
    };
    Some(finish(identifier, name, updated, receiver))
}

fn array_builder(
    identifier: &MethodIdentifier,
    receiver: &Element,
    arguments: &[Element],
) -> Option<KnownCall> {
    let arrays = initial(Some(receiver), JsonValue::is_array, JsonValue::empty_array);
    let name = identifier.name();
    let updated: Vec<JsonValue> = match name {
        // `add(value)` or `add(index, value)`: the value always comes last.
        "add" => {
            let value = arguments.last()?;
            arrays.iter().map(|array| array.with_element(value.clone())).collect()
        }
        "addNull" => arrays.iter().map(|array| array.with_element(null())).collect(),
        "addAll" => {
            let others: Vec<&JsonValue> = arguments.first()?.json_values().collect();
            arrays
                .iter()
                .flat_map(|array| others.iter().filter_map(move |other| array.merge(other)))
                .collect()
        }
        "set" | "remove" | "build" => arrays,
        _ => return None,
    };
    Some(finish(identifier, name, updated, receiver))
}

/// Set every possible key on every possible object. Unknown keys leave the objects as they are.
fn with_members(objects: &[JsonValue], key: &Element, value: &Element) -> Vec<JsonValue> {
    let keys: Vec<&str> = key.strings().collect();
    if keys.is_empty() {
        return objects.to_vec();
    }
    objects
        .iter()
        .flat_map(|object| keys.iter().map(move |key| object.with_member(key, value.clone())))
        .collect()
}

fn finish(
    identifier: &MethodIdentifier,
    name: &str,
    updated: Vec<JsonValue>,
    receiver: &Element,
) -> KnownCall {
    // `addAll` with nothing known to add keeps the receiver.
    let result = if updated.is_empty() {
        receiver.clone().retyped(identifier.return_type())
    } else {
        Element::from_values(identifier.return_type(), updated)
    };
    if name == "build" {
        KnownCall::value(result)
    } else {
        KnownCall::update(result)
    }
}

fn null() -> Element {
    Element::literal(types::OBJECT, Literal::Null)
}
