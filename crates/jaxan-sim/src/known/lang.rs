//! Boxing, unboxing, parsing and `toString` on `java.lang` value types.

use jaxan_ir::{CONSTRUCTOR_NAME, Literal, MethodIdentifier, types};

use super::KnownCall;
use crate::element::Element;

const STRING_CLASS: &str = "java/lang/String";

pub fn simulate(
    identifier: &MethodIdentifier,
    receiver: Option<&Element>,
    arguments: &[Element],
) -> Option<KnownCall> {
    let owner_type = types::object_type(identifier.owner());
    if types::unboxed(&owner_type).is_none() && identifier.owner() != STRING_CLASS {
        return None;
    }
    let return_type = identifier.return_type();

    if identifier.is_static() {
        // Overloads taking a radix (`valueOf(s, 16)`, `toString(i, 2)`) are not modelled.
        let name = identifier.name();
        let is_conversion = identifier.arity() == 1
            && (name == "valueOf" || name == "toString" || name.starts_with("parse"));
        if !is_conversion {
            return None;
        }
        return Some(KnownCall::value(converted(arguments.first()?, return_type)));
    }

    match identifier.name() {
        CONSTRUCTOR_NAME if arguments.len() == 1 => {
            Some(KnownCall::update(converted(&arguments[0], &owner_type)))
        }
        "toString" | "intValue" | "longValue" | "shortValue" | "byteValue" | "booleanValue"
        | "charValue" | "doubleValue" | "floatValue" => {
            Some(KnownCall::value(converted(receiver?, return_type)))
        }
        _ => None,
    }
}

/// The literal values of `element` as seen through `target`.
fn converted(element: &Element, target: &str) -> Element {
    Element::from_values(
        target,
        element
            .literals()
            .filter_map(|literal| convert(literal, target))
            .collect::<Vec<_>>(),
    )
}

/// Convert a literal to a primitive, boxed or string type, when Java would succeed.
#[allow(clippy::cast_precision_loss)]
fn convert(literal: &Literal, target: &str) -> Option<Literal> {
    if target == types::STRING {
        return match literal {
            Literal::Null => None,
            other => Some(Literal::String(other.to_java_string())),
        };
    }

    let primitive = types::unboxed(target).unwrap_or(target);
    match (primitive, literal) {
        ("I" | "J" | "S" | "B", Literal::Int(value)) => Some(Literal::Int(*value)),
        ("I" | "J" | "S" | "B", Literal::Char(c)) => Some(Literal::Int(i64::from(u32::from(*c)))),
        ("I" | "J" | "S" | "B", Literal::String(s)) => parse_integral(s, primitive).map(Literal::Int),
        ("Z", Literal::Bool(value)) => Some(Literal::Bool(*value)),
        // Booleans are pushed as `iconst_0` / `iconst_1`.
        ("Z", Literal::Int(value)) => Some(Literal::Bool(*value != 0)),
        ("Z", Literal::String(s)) => Some(Literal::Bool(s.eq_ignore_ascii_case("true"))),
        ("C", Literal::Char(c)) => Some(Literal::Char(*c)),
        ("C", Literal::Int(value)) => u32::try_from(*value)
            .ok()
            .and_then(char::from_u32)
            .map(Literal::Char),
        ("D" | "F", Literal::Double(value)) => Some(Literal::Double(*value)),
        ("D" | "F", Literal::Int(value)) => Some(Literal::double(*value as f64)),
        ("D" | "F", Literal::String(s)) => s.trim().parse().ok().map(Literal::double),
        _ => None,
    }
}

/// Parse as `Integer.parseInt` and friends do: no surrounding whitespace, range-checked.
fn parse_integral(text: &str, primitive: &str) -> Option<i64> {
    let value: i64 = text.parse().ok()?;
    let in_range = match primitive {
        "I" => i32::try_from(value).is_ok(),
        "S" => i16::try_from(value).is_ok(),
        "B" => i8::try_from(value).is_ok(),
        _ => true,
    };
    in_range.then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(owner: &str, name: &str, descriptor: &str, is_static: bool) -> MethodIdentifier {
        MethodIdentifier::from_descriptor(owner, name, descriptor, is_static).unwrap()
    }

    #[test]
    fn test_boxing_round_trip() {
        let value_of = method("java/lang/Integer", "valueOf", "(I)Ljava/lang/Integer;", true);
        let boxed = simulate(&value_of, None, &[Element::int(42)]).unwrap().result;
        assert!(boxed.has_type(types::INTEGER));
        assert_eq!(boxed.ints().collect::<Vec<_>>(), vec![42]);

        let int_value = method("java/lang/Integer", "intValue", "()I", false);
        let unboxed = simulate(&int_value, Some(&boxed), &[]).unwrap().result;
        assert_eq!(unboxed, Element::int(42));
    }

    #[test]
    fn test_parse_and_to_string() {
        let parse = method("java/lang/Long", "parseLong", "(Ljava/lang/String;)J", true);
        let parsed = simulate(&parse, None, &[Element::string("7")]).unwrap().result;
        assert_eq!(parsed.ints().collect::<Vec<_>>(), vec![7]);

        let to_string = method("java/lang/Integer", "toString", "(I)Ljava/lang/String;", true);
        let rendered = simulate(&to_string, None, &[Element::int(7)]).unwrap().result;
        assert_eq!(rendered, Element::string("7"));

        let radix = method("java/lang/Integer", "toString", "(II)Ljava/lang/String;", true);
        assert!(simulate(&radix, None, &[Element::int(7), Element::int(2)]).is_none());
    }

    #[test]
    fn test_integral_parse_rejects_what_java_rejects() {
        let parse_int = method("java/lang/Integer", "parseInt", "(Ljava/lang/String;)I", true);
        for text in [" 7 ", "3000000000", "7.0"] {
            let parsed = simulate(&parse_int, None, &[Element::string(text)]).unwrap().result;
            assert_eq!(parsed, Element::unknown(types::PRIMITIVE_INT), "{text}");
        }

        let radix = method(
            "java/lang/Integer",
            "valueOf",
            "(Ljava/lang/String;I)Ljava/lang/Integer;",
            true,
        );
        assert!(simulate(&radix, None, &[Element::string("10"), Element::int(16)]).is_none());
    }

    #[test]
    fn test_double_parse_trims() {
        let parse = method("java/lang/Double", "parseDouble", "(Ljava/lang/String;)D", true);
        let parsed = simulate(&parse, None, &[Element::string(" 2.5 ")]).unwrap().result;
        assert_eq!(
            parsed,
            Element::literal(types::PRIMITIVE_DOUBLE, Literal::double(2.5))
        );
    }

    #[test]
    fn test_string_value_of() {
        let value_of = method(
            "java/lang/String",
            "valueOf",
            "(Ljava/lang/Object;)Ljava/lang/String;",
            true,
        );
        let flag = Element::literal(types::BOOLEAN, Literal::Bool(true));
        let result = simulate(&value_of, None, &[flag]).unwrap().result;
        assert_eq!(result, Element::string("true"));
    }

    #[test]
    fn test_boolean_from_int_constant() {
        let value_of = method("java/lang/Boolean", "valueOf", "(Z)Ljava/lang/Boolean;", true);
        let result = simulate(&value_of, None, &[Element::int(1)]).unwrap().result;
        assert_eq!(result, Element::literal(types::BOOLEAN, Literal::Bool(true)));
    }

    #[test]
    fn test_constructor_updates_receiver() {
        let init = method("java/lang/Integer", CONSTRUCTOR_NAME, "(I)V", false);
        let call = simulate(&init, Some(&Element::unknown(types::INTEGER)), &[Element::int(3)])
            .unwrap();
        assert!(call.updates_receiver);
        assert_eq!(call.result.ints().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_other_classes_are_ignored() {
        let size = method("java/util/List", "size", "()I", false);
        assert!(simulate(&size, Some(&Element::object()), &[]).is_none());
        let format = method(
            "java/lang/String",
            "format",
            "(Ljava/lang/String;[Ljava/lang/Object;)Ljava/lang/String;",
            true,
        );
        assert!(simulate(&format, None, &[Element::string("%s"), Element::object()]).is_none());
    }
}
