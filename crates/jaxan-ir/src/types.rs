//! JVM type descriptors.
//!
//! Types are carried around as plain descriptor strings (`I`, `Ljava/lang/String;`,
//! `[Ljava/lang/Object;`). This module holds the well-known descriptors the analyzer
//! reasons about and the small amount of descriptor parsing it needs.

use thiserror::Error;

pub const VOID: &str = "V";
pub const PRIMITIVE_BOOLEAN: &str = "Z";
pub const PRIMITIVE_BYTE: &str = "B";
pub const PRIMITIVE_CHAR: &str = "C";
pub const PRIMITIVE_SHORT: &str = "S";
pub const PRIMITIVE_INT: &str = "I";
pub const PRIMITIVE_LONG: &str = "J";
pub const PRIMITIVE_FLOAT: &str = "F";
pub const PRIMITIVE_DOUBLE: &str = "D";

pub const OBJECT: &str = "Ljava/lang/Object;";
pub const STRING: &str = "Ljava/lang/String;";
pub const CLASS: &str = "Ljava/lang/Class;";
pub const THROWABLE: &str = "Ljava/lang/Throwable;";
pub const BOOLEAN: &str = "Ljava/lang/Boolean;";
pub const BYTE: &str = "Ljava/lang/Byte;";
pub const CHARACTER: &str = "Ljava/lang/Character;";
pub const SHORT: &str = "Ljava/lang/Short;";
pub const INTEGER: &str = "Ljava/lang/Integer;";
pub const LONG: &str = "Ljava/lang/Long;";
pub const FLOAT: &str = "Ljava/lang/Float;";
pub const DOUBLE: &str = "Ljava/lang/Double;";
pub const BIG_INTEGER: &str = "Ljava/math/BigInteger;";
pub const BIG_DECIMAL: &str = "Ljava/math/BigDecimal;";

/// Namespaces the REST and JSON APIs are published under.
pub const API_NAMESPACES: [&str; 2] = ["javax", "jakarta"];

/// Error raised for malformed descriptors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("empty type descriptor")]
    Empty,
    #[error("invalid type descriptor '{0}'")]
    InvalidType(String),
    #[error("invalid method descriptor '{0}'")]
    InvalidMethod(String),
}

/// Builds an object descriptor from an internal class name (`java/lang/String`).
pub fn object_type(internal_name: &str) -> String {
    format!("L{internal_name};")
}

/// Returns the internal class name of an object descriptor, if it is one.
pub fn internal_name(descriptor: &str) -> Option<&str> {
    descriptor.strip_prefix('L')?.strip_suffix(';')
}

/// Converts an owner given either as internal name or object descriptor into an internal name.
pub fn owner_name(owner: &str) -> &str {
    internal_name(owner).unwrap_or(owner)
}

/// Strips the leading `javax/` or `jakarta/` segment so rules can match either namespace.
pub fn strip_api_namespace(internal_name: &str) -> Option<&str> {
    API_NAMESPACES.iter().find_map(|ns| {
        internal_name
            .strip_prefix(ns)
            .and_then(|rest| rest.strip_prefix('/'))
    })
}

pub fn is_void(descriptor: &str) -> bool {
    descriptor == VOID
}

/// Long and double values take two local-variable slots.
pub fn is_wide(descriptor: &str) -> bool {
    descriptor == PRIMITIVE_LONG || descriptor == PRIMITIVE_DOUBLE
}

/// Primitive counterpart of a boxed descriptor.
pub fn unboxed(descriptor: &str) -> Option<&'static str> {
    Some(match descriptor {
        BOOLEAN => PRIMITIVE_BOOLEAN,
        BYTE => PRIMITIVE_BYTE,
        CHARACTER => PRIMITIVE_CHAR,
        SHORT => PRIMITIVE_SHORT,
        INTEGER => PRIMITIVE_INT,
        LONG => PRIMITIVE_LONG,
        FLOAT => PRIMITIVE_FLOAT,
        DOUBLE => PRIMITIVE_DOUBLE,
        _ => return None,
    })
}

/// Parse one field descriptor starting at `start`, returning it and the index after it.
fn parse_one(descriptor: &str, start: usize) -> Result<(&str, usize), DescriptorError> {
    let bytes = descriptor.as_bytes();
    let mut pos = start;
    while pos < bytes.len() && bytes[pos] == b'[' {
        pos += 1;
    }
    let Some(&tag) = bytes.get(pos) else {
        return Err(DescriptorError::InvalidType(descriptor[start..].to_string()));
    };
    let end = match tag {
        b'Z' | b'B' | b'C' | b'S' | b'I' | b'J' | b'F' | b'D' => pos + 1,
        b'L' => match descriptor[pos..].find(';') {
            Some(offset) if offset > 1 => pos + offset + 1,
            _ => return Err(DescriptorError::InvalidType(descriptor[start..].to_string())),
        },
        _ => return Err(DescriptorError::InvalidType(descriptor[start..].to_string())),
    };
    Ok((&descriptor[start..end], end))
}

/// Validate a single field descriptor.
pub fn parse_field_descriptor(descriptor: &str) -> Result<&str, DescriptorError> {
    if descriptor.is_empty() {
        return Err(DescriptorError::Empty);
    }
    let (parsed, end) = parse_one(descriptor, 0)?;
    if end != descriptor.len() {
        return Err(DescriptorError::InvalidType(descriptor.to_string()));
    }
    Ok(parsed)
}

/// Split a method descriptor `(params)ret` into parameter and return descriptors.
pub fn parse_method_descriptor(descriptor: &str) -> Result<(Vec<String>, String), DescriptorError> {
    let invalid = || DescriptorError::InvalidMethod(descriptor.to_string());
    let close = descriptor.find(')').ok_or_else(invalid)?;
    if !descriptor.starts_with('(') {
        return Err(invalid());
    }

    let mut params = Vec::new();
    let mut pos = 1;
    while pos < close {
        let (param, next) = parse_one(descriptor, pos).map_err(|_| invalid())?;
        if next > close {
            return Err(invalid());
        }
        params.push(param.to_string());
        pos = next;
    }

    let ret = &descriptor[close + 1..];
    if ret != VOID {
        parse_field_descriptor(ret).map_err(|_| invalid())?;
    }
    Ok((params, ret.to_string()))
}
