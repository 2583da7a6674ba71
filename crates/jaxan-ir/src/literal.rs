//! Constant values pushed by instructions.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A double constant with total equality and ordering (bitwise), so literals can live in sets.
#[derive(Clone, Copy, Debug)]
pub struct Double(pub f64);

impl PartialEq for Double {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Double {}

impl PartialOrd for Double {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Double {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Double {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Literal operand of a push or a resolved static constant.
///
/// Integral JVM types (`int`, `long`, `short`, `byte`) share `Int`; `char` keeps its own
/// variant so it can be rendered as a character.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Char(char),
    Double(Double),
    String(String),
    /// Class literal (`Foo.class`), as a type descriptor.
    Class(String),
}

impl Literal {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub const fn double(value: f64) -> Self {
        Self::Double(Double(value))
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The value as `String.valueOf` would render it.
    pub fn to_java_string(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(v) => v.to_string(),
            Self::Char(c) => c.to_string(),
            Self::Double(d) => {
                if d.0.fract() == 0.0 && d.0.is_finite() {
                    format!("{:.1}", d.0)
                } else {
                    d.0.to_string()
                }
            }
            Self::String(s) => s.clone(),
            Self::Class(t) => format!("class {t}"),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Char(c) => write!(f, "'{c}'"),
            other => f.write_str(&other.to_java_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_equality_is_bitwise() {
        assert_eq!(Literal::double(1.5), Literal::double(1.5));
        assert_ne!(Literal::double(0.0), Literal::double(-0.0));
        assert_eq!(Literal::double(f64::NAN), Literal::double(f64::NAN));
    }

    #[test]
    fn test_java_string() {
        assert_eq!(Literal::Int(42).to_java_string(), "42");
        assert_eq!(Literal::double(2.0).to_java_string(), "2.0");
        assert_eq!(Literal::Bool(true).to_java_string(), "true");
        assert_eq!(Literal::string("a").to_string(), "\"a\"");
    }
}
