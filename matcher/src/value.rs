use std::fmt;

/// A candidate value for matching.
///
/// Only `List` is a decomposable sequence. Strings and byte strings are
/// leaves even though they have elements of their own.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
}

/// The variant tag of a [`Value`], used for type-conformance checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Unit,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    List,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Unit => "Unit",
            ValueKind::Bool => "Bool",
            ValueKind::Int => "Int",
            ValueKind::Float => "Float",
            ValueKind::Str => "Str",
            ValueKind::Bytes => "Bytes",
            ValueKind::List => "List",
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Unit => ValueKind::Unit,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::List(_) => ValueKind::List,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// True for values a template decomposes positionally.
    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// The elements a template is aligned against. A leaf is treated as a
    /// one-element sequence so a single-variable template can match it.
    pub fn elements(&self) -> &[Value] {
        match self {
            Value::List(items) => items,
            leaf => std::slice::from_ref(leaf),
        }
    }

    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Bytes(bytes) => write!(f, "b\"{}\"", bytes.escape_ascii()),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(bytes: &[u8; N]) -> Self {
        Value::Bytes(bytes.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list;

    #[test]
    fn strings_and_bytes_are_leaves() {
        assert!(!Value::from("hello").is_sequence());
        assert!(!Value::from(b"hi").is_sequence());
        assert!(list![1, 2].is_sequence());
    }

    #[test]
    fn leaf_elements_wrap_the_leaf() {
        let s = Value::from("abc");
        assert_eq!(s.elements(), &[Value::from("abc")]);
        assert_eq!(list![1, 2].elements().len(), 2);
        assert!(list![].elements().is_empty());
    }

    #[test]
    fn display() {
        assert_eq!(
            list![1, 2.5, "x", b"a\n", true, (), list![]].to_string(),
            r#"[1, 2.5, "x", b"a\n", true, (), []]"#
        );
    }

    #[test]
    fn float_equality_follows_ieee() {
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_eq!(Value::Float(0.0), Value::Float(-0.0));
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn kinds() {
        assert_eq!(Value::from(3).kind(), ValueKind::Int);
        assert_eq!(Value::list([1, 2]).kind(), ValueKind::List);
        assert_eq!(Value::from("s").type_name(), "Str");
    }
}
