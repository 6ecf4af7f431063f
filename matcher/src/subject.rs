use std::ops::Index;

use seqpat::{SyntaxError, Template, compile};

use crate::bindings::Bindings;
use crate::pattern::match_value;
use crate::value::{Value, ValueKind};

/// A value under inspection, together with the bindings of the last
/// successful match against it.
///
/// Bindings are returned to the caller rather than injected anywhere; read
/// them through [`Subject::get`] or by indexing.
#[derive(Debug, Clone)]
pub struct Subject {
    value: Value,
    bindings: Bindings,
}

impl Subject {
    pub fn new(value: impl Into<Value>) -> Self {
        Subject {
            value: value.into(),
            bindings: Bindings::new(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Compile `pattern` and match it against the subject.
    ///
    /// On success the new bindings replace the old ones; on failure the
    /// bindings are cleared. Syntax errors are returned before any matching.
    pub fn try_match(&mut self, pattern: &str) -> Result<bool, SyntaxError> {
        let template = compile(pattern)?;
        Ok(self.match_template(&template))
    }

    /// Match an already compiled template against the subject.
    pub fn match_template(&mut self, template: &Template) -> bool {
        match match_value(template, &self.value) {
            Some(bindings) => {
                self.bindings = bindings;
                true
            }
            None => {
                self.bindings = Bindings::new();
                false
            }
        }
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Whether the subject value is of the given kind.
    pub fn is_a(&self, kind: ValueKind) -> bool {
        self.value.kind() == kind
    }

    /// Whether the subject value is of any of the given kinds.
    pub fn is_any(&self, kinds: &[ValueKind]) -> bool {
        kinds.contains(&self.value.kind())
    }
}

impl PartialEq<Value> for Subject {
    fn eq(&self, other: &Value) -> bool {
        self.value == *other
    }
}

impl Index<&str> for Subject {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        &self.bindings[name]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list;

    #[test]
    fn bindings_follow_the_last_attempt() {
        let mut subject = Subject::new(list![1, list![2, 3]]);
        assert_eq!(subject.try_match("(a (b c))"), Ok(true));
        assert_eq!(subject["c"], Value::Int(3));

        assert_eq!(subject.try_match("(a b c)"), Ok(false));
        assert!(subject.bindings().is_empty());
        assert_eq!(subject.get("a"), None);
    }

    #[test]
    fn syntax_errors_surface_immediately() {
        let mut subject = Subject::new(1);
        let err = subject.try_match("()").unwrap_err();
        assert_eq!(err.kind, seqpat::SyntaxErrorKind::EmptyGroup);
    }

    #[test]
    fn type_and_equality_checks() {
        let subject = Subject::new("hello");
        assert!(subject.is_a(ValueKind::Str));
        assert!(!subject.is_a(ValueKind::List));
        assert!(subject.is_any(&[ValueKind::Bytes, ValueKind::Str]));
        assert!(!subject.is_any(&[]));
        assert!(subject == Value::from("hello"));
        assert!(subject != Value::from("world"));
    }
}
