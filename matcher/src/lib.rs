pub mod bindings;
pub mod cache;
pub mod error;
pub mod pattern;
pub mod subject;
pub mod value;

pub use bindings::Bindings;
pub use cache::TemplateCache;
pub use error::Mismatch;
pub use pattern::{explain, match_value};
pub use subject::Subject;
pub use value::{Value, ValueKind};

pub use seqpat::{SyntaxError, Template, compile};

/// Build a [`Value::List`] from anything convertible into values.
///
/// ```
/// use matcher::list;
/// let v = list![1, "two", list![3.0]];
/// assert_eq!(v.to_string(), r#"[1, "two", [3.0]]"#);
/// ```
#[macro_export]
macro_rules! list {
    ($($item:expr),* $(,)?) => {
        $crate::Value::List(vec![$($crate::Value::from($item)),*])
    };
}
