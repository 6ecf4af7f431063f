pub mod parser;
pub mod template;

pub use parser::{Parser, SyntaxError, SyntaxErrorKind};
pub use template::{Node, Template, Variable};

/// Compile a pattern string into a [`Template`].
///
/// Shorthand for `Parser::new(source, 0).parse()`, for callers that don't
/// render diagnostics against a file database.
pub fn compile(source: &str) -> Result<Template, SyntaxError> {
    Parser::new(source.to_string(), 0).parse()
}
