pub mod error;
mod grammar;
pub mod token;

pub use error::{SyntaxError, SyntaxErrorKind};

use crate::template::Template;

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser { source, file_id }
    }

    /// Tokenize and parse the pattern source into its root template.
    pub fn parse(&self) -> Result<Template, SyntaxError> {
        let tokens = token::tokenize(&self.source);
        grammar::parse_tokens(&tokens, self.source.len(), self.file_id)
    }
}
