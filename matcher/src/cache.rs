use std::collections::HashMap;
use std::collections::hash_map::Entry;

use seqpat::{SyntaxError, Template, compile};

/// Compiled templates keyed by their pattern text.
///
/// Templates are immutable, so a cached one can be matched repeatedly
/// without any reset between attempts. Patterns that fail to compile are not
/// cached.
#[derive(Debug, Default)]
pub struct TemplateCache {
    templates: HashMap<String, Template>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(&mut self, pattern: &str) -> Result<&Template, SyntaxError> {
        match self.templates.entry(pattern.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let template = compile(pattern)?;
                tracing::debug!(pattern, "compiled template");
                Ok(entry.insert(template))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn clear(&mut self) {
        self.templates.clear();
    }
}
