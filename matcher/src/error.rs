use std::fmt;

/// Why a value did not match a template.
///
/// All variants mean the same thing to [`crate::match_value`]: no match.
/// They exist so tools can report a reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// The template has positions left but the value ran out of elements.
    TooFewElements { needed: usize, found: usize },
    /// The value has elements left after every template position was used.
    TooManyElements { allowed: usize, found: usize },
    /// A plain or greedy variable was aligned with a sub-sequence; only a
    /// group can match one.
    SequenceInLeafPosition { name: String },
    /// A variable used more than once captured different values.
    InconsistentBinding { name: String },
    /// A greedy variable had no element left to absorb.
    GreedyUnderflow { name: String },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::TooFewElements { needed, found } => {
                write!(f, "too few elements: needed {}, found {}", needed, found)
            }
            Mismatch::TooManyElements { allowed, found } => {
                write!(f, "too many elements: allowed {}, found {}", allowed, found)
            }
            Mismatch::SequenceInLeafPosition { name } => {
                write!(f, "variable '{}' cannot capture a sub-sequence", name)
            }
            Mismatch::InconsistentBinding { name } => {
                write!(f, "inconsistent binding for '{}'", name)
            }
            Mismatch::GreedyUnderflow { name } => {
                write!(f, "greedy variable '{}' has no elements to capture", name)
            }
        }
    }
}

impl std::error::Error for Mismatch {}
