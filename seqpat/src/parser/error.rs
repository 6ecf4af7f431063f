use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};

/// What was wrong with a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// The source contained no tokens at all.
    EmptyPattern,
    /// `()`
    EmptyGroup,
    /// A `(` without its `)`.
    UnclosedGroup,
    /// A `)` with no open group.
    UnexpectedClose,
    /// A second `*name` in the same group.
    DuplicateGreedy,
    /// A lone `*` with no name after it.
    BareGreedy,
    /// `...` after something other than a group.
    EllipsisWithoutGroup,
    /// A second `...` in the same group.
    DuplicateEllipsis,
    /// Something follows a repeating group.
    EllipsisNotLast,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxErrorKind::EmptyPattern => write!(f, "empty pattern"),
            SyntaxErrorKind::EmptyGroup => write!(f, "empty match template"),
            SyntaxErrorKind::UnclosedGroup => write!(f, "unclosed group: expected `)`"),
            SyntaxErrorKind::UnexpectedClose => write!(f, "unexpected `)`"),
            SyntaxErrorKind::DuplicateGreedy => {
                write!(f, "can only have a max of one * per template")
            }
            SyntaxErrorKind::BareGreedy => write!(f, "`*` must be followed by a variable name"),
            SyntaxErrorKind::EllipsisWithoutGroup => {
                write!(f, "... can only be used on a repeating sub template")
            }
            SyntaxErrorKind::DuplicateEllipsis => {
                write!(f, "can only have a maximum of one ... per template")
            }
            SyntaxErrorKind::EllipsisNotLast => {
                write!(f, "a repeating sub template must be the last element of its group")
            }
        }
    }
}

/// A pattern syntax error with source location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub span: Range<usize>,
    pub file_id: usize,
    pub notes: Vec<String>,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, span: Range<usize>, file_id: usize) -> Self {
        SyntaxError {
            kind,
            span,
            file_id,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::error()
            .with_message(self.kind.to_string())
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at {}..{}: {}", self.span.start, self.span.end, self.kind)
    }
}

impl std::error::Error for SyntaxError {}
