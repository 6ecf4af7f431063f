use std::ops::Range;

use crate::parser::error::{SyntaxError, SyntaxErrorKind};
use crate::parser::token::{Token, TokenKind};
use crate::template::{Node, Template, Variable};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the root template from a token stream.
///
/// The top-level token sequence is the root group, except that a source
/// consisting of exactly one plain group is unwrapped to that group, so
/// `(a b)` and `a b` describe the same template.
pub fn parse_tokens(
    tokens: &[Token],
    source_len: usize,
    file_id: usize,
) -> Result<Template, SyntaxError> {
    if tokens.is_empty() {
        return Err(SyntaxError::new(
            SyntaxErrorKind::EmptyPattern,
            0..source_len,
            file_id,
        ));
    }

    let mut grammar = Grammar {
        tokens,
        pos: 0,
        file_id,
    };
    let mut root = grammar.parse_group(None)?;

    let single_plain_group =
        matches!(root.children.as_slice(), [Node::Group(group)] if !group.repeating);
    if single_plain_group {
        if let Some(Node::Group(group)) = root.children.pop() {
            root = group;
        }
    }
    Ok(root)
}

// ---------------------------------------------------------------------------
// Recursive descent
// ---------------------------------------------------------------------------

struct Grammar<'a> {
    tokens: &'a [Token],
    pos: usize,
    file_id: usize,
}

/// Per-group bookkeeping for the one-per-level markers.
#[derive(Default)]
struct Markers {
    greedy: Option<Range<usize>>,
    ellipsis: Option<Range<usize>>,
}

impl<'a> Grammar<'a> {
    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn error(&self, kind: SyntaxErrorKind, span: Range<usize>) -> SyntaxError {
        SyntaxError::new(kind, span, self.file_id)
    }

    /// Parse children until the matching `)` (when `open` is the span of the
    /// group's `(`) or until the end of input (for the root).
    fn parse_group(&mut self, open: Option<Range<usize>>) -> Result<Template, SyntaxError> {
        let mut children: Vec<Node> = Vec::new();
        let mut markers = Markers::default();

        loop {
            let Some(token) = self.next() else {
                return match open {
                    Some(span) => Err(self.error(SyntaxErrorKind::UnclosedGroup, span)),
                    None => Ok(Template {
                        children,
                        repeating: false,
                    }),
                };
            };

            match &token.kind {
                TokenKind::Close => {
                    let Some(open_span) = &open else {
                        return Err(self.error(SyntaxErrorKind::UnexpectedClose, token.span.clone()));
                    };
                    if children.is_empty() {
                        return Err(self.error(
                            SyntaxErrorKind::EmptyGroup,
                            open_span.start..token.span.end,
                        ));
                    }
                    return Ok(Template {
                        children,
                        repeating: false,
                    });
                }

                TokenKind::Open => {
                    self.check_after_ellipsis(&markers, token)?;
                    let group = self.parse_group(Some(token.span.clone()))?;
                    children.push(Node::Group(group));
                }

                TokenKind::Ellipsis => {
                    self.mark_repeating(&mut children, &mut markers, token)?;
                }

                TokenKind::Symbol(text) => {
                    self.check_after_ellipsis(&markers, token)?;
                    let var = Variable::from_symbol(text);
                    if var.greedy {
                        if var.name.is_empty() {
                            return Err(self.error(SyntaxErrorKind::BareGreedy, token.span.clone()));
                        }
                        if let Some(first) = &markers.greedy {
                            return Err(self
                                .error(SyntaxErrorKind::DuplicateGreedy, token.span.clone())
                                .with_note(format!(
                                    "first greedy variable is at {}..{}",
                                    first.start, first.end
                                )));
                        }
                        markers.greedy = Some(token.span.clone());
                    }
                    children.push(Node::Variable(var));
                }
            }
        }
    }

    fn mark_repeating(
        &self,
        children: &mut [Node],
        markers: &mut Markers,
        token: &Token,
    ) -> Result<(), SyntaxError> {
        let Some(Node::Group(group)) = children.last_mut() else {
            return Err(self
                .error(SyntaxErrorKind::EllipsisWithoutGroup, token.span.clone())
                .with_note("`...` must directly follow a parenthesised group"));
        };
        if markers.ellipsis.is_some() {
            return Err(self.error(SyntaxErrorKind::DuplicateEllipsis, token.span.clone()));
        }
        group.repeating = true;
        markers.ellipsis = Some(token.span.clone());
        Ok(())
    }

    fn check_after_ellipsis(&self, markers: &Markers, token: &Token) -> Result<(), SyntaxError> {
        match &markers.ellipsis {
            Some(_) => Err(self
                .error(SyntaxErrorKind::EllipsisNotLast, token.span.clone())
                .with_note("a repeating group consumes every remaining element")),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;
    use crate::parser::error::SyntaxErrorKind;
    use crate::template::{Node, Template, Variable};

    fn parse(source: &str) -> Template {
        Parser::new(source.to_string(), 0)
            .parse()
            .expect("pattern should parse")
    }

    fn parse_err(source: &str) -> SyntaxErrorKind {
        Parser::new(source.to_string(), 0)
            .parse()
            .expect_err("pattern should not parse")
            .kind
    }

    fn var(symbol: &str) -> Node {
        Node::Variable(Variable::from_symbol(symbol))
    }

    fn group(children: Vec<Node>, repeating: bool) -> Node {
        Node::Group(Template {
            children,
            repeating,
        })
    }

    #[test]
    fn flat_group() {
        assert_eq!(parse("(a b)").children, vec![var("a"), var("b")]);
    }

    #[test]
    fn bare_symbols_form_the_root() {
        assert_eq!(parse("a").children, vec![var("a")]);
        assert_eq!(parse("a b"), parse("(a b)"));
        assert_eq!(parse("_").children, vec![var("_")]);
    }

    #[test]
    fn nested_and_repeating() {
        let template = parse("(head (k v) ...)");
        assert_eq!(
            template.children,
            vec![var("head"), group(vec![var("k"), var("v")], true)]
        );
        assert!(!template.repeating);
    }

    #[test]
    fn top_level_repeating_group_is_not_unwrapped() {
        let template = parse("(k v) ...");
        assert_eq!(
            template.children,
            vec![group(vec![var("k"), var("v")], true)]
        );
    }

    #[test]
    fn doubly_wrapped_group_keeps_inner_group() {
        let template = parse("((a b))");
        assert_eq!(template.children, vec![group(vec![var("a"), var("b")], false)]);
    }

    #[test]
    fn greedy_markers_are_per_level() {
        let template = parse("(*xs (*ys z))");
        assert_eq!(template.greedy().map(|v| v.name.as_str()), Some("xs"));
        assert_eq!(parse_err("(*xs *ys)"), SyntaxErrorKind::DuplicateGreedy);
    }

    #[test]
    fn structural_errors() {
        assert_eq!(parse_err(""), SyntaxErrorKind::EmptyPattern);
        assert_eq!(parse_err("  "), SyntaxErrorKind::EmptyPattern);
        assert_eq!(parse_err("()"), SyntaxErrorKind::EmptyGroup);
        assert_eq!(parse_err("(a ())"), SyntaxErrorKind::EmptyGroup);
        assert_eq!(parse_err("(a (b)"), SyntaxErrorKind::UnclosedGroup);
        assert_eq!(parse_err("(a))"), SyntaxErrorKind::UnexpectedClose);
        assert_eq!(parse_err("(a *)"), SyntaxErrorKind::BareGreedy);
    }

    #[test]
    fn ellipsis_errors() {
        assert_eq!(parse_err("(a ...)"), SyntaxErrorKind::EllipsisWithoutGroup);
        assert_eq!(parse_err("(... (a))"), SyntaxErrorKind::EllipsisWithoutGroup);
        assert_eq!(parse_err("((a) ... ...)"), SyntaxErrorKind::DuplicateEllipsis);
        assert_eq!(parse_err("((a) ... b)"), SyntaxErrorKind::EllipsisNotLast);
        assert_eq!(parse_err("((a) ... (b))"), SyntaxErrorKind::EllipsisNotLast);
    }

    #[test]
    fn error_spans_cover_the_offending_text() {
        let source = "(x () y)";
        let err = Parser::new(source.to_string(), 3).parse().unwrap_err();
        assert_eq!(&source[err.span.clone()], "()");
        assert_eq!(err.file_id, 3);

        let source = "(*a b *c)";
        let err = Parser::new(source.to_string(), 0).parse().unwrap_err();
        assert_eq!(&source[err.span.clone()], "*c");
        assert_eq!(err.notes.len(), 1);
    }

    #[test]
    fn display_round_trips() {
        for source in [
            "a",
            "(a b)",
            "(a *rest b)",
            "(head (k v) ...)",
            "((a b))",
            "(k v) ...",
            "(_ (x (*ys) ...) z)",
        ] {
            let template = parse(source);
            assert_eq!(parse(&template.to_string()), template, "source: {}", source);
        }
        assert_eq!(parse("( a  *r(k v)... )").to_string(), "(a *r (k v) ...)");
    }

    #[test]
    fn variables_in_first_occurrence_order() {
        let template = parse("(a _ (b a) (c *d) ...)");
        assert_eq!(template.variables(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn fixed_arity_skips_repeating_group() {
        assert_eq!(parse("(a *r b)").fixed_arity(), 3);
        assert_eq!(parse("(a (k v) ...)").fixed_arity(), 1);
    }
}
