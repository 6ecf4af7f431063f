use std::ops::Range;

/// The lexical class of a pattern token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `(`
    Open,
    /// `)`
    Close,
    /// `...` as a whole token
    Ellipsis,
    /// Any other whitespace-delimited run, including `_` and `*name`.
    Symbol(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range in the pattern source.
    pub span: Range<usize>,
}

/// Split pattern source into tokens.
///
/// Parentheses always stand alone; everything else is separated by
/// whitespace. There is no escaping, so a symbol can never contain `(` or `)`.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut symbol_start: Option<usize> = None;

    for (offset, ch) in source.char_indices() {
        let boundary = ch == '(' || ch == ')' || ch.is_whitespace();
        if !boundary {
            symbol_start.get_or_insert(offset);
            continue;
        }

        if let Some(start) = symbol_start.take() {
            tokens.push(symbol(&source[start..offset], start));
        }

        match ch {
            '(' => tokens.push(Token {
                kind: TokenKind::Open,
                span: offset..offset + 1,
            }),
            ')' => tokens.push(Token {
                kind: TokenKind::Close,
                span: offset..offset + 1,
            }),
            _ => {}
        }
    }

    if let Some(start) = symbol_start {
        tokens.push(symbol(&source[start..], start));
    }

    tokens
}

fn symbol(text: &str, start: usize) -> Token {
    let kind = if text == "..." {
        TokenKind::Ellipsis
    } else {
        TokenKind::Symbol(text.to_string())
    };
    Token {
        kind,
        span: start..start + text.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    fn sym(s: &str) -> TokenKind {
        TokenKind::Symbol(s.to_string())
    }

    #[test]
    fn parens_stand_alone() {
        assert_eq!(
            kinds("(a(b c)d)"),
            vec![
                TokenKind::Open,
                sym("a"),
                TokenKind::Open,
                sym("b"),
                sym("c"),
                TokenKind::Close,
                sym("d"),
                TokenKind::Close,
            ]
        );
    }

    #[test]
    fn markers_are_symbols_except_ellipsis() {
        assert_eq!(
            kinds("(_ *rest (k v) ...)"),
            vec![
                TokenKind::Open,
                sym("_"),
                sym("*rest"),
                TokenKind::Open,
                sym("k"),
                sym("v"),
                TokenKind::Close,
                TokenKind::Ellipsis,
                TokenKind::Close,
            ]
        );
        // Only a whole-token `...` is the repetition marker.
        assert_eq!(kinds("a... ...."), vec![sym("a..."), sym("....")]);
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(kinds("  a \t\n b  "), vec![sym("a"), sym("b")]);
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn spans_point_into_source() {
        let source = "(head  *tail)";
        let tokens = tokenize(source);
        let texts: Vec<&str> = tokens.iter().map(|t| &source[t.span.clone()]).collect();
        assert_eq!(texts, vec!["(", "head", "*tail", ")"]);
    }

    #[test]
    fn multibyte_symbols_keep_byte_spans() {
        let source = "(é ü)";
        let tokens = tokenize(source);
        assert_eq!(tokens[1].kind, sym("é"));
        assert_eq!(&source[tokens[2].span.clone()], "ü");
    }
}
