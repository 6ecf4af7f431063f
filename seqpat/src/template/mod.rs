use std::fmt;

/// A named capture position in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// The variable name, with any leading `*` stripped.
    pub name: String,
    /// `*name`: captures a contiguous run of leaf elements as a list.
    pub greedy: bool,
    /// `_`: matches without recording a binding.
    pub wildcard: bool,
}

impl Variable {
    /// Classify a raw symbol token.
    pub fn from_symbol(symbol: &str) -> Self {
        let greedy = symbol.starts_with('*');
        let name = symbol.trim_start_matches('*').to_string();
        let wildcard = name == "_";
        Variable {
            name,
            greedy,
            wildcard,
        }
    }
}

/// One child of a template: a leaf capture or a nested sub-template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Variable(Variable),
    Group(Template),
}

/// A compiled pattern, or a nested group within one.
///
/// Templates are immutable once parsed. Capture state lives in the match
/// attempt, so one template can be matched any number of times, from any
/// number of threads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    pub children: Vec<Node>,
    /// Set by a trailing `...`: the group is applied to every remaining
    /// element of its parent.
    pub repeating: bool,
}

impl Template {
    /// The greedy variable at this level, if any.
    pub fn greedy(&self) -> Option<&Variable> {
        self.children.iter().find_map(|child| match child {
            Node::Variable(var) if var.greedy => Some(var),
            _ => None,
        })
    }

    /// Number of children that each consume exactly one element.
    ///
    /// Excludes a trailing repeating group, which takes all remaining
    /// elements, but counts a greedy variable as one.
    pub fn fixed_arity(&self) -> usize {
        count_fixed(&self.children)
    }

    /// Names this template binds on a successful match, in first-occurrence
    /// order. `_` is never included.
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        for child in &self.children {
            match child {
                Node::Variable(var) => {
                    if !var.wildcard && !names.contains(&var.name) {
                        names.push(var.name.clone());
                    }
                }
                Node::Group(group) => group.collect_variables(names),
            }
        }
    }
}

/// Count the children in `nodes` that are not repeating groups.
pub fn count_fixed(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .filter(|node| !matches!(node, Node::Group(group) if group.repeating))
        .count()
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.greedy {
            write!(f, "*")?;
        }
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for Template {
    /// Canonical pattern text. Compiling the output yields an equal template.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match child {
                Node::Variable(var) => write!(f, "{}", var)?,
                Node::Group(group) => {
                    write!(f, "{}", group)?;
                    if group.repeating {
                        write!(f, " ...")?;
                    }
                }
            }
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_symbols() {
        assert_eq!(
            Variable::from_symbol("head"),
            Variable {
                name: "head".into(),
                greedy: false,
                wildcard: false
            }
        );
        assert_eq!(
            Variable::from_symbol("*rest"),
            Variable {
                name: "rest".into(),
                greedy: true,
                wildcard: false
            }
        );
        let wild = Variable::from_symbol("_");
        assert!(wild.wildcard && !wild.greedy);
        let greedy_wild = Variable::from_symbol("*_");
        assert!(greedy_wild.wildcard && greedy_wild.greedy);
    }

    #[test]
    fn display_variables() {
        assert_eq!(Variable::from_symbol("*xs").to_string(), "*xs");
        assert_eq!(Variable::from_symbol("_").to_string(), "_");
    }
}
