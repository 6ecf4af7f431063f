use std::collections::BTreeMap;

use seqpat::template::{Node, Template, Variable, count_fixed};
use tracing::{debug, trace};

use crate::bindings::Bindings;
use crate::error::Mismatch;
use crate::value::Value;

/// Captures recorded so far in one match attempt (or one repetition of a
/// repeating group).
type Scope = BTreeMap<String, Value>;

/// Attempt to match a Value against a Template.
/// Returns Some(bindings) if the match succeeds, None otherwise.
pub fn match_value(template: &Template, value: &Value) -> Option<Bindings> {
    explain(template, value).ok()
}

/// Like [`match_value`], but reports why a match failed.
pub fn explain(template: &Template, value: &Value) -> Result<Bindings, Mismatch> {
    let mut scope = Scope::new();
    match match_template(template, value, &mut scope) {
        Ok(()) => {
            trace!(%template, %value, bindings = scope.len(), "matched");
            Ok(Bindings::from(scope))
        }
        Err(mismatch) => {
            debug!(%template, %value, %mismatch, "no match");
            Err(mismatch)
        }
    }
}

// ---------------------------------------------------------------------------
// Positional alignment
// ---------------------------------------------------------------------------

fn match_template(template: &Template, value: &Value, scope: &mut Scope) -> Result<(), Mismatch> {
    match_children(&template.children, value.elements(), scope)
}

/// Walk template children left to right against the candidate elements.
///
/// A greedy variable takes a run of elements and the walk resumes after it;
/// a repeating group (always last) takes everything that remains.
fn match_children(children: &[Node], elements: &[Value], scope: &mut Scope) -> Result<(), Mismatch> {
    let mut rest = elements;

    for (position, child) in children.iter().enumerate() {
        match child {
            Node::Group(group) if group.repeating => {
                return match_repeating(group, rest, scope);
            }
            Node::Variable(var) if var.greedy => {
                let reserved = count_fixed(&children[position + 1..]);
                rest = match_greedy(var, rest, reserved, scope)?;
                continue;
            }
            _ => {}
        }

        let Some((element, tail)) = rest.split_first() else {
            return Err(Mismatch::TooFewElements {
                needed: count_fixed(children),
                found: elements.len(),
            });
        };
        check_match(child, element, scope)?;
        rest = tail;
    }

    if !rest.is_empty() {
        return Err(Mismatch::TooManyElements {
            allowed: elements.len() - rest.len(),
            found: elements.len(),
        });
    }
    Ok(())
}

/// Compare one child against one element, recording any captures.
fn check_match(child: &Node, element: &Value, scope: &mut Scope) -> Result<(), Mismatch> {
    match child {
        Node::Variable(var) => {
            if var.wildcard {
                return Ok(());
            }
            if element.is_sequence() {
                return Err(Mismatch::SequenceInLeafPosition {
                    name: var.name.clone(),
                });
            }
            bind(scope, &var.name, element.clone())
        }
        Node::Group(group) => {
            let mut inner = Scope::new();
            match_template(group, element, &mut inner)?;
            for (name, value) in inner {
                bind(scope, &name, value)?;
            }
            Ok(())
        }
    }
}

/// Record a capture, enforcing that a name used more than once binds equal
/// values throughout the attempt.
fn bind(scope: &mut Scope, name: &str, value: Value) -> Result<(), Mismatch> {
    match scope.get(name) {
        Some(existing) if *existing != value => {
            trace!(name, %existing, %value, "inconsistent binding");
            Err(Mismatch::InconsistentBinding {
                name: name.to_string(),
            })
        }
        Some(_) => Ok(()),
        None => {
            scope.insert(name.to_string(), value);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Greedy runs
// ---------------------------------------------------------------------------

/// Absorb a run of leaves into a greedy variable, leaving `reserved` elements
/// for the fixed positions after it. Returns the unconsumed elements.
///
/// The run takes at least one element and stops early at the first
/// sub-sequence; whatever follows is left to ordinary positional matching.
fn match_greedy<'v>(
    var: &Variable,
    elements: &'v [Value],
    reserved: usize,
    scope: &mut Scope,
) -> Result<&'v [Value], Mismatch> {
    let available = elements.len().saturating_sub(reserved);
    let run = elements[..available]
        .iter()
        .take_while(|element| !element.is_sequence())
        .count();

    if run == 0 {
        return Err(if available == 0 {
            Mismatch::GreedyUnderflow {
                name: var.name.clone(),
            }
        } else {
            Mismatch::SequenceInLeafPosition {
                name: var.name.clone(),
            }
        });
    }

    let (captured, rest) = elements.split_at(run);
    trace!(name = %var.name, run, reserved, "greedy run");
    if !var.wildcard {
        bind(scope, &var.name, Value::List(captured.to_vec()))?;
    }
    Ok(rest)
}

// ---------------------------------------------------------------------------
// Repeating groups
// ---------------------------------------------------------------------------

/// Apply a repeating group to every remaining element.
///
/// Each repetition is an independent nested match in a fresh scope. Every
/// variable the group binds ends up as a list with one entry per repetition,
/// empty when there are no repetitions.
fn match_repeating(group: &Template, elements: &[Value], scope: &mut Scope) -> Result<(), Mismatch> {
    let mut columns: BTreeMap<String, Vec<Value>> = group
        .variables()
        .into_iter()
        .map(|name| (name, Vec::new()))
        .collect();

    for (repetition, element) in elements.iter().enumerate() {
        let mut inner = Scope::new();
        if let Err(mismatch) = match_template(group, element, &mut inner) {
            trace!(repetition, %element, "repetition failed");
            return Err(mismatch);
        }
        for (name, value) in inner {
            columns.entry(name).or_default().push(value);
        }
    }

    debug!(repetitions = elements.len(), "repeating group");
    for (name, values) in columns {
        bind(scope, &name, Value::List(values))?;
    }
    Ok(())
}
