use std::collections::BTreeMap;

use verdict_types::{Statement, Term};

/// Variable bindings accumulated during a derivation.
///
/// Backed by a `BTreeMap` so rendering and iteration are stable across
/// runs. A variable may be bound to another variable; [`walk`]
/// dereferences chains until it reaches an atom or an unbound variable.
pub type Bindings = BTreeMap<String, Term>;

/// Dereference a term through the binding chain.
pub fn walk(bindings: &Bindings, term: &Term) -> Term {
    let mut current = term.clone();
    while let Term::Var(name) = &current {
        match bindings.get(name) {
            Some(next) => current = next.clone(),
            None => break,
        }
    }
    current
}

/// Unify two statements under existing bindings.
///
/// Returns the extended bindings on success, `None` on mismatch.
/// Bindings introduced for one argument position constrain every later
/// position: a statement pair that would bind the same variable to two
/// different atoms does not unify.
pub fn unify(left: &Statement, right: &Statement, bindings: &Bindings) -> Option<Bindings> {
    if left.predicate != right.predicate || left.args.len() != right.args.len() {
        return None;
    }
    let mut out = bindings.clone();
    for (a, b) in left.args.iter().zip(right.args.iter()) {
        let a = walk(&out, a);
        let b = walk(&out, b);
        if a == b {
            continue;
        }
        match (a, b) {
            (Term::Var(v), other) | (other, Term::Var(v)) => {
                out.insert(v, other);
            }
            (Term::Atom(_), Term::Atom(_)) => return None,
        }
    }
    Some(out)
}

/// Apply bindings to a statement, leaving unbound variables in place.
pub fn substitute(statement: &Statement, bindings: &Bindings) -> Statement {
    Statement {
        predicate: statement.predicate.clone(),
        args: statement
            .args
            .iter()
            .map(|t| walk(bindings, t))
            .collect(),
    }
}

/// Canonical rendering of a possibly-open statement: remaining
/// variables are renamed `_0`, `_1`, ... by first occurrence. Used as
/// the cycle-guard key so that renamed rule variables compare equal
/// across applications.
pub fn canonical_form(statement: &Statement) -> String {
    let mut seen: Vec<&str> = Vec::new();
    let mut parts: Vec<String> = Vec::new();
    for arg in &statement.args {
        match arg {
            Term::Atom(a) => parts.push(a.clone()),
            Term::Var(v) => {
                let idx = match seen.iter().position(|s| s == v) {
                    Some(i) => i,
                    None => {
                        seen.push(v);
                        seen.len() - 1
                    }
                };
                parts.push(format!("_{idx}"));
            }
        }
    }
    if parts.is_empty() {
        statement.predicate.clone()
    } else {
        format!("{}({})", statement.predicate, parts.join(","))
    }
}
