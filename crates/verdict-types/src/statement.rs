use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// A single argument position in a statement: a constant atom or an
/// unbound variable.
///
/// Variables are written with an upper-case leading character
/// (`parent(tom, X)`); everything else is a constant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    Atom(String),
    Var(String),
}

impl Term {
    pub fn atom(name: impl Into<String>) -> Self {
        Self::Atom(name.into())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Self::Var(_))
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Atom(a) => write!(f, "{a}"),
            Self::Var(v) => write!(f, "{v}"),
        }
    }
}

/// An atomic statement: a predicate applied to zero or more terms.
///
/// `system.online`, `parent(tom, bob)`, `parent(tom, X)`.
///
/// A statement with no variables is *ground*. The identity of a ground
/// statement is its canonical text rendering; two propositions with the
/// same identity and different truth values are a contradiction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Statement {
    pub predicate: String,
    pub args: Vec<Term>,
}

impl Statement {
    pub fn new(predicate: impl Into<String>, args: Vec<Term>) -> Self {
        Self {
            predicate: predicate.into(),
            args,
        }
    }

    /// A nullary statement (`system.online`).
    pub fn nullary(predicate: impl Into<String>) -> Self {
        Self::new(predicate, Vec::new())
    }

    /// True when no argument is a variable.
    pub fn is_ground(&self) -> bool {
        !self.args.iter().any(Term::is_var)
    }

    /// Variable names appearing in this statement, in argument order.
    pub fn variables(&self) -> Vec<&str> {
        self.args
            .iter()
            .filter_map(|t| match t {
                Term::Var(v) => Some(v.as_str()),
                Term::Atom(_) => None,
            })
            .collect()
    }

    /// Canonical text identity. Stable across runs; used as the store
    /// key for ground statements.
    pub fn identity(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.args.is_empty() {
            return write!(f, "{}", self.predicate);
        }
        write!(f, "{}(", self.predicate)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

/// Errors from parsing the statement syntax.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatementParseError {
    #[error("empty statement")]
    Empty,

    #[error("invalid predicate '{0}': must start with a lower-case letter")]
    InvalidPredicate(String),

    #[error("invalid term '{0}': allowed characters are letters, digits, '_', '.', '-'")]
    InvalidTerm(String),

    #[error("unbalanced parentheses in '{0}'")]
    UnbalancedParens(String),

    #[error("empty argument in '{0}'")]
    EmptyArgument(String),
}

fn valid_symbol(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

impl FromStr for Statement {
    type Err = StatementParseError;

    /// Parse `predicate` or `predicate(arg, ...)`. Arguments with an
    /// upper-case leading character are variables; all other arguments
    /// are constants.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(StatementParseError::Empty);
        }

        let (head, args) = match s.split_once('(') {
            None => (s, Vec::new()),
            Some((head, rest)) => {
                let inner = rest
                    .strip_suffix(')')
                    .ok_or_else(|| StatementParseError::UnbalancedParens(s.to_string()))?;
                let mut args = Vec::new();
                for raw in inner.split(',') {
                    let raw = raw.trim();
                    if raw.is_empty() {
                        return Err(StatementParseError::EmptyArgument(s.to_string()));
                    }
                    if !valid_symbol(raw) {
                        return Err(StatementParseError::InvalidTerm(raw.to_string()));
                    }
                    let term = if raw.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
                        Term::var(raw)
                    } else {
                        Term::atom(raw)
                    };
                    args.push(term);
                }
                (head.trim(), args)
            }
        };

        if !valid_symbol(head) || !head.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
            return Err(StatementParseError::InvalidPredicate(head.to_string()));
        }

        Ok(Statement::new(head, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_nullary() {
        let s: Statement = "system.online".parse().unwrap();
        assert_eq!(s.predicate, "system.online");
        assert!(s.args.is_empty());
        assert!(s.is_ground());
    }

    #[test]
    fn parse_ground_statement() {
        let s: Statement = "parent(tom, bob)".parse().unwrap();
        assert_eq!(s.args, vec![Term::atom("tom"), Term::atom("bob")]);
        assert!(s.is_ground());
        assert_eq!(s.identity(), "parent(tom,bob)");
    }

    #[test]
    fn parse_variable_statement() {
        let s: Statement = "parent(tom, X)".parse().unwrap();
        assert!(!s.is_ground());
        assert_eq!(s.variables(), vec!["X"]);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!("".parse::<Statement>(), Err(StatementParseError::Empty));
        assert!(matches!(
            "parent(tom".parse::<Statement>(),
            Err(StatementParseError::UnbalancedParens(_))
        ));
        assert!(matches!(
            "parent(tom,)".parse::<Statement>(),
            Err(StatementParseError::EmptyArgument(_))
        ));
        assert!(matches!(
            "Parent(tom)".parse::<Statement>(),
            Err(StatementParseError::InvalidPredicate(_))
        ));
        assert!(matches!(
            "parent(to m)".parse::<Statement>(),
            Err(StatementParseError::InvalidTerm(_))
        ));
    }

    #[test]
    fn display_round_trips() {
        for text in ["system.online", "parent(tom,bob)", "ancestor(X,bob)"] {
            let s: Statement = text.parse().unwrap();
            assert_eq!(s.to_string(), text);
            let again: Statement = s.to_string().parse().unwrap();
            assert_eq!(s, again);
        }
    }
}
