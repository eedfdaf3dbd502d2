use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use verdict_types::{Proposition, RuleId, Statement};

use crate::proof::Proof;

/// The resolved answer: the ground instance of the query target, its
/// truth value, and the atoms bound to the query's variables.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conclusion {
    pub statement: Statement,
    pub value: bool,
    pub bindings: BTreeMap<String, String>,
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.statement, self.value)?;
        if !self.bindings.is_empty() {
            let pairs: Vec<String> = self
                .bindings
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            write!(f, " where {}", pairs.join(", "))?;
        }
        Ok(())
    }
}

/// Why no satisfying assignment exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoSolutionReason {
    /// An applicable rule was blocked by an antecedent that could not
    /// be established.
    UnmetAntecedent(Statement),
    /// Every remaining derivation would re-apply a rule already on its
    /// own path with identical bindings.
    CyclicDependency(RuleId),
    /// No rule in the permitted domains concludes the goal, and no
    /// fact matches it.
    NoApplicableRule(Statement),
}

impl std::fmt::Display for NoSolutionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnmetAntecedent(s) => write!(f, "unmet antecedent: {s}"),
            Self::CyclicDependency(r) => write!(f, "cyclic dependency: {r}"),
            Self::NoApplicableRule(s) => write!(f, "no applicable rule: {s}"),
        }
    }
}

/// The outcome of resolving one query.
///
/// Only `Unique` carries an answer, and it always carries the proof
/// with it. Everything else is a refusal with a structured cause,
/// never an estimate, approximation, or guess.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ResolutionResult {
    /// Exactly one satisfying assignment within the depth budget.
    Unique { conclusion: Conclusion, proof: Proof },

    /// No assignment satisfies the active rules from permitted domains.
    NoSolution { reason: NoSolutionReason },

    /// Two or more distinct proofs reach conflicting values, or
    /// distinct variable bindings for an underdetermined query.
    Ambiguous { candidates: Vec<(Conclusion, Proof)> },

    /// Resolution would require two propositions with the same
    /// statement identity and opposite truth values to both hold.
    Contradiction {
        conflicts: Vec<(Proposition, Proposition)>,
    },

    /// A candidate derivation exists but needs more chained rule
    /// applications than the budget permits.
    DepthExceeded,
}

impl ResolutionResult {
    pub fn is_unique(&self) -> bool {
        matches!(self, Self::Unique { .. })
    }

    /// Short label used in audit entries and halt causes.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unique { .. } => "unique",
            Self::NoSolution { .. } => "no-solution",
            Self::Ambiguous { .. } => "ambiguous",
            Self::Contradiction { .. } => "contradiction",
            Self::DepthExceeded => "depth-exceeded",
        }
    }
}
