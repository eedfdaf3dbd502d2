use serde::{Deserialize, Serialize};
use verdict_types::{RuleId, SourceId, Statement};

/// One deduction step in a proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofStep {
    /// A direct assertion consumed from the proposition store.
    Fact {
        statement: Statement,
        value: bool,
        source: SourceId,
    },
    /// A rule application: `supports` are the ground antecedent
    /// instances consumed, `statement` the conclusion established.
    Derived {
        rule: RuleId,
        statement: Statement,
        value: bool,
        supports: Vec<Statement>,
    },
}

impl ProofStep {
    pub fn statement(&self) -> &Statement {
        match self {
            Self::Fact { statement, .. } | Self::Derived { statement, .. } => statement,
        }
    }

    pub fn value(&self) -> bool {
        match self {
            Self::Fact { value, .. } | Self::Derived { value, .. } => *value,
        }
    }
}

impl std::fmt::Display for ProofStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fact {
                statement,
                value,
                source,
            } => write!(f, "fact {statement} = {value} [{source}]"),
            Self::Derived {
                rule,
                statement,
                value,
                supports,
            } => {
                let body: Vec<String> = supports.iter().map(|s| s.to_string()).collect();
                write!(f, "{rule}: {} => {statement} = {value}", body.join(" and "))
            }
        }
    }
}

/// An ordered sequence of deduction steps terminating at the queried
/// proposition.
///
/// A proof is the sole justification accompanying an affirmative
/// answer; an answer without one is invalid by construction. Every step
/// names the rule applied and the supports consumed, so the derivation
/// can be inspected without re-running the search.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub steps: Vec<ProofStep>,
}

impl Proof {
    pub fn new(steps: Vec<ProofStep>) -> Self {
        Self { steps }
    }

    /// The final step: the queried proposition itself.
    pub fn conclusion(&self) -> Option<&ProofStep> {
        self.steps.last()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl std::fmt::Display for Proof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "{:>3}. {step}", i + 1)?;
        }
        Ok(())
    }
}
