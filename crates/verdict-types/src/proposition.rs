use serde::{Deserialize, Serialize};

use crate::{DomainId, RuleId, SourceId, Statement};

/// Where a proposition's truth value came from.
///
/// Every derived proposition carries a back-reference to the rule and
/// the supporting statements that produced it, so a proof can be
/// reconstructed without re-running the search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Asserted directly by an external source at load time.
    Asserted { source: SourceId },
    /// Derived by applying a rule to supporting propositions.
    Derived {
        rule: RuleId,
        supports: Vec<Statement>,
    },
}

/// A ground statement bound to a truth value.
///
/// Propositions are immutable once created. Asserting the same
/// statement identity with the opposite truth value is a contradiction,
/// not an overwrite.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposition {
    pub statement: Statement,
    pub value: bool,
    pub domain: DomainId,
    pub provenance: Provenance,
}

impl Proposition {
    /// An asserted fact from an external source.
    pub fn asserted(
        statement: Statement,
        value: bool,
        domain: DomainId,
        source: SourceId,
    ) -> Self {
        Self {
            statement,
            value,
            domain,
            provenance: Provenance::Asserted { source },
        }
    }

    /// A proposition derived by a rule application.
    pub fn derived(
        statement: Statement,
        value: bool,
        domain: DomainId,
        rule: RuleId,
        supports: Vec<Statement>,
    ) -> Self {
        Self {
            statement,
            value,
            domain,
            provenance: Provenance::Derived { rule, supports },
        }
    }

    /// Statement identity + truth value, for contradiction reporting.
    pub fn signed_identity(&self) -> String {
        format!("{}={}", self.statement.identity(), self.value)
    }
}

impl std::fmt::Display for Proposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.statement, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(text: &str) -> Statement {
        text.parse().unwrap()
    }

    #[test]
    fn asserted_provenance() {
        let p = Proposition::asserted(
            stmt("parent(tom,bob)"),
            true,
            DomainId::new("family"),
            SourceId::new("census"),
        );
        assert!(matches!(p.provenance, Provenance::Asserted { .. }));
        assert_eq!(p.signed_identity(), "parent(tom,bob)=true");
    }

    #[test]
    fn derived_provenance_references_supports() {
        let p = Proposition::derived(
            stmt("ancestor(tom,bob)"),
            true,
            DomainId::new("family"),
            RuleId::new("r1"),
            vec![stmt("parent(tom,bob)")],
        );
        match p.provenance {
            Provenance::Derived { ref supports, .. } => assert_eq!(supports.len(), 1),
            _ => panic!("expected derived provenance"),
        }
    }
}
