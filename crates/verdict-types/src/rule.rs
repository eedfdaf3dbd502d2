use serde::{Deserialize, Serialize};

use crate::{DomainId, RuleId, Statement};

/// One antecedent position of a rule: a statement pattern plus the
/// truth value it must resolve to.
///
/// A negated antecedent expects `false`: an explicit negative fact or
/// a rule concluding `false`. Absence of knowledge never satisfies an
/// antecedent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    pub statement: Statement,
    pub expect: bool,
}

impl Literal {
    pub fn wants(statement: Statement) -> Self {
        Self {
            statement,
            expect: true,
        }
    }

    pub fn wants_not(statement: Statement) -> Self {
        Self {
            statement,
            expect: false,
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.expect {
            write!(f, "{}", self.statement)
        } else {
            write!(f, "not {}", self.statement)
        }
    }
}

/// The single conclusion of a rule: a statement pattern and the truth
/// value the rule establishes for its ground instances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consequent {
    pub statement: Statement,
    pub value: bool,
}

/// An implication rule: ordered antecedents, one consequent, scoped to
/// a knowledge domain.
///
/// Rules are immutable. A rule may only be applied when its domain is
/// among the active persona's permitted domains; outside that set it is
/// non-existent for the session, not merely deprioritized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub domain: DomainId,
    pub antecedents: Vec<Literal>,
    pub consequent: Consequent,
}

impl Rule {
    pub fn new(
        id: RuleId,
        domain: DomainId,
        antecedents: Vec<Literal>,
        consequent: Consequent,
    ) -> Self {
        Self {
            id,
            domain,
            antecedents,
            consequent,
        }
    }

    /// Variable names appearing anywhere in the rule.
    pub fn variables(&self) -> Vec<String> {
        let mut vars: Vec<String> = Vec::new();
        let mut push_all = |s: &Statement| {
            for v in s.variables() {
                if !vars.iter().any(|existing| existing == v) {
                    vars.push(v.to_string());
                }
            }
        };
        for lit in &self.antecedents {
            push_all(&lit.statement);
        }
        push_all(&self.consequent.statement);
        vars
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let body: Vec<String> = self.antecedents.iter().map(|l| l.to_string()).collect();
        write!(
            f,
            "[{}] {} => {} = {}",
            self.id,
            body.join(" and "),
            self.consequent.statement,
            self.consequent.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(text: &str) -> Statement {
        text.parse().unwrap()
    }

    #[test]
    fn rule_variables_deduplicated_in_order() {
        let rule = Rule::new(
            RuleId::new("r1"),
            DomainId::new("family"),
            vec![
                Literal::wants(stmt("parent(X,Y)")),
                Literal::wants(stmt("parent(Y,Z)")),
            ],
            Consequent {
                statement: stmt("grandparent(X,Z)"),
                value: true,
            },
        );
        assert_eq!(rule.variables(), vec!["X", "Y", "Z"]);
    }

    #[test]
    fn negated_literal_displays() {
        let lit = Literal::wants_not(stmt("suspended(X)"));
        assert_eq!(lit.to_string(), "not suspended(X)");
    }
}
