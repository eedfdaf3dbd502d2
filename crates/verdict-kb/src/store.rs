use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;
use verdict_types::{DomainId, Proposition, Rule, RuleId, Statement};

use crate::error::KbError;

/// The set of all propositions and rules currently loaded.
///
/// Facts are keyed by statement identity in a `BTreeMap`, so iteration
/// order, and therefore everything the reasoner derives from it, is
/// stable across runs.
#[derive(Clone, Debug, Default)]
pub struct KnowledgeBase {
    facts: BTreeMap<String, Proposition>,
    rules: BTreeMap<RuleId, Rule>,
    conflicts: Vec<(Proposition, Proposition)>,
    domains: BTreeSet<DomainId>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assert a fact.
    ///
    /// Re-asserting an identical proposition is a no-op. Asserting the
    /// same statement identity with the opposite truth value records
    /// the pair in the conflict registry and fails; the original
    /// proposition is kept, never overwritten.
    pub fn assert_fact(&mut self, proposition: Proposition) -> Result<(), KbError> {
        if !proposition.statement.is_ground() {
            return Err(KbError::UnboundFact(proposition.statement));
        }

        let key = proposition.statement.identity();
        if let Some(existing) = self.facts.get(&key) {
            if existing.value == proposition.value {
                return Ok(());
            }
            warn!(
                statement = %proposition.statement,
                existing = existing.value,
                incoming = proposition.value,
                "conflicting assertion recorded in conflict registry"
            );
            let pair = (existing.clone(), proposition);
            self.conflicts.push(pair.clone());
            return Err(KbError::ContradictionAtAssertion {
                existing: Box::new(pair.0),
                incoming: Box::new(pair.1),
            });
        }

        self.domains.insert(proposition.domain.clone());
        self.facts.insert(key, proposition);
        Ok(())
    }

    /// Assert a rule. Rule ids are unique across the knowledge base.
    pub fn assert_rule(&mut self, rule: Rule) -> Result<(), KbError> {
        if self.rules.contains_key(&rule.id) {
            return Err(KbError::DuplicateRule(rule.id));
        }
        self.domains.insert(rule.domain.clone());
        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    /// Direct lookup of a ground statement within the permitted
    /// domains. Out-of-domain propositions are treated as non-existent.
    pub fn lookup(&self, statement: &Statement, domains: &[DomainId]) -> Option<&Proposition> {
        self.facts
            .get(&statement.identity())
            .filter(|p| domains.contains(&p.domain))
    }

    /// All conflicting pairs recorded at assertion time.
    pub fn contradiction_check(&self) -> &[(Proposition, Proposition)] {
        &self.conflicts
    }

    /// A read-only view restricted to the given domains.
    pub fn scoped<'a>(&'a self, domains: &[DomainId]) -> ScopedKb<'a> {
        ScopedKb {
            kb: self,
            domains: domains.iter().cloned().collect(),
        }
    }

    pub fn loaded_domains(&self) -> Vec<&DomainId> {
        self.domains.iter().collect()
    }

    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

/// A domain-scoped, read-only view of a [`KnowledgeBase`].
///
/// This is what the reasoner sees: facts and rules outside the
/// permitted domain set do not appear at all.
#[derive(Clone, Debug)]
pub struct ScopedKb<'a> {
    kb: &'a KnowledgeBase,
    domains: BTreeSet<DomainId>,
}

impl<'a> ScopedKb<'a> {
    /// In-scope facts, in stable statement-identity order.
    pub fn facts(&self) -> impl Iterator<Item = &'a Proposition> + '_ {
        self.kb
            .facts
            .values()
            .filter(move |p| self.domains.contains(&p.domain))
    }

    /// In-scope rules, in stable rule-id order.
    pub fn rules(&self) -> impl Iterator<Item = &'a Rule> + '_ {
        self.kb
            .rules
            .values()
            .filter(move |r| self.domains.contains(&r.domain))
    }

    /// Direct lookup of a ground statement.
    pub fn lookup(&self, statement: &Statement) -> Option<&'a Proposition> {
        self.kb
            .facts
            .get(&statement.identity())
            .filter(|p| self.domains.contains(&p.domain))
    }

    /// Conflict pairs whose statements are in scope.
    pub fn conflicts(&self) -> impl Iterator<Item = &'a (Proposition, Proposition)> + '_ {
        self.kb
            .conflicts
            .iter()
            .filter(move |(a, _)| self.domains.contains(&a.domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_types::{Consequent, Literal, SourceId};

    fn stmt(text: &str) -> Statement {
        text.parse().unwrap()
    }

    fn fact(text: &str, value: bool, domain: &str) -> Proposition {
        Proposition::asserted(
            stmt(text),
            value,
            DomainId::new(domain),
            SourceId::new("test"),
        )
    }

    #[test]
    fn assert_and_lookup() {
        let mut kb = KnowledgeBase::new();
        kb.assert_fact(fact("parent(tom,bob)", true, "family")).unwrap();

        let domains = [DomainId::new("family")];
        let p = kb.lookup(&stmt("parent(tom,bob)"), &domains).unwrap();
        assert!(p.value);
    }

    #[test]
    fn out_of_domain_lookup_is_none() {
        let mut kb = KnowledgeBase::new();
        kb.assert_fact(fact("parent(tom,bob)", true, "family")).unwrap();

        let domains = [DomainId::new("finance")];
        assert!(kb.lookup(&stmt("parent(tom,bob)"), &domains).is_none());
    }

    #[test]
    fn identical_reassertion_is_noop() {
        let mut kb = KnowledgeBase::new();
        kb.assert_fact(fact("p", true, "general")).unwrap();
        kb.assert_fact(fact("p", true, "general")).unwrap();
        assert_eq!(kb.fact_count(), 1);
        assert!(kb.contradiction_check().is_empty());
    }

    #[test]
    fn conflicting_assertion_is_flagged_not_overwritten() {
        let mut kb = KnowledgeBase::new();
        kb.assert_fact(fact("p", true, "general")).unwrap();

        let err = kb.assert_fact(fact("p", false, "general")).unwrap_err();
        assert!(matches!(err, KbError::ContradictionAtAssertion { .. }));

        // Original value survives and the conflict is registered.
        let domains = [DomainId::new("general")];
        assert!(kb.lookup(&stmt("p"), &domains).unwrap().value);
        assert_eq!(kb.contradiction_check().len(), 1);
    }

    #[test]
    fn unbound_fact_rejected() {
        let mut kb = KnowledgeBase::new();
        let err = kb.assert_fact(fact("parent(tom,X)", true, "family")).unwrap_err();
        assert!(matches!(err, KbError::UnboundFact(_)));
    }

    #[test]
    fn duplicate_rule_rejected() {
        let mut kb = KnowledgeBase::new();
        let rule = Rule::new(
            RuleId::new("r1"),
            DomainId::new("family"),
            vec![Literal::wants(stmt("parent(X,Y)"))],
            Consequent {
                statement: stmt("ancestor(X,Y)"),
                value: true,
            },
        );
        kb.assert_rule(rule.clone()).unwrap();
        assert!(matches!(
            kb.assert_rule(rule),
            Err(KbError::DuplicateRule(_))
        ));
    }

    #[test]
    fn scoped_view_filters_facts_and_rules() {
        let mut kb = KnowledgeBase::new();
        kb.assert_fact(fact("a", true, "one")).unwrap();
        kb.assert_fact(fact("b", true, "two")).unwrap();
        kb.assert_rule(Rule::new(
            RuleId::new("r1"),
            DomainId::new("two"),
            vec![Literal::wants(stmt("b"))],
            Consequent {
                statement: stmt("c"),
                value: true,
            },
        ))
        .unwrap();

        let scope = kb.scoped(&[DomainId::new("one")]);
        assert_eq!(scope.facts().count(), 1);
        assert_eq!(scope.rules().count(), 0);
        assert!(scope.lookup(&stmt("b")).is_none());
    }

    #[test]
    fn facts_iterate_in_identity_order() {
        let mut kb = KnowledgeBase::new();
        kb.assert_fact(fact("zeta", true, "g")).unwrap();
        kb.assert_fact(fact("alpha", true, "g")).unwrap();
        kb.assert_fact(fact("mid(a)", true, "g")).unwrap();

        let scope = kb.scoped(&[DomainId::new("g")]);
        let order: Vec<String> = scope.facts().map(|p| p.statement.identity()).collect();
        assert_eq!(order, vec!["alpha", "mid(a)", "zeta"]);
    }
}
