use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;
use verdict_kb::ScopedKb;
use verdict_types::{
    DomainId, Literal, Proposition, Provenance, Query, Rule, RuleId, SourceId, Statement, Term,
};

use crate::bindings::{canonical_form, substitute, unify, walk, Bindings};
use crate::proof::{Proof, ProofStep};
use crate::result::{Conclusion, NoSolutionReason, ResolutionResult};

/// One pending obligation in a partial derivation.
#[derive(Clone, Debug)]
enum Frame {
    /// Establish a statement instance, by direct lookup or rule
    /// application. `expect` is `None` only for the query target
    /// itself; antecedent goals always carry the value their literal
    /// demands.
    Prove {
        pattern: Statement,
        expect: Option<bool>,
        budget: u32,
        /// (rule, canonical consequent instance) pairs already applied
        /// on the path from the query to this goal. The cycle guard.
        ancestors: Vec<(RuleId, String)>,
        toplevel: bool,
    },
    /// All antecedents of a rule application are proven; record the
    /// conclusion.
    Conclude {
        rule: RuleId,
        domain: DomainId,
        consequent: Statement,
        value: bool,
        supports: Vec<Statement>,
        toplevel: bool,
    },
}

/// A partial derivation on the work-list: the remaining goal stack,
/// bindings so far, the statements this path has already committed to,
/// and the proof steps already justified.
#[derive(Clone, Debug)]
struct SearchState {
    goals: Vec<Frame>,
    bindings: Bindings,
    assignment: BTreeMap<String, Proposition>,
    steps: Vec<ProofStep>,
    conclusion: Option<(Statement, bool)>,
    fresh: u32,
}

/// The backward-chaining resolver.
///
/// `resolve` is a pure function of (query, scoped knowledge base): it
/// never mutates anything and performs no I/O. All distinct derivation
/// paths within the depth budget are explored; the frontier is an
/// explicit stack of [`SearchState`]s expanded in a loop.
#[derive(Clone, Debug, Default)]
pub struct Resolver;

impl Resolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, query: &Query, scope: &ScopedKb<'_>) -> ResolutionResult {
        let initial = SearchState {
            goals: vec![Frame::Prove {
                pattern: query.target.clone(),
                expect: None,
                budget: query.max_depth,
                ancestors: Vec::new(),
                toplevel: true,
            }],
            bindings: Bindings::new(),
            assignment: BTreeMap::new(),
            steps: Vec::new(),
            conclusion: None,
            fresh: 0,
        };

        let mut work: Vec<SearchState> = vec![initial];
        let mut outcomes: Vec<(Conclusion, Proof)> = Vec::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut truncated = false;
        let mut unmet: Option<Statement> = None;
        let mut cyclic: Option<RuleId> = None;
        let mut no_rule: Option<Statement> = None;
        let mut path_conflicts: Vec<(Proposition, Proposition)> = Vec::new();

        while let Some(mut state) = work.pop() {
            let Some(frame) = state.goals.pop() else {
                // Every obligation discharged: a complete derivation.
                if let Some((statement, value)) = state.conclusion.take() {
                    let key = format!("{}={}", statement.identity(), value);
                    if seen.insert(key) {
                        let bindings = query_bindings(&query.target, &state.bindings);
                        outcomes.push((
                            Conclusion {
                                statement,
                                value,
                                bindings,
                            },
                            Proof::new(state.steps),
                        ));
                    }
                }
                continue;
            };

            match frame {
                Frame::Conclude {
                    rule,
                    domain,
                    consequent,
                    value,
                    supports,
                    toplevel,
                } => {
                    let instance = substitute(&consequent, &state.bindings);
                    // A conclusion the antecedents failed to ground is
                    // inapplicable for this path.
                    if !instance.is_ground() {
                        continue;
                    }
                    let supports: Vec<Statement> = supports
                        .iter()
                        .map(|s| substitute(s, &state.bindings))
                        .collect();
                    let key = instance.identity();
                    match state.assignment.get(&key) {
                        Some(existing) if existing.value != value => {
                            let derived = Proposition::derived(
                                instance, value, domain, rule, supports,
                            );
                            path_conflicts.push((existing.clone(), derived));
                            continue;
                        }
                        Some(_) => {
                            // Already established on this path at the
                            // same value; no new step needed.
                        }
                        None => {
                            let derived = Proposition::derived(
                                instance.clone(),
                                value,
                                domain,
                                rule.clone(),
                                supports.clone(),
                            );
                            state.assignment.insert(key, derived);
                            state.steps.push(ProofStep::Derived {
                                rule,
                                statement: instance.clone(),
                                value,
                                supports,
                            });
                        }
                    }
                    if toplevel {
                        state.conclusion = Some((instance, value));
                    }
                    work.push(state);
                }

                Frame::Prove {
                    pattern,
                    expect,
                    budget,
                    ancestors,
                    toplevel,
                } => {
                    let pattern = substitute(&pattern, &state.bindings);

                    // A goal touching a statement asserted at both
                    // truth values resolves to Contradiction outright.
                    let registry: Vec<(Proposition, Proposition)> = scope
                        .conflicts()
                        .filter(|(a, _)| unify(&pattern, &a.statement, &state.bindings).is_some())
                        .cloned()
                        .collect();
                    if !registry.is_empty() {
                        debug!(goal = %pattern, "goal touches conflict registry");
                        return ResolutionResult::Contradiction {
                            conflicts: registry,
                        };
                    }

                    let mut successors: Vec<SearchState> = Vec::new();
                    let mut cycle_pruned: Option<RuleId> = None;

                    // Direct lookup. Facts cost no depth.
                    for prop in scope.facts() {
                        let Some(next_bindings) =
                            unify(&pattern, &prop.statement, &state.bindings)
                        else {
                            continue;
                        };
                        if expect.is_some_and(|e| prop.value != e) {
                            continue;
                        }
                        let key = prop.statement.identity();
                        match state.assignment.get(&key) {
                            Some(existing) if existing.value != prop.value => {
                                path_conflicts.push((existing.clone(), prop.clone()));
                                continue;
                            }
                            Some(_) => {
                                let mut next = state.clone();
                                next.bindings = next_bindings;
                                if toplevel {
                                    next.conclusion = Some((prop.statement.clone(), prop.value));
                                }
                                successors.push(next);
                            }
                            None => {
                                let mut next = state.clone();
                                next.bindings = next_bindings;
                                next.assignment.insert(key, prop.clone());
                                next.steps.push(ProofStep::Fact {
                                    statement: prop.statement.clone(),
                                    value: prop.value,
                                    source: provenance_source(&prop.provenance),
                                });
                                if toplevel {
                                    next.conclusion = Some((prop.statement.clone(), prop.value));
                                }
                                successors.push(next);
                            }
                        }
                    }

                    // Rule application. Each application consumes one
                    // unit of the depth budget.
                    if budget == 0 {
                        if applicable_rule_exists(scope, &pattern, expect, &state) {
                            truncated = true;
                        }
                    } else {
                        for rule in scope.rules() {
                            if expect.is_some_and(|e| rule.consequent.value != e) {
                                continue;
                            }
                            let (consequent, antecedents, next_fresh) =
                                rename_rule(rule, state.fresh);
                            let Some(next_bindings) =
                                unify(&pattern, &consequent, &state.bindings)
                            else {
                                continue;
                            };
                            let applied = substitute(&consequent, &next_bindings);
                            let cycle_key = (rule.id.clone(), canonical_form(&applied));
                            if ancestors.contains(&cycle_key) {
                                cycle_pruned = Some(rule.id.clone());
                                continue;
                            }

                            let mut next = state.clone();
                            next.bindings = next_bindings;
                            next.fresh = next_fresh;
                            let mut chain = ancestors.clone();
                            chain.push(cycle_key);
                            next.goals.push(Frame::Conclude {
                                rule: rule.id.clone(),
                                domain: rule.domain.clone(),
                                consequent,
                                value: rule.consequent.value,
                                supports: antecedents
                                    .iter()
                                    .map(|l| l.statement.clone())
                                    .collect(),
                                toplevel,
                            });
                            for lit in antecedents.iter().rev() {
                                next.goals.push(Frame::Prove {
                                    pattern: lit.statement.clone(),
                                    expect: Some(lit.expect),
                                    budget: budget - 1,
                                    ancestors: chain.clone(),
                                    toplevel: false,
                                });
                            }
                            successors.push(next);
                        }
                    }

                    if successors.is_empty() {
                        if let Some(rule_id) = cycle_pruned {
                            cyclic.get_or_insert(rule_id);
                        } else if expect.is_some() {
                            unmet.get_or_insert(pattern);
                        } else {
                            no_rule.get_or_insert(pattern);
                        }
                        continue;
                    }
                    // Reverse so the first alternative is expanded
                    // first: proofs come out in stable search order.
                    for next in successors.into_iter().rev() {
                        work.push(next);
                    }
                }
            }
        }

        if outcomes.len() == 1 {
            let (conclusion, proof) = outcomes.remove(0);
            return ResolutionResult::Unique { conclusion, proof };
        }
        if outcomes.len() > 1 {
            return ResolutionResult::Ambiguous {
                candidates: outcomes,
            };
        }
        if !path_conflicts.is_empty() {
            return ResolutionResult::Contradiction {
                conflicts: path_conflicts,
            };
        }
        if truncated {
            return ResolutionResult::DepthExceeded;
        }
        let reason = if let Some(statement) = unmet {
            NoSolutionReason::UnmetAntecedent(statement)
        } else if let Some(rule_id) = cyclic {
            NoSolutionReason::CyclicDependency(rule_id)
        } else if let Some(statement) = no_rule {
            NoSolutionReason::NoApplicableRule(statement)
        } else {
            NoSolutionReason::NoApplicableRule(query.target.clone())
        };
        ResolutionResult::NoSolution { reason }
    }
}

fn provenance_source(provenance: &Provenance) -> SourceId {
    match provenance {
        Provenance::Asserted { source } => source.clone(),
        Provenance::Derived { rule, .. } => SourceId::new(rule.to_string()),
    }
}

/// Atoms bound to the query's own variables, for the conclusion.
fn query_bindings(target: &Statement, bindings: &Bindings) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for var in target.variables() {
        if let Term::Atom(atom) = walk(bindings, &Term::var(var)) {
            out.insert(var.to_string(), atom);
        }
    }
    out
}

/// Rename a rule's variables apart from everything already in flight.
fn rename_rule(rule: &Rule, fresh: u32) -> (Statement, Vec<Literal>, u32) {
    let map: BTreeMap<String, String> = rule
        .variables()
        .into_iter()
        .map(|v| {
            let renamed = format!("{v}__{fresh}");
            (v, renamed)
        })
        .collect();
    let rename = |statement: &Statement| Statement {
        predicate: statement.predicate.clone(),
        args: statement
            .args
            .iter()
            .map(|t| match t {
                Term::Var(v) => Term::var(map.get(v).cloned().unwrap_or_else(|| v.clone())),
                Term::Atom(a) => Term::atom(a.clone()),
            })
            .collect(),
    };
    let consequent = rename(&rule.consequent.statement);
    let antecedents = rule
        .antecedents
        .iter()
        .map(|lit| Literal {
            statement: rename(&lit.statement),
            expect: lit.expect,
        })
        .collect();
    (consequent, antecedents, fresh + 1)
}

/// Whether any in-scope rule could conclude the goal, used to
/// distinguish DepthExceeded from NoSolution once the budget is spent.
fn applicable_rule_exists(
    scope: &ScopedKb<'_>,
    pattern: &Statement,
    expect: Option<bool>,
    state: &SearchState,
) -> bool {
    scope.rules().any(|rule| {
        if expect.is_some_and(|e| rule.consequent.value != e) {
            return false;
        }
        let (consequent, _, _) = rename_rule(rule, state.fresh);
        unify(pattern, &consequent, &state.bindings).is_some()
    })
}
