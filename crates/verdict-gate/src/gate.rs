use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::audit::{AuditLog, CheckResult};
use crate::checks::{
    ConstitutionalContentCheck, ConstitutionalQuantitativeCheck, ContentCheck, FormatCheck,
    GateCheck, QuantitativeCheck,
};
use crate::policy::EffectivePolicy;

/// A reasoner-produced answer awaiting release.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateAnswer {
    /// Identity of the query this candidate answers.
    pub query: String,
    /// The rendered answer text, in the persona's output format.
    pub text: String,
}

/// One failed check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub check: String,
    pub detail: String,
}

/// The gate's overall verdict.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceVerdict {
    Accept,
    Reject { violations: Vec<Violation> },
}

impl GovernanceVerdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// The ordered check pipeline.
///
/// Constitutional checks run first and cannot be overridden by persona
/// configuration. Every check runs even after an earlier failure, so
/// the ledger records the complete picture for rejected candidates
/// too. The verdict is `Reject` if any check failed, and it is not
/// returned until every outcome has been appended to the ledger.
pub struct GovernanceGate {
    checks: Vec<Box<dyn GateCheck>>,
}

impl GovernanceGate {
    /// The standard pipeline: constitutional content and size checks,
    /// then the persona's format, content, and quantitative checks.
    pub fn new() -> Self {
        Self {
            checks: vec![
                Box::new(ConstitutionalContentCheck::new()),
                Box::new(ConstitutionalQuantitativeCheck),
                Box::new(FormatCheck),
                Box::new(ContentCheck::new()),
                Box::new(QuantitativeCheck),
            ],
        }
    }

    /// Evaluate a candidate against the effective policy.
    ///
    /// Appends one ledger entry per check plus a final verdict entry
    /// before returning.
    pub fn evaluate(
        &self,
        candidate: &CandidateAnswer,
        policy: &EffectivePolicy,
        audit: &mut AuditLog,
    ) -> GovernanceVerdict {
        let inputs = vec![
            format!("query:{}", candidate.query),
            format!("persona:{}", policy.persona_id),
        ];

        let mut violations: Vec<Violation> = Vec::new();
        for check in &self.checks {
            let outcome = check.evaluate(candidate, policy);
            let result = if outcome.passed {
                CheckResult::Pass
            } else {
                CheckResult::Fail
            };
            audit.append(check.name(), result, outcome.detail.clone(), inputs.clone());
            debug!(check = check.name(), passed = outcome.passed, "gate check evaluated");
            if !outcome.passed {
                violations.push(Violation {
                    check: check.name().to_string(),
                    detail: outcome.detail,
                });
            }
        }

        let verdict = if violations.is_empty() {
            audit.append(
                "governance.verdict",
                CheckResult::Pass,
                "candidate accepted",
                inputs,
            );
            GovernanceVerdict::Accept
        } else {
            warn!(
                query = %candidate.query,
                violations = violations.len(),
                "candidate rejected by governance gate"
            );
            audit.append(
                "governance.verdict",
                CheckResult::Fail,
                format!("candidate rejected: {} check(s) failed", violations.len()),
                inputs,
            );
            GovernanceVerdict::Reject { violations }
        };
        verdict
    }
}

impl Default for GovernanceGate {
    fn default() -> Self {
        Self::new()
    }
}
