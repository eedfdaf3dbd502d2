use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use verdict_gate::{CandidateAnswer, CheckResult, EffectivePolicy, GovernanceGate, GovernanceVerdict};
use verdict_reasoner::{Conclusion, Proof, ResolutionResult, Resolver};
use verdict_types::{Constitution, OutputFormat, Persona, Query, SessionId, Statement};

use crate::error::SessionError;
use crate::session::{Session, TransitionRecord};
use crate::state::{HaltCause, SessionState};
use crate::traits::{PersonaSource, PersonaSourceError};

/// Inputs longer than this are rejected during validation.
const MAX_INPUT_CHARS: usize = 10_000;

/// The skill a persona must have enabled to submit queries at all.
const QUERY_SKILL: &str = "data_query";

/// A released answer. Only constructed after the governance gate has
/// accepted the candidate; the proof always travels with it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub conclusion: Conclusion,
    pub proof: Proof,
}

/// The structured cause delivered when a session halts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaltReport {
    pub session: SessionId,
    pub cause: HaltCause,
    pub detail: String,
}

/// What a query produced: an answer with its proof, or a halt with its
/// cause. Nothing in between.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum QueryOutcome {
    Answer(Answer),
    Halted(HaltReport),
}

impl QueryOutcome {
    pub fn is_answer(&self) -> bool {
        matches!(self, Self::Answer(_))
    }
}

/// The finite state machine controller.
///
/// Owns the active session and is the only component that mutates it.
/// Sequencing is strict: validate, infer, gate, output. A failure at
/// any stage transitions to `Halt` with a structured cause and exactly
/// one terminal audit entry.
pub struct SessionController<S: PersonaSource> {
    source: S,
    constitution: Constitution,
    resolver: Resolver,
    gate: GovernanceGate,
    session: Option<Session>,
}

impl<S: PersonaSource> SessionController<S> {
    pub fn new(source: S, constitution: Constitution) -> Self {
        Self {
            source,
            constitution,
            resolver: Resolver::new(),
            gate: GovernanceGate::new(),
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn state(&self) -> Option<SessionState> {
        self.session.as_ref().map(|s| s.state)
    }

    pub fn available_personas(&self) -> Vec<String> {
        self.source.list()
    }

    /// Load a persona and start a fresh session for it.
    ///
    /// The current session, if any, is destroyed, not reset. An
    /// unknown persona id fails the transition guard and leaves the
    /// current session untouched; a persona that exists but fails
    /// validation is a load failure and halts it.
    pub fn switch_persona(&mut self, persona_id: &str) -> Result<&Session, SessionError> {
        match self.source.load(persona_id) {
            Ok(seed) => {
                if let Some(old) = self.session.take() {
                    info!(session = %old.id, "session destroyed on persona switch");
                }
                let mut session = Session::new(seed.persona, seed.knowledge);
                Self::transition(&mut session, SessionState::LoadPersona)?;
                Self::transition(&mut session, SessionState::Idle)?;
                info!(
                    session = %session.id,
                    persona = %session.persona.id,
                    domains = session.persona.domains.len(),
                    "session started"
                );
                Ok(self.session.insert(session))
            }
            Err(PersonaSourceError::NotFound(id)) => Err(SessionError::UnknownPersona(id)),
            Err(err) => {
                if let Some(session) = self.session.as_mut() {
                    if !session.state.is_terminal() {
                        Self::transition(session, SessionState::LoadPersona)?;
                        Self::halt(session, HaltCause::LoadFailure, err.to_string())?;
                    }
                }
                Err(SessionError::PersonaLoadFailed(err))
            }
        }
    }

    /// Process one query through the full pipeline.
    pub fn handle_query(&mut self, input: &str) -> Result<QueryOutcome, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        if session.state.is_terminal() {
            return Err(SessionError::SessionHalted);
        }

        Self::transition(session, SessionState::ValidateInput)?;
        let target = match Self::validate_input(session, input) {
            Ok(target) => target,
            Err(detail) => {
                let report = Self::halt(session, HaltCause::ConstraintViolation, detail)?;
                return Ok(QueryOutcome::Halted(report));
            }
        };

        Self::transition(session, SessionState::Inference)?;
        let query = Query::new(target.clone(), session.persona.max_depth());
        let result = {
            let knowledge = Arc::clone(&session.knowledge);
            let scope = knowledge.scoped(&session.persona.domains);
            self.resolver.resolve(&query, &scope)
        };
        debug!(session = %session.id, query = %query, result = result.label(), "inference complete");

        match result {
            ResolutionResult::Unique { conclusion, proof } => {
                Self::transition(session, SessionState::GovernanceCheck)?;
                let text = render_answer(&session.persona, &target, &conclusion);
                let candidate = CandidateAnswer {
                    query: target.identity(),
                    text: text.clone(),
                };
                let policy = EffectivePolicy::merge(&session.persona, &self.constitution);
                match self.gate.evaluate(&candidate, &policy, &mut session.audit) {
                    GovernanceVerdict::Accept => {
                        Self::transition(session, SessionState::Output)?;
                        info!(session = %session.id, query = %candidate.query, "answer released");
                        Self::transition(session, SessionState::Idle)?;
                        Ok(QueryOutcome::Answer(Answer {
                            text,
                            conclusion,
                            proof,
                        }))
                    }
                    GovernanceVerdict::Reject { violations } => {
                        let detail = violations
                            .iter()
                            .map(|v| format!("{}: {}", v.check, v.detail))
                            .collect::<Vec<_>>()
                            .join("; ");
                        let report =
                            Self::halt(session, HaltCause::GovernanceRejection, detail)?;
                        Ok(QueryOutcome::Halted(report))
                    }
                }
            }
            ResolutionResult::NoSolution { reason } => {
                let report = Self::halt(session, HaltCause::NoSolution, reason.to_string())?;
                Ok(QueryOutcome::Halted(report))
            }
            ResolutionResult::Ambiguous { candidates } => {
                let outcomes = candidates
                    .iter()
                    .map(|(c, _)| c.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                let detail = format!(
                    "{} conflicting derivations: {outcomes}",
                    candidates.len()
                );
                let report = Self::halt(session, HaltCause::Ambiguity, detail)?;
                Ok(QueryOutcome::Halted(report))
            }
            ResolutionResult::Contradiction { conflicts } => {
                let pairs = conflicts
                    .iter()
                    .map(|(a, b)| format!("{} vs {}", a.signed_identity(), b.signed_identity()))
                    .collect::<Vec<_>>()
                    .join("; ");
                let report = Self::halt(session, HaltCause::Contradiction, pairs)?;
                Ok(QueryOutcome::Halted(report))
            }
            ResolutionResult::DepthExceeded => {
                let detail = format!(
                    "derivation requires more than {} chained rule applications",
                    session.persona.max_depth()
                );
                let report = Self::halt(session, HaltCause::DepthExceeded, detail)?;
                Ok(QueryOutcome::Halted(report))
            }
        }
    }

    // ── Internal helpers ─────────────────────────────────────────────

    fn validate_input(session: &Session, input: &str) -> Result<Statement, String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err("empty input: no query was provided".to_string());
        }
        if input.chars().count() > MAX_INPUT_CHARS {
            return Err(format!(
                "input exceeds maximum permitted length of {MAX_INPUT_CHARS} characters"
            ));
        }
        if !session.persona.skill_permitted(QUERY_SKILL) {
            return Err(format!(
                "skill '{QUERY_SKILL}' is not enabled for persona '{}'",
                session.persona.id
            ));
        }
        Statement::from_str(trimmed).map_err(|e| format!("malformed query: {e}"))
    }

    fn transition(session: &mut Session, to: SessionState) -> Result<(), SessionError> {
        let from = session.state;
        if !from.may_transition(to) {
            return Err(SessionError::InvalidTransition { from, to });
        }
        session.transitions.push(TransitionRecord {
            from,
            to,
            at: Utc::now(),
        });
        session.state = to;
        debug!(session = %session.id, %from, %to, "state transition");
        Ok(())
    }

    /// Transition into `Halt` and write the single terminal audit
    /// entry. The session is inert afterwards.
    fn halt(
        session: &mut Session,
        cause: HaltCause,
        detail: String,
    ) -> Result<HaltReport, SessionError> {
        Self::transition(session, SessionState::Halt)?;
        session.audit.append(
            "session.halt",
            CheckResult::Fail,
            format!("{cause}: {detail}"),
            vec![format!("session:{}", session.id)],
        );
        warn!(session = %session.id, %cause, "session halted");
        Ok(HaltReport {
            session: session.id.clone(),
            cause,
            detail,
        })
    }
}

/// Render the conclusion in the persona's required output format.
fn render_answer(persona: &Persona, target: &Statement, conclusion: &Conclusion) -> String {
    match persona.policy.output_format {
        OutputFormat::PlainText => conclusion.to_string(),
        OutputFormat::Json => {
            let value = serde_json::json!({
                "query": target.to_string(),
                "statement": conclusion.statement.to_string(),
                "value": conclusion.value,
                "bindings": conclusion.bindings,
                "status": "resolved",
            });
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| conclusion.to_string())
        }
    }
}
