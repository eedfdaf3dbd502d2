use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use verdict_gate::AuditLog;
use verdict_kb::KnowledgeBase;
use verdict_types::{Persona, SessionId};

use crate::state::SessionState;

/// One recorded state transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: SessionState,
    pub to: SessionState,
    pub at: DateTime<Utc>,
}

/// A live session: the current state, the active persona, the
/// immutable knowledge snapshot, and the accumulated audit ledger.
///
/// Created on persona load and destroyed (not reset) on persona
/// switch or termination. Only the controller mutates it.
#[derive(Clone, Debug)]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) state: SessionState,
    pub(crate) persona: Persona,
    pub(crate) knowledge: Arc<KnowledgeBase>,
    pub(crate) audit: AuditLog,
    pub(crate) transitions: Vec<TransitionRecord>,
}

impl Session {
    pub(crate) fn new(persona: Persona, knowledge: Arc<KnowledgeBase>) -> Self {
        let id = SessionId::new();
        Self {
            id: id.clone(),
            state: SessionState::Idle,
            persona,
            knowledge,
            audit: AuditLog::new(id),
            transitions: Vec::new(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// The append-only audit ledger, exposed for external inspection.
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// The full transition history, oldest first.
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }
}
