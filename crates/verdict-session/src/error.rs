use thiserror::Error;

use crate::state::SessionState;
use crate::traits::PersonaSourceError;

/// Errors from the session controller.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no active session: load a persona first")]
    NoActiveSession,

    #[error("session is halted: a new session or persona load is required")]
    SessionHalted,

    #[error("unknown persona: '{0}'")]
    UnknownPersona(String),

    #[error("persona load failed: {0}")]
    PersonaLoadFailed(#[source] PersonaSourceError),

    #[error("illegal state transition: {from} -> {to}")]
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },
}
