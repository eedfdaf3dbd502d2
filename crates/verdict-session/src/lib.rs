//! Session Controller for Verdict
//!
//! Drives a session through an ordered sequence of states so that no
//! step is skipped and no output escapes unchecked:
//!
//! ```text
//! IDLE → LOAD_PERSONA → VALIDATE_INPUT → INFERENCE → GOVERNANCE_CHECK → OUTPUT
//!                                                                        ↓
//!                                                                      HALT
//! ```
//!
//! `HALT` is reachable from every non-terminal state and is terminal
//! for the session: a new session or persona load is required to
//! continue. Every transition into `HALT` carries a structured cause
//! and writes exactly one terminal audit entry before the session
//! becomes inert.
//!
//! The controller is the only component that mutates session state.
//! The reasoner and the governance gate are stateless with respect to
//! the machine: one session progresses strictly sequentially, and each
//! session reasons over its own immutable knowledge base snapshot.

#![deny(unsafe_code)]

mod controller;
mod error;
mod mocks;
mod session;
mod state;
mod traits;

pub use controller::{Answer, HaltReport, QueryOutcome, SessionController};
pub use error::SessionError;
pub use mocks::StaticPersonaSource;
pub use session::{Session, TransitionRecord};
pub use state::{HaltCause, SessionState};
pub use traits::{PersonaSource, PersonaSourceError, SessionSeed};
