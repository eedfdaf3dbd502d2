use std::sync::Arc;

use thiserror::Error;
use verdict_kb::KnowledgeBase;
use verdict_types::Persona;

/// Everything a new session needs: the validated persona and the
/// immutable knowledge base snapshot for its permitted domains.
#[derive(Clone, Debug)]
pub struct SessionSeed {
    pub persona: Persona,
    pub knowledge: Arc<KnowledgeBase>,
}

/// Errors a persona source can report.
///
/// `NotFound` fails the transition guard and leaves the current
/// session untouched; `Invalid` is a load failure and halts it.
#[derive(Error, Debug)]
pub enum PersonaSourceError {
    #[error("persona not found: '{0}'")]
    NotFound(String),

    #[error("persona invalid: {0}")]
    Invalid(String),
}

/// Supplies validated personas and their knowledge snapshots.
///
/// Implemented by the filesystem loader; tests use
/// [`crate::StaticPersonaSource`].
pub trait PersonaSource {
    fn load(&self, persona_id: &str) -> Result<SessionSeed, PersonaSourceError>;

    /// Persona ids this source can load, for discovery surfaces.
    fn list(&self) -> Vec<String>;
}
