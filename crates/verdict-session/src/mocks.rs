//! In-memory persona source for tests and examples.

use std::collections::BTreeMap;
use std::sync::Arc;

use verdict_kb::KnowledgeBase;
use verdict_types::Persona;

use crate::traits::{PersonaSource, PersonaSourceError, SessionSeed};

/// A fixed map of personas to knowledge snapshots.
#[derive(Clone, Debug, Default)]
pub struct StaticPersonaSource {
    seeds: BTreeMap<String, SessionSeed>,
    invalid: Vec<String>,
}

impl StaticPersonaSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_persona(mut self, persona: Persona, knowledge: KnowledgeBase) -> Self {
        self.seeds.insert(
            persona.id.clone(),
            SessionSeed {
                persona,
                knowledge: Arc::new(knowledge),
            },
        );
        self
    }

    /// Register an id that exists but fails validation at load time.
    pub fn with_invalid(mut self, persona_id: impl Into<String>) -> Self {
        self.invalid.push(persona_id.into());
        self
    }
}

impl PersonaSource for StaticPersonaSource {
    fn load(&self, persona_id: &str) -> Result<SessionSeed, PersonaSourceError> {
        if self.invalid.iter().any(|id| id == persona_id) {
            return Err(PersonaSourceError::Invalid(format!(
                "persona '{persona_id}' fails schema validation"
            )));
        }
        self.seeds
            .get(persona_id)
            .cloned()
            .ok_or_else(|| PersonaSourceError::NotFound(persona_id.to_string()))
    }

    fn list(&self) -> Vec<String> {
        self.seeds.keys().cloned().collect()
    }
}
