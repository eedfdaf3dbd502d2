use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use verdict_kb::{load_domain_dir, KnowledgeBase};
use verdict_session::{PersonaSource, PersonaSourceError, SessionSeed};

use crate::loader::{PersonaError, PersonaLoader};

/// The filesystem-backed persona source: persona documents in one
/// directory, binarized knowledge domains in another.
///
/// Loading a persona also snapshots the knowledge base for exactly its
/// permitted domains; the session owns that snapshot immutably for its
/// whole lifetime.
pub struct FileSystemSource {
    loader: PersonaLoader,
    knowledge_dir: PathBuf,
}

impl FileSystemSource {
    pub fn new(loader: PersonaLoader, knowledge_dir: impl Into<PathBuf>) -> Self {
        Self {
            loader,
            knowledge_dir: knowledge_dir.into(),
        }
    }

    pub fn loader(&self) -> &PersonaLoader {
        &self.loader
    }
}

impl PersonaSource for FileSystemSource {
    fn load(&self, persona_id: &str) -> Result<SessionSeed, PersonaSourceError> {
        let persona = match self.loader.load(persona_id) {
            Ok(persona) => persona,
            // the default persona always exists, file or not
            Err(PersonaError::NotFound(_)) if persona_id == "default" => {
                info!("no default.json found; using built-in default persona");
                PersonaLoader::fallback_persona()
            }
            Err(PersonaError::NotFound(_)) => {
                return Err(PersonaSourceError::NotFound(persona_id.to_string()));
            }
            Err(err) => return Err(PersonaSourceError::Invalid(err.to_string())),
        };

        let knowledge: KnowledgeBase = load_domain_dir(&self.knowledge_dir, &persona.domains)
            .map_err(|err| PersonaSourceError::Invalid(err.to_string()))?;

        info!(
            persona = %persona.id,
            facts = knowledge.fact_count(),
            rules = knowledge.rule_count(),
            "knowledge snapshot taken for session"
        );

        Ok(SessionSeed {
            persona,
            knowledge: Arc::new(knowledge),
        })
    }

    fn list(&self) -> Vec<String> {
        let mut ids = self.loader.list_available();
        if !ids.iter().any(|id| id == "default") {
            ids.push("default".to_string());
            ids.sort();
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const ANALYST: &str = r#"{
        "schemaVersion": "1.0",
        "personaId": "analyst",
        "identity": {"name": "Athena", "archetype": "Analyst"},
        "knowledge": {"domains": ["finance"], "allowInference": true, "inferenceDepth": 3},
        "skills": {"enabled": ["data_query"]},
        "constraints": {"maxResponseTokens": 4096},
        "evolution": {"enabled": false}
    }"#;

    const FINANCE: &str = r#"{
        "domain": "finance",
        "facts": [
            {"statement": "listed(acme)", "value": true, "source": "exchange"}
        ],
        "rules": []
    }"#;

    fn setup(dir: &Path) -> FileSystemSource {
        let personas = dir.join("personas");
        let knowledge = dir.join("knowledge");
        std::fs::create_dir_all(&personas).unwrap();
        std::fs::create_dir_all(&knowledge).unwrap();
        std::fs::write(personas.join("analyst.json"), ANALYST).unwrap();
        std::fs::write(knowledge.join("finance.json"), FINANCE).unwrap();
        FileSystemSource::new(PersonaLoader::new(personas, None), knowledge)
    }

    #[test]
    fn load_persona_with_knowledge_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let source = setup(dir.path());

        let seed = source.load("analyst").unwrap();
        assert_eq!(seed.persona.id, "analyst");
        assert_eq!(seed.knowledge.fact_count(), 1);
    }

    #[test]
    fn default_persona_always_loads() {
        let dir = tempfile::tempdir().unwrap();
        let source = setup(dir.path());

        let seed = source.load("default").unwrap();
        assert_eq!(seed.persona.id, "default");
    }

    #[test]
    fn unknown_persona_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = setup(dir.path());

        assert!(matches!(
            source.load("ghost"),
            Err(PersonaSourceError::NotFound(_))
        ));
    }

    #[test]
    fn corrupt_domain_file_is_a_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = setup(dir.path());
        std::fs::write(dir.path().join("knowledge/finance.json"), "{broken").unwrap();

        assert!(matches!(
            source.load("analyst"),
            Err(PersonaSourceError::Invalid(_))
        ));
    }

    #[test]
    fn list_includes_builtin_default() {
        let dir = tempfile::tempdir().unwrap();
        let source = setup(dir.path());

        let ids = source.list();
        assert!(ids.contains(&"analyst".to_string()));
        assert!(ids.contains(&"default".to_string()));
    }
}
