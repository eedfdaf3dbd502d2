use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};
use verdict_types::{Constitution, DomainId, GovernancePolicy, Guardrails, Persona};

use crate::document::PersonaDocument;

/// Errors from loading a persona document.
#[derive(Error, Debug)]
pub enum PersonaError {
    #[error("persona file not found: {0}")]
    NotFound(PathBuf),

    #[error("cannot read persona file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid persona document '{path}': {source}")]
    Invalid {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unsupported schemaVersion: {0}")]
    UnsupportedSchemaVersion(String),
}

/// Loads persona documents from a directory, together with the
/// process-wide constitution.
#[derive(Clone, Debug)]
pub struct PersonaLoader {
    personas_dir: PathBuf,
    constitution: Constitution,
}

impl PersonaLoader {
    /// `constitution_path` falls back to the built-in constitution
    /// when absent or unreadable.
    pub fn new(personas_dir: impl Into<PathBuf>, constitution_path: Option<&Path>) -> Self {
        let constitution = match constitution_path {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(text) => {
                    info!(path = %path.display(), "constitution loaded");
                    Constitution::from_text(text)
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "constitution unreadable; using built-in");
                    Constitution::builtin()
                }
            },
            None => Constitution::builtin(),
        };
        Self {
            personas_dir: personas_dir.into(),
            constitution,
        }
    }

    pub fn constitution(&self) -> &Constitution {
        &self.constitution
    }

    /// Load and validate `<personas_dir>/<id>.json`.
    pub fn load(&self, persona_id: &str) -> Result<Persona, PersonaError> {
        let path = self.personas_dir.join(format!("{persona_id}.json"));
        if !path.exists() {
            return Err(PersonaError::NotFound(path));
        }
        let text = std::fs::read_to_string(&path).map_err(|source| PersonaError::Io {
            path: path.clone(),
            source,
        })?;
        let document: PersonaDocument =
            serde_json::from_str(&text).map_err(|source| PersonaError::Invalid {
                path: path.clone(),
                source,
            })?;
        let persona = document.into_persona()?;
        info!(persona = %persona.id, path = %path.display(), "persona loaded");
        Ok(persona)
    }

    /// Ids of every persona document in the directory, sorted.
    pub fn list_available(&self) -> Vec<String> {
        let mut ids: Vec<String> = std::fs::read_dir(&self.personas_dir)
            .into_iter()
            .flatten()
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                name.strip_suffix(".json").map(str::to_string)
            })
            .collect();
        ids.sort();
        ids
    }

    /// The minimal built-in persona used when no `default.json` exists.
    pub fn fallback_persona() -> Persona {
        Persona {
            id: "default".into(),
            name: "Verdict".into(),
            archetype: "General Assistant".into(),
            domains: vec![DomainId::new("general")],
            allow_inference: true,
            inference_depth: 3,
            skills_enabled: vec!["data_query".into(), "report_generation".into()],
            skills_disabled: vec![],
            policy: GovernancePolicy {
                guardrails: Guardrails {
                    no_pii: true,
                    ..Guardrails::default()
                },
                ..GovernancePolicy::default()
            },
            evolution_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_persona(dir: &Path, id: &str, body: &str) {
        let mut f = std::fs::File::create(dir.join(format!("{id}.json"))).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }

    const MINIMAL: &str = r#"{
        "schemaVersion": "1.0",
        "personaId": "minimal",
        "identity": {"name": "Min", "archetype": "Test"},
        "knowledge": {"domains": ["general"], "allowInference": true, "inferenceDepth": 2},
        "skills": {"enabled": ["data_query"]},
        "constraints": {},
        "evolution": {"enabled": false}
    }"#;

    #[test]
    fn load_minimal_persona() {
        let dir = tempfile::tempdir().unwrap();
        write_persona(dir.path(), "minimal", MINIMAL);

        let loader = PersonaLoader::new(dir.path(), None);
        let persona = loader.load("minimal").unwrap();
        assert_eq!(persona.id, "minimal");
        assert_eq!(persona.policy.max_response_tokens, 2048);
        assert_eq!(persona.max_depth(), 2);
    }

    #[test]
    fn missing_persona_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let loader = PersonaLoader::new(dir.path(), None);
        assert!(matches!(
            loader.load("ghost"),
            Err(PersonaError::NotFound(_))
        ));
    }

    #[test]
    fn invalid_json_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        write_persona(dir.path(), "broken", "{not json");

        let loader = PersonaLoader::new(dir.path(), None);
        assert!(matches!(
            loader.load("broken"),
            Err(PersonaError::Invalid { .. })
        ));
    }

    #[test]
    fn list_available_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write_persona(dir.path(), "zeta", MINIMAL);
        write_persona(dir.path(), "alpha", MINIMAL);

        let loader = PersonaLoader::new(dir.path(), None);
        assert_eq!(loader.list_available(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn constitution_from_file_overrides_builtin_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("constitution.md");
        std::fs::write(&path, "LOCAL CONSTITUTION\n").unwrap();

        let loader = PersonaLoader::new(dir.path(), Some(&path));
        assert!(loader.constitution().text.starts_with("LOCAL CONSTITUTION"));
        // the token ceiling is fixed, not file-configurable
        assert_eq!(
            loader.constitution().max_response_tokens,
            Constitution::DEFAULT_TOKEN_CEILING
        );
    }

    #[test]
    fn missing_constitution_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let loader = PersonaLoader::new(dir.path(), Some(&dir.path().join("nope.md")));
        assert!(loader.constitution().text.contains("Deterministic Execution"));
    }
}
