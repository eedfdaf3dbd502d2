use serde::{Deserialize, Serialize};
use verdict_types::{DomainId, GovernancePolicy, Guardrails, OutputFormat, Persona};

use crate::loader::PersonaError;

pub const SUPPORTED_SCHEMA_VERSION: &str = "1.0";

/// The on-disk persona schema, version 1.0.
///
/// Every section is closed: a document with fields outside this schema
/// fails to parse.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersonaDocument {
    pub schema_version: String,
    pub persona_id: String,
    pub identity: IdentitySection,
    pub knowledge: KnowledgeSection,
    pub skills: SkillsSection,
    pub constraints: ConstraintsSection,
    pub evolution: EvolutionSection,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IdentitySection {
    pub name: String,
    pub archetype: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub voice: Option<VoiceSection>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VoiceSection {
    pub tone: String,
    pub formality: u8,
    pub style: String,
    #[serde(default)]
    pub avoid: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KnowledgeSection {
    pub domains: Vec<String>,
    #[serde(default)]
    pub access_level: Option<String>,
    #[serde(default)]
    pub allow_inference: bool,
    #[serde(default = "default_inference_depth")]
    pub inference_depth: u32,
}

fn default_inference_depth() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SkillsSection {
    pub enabled: Vec<String>,
    #[serde(default)]
    pub disabled: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConstraintsSection {
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default = "default_max_tokens")]
    pub max_response_tokens: u32,
    #[serde(default)]
    pub disallowed_actions: Vec<String>,
    #[serde(default)]
    pub ethical_guardrails: GuardrailsSection,
}

fn default_max_tokens() -> u32 {
    2048
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GuardrailsSection {
    #[serde(default, rename = "noPII")]
    pub no_pii: bool,
    #[serde(default)]
    pub no_financial_advice: bool,
    #[serde(default)]
    pub no_medical_advice: bool,
    #[serde(default)]
    pub no_legal_advice: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EvolutionSection {
    pub enabled: bool,
}

impl PersonaDocument {
    /// Validate and convert into the runtime persona.
    pub fn into_persona(self) -> Result<Persona, PersonaError> {
        if self.schema_version != SUPPORTED_SCHEMA_VERSION {
            return Err(PersonaError::UnsupportedSchemaVersion(self.schema_version));
        }
        Ok(Persona {
            id: self.persona_id,
            name: self.identity.name,
            archetype: self.identity.archetype,
            domains: self.knowledge.domains.into_iter().map(DomainId::new).collect(),
            allow_inference: self.knowledge.allow_inference,
            inference_depth: self.knowledge.inference_depth,
            skills_enabled: self.skills.enabled,
            skills_disabled: self.skills.disabled,
            policy: GovernancePolicy {
                output_format: self.constraints.output_format,
                max_response_tokens: self.constraints.max_response_tokens,
                disallowed_actions: self.constraints.disallowed_actions,
                guardrails: Guardrails {
                    no_pii: self.constraints.ethical_guardrails.no_pii,
                    no_financial_advice: self.constraints.ethical_guardrails.no_financial_advice,
                    no_medical_advice: self.constraints.ethical_guardrails.no_medical_advice,
                    no_legal_advice: self.constraints.ethical_guardrails.no_legal_advice,
                },
            },
            evolution_enabled: self.evolution.enabled,
        })
    }
}
