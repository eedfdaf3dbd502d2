use serde::{Deserialize, Serialize};

use crate::DomainId;

/// Required output format for released answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    #[serde(rename = "text/plain")]
    PlainText,
    #[serde(rename = "application/json")]
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::PlainText
    }
}

/// Content guardrail categories a persona can switch on.
///
/// Each category is a deterministic pattern set evaluated by the
/// governance gate. PII detection is additionally enforced by the
/// constitution regardless of these flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardrails {
    #[serde(default)]
    pub no_pii: bool,
    #[serde(default)]
    pub no_financial_advice: bool,
    #[serde(default)]
    pub no_medical_advice: bool,
    #[serde(default)]
    pub no_legal_advice: bool,
}

/// Governance constraints a candidate answer is validated against
/// before release.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernancePolicy {
    pub output_format: OutputFormat,
    pub max_response_tokens: u32,
    pub disallowed_actions: Vec<String>,
    pub guardrails: Guardrails,
}

impl Default for GovernancePolicy {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::PlainText,
            max_response_tokens: 4096,
            disallowed_actions: Vec::new(),
            guardrails: Guardrails {
                no_pii: true,
                ..Guardrails::default()
            },
        }
    }
}

/// The session-scoped behavioral configuration.
///
/// Immutable for the lifetime of a session. Replacing the persona ends
/// the current session and starts a new one; nothing is carried over.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub archetype: String,
    /// Knowledge domains this persona may reason over.
    pub domains: Vec<DomainId>,
    /// When false, resolution is restricted to direct fact lookup.
    pub allow_inference: bool,
    /// Maximum chained rule applications per query.
    pub inference_depth: u32,
    pub skills_enabled: Vec<String>,
    pub skills_disabled: Vec<String>,
    pub policy: GovernancePolicy,
    pub evolution_enabled: bool,
}

impl Persona {
    /// Effective depth budget for the reasoner.
    pub fn max_depth(&self) -> u32 {
        if self.allow_inference {
            self.inference_depth
        } else {
            0
        }
    }

    /// A skill is permitted when enabled and not explicitly disabled.
    pub fn skill_permitted(&self, skill: &str) -> bool {
        !self.skills_disabled.iter().any(|s| s == skill)
            && self.skills_enabled.iter().any(|s| s == skill)
    }

    pub fn action_permitted(&self, action: &str) -> bool {
        !self.policy.disallowed_actions.iter().any(|a| a == action)
    }
}

/// The process-wide policy layer.
///
/// Loaded once per process and merged into every persona's governance
/// policy. Constitutional constraints always win when they conflict
/// with persona configuration: the gate evaluates them first, and no
/// persona setting can disable them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constitution {
    pub text: String,
    /// Hard ceiling on answer size. A persona may set a lower limit,
    /// never a higher one.
    pub max_response_tokens: u32,
}

impl Constitution {
    pub const DEFAULT_TOKEN_CEILING: u32 = 16384;

    /// The built-in constitution used when no document is supplied.
    pub fn builtin() -> Self {
        Self {
            text: "CONSTITUTION\n\
                   1. Primacy of Human Control: the engine defers to the human operator.\n\
                   2. Truthful Communication: the engine states only verifiable facts.\n\
                   3. Deterministic Execution: the engine halts on ambiguity.\n\
                   4. Operational Transparency: all decisions are logged and auditable.\n"
                .to_string(),
            max_response_tokens: Self::DEFAULT_TOKEN_CEILING,
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_response_tokens: Self::DEFAULT_TOKEN_CEILING,
        }
    }
}
