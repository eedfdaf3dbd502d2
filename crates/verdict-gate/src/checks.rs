use regex::Regex;

use crate::gate::CandidateAnswer;
use crate::policy::EffectivePolicy;
use verdict_types::OutputFormat;

/// Result of one gate check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckOutcome {
    pub passed: bool,
    pub detail: String,
}

impl CheckOutcome {
    pub fn pass(detail: impl Into<String>) -> Self {
        Self {
            passed: true,
            detail: detail.into(),
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            passed: false,
            detail: detail.into(),
        }
    }
}

/// One stage of the governance pipeline.
///
/// Checks are pure: they read the candidate and the policy and produce
/// an outcome. They never mutate state and never perform I/O, so the
/// same candidate always receives the same verdict.
pub trait GateCheck: Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, candidate: &CandidateAnswer, policy: &EffectivePolicy) -> CheckOutcome;
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("static pattern compiles"))
        .collect()
}

fn first_match<'a>(patterns: &'a [Regex], text: &str) -> Option<&'a Regex> {
    patterns.iter().find(|p| p.is_match(text))
}

/// Approximate token count: one token per four characters.
fn approx_tokens(text: &str) -> u32 {
    (text.chars().count() / 4) as u32
}

// ── Constitutional checks ────────────────────────────────────────

/// PII detection. Constitutional: runs for every persona and cannot be
/// switched off.
pub struct ConstitutionalContentCheck {
    pii: Vec<Regex>,
}

impl ConstitutionalContentCheck {
    pub fn new() -> Self {
        Self {
            pii: compile(&[
                r"\b\d{3}-\d{2}-\d{4}\b",                                  // SSN
                r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",     // email
                r"\b\d{16}\b",                                             // card number
                r"\b\d{3}[-.\s]?\d{3}[-.\s]?\d{4}\b",                      // phone
            ]),
        }
    }
}

impl Default for ConstitutionalContentCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl GateCheck for ConstitutionalContentCheck {
    fn name(&self) -> &'static str {
        "constitution.content"
    }

    fn evaluate(&self, candidate: &CandidateAnswer, _policy: &EffectivePolicy) -> CheckOutcome {
        match first_match(&self.pii, &candidate.text) {
            Some(_) => CheckOutcome::fail(
                "content check: candidate matches a personally identifiable information pattern",
            ),
            None => CheckOutcome::pass("no PII patterns detected"),
        }
    }
}

/// Hard size ceiling from the constitution. A persona can only lower
/// the limit, never raise it past this.
pub struct ConstitutionalQuantitativeCheck;

impl GateCheck for ConstitutionalQuantitativeCheck {
    fn name(&self) -> &'static str {
        "constitution.quantitative"
    }

    fn evaluate(&self, candidate: &CandidateAnswer, policy: &EffectivePolicy) -> CheckOutcome {
        let tokens = approx_tokens(&candidate.text);
        let ceiling = policy.constitution.max_response_tokens;
        if tokens > ceiling {
            CheckOutcome::fail(format!(
                "quantitative check: length {tokens} tokens exceeds constitutional ceiling {ceiling}"
            ))
        } else {
            CheckOutcome::pass(format!("within constitutional ceiling ({tokens}/{ceiling})"))
        }
    }
}

// ── Persona checks ───────────────────────────────────────────────

/// The candidate conforms to the persona's required output format.
pub struct FormatCheck;

impl GateCheck for FormatCheck {
    fn name(&self) -> &'static str {
        "persona.format"
    }

    fn evaluate(&self, candidate: &CandidateAnswer, policy: &EffectivePolicy) -> CheckOutcome {
        match policy.persona.output_format {
            OutputFormat::PlainText => CheckOutcome::pass("format 'text/plain' accepted"),
            OutputFormat::Json => match serde_json::from_str::<serde_json::Value>(&candidate.text)
            {
                Ok(_) => CheckOutcome::pass("JSON format validated"),
                Err(e) => {
                    CheckOutcome::fail(format!("format check: candidate is not valid JSON: {e}"))
                }
            },
        }
    }
}

/// Persona-selected content guardrails plus disallowed action
/// descriptors.
pub struct ContentCheck {
    pii: Vec<Regex>,
    financial: Vec<Regex>,
    medical: Vec<Regex>,
    legal: Vec<Regex>,
}

impl ContentCheck {
    pub fn new() -> Self {
        Self {
            pii: compile(&[
                r"\b\d{3}-\d{2}-\d{4}\b",
                r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
                r"\b\d{16}\b",
            ]),
            financial: compile(&[
                r"(?i)\byou should (buy|sell|invest|trade)\b",
                r"(?i)\bi recommend (buying|selling|investing)\b",
                r"(?i)\bguaranteed (return|profit|gain)\b",
            ]),
            medical: compile(&[
                r"(?i)\byou should take\b",
                r"(?i)\bprescribe\b",
                r"(?i)\bdiagnosis is\b",
                r"(?i)\byou have (a |an )?(disease|condition|disorder)\b",
            ]),
            legal: compile(&[
                r"(?i)\byou should (sue|file|plead|sign)\b",
                r"(?i)\byou are (liable|guilty|innocent)\b",
                r"(?i)\bi advise you (legally|to sign|to file)\b",
            ]),
        }
    }
}

impl Default for ContentCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl GateCheck for ContentCheck {
    fn name(&self) -> &'static str {
        "persona.content"
    }

    fn evaluate(&self, candidate: &CandidateAnswer, policy: &EffectivePolicy) -> CheckOutcome {
        let guardrails = policy.persona.guardrails;
        let categories: [(&str, bool, &[Regex]); 4] = [
            ("PII", guardrails.no_pii, &self.pii),
            ("financial advice", guardrails.no_financial_advice, &self.financial),
            ("medical advice", guardrails.no_medical_advice, &self.medical),
            ("legal advice", guardrails.no_legal_advice, &self.legal),
        ];

        for (label, enabled, patterns) in categories {
            if enabled && first_match(patterns, &candidate.text).is_some() {
                return CheckOutcome::fail(format!(
                    "content check: candidate matches disallowed category '{label}'"
                ));
            }
        }

        for action in &policy.persona.disallowed_actions {
            if candidate.text.contains(action.as_str()) {
                return CheckOutcome::fail(format!(
                    "content check: candidate references disallowed action '{action}'"
                ));
            }
        }

        CheckOutcome::pass("no disallowed patterns detected")
    }
}

/// The candidate respects the persona's declared size bound.
pub struct QuantitativeCheck;

impl GateCheck for QuantitativeCheck {
    fn name(&self) -> &'static str {
        "persona.quantitative"
    }

    fn evaluate(&self, candidate: &CandidateAnswer, policy: &EffectivePolicy) -> CheckOutcome {
        let tokens = approx_tokens(&candidate.text);
        let limit = policy.effective_token_limit();
        if tokens > limit {
            CheckOutcome::fail(format!(
                "quantitative check: length {tokens} tokens exceeds limit {limit}"
            ))
        } else {
            CheckOutcome::pass(format!("token count within limit ({tokens}/{limit})"))
        }
    }
}
