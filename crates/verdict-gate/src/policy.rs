use verdict_types::{Constitution, GovernancePolicy, Persona};

/// The policy a candidate is actually judged against: the persona's
/// governance constraints plus the constitutional layer.
///
/// Constitutional constraints always take precedence. The gate runs
/// constitutional checks first, and a persona can only tighten the
/// constitutional token ceiling, never raise it.
#[derive(Clone, Debug)]
pub struct EffectivePolicy {
    pub persona_id: String,
    pub persona: GovernancePolicy,
    pub constitution: Constitution,
}

impl EffectivePolicy {
    pub fn merge(persona: &Persona, constitution: &Constitution) -> Self {
        Self {
            persona_id: persona.id.clone(),
            persona: persona.policy.clone(),
            constitution: constitution.clone(),
        }
    }

    /// The binding token limit: the persona limit capped by the
    /// constitutional ceiling.
    pub fn effective_token_limit(&self) -> u32 {
        self.persona
            .max_response_tokens
            .min(self.constitution.max_response_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_types::{DomainId, GovernancePolicy};

    fn persona(max_tokens: u32) -> Persona {
        Persona {
            id: "p".into(),
            name: "P".into(),
            archetype: "Test".into(),
            domains: vec![DomainId::new("general")],
            allow_inference: true,
            inference_depth: 3,
            skills_enabled: vec![],
            skills_disabled: vec![],
            policy: GovernancePolicy {
                max_response_tokens: max_tokens,
                ..GovernancePolicy::default()
            },
            evolution_enabled: false,
        }
    }

    #[test]
    fn persona_cannot_raise_constitutional_ceiling() {
        let constitution = Constitution::builtin();
        let generous = EffectivePolicy::merge(
            &persona(Constitution::DEFAULT_TOKEN_CEILING * 4),
            &constitution,
        );
        assert_eq!(
            generous.effective_token_limit(),
            Constitution::DEFAULT_TOKEN_CEILING
        );

        let strict = EffectivePolicy::merge(&persona(512), &constitution);
        assert_eq!(strict.effective_token_limit(), 512);
    }
}
