use thiserror::Error;
use verdict_types::{Proposition, RuleId, Statement, StatementParseError};

/// Errors from knowledge base mutation.
#[derive(Error, Debug)]
pub enum KbError {
    #[error("contradiction at assertion: '{existing}' conflicts with incoming '{incoming}'")]
    ContradictionAtAssertion {
        existing: Box<Proposition>,
        incoming: Box<Proposition>,
    },

    #[error("fact statement must be ground: {0}")]
    UnboundFact(Statement),

    #[error("duplicate rule id: {0}")]
    DuplicateRule(RuleId),
}

/// Errors from loading binarized domain files.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("cannot read domain file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid JSON in domain file '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("invalid statement in domain '{domain}': {source}")]
    Statement {
        domain: String,
        source: StatementParseError,
    },

    #[error("domain '{domain}' failed to load: {source}")]
    Kb { domain: String, source: KbError },
}
