//! Ingestion of already-binarized knowledge.
//!
//! A domain file is a JSON document of facts and rules for one
//! knowledge domain. How raw external data becomes boolean propositions
//! is an upstream concern; this module only consumes the result.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use verdict_types::{Consequent, DomainId, Literal, Proposition, Rule, RuleId, SourceId, Statement};

use crate::error::IngestError;
use crate::store::KnowledgeBase;

/// One asserted fact in a domain file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactRecord {
    pub statement: String,
    pub value: bool,
    pub source: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LiteralRecord {
    pub statement: String,
    #[serde(default)]
    pub negated: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsequentRecord {
    pub statement: String,
    #[serde(default = "default_true")]
    pub value: bool,
}

fn default_true() -> bool {
    true
}

/// One implication rule in a domain file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleRecord {
    pub id: String,
    #[serde(rename = "if")]
    pub antecedents: Vec<LiteralRecord>,
    #[serde(rename = "then")]
    pub consequent: ConsequentRecord,
}

/// A complete binarized knowledge domain.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainFile {
    pub domain: String,
    #[serde(default)]
    pub facts: Vec<FactRecord>,
    #[serde(default)]
    pub rules: Vec<RuleRecord>,
}

impl DomainFile {
    /// Assert every fact and rule into the knowledge base.
    ///
    /// A contradiction or malformed statement is fatal to the load
    /// operation: the error propagates and the persona load fails.
    pub fn apply(&self, kb: &mut KnowledgeBase) -> Result<(), IngestError> {
        let domain = DomainId::new(self.domain.clone());

        for record in &self.facts {
            let statement = parse_statement(&record.statement, &self.domain)?;
            let proposition = Proposition::asserted(
                statement,
                record.value,
                domain.clone(),
                SourceId::new(record.source.clone()),
            );
            kb.assert_fact(proposition).map_err(|source| IngestError::Kb {
                domain: self.domain.clone(),
                source,
            })?;
        }

        for record in &self.rules {
            let mut antecedents = Vec::with_capacity(record.antecedents.len());
            for lit in &record.antecedents {
                let statement = parse_statement(&lit.statement, &self.domain)?;
                antecedents.push(Literal {
                    statement,
                    expect: !lit.negated,
                });
            }
            let consequent = Consequent {
                statement: parse_statement(&record.consequent.statement, &self.domain)?,
                value: record.consequent.value,
            };
            let rule = Rule::new(
                RuleId::new(record.id.clone()),
                domain.clone(),
                antecedents,
                consequent,
            );
            kb.assert_rule(rule).map_err(|source| IngestError::Kb {
                domain: self.domain.clone(),
                source,
            })?;
        }

        debug!(
            domain = %self.domain,
            facts = self.facts.len(),
            rules = self.rules.len(),
            "domain applied to knowledge base"
        );
        Ok(())
    }
}

fn parse_statement(text: &str, domain: &str) -> Result<Statement, IngestError> {
    text.parse().map_err(|source| IngestError::Statement {
        domain: domain.to_string(),
        source,
    })
}

/// Read and parse a single domain file.
pub fn load_domain_file(path: &Path) -> Result<DomainFile, IngestError> {
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| IngestError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// Build a knowledge base from a directory of domain files.
///
/// Each domain maps to `<domain>.json` with dots replaced by
/// underscores. A missing file is skipped with a warning; the domain
/// simply loads empty.
pub fn load_domain_dir(
    knowledge_dir: &Path,
    domains: &[DomainId],
) -> Result<KnowledgeBase, IngestError> {
    let mut kb = KnowledgeBase::new();
    for domain in domains {
        let file_name = format!("{}.json", domain.0.replace('.', "_"));
        let path: PathBuf = knowledge_dir.join(file_name);
        if !path.exists() {
            warn!(domain = %domain, path = %path.display(), "domain file not found; skipping");
            continue;
        }
        load_domain_file(&path)?.apply(&mut kb)?;
    }
    Ok(kb)
}
