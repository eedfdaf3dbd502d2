//! Symbolic Knowledge Base for Verdict
//!
//! Holds the propositions and rules a session reasons over, partitioned
//! by knowledge domain.
//!
//! # Invariants
//!
//! - No two propositions with the same statement identity may carry
//!   different truth values. A conflicting assertion is recorded in the
//!   conflict registry and surfaced to the caller immediately; the
//!   original proposition is never overwritten.
//! - The knowledge base is read-only during inference. Sessions take an
//!   immutable snapshot at persona-load time and writes happen only
//!   between sessions.
//! - Domain scoping is enforced at lookup and rule-application time:
//!   data outside the permitted domain set is non-existent for the
//!   session, not merely deprioritized.

#![deny(unsafe_code)]

mod error;
mod ingest;
mod store;

pub use error::{IngestError, KbError};
pub use ingest::{
    load_domain_dir, load_domain_file, ConsequentRecord, DomainFile, FactRecord, LiteralRecord,
    RuleRecord,
};
pub use store::{KnowledgeBase, ScopedKb};
