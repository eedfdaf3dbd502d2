//! Constraint-Based Reasoner for Verdict
//!
//! Resolves a query against a domain-scoped knowledge base by
//! backward-chaining from the target statement. The search explores
//! *every* distinct derivation path within the depth budget, because
//! multiplicity of distinct answers is itself a result: two proofs
//! reaching different conclusions is `Ambiguous`, never an arbitrary
//! pick.
//!
//! The search frontier is an explicit work-list of partial derivation
//! states (a goal list, the variable bindings accumulated so far, the
//! proof steps already justified, and the ancestor chain used by the
//! cycle guard). States are popped and expanded in a loop; memory is
//! proportional to the live frontier and the depth budget plus the
//! per-path cycle guard bound the expansion.
//!
//! The reasoner is a pure function of (query, knowledge base snapshot,
//! depth budget). It never mutates the knowledge base and performs no
//! I/O: identical input produces a bit-identical [`ResolutionResult`].

#![deny(unsafe_code)]

mod bindings;
mod engine;
mod proof;
mod result;

pub use bindings::{substitute, unify, Bindings};
pub use engine::Resolver;
pub use proof::{Proof, ProofStep};
pub use result::{Conclusion, NoSolutionReason, ResolutionResult};
