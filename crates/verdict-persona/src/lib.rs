//! Persona and Constitution loading for Verdict
//!
//! Personas are JSON documents parsed once, at load time, into the
//! strongly typed [`verdict_types::Persona`]. The recognized option
//! set is closed: unknown fields and unsupported schema versions are
//! load-time errors, never runtime surprises.
//!
//! The constitution is loaded once per process and applied to every
//! persona; no persona configuration can weaken it.

#![deny(unsafe_code)]

mod document;
mod loader;
mod source;

pub use document::PersonaDocument;
pub use loader::{PersonaError, PersonaLoader};
pub use source::FileSystemSource;
