use serde::{Deserialize, Serialize};

use crate::Statement;

/// A resolution request: the target statement (possibly containing
/// unbound variables) and the depth budget inherited from the active
/// persona.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub target: Statement,
    pub max_depth: u32,
}

impl Query {
    pub fn new(target: Statement, max_depth: u32) -> Self {
        Self { target, max_depth }
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (depth {})", self.target, self.max_depth)
    }
}
