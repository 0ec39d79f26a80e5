//! Pipeline stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed steps of a debate run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Each expert proposes concepts.
    Position,
    /// Each expert critiques the proposed concepts.
    Critique,
    /// Each expert suggests revisions and scores every concept.
    ReviseVote,
    /// One consolidated re-score of disputed criteria.
    Reconciliation,
    /// Narrative summary of the final ranking.
    Decision,
}

impl Stage {
    /// Returns true for stages invoked once per expert role.
    pub fn is_per_role(&self) -> bool {
        matches!(self, Stage::Position | Stage::Critique | Stage::ReviseVote)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Position => write!(f, "position"),
            Stage::Critique => write!(f, "critique"),
            Stage::ReviseVote => write!(f, "revise-vote"),
            Stage::Reconciliation => write!(f, "reconciliation"),
            Stage::Decision => write!(f, "decision"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Position.to_string(), "position");
        assert_eq!(Stage::ReviseVote.to_string(), "revise-vote");
        assert_eq!(Stage::Decision.to_string(), "decision");
    }

    #[test]
    fn test_per_role_stages() {
        assert!(Stage::Critique.is_per_role());
        assert!(!Stage::Reconciliation.is_per_role());
        assert!(!Stage::Decision.is_per_role());
    }
}
