//! Records exchanged between debate stages.

use biodesign_scoring::{ConceptScore, Criterion};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::experts::ExpertRole;
use crate::stage::Stage;

/// The problem the panel deliberates on.
///
/// Only `statement` is required. Empty context fields are left out of the
/// prompts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Need {
    /// The need statement.
    #[serde(alias = "need")]
    pub statement: String,
    /// Short summary of the need.
    #[serde(default)]
    pub summary: String,
    /// Clinical or medical insights.
    #[serde(default)]
    pub medical_insights: String,
    /// Technology insights.
    #[serde(default)]
    pub tech_insights: String,
    /// Intended strategy or constraints.
    #[serde(default)]
    pub strategy: String,
}

impl Need {
    /// Creates a need with only a statement.
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            ..Self::default()
        }
    }

    /// Sets the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Sets the medical insights.
    pub fn with_medical_insights(mut self, insights: impl Into<String>) -> Self {
        self.medical_insights = insights.into();
        self
    }

    /// Sets the technology insights.
    pub fn with_tech_insights(mut self, insights: impl Into<String>) -> Self {
        self.tech_insights = insights.into();
        self
    }

    /// Sets the strategy.
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = strategy.into();
        self
    }

    /// Renders the `[Need]` block placed at the top of every prompt.
    pub fn render(&self) -> String {
        let mut out = format!("[Need]\n{}", self.statement.trim());
        let context = [
            ("Summary", &self.summary),
            ("Medical insights", &self.medical_insights),
            ("Technology insights", &self.tech_insights),
            ("Strategy", &self.strategy),
        ];
        for (label, value) in context {
            let value = value.trim();
            if !value.is_empty() {
                out.push_str(&format!("\n{}: {}", label, value));
            }
        }
        out
    }
}

/// A proposed solution concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    /// Title; unique within a run.
    pub title: String,
    /// Short description.
    pub description: String,
    /// Expert that proposed the concept.
    pub source_role: ExpertRole,
    /// Revision suggestions gathered while voting.
    #[serde(default)]
    pub revisions: Vec<String>,
}

impl Concept {
    /// Creates a concept without revisions.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        source_role: ExpertRole,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            source_role,
            revisions: Vec::new(),
        }
    }
}

/// A model call that failed while failure tolerance was enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleFailure {
    /// Stage of the failed call.
    pub stage: Stage,
    /// Expert whose call failed.
    pub role: ExpertRole,
    /// Error message.
    pub error: String,
}

/// Final result of a debate run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateOutput {
    /// Identifier of the run, as seen in the logs.
    pub run_id: Uuid,
    /// Every concept proposed, with revision suggestions attached.
    pub concepts: Vec<Concept>,
    /// Critique lines per concept title.
    pub critiques: BTreeMap<String, Vec<String>>,
    /// Scores per concept, in first-scored order.
    pub scores: Vec<ConceptScore>,
    /// Concept titles by descending weighted total.
    pub ranking: Vec<String>,
    /// How far the leader is ahead of the runner-up.
    pub sensitivity_note: String,
    /// Criteria that triggered the reconciliation call.
    pub disputed_criteria: Vec<Criterion>,
    /// Calls that failed but were tolerated.
    pub failed_roles: Vec<RoleFailure>,
    /// Narrative recommendation and next steps.
    pub decision_summary: String,
}

impl DebateOutput {
    /// The best ranked concept title.
    pub fn winner(&self) -> Option<&str> {
        self.ranking.first().map(String::as_str)
    }

    /// The first `n` ranked titles.
    pub fn top(&self, n: usize) -> &[String] {
        &self.ranking[..n.min(self.ranking.len())]
    }

    /// Score record for a concept title.
    pub fn score_for(&self, title: &str) -> Option<&ConceptScore> {
        self.scores.iter().find(|s| s.concept_title == title)
    }

    /// Concept record for a title.
    pub fn concept(&self, title: &str) -> Option<&Concept> {
        self.concepts.iter().find(|c| c.title == title)
    }

    /// Returns true if reconciliation ran.
    pub fn reconciled(&self) -> bool {
        !self.disputed_criteria.is_empty()
    }
}
