//! Configuration types for the expert council.
//!
//! All settings reach the pipeline through [`CouncilConfig`]; nothing in
//! the library reads the process environment. Every section has defaults
//! and deserializes from partial input.

use biodesign_scoring::{CriteriaWeights, DisagreementDetector, DEFAULT_DISPUTE_THRESHOLD};
use serde::{Deserialize, Serialize};

use crate::error::DebateError;
use crate::Result;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CouncilConfig {
    /// Language model selection and transport.
    pub model: ModelConfig,

    /// Stage settings.
    pub debate: DebateSettings,

    /// Reconciliation of disputed criteria.
    pub reconciliation: ReconciliationConfig,

    /// Criterion weight table.
    pub weights: CriteriaWeights,
}

impl CouncilConfig {
    /// Checks every section.
    ///
    /// # Errors
    ///
    /// - [`DebateError::Scoring`] for a bad weight table or threshold
    /// - [`DebateError::Config`] for any other out-of-range value
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        DisagreementDetector::with_threshold(self.reconciliation.dispute_threshold)?;
        self.model.validate()?;
        self.debate.validate()?;
        Ok(())
    }
}

/// Language model selection and transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name sent to the provider.
    pub name: String,

    /// Sampling temperature.
    pub temperature: f64,

    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,

    /// Environment variable holding the API key (read by the CLI only).
    pub api_key_env: String,

    /// Per-request timeout.
    pub timeout_secs: u64,

    /// Retries for transient failures; 0 disables retrying.
    pub max_retries: u32,

    /// Delay before the first retry, doubled on each further attempt.
    pub initial_backoff_ms: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gpt-4.1-mini".to_string(),
            temperature: 0.3,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 120,
            max_retries: 0,
            initial_backoff_ms: 500,
        }
    }
}

impl ModelConfig {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DebateError::Config("model.name must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(DebateError::Config(format!(
                "model.temperature must lie within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.timeout_secs == 0 {
            return Err(DebateError::Config(
                "model.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Stage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateSettings {
    /// Nominal debate round count. The pipeline is fixed, so this is
    /// validated and logged but does not add stages.
    pub rounds: u32,

    /// Concepts included in the critique digest.
    pub digest_concepts: usize,

    /// Characters of each description kept in the critique digest.
    pub digest_chars: usize,

    /// Critiques per concept carried into the vote summary.
    pub summary_critiques: usize,

    /// Log and skip a failed expert call instead of aborting the run.
    pub tolerate_role_failures: bool,
}

impl Default for DebateSettings {
    fn default() -> Self {
        Self {
            rounds: 3,
            digest_concepts: 10,
            digest_chars: 120,
            summary_critiques: 3,
            tolerate_role_failures: false,
        }
    }
}

impl DebateSettings {
    fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(DebateError::Config("debate.rounds must be at least 1".to_string()));
        }
        if self.digest_concepts == 0 {
            return Err(DebateError::Config(
                "debate.digest_concepts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reconciliation of disputed criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// Run the single reconciliation call when criteria are disputed.
    pub enabled: bool,

    /// Standard deviation at or above which a criterion is disputed.
    pub dispute_threshold: f64,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dispute_threshold: DEFAULT_DISPUTE_THRESHOLD,
        }
    }
}
