//! The language-model boundary.
//!
//! The pipeline only ever sees [`LanguageModel::complete`]: one prompt in,
//! one block of text out. Which provider answers, and how, stays behind
//! this trait.
//!
//! # Implementors
//!
//! - [`OpenAiChatModel`]: OpenAI-compatible `chat/completions` endpoint
//! - [`RetryingModel`]: wraps any model with retry and backoff

mod openai;
mod retry;

pub use openai::OpenAiChatModel;
pub use retry::RetryingModel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::stage::Stage;

/// One completion request.
///
/// `stage` and `role` are metadata for logging and routing; they are not
/// sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Stage issuing the request.
    pub stage: Stage,
    /// Expert code, or `moderator`.
    pub role: String,
    /// Persona sent as the system message.
    pub system: Option<String>,
    /// The user prompt.
    pub prompt: String,
}

impl CompletionRequest {
    /// Creates a request without a system persona.
    pub fn new(stage: Stage, role: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            stage,
            role: role.into(),
            system: None,
            prompt: prompt.into(),
        }
    }

    /// Attaches a system persona.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// A text-completion backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the model name, for logs.
    fn name(&self) -> &str;

    /// Completes one request.
    ///
    /// May be slow and may fail; the caller decides what a failure means.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError>;
}
