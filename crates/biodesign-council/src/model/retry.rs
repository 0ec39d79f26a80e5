//! Retry with exponential backoff around any model.

use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

use super::{CompletionRequest, LanguageModel};
use crate::config::ModelConfig;
use crate::error::ModelError;

/// Retries transient failures of the wrapped model.
///
/// Only errors for which [`ModelError::is_transient`] holds are retried.
/// The delay starts at `initial_backoff` and doubles after each attempt.
pub struct RetryingModel<M> {
    inner: M,
    max_retries: u32,
    initial_backoff: Duration,
}

impl<M: LanguageModel> RetryingModel<M> {
    /// Wraps `inner` with explicit retry settings.
    pub fn new(inner: M, max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            inner,
            max_retries,
            initial_backoff,
        }
    }

    /// Wraps `inner` with the retry settings of `config`.
    pub fn from_config(inner: M, config: &ModelConfig) -> Self {
        Self::new(
            inner,
            config.max_retries,
            Duration::from_millis(config.initial_backoff_ms),
        )
    }

    /// Returns the wrapped model.
    pub fn inner(&self) -> &M {
        &self.inner
    }
}

#[async_trait]
impl<M: LanguageModel> LanguageModel for RetryingModel<M> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        let mut attempt = 0;
        let mut backoff = self.initial_backoff;
        loop {
            match self.inner.complete(request).await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "{} call for {} failed ({}); retry {}/{} in {:?}",
                        request.stage, request.role, err, attempt, self.max_retries, backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                Err(err) => return Err(err),
            }
        }
    }
}
