//! Text backend: the single seam between the pipeline and a generative model.
//!
//! The content generator only needs "prompt in, text blob out", so that is
//! all [`TextBackend`] asks for. [`ProviderBackend`] implements it on top of
//! any `edgequake_llm` provider; tests plug in scripted backends instead.
//!
//! ## Timeout and retries
//!
//! Every call is wrapped in `tokio::time::timeout(api_timeout_secs)`. An
//! expired call counts as a failure like any provider error. Retries are off
//! by default (`max_retries = 0`); when enabled, the wait before attempt `n`
//! is `retry_backoff_ms * 2^(n-1)`, so a 500 ms base gives 500 ms → 1 s → 2 s.

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::prompts::Prompt;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// A black-box text-completion service.
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Complete `prompt`, producing at most roughly `max_tokens` tokens.
    async fn complete(&self, prompt: &Prompt, max_tokens: usize) -> Result<String, GenerationError>;
}

/// [`TextBackend`] over an `edgequake_llm` provider.
pub struct ProviderBackend {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    call_timeout: Duration,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl ProviderBackend {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &GenerationConfig) -> Self {
        Self {
            provider,
            temperature: config.temperature,
            call_timeout: Duration::from_secs(config.api_timeout_secs),
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
        }
    }

    async fn attempt(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, GenerationError> {
        let start = Instant::now();
        let response = match timeout(self.call_timeout, self.provider.chat(messages, Some(options))).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return Err(GenerationError::Backend {
                    attempts: 1,
                    detail: e.to_string(),
                })
            }
            Err(_) => {
                return Err(GenerationError::Timeout {
                    secs: self.call_timeout.as_secs(),
                })
            }
        };

        debug!(
            "{} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        if response.content.trim().is_empty() {
            return Err(GenerationError::EmptyReply);
        }
        Ok(response.content)
    }
}

#[async_trait]
impl TextBackend for ProviderBackend {
    async fn complete(&self, prompt: &Prompt, max_tokens: usize) -> Result<String, GenerationError> {
        let messages = vec![
            ChatMessage::system(prompt.system.as_str()),
            ChatMessage::user(prompt.user.as_str()),
        ];
        let options = build_options(prompt.temperature.unwrap_or(self.temperature), max_tokens);

        let mut last_err = GenerationError::EmptyReply;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.retry_backoff_ms, attempt);
                warn!(
                    "Retry {}/{} after {}ms",
                    attempt,
                    self.max_retries,
                    delay.as_millis()
                );
                sleep(delay).await;
            }

            match self.attempt(&messages, &options).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!("Attempt {} failed: {}", attempt + 1, e);
                    last_err = e;
                }
            }
        }

        Err(match last_err {
            GenerationError::Backend { detail, .. } => GenerationError::Backend {
                attempts: self.max_retries + 1,
                detail,
            },
            other => other,
        })
    }
}

/// Wait before retry number `attempt` (1-based).
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1))))
}

fn build_options(temperature: f32, max_tokens: usize) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(temperature),
        max_tokens: Some(max_tokens),
        ..Default::default()
    }
}
