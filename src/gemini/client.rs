//! Rate limited, retrying wrapper around a `GenerativeModel`.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::OnceCell;

use super::core::{
    Content, GeminiRole, GenerateContentRequest, GenerationConfig, GenerativeModel,
    normalize_model_id,
};
use super::rate_limit::RateLimiter;
use crate::conversation::Message;
use crate::core::{Error, Result};
use crate::prompt::{self, Prompt};
use crate::roles::RoleDefinition;

#[derive(Clone, Debug)]
pub struct ClientSettings {
    /// Minimum spacing between two network attempts
    pub min_request_interval: Duration,
    /// Total attempts for a call that keeps hitting quota errors
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            min_request_interval: Duration::from_secs(2),
            max_attempts: 3,
            retry_delay: Duration::from_secs(60),
        }
    }
}

/// Per-call model parameters, usually taken from a role definition.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationParams {
    pub fn for_role(role: &RoleDefinition, max_output_tokens: u32) -> Self {
        Self {
            model: role.model_id.clone(),
            temperature: role.temperature,
            max_output_tokens,
        }
    }
}

/// Builds the `contents` array: prior history in order followed by the
/// prompt as the final user turn.
pub fn to_contents(history: &[Message], prompt: &str) -> Vec<Content> {
    history
        .iter()
        .map(Content::from)
        .chain(std::iter::once(Content::new(GeminiRole::User, prompt)))
        .collect()
}

pub struct ModelClient {
    api: Arc<dyn GenerativeModel>,
    limiter: RateLimiter,
    settings: ClientSettings,
    known_models: OnceCell<Vec<String>>,
}

impl ModelClient {
    pub fn new(api: Arc<dyn GenerativeModel>, settings: ClientSettings) -> Self {
        Self {
            api,
            limiter: RateLimiter::new(settings.min_request_interval),
            settings,
            known_models: OnceCell::new(),
        }
    }

    /// Verify that `model` is served by the API. The model listing is
    /// fetched once and reused.
    pub async fn check_model(&self, model: &str) -> Result<()> {
        let available = self
            .known_models
            .get_or_try_init(|| async { self.api.list_models().await })
            .await?;
        let model = normalize_model_id(model);
        if available.iter().any(|m| *m == model) {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "Model {} not available. Available models: {:?}",
                model, available
            )))
        }
    }

    /// Generate a reply to `prompt` given the prior `history`. The
    /// prompt is extended with an instruction to stay within the output
    /// token budget. Quota errors are retried with a fixed delay, any
    /// other failure is returned right away.
    pub async fn complete(
        &self,
        params: &GenerationParams,
        history: &[Message],
        prompt: &str,
    ) -> Result<String> {
        let prompt = prompt::render(
            Prompt::TokenBudget,
            &json!({"prompt": prompt, "max_tokens": params.max_output_tokens}),
        )?;
        let request = GenerateContentRequest {
            contents: to_contents(history, &prompt),
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_output_tokens,
            },
        };

        let mut attempt = 1;
        loop {
            self.limiter.acquire().await;

            match self.api.generate(&params.model, &request).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_quota_exceeded() && attempt < self.settings.max_attempts => {
                    tracing::warn!(
                        "Rate limit hit ({}), waiting {:?} before retry {}/{}",
                        e,
                        self.settings.retry_delay,
                        attempt,
                        self.settings.max_attempts - 1
                    );
                    tokio::time::sleep(self.settings.retry_delay).await;
                    attempt += 1;
                }
                Err(Error::QuotaExceeded(msg)) | Err(Error::GenerationFailed(msg)) => {
                    return Err(Error::GenerationFailed(msg));
                }
                Err(e) => return Err(Error::GenerationFailed(e.to_string())),
            }
        }
    }
}
