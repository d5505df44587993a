use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::conversation::{Message, MessageRole};
use crate::core::{Error, Result};

/// The role vocabulary of the Gemini `contents` array. Kept separate
/// from `MessageRole` so the mapping is an explicit step.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum GeminiRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "model")]
    Model,
}

impl From<MessageRole> for GeminiRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => GeminiRole::User,
            MessageRole::Model => GeminiRole::Model,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Part {
    pub text: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Content {
    pub role: GeminiRole,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn new(role: GeminiRole, text: &str) -> Self {
        Self {
            role,
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }

    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

impl From<&Message> for Content {
    fn from(msg: &Message) -> Self {
        Content::new(msg.role.into(), &msg.content)
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Text of the final `user` turn, i.e. the prompt being answered.
    pub fn prompt(&self) -> Option<String> {
        self.contents.last().map(Content::text)
    }
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    next_page_token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ModelInfo {
    name: String,
}

#[derive(Deserialize, Debug)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// The hosted model API as seen by the rest of the crate. Errors are
/// classified by the implementation: quota exhaustion is reported as
/// `Error::QuotaExceeded`, everything else as `Error::GenerationFailed`.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, model: &str, request: &GenerateContentRequest) -> Result<String>;

    /// Fully qualified names (`models/...`) of every available model.
    async fn list_models(&self) -> Result<Vec<String>>;
}

/// Gemini model names are addressed as `models/<id>` by the REST API.
pub fn normalize_model_id(model: &str) -> String {
    let model = model.trim();
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

/// Maps a failed response onto the crate's error classes. Quota
/// exhaustion shows up as a 429 or a `RESOURCE_EXHAUSTED` status in the
/// error body.
pub fn classify_error(status: StatusCode, body: &str) -> Error {
    let (message, status_text) = match serde_json::from_str::<ErrorWrapper>(body) {
        Ok(wrapper) => (
            wrapper.error.message.unwrap_or_else(|| body.to_string()),
            wrapper.error.status.unwrap_or_default(),
        ),
        Err(_) => (body.to_string(), String::new()),
    };

    let detail = if status_text.is_empty() {
        format!("{}: {}", status.as_u16(), message)
    } else {
        format!("{} {}: {}", status.as_u16(), status_text, message)
    };

    if status == StatusCode::TOO_MANY_REQUESTS || status_text == "RESOURCE_EXHAUSTED" {
        Error::QuotaExceeded(detail)
    } else {
        Error::GenerationFailed(detail)
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let text = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(Error::GenerationFailed(
            "Gemini API returned no text in the response candidates".to_string(),
        ));
    }
    Ok(text)
}

/// Every failure to list models is a configuration problem, whether
/// the request never made it or the API refused it.
fn listing_failed(err: impl std::fmt::Display) -> Error {
    Error::Configuration(format!("Listing models failed: {}", err))
}

/// Client for the Gemini REST API.
#[derive(Clone)]
pub struct GeminiApi {
    client: reqwest::Client,
    api_hostname: String,
    api_key: String,
}

impl GeminiApi {
    pub fn new(api_hostname: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_hostname: api_hostname.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl GenerativeModel for GeminiApi {
    async fn generate(&self, model: &str, request: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/v1beta/{}:generateContent",
            self.api_hostname,
            normalize_model_id(model)
        );
        tracing::debug!("Sending generateContent request to {}", url);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(Duration::from_secs(60 * 5))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        extract_text(parsed)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/v1beta/models", self.api_hostname);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = self
                .client
                .get(&url)
                .header("x-goog-api-key", &self.api_key)
                .query(&[("pageSize", "1000")]);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token.as_str())]);
            }

            let response = req.send().await.map_err(listing_failed)?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(listing_failed(classify_error(status, &body)));
            }

            let page: ListModelsResponse = response.json().await.map_err(listing_failed)?;
            models.extend(page.models.into_iter().map(|m| m.name));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(models)
    }
}
