//! Core `PoemService` trait and `ApiPoet` implementation.
//!
//! `ApiPoet` calls any OpenAI-compatible `/v1/chat/completions` endpoint.
//! All connection details come from [`PoemConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::PoemConfig;
use crate::poet::prompt::PromptContext;

// ---------------------------------------------------------------------------
// PoemError
// ---------------------------------------------------------------------------

/// Errors that can occur during poem composition.
#[derive(Debug, Error)]
pub enum PoemError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("composition request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse composition response: {0}")]
    Parse(String),

    /// The service returned a response with no usable text content.
    #[error("composition service returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for PoemError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PoemError::Timeout
        } else {
            PoemError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// PoemService trait
// ---------------------------------------------------------------------------

/// Async trait for poem composition.
///
/// Implementors must be `Send + Sync` so they can be shared across threads
/// (e.g. wrapped in `Arc<dyn PoemService>`).
#[async_trait]
pub trait PoemService: Send + Sync {
    /// Generate poem text for the given prompt context.
    async fn compose_poem(&self, ctx: &PromptContext) -> Result<String, PoemError>;
}

// ---------------------------------------------------------------------------
// ApiPoet
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// The persona rides as the system message and the composed prompt as the
/// user message — the standard two-message chat shape.
pub struct ApiPoet {
    client: reqwest::Client,
    config: PoemConfig,
    api_key: String,
}

impl ApiPoet {
    /// Build an `ApiPoet` from application config and an API key.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &PoemConfig, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl PoemService for ApiPoet {
    async fn compose_poem(&self, ctx: &PromptContext) -> Result<String, PoemError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": ctx.persona },
                { "role": "user",   "content": ctx.prompt  }
            ],
            "temperature": self.config.temperature
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PoemError::Parse(e.to_string()))?;

        let poem = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(PoemError::EmptyResponse)?
            .trim()
            .to_string();

        if poem.is_empty() {
            return Err(PoemError::EmptyResponse);
        }

        Ok(poem)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> PoemConfig {
        PoemConfig {
            base_url: "http://localhost:9999".into(),
            model: "gpt-4".into(),
            temperature: 0.7,
            timeout_secs: 5,
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _poet = ApiPoet::from_config(&make_config(), "sk-test");
    }

    /// Verify that `ApiPoet` is object-safe (usable as `dyn PoemService`).
    #[test]
    fn poet_is_object_safe() {
        let poet: Box<dyn PoemService> = Box::new(ApiPoet::from_config(&make_config(), "sk-test"));
        drop(poet);
    }
}
