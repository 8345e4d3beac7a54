//! Core `CaptionService` trait and `ApiCaptioner` implementation.
//!
//! `ApiCaptioner` calls a Replicate-style predictions endpoint: the JPEG is
//! sent inline as a base64 data URI with the caption-mode flag set, and the
//! `Prefer: wait` header asks the server to hold the connection until the
//! prediction settles.  Errors are opaque to the pipeline and never retried
//! within a run.

use async_trait::async_trait;
use base64::Engine;
use thiserror::Error;

use crate::config::CaptionConfig;

// ---------------------------------------------------------------------------
// CaptionError
// ---------------------------------------------------------------------------

/// Errors that can occur while captioning an image.
#[derive(Debug, Error)]
pub enum CaptionError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("caption request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse caption response: {0}")]
    Parse(String),

    /// The service reported a failed prediction.
    #[error("caption service reported failure: {0}")]
    Service(String),

    /// The prediction succeeded but carried no usable caption text.
    #[error("caption service returned an empty caption")]
    EmptyCaption,
}

impl From<reqwest::Error> for CaptionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CaptionError::Timeout
        } else {
            CaptionError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// CaptionService trait
// ---------------------------------------------------------------------------

/// Async trait for image captioning.
///
/// Implementors must be `Send + Sync` so they can be shared across threads
/// (e.g. wrapped in `Arc<dyn CaptionService>`).
#[async_trait]
pub trait CaptionService: Send + Sync {
    /// Produce a short natural-language description of `image` (JPEG bytes).
    async fn caption(&self, image: &[u8]) -> Result<String, CaptionError>;
}

// ---------------------------------------------------------------------------
// ApiCaptioner
// ---------------------------------------------------------------------------

/// Calls a predictions endpoint speaking the Replicate wire format.
///
/// All connection details (`base_url`, `model_version`, timeout) come from
/// the [`CaptionConfig`] passed to [`ApiCaptioner::from_config`]; the bearer
/// token is injected separately so credentials never live in the settings
/// file.
pub struct ApiCaptioner {
    client: reqwest::Client,
    config: CaptionConfig,
    token: String,
}

impl ApiCaptioner {
    /// Build an `ApiCaptioner` from application config and a bearer token.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &CaptionConfig, token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            token: token.into(),
        }
    }

    /// Pull the caption text out of a prediction's `output` field, which
    /// the wire format delivers either as one string or as a list of
    /// string fragments.
    fn extract_caption(output: &serde_json::Value) -> Option<String> {
        let caption = match output {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(parts) => parts
                .iter()
                .filter_map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(""),
            _ => return None,
        };

        let caption = caption.trim().to_string();
        if caption.is_empty() {
            None
        } else {
            Some(caption)
        }
    }
}

#[async_trait]
impl CaptionService for ApiCaptioner {
    async fn caption(&self, image: &[u8]) -> Result<String, CaptionError> {
        let url = format!("{}/v1/predictions", self.config.base_url);

        let data_uri = format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(image)
        );

        let body = serde_json::json!({
            "version": self.config.model_version,
            "input": {
                "image":   data_uri,
                "caption": true
            }
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CaptionError::Parse(e.to_string()))?;

        if json["status"] == "failed" {
            let detail = json["error"].as_str().unwrap_or("unknown error");
            return Err(CaptionError::Service(detail.to_string()));
        }

        Self::extract_caption(&json["output"]).ok_or(CaptionError::EmptyCaption)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> CaptionConfig {
        CaptionConfig {
            base_url: "http://localhost:9999".into(),
            model_version: "test-version".into(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _captioner = ApiCaptioner::from_config(&make_config(), "r8_test");
    }

    #[test]
    fn extract_caption_from_string_output() {
        let output = serde_json::json!("a dog sitting on a porch");
        assert_eq!(
            ApiCaptioner::extract_caption(&output).as_deref(),
            Some("a dog sitting on a porch")
        );
    }

    #[test]
    fn extract_caption_joins_array_output() {
        let output = serde_json::json!(["a dog ", "sitting on ", "a porch"]);
        assert_eq!(
            ApiCaptioner::extract_caption(&output).as_deref(),
            Some("a dog sitting on a porch")
        );
    }

    #[test]
    fn extract_caption_trims_whitespace() {
        let output = serde_json::json!("  a dog\n");
        assert_eq!(
            ApiCaptioner::extract_caption(&output).as_deref(),
            Some("a dog")
        );
    }

    #[test]
    fn extract_caption_rejects_empty_and_non_text() {
        assert!(ApiCaptioner::extract_caption(&serde_json::json!("")).is_none());
        assert!(ApiCaptioner::extract_caption(&serde_json::json!(null)).is_none());
        assert!(ApiCaptioner::extract_caption(&serde_json::json!(42)).is_none());
    }

    /// Verify that `ApiCaptioner` is object-safe (usable as `dyn CaptionService`).
    #[test]
    fn captioner_is_object_safe() {
        let captioner: Box<dyn CaptionService> =
            Box::new(ApiCaptioner::from_config(&make_config(), "r8_test"));
        drop(captioner);
    }
}
