//! HTTP client for the Gemini REST API.
//!
//! [`GeminiClient`] is constructed explicitly from a [`GeminiConfig`] and
//! injected wherever it is needed; there is no process-wide lazy client.

use std::time::Duration;

use crate::adapter::AdapterError;
use crate::api::{GenerateContentRequest, GenerateContentResponse};

/// Connection configuration for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Base URL, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub base_url: String,
    /// Model used for vision analysis and prompt synthesis.
    pub text_model: String,
    /// Model used for image rendering.
    pub image_model: String,
    /// Upper bound on any single adapter call. Rendering can take tens of
    /// seconds; a timeout is treated as a failure of that unit of work.
    pub request_timeout_secs: u64,
}

impl GeminiConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                      | Default                                              |
    /// |------------------------------|------------------------------------------------------|
    /// | `GEMINI_API_KEY`             | (required)                                           |
    /// | `GEMINI_BASE_URL`            | `https://generativelanguage.googleapis.com/v1beta`   |
    /// | `GEMINI_TEXT_MODEL`          | `gemini-2.0-flash-exp`                               |
    /// | `GEMINI_IMAGE_MODEL`         | `gemini-2.0-flash-exp`                               |
    /// | `GEMINI_REQUEST_TIMEOUT_SECS`| `120`                                                |
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set");
        let base_url = std::env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into());
        let text_model =
            std::env::var("GEMINI_TEXT_MODEL").unwrap_or_else(|_| "gemini-2.0-flash-exp".into());
        let image_model =
            std::env::var("GEMINI_IMAGE_MODEL").unwrap_or_else(|_| "gemini-2.0-flash-exp".into());
        let request_timeout_secs: u64 = std::env::var("GEMINI_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("GEMINI_REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            api_key,
            base_url,
            text_model,
            image_model,
            request_timeout_secs,
        }
    }
}

/// Thin HTTP wrapper around `generateContent`.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to build HTTP client");
        Self { http, config }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Call `generateContent` on the given model.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AdapterError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, model, self.config.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AdapterError::Http(format!("generateContent request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, model, "Gemini API returned an error");
            return Err(AdapterError::Http(format!(
                "generateContent returned {status}: {body}"
            )));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| AdapterError::Malformed(format!("Unparseable API response: {e}")))
    }
}
