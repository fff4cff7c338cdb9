//! OpenAI-style completions provider. Works against any endpoint that
//! speaks the classic `/v1/completions` shape.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cowriter_core::config::ProviderConfig;

use crate::provider::{CompletionProvider, ProviderError};

pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    stop: String,
    best_of: u32,
}

impl OpenAiProvider {
    /// Fails when the configured API key env var is unset or the model name
    /// is blank. Timeouts are left to the HTTP client's defaults.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        if config.model.trim().is_empty() {
            return Err(ProviderError::Config(
                "provider.model must not be empty".into(),
            ));
        }
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ProviderError::Config(format!(
                "environment variable {} is not set",
                config.api_key_env
            ))
        })?;

        let client = Client::builder()
            .build()
            .unwrap_or_else(|_| Client::new());
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            stop: config.stop,
            best_of: config.best_of,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(
        &self,
        prompt: &str,
        temperature: Option<f64>,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/v1/completions", self.base_url);
        let payload = CompletionsRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            max_tokens: self.max_tokens,
            temperature: temperature.unwrap_or(self.temperature),
            stop: self.stop.clone(),
            best_of: self.best_of,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message =
                error_message_from_body(&body).unwrap_or_else(|| format!("upstream returned {status}"));
            return Err(ProviderError::Upstream {
                status: Some(status.as_u16()),
                message,
            });
        }

        let completion: CompletionsResponse = response.json().await?;
        debug!(choices = completion.choices.len(), "completion received");
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| ProviderError::Upstream {
                status: None,
                message: "completion response contained no choices".to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Pull the human-readable message out of an OpenAI-style error body,
/// `{"error": {"message": "..."}}`.
fn error_message_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|parsed| parsed.error.message)
}

// ── Wire types ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CompletionsRequest {
    model: String,
    prompt: String,
    n: u32,
    max_tokens: u32,
    temperature: f64,
    stop: String,
    best_of: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionsResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_upstream_error_messages() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(
            error_message_from_body(body).as_deref(),
            Some("Incorrect API key provided")
        );
    }

    #[test]
    fn tolerates_non_json_error_bodies() {
        assert_eq!(error_message_from_body("<html>502 Bad Gateway</html>"), None);
        assert_eq!(error_message_from_body(""), None);
    }

    #[test]
    fn rejects_blank_model() {
        let config = ProviderConfig {
            model: "  ".to_string(),
            ..ProviderConfig::default()
        };
        assert!(OpenAiProvider::new(config).is_err());
    }
}
