//! HTTP client for the suggestion backend, used by the editor.

use anyhow::bail;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::protocol::{ErrorResponse, HealthResponse, SuggestRequest, SuggestResponse};

/// Client for the `/autocomplete` endpoint.
pub struct SuggestionClient {
    client: Client,
    base_url: String,
}

impl SuggestionClient {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, base_url }
    }

    /// Check backend health.
    #[instrument(skip(self))]
    pub async fn health(&self) -> anyhow::Result<HealthResponse> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let health: HealthResponse = resp.json().await?;
        Ok(health)
    }

    /// Fetch a suggestion for the prompt. `Ok(None)` means the backend had
    /// nothing useful once the completion was trimmed; an `Err` carries the
    /// backend's error message verbatim.
    #[instrument(skip(self, prompt))]
    pub async fn suggest(
        &self,
        prompt: &str,
        temperature: Option<f64>,
    ) -> anyhow::Result<Option<String>> {
        let url = format!("{}/autocomplete", self.base_url);
        let req = SuggestRequest {
            prompt: prompt.to_string(),
            temperature,
        };
        let resp = self.client.post(&url).json(&req).send().await?;

        let status = resp.status();
        if status.is_success() {
            let body: SuggestResponse = resp.json().await?;
            debug!(
                suggestion_len = body.suggestion.as_deref().map_or(0, str::len),
                "suggestion received"
            );
            Ok(body.suggestion)
        } else {
            let body: ErrorResponse = resp.json().await?;
            bail!("{}", body.error)
        }
    }
}
