//! Completion provider abstraction. The server talks to exactly one
//! provider, selected from config at startup.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use cowriter_core::config::{ProviderBackend, ProviderConfig};

use crate::mock::MockProvider;
use crate::openai::OpenAiProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The upstream completion API rejected the request. Carries the
    /// upstream HTTP status when one was received.
    #[error("{message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid provider configuration: {0}")]
    Config(String),

    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A source of raw text completions for a prompt. Implementations do not
/// trim or normalize; the server owns that pipeline.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str, temperature: Option<f64>)
        -> Result<String, ProviderError>;

    fn name(&self) -> &'static str;
}

/// Build the provider the config asks for. An openai backend that cannot
/// initialize (missing API key, blank model) falls back to the mock
/// provider with a warning rather than refusing to start.
pub fn provider_from_config(config: &ProviderConfig) -> Arc<dyn CompletionProvider> {
    match config.backend {
        ProviderBackend::Mock => {
            info!("using mock completion provider");
            Arc::new(MockProvider::new())
        }
        ProviderBackend::Openai => match OpenAiProvider::new(config.clone()) {
            Ok(provider) => {
                info!(model = %config.model, "using openai completion provider");
                Arc::new(provider)
            }
            Err(error) => {
                warn!("openai provider unavailable, falling back to mock: {error}");
                Arc::new(MockProvider::new())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_without_api_key_falls_back_to_mock() {
        let config = ProviderConfig {
            backend: ProviderBackend::Openai,
            api_key_env: "COWRITER_TEST_UNSET_KEY".to_string(),
            ..ProviderConfig::default()
        };
        let provider = provider_from_config(&config);
        assert_eq!(provider.name(), "mock");
    }

    #[test]
    fn mock_backend_selects_mock() {
        let config = ProviderConfig::default();
        let provider = provider_from_config(&config);
        assert_eq!(provider.name(), "mock");
    }
}
