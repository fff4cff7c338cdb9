//! Runs the suggestion backend inside the editor process.
//!
//! The plain `cowriter` command self-hosts: the axum server is spawned on
//! a background task, health-polled until it answers, and aborted when the
//! editor exits. `cowriter serve` bypasses this entirely and runs the
//! server in the foreground on the configured address.

use tokio::task::JoinHandle;
use tracing::{debug, info};

use cowriter_core::CowriterConfig;

use crate::server;

/// How long to wait for the embedded server to answer health checks (in seconds).
const STARTUP_TIMEOUT_SECS: u64 = 10;

/// How long between health check polls during startup (in milliseconds).
const HEALTH_POLL_INTERVAL_MS: u64 = 100;

/// Manages an embedded suggestion backend task.
pub struct BackendManager {
    server: Option<JoinHandle<anyhow::Result<()>>>,
    port: u16,
    config: CowriterConfig,
}

impl BackendManager {
    /// Create a new manager. Does not start the server yet.
    pub fn new(config: CowriterConfig) -> Self {
        Self {
            server: None,
            port: 0,
            config,
        }
    }

    /// Get the port the embedded server is running on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the base URL for the embedded server.
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Whether the server task is currently running.
    pub fn is_running(&self) -> bool {
        matches!(&self.server, Some(task) if !task.is_finished())
    }

    /// Start the server task and wait for it to become healthy.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        if self.server.is_some() {
            anyhow::bail!("Suggestion backend is already running");
        }

        // The embedded backend is private to this editor instance, so it
        // gets an ephemeral port; the configured port belongs to
        // `cowriter serve`.
        let port = find_free_port()?;
        self.port = port;

        info!(port = port, "Starting embedded suggestion backend");

        let mut config = self.config.clone();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;
        self.server = Some(tokio::spawn(
            async move { server::start_server(&config).await },
        ));

        self.wait_for_healthy().await?;

        info!(port = port, "Embedded suggestion backend is ready");
        Ok(())
    }

    /// Poll the health endpoint until the server answers.
    async fn wait_for_healthy(&mut self) -> anyhow::Result<()> {
        let client = reqwest::Client::new();
        let url = format!("{}/health", self.base_url());
        let deadline =
            tokio::time::Instant::now() + tokio::time::Duration::from_secs(STARTUP_TIMEOUT_SECS);

        loop {
            // A bind failure shows up as the server task finishing early.
            let finished = self.server.as_ref().map_or(false, |task| task.is_finished());
            if finished {
                if let Some(task) = self.server.take() {
                    return match task.await {
                        Ok(Ok(())) => {
                            anyhow::bail!("Suggestion backend exited before becoming healthy")
                        }
                        Ok(Err(e)) => Err(e.context("Suggestion backend failed to start")),
                        Err(e) => anyhow::bail!("Suggestion backend task panicked: {e}"),
                    };
                }
            }

            if tokio::time::Instant::now() > deadline {
                anyhow::bail!(
                    "Suggestion backend failed to start within {} seconds",
                    STARTUP_TIMEOUT_SECS
                );
            }

            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(());
                }
                Ok(resp) => {
                    debug!(status = %resp.status(), "Embedded backend not ready yet");
                }
                Err(_) => {
                    // Connection refused — the server isn't listening yet.
                }
            }

            tokio::time::sleep(tokio::time::Duration::from_millis(HEALTH_POLL_INTERVAL_MS)).await;
        }
    }

    /// Stop the embedded server task.
    pub fn shutdown(&mut self) {
        if let Some(task) = self.server.take() {
            info!("Stopping embedded suggestion backend");
            task.abort();
        }
    }
}

impl Drop for BackendManager {
    fn drop(&mut self) {
        // Best-effort cleanup.
        if let Some(ref task) = self.server {
            task.abort();
        }
    }
}

/// Find an available TCP port on localhost.
fn find_free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SuggestionClient;

    #[tokio::test]
    async fn starts_answers_health_and_stops() {
        let mut manager = BackendManager::new(CowriterConfig::default());
        manager.start().await.unwrap();
        assert!(manager.is_running());
        assert_ne!(manager.port(), 0);

        let client = SuggestionClient::new(manager.base_url());
        let health = client.health().await.unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.provider, "mock");

        manager.shutdown();
        assert!(!manager.is_running());
    }

    #[tokio::test]
    async fn serves_suggestions_end_to_end() {
        let mut manager = BackendManager::new(CowriterConfig::default());
        manager.start().await.unwrap();

        let client = SuggestionClient::new(manager.base_url());
        let suggestion = client.suggest("The weather today", None).await.unwrap();
        // the mock provider always has something to say
        assert!(suggestion.is_some());

        manager.shutdown();
    }
}
