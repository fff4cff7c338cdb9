//! Request and response types for the suggestion backend's HTTP boundary.
//! The error shape is shared by validation failures and upstream errors.

use serde::{Deserialize, Serialize};

// ── Autocomplete ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub prompt: String,

    /// Overrides the provider's configured sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestResponse {
    /// `None` when the completion trimmed down to nothing.
    pub suggestion: Option<String>,
}

// ── Health ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Which completion provider the server was started with.
    pub provider: String,
}

// ── Errors ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
