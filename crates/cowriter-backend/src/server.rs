//! Stateless HTTP server exposing the suggestion endpoint. Every request
//! carries its full context; nothing is remembered between calls.

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::{error, info};

use cowriter_core::config::CowriterConfig;
use cowriter_core::overlap::exclude_prompt_from_suggestion;
use cowriter_core::text::normalize_suggestion;

use crate::protocol::{ErrorResponse, HealthResponse, SuggestResponse};
use crate::provider::{provider_from_config, CompletionProvider, ProviderError};

pub struct ServerState {
    pub provider: Arc<dyn CompletionProvider>,
    pub allowed_origin: String,
}

impl ServerState {
    pub fn new(provider: Arc<dyn CompletionProvider>, allowed_origin: String) -> Self {
        Self {
            provider,
            allowed_origin,
        }
    }
}

pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = cors_layer(&state.allowed_origin);
    Router::new()
        .route(
            "/autocomplete",
            post(autocomplete).fallback(method_not_allowed),
        )
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// Bind the configured address and serve until the process exits.
pub async fn start_server(config: &CowriterConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server host/port")?;
    let provider = provider_from_config(&config.provider);
    let state = Arc::new(ServerState::new(
        provider,
        config.server.allowed_origin.clone(),
    ));
    let router = build_router(state);

    info!("suggestion backend listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router).await?;
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────

async fn autocomplete(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<Json<SuggestResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (prompt, temperature) = parse_request(&body).map_err(bad_request)?;

    let raw = state
        .provider
        .complete(&prompt, temperature)
        .await
        .map_err(|err| {
            error!("completion provider failed: {err}");
            (provider_status(&err), Json(ErrorResponse::new(err.to_string())))
        })?;

    let trimmed = exclude_prompt_from_suggestion(&prompt, &raw);
    let suggestion = normalize_suggestion(trimmed);
    Ok(Json(SuggestResponse { suggestion }))
}

async fn method_not_allowed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method Not Allowed")),
    )
}

/// Liveness probe for the editor's startup check.
async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        provider: state.provider.name().to_string(),
    })
}

// ── Request validation ──────────────────────────────────────────

/// Decode the request body by hand so the error strings stay exact.
/// `prompt` must be a string; `temperature` may be absent, null, or any
/// JSON number.
fn parse_request(body: &[u8]) -> Result<(String, Option<f64>), &'static str> {
    let value: Value = serde_json::from_slice(body).map_err(|_| "Invalid JSON body")?;
    let Some(object) = value.as_object() else {
        return Err("Invalid JSON body");
    };

    let prompt = object
        .get("prompt")
        .and_then(Value::as_str)
        .ok_or("Missing parameter \"prompt\"")?
        .to_string();

    let temperature = match object.get("temperature") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(raw.as_f64().ok_or("Invalid parameter \"temperature\"")?),
    };

    Ok((prompt, temperature))
}

fn bad_request(message: &'static str) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

/// Upstream failures pass their status through; everything else is a 500.
fn provider_status(error: &ProviderError) -> StatusCode {
    match error {
        ProviderError::Upstream {
            status: Some(code), ..
        } => StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let origin = if allowed_origin.trim() == "*" {
        // A literal wildcard is invalid on credentialed responses, so the
        // permissive default echoes the request origin instead.
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = allowed_origin
            .split(',')
            .filter_map(|entry| entry.trim().parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };
    CorsLayer::new()
        .allow_credentials(true)
        .allow_origin(origin)
        .allow_headers(AllowHeaders::mirror_request())
        .allow_methods([Method::POST, Method::OPTIONS])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prompt_and_temperature() {
        let (prompt, temperature) =
            parse_request(br#"{"prompt": "Hello", "temperature": 0.3}"#).unwrap();
        assert_eq!(prompt, "Hello");
        assert_eq!(temperature, Some(0.3));
    }

    #[test]
    fn temperature_is_optional_and_nullable() {
        let (_, temperature) = parse_request(br#"{"prompt": "Hi"}"#).unwrap();
        assert_eq!(temperature, None);

        let (_, temperature) = parse_request(br#"{"prompt": "Hi", "temperature": null}"#).unwrap();
        assert_eq!(temperature, None);

        let (_, temperature) = parse_request(br#"{"prompt": "Hi", "temperature": 1}"#).unwrap();
        assert_eq!(temperature, Some(1.0));
    }

    #[test]
    fn missing_or_non_string_prompt_is_rejected() {
        assert_eq!(parse_request(br#"{}"#), Err("Missing parameter \"prompt\""));
        assert_eq!(
            parse_request(br#"{"prompt": 42}"#),
            Err("Missing parameter \"prompt\"")
        );
    }

    #[test]
    fn non_numeric_temperature_is_rejected() {
        assert_eq!(
            parse_request(br#"{"prompt": "Hi", "temperature": "warm"}"#),
            Err("Invalid parameter \"temperature\"")
        );
    }

    #[test]
    fn malformed_bodies_are_rejected() {
        assert_eq!(parse_request(b"not json"), Err("Invalid JSON body"));
        assert_eq!(parse_request(br#"["prompt"]"#), Err("Invalid JSON body"));
        assert_eq!(parse_request(b""), Err("Invalid JSON body"));
    }

    #[test]
    fn upstream_status_passes_through() {
        let err = ProviderError::Upstream {
            status: Some(429),
            message: "rate limited".into(),
        };
        assert_eq!(provider_status(&err), StatusCode::TOO_MANY_REQUESTS);

        let err = ProviderError::Upstream {
            status: None,
            message: "no choices".into(),
        };
        assert_eq!(provider_status(&err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
