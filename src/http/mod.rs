//! HTTP transport: the turn endpoint and a config probe.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::models::turn::{Sender, TurnReply, TurnRequest};
use crate::session::SessionManager;
use crate::{AppError, Result};

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    /// Session manager owning the live conversation.
    pub manager: Arc<SessionManager>,
    /// Application configuration.
    pub config: Arc<AppConfig>,
}

/// Build the application router.
#[must_use]
pub fn router(state: ApiState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(chat))
        .route("/config", get(config_probe))
        .layer(cors)
        .with_state(state)
}

/// Bind the configured port and serve until shutdown.
///
/// # Errors
///
/// Returns `AppError::Http` if binding or serving fails.
pub async fn serve(state: ApiState, shutdown: impl std::future::Future<Output = ()> + Send + 'static) -> Result<()> {
    let addr = format!("0.0.0.0:{}", state.config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|err| AppError::Http(format!("failed to bind {addr}: {err}")))?;

    info!(%addr, "turn API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|err| AppError::Http(format!("server failed: {err}")))
}

/// `POST /chat` — run one turn of the conversation.
async fn chat(
    State(state): State<ApiState>,
    Json(request): Json<TurnRequest>,
) -> std::result::Result<Json<TurnReply>, (StatusCode, String)> {
    state
        .manager
        .process_message(&request.message, request.language, Sender::Human)
        .await
        .map(Json)
        .map_err(|err| {
            error!(%err, "turn failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        })
}

/// `GET /config` — version probe for the frontend.
async fn config_probe(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "software_version": state.config.software_version,
    }))
}
