//! Public status and health pages.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::AppState;
use crate::error::Result;

/// Structured configuration.
#[derive(Serialize)]
pub struct Status {
    version: String,
    name: String,
}

/// Public server status (configuration).
pub async fn status(State(state): State<AppState>) -> Json<Status> {
    Json(Status {
        version: state.config.version().to_owned(),
        name: state.config.name.clone(),
    })
}

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
}

/// Liveness, including a round trip to the credential store.
pub async fn health(State(state): State<AppState>) -> Result<Json<Health>> {
    state.users.ping().await?;
    Ok(Json(Health { status: "healthy" }))
}

/// Prometheus exposition of the installed recorder.
pub async fn metrics(
    State(state): State<AppState>,
) -> std::result::Result<String, StatusCode> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or(StatusCode::NOT_FOUND)
}
