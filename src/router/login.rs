//! Authenticate with email and password.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::error::Result;
use crate::router::Body;
use crate::user::{Credentials, Identity};

/// Handler to authenticate a user.
///
/// The returned `token` is the account identifier, to be sent back as
/// `Authorization: Bearer <token>`.
pub async fn handler(
    State(state): State<AppState>,
    Body(credentials): Body<Credentials>,
) -> Result<Json<Identity>> {
    let identity = state.users.authenticate(&credentials).await?;
    Ok(Json(identity))
}
