//! HTTP API.
pub mod login;
pub mod status;
pub mod users;

use axum::extract::FromRequest;

use crate::ServerError;

/// JSON body whose parsing failures are reported as [`ServerError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct Body<T>(pub T);

#[cfg(test)]
pub(crate) fn state(
    store: std::sync::Arc<crate::user::MemoryCredentialStore>,
) -> crate::AppState {
    use std::sync::Arc;

    crate::AppState {
        config: Arc::new(crate::config::Configuration::default()),
        users: crate::user::UserService::new(
            store,
            Arc::new(crate::crypto::PasswordManager::new()),
        ),
        metrics: None,
    }
}
