//! Caller authorization.
//!
//! Requests name their caller with `Authorization: Bearer <user_id>`, the
//! token returned by `/auth/login`.

use axum::extract::{Request, State};
use axum::http::header;
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Json, Router, middleware};

use crate::user::{ANONYMOUS, Caller};
use crate::{AppState, ServerError};

const BEARER: &str = "Bearer ";

/// Read caller identifier from `Authorization` header.
///
/// Anything missing, not a number or out of range is [`ANONYMOUS`].
fn caller_id(req: &Request) -> i32 {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .map(|token| token.strip_prefix(BEARER).unwrap_or(token).trim())
        .and_then(|token| token.parse::<i32>().ok())
        .unwrap_or(ANONYMOUS)
}

/// Custom middleware for authorization.
///
/// Resolves the caller role and makes [`Caller`] available to handlers.
pub async fn authorize(
    State(state): State<AppState>,
    mut req: Request,
    next: middleware::Next,
) -> Result<Response, ServerError> {
    let user_id = caller_id(&req);
    let role = state.users.resolve_role(user_id).await?;

    req.extensions_mut().insert(Caller { user_id, role });
    Ok(next.run(req).await)
}

async fn role(Extension(caller): Extension<Caller>) -> Json<Caller> {
    Json(caller)
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        // `GET /users/@me/role` goes to `role`. Authorization required.
        .route("/@me/role", get(role))
        .route_layer(middleware::from_fn_with_state(state, authorize))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;

    use super::*;
    use crate::role::Role;
    use crate::user::MemoryCredentialStore;
    use crate::{app, make_request};

    fn store() -> Arc<MemoryCredentialStore> {
        Arc::new(
            MemoryCredentialStore::default()
                .with_account(1, "Ana Souza", "ana@clinica.com", "-", "ADMINISTRADOR")
                .with_account(9, "Igor Nunes", "igor@clinica.com", "-", "ESTAGIARIO"),
        )
    }

    async fn get_role(
        store: Arc<MemoryCredentialStore>,
        token: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let app = app(crate::router::state(store));
        let response =
            make_request(app, Method::GET, "/users/@me/role", token, String::default())
                .await;
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();

        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_caller_id() {
        let request = |value: Option<&str>| {
            let mut builder = axum::http::Request::builder();
            if let Some(value) = value {
                builder = builder.header(header::AUTHORIZATION, value);
            }
            builder.body(axum::body::Body::empty()).unwrap()
        };

        assert_eq!(caller_id(&request(Some("Bearer 42"))), 42);
        assert_eq!(caller_id(&request(Some("42"))), 42);
        assert_eq!(caller_id(&request(Some("Bearer abc"))), ANONYMOUS);
        assert_eq!(caller_id(&request(Some("Bearer Bearer 5"))), ANONYMOUS);
        assert_eq!(caller_id(&request(Some("Bearer 99999999999"))), ANONYMOUS);
        assert_eq!(caller_id(&request(Some(""))), ANONYMOUS);
        assert_eq!(caller_id(&request(None)), ANONYMOUS);
    }

    #[tokio::test]
    async fn test_role_handler() {
        let (status, body) = get_role(store(), Some("Bearer 1")).await;

        assert_eq!(status, StatusCode::OK);
        let caller: Caller = serde_json::from_value(body).unwrap();
        assert_eq!(
            caller,
            Caller {
                user_id: 1,
                role: Role::Administrador
            }
        );
    }

    #[tokio::test]
    async fn test_unrecognized_role() {
        let (status, body) = get_role(store(), Some("Bearer 9")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "UNKNOWN");
    }

    #[tokio::test]
    async fn test_login_required() {
        let store = store();

        for token in [
            None,
            Some("Bearer 0"),
            Some("Bearer not-a-number"),
            Some("Bearer Bearer 1"),
            Some("Bearer 99999999999"),
        ] {
            let (status, body) = get_role(store.clone(), token).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["detail"], "login required");
        }
        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let (status, body) = get_role(store(), Some("Bearer 404")).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["type"], "PERMISSION_DENIED");
        assert_eq!(body["detail"], "invalid token");
    }

    #[tokio::test]
    async fn test_store_failure() {
        let store = store();
        store.set_unavailable(true);

        let (status, body) = get_role(store, Some("Bearer 1")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "internal server error");
    }
}
