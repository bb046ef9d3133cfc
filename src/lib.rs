//! Authentication and role resolution for clinic accounts.

#![forbid(unsafe_code)]
pub mod config;
pub mod crypto;
mod database;
pub mod error;
pub mod role;
mod router;
pub mod telemetry;
pub mod user;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode, header};
use axum::routing::{get, post};
use axum::{Router, middleware as AxumMiddleware};
pub use error::ServerError;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    authorization: Option<&str>,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use tower::util::ServiceExt;

    let mut request = axum::http::Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = authorization {
        request = request.header(header::AUTHORIZATION, token);
    }

    app.oneshot(request.body(axum::body::Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub users: user::UserService,
    pub metrics: Option<PrometheusHandle>,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.timeout);
    let middleware = ServiceBuilder::new()
        // Remove senstive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Dropping the handler on timeout also drops any in-flight query.
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any)
                .vary([header::AUTHORIZATION]),
        );

    Router::new()
        // `GET /status.json` goes to `status`.
        .route("/status.json", get(router::status::status))
        .route("/health", get(router::status::health))
        .route("/metrics", get(router::status::metrics))
        // `POST /auth/login` goes to `login`.
        .route("/auth/login", post(router::login::handler))
        .route("/login", post(router::login::handler))
        .nest("/users", router::users::router(state.clone()))
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state(
    config: Arc<config::Configuration>,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let Some(postgres) = &config.postgres else {
        tracing::error!("missing `postgres` entry on `config.yaml` file");
        return Err("missing `postgres` configuration".into());
    };
    let db = database::Database::from_config(postgres).await?;

    let users = user::UserService::new(
        Arc::new(user::UserRepository::new(db.postgres)),
        Arc::new(crypto::PasswordManager::new()),
    );

    Ok(AppState {
        config,
        users,
        metrics: None,
    })
}
