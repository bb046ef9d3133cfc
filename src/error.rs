//! Error handler for the users service.
//!
//! Every failure is reported to the caller as one of four kinds. Messages of
//! [`ErrorKind::Internal`] errors are always generic: the underlying cause is
//! logged, never serialized.

use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, ServerError>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Kind of failure, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Unauthenticated,
    PermissionDenied,
    Internal,
}

impl ErrorKind {
    /// Machine readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::Unauthenticated => "UNAUTHENTICATED",
            ErrorKind::PermissionDenied => "PERMISSION_DENIED",
            ErrorKind::Internal => "INTERNAL",
        }
    }

    /// HTTP status.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => {
                "There were validation errors with your request."
            },
            ErrorKind::Unauthenticated => "Authentication failed.",
            ErrorKind::PermissionDenied => "Permission denied.",
            ErrorKind::Internal => "Internal server error.",
        }
    }
}

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("email and password are required")]
    Validation(#[from] ValidationErrors),

    #[error("invalid request body")]
    Axum(#[from] JsonRejection),

    /// Unknown email or wrong password. Both share one message.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("login required")]
    LoginRequired,

    #[error("invalid token")]
    InvalidToken,

    #[error("internal server error")]
    Internal {
        details: String,
        source: Option<BoxError>,
    },
}

impl ServerError {
    /// Wrap any error as an [`ErrorKind::Internal`] failure.
    pub fn internal<E>(details: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal {
            details: details.into(),
            source: Some(Box::new(err)),
        }
    }

    /// Kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServerError::Validation(_) | ServerError::Axum(_) => {
                ErrorKind::InvalidArgument
            },
            ServerError::InvalidCredentials | ServerError::LoginRequired => {
                ErrorKind::Unauthenticated
            },
            ServerError::InvalidToken => ErrorKind::PermissionDenied,
            ServerError::Internal { .. } => ErrorKind::Internal,
        }
    }
}

impl From<crate::user::StoreError> for ServerError {
    fn from(err: crate::user::StoreError) -> Self {
        ServerError::internal("credential store access failed", err)
    }
}

/// Structure for detailed error responses.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    r#type: Option<String>,
    title: String,
    status: u16,
    detail: String,
    instance: Option<String>,
    errors: Option<Vec<FieldError>>,
}

impl ResponseError {
    /// Create a response for a given [`ErrorKind`].
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            r#type: Some(kind.code().to_owned()),
            title: kind.title().to_owned(),
            status: kind.status().as_u16(),
            ..Default::default()
        }
    }

    /// Add detailed error.
    pub fn details(mut self, description: &str) -> Self {
        self.detail = description.into();
        self
    }

    /// Automatically add errors field.
    pub fn errors(mut self, errors: &ValidationErrors) -> Self {
        self.errors = Some(parse_validation_errors(errors));
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(
        self,
    ) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            r#type: None,
            title: "Internal server error.".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail: String::default(),
            instance: None,
            errors: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: String,
    message: String,
}

fn parse_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| FieldError {
                field: field.to_string(),
                message: issue
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| issue.code.to_string()),
            })
        })
        .collect()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let response = ResponseError::new(kind).details(&self.to_string());

        let response = match &self {
            ServerError::Validation(validation_errors) => {
                response.errors(validation_errors)
            },

            ServerError::Axum(rejection) => {
                tracing::debug!(%rejection, "rejected request body");
                response
            },

            ServerError::Internal { details, source } => {
                tracing::error!(err = ?source, %details, "server returned 500 status");
                response
            },

            _ => response,
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({
                "type": ErrorKind::Internal.code(),
                "title": "Internal server error.",
                "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "detail": null,
                "instance": null,
                "errors": null,
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}
