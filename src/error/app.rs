use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use myapp_schema::{PROBLEM_JSON, ProblemBody};
use thiserror::Error as ThisError;
use tracing::{debug, error, warn};

#[derive(Debug, ThisError)]
pub enum AppError {
    /// Client supplied an id where forbidden, or a missing/mismatched id on a mutation.
    #[error("{message}")]
    InvalidArgument {
        entity_name: String,
        error_key: &'static str,
        message: String,
    },

    #[error("Entity not found")]
    NotFound {
        entity_name: Option<String>,
        error_key: Option<&'static str>,
    },

    /// Mutation attempted on a path without an id segment.
    #[error("Method not allowed")]
    MethodNotAllowed { allow: &'static str },

    #[error("Invalid request payload: {0}")]
    BadPayload(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl AppError {
    pub fn invalid_argument(
        entity_name: impl Into<String>,
        error_key: &'static str,
        message: impl Into<String>,
    ) -> Self {
        AppError::InvalidArgument {
            entity_name: entity_name.into(),
            error_key,
            message: message.into(),
        }
    }

    /// Plain 404 with no entity metadata (lookups, unknown routes).
    pub fn not_found() -> Self {
        AppError::NotFound {
            entity_name: None,
            error_key: None,
        }
    }

    /// 404 raised by a mutation that requires the row to exist.
    pub fn entity_not_found(entity_name: impl Into<String>) -> Self {
        AppError::NotFound {
            entity_name: Some(entity_name.into()),
            error_key: Some("idnotfound"),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument { .. } | AppError::BadPayload(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::DatabaseError(_) | AppError::UnexpectedError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Failure metadata left in response extensions for the alert-header middleware.
///
/// The middleware knows the application name; the error does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureAlert {
    pub entity_name: String,
    pub error_key: &'static str,
    pub default_message: String,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadPayload(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadPayload(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let status_code = status.as_u16();
        let mut failure = None;
        let mut allow = None;

        let body = match self {
            AppError::InvalidArgument {
                entity_name,
                error_key,
                message,
            } => {
                warn!(entity = %entity_name, error_key, "{message}");
                failure = Some(FailureAlert {
                    entity_name: entity_name.clone(),
                    error_key,
                    default_message: message.clone(),
                });
                ProblemBody::with_message(status_code, message, entity_name, error_key)
            }

            AppError::NotFound {
                entity_name: Some(entity_name),
                error_key: Some(error_key),
            } => ProblemBody::with_message(status_code, "Entity not found", entity_name, error_key),

            AppError::NotFound { .. } => ProblemBody::http(status_code, "Not Found"),

            AppError::MethodNotAllowed { allow: methods } => {
                allow = Some(methods);
                ProblemBody::http(status_code, "Method Not Allowed")
            }

            AppError::BadPayload(detail) => {
                debug!(detail = %detail, "rejected request payload");
                ProblemBody::http(status_code, "Bad Request")
            }

            AppError::DatabaseError(e) => {
                error!(error = %e, "storage operation failed");
                ProblemBody::http(status_code, "Internal Server Error")
            }

            AppError::UnexpectedError(e) => {
                error!(error = %e, "unexpected failure");
                ProblemBody::http(status_code, "Internal Server Error")
            }
        };

        let mut resp = (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON))],
            Json(body),
        )
            .into_response();

        if let Some(methods) = allow {
            resp.headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(methods));
        }
        if let Some(failure) = failure {
            resp.extensions_mut().insert(failure);
        }
        resp
    }
}
