use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use innkeep_core::bulk::{BatchViolations, PayloadError};
use innkeep_core::error::CoreError;
use innkeep_pipeline::{AcceptError, RouteError, StoreError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors, the pipeline's acceptance and
/// store errors, and adds an HTTP-specific bad-request variant. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `innkeep_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bulk batch was refused before any background work started.
    #[error(transparent)]
    Accept(#[from] AcceptError),

    /// The activity-log store failed on a read path.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut violations: Option<&BatchViolations> = None;

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(CoreError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} with id {id} not found"),
            ),

            // --- Bulk acceptance ---
            AppError::Accept(accept) => match accept {
                AcceptError::Route(route) => {
                    let code = match route {
                        RouteError::MissingHeader => "MISSING_WHOLESALER",
                        RouteError::UnknownWholesaler(_) => "UNKNOWN_WHOLESALER",
                        RouteError::Unsupported { .. } => "UNSUPPORTED_WHOLESALER",
                    };
                    (StatusCode::BAD_REQUEST, code, route.to_string())
                }
                AcceptError::Payload(payload) => match payload {
                    PayloadError::Malformed(_) => (
                        StatusCode::BAD_REQUEST,
                        "MALFORMED_PAYLOAD",
                        payload.to_string(),
                    ),
                    PayloadError::Invalid(found) => {
                        violations = Some(found);
                        (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            "VALIDATION_ERROR",
                            payload.to_string(),
                        )
                    }
                },
                AcceptError::Acceptance(err) => {
                    tracing::error!(error = %err, "Failed to open activity log");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "ACCEPTANCE_FAILED",
                        "The batch could not be accepted, please retry".to_string(),
                    )
                }
            },

            // --- Store / database errors ---
            AppError::Store(StoreError::Database(err)) | AppError::Database(err) => {
                classify_sqlx_error(err)
            }
            AppError::Store(err) => {
                tracing::error!(error = %err, "Activity log store error");
                internal()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(violations) = violations {
            body["violations"] = json!(violations);
        }

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// `RowNotFound` maps to 404; everything else is logged and sanitized.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
