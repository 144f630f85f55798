use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Application error taxonomy; each variant maps to one HTTP status.
///
/// All authentication failures collapse into `Unauthenticated` with a single
/// generic body, and `NotFound` covers both missing and not-owned resources,
/// so responses never confirm whether a record exists for someone else.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Too many requests")]
    RateLimited,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Upstream error: {0}")]
    Upstream(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(ref msg) => {
                debug!("validation error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            ApiError::Conflict(ref msg) => {
                debug!("conflict: {}", msg);
                (StatusCode::CONFLICT, msg.clone())
            }
            ApiError::Unauthenticated => {
                warn!("request not authenticated");
                (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
            }
            ApiError::NotFound(what) => {
                debug!("{} not found", what);
                (StatusCode::NOT_FOUND, format!("{} not found", what))
            }
            ApiError::RateLimited => {
                warn!("rate limit exceeded");
                (StatusCode::TOO_MANY_REQUESTS, "Too many requests".to_string())
            }
            ApiError::Database(ref e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Upstream(ref e) => {
                error!(error = %e, "upstream error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// True when the error is a Postgres unique-constraint violation; used to
/// turn the register/update insert race into a `Conflict`.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        let cases = [
            (
                ApiError::Validation("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Conflict("Email already registered".into()),
                StatusCode::CONFLICT,
            ),
            (ApiError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ApiError::NotFound("Photo"), StatusCode::NOT_FOUND),
            (ApiError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (
                ApiError::Upstream(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn server_errors_hide_internal_detail() {
        let res = ApiError::Upstream(anyhow::anyhow!("secret bucket name")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Body is the generic message, never the inner error text.
    }
}
