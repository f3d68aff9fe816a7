use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum HomeMatchError {
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid geometry: {0}")]
    Geometry(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("HTTP request error: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HomeMatchError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::Jwt(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::Geometry(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream(_) | Self::UpstreamStatus(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Io(_) | Self::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HomeMatchError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match &self {
            Self::Unauthorized(reason) => ApiErrorBody {
                code: "UNAUTHORIZED".to_string(),
                message: format!("Authentication required: {reason}."),
            },
            Self::Jwt(_) => ApiErrorBody {
                code: "UNAUTHORIZED".to_string(),
                message: "Invalid or expired access token.".to_string(),
            },
            Self::Validation(msg) | Self::Geometry(msg) => ApiErrorBody {
                code: "BAD_REQUEST".to_string(),
                message: msg.clone(),
            },
            Self::NotFound(what) => ApiErrorBody {
                code: "NOT_FOUND".to_string(),
                message: format!("{what} not found."),
            },
            Self::Conflict(msg) => ApiErrorBody {
                code: "CONFLICT".to_string(),
                message: msg.clone(),
            },
            Self::PayloadTooLarge => ApiErrorBody {
                code: "PAYLOAD_TOO_LARGE".to_string(),
                message: "request body too large".to_string(),
            },
            Self::Upstream(_) | Self::UpstreamStatus(_) => {
                error!(error = %self, "upstream call failed");
                ApiErrorBody {
                    code: "BAD_GATEWAY".to_string(),
                    message: "Upstream service is unavailable.".to_string(),
                }
            }
            Self::Database(_) | Self::Io(_) | Self::Json(_) => {
                error!(error = %self, "request failed");
                ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                }
            }
        };
        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
