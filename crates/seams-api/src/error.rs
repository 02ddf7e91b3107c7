use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error};

use seams_db::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    AccessDenied(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn invalid_token() -> Self {
        Self::AccessDenied("Invalid token".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::AccessDenied(_) => StatusCode::FORBIDDEN,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidInput(reason) => Self::InvalidInput(reason),
            StoreError::AccessDenied(reason) => Self::AccessDenied(reason),
            StoreError::Storage(e) => {
                error!("Store failure: {:#}", e);
                Self::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        debug!("Rejecting request with {}: {}", status, self);

        let body = serde_json::json!({
            "code": status.as_u16(),
            "name": "System Error",
            "message": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}
