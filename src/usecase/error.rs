use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::repository::errors::RepositoryError;

#[derive(Debug, Error)]
pub enum UsecaseError {
    #[error("{0}")]
    Internal(String),
}

impl From<RepositoryError> for UsecaseError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::DatabaseError(msg) => UsecaseError::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for UsecaseError {
    fn from(e: anyhow::Error) -> Self {
        UsecaseError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for UsecaseError {
    fn from(e: serde_json::Error) -> Self {
        UsecaseError::Internal(e.to_string())
    }
}

impl IntoResponse for UsecaseError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            UsecaseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!(error = %self, "internal error");

        (status, self.to_string()).into_response()
    }
}
