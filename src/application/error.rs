use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::application::forms::FieldError;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;
use crate::infra::error::InfraError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("resource not found")]
    NotFound,
    #[error("caller is not allowed to modify this resource")]
    Forbidden,
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl AppError {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound
            | AppError::Domain(DomainError::NotFound { .. })
            | AppError::Repo(RepoError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::Domain(DomainError::Validation { .. }) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Repo(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Infra(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            AppError::NotFound
            | AppError::Domain(DomainError::NotFound { .. })
            | AppError::Repo(RepoError::NotFound) => "Resource not found",
            AppError::Forbidden => "Not allowed",
            AppError::Validation(_) | AppError::Domain(DomainError::Validation { .. }) => {
                "Request could not be processed"
            }
            AppError::Repo(_) => "Service temporarily unavailable",
            AppError::Infra(_) => "Unexpected error occurred",
        }
    }
}

/// Fallback mapping for errors the handlers do not translate themselves.
/// NotFound, Forbidden, and Validation get richer treatment (rendered pages,
/// redirects, form re-renders) at the HTTP layer.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, self.public_message()).into_response()
    }
}
