use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use super::super::helpers::error_chain_fmt;
use super::types::ApiResponse;

#[derive(thiserror::Error)]
pub enum ProjectError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Project not found")]
    NotFound,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for ProjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ProjectError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProjectError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ProjectError::NotFound => StatusCode::NOT_FOUND,
            ProjectError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // `anyhow` displays only the outermost context, so the database error itself stays in the logs.
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::failure(self.to_string()))
    }
}
