use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

use crate::auth::AuthError;
use crate::models::ValidationError;
use crate::repo::RepoError;
use crate::thread_detail::ThreadDetailError;

pub const SERVER_FAILURE_MESSAGE: &str = "terjadi kegagalan pada server kami";

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub status: &'static str,
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")] BadRequest(String),
    #[error("{0}")] Unauthorized(String),
    #[error("{0}")] Forbidden(String),
    #[error("{0}")] NotFound(String),
    #[error("{}", SERVER_FAILURE_MESSAGE)] Internal,
}

impl ApiError {
    /// Translate a repository error, naming the missing resource on `NotFound`.
    pub fn from_repo(e: RepoError, not_found: &str) -> Self {
        match e {
            RepoError::NotFound => ApiError::NotFound(not_found.to_string()),
            other => other.into(),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound => ApiError::NotFound("resource tidak ditemukan".into()),
            RepoError::Conflict => ApiError::BadRequest("data sudah ada".into()),
            RepoError::Internal(msg) => {
                tracing::error!("repository failure: {msg}");
                ApiError::Internal
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        tracing::error!("auth failure: {e}");
        ApiError::Internal
    }
}

impl From<ThreadDetailError> for ApiError {
    fn from(e: ThreadDetailError) -> Self {
        tracing::error!("thread detail aggregation failed: {e}");
        ApiError::Internal
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = if matches!(self, ApiError::Internal) { "error" } else { "fail" };
        HttpResponse::build(self.status_code()).json(ApiErrorBody { status, message: self.to_string() })
    }
}
