use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    admin::{AdminError, ValidationError},
    quiz::QuizError,
    repository::RepositoryError,
};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unknown quiz session")]
    UnknownSession,

    #[error("Malformed payload")]
    MalformedPayload,

    #[error("{0}")]
    Quiz(#[from] QuizError),

    #[error("{0}")]
    RepositoryRead(String),

    #[error("{0}")]
    RepositoryWrite(String),

    #[error("{0}")]
    Upload(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UnknownSession => StatusCode::NOT_FOUND,
            AppError::MalformedPayload => StatusCode::BAD_REQUEST,
            AppError::Quiz(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::RepositoryRead(_) => StatusCode::BAD_GATEWAY,
            AppError::RepositoryWrite(_) => StatusCode::BAD_GATEWAY,
            AppError::Upload(_) => StatusCode::BAD_GATEWAY,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl From<AdminError> for AppError {
    fn from(error: AdminError) -> Self {
        match error {
            AdminError::Repository(RepositoryError::Read(cause)) => AppError::RepositoryRead(cause),
            AdminError::Repository(RepositoryError::Write(cause)) => {
                AppError::RepositoryWrite(cause)
            }
            AdminError::Repository(RepositoryError::Upload(cause)) => AppError::Upload(cause),
            AdminError::Validation(e) => AppError::Validation(e),
            AdminError::BadPosition(_) => AppError::MalformedPayload,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
