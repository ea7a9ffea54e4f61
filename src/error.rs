use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error as ThisError;

use crate::response::ApiResponse;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{resource} not found with {field}: '{value}'")]
    NotFound {
        resource: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Sorry! This poll has already expired")]
    Expired,

    #[error("you have already voted in this poll")]
    DuplicateVote,

    #[error("{0}")]
    Unauthorized(String),

    // a stored row references an id that no longer resolves; detail is logged, never echoed
    #[error("data integrity violation: {0}")]
    ReferenceNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("dotenv error: {0}")]
    DotEnv(#[from] dotenv::Error),
}

impl Error {
    pub fn not_found(resource: &'static str, field: &'static str, value: impl ToString) -> Self {
        Error::NotFound {
            resource,
            field,
            value: value.to_string(),
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidRequest(_) | Error::Expired => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::DuplicateVote => StatusCode::CONFLICT,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::ReferenceNotFound(_) | Error::Database(_) | Error::Jwt(_) | Error::DotEnv(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("{}", self);
            "internal server error".to_owned()
        } else {
            self.to_string()
        };
        HttpResponse::build(status).json(ApiResponse::failure(message))
    }
}
