//! Mapping from domain errors to HTTP responses
//!
//! Every session verdict that the caller can resolve by logging in again is
//! a 401 with a distinct error code. Store failures are 500s so clients can
//! tell "retry later" apart from "re-authenticate".

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::collections::HashMap;
use tracing::error;

use blog_core::errors::{AuthError, DomainError, TokenError};
use blog_shared::{error_codes, ErrorResponse};

/// Extension trait for ErrorResponse to add actix-web specific methods
pub trait ErrorResponseExt {
    fn to_response(&self, status: StatusCode) -> HttpResponse;
}

impl ErrorResponseExt for ErrorResponse {
    fn to_response(&self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

/// Error type returned by every handler and the auth middleware
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    MissingCredentials(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Auth(e) => ApiError::Auth(e),
            DomainError::Token(e) => ApiError::Token(e),
            DomainError::Validation { message } => ApiError::BadRequest(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Token(TokenError::InvalidToken | TokenError::UnknownTokenType) => {
                error_codes::TOKEN_INVALID
            }
            ApiError::Token(TokenError::SessionExpired) => error_codes::SESSION_EXPIRED,
            ApiError::Token(TokenError::RefreshExpired) => error_codes::TOKEN_STALE,
            ApiError::Token(TokenError::InBlackList) => error_codes::TOKEN_REVOKED,
            ApiError::Token(TokenError::InternalServer) => error_codes::INTERNAL_ERROR,
            ApiError::Auth(AuthError::InvalidCredentials) => error_codes::INVALID_CREDENTIALS,
            ApiError::Auth(AuthError::UserAlreadyExists) => error_codes::CONFLICT,
            ApiError::Validation(_) => error_codes::VALIDATION_ERROR,
            ApiError::BadRequest(_) => error_codes::BAD_REQUEST,
            ApiError::MissingCredentials(_) => error_codes::UNAUTHORIZED,
            ApiError::NotFound(_) => error_codes::NOT_FOUND,
            ApiError::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }

    fn field_errors(errors: &validator::ValidationErrors) -> HashMap<String, Vec<String>> {
        errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect()
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Token(TokenError::InternalServer) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Token(_) | ApiError::MissingCredentials(_) => StatusCode::UNAUTHORIZED,
            ApiError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            ApiError::Auth(AuthError::UserAlreadyExists) => StatusCode::CONFLICT,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let response = match self {
            ApiError::Internal(detail) => {
                error!("Internal error: {}", detail);
                ErrorResponse::new(self.code(), "An internal error occurred")
            }
            ApiError::Token(TokenError::InternalServer) => {
                ErrorResponse::new(self.code(), "An internal error occurred")
            }
            ApiError::Validation(errors) => ErrorResponse::new(self.code(), self.to_string())
                .add_detail("fields", Self::field_errors(errors)),
            _ => ErrorResponse::new(self.code(), self.to_string()),
        };

        response.to_response(status)
    }
}
