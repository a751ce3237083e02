//! HTTP error responses for the web adapter.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::error::PapertradeError;

pub fn status_for(err: &PapertradeError) -> StatusCode {
    match err {
        PapertradeError::Validation { .. }
        | PapertradeError::SymbolNotFound { .. }
        | PapertradeError::ConfigMissing { .. }
        | PapertradeError::ConfigInvalid { .. }
        | PapertradeError::ConfigParse { .. } => StatusCode::BAD_REQUEST,
        PapertradeError::InsufficientFunds { .. }
        | PapertradeError::InsufficientShares { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PapertradeError::DuplicateUsername { .. } => StatusCode::CONFLICT,
        PapertradeError::AuthenticationFailed => StatusCode::FORBIDDEN,
        PapertradeError::Database { .. }
        | PapertradeError::DatabaseQuery { .. }
        | PapertradeError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error rendered as an HTML apology page.
#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<PapertradeError> for WebError {
    fn from(err: PapertradeError) -> Self {
        Self::new(status_for(&err), err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let template = super::templates::ErrorTemplate {
            message: &self.message,
            status: self.status.as_u16(),
        };
        match template.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(_) => (self.status, self.message).into_response(),
        }
    }
}

/// Error rendered as a JSON body for the `/api` routes.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ApiErrorBody {
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<PapertradeError> for ApiError {
    fn from(err: PapertradeError) -> Self {
        Self::new(status_for(&err), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiErrorBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}
