//! HTTP error mapping.

use access_map_ai::AiError;
use access_map_database::StoreError;
use access_map_report_models::InvalidRecordError;
use access_map_server_models::ErrorBody;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError, error};

/// Errors returned by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was malformed or failed validation.
    #[error("{0}")]
    Validation(String),

    /// The requested record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Narrative generation failed.
    #[error("Failed to generate report")]
    Generation(#[from] AiError),

    /// The record store failed.
    #[error("Something went wrong!")]
    Store(#[from] StoreError),
}

impl From<InvalidRecordError> for ApiError {
    fn from(e: InvalidRecordError) -> Self {
        Self::Validation(e.message)
    }
}

impl ApiError {
    /// Internal cause, for server-side failures only.
    fn detail(&self) -> Option<String> {
        match self {
            Self::Validation(_) | Self::NotFound(_) => None,
            Self::Generation(e) => Some(e.to_string()),
            Self::Store(e) => Some(e.to_string()),
        }
    }

    /// Builds the response body, including the internal cause only when
    /// `include_detail` is set.
    #[must_use]
    pub fn body(&self, include_detail: bool) -> ErrorBody {
        ErrorBody {
            message: self.to_string(),
            error: self.detail().filter(|_| include_detail),
        }
    }
}

/// Whether `APP_ENV` selects development mode.
fn is_development() -> bool {
    std::env::var("APP_ENV").is_ok_and(|env| env == "development")
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Generation(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Some(detail) = self.detail() {
            log::error!("{self}: {detail}");
        }
        HttpResponse::build(self.status_code()).json(self.body(is_development()))
    }
}

/// Maps JSON body extraction failures to a validation error.
pub fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(err.to_string()).into()
}

/// Maps query string extraction failures to a validation error.
pub fn query_error_handler(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(err.to_string()).into()
}

/// Maps path extraction failures (e.g. a malformed ID) to a validation
/// error.
pub fn path_error_handler(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(err.to_string()).into()
}
