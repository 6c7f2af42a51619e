// API error module
// Error taxonomy shared by all handlers and its HTTP mapping

use hyper::StatusCode;
use thiserror::Error;

use super::types::UnsupportedResponse;
use crate::gateway::CanonicalResponse;
use crate::http::{build_error_response, build_json_response};
use crate::store::StoreError;

/// Handler failure, mapped to a reply by [`ApiError::into_response`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed input or missing required field (400)
    #[error("{0}")]
    BadRequest(String),
    /// Unknown document or route (404)
    #[error("{0}")]
    NotFound(String),
    /// Feature not available in this deployment; answered with 200 and `success: false`
    #[error("{0}")]
    Unsupported(String),
    /// Anything else (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unsupported(_) => StatusCode::OK,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> CanonicalResponse {
        let status = self.status();
        match self {
            Self::Unsupported(message) => build_json_response(
                status,
                &UnsupportedResponse {
                    success: false,
                    message,
                },
            ),
            Self::BadRequest(message) | Self::NotFound(message) | Self::Internal(message) => {
                build_error_response(status, &message)
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound("File not found".to_string()),
        }
    }
}
