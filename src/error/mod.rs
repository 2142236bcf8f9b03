use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Internal(String),
    BadRequest(String),
    Configuration(String),
    Serialization(String),
    LockPoisoned(String),
    TooManyRequests(String),
    /// Upstream answered with a non-2xx status; we relay that status and
    /// attach the upstream body as `details`.
    UpstreamStatus {
        message: String,
        status: u16,
        details: Value,
    },
    /// Upstream answered 2xx but the payload is missing the fields we read.
    UpstreamShape { message: String, details: Value },
    UpstreamTimeout(String),
    External(String),
}

/// Outward error envelope: `{error, details?}`.
#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
            AppError::BadRequest(e) => write!(f, "Bad request: {}", e),
            AppError::Configuration(e) => write!(f, "Configuration error: {}", e),
            AppError::Serialization(e) => write!(f, "Serialization error: {}", e),
            AppError::LockPoisoned(e) => write!(f, "Lock poisoned: {}", e),
            AppError::TooManyRequests(e) => write!(f, "Too many requests: {}", e),
            AppError::UpstreamStatus {
                message, status, ..
            } => write!(f, "Upstream error ({}): {}", status, message),
            AppError::UpstreamShape { message, .. } => {
                write!(f, "Upstream shape error: {}", message)
            }
            AppError::UpstreamTimeout(e) => write!(f, "Upstream timeout: {}", e),
            AppError::External(e) => write!(f, "External service error: {}", e),
        }
    }
}

impl StdError for AppError {}

impl AppError {
    /// Message as shown to the caller, without the prefix `Display` adds
    /// for logs.
    fn client_message(&self) -> String {
        match self {
            AppError::Internal(e)
            | AppError::BadRequest(e)
            | AppError::Configuration(e)
            | AppError::Serialization(e)
            | AppError::LockPoisoned(e)
            | AppError::TooManyRequests(e)
            | AppError::UpstreamTimeout(e)
            | AppError::External(e) => e.clone(),
            AppError::UpstreamStatus { message, .. } => message.clone(),
            AppError::UpstreamShape { message, .. } => message.clone(),
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            AppError::UpstreamStatus { details, .. }
            | AppError::UpstreamShape { details, .. } => {
                (!details.is_null()).then(|| details.clone())
            }
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::LockPoisoned(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::UpstreamStatus { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::UpstreamShape { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::External(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = ErrorResponse {
            error: self.client_message(),
            details: self.details(),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(error: actix_multipart::MultipartError) -> Self {
        AppError::BadRequest(format!("Multipart error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Serialization(format!("JSON serialization error: {}", error))
    }
}

// Define AppResult type alias for Result<T, AppError>
pub type AppResult<T> = Result<T, AppError>;
