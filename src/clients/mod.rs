pub mod openai_client;
pub mod vision_client;

pub use openai_client::*;
pub use vision_client::*;

use crate::error::AppError;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamService {
    Vision,
    OpenAi,
}

impl fmt::Display for UpstreamService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamService::Vision => write!(f, "vision"),
            UpstreamService::OpenAi => write!(f, "openai"),
        }
    }
}

/// Failure modes shared by both upstream clients. No retries anywhere;
/// the first failure is surfaced to the caller.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} returned status {status}")]
    Status {
        service: UpstreamService,
        status: u16,
        body: Value,
    },
    #[error("{service} returned an unexpected payload")]
    Shape {
        service: UpstreamService,
        body: Value,
    },
    #[error("{service} request timed out")]
    Timeout { service: UpstreamService },
    #[error("{service} request failed: {source}")]
    Transport {
        service: UpstreamService,
        #[source]
        source: reqwest::Error,
    },
}

impl UpstreamError {
    pub fn from_reqwest(service: UpstreamService, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            UpstreamError::Timeout { service }
        } else {
            UpstreamError::Transport {
                service,
                source: error,
            }
        }
    }
}

pub(crate) fn request_failed_message(service: UpstreamService) -> &'static str {
    match service {
        UpstreamService::Vision => "Google Vision API リクエストが失敗しました",
        UpstreamService::OpenAi => "OpenAI API リクエストが失敗しました",
    }
}

pub(crate) fn invalid_response_message(service: UpstreamService) -> &'static str {
    match service {
        UpstreamService::Vision => "Google Vision API から有効なレスポンスが返されませんでした",
        UpstreamService::OpenAi => "OpenAI API から有効なレスポンスが返されませんでした",
    }
}

impl From<UpstreamError> for AppError {
    fn from(error: UpstreamError) -> Self {
        match error {
            UpstreamError::Status {
                service,
                status,
                body,
            } => AppError::UpstreamStatus {
                message: request_failed_message(service).to_string(),
                status,
                details: body,
            },
            UpstreamError::Shape { service, body } => AppError::UpstreamShape {
                message: invalid_response_message(service).to_string(),
                details: body,
            },
            UpstreamError::Timeout { .. } => AppError::UpstreamTimeout(
                "上流サービスへのリクエストがタイムアウトしました。もう一度お試しください。"
                    .to_string(),
            ),
            UpstreamError::Transport { service, source } => AppError::External(format!(
                "{}: {}",
                request_failed_message(service),
                source
            )),
        }
    }
}
