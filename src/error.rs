use crate::core::{RemovalError, ValidationError};
use crate::models::ErrorResponse;
use crate::services::HmaError;
use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse};
use thiserror::Error;

/// Everything a console request can fail with
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("HMA is unreachable: {0}")]
    Transport(String),

    #[error("{0}")]
    NothingToRemove(&'static str),

    #[error("Failed to set credentials: {message}")]
    CredentialsRejected { status: Option<u16>, message: String },

    #[error("Invalid upload: {0}")]
    Multipart(String),

    #[error("Removal aborted: {0}")]
    Removal(#[from] RemovalError),
}

impl ConsoleError {
    pub fn code(&self) -> &'static str {
        match self {
            ConsoleError::Validation(_) => "validation_failed",
            ConsoleError::Upstream { .. } => "upstream_error",
            ConsoleError::Transport(_) => "upstream_unreachable",
            ConsoleError::NothingToRemove(_) => "no_matching_content",
            ConsoleError::CredentialsRejected { .. } => "credentials_rejected",
            ConsoleError::Multipart(_) => "invalid_upload",
            ConsoleError::Removal(_) => "internal_error",
        }
    }

    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ConsoleError::Upstream { status, .. } => Some(*status),
            ConsoleError::CredentialsRejected { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<HmaError> for ConsoleError {
    fn from(err: HmaError) -> Self {
        match err {
            HmaError::RequestError(e) => ConsoleError::Transport(e.to_string()),
            HmaError::ApiError { status, message } => ConsoleError::Upstream { status, message },
            HmaError::NotFound(message) => ConsoleError::Upstream {
                status: StatusCode::NOT_FOUND.as_u16(),
                message,
            },
            HmaError::InvalidResponse(message) => ConsoleError::Upstream {
                status: StatusCode::OK.as_u16(),
                message,
            },
        }
    }
}

impl From<actix_multipart::MultipartError> for ConsoleError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        ConsoleError::Multipart(err.to_string())
    }
}

impl error::ResponseError for ConsoleError {
    fn status_code(&self) -> StatusCode {
        match self {
            ConsoleError::Validation(_) | ConsoleError::Multipart(_) => StatusCode::BAD_REQUEST,
            ConsoleError::NothingToRemove(_) => StatusCode::NOT_FOUND,
            ConsoleError::Upstream { .. }
            | ConsoleError::Transport(_)
            | ConsoleError::CredentialsRejected { .. } => StatusCode::BAD_GATEWAY,
            ConsoleError::Removal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
            upstream_status: self.upstream_status(),
        })
    }
}

/// JSON error response for extractor payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}
