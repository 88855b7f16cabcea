use actix_web::{HttpResponse, ResponseError, body::BoxBody, http::StatusCode};
use serde::Serialize;
use weather_core::{StorageError, UpstreamError, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Endpoint not found")]
    RouteNotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    /// Message sent to the client. Server-side failures get a fixed text;
    /// the cause only goes to the log.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Validation(e) => e.to_string(),
            ApiError::Upstream(e) => {
                format!("Failed to fetch weather data from upstream provider ({})", e.kind())
            }
            ApiError::Storage(e) => match e {
                StorageError::NotFound(_) => "File not found".to_string(),
                StorageError::InvalidContent(_) => "Invalid JSON file".to_string(),
                StorageError::Write { .. } => "Failed to store weather data".to_string(),
                StorageError::List(_) => "Failed to list files".to_string(),
                StorageError::Read { .. } => "Failed to retrieve file content".to_string(),
                StorageError::Backend(_) => "Internal server error".to_string(),
            },
            ApiError::RouteNotFound | ApiError::MethodNotAllowed => self.to_string(),
        }
    }

    fn kind(&self) -> String {
        match self {
            ApiError::Validation(_) => "validation".to_string(),
            ApiError::Upstream(e) => e.kind(),
            ApiError::Storage(e) => e.kind().to_string(),
            ApiError::RouteNotFound => "route_not_found".to_string(),
            ApiError::MethodNotAllowed => "method_not_allowed".to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Storage(StorageError::NotFound(_)) | ApiError::RouteNotFound => {
                StatusCode::NOT_FOUND
            }
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = %self.kind(), "request failed: {self}");
        } else {
            tracing::debug!("request rejected: {self}");
        }

        HttpResponse::build(status).json(ErrorResponse { error: self.client_message() })
    }
}
