use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::provider::ProviderError;

pub type Result<T> = std::result::Result<T, TranscriptionError>;

/// Transcription endpoint errors with `OpenAI`-compatible status codes
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// No `Authorization` header on the request
    #[error("No authorization header provided")]
    MissingAuthorization,

    /// `Authorization` header present but carries no token
    #[error("Invalid authorization header format")]
    InvalidAuthorization,

    /// Neither `file` nor `audio_url` supplied
    #[error("Either 'file' or 'audio_url' parameter is required")]
    MissingAudioInput,

    /// Both `file` and `audio_url` supplied
    #[error("Provide either 'file' or 'audio_url', not both")]
    ConflictingAudioInput,

    /// `audio_url` is not an http(s) URL to a recognised audio file
    #[error("Invalid audio URL format or unsupported audio type")]
    InvalidAudioUrl,

    /// Uploading the file to the provider failed
    #[error("Failed to upload file: {0}")]
    FileUpload(String),

    /// Model identifier has no provider equivalent
    #[error("Invalid model '{0}'. Valid AssemblyAI speech models are: best, slam-1, universal, nano")]
    InvalidModel(String),

    /// Prompt configuration has a known key with the wrong value type
    #[error("Invalid transcription config in prompt: {0}")]
    InvalidPromptConfig(String),

    /// Malformed form data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request body exceeds the configured limit
    #[error("Request body exceeds the limit of {0} bytes")]
    PayloadTooLarge(usize),

    /// Classified provider failure; the provider message is shown verbatim
    #[error("{message}")]
    Upstream { kind: UpstreamErrorKind, message: String },

    /// Unexpected failure, details are logged and never returned
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl TranscriptionError {
    /// Classify a failed provider call
    pub fn from_provider(error: &ProviderError) -> Self {
        let message = error.to_string();

        Self::Upstream {
            kind: UpstreamErrorKind::classify(&message),
            message,
        }
    }

    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuthorization | Self::InvalidAuthorization => StatusCode::UNAUTHORIZED,
            Self::MissingAudioInput
            | Self::ConflictingAudioInput
            | Self::InvalidAudioUrl
            | Self::FileUpload(_)
            | Self::InvalidModel(_)
            | Self::InvalidPromptConfig(_)
            | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream { kind, .. } => kind.status_code(),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string for the response
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::MissingAuthorization | Self::InvalidAuthorization => "authentication_error",
            Self::Upstream { kind, .. } => kind.error_type(),
            Self::Internal(_) => "api_error",
            _ => "invalid_request_error",
        }
    }

    /// Machine-readable code, if this error has one
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::MissingAuthorization => Some("missing_authorization"),
            Self::InvalidAuthorization => Some("invalid_authorization"),
            Self::MissingAudioInput => Some("missing_audio_input"),
            Self::ConflictingAudioInput => Some("conflicting_audio_input"),
            Self::InvalidAudioUrl => Some("invalid_audio_url"),
            Self::FileUpload(_) => Some("file_upload_failed"),
            Self::InvalidModel(_) => Some("invalid_model"),
            Self::InvalidPromptConfig(_) => Some("invalid_prompt_config"),
            Self::InvalidRequest(_) => Some("invalid_request"),
            Self::PayloadTooLarge(_) => Some("payload_too_large"),
            Self::Upstream { kind, .. } => Some(kind.code()),
            Self::Internal(_) => None,
        }
    }
}

/// Category of a failed upstream call
///
/// Derived from the provider message by case-insensitive substring match.
/// The checks run in declaration order, so a message mentioning both a
/// timeout and an authorization problem is a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    Timeout,
    InvalidRequest,
    Authentication,
    NotFound,
    Api,
}

impl UpstreamErrorKind {
    pub fn classify(message: &str) -> Self {
        let message = message.to_lowercase();

        if message.contains("timeout") {
            Self::Timeout
        } else if message.contains("invalid") || message.contains("bad request") {
            Self::InvalidRequest
        } else if message.contains("unauthorized") {
            Self::Authentication
        } else if message.contains("not found") {
            Self::NotFound
        } else {
            Self::Api
        }
    }

    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Api => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn error_type(self) -> &'static str {
        match self {
            Self::Timeout => "timeout_error",
            Self::InvalidRequest => "invalid_request_error",
            Self::Authentication => "authentication_error",
            Self::NotFound => "not_found_error",
            Self::Api => "api_error",
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Timeout => "transcription_timeout",
            Self::InvalidRequest => "invalid_audio",
            Self::Authentication => "invalid_api_key",
            Self::NotFound => "audio_not_found",
            Self::Api => "transcription_failed",
        }
    }
}

/// Error response format compatible with `OpenAI` API
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    /// Generic 500 body used for internal failures and caught panics
    pub fn internal() -> Self {
        Self {
            error: ErrorDetails {
                message: "Internal server error".to_string(),
                r#type: "api_error".to_string(),
                code: None,
            },
        }
    }
}

impl IntoResponse for TranscriptionError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let Self::Internal(ref source) = self {
            tracing::error!("Unexpected error in transcription endpoint: {source:#}");
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                message: self.to_string(),
                r#type: self.error_type().to_string(),
                code: self.code().map(str::to_string),
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_follows_priority_order() {
        assert_eq!(
            UpstreamErrorKind::classify("Timeout while unauthorized"),
            UpstreamErrorKind::Timeout
        );
        assert_eq!(
            UpstreamErrorKind::classify("invalid audio, resource not found"),
            UpstreamErrorKind::InvalidRequest
        );
        assert_eq!(
            UpstreamErrorKind::classify("Unauthorized: audio not found"),
            UpstreamErrorKind::Authentication
        );
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(UpstreamErrorKind::classify("REQUEST TIMEOUT"), UpstreamErrorKind::Timeout);
        assert_eq!(UpstreamErrorKind::classify("Bad Request"), UpstreamErrorKind::InvalidRequest);
        assert_eq!(
            UpstreamErrorKind::classify("AssemblyAI API error (401 Unauthorized): bad key"),
            UpstreamErrorKind::Authentication
        );
        assert_eq!(UpstreamErrorKind::classify("Transcript Not Found"), UpstreamErrorKind::NotFound);
    }

    #[test]
    fn unmatched_message_is_generic_api_error() {
        let kind = UpstreamErrorKind::classify("upstream exploded");
        assert_eq!(kind, UpstreamErrorKind::Api);
        assert_eq!(kind.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(kind.code(), "transcription_failed");
    }

    #[test]
    fn timeout_maps_to_408() {
        let error = TranscriptionError::from_provider(&ProviderError::Failed("Request timeout".to_string()));
        assert_eq!(error.status_code(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(error.error_type(), "timeout_error");
        assert_eq!(error.code(), Some("transcription_timeout"));
    }

    #[test]
    fn validation_errors_have_codes() {
        assert_eq!(
            TranscriptionError::MissingAuthorization.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            TranscriptionError::MissingAuthorization.error_type(),
            "authentication_error"
        );
        assert_eq!(
            TranscriptionError::InvalidModel("x".to_string()).code(),
            Some("invalid_model")
        );
        assert_eq!(
            TranscriptionError::MissingAudioInput.error_type(),
            "invalid_request_error"
        );
    }

    #[test]
    fn internal_error_hides_details() {
        let error = TranscriptionError::Internal(anyhow::anyhow!("database password is hunter2"));
        assert_eq!(error.to_string(), "Internal server error");
        assert_eq!(error.error_type(), "api_error");
        assert_eq!(error.code(), None);
    }
}
