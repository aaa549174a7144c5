pub(crate) mod assemblyai;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::SecretString;
use thiserror::Error;

use crate::{params::TranscriptParams, types::Transcript};

/// Failure reported by a transcription provider
///
/// The rendered message is what the error translator classifies, so every
/// variant spells out its cause in plain words.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Request never reached the provider
    #[error("Failed to reach AssemblyAI: {0}")]
    Connection(String),

    /// Provider answered with a non-success status
    #[error("AssemblyAI API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    /// Provider accepted the job but could not transcribe it
    #[error("Transcription failed: {0}")]
    Failed(String),

    /// Job did not finish within the configured limit
    #[error("Transcription timeout after {0:?}")]
    Timeout(Duration),

    /// Provider response could not be decoded
    #[error("Unexpected response from AssemblyAI: {0}")]
    InvalidResponse(String),
}

/// Trait for speech-to-text provider implementations
///
/// The caller's credential is passed through on every call; providers never
/// hold a key of their own.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Upload raw audio and return a URL the provider can transcribe from
    async fn upload(&self, api_key: &SecretString, audio: Vec<u8>, filename: &str) -> Result<String, ProviderError>;

    /// Submit a transcription job and wait for its result
    async fn transcribe(&self, api_key: &SecretString, params: &TranscriptParams) -> Result<Transcript, ProviderError>;

    /// Get the provider name
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message_carries_status_text() {
        let error = ProviderError::Api {
            status: StatusCode::UNAUTHORIZED,
            message: "Invalid API key".to_string(),
        };

        assert_eq!(error.to_string(), "AssemblyAI API error (401 Unauthorized): Invalid API key");
    }

    #[test]
    fn timeout_message_mentions_timeout() {
        let error = ProviderError::Timeout(Duration::from_secs(600));
        assert_eq!(error.to_string(), "Transcription timeout after 600s");
    }
}
