use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use scribe_config::AssemblyAiConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::time::Instant;

use crate::{
    http_client::http_client,
    params::TranscriptParams,
    types::{Transcript, Utterance, Word},
};

use super::{ProviderError, TranscriptionProvider};

/// AssemblyAI asynchronous transcription client
///
/// Jobs are submitted and then polled until they finish or the configured
/// timeout elapses.
pub struct AssemblyAiProvider {
    client: Client,
    base_url: String,
    poll_interval: Duration,
    timeout: Duration,
}

impl AssemblyAiProvider {
    pub fn new(config: &AssemblyAiConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(),
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            poll_interval: config.poll_interval()?,
            timeout: config.timeout()?,
        })
    }

    async fn fetch(&self, api_key: &SecretString, id: &str) -> Result<TranscriptJob, ProviderError> {
        let response = self
            .client
            .get(format!("{}/transcript/{id}", self.base_url))
            .header("authorization", api_key.expose_secret())
            .send()
            .await
            .map_err(connection_error)?;

        decode(response).await
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

/// Transcript resource as returned by `/transcript` and `/transcript/{id}`
///
/// Result fields are `null` until the job completes.
#[derive(Debug, Deserialize)]
struct TranscriptJob {
    id: String,
    status: JobStatus,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    language_code: Option<String>,
    #[serde(default)]
    audio_duration: Option<f64>,
    #[serde(default)]
    words: Option<Vec<Word>>,
    #[serde(default)]
    utterances: Option<Vec<Utterance>>,
}

impl From<TranscriptJob> for Transcript {
    fn from(job: TranscriptJob) -> Self {
        Self {
            text: job.text.unwrap_or_default(),
            language_code: job.language_code,
            audio_duration: job.audio_duration,
            words: job.words,
            utterances: job.utterances,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

fn connection_error(error: reqwest::Error) -> ProviderError {
    tracing::error!("AssemblyAI request failed: {error}");

    if error.is_timeout() {
        ProviderError::Connection(format!("request timeout: {error}"))
    } else {
        ProviderError::Connection(error.to_string())
    }
}

/// Upstream error text: the `error` field of a JSON body, else the raw body
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.trim().is_empty() => "no error details".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);

        tracing::error!("AssemblyAI API error ({status}): {message}");

        return Err(ProviderError::Api { status, message });
    }

    response.json().await.map_err(|e| {
        tracing::error!("Failed to parse AssemblyAI response: {e}");
        ProviderError::InvalidResponse(e.to_string())
    })
}

#[async_trait]
impl TranscriptionProvider for AssemblyAiProvider {
    async fn upload(&self, api_key: &SecretString, audio: Vec<u8>, filename: &str) -> Result<String, ProviderError> {
        tracing::debug!("Uploading {} bytes from '{filename}' to AssemblyAI", audio.len());

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .header("authorization", api_key.expose_secret())
            .header("content-type", "application/octet-stream")
            .body(audio)
            .send()
            .await
            .map_err(connection_error)?;

        let uploaded: UploadResponse = decode(response).await?;

        Ok(uploaded.upload_url)
    }

    async fn transcribe(&self, api_key: &SecretString, params: &TranscriptParams) -> Result<Transcript, ProviderError> {
        let deadline = Instant::now() + self.timeout;

        let response = self
            .client
            .post(format!("{}/transcript", self.base_url))
            .header("authorization", api_key.expose_secret())
            .json(params)
            .send()
            .await
            .map_err(connection_error)?;

        let mut job: TranscriptJob = decode(response).await?;
        tracing::debug!("AssemblyAI transcript {} submitted", job.id);

        loop {
            match job.status {
                JobStatus::Completed => {
                    tracing::debug!("AssemblyAI transcript {} completed", job.id);
                    return Ok(job.into());
                }
                JobStatus::Error => {
                    let reason = job.error.unwrap_or_else(|| "unknown error".to_string());
                    tracing::warn!("AssemblyAI transcript {} failed: {reason}", job.id);
                    return Err(ProviderError::Failed(reason));
                }
                JobStatus::Queued | JobStatus::Processing | JobStatus::Unknown => {}
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(ProviderError::Timeout(self.timeout));
            }

            // The final wait is cut short so the last status check lands on the deadline
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
            job = self.fetch(api_key, &job.id).await?;
        }
    }

    fn name(&self) -> &str {
        "assemblyai"
    }
}
