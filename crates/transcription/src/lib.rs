#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

pub mod audio_url;
mod credentials;
mod error;
mod http_client;
pub mod mapping;
mod params;
pub mod prompt;
mod provider;
mod request;
pub mod response;
mod server;
mod types;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, extract::State, routing::post};

pub use error::{ErrorDetails, ErrorResponse, Result, TranscriptionError, UpstreamErrorKind};
pub use params::TranscriptParams;
pub use provider::{ProviderError, TranscriptionProvider};
pub use response::{ResponseFormat, TranscriptionOutput};
pub use server::{Server, TranscriptionServerBuilder};
pub use types::{AudioFile, Transcript, TranscriptionForm, Utterance, Word};
use request::ExtractMultipart;

/// Build the transcription server from configuration
///
/// # Errors
///
/// Returns an error if the server fails to initialize
pub fn build_server(config: &scribe_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        TranscriptionServerBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize transcription server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for transcription
///
/// The multipart extractor enforces the configured body limit itself, so
/// axum's default limit is disabled on this route.
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new()
        .route("/v1/audio/transcriptions", post(transcribe))
        .layer(DefaultBodyLimit::disable())
}

/// Handle transcription requests
async fn transcribe(
    State(server): State<Arc<Server>>,
    ExtractMultipart(authorization, form): ExtractMultipart,
) -> Result<TranscriptionOutput> {
    tracing::debug!("Transcription handler called for model: {}", form.model);

    server.transcribe(authorization.as_deref(), form).await
}
