use scribe_config::{Config, DEFAULT_BODY_LIMIT_BYTES};

use crate::{
    audio_url, credentials,
    error::{Result, TranscriptionError},
    mapping,
    params::TranscriptParams,
    prompt,
    provider::{TranscriptionProvider, assemblyai::AssemblyAiProvider},
    response::{self, ResponseFormat, TranscriptionOutput},
    types::{AudioFile, TranscriptionForm},
};

/// Transcription server that translates `OpenAI` requests for the provider
pub struct Server {
    provider: Box<dyn TranscriptionProvider>,
    body_limit: usize,
}

/// Where the provider should fetch audio from
enum AudioSource {
    Upload(AudioFile),
    Url(String),
}

impl Server {
    /// Create a server around an already constructed provider
    pub fn with_provider(provider: Box<dyn TranscriptionProvider>, body_limit: usize) -> Self {
        Self { provider, body_limit }
    }

    /// Maximum accepted request body, in bytes
    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    /// Transcribe one `OpenAI`-style request
    ///
    /// Validation failures return before any provider call. The model and
    /// prompt configuration are checked before a file is uploaded, so an
    /// invalid request never reaches the provider.
    pub async fn transcribe(&self, authorization: Option<&str>, form: TranscriptionForm) -> Result<TranscriptionOutput> {
        let api_key = credentials::api_key(authorization)?;

        let TranscriptionForm {
            file,
            audio_url,
            model,
            language,
            prompt,
            response_format,
            temperature,
        } = form;

        let source = match (file, audio_url) {
            (Some(_), Some(_)) => return Err(TranscriptionError::ConflictingAudioInput),
            (None, None) => return Err(TranscriptionError::MissingAudioInput),
            (Some(file), None) => {
                tracing::info!("Received transcription request with file upload: {}", file.filename);
                AudioSource::Upload(file)
            }
            (None, Some(url)) => {
                if !audio_url::is_valid(&url) {
                    return Err(TranscriptionError::InvalidAudioUrl);
                }

                tracing::info!("Received transcription request for audio URL");
                AudioSource::Url(url)
            }
        };

        if temperature.abs() > f32::EPSILON {
            tracing::info!("Temperature parameter '{temperature}' ignored");
        }

        let parsed = prompt::parse(prompt.as_deref());

        if !parsed.config.is_empty() {
            let keys = parsed.config.keys().map(String::as_str).collect::<Vec<_>>().join(", ");
            tracing::info!("Applying transcription config from prompt: {keys}");
        }

        let speech_model =
            mapping::speech_model(Some(model.as_str())).ok_or_else(|| TranscriptionError::InvalidModel(model.clone()))?;
        let language_code = mapping::language_code(language.as_deref());
        let word_boost = mapping::word_boost(&parsed.cleaned_prompt);
        let speaker_labels = parsed.speaker_labels();

        tracing::debug!(
            "Mapped model '{model}' to '{speech_model}', language {language_code:?}, {} word boost term(s)",
            word_boost.len()
        );

        let overrides = TranscriptParams::from_config(parsed.config)
            .map_err(|e| TranscriptionError::InvalidPromptConfig(e.to_string()))?;

        let audio_url = match source {
            AudioSource::Url(url) => url,
            AudioSource::Upload(file) => {
                let url = self
                    .provider
                    .upload(&api_key, file.bytes, &file.filename)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to upload file: {e}");
                        TranscriptionError::FileUpload(e.to_string())
                    })?;

                tracing::info!("File uploaded successfully");
                url
            }
        };

        let params =
            TranscriptParams::defaults(audio_url, language_code, speech_model, word_boost, speaker_labels).merge(overrides);

        tracing::info!("Starting {} transcription", self.provider.name());

        let transcript = self.provider.transcribe(&api_key, &params).await.map_err(|e| {
            tracing::error!("Transcription failed: {e}");
            TranscriptionError::from_provider(&e)
        })?;

        tracing::info!("Transcription completed, {} characters", transcript.text.len());

        response::render(&transcript, ResponseFormat::parse(&response_format))
            .map_err(|e| TranscriptionError::Internal(e.into()))
    }
}

/// Builder for constructing the transcription server from configuration
pub struct TranscriptionServerBuilder<'a> {
    config: &'a Config,
}

impl<'a> TranscriptionServerBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn build(self) -> anyhow::Result<Server> {
        let provider = AssemblyAiProvider::new(&self.config.assemblyai)?;

        tracing::debug!(
            "Transcription server initialized against {}",
            self.config.assemblyai.base_url
        );

        let body_limit = match self.config.server.body_limit_bytes {
            0 => DEFAULT_BODY_LIMIT_BYTES,
            limit => limit,
        };

        Ok(Server::with_provider(Box::new(provider), body_limit))
    }
}
