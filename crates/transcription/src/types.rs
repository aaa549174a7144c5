use serde::Deserialize;

/// Default model when the form omits one
pub const DEFAULT_MODEL: &str = "whisper-1";

/// Default response format when the form omits one
pub const DEFAULT_RESPONSE_FORMAT: &str = "json";

/// Transcription request following the `OpenAI` audio API form fields
///
/// Fields are kept as received; validation happens in
/// [`Server::transcribe`](crate::Server::transcribe).
#[derive(Debug)]
pub struct TranscriptionForm {
    /// Uploaded audio file, if any
    pub file: Option<AudioFile>,
    /// Publicly reachable audio URL, if any
    pub audio_url: Option<String>,
    /// Model identifier (e.g. "whisper-1" or "slam-1")
    pub model: String,
    /// Optional language hint (ISO 639-1, region variants allowed)
    pub language: Option<String>,
    /// Free-text prompt carrying vocabulary and configuration overrides
    pub prompt: Option<String>,
    /// Response format (json, text, srt, `verbose_json`, vtt)
    pub response_format: String,
    /// Sampling temperature, accepted for compatibility only
    pub temperature: f32,
}

impl Default for TranscriptionForm {
    fn default() -> Self {
        Self {
            file: None,
            audio_url: None,
            model: DEFAULT_MODEL.to_string(),
            language: None,
            prompt: None,
            response_format: DEFAULT_RESPONSE_FORMAT.to_string(),
            temperature: 0.0,
        }
    }
}

/// Raw audio uploaded in the `file` form field
pub struct AudioFile {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl std::fmt::Debug for AudioFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioFile")
            .field("bytes", &self.bytes.len())
            .field("filename", &self.filename)
            .finish()
    }
}

/// Completed transcript returned by the provider
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    /// Full transcript text
    pub text: String,
    /// Detected or requested language code
    pub language_code: Option<String>,
    /// Audio duration in seconds
    pub audio_duration: Option<f64>,
    /// Word-level timing, offsets in milliseconds
    pub words: Option<Vec<Word>>,
    /// Speaker-separated utterances, present when speaker labels were requested
    pub utterances: Option<Vec<Utterance>>,
}

/// A single recognised word
#[derive(Debug, Clone, Deserialize)]
pub struct Word {
    pub text: String,
    pub start: u64,
    pub end: u64,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub speaker: Option<String>,
}

/// A contiguous stretch of speech attributed to one speaker
#[derive(Debug, Clone, Deserialize)]
pub struct Utterance {
    pub speaker: String,
    pub text: String,
    pub start: u64,
    pub end: u64,
    #[serde(default)]
    pub confidence: Option<f64>,
}
