use std::sync::Arc;

use axum::{
    Form,
    body::{Body, Bytes},
    extract::{FromRequest, Multipart, multipart::Field},
};
use http::{HeaderMap, HeaderValue, header::CONTENT_TYPE, request::Parts};
use serde::Deserialize;

use crate::{
    Server,
    error::TranscriptionError,
    types::{AudioFile, DEFAULT_MODEL, DEFAULT_RESPONSE_FORMAT, TranscriptionForm},
};

/// Filename reported for uploads that do not name one
const DEFAULT_FILENAME: &str = "audio";

/// Encodings the transcription form is accepted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormEncoding {
    Multipart,
    Urlencoded,
}

impl FormEncoding {
    /// Detect the encoding from the `Content-Type` header, ignoring case
    fn detect(headers: &HeaderMap) -> Option<Self> {
        let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?.to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            Some(Self::Multipart)
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            Some(Self::Urlencoded)
        } else {
            None
        }
    }
}

/// Text fields of a urlencoded form; uploads need multipart
#[derive(Debug, Default, Deserialize)]
struct UrlencodedFields {
    audio_url: Option<String>,
    model: Option<String>,
    language: Option<String>,
    prompt: Option<String>,
    response_format: Option<String>,
    temperature: Option<String>,
}

/// Extractor for the `Authorization` header and the transcription form
///
/// Accepts `multipart/form-data` and `application/x-www-form-urlencoded`
/// bodies, buffered up to the server's configured limit before parsing. Any
/// other body yields an empty form, which then fails validation for lack of
/// audio.
pub struct ExtractMultipart(pub Option<String>, pub TranscriptionForm);

impl FromRequest<Arc<Server>> for ExtractMultipart {
    type Rejection = TranscriptionError;

    async fn from_request(request: http::Request<Body>, server: &Arc<Server>) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = request.into_parts();

        let authorization = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        let Some(encoding) = FormEncoding::detect(&parts.headers) else {
            tracing::debug!("Transcription request is not a form, treating as an empty form");
            return Ok(Self(authorization, TranscriptionForm::default()));
        };

        let limit = server.body_limit();

        let bytes = axum::body::to_bytes(body, limit).await.map_err(|err| {
            if std::error::Error::source(&err).is_some_and(|source| source.is::<http_body_util::LengthLimitError>()) {
                TranscriptionError::PayloadTooLarge(limit)
            } else {
                TranscriptionError::InvalidRequest(format!("Failed to read request body: {err}"))
            }
        })?;

        let form = match encoding {
            FormEncoding::Multipart => parse_multipart(parts, bytes).await?,
            FormEncoding::Urlencoded => {
                // The form extractor matches the media type case-sensitively
                parts.headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
                parse_urlencoded(parts, bytes).await?
            }
        };

        Ok(Self(authorization, form))
    }
}

async fn parse_urlencoded(parts: Parts, bytes: Bytes) -> Result<TranscriptionForm, TranscriptionError> {
    let rebuilt = http::Request::from_parts(parts, Body::from(bytes));

    let Form(fields) = Form::<UrlencodedFields>::from_request(rebuilt, &())
        .await
        .map_err(|e| TranscriptionError::InvalidRequest(format!("Failed to parse form: {e}")))?;

    let mut form = TranscriptionForm {
        audio_url: fields.audio_url.and_then(non_blank),
        language: fields.language.and_then(non_blank),
        prompt: fields.prompt.and_then(non_blank),
        ..TranscriptionForm::default()
    };

    if let Some(model) = fields.model.and_then(non_blank) {
        form.model = model;
    }
    if let Some(response_format) = fields.response_format.and_then(non_blank) {
        form.response_format = response_format;
    }
    if let Some(value) = fields.temperature.and_then(non_blank) {
        form.temperature = temperature(&value)?;
    }

    Ok(form)
}

async fn parse_multipart(parts: Parts, bytes: Bytes) -> Result<TranscriptionForm, TranscriptionError> {
    // Keeps the original extensions, including the disabled default body
    // limit set on the route, since the body is already bounded here.
    let rebuilt = http::Request::from_parts(parts, Body::from(bytes));

    let mut multipart = Multipart::from_request(rebuilt, &())
        .await
        .map_err(|e| TranscriptionError::InvalidRequest(format!("Failed to parse multipart form: {e}")))?;

    let mut form = TranscriptionForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| TranscriptionError::InvalidRequest(format!("Failed to parse multipart form: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or(DEFAULT_FILENAME).to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| TranscriptionError::InvalidRequest(format!("Failed to read audio data: {e}")))?;

                if !bytes.is_empty() {
                    form.file = Some(AudioFile {
                        bytes: bytes.to_vec(),
                        filename,
                    });
                }
            }
            "audio_url" => form.audio_url = text(field, &name).await?,
            "model" => {
                form.model = text(field, &name).await?.unwrap_or_else(|| DEFAULT_MODEL.to_string());
            }
            "language" => form.language = text(field, &name).await?,
            "prompt" => form.prompt = text(field, &name).await?,
            "response_format" => {
                form.response_format = text(field, &name)
                    .await?
                    .unwrap_or_else(|| DEFAULT_RESPONSE_FORMAT.to_string());
            }
            "temperature" => {
                if let Some(value) = text(field, &name).await? {
                    form.temperature = temperature(&value)?;
                }
            }
            other => tracing::debug!("Ignoring unknown form field '{other}'"),
        }
    }

    Ok(form)
}

/// Read a text field; blank values count as absent
async fn text(field: Field<'_>, name: &str) -> Result<Option<String>, TranscriptionError> {
    let value = field
        .text()
        .await
        .map_err(|e| TranscriptionError::InvalidRequest(format!("Failed to read {name} field: {e}")))?;

    Ok(non_blank(value))
}

fn non_blank(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}

fn temperature(value: &str) -> Result<f32, TranscriptionError> {
    value
        .trim()
        .parse::<f32>()
        .map_err(|e| TranscriptionError::InvalidRequest(format!("Invalid temperature value '{value}': {e}")))
}
