use std::fmt::Write as _;

use axum::{
    Json,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::types::{Transcript, Utterance, Word};

/// Maximum words per subtitle cue when grouping from word timings
const MAX_WORDS_PER_SEGMENT: usize = 12;

/// Response formats of the `OpenAI` transcription API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Json,
    Text,
    VerboseJson,
    Srt,
    Vtt,
}

impl ResponseFormat {
    /// Parse a `response_format` value
    ///
    /// Unrecognised values fall back to JSON rather than failing.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "text" => Self::Text,
            "verbose_json" => Self::VerboseJson,
            "srt" => Self::Srt,
            "vtt" => Self::Vtt,
            other => {
                tracing::warn!("Unsupported response_format '{other}', using json");
                Self::Json
            }
        }
    }
}

/// Rendered transcription ready to send
#[derive(Debug)]
pub enum TranscriptionOutput {
    Json(serde_json::Value),
    Text { body: String, content_type: &'static str },
}

impl IntoResponse for TranscriptionOutput {
    fn into_response(self) -> Response {
        match self {
            Self::Json(value) => Json(value).into_response(),
            Self::Text { body, content_type } => ([(header::CONTENT_TYPE, content_type)], body).into_response(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonTranscription<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    utterances: Option<Vec<UtteranceBody<'a>>>,
}

#[derive(Debug, Serialize)]
struct VerboseTranscription<'a> {
    task: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
    text: &'a str,
    segments: Vec<Segment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    words: Option<Vec<WordBody<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    utterances: Option<Vec<UtteranceBody<'a>>>,
}

#[derive(Debug, Serialize)]
struct UtteranceBody<'a> {
    speaker: &'a str,
    text: &'a str,
    start: f64,
    end: f64,
}

#[derive(Debug, Serialize)]
struct WordBody<'a> {
    word: &'a str,
    start: f64,
    end: f64,
}

/// Timed span of text, in seconds
#[derive(Debug, Clone, PartialEq, Serialize)]
struct Segment {
    id: usize,
    start: f64,
    end: f64,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    speaker: Option<String>,
}

/// Render a completed transcript in the requested format
///
/// # Errors
///
/// Returns an error if the JSON body cannot be serialized
pub fn render(transcript: &Transcript, format: ResponseFormat) -> serde_json::Result<TranscriptionOutput> {
    let output = match format {
        ResponseFormat::Text => TranscriptionOutput::Text {
            body: transcript.text.clone(),
            content_type: "text/plain; charset=utf-8",
        },
        ResponseFormat::Json => TranscriptionOutput::Json(serde_json::to_value(JsonTranscription {
            text: &transcript.text,
            utterances: utterances(transcript),
        })?),
        ResponseFormat::VerboseJson => TranscriptionOutput::Json(serde_json::to_value(VerboseTranscription {
            task: "transcribe",
            language: transcript.language_code.as_deref(),
            duration: transcript.audio_duration,
            text: &transcript.text,
            segments: segments(transcript),
            words: transcript.words.as_ref().map(|words| {
                words
                    .iter()
                    .map(|w| WordBody {
                        word: &w.text,
                        start: seconds(w.start),
                        end: seconds(w.end),
                    })
                    .collect()
            }),
            utterances: utterances(transcript),
        })?),
        ResponseFormat::Srt => TranscriptionOutput::Text {
            body: srt(&segments(transcript)),
            content_type: "text/plain; charset=utf-8",
        },
        ResponseFormat::Vtt => TranscriptionOutput::Text {
            body: vtt(&segments(transcript)),
            content_type: "text/vtt; charset=utf-8",
        },
    };

    Ok(output)
}

fn utterances(transcript: &Transcript) -> Option<Vec<UtteranceBody<'_>>> {
    transcript
        .utterances
        .as_ref()
        .filter(|utterances| !utterances.is_empty())
        .map(|utterances| {
            utterances
                .iter()
                .map(|u| UtteranceBody {
                    speaker: &u.speaker,
                    text: &u.text,
                    start: seconds(u.start),
                    end: seconds(u.end),
                })
                .collect()
        })
}

#[allow(clippy::cast_precision_loss)]
fn seconds(millis: u64) -> f64 {
    millis as f64 / 1000.0
}

/// Utterances if any, else words grouped at sentence ends, else one segment
fn segments(transcript: &Transcript) -> Vec<Segment> {
    if let Some(utterances) = transcript.utterances.as_deref().filter(|u| !u.is_empty()) {
        return segments_from_utterances(utterances);
    }

    if let Some(words) = transcript.words.as_deref().filter(|w| !w.is_empty()) {
        return segments_from_words(words);
    }

    if transcript.text.is_empty() {
        return Vec::new();
    }

    vec![Segment {
        id: 0,
        start: 0.0,
        end: transcript.audio_duration.unwrap_or(0.0),
        text: transcript.text.clone(),
        speaker: None,
    }]
}

fn segments_from_utterances(utterances: &[Utterance]) -> Vec<Segment> {
    utterances
        .iter()
        .enumerate()
        .map(|(id, u)| Segment {
            id,
            start: seconds(u.start),
            end: seconds(u.end),
            text: u.text.clone(),
            speaker: Some(u.speaker.clone()),
        })
        .collect()
}

fn segments_from_words(words: &[Word]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current: Vec<&Word> = Vec::new();

    for word in words {
        current.push(word);

        let sentence_end = word.text.ends_with(['.', '?', '!']);
        if sentence_end || current.len() == MAX_WORDS_PER_SEGMENT {
            segments.push(segment_from_run(segments.len(), &current));
            current.clear();
        }
    }

    if !current.is_empty() {
        segments.push(segment_from_run(segments.len(), &current));
    }

    segments
}

fn segment_from_run(id: usize, run: &[&Word]) -> Segment {
    let first = run[0];
    let last = run[run.len() - 1];

    Segment {
        id,
        start: seconds(first.start),
        end: seconds(last.end),
        text: run.iter().map(|w| w.text.as_str()).collect::<Vec<_>>().join(" "),
        speaker: None,
    }
}

fn srt(segments: &[Segment]) -> String {
    let mut out = String::new();

    for (index, segment) in segments.iter().enumerate() {
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            timestamp(segment.start, ','),
            timestamp(segment.end, ','),
            cue_text(segment)
        );
    }

    out
}

fn vtt(segments: &[Segment]) -> String {
    let mut out = String::from("WEBVTT\n\n");

    for segment in segments {
        let _ = write!(
            out,
            "{} --> {}\n{}\n\n",
            timestamp(segment.start, '.'),
            timestamp(segment.end, '.'),
            cue_text(segment)
        );
    }

    out
}

fn cue_text(segment: &Segment) -> String {
    match segment.speaker {
        Some(ref speaker) => format!("Speaker {speaker}: {}", segment.text),
        None => segment.text.clone(),
    }
}

/// `HH:MM:SS<sep>mmm`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn timestamp(seconds: f64, separator: char) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis / 60_000) % 60;
    let secs = (total_millis / 1000) % 60;
    let millis = total_millis % 1000;

    format!("{hours:02}:{minutes:02}:{secs:02}{separator}{millis:03}")
}
