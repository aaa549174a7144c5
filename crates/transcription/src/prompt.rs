//! Extraction of provider configuration from the free-text `prompt` field
//!
//! Clients that only speak the `OpenAI` contract have no way to request
//! AssemblyAI features, so the prompt doubles as a side channel. It may carry
//! an embedded JSON object (`{"speaker_labels": true} Acme, Kubernetes`) or a
//! handful of legacy markers (`[diarize]`, `speakers_expected=3`). Whatever is
//! left over is treated as vocabulary hints.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Configuration overrides and residual text extracted from a prompt
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedPrompt {
    /// Provider configuration keys, exactly as supplied
    pub config: Map<String, Value>,
    /// Prompt text with all recognised configuration removed
    pub cleaned_prompt: String,
}

impl ParsedPrompt {
    /// Whether the prompt asked for speaker separation
    pub fn speaker_labels(&self) -> bool {
        self.config.get("speaker_labels").and_then(Value::as_bool).unwrap_or(false)
    }
}

/// Parse a prompt into configuration overrides and a cleaned prompt
///
/// An embedded JSON object takes priority; legacy keyword patterns are only
/// consulted when no object is found. Never fails: unparsable input yields an
/// empty configuration and the prompt unchanged.
pub fn parse(prompt: Option<&str>) -> ParsedPrompt {
    let Some(prompt) = prompt else {
        return ParsedPrompt::default();
    };

    if let Some((config, start, end)) = find_json_object(prompt) {
        let residual = format!("{} {}", &prompt[..start], &prompt[end..]);

        return ParsedPrompt {
            config,
            cleaned_prompt: normalize_whitespace(&residual),
        };
    }

    parse_legacy(prompt)
}

/// Locate the first `{` from which a complete JSON object deserializes
///
/// Returns the object and its byte span.
fn find_json_object(text: &str) -> Option<(Map<String, Value>, usize, usize)> {
    text.match_indices('{').find_map(|(start, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Map<String, Value>>();

        match stream.next() {
            Some(Ok(object)) => Some((object, start, start + stream.byte_offset())),
            _ => None,
        }
    })
}

const LEGACY_FLAGS: &str = "speaker_labels|language_detection|punctuate|format_text|disfluencies|filter_profanity|\
                            auto_chapters|auto_highlights|entity_detection|sentiment_analysis|summarization";

fn flag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // `speaker labels: true` is accepted alongside `speaker_labels=true`
        Regex::new(&format!(r"(?i)\b({})\s*[:=]\s*(true|false)\b", LEGACY_FLAGS.replace('_', "[_ ]")))
            .expect("must be valid regex")
    })
}

fn speakers_expected_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bspeakers[_ ]expected\s*[:=]\s*(\d+)\b").expect("must be valid regex"))
}

fn diarization_marker_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\[\s*(?:diarize|diarization|speaker[_ ]labels|speakers)\s*\]|\bspeaker[_ ](?:diarization|separation|labels)\b|\bdiariz(?:e|ation)\b",
        )
        .expect("must be valid regex")
    })
}

fn parse_legacy(prompt: &str) -> ParsedPrompt {
    let mut config = Map::new();
    let mut residual = prompt.to_string();

    // Explicit `key=value` forms run first so that `speaker labels=false`
    // is not swallowed by the bare `speaker labels` marker below.
    residual = flag_pattern()
        .replace_all(&residual, |captures: &regex::Captures<'_>| {
            let key = captures[1].to_lowercase().replace(' ', "_");
            let enabled = captures[2].eq_ignore_ascii_case("true");
            config.insert(key, Value::Bool(enabled));
            ""
        })
        .into_owned();

    residual = speakers_expected_pattern()
        .replace_all(&residual, |captures: &regex::Captures<'_>| {
            // Counts that do not fit the request field stay in the prompt text
            match captures[1].parse::<u32>() {
                Ok(count) => {
                    config.insert("speakers_expected".to_string(), Value::from(count));
                    String::new()
                }
                Err(_) => captures[0].to_string(),
            }
        })
        .into_owned();

    if diarization_marker_pattern().is_match(&residual) {
        residual = diarization_marker_pattern().replace_all(&residual, "").into_owned();
        config.entry("speaker_labels").or_insert(Value::Bool(true));
    }

    if config.is_empty() {
        return ParsedPrompt {
            config,
            cleaned_prompt: prompt.to_string(),
        };
    }

    ParsedPrompt {
        config,
        cleaned_prompt: normalize_whitespace(&residual)
            .trim_matches(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .to_string(),
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
