//! Translation of `OpenAI` request vocabulary into AssemblyAI parameters

use std::fmt;

/// AssemblyAI speech models
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpeechModel {
    #[default]
    Best,
    Slam1,
    Universal,
    Nano,
}

impl SpeechModel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Best => "best",
            Self::Slam1 => "slam-1",
            Self::Universal => "universal",
            Self::Nano => "nano",
        }
    }
}

impl fmt::Display for SpeechModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map an inbound model identifier to an AssemblyAI speech model
///
/// A missing or blank identifier selects the default model. `None` means the
/// identifier was supplied but has no equivalent, which callers reject.
pub fn speech_model(model: Option<&str>) -> Option<SpeechModel> {
    let model = match model.map(str::trim) {
        None | Some("") => return Some(SpeechModel::default()),
        Some(model) => model.to_ascii_lowercase(),
    };

    match model.as_str() {
        "whisper-1" | "best" => Some(SpeechModel::Best),
        "slam-1" => Some(SpeechModel::Slam1),
        "universal" => Some(SpeechModel::Universal),
        "nano" => Some(SpeechModel::Nano),
        _ => None,
    }
}

/// Regional codes AssemblyAI accepts as-is
const REGIONAL_CODES: &[&str] = &["en_us", "en_uk", "en_au"];

/// Normalize a language hint to an AssemblyAI `language_code`
///
/// `None` leaves language detection to the provider.
pub fn language_code(language: Option<&str>) -> Option<String> {
    let normalized = language?.trim().to_ascii_lowercase().replace('-', "_");

    if normalized.is_empty() {
        return None;
    }

    let normalized = if normalized == "en_gb" {
        "en_uk".to_string()
    } else {
        normalized
    };

    if REGIONAL_CODES.contains(&normalized.as_str()) {
        return Some(normalized);
    }

    let base = normalized.split('_').next().unwrap_or_default();

    if (2..=3).contains(&base.len()) && base.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(base.to_string())
    } else {
        tracing::warn!("Unrecognised language '{normalized}', falling back to automatic detection");
        None
    }
}

/// AssemblyAI rejects boosted phrases longer than this many words
const MAX_WORDS_PER_TERM: usize = 6;

/// AssemblyAI accepts at most this many boosted terms
const MAX_TERMS: usize = 1000;

/// Split a cleaned prompt into word-boost vocabulary
///
/// Terms are separated by commas, semicolons, or newlines.
pub fn word_boost(prompt: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();

    for term in prompt.split([',', ';', '\n']).map(str::trim) {
        if term.is_empty() || terms.iter().any(|t| t == term) {
            continue;
        }

        if term.split_whitespace().count() > MAX_WORDS_PER_TERM {
            tracing::debug!("Skipping word boost term longer than {MAX_WORDS_PER_TERM} words: '{term}'");
            continue;
        }

        if terms.len() == MAX_TERMS {
            tracing::warn!("Word boost list truncated to {MAX_TERMS} terms");
            break;
        }

        terms.push(term.to_string());
    }

    terms
}
