use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mapping::SpeechModel;

/// Request body for AssemblyAI `POST /v2/transcript`
///
/// Every field is optional so the same type describes both the defaults
/// derived from the `OpenAI` form and the overrides supplied through the
/// prompt. Unset fields are never serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_detection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_boost: Option<Vec<String>>,
    /// `low`, `default` or `high`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost_param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyterms_prompt: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_labels: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speakers_expected: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub punctuate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disfluencies: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_profanity: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multichannel: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_chapters: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_highlights: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_detection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_analysis: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iab_categories: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_safety: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summarization: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redact_pii: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redact_pii_policies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redact_pii_sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// Milliseconds into the audio to start transcribing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_start_from: Option<u64>,
    /// Milliseconds into the audio to stop transcribing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_end_at: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_threshold: Option<f64>,
    /// Keys this type does not model, forwarded untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TranscriptParams {
    /// Parameters derived from the inbound form
    pub fn defaults(
        audio_url: String,
        language_code: Option<String>,
        speech_model: SpeechModel,
        word_boost: Vec<String>,
        speaker_labels: bool,
    ) -> Self {
        Self {
            audio_url: Some(audio_url),
            language_code,
            speech_model: Some(speech_model.as_str().to_string()),
            word_boost: Some(word_boost),
            speaker_labels: Some(speaker_labels),
            punctuate: Some(true),
            format_text: Some(true),
            ..Self::default()
        }
    }

    /// Build overrides from a prompt configuration object
    ///
    /// A `null` value counts as "not specified".
    ///
    /// # Errors
    ///
    /// Returns the deserialization error if a known key has the wrong type
    pub fn from_config(config: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(config))
    }

    /// Apply `overrides` on top of `self`; any value set in `overrides` wins
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        let mut extra = self.extra;
        extra.extend(overrides.extra);
        extra.retain(|_, value| !value.is_null());

        Self {
            audio_url: overrides.audio_url.or(self.audio_url),
            language_code: overrides.language_code.or(self.language_code),
            language_detection: overrides.language_detection.or(self.language_detection),
            speech_model: overrides.speech_model.or(self.speech_model),
            word_boost: overrides.word_boost.or(self.word_boost),
            boost_param: overrides.boost_param.or(self.boost_param),
            keyterms_prompt: overrides.keyterms_prompt.or(self.keyterms_prompt),
            speaker_labels: overrides.speaker_labels.or(self.speaker_labels),
            speakers_expected: overrides.speakers_expected.or(self.speakers_expected),
            punctuate: overrides.punctuate.or(self.punctuate),
            format_text: overrides.format_text.or(self.format_text),
            disfluencies: overrides.disfluencies.or(self.disfluencies),
            filter_profanity: overrides.filter_profanity.or(self.filter_profanity),
            multichannel: overrides.multichannel.or(self.multichannel),
            auto_chapters: overrides.auto_chapters.or(self.auto_chapters),
            auto_highlights: overrides.auto_highlights.or(self.auto_highlights),
            entity_detection: overrides.entity_detection.or(self.entity_detection),
            sentiment_analysis: overrides.sentiment_analysis.or(self.sentiment_analysis),
            iab_categories: overrides.iab_categories.or(self.iab_categories),
            content_safety: overrides.content_safety.or(self.content_safety),
            summarization: overrides.summarization.or(self.summarization),
            summary_model: overrides.summary_model.or(self.summary_model),
            summary_type: overrides.summary_type.or(self.summary_type),
            redact_pii: overrides.redact_pii.or(self.redact_pii),
            redact_pii_policies: overrides.redact_pii_policies.or(self.redact_pii_policies),
            redact_pii_sub: overrides.redact_pii_sub.or(self.redact_pii_sub),
            webhook_url: overrides.webhook_url.or(self.webhook_url),
            audio_start_from: overrides.audio_start_from.or(self.audio_start_from),
            audio_end_at: overrides.audio_end_at.or(self.audio_end_at),
            speech_threshold: overrides.speech_threshold.or(self.speech_threshold),
            extra,
        }
    }
}
