use url::Url;

/// File extensions AssemblyAI can transcribe
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "mp4", "m4a", "wav", "flac", "ogg", "oga", "opus", "webm", "mpeg", "mpga", "aac", "amr", "wma", "aiff",
    "aif", "mov", "3gp",
];

/// Check that a caller-supplied URL plausibly points at an audio file
///
/// Requires an http(s) scheme, a host, and a known audio or video extension
/// on the last path segment. The query string is ignored.
pub fn is_valid(candidate: &str) -> bool {
    let Ok(url) = Url::parse(candidate.trim()) else {
        return false;
    };

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none_or(str::is_empty) {
        return false;
    }

    let Some(segment) = url.path_segments().and_then(|mut segments| segments.next_back()) else {
        return false;
    };

    segment
        .rsplit_once('.')
        .is_some_and(|(stem, extension)| {
            !stem.is_empty() && AUDIO_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_audio_urls() {
        assert!(is_valid("https://cdn.example.com/audio/call.mp3"));
        assert!(is_valid("http://example.com/a.WAV"));
        assert!(is_valid("https://example.com/clip.m4a?token=abc&x=1"));
        assert!(is_valid("https://example.com/video/meeting.mov"));
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(!is_valid("ftp://example.com/a.mp3"));
        assert!(!is_valid("file:///tmp/a.mp3"));
        assert!(!is_valid("not-a-url"));
        assert!(!is_valid(""));
    }

    #[test]
    fn rejects_missing_or_unknown_extension() {
        assert!(!is_valid("https://example.com/"));
        assert!(!is_valid("https://example.com/audio"));
        assert!(!is_valid("https://example.com/page.html"));
        assert!(!is_valid("https://example.com/.mp3"));
        assert!(!is_valid("https://example.com/download?file=a.mp3"));
    }
}
