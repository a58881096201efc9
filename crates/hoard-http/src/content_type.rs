use hoard_core::normalized_file_extension;

/// Map a `Content-Type` header value to a file extension.
///
/// Parameters (`; charset=...`) are ignored. Unknown `audio/*` subtypes
/// fall back to the normalized subtype; anything else yields `None`.
pub fn extension_for_content_type(content_type: &str) -> Option<String> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let known = match mime.as_str() {
        "audio/mpeg" | "audio/mp3" | "audio/mpeg3" | "audio/x-mpeg-3" => "mp3",
        "audio/mp4" | "audio/x-m4a" | "audio/m4a" => "m4a",
        "audio/aac" | "audio/x-aac" | "audio/aacp" => "aac",
        "audio/flac" | "audio/x-flac" => "flac",
        "audio/ogg" | "application/ogg" | "audio/vorbis" => "ogg",
        "audio/opus" => "opus",
        "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => "wav",
        "audio/aiff" | "audio/x-aiff" => "aiff",
        "audio/alac" | "audio/x-alac" => "m4a",
        _ => {
            let subtype = mime.strip_prefix("audio/")?;
            let subtype = subtype.strip_prefix("x-").unwrap_or(subtype);
            return normalized_file_extension(subtype);
        }
    };
    Some(known.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types() {
        assert_eq!(extension_for_content_type("audio/mpeg").as_deref(), Some("mp3"));
        assert_eq!(extension_for_content_type("audio/x-flac").as_deref(), Some("flac"));
        assert_eq!(extension_for_content_type("audio/mp4").as_deref(), Some("m4a"));
        assert_eq!(
            extension_for_content_type("Audio/OGG; codecs=vorbis").as_deref(),
            Some("ogg")
        );
    }

    #[test]
    fn test_unknown_audio_subtype_falls_back() {
        assert_eq!(extension_for_content_type("audio/x-ape").as_deref(), Some("ape"));
        assert_eq!(extension_for_content_type("audio/dsf").as_deref(), Some("dsf"));
    }

    #[test]
    fn test_non_audio_is_none() {
        assert_eq!(extension_for_content_type("application/octet-stream"), None);
        assert_eq!(extension_for_content_type("text/html; charset=utf-8"), None);
        assert_eq!(extension_for_content_type(""), None);
    }
}
