use serde_json::Value;

use crate::sources::plugin::ExtractionError;

/// 251 = Opus/WebM ~160 kbps, 250 = Opus/WebM ~70 kbps, 140 = AAC/m4a 128 kbps
pub const AUDIO_ITAG_PRIORITY: &[i64] = &[251, 250, 140];

/// 360p mp4 with muxed audio, present on almost every video.
pub const ITAG_FALLBACK: i64 = 18;

fn itag(format: &Value) -> i64 {
    format.get("itag").and_then(|v| v.as_i64()).unwrap_or(-1)
}

fn is_audio(format: &Value) -> bool {
    format
        .get("mimeType")
        .and_then(|v| v.as_str())
        .map(|m| m.starts_with("audio/"))
        .unwrap_or(false)
}

/// Returns `streamingData` once the player response says the video plays.
pub fn streaming_data(body: &Value) -> Result<&Value, ExtractionError> {
    let playability = body.get("playabilityStatus");
    let status = playability
        .and_then(|p| p.get("status"))
        .and_then(|s| s.as_str())
        .unwrap_or("UNKNOWN");

    if status != "OK" {
        let reason = playability
            .and_then(|p| p.get("reason"))
            .and_then(|r| r.as_str())
            .unwrap_or("no reason provided");
        return Err(ExtractionError::Unplayable {
            status: status.to_string(),
            reason: reason.to_string(),
        });
    }

    body
        .get("streamingData")
        .ok_or(ExtractionError::MissingStreamingData)
}

/// Priority itags first, then the muxed fallback, then the highest-bitrate
/// audio-only format.
pub fn select_best_audio_format(streaming_data: &Value) -> Option<&Value> {
    let all: Vec<&Value> = ["adaptiveFormats", "formats"]
        .iter()
        .filter_map(|key| streaming_data.get(*key).and_then(|v| v.as_array()))
        .flatten()
        .collect();

    for &target in AUDIO_ITAG_PRIORITY {
        if let Some(f) = all.iter().find(|f| itag(f) == target && is_audio(f)) {
            return Some(f);
        }
    }

    if let Some(f) = all.iter().find(|f| itag(f) == ITAG_FALLBACK) {
        return Some(f);
    }

    all
        .into_iter()
        .filter(|f| is_audio(f))
        .max_by_key(|f| f.get("bitrate").and_then(|v| v.as_i64()).unwrap_or(0))
}

/// Plain `url` of a format. Ciphered formats yield `None`.
pub fn direct_url(format: &Value) -> Option<String> {
    format
        .get("url")
        .and_then(|u| u.as_str())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_prefers_opus_over_aac() {
        let data = json!({
            "adaptiveFormats": [
                { "itag": 140, "mimeType": "audio/mp4", "url": "https://cdn/140" },
                {
                    "itag": 251,
                    "mimeType": "audio/webm; codecs=\"opus\"",
                    "url": "https://cdn/251"
                },
            ],
            "formats": [{ "itag": 18, "mimeType": "video/mp4", "url": "https://cdn/18" }]
        });
        let chosen = select_best_audio_format(&data).unwrap();
        assert_eq!(direct_url(chosen).as_deref(), Some("https://cdn/251"));
    }

    #[test]
    fn test_falls_back_to_muxed_then_bitrate() {
        let muxed = json!({
            "formats": [{ "itag": 18, "mimeType": "video/mp4", "url": "https://cdn/18" }]
        });
        assert_eq!(itag(select_best_audio_format(&muxed).unwrap()), 18);

        let audio_only = json!({
            "adaptiveFormats": [
                { "itag": 600, "mimeType": "audio/webm", "bitrate": 32000 },
                { "itag": 601, "mimeType": "audio/webm", "bitrate": 96000 },
                { "itag": 137, "mimeType": "video/mp4", "bitrate": 4000000 },
            ]
        });
        assert_eq!(itag(select_best_audio_format(&audio_only).unwrap()), 601);
        assert!(select_best_audio_format(&json!({})).is_none());
    }

    #[test]
    fn test_ciphered_format_has_no_direct_url() {
        let format = json!({ "itag": 251, "signatureCipher": "s=abc&url=https%3A%2F%2Fcdn" });
        assert_eq!(direct_url(&format), None);
    }

    #[test]
    fn test_unplayable_status_is_reported() {
        let body = json!({
            "playabilityStatus": {
                "status": "LOGIN_REQUIRED",
                "reason": "Sign in to confirm you're not a bot"
            }
        });
        match streaming_data(&body) {
            Err(ExtractionError::Unplayable { status, reason }) => {
                assert_eq!(status, "LOGIN_REQUIRED");
                assert!(reason.contains("not a bot"));
            }
            other => panic!("unexpected: {:?}", other),
        }

        let no_data = json!({ "playabilityStatus": { "status": "OK" } });
        assert!(matches!(
            streaming_data(&no_data),
            Err(ExtractionError::MissingStreamingData)
        ));
    }
}
