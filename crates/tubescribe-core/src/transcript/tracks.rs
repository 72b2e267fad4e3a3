use serde::Deserialize;

use crate::{error::TranscriptError, types::TranscriptFragment};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    pub kind: Option<String>,
}

impl CaptionTrack {
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    /// Timed-text URL asking for the json3 format.
    pub fn json3_url(&self) -> String {
        let base = self.base_url.replace("&fmt=srv3", "");
        format!("{}&fmt=json3", base)
    }
}

impl PlayerResponse {
    /// Caption tracks of a playable video.
    pub fn into_tracks(self, video_id: &str) -> Result<Vec<CaptionTrack>, TranscriptError> {
        if let Some(playability) = self.playability_status {
            if playability.status != "OK" {
                let reason = playability.reason.unwrap_or_default();
                if playability.status == "LOGIN_REQUIRED" && reason.contains("not a bot") {
                    return Err(TranscriptError::RequestBlocked {
                        video_id: video_id.to_string(),
                    });
                }
                return Err(TranscriptError::VideoUnavailable {
                    video_id: video_id.to_string(),
                    reason: if reason.is_empty() {
                        playability.status
                    } else {
                        reason
                    },
                });
            }
        }

        let tracks = self
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .map(|r| r.caption_tracks)
            .unwrap_or_default();

        if tracks.is_empty() {
            return Err(TranscriptError::TranscriptsDisabled {
                video_id: video_id.to_string(),
            });
        }
        Ok(tracks)
    }
}

/// First track in language preference order; within a language, manual before generated.
pub fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    languages: &[String],
) -> Option<&'a CaptionTrack> {
    let (manual, generated): (Vec<_>, Vec<_>) = tracks.iter().partition(|t| !t.is_generated());

    for lang in languages {
        for pool in [&manual, &generated] {
            if let Some(track) = pool.iter().find(|t| t.language_code == *lang) {
                return Some(*track);
            }
        }
    }
    None
}

#[derive(Debug, Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

pub fn decode_json3(body: &str) -> Result<Vec<TranscriptFragment>, TranscriptError> {
    let doc: Json3 = serde_json::from_str(body)?;

    let fragments = doc
        .events
        .into_iter()
        .filter_map(|event| {
            let segs = event.segs?;
            let text: String = segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = text.replace('\n', " ").trim().to_string();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptFragment {
                text,
                start: event.t_start_ms as f64 / 1000.0,
                duration: event.d_duration_ms as f64 / 1000.0,
            })
        })
        .collect();

    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(lang: &str, kind: Option<&str>) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://www.youtube.com/api/timedtext?v=x&lang={lang}"),
            language_code: lang.to_string(),
            kind: kind.map(str::to_string),
        }
    }

    fn langs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn prefers_manual_track_within_language() {
        let tracks = vec![
            track("en", Some("asr")),
            track("de", None),
            track("en", None),
        ];

        let chosen = select_track(&tracks, &langs(&["en", "de"])).unwrap();
        assert_eq!(chosen.language_code, "en");
        assert!(!chosen.is_generated());

        let chosen = select_track(&tracks, &langs(&["fr", "de"])).unwrap();
        assert_eq!(chosen.language_code, "de");

        assert!(select_track(&tracks, &langs(&["fr"])).is_none());
    }

    #[test]
    fn language_order_beats_manual_tracks() {
        let tracks = vec![track("en", None), track("de", Some("asr"))];
        let chosen = select_track(&tracks, &langs(&["de", "en"])).unwrap();
        assert_eq!(chosen.language_code, "de");
        assert!(chosen.is_generated());

        let chosen = select_track(&tracks, &langs(&["en", "de"])).unwrap();
        assert_eq!(chosen.language_code, "en");
    }

    #[test]
    fn falls_back_to_generated_track() {
        let tracks = vec![track("en", Some("asr")), track("de", None)];
        let chosen = select_track(&tracks, &langs(&["en"])).unwrap();
        assert!(chosen.is_generated());
    }

    #[test]
    fn json3_url_replaces_format() {
        let mut t = track("en", None);
        t.base_url.push_str("&fmt=srv3");
        assert_eq!(
            t.json3_url(),
            "https://www.youtube.com/api/timedtext?v=x&lang=en&fmt=json3"
        );
    }

    #[test]
    fn player_response_without_captions_is_disabled() {
        let response: PlayerResponse =
            serde_json::from_str(r#"{"playabilityStatus": {"status": "OK"}}"#).unwrap();
        assert!(matches!(
            response.into_tracks("v2"),
            Err(TranscriptError::TranscriptsDisabled { .. })
        ));
    }

    #[test]
    fn unplayable_video_is_unavailable() {
        let response: PlayerResponse = serde_json::from_str(
            r#"{"playabilityStatus": {"status": "ERROR", "reason": "This video is unavailable"}}"#,
        )
        .unwrap();
        match response.into_tracks("gone") {
            Err(TranscriptError::VideoUnavailable { reason, .. }) => {
                assert_eq!(reason, "This video is unavailable")
            }
            other => panic!("unexpected: {other:?}"),
        }

        let response: PlayerResponse = serde_json::from_str(
            r#"{"playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": "Sign in to confirm you're not a bot"}}"#,
        )
        .unwrap();
        assert!(matches!(
            response.into_tracks("v"),
            Err(TranscriptError::RequestBlocked { .. })
        ));
    }

    #[test]
    fn player_response_lists_tracks() {
        let body = r#"{
            "playabilityStatus": {"status": "OK"},
            "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
                {"baseUrl": "https://www.youtube.com/api/timedtext?v=v1&lang=en", "languageCode": "en", "name": {"runs": [{"text": "English"}]}},
                {"baseUrl": "https://www.youtube.com/api/timedtext?v=v1&lang=en&kind=asr", "languageCode": "en", "kind": "asr"}
            ]}}
        }"#;
        let response: PlayerResponse = serde_json::from_str(body).unwrap();
        let tracks = response.into_tracks("v1").unwrap();
        assert_eq!(tracks.len(), 2);
        assert!(tracks[1].is_generated());
    }

    #[test]
    fn decodes_json3_events() {
        let body = r#"{"wireMagic": "pb3", "events": [
            {"tStartMs": 0, "dDurationMs": 2000, "id": 1, "wpWinPosId": 1},
            {"tStartMs": 120, "dDurationMs": 1500, "segs": [{"utf8": "Hello"}]},
            {"tStartMs": 1620, "aAppend": 1, "segs": [{"utf8": "\n"}]},
            {"tStartMs": 1700, "dDurationMs": 900, "segs": [{"utf8": "wor"}, {"utf8": "ld\nagain"}]}
        ]}"#;
        let fragments = decode_json3(body).unwrap();
        let texts: Vec<_> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "world again"]);
        assert_eq!(fragments[0].start, 0.12);
        assert_eq!(fragments[0].duration, 1.5);
    }

    #[test]
    fn rejects_malformed_json3() {
        assert!(matches!(
            decode_json3("<transcript/>"),
            Err(TranscriptError::Parse(_))
        ));
    }
}
