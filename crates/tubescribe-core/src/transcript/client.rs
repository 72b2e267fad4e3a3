use std::{sync::LazyLock, time::Duration};

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, header};
use tracing::debug;

use crate::{
    error::TranscriptError,
    transcript::{
        TranscriptSource,
        tracks::{PlayerResponse, decode_json3, select_track},
    },
    types::{TranscriptFragment, WATCH_URL},
};

const PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const ANDROID_CLIENT_VERSION: &str = "20.10.38";

static INNERTUBE_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).unwrap());
static CONSENT_VALUE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name="v" value="(.*?)""#).unwrap());

/// Fetches captions the way the YouTube web player discovers them.
pub struct CaptionClient {
    client: Client,
    languages: Vec<String>,
}

impl CaptionClient {
    pub fn new(languages: Vec<String>) -> Result<Self, TranscriptError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self::with_client(client, languages))
    }

    pub fn with_client(client: Client, languages: Vec<String>) -> Self {
        Self { client, languages }
    }

    async fn fetch_watch_html(&self, video_id: &str) -> Result<String, TranscriptError> {
        let url = format!("{}{}", WATCH_URL, video_id);
        let html = self.get_text(&url, None).await?;

        if !html.contains(r#"action="https://consent.youtube.com/s""#) {
            return Ok(html);
        }

        // EU consent interstitial: accept and retry once.
        let Some(value) = CONSENT_VALUE_REGEX
            .captures(&html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
        else {
            return Err(TranscriptError::Parse(
                "consent page without a consent token".to_string(),
            ));
        };
        debug!(video_id, "accepting consent interstitial");
        let cookie = format!("CONSENT=YES+{}", value);
        let html = self.get_text(&url, Some(&cookie)).await?;
        if html.contains(r#"action="https://consent.youtube.com/s""#) {
            return Err(TranscriptError::Parse(
                "consent cookie was not accepted".to_string(),
            ));
        }
        Ok(html)
    }

    async fn get_text(&self, url: &str, cookie: Option<&str>) -> Result<String, TranscriptError> {
        let mut request = self
            .client
            .get(url)
            .header(header::ACCEPT_LANGUAGE, "en-US");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    async fn fetch_player(
        &self,
        video_id: &str,
        api_key: &str,
    ) -> Result<PlayerResponse, TranscriptError> {
        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": "ANDROID",
                    "clientVersion": ANDROID_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        let response = self
            .client
            .post(PLAYER_URL)
            .query(&[("key", api_key)])
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TranscriptError::RequestBlocked {
                video_id: video_id.to_string(),
            });
        }
        let response = response.error_for_status()?;
        Ok(response.json::<PlayerResponse>().await?)
    }
}

/// Extract the innertube key from a watch page.
fn innertube_api_key(html: &str, video_id: &str) -> Result<String, TranscriptError> {
    if let Some(key) = INNERTUBE_KEY_REGEX.captures(html).and_then(|c| c.get(1)) {
        return Ok(key.as_str().to_string());
    }
    if html.contains(r#"class="g-recaptcha""#) {
        return Err(TranscriptError::RequestBlocked {
            video_id: video_id.to_string(),
        });
    }
    Err(TranscriptError::Parse(format!(
        "no innertube key on watch page for {}",
        video_id
    )))
}

#[async_trait]
impl TranscriptSource for CaptionClient {
    async fn fetch_transcript(
        &self,
        video_id: &str,
    ) -> Result<Vec<TranscriptFragment>, TranscriptError> {
        let html = self.fetch_watch_html(video_id).await?;
        let api_key = innertube_api_key(&html, video_id)?;

        let tracks = self
            .fetch_player(video_id, &api_key)
            .await?
            .into_tracks(video_id)?;

        let Some(track) = select_track(&tracks, &self.languages) else {
            return Err(TranscriptError::NoTranscriptFound {
                video_id: video_id.to_string(),
                languages: self.languages.clone(),
            });
        };
        debug!(
            video_id,
            language = %track.language_code,
            generated = track.is_generated(),
            "fetching caption track"
        );

        let body = self.get_text(&track.json3_url(), None).await?;
        decode_json3(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_innertube_key() {
        let html = r#"<script>ytcfg.set({"INNERTUBE_API_KEY": "AIzaTestKey_123-x","INNERTUBE_CLIENT_NAME":"WEB"});</script>"#;
        assert_eq!(innertube_api_key(html, "v1").unwrap(), "AIzaTestKey_123-x");
    }

    #[test]
    fn recaptcha_page_is_blocked() {
        let html = r#"<html><div class="g-recaptcha" data-sitekey="x"></div></html>"#;
        assert!(matches!(
            innertube_api_key(html, "v1"),
            Err(TranscriptError::RequestBlocked { .. })
        ));
        assert!(matches!(
            innertube_api_key("<html></html>", "v1"),
            Err(TranscriptError::Parse(_))
        ));
    }

    #[test]
    fn consent_token_pattern() {
        let html = r#"<form action="https://consent.youtube.com/s"><input type="hidden" name="v" value="cb.20240101-00-p0"></form>"#;
        let value = CONSENT_VALUE_REGEX
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str());
        assert_eq!(value, Some("cb.20240101-00-p0"));
    }
}
