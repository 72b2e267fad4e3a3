use std::{collections::HashSet, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::{ChannelError, Result, UpstreamError},
    types::VideoId,
};

/// Largest page the Data API serves for playlist items.
pub const MAX_PAGE_SIZE: usize = 50;

pub struct PlaylistPage {
    pub video_ids: Vec<String>,
    pub next_page_token: Option<String>,
}

/// Channel and playlist listing calls.
#[async_trait]
pub trait UploadsSource: Send + Sync {
    /// `Ok(None)` when the channel does not exist.
    async fn uploads_playlist_id(
        &self,
        channel_id: &str,
    ) -> std::result::Result<Option<String>, UpstreamError>;

    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_size: usize,
        page_token: Option<&str>,
    ) -> std::result::Result<PlaylistPage, UpstreamError>;
}

/// Collect up to `max_videos` ids from the channel's uploads, in listing order.
///
/// Fails closed: an error part-way through pagination discards what was
/// already gathered.
pub async fn enumerate<S>(source: &S, channel_id: &str, max_videos: usize) -> Result<Vec<VideoId>>
where
    S: UploadsSource + ?Sized,
{
    let channel_id = channel_id.trim();
    if channel_id.is_empty() {
        return Err(ChannelError::InvalidChannelId);
    }
    if max_videos == 0 {
        return Err(ChannelError::InvalidMaxVideos(max_videos));
    }

    let Some(playlist_id) = source.uploads_playlist_id(channel_id).await? else {
        return Err(ChannelError::ChannelNotFound {
            channel_id: channel_id.to_string(),
        });
    };
    debug!(channel_id, %playlist_id, "resolved uploads playlist");

    let mut video_ids: Vec<VideoId> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut page_token: Option<String> = None;

    loop {
        let page_size = MAX_PAGE_SIZE.min(max_videos - video_ids.len());
        let page = match source
            .playlist_page(&playlist_id, page_size, page_token.as_deref())
            .await
        {
            Ok(page) => page,
            Err(e) => {
                if !video_ids.is_empty() {
                    warn!(
                        channel_id,
                        discarded = video_ids.len(),
                        "pagination failed, discarding collected ids"
                    );
                }
                return Err(e.into());
            }
        };

        for id in page.video_ids {
            if video_ids.len() >= max_videos {
                break;
            }
            if !seen.insert(id.clone()) {
                debug!(video_id = %id, "skipping duplicate upload");
                continue;
            }
            if let Some(id) = VideoId::new(id) {
                video_ids.push(id);
            }
        }

        page_token = page.next_page_token.filter(|t| !t.is_empty());
        if page_token.is_none() || video_ids.len() >= max_videos {
            break;
        }
    }

    info!(channel_id, count = video_ids.len(), "enumerated uploads");
    Ok(video_ids)
}

/// YouTube Data API v3 client.
pub struct DataApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl DataApiClient {
    pub fn new(config: &Config) -> std::result::Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> std::result::Result<T, UpstreamError> {
        let url = format!("{}/{}", self.base_url, resource);
        debug!(%url, ?query, "data api request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(UpstreamError::new(
                Some(status.as_u16()),
                api_error_message(&body),
            ));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl UploadsSource for DataApiClient {
    async fn uploads_playlist_id(
        &self,
        channel_id: &str,
    ) -> std::result::Result<Option<String>, UpstreamError> {
        let response: ChannelListResponse = self
            .get("channels", &[("part", "contentDetails"), ("id", channel_id)])
            .await?;
        Ok(response.uploads_playlist_id())
    }

    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_size: usize,
        page_token: Option<&str>,
    ) -> std::result::Result<PlaylistPage, UpstreamError> {
        let max_results = page_size.to_string();
        let mut query = vec![
            ("part", "contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response: PlaylistItemListResponse = self.get("playlistItems", &query).await?;
        Ok(response.into())
    }
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

impl ChannelListResponse {
    fn uploads_playlist_id(self) -> Option<String> {
        self.items
            .into_iter()
            .next()
            .map(|item| item.content_details.related_playlists.uploads)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelItem {
    content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemListResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemContentDetails {
    video_id: String,
}

impl From<PlaylistItemListResponse> for PlaylistPage {
    fn from(response: PlaylistItemListResponse) -> Self {
        PlaylistPage {
            video_ids: response
                .items
                .into_iter()
                .map(|item| item.content_details.video_id)
                .collect(),
            next_page_token: response.next_page_token,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Pull the human message out of Google's error envelope, or fall back to the raw body.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().to_string(),
    }
}
