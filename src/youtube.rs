use eyre::{Result, bail};
use log::debug;
use serde::Deserialize;

use crate::VideoMetadata;

const API_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(rename = "channelTitle")]
    channel_title: String,
    tags: Option<Vec<String>>,
    description: Option<String>,
}

/// Outcome of a metadata lookup.
///
/// `NotFound` means the API answered with zero items; transport and HTTP
/// failures come back as `Err` instead, so callers can tell "no such video"
/// apart from "API unreachable".
#[derive(Debug)]
pub enum Lookup {
    Found(VideoMetadata),
    NotFound,
}

/// Read the YouTube Data API key from the environment.
pub fn api_key() -> Result<String> {
    std::env::var("YT_TOKEN")
        .map_err(|_| eyre::eyre!("YT_TOKEN environment variable not set (YouTube Data API key)"))
}

/// Fetch snippet metadata for a video via the YouTube Data API v3.
///
/// One call, no retry, no caching.
pub async fn fetch_metadata(client: &reqwest::Client, video_id: &str, api_key: &str) -> Result<Lookup> {
    let url = format!("{API_URL}?id={video_id}&part=snippet&key={api_key}");
    debug!("Fetching snippet for video {video_id}");

    let resp = client.get(&url).send().await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("YouTube API returned {status}: {body}");
    }

    let list: VideoListResponse = resp.json().await?;
    Ok(into_lookup(list))
}

fn into_lookup(list: VideoListResponse) -> Lookup {
    match list.items.into_iter().next() {
        Some(item) => Lookup::Found(VideoMetadata {
            title: item.snippet.title,
            channel_title: item.snippet.channel_title,
            tags: item.snippet.tags,
            description: item.snippet.description,
        }),
        None => Lookup::NotFound,
    }
}
