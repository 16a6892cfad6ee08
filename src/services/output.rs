//! Public JSON shapes and file output for fetched tweets

use std::path::{Path, PathBuf};

use chrono::{DateTime, Timelike, Utc};
use clap::ValueEnum;
use serde::Serialize;

use crate::domain::twitter::{Link, MediaItem, Tweet};
use crate::error::{Error, Result};

/// How a result collection is serialized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Backend records verbatim, as a JSON array
    #[default]
    Raw,
    /// `{ "tweets": [...], "count": N }`
    Normalized,
}

/// Normalized response body
#[derive(Debug, Clone, Serialize)]
pub struct TweetsResponse {
    pub tweets: Vec<TweetResponse>,
    pub count: usize,
}

impl TweetsResponse {
    pub fn from_tweets(tweets: &[Tweet]) -> Self {
        let tweets: Vec<TweetResponse> = tweets.iter().map(TweetResponse::from).collect();
        Self {
            count: tweets.len(),
            tweets,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetResponse {
    pub id: i64,
    #[serde(rename = "id_str")]
    pub id_str: String,
    pub url: String,
    pub date: String,
    pub username: String,
    pub displayname: String,
    pub raw_content: String,
    pub like_count: i64,
    pub retweet_count: i64,
    pub reply_count: i64,
    pub is_retweet: bool,
    pub is_pinned: bool,
    pub media: Vec<MediaResponse>,
    pub links: Vec<LinkResponse>,
}

impl From<&Tweet> for TweetResponse {
    fn from(t: &Tweet) -> Self {
        Self {
            id: t.id,
            id_str: t.id_str.clone(),
            url: t.url.clone(),
            date: format_date(&t.date),
            username: t.username.clone(),
            displayname: t.displayname.clone(),
            raw_content: t.raw_content.clone(),
            like_count: t.like_count,
            retweet_count: t.retweet_count,
            reply_count: t.reply_count,
            is_retweet: t.is_retweet,
            is_pinned: t.is_pinned,
            media: t.media.iter().map(MediaResponse::from).collect(),
            links: t.links.iter().map(LinkResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaResponse {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub url: String,
}

impl From<&MediaItem> for MediaResponse {
    fn from(m: &MediaItem) -> Self {
        Self {
            kind: m.kind.as_str(),
            url: m.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkResponse {
    pub url: String,
    pub text: Option<String>,
    pub tcourl: Option<String>,
}

impl From<&Link> for LinkResponse {
    fn from(l: &Link) -> Self {
        Self {
            url: l.url.clone(),
            text: l.text.clone(),
            tcourl: l.tcourl.clone(),
        }
    }
}

/// `2023-03-09 20:18:33+00:00`, with microseconds only when present
pub fn format_date(date: &DateTime<Utc>) -> String {
    if date.nanosecond() == 0 {
        date.format("%Y-%m-%d %H:%M:%S%:z").to_string()
    } else {
        date.format("%Y-%m-%d %H:%M:%S%.6f%:z").to_string()
    }
}

/// The backend's own records for `tweets`, untouched
pub fn raw_records(tweets: &[Tweet]) -> Vec<serde_json::Value> {
    tweets.iter().map(|t| t.raw.clone()).collect()
}

/// Pretty-printed JSON in the requested format
pub fn render(tweets: &[Tweet], format: OutputFormat) -> serde_json::Result<Vec<u8>> {
    match format {
        OutputFormat::Raw => serde_json::to_vec_pretty(&raw_records(tweets)),
        OutputFormat::Normalized => serde_json::to_vec_pretty(&TweetsResponse::from_tweets(tweets)),
    }
}

/// `{handle}_tweets.json` in the working directory
pub fn default_output_path(handle: &str) -> PathBuf {
    PathBuf::from(format!("{handle}_tweets.json"))
}

pub async fn save_to_file(tweets: &[Tweet], path: &Path, format: OutputFormat) -> Result<()> {
    let write_error = |source: std::io::Error| Error::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let bytes = render(tweets, format).map_err(|e| write_error(e.into()))?;
    tokio::fs::write(path, bytes).await.map_err(write_error)
}
