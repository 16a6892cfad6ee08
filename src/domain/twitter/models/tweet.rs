//! Tweet model definitions

use chrono::{DateTime, Utc};

/// A tweet as delivered by the backend. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Tweet {
    pub id: i64,
    pub id_str: String,
    pub url: String,
    pub date: DateTime<Utc>,
    pub username: String,
    pub displayname: String,
    pub raw_content: String,
    pub like_count: i64,
    pub retweet_count: i64,
    pub reply_count: i64,
    pub is_retweet: bool,
    pub is_pinned: bool,
    pub media: Vec<MediaItem>,
    pub links: Vec<Link>,
    /// The backend's record exactly as received, for pass-through output
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
    Animated,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Animated => "animated",
        }
    }
}

/// A photo, video or GIF attached to a tweet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub url: String,
}

/// An outbound link found in a tweet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Resolved destination
    pub url: String,
    /// Anchor text shown in the tweet body
    pub text: Option<String>,
    /// Platform-shortened redirect (t.co)
    pub tcourl: Option<String>,
}
