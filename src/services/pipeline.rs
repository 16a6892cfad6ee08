//! Fetch orchestration: resolve → open session → stream → filter → limit.

use std::path::PathBuf;

use futures::TryStreamExt;
use tracing::{debug, info, warn};

use super::backend::TweetBackend;
use crate::constants::{MAX_LIMIT, RAW_FETCH_FACTOR};
use crate::domain::twitter::{FilterCriteria, Tweet, filters, handle};
use crate::error::Result;

/// What to fetch and with which credentials
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Bare handle or profile URL
    pub handle: String,
    /// Clamped to [`MAX_LIMIT`]
    pub limit: usize,
    pub db_path: PathBuf,
}

impl FetchRequest {
    pub fn effective_limit(&self) -> usize {
        self.limit.min(MAX_LIMIT)
    }
}

/// Collect up to `request.limit` tweets matching `criteria`, newest first.
///
/// Records are filtered as they arrive and the stream is abandoned as soon as the limit
/// is met. A backend that runs dry early is not an error.
pub async fn fetch_tweets(
    backend: &dyn TweetBackend,
    request: &FetchRequest,
    criteria: &FilterCriteria,
) -> Result<Vec<Tweet>> {
    let username = handle::resolve(&request.handle)?;
    let limit = request.effective_limit();

    info!(
        handle = %username,
        limit,
        filters = %criteria.describe(),
        "fetching tweets"
    );

    if limit == 0 {
        return Ok(Vec::new());
    }

    let session = backend.open(&request.db_path).await?;

    let Some(user) = session.user_by_login(&username).await? else {
        warn!(handle = %username, "user not found");
        return Ok(Vec::new());
    };
    debug!(
        user_id = user.id,
        username = %user.username,
        displayname = %user.displayname,
        "resolved user"
    );

    let mut stream = session.user_tweets(user.id, limit.saturating_mul(RAW_FETCH_FACTOR));
    let mut tweets = Vec::with_capacity(limit);
    let mut scanned = 0usize;

    while let Some(tweet) = stream.try_next().await? {
        scanned += 1;
        if !filters::matches(&tweet, criteria) {
            debug!(id = tweet.id, "tweet filtered out");
            continue;
        }
        tweets.push(tweet);
        if tweets.len() >= limit {
            break;
        }
    }

    info!(
        handle = %username,
        scanned,
        collected = tweets.len(),
        "fetch complete"
    );

    Ok(tweets)
}
