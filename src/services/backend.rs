//! Seam between the pipeline and the external scraping backend.
//!
//! The backend owns authentication, pagination and the platform wire format. This crate
//! only opens a session against a credential store, looks up a user and pulls a finite,
//! forward-only stream of tweets. Dropping the stream is the cancellation signal.

use std::path::Path;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Deserialize;

use crate::domain::twitter::Tweet;
use crate::error::Result;

/// Newest-first tweets for one user. Finite; not restartable.
pub type TweetStream = BoxStream<'static, Result<Tweet>>;

/// Account as reported by the backend's user lookup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackendUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub displayname: String,
}

#[async_trait]
pub trait TweetBackend: Send + Sync {
    /// Open a session backed by the credential store at `db_path`.
    ///
    /// Fails with [`crate::error::Error::Authentication`] when no usable credentials exist.
    async fn open(&self, db_path: &Path) -> Result<Box<dyn BackendSession>>;
}

#[async_trait]
pub trait BackendSession: Send + Sync {
    /// `None` when the account does not exist.
    async fn user_by_login(&self, handle: &str) -> Result<Option<BackendUser>>;

    /// At most `limit` raw records, in backend order.
    fn user_tweets(&self, user_id: i64, limit: usize) -> TweetStream;
}
