//! Error taxonomy shared by the pipeline and both entry points.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Input could not be resolved to a platform handle.
    #[error("invalid handle: {0:?}")]
    InvalidHandle(String),

    /// The credential store is missing or holds no usable accounts.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Anything the backend surfaced while fetching: network, rate limit, platform.
    #[error("backend fetch failed: {0}")]
    Backend(String),

    /// Saving results to disk failed.
    #[error("failed to write {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Whether the caller, not the backend or the host, caused the failure.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidHandle(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
