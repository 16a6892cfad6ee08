//! Application constants

/// Default number of tweets returned per request
pub const DEFAULT_LIMIT: usize = 10;

/// Maximum number of tweets returned per request
pub const MAX_LIMIT: usize = 100;

/// Raw records requested from the backend per wanted tweet, so filtering has headroom
pub const RAW_FETCH_FACTOR: usize = 3;

/// Default credential store handed to the backend
pub const DEFAULT_DB_PATH: &str = "./accounts.db";

/// Default backend executable
pub const DEFAULT_BACKEND_PROGRAM: &str = "twscrape";

/// Default bind address for `serve`
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port for `serve`
pub const DEFAULT_PORT: u16 = 8000;
