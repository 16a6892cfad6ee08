//! Tweet fetch endpoints (/tweets, /tweets/json)

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Deserializer, de};
use std::path::PathBuf;
use std::sync::Arc;

use crate::AppState;
use crate::constants::DEFAULT_LIMIT;
use crate::domain::twitter::{FilterCriteria, Tweet};
use crate::services::error::ApiError;
use crate::services::output::{TweetsResponse, raw_records};
use crate::services::pipeline::{self, FetchRequest};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tweets", get(get_tweets))
        .route("/tweets/json", get(get_tweets_json))
}

#[derive(Debug, Deserialize)]
struct TweetsQuery {
    username_or_url: String,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default, deserialize_with = "flag")]
    include_retweets: bool,
    #[serde(default, deserialize_with = "flag")]
    exclude_pinned: bool,
    #[serde(default, deserialize_with = "flag")]
    only_media: bool,
    #[serde(default, deserialize_with = "flag")]
    only_links: bool,
    db_path: Option<PathBuf>,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// Accepts true/false, 1/0, yes/no, on/off
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(de::Error::invalid_value(
            de::Unexpected::Str(&value),
            &"a boolean",
        )),
    }
}

impl TweetsQuery {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            include_retweets: self.include_retweets,
            exclude_pinned: self.exclude_pinned,
            only_media: self.only_media,
            only_links: self.only_links,
        }
    }
}

async fn fetch(state: &AppState, query: TweetsQuery) -> Result<Vec<Tweet>, ApiError> {
    let criteria = query.criteria();
    let request = FetchRequest {
        handle: query.username_or_url,
        limit: query.limit,
        db_path: query
            .db_path
            .unwrap_or_else(|| state.config.default_db_path.clone()),
    };

    Ok(pipeline::fetch_tweets(state.backend.as_ref(), &request, &criteria).await?)
}

/// GET /tweets - Filtered tweets in the normalized shape
async fn get_tweets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TweetsQuery>,
) -> Result<Json<TweetsResponse>, ApiError> {
    let tweets = fetch(&state, query).await?;
    Ok(Json(TweetsResponse::from_tweets(&tweets)))
}

/// GET /tweets/json - Same selection, backend records verbatim
async fn get_tweets_json(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TweetsQuery>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let tweets = fetch(&state, query).await?;
    Ok(Json(raw_records(&tweets)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::services::backend::fake::{FakeBackend, tweet};

    fn app(backend: Arc<FakeBackend>) -> Router {
        let state = Arc::new(AppState {
            backend,
            config: Config::default(),
        });
        routes().with_state(state)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn five_with_two_retweets() -> Vec<Tweet> {
        let mut tweets: Vec<Tweet> = (1..=5).map(tweet).collect();
        tweets[1].is_retweet = true;
        tweets[3].is_retweet = true;
        tweets
    }

    #[tokio::test]
    async fn tweets_excludes_retweets_by_default() {
        let backend = Arc::new(FakeBackend::with_tweets(five_with_two_retweets()));

        let (status, body) = get(app(backend), "/tweets?username_or_url=jack&limit=10").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 3);
        assert_eq!(body["tweets"].as_array().unwrap().len(), 3);
        assert_eq!(body["tweets"][0]["rawContent"], "tweet number 1");
    }

    #[tokio::test]
    async fn lenient_flags_are_accepted() {
        let backend = Arc::new(FakeBackend::with_tweets(five_with_two_retweets()));

        let (status, body) = get(
            app(backend),
            "/tweets?username_or_url=https%3A%2F%2Fx.com%2Fjack&include_retweets=1&only_media=no",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 5);
    }

    #[tokio::test]
    async fn only_media_without_media_is_empty() {
        let backend = Arc::new(FakeBackend::with_tweets((1..=3).map(tweet).collect()));

        let (status, body) = get(app(backend), "/tweets?username_or_url=jack&only_media=true").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "tweets": [], "count": 0 }));
    }

    #[tokio::test]
    async fn json_endpoint_returns_raw_records() {
        let backend = Arc::new(FakeBackend::with_tweets(five_with_two_retweets()));

        let (status, body) = get(app(backend), "/tweets/json?username_or_url=jack&limit=2").await;

        assert_eq!(status, StatusCode::OK);
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["_type"], "snscrape.modules.twitter.Tweet");
        assert_eq!(records[1]["id"], 3);
    }

    #[tokio::test]
    async fn missing_username_is_client_error() {
        let backend = Arc::new(FakeBackend::default());

        let (status, _) = get(app(backend.clone()), "/tweets?limit=5").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(backend.opens(), 0);
    }

    #[tokio::test]
    async fn invalid_handle_is_client_error() {
        let backend = Arc::new(FakeBackend::default());

        let (status, body) = get(app(backend.clone()), "/tweets?username_or_url=%40%40%40").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("invalid handle"));
        assert_eq!(backend.opens(), 0);
    }

    #[tokio::test]
    async fn authentication_failure_is_server_error() {
        let backend = Arc::new(FakeBackend::failing_auth());

        let (status, body) = get(app(backend), "/tweets/json?username_or_url=jack&db_path=%2Ftmp%2Fnone.db").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().contains("/tmp/none.db"));
    }

    #[tokio::test]
    async fn backend_failure_is_bad_gateway() {
        let backend = Arc::new(FakeBackend::failing_after((1..=3).map(tweet).collect(), 1));

        let (status, body) = get(app(backend), "/tweets?username_or_url=jack").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["detail"].as_str().unwrap().contains("rate limited"));
    }

    #[tokio::test]
    async fn limit_above_maximum_is_clamped() {
        let backend = Arc::new(FakeBackend::with_tweets((1..=400).map(tweet).collect()));

        let (status, body) = get(app(backend), "/tweets?username_or_url=jack&limit=250").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 100);
    }
}
