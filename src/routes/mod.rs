pub mod root;
pub mod tweets;

use axum::Router;
use std::sync::Arc;

use crate::AppState;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(root::routes())
        .merge(tweets::routes())
}
