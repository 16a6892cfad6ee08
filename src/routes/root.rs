//! Service description and liveness endpoints

use axum::{Json, Router, routing::get};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

/// GET / - What this service is and which endpoints it serves
async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME"),
        description: "Fetch recent tweets for a user, with optional filters",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            EndpointInfo {
                method: "GET",
                path: "/tweets",
                description: "Filtered tweets as {tweets, count}",
            },
            EndpointInfo {
                method: "GET",
                path: "/tweets/json",
                description: "Filtered tweets as raw backend records",
            },
            EndpointInfo {
                method: "GET",
                path: "/health",
                description: "Liveness check",
            },
        ],
    })
}

async fn health() -> &'static str {
    "ok"
}
