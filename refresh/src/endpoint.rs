//! Read-only management endpoint.
//!
//! - `GET /remote-config/refresh-history`: refresh ledger, newest first
//! - `GET /remote-config/sources`: cached layers and the refresh count
//! - `GET /health`: store health

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use rc_core::RefreshRecord;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::refresher::ContextRefresher;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceSummary {
    pub data_id: String,
    pub group: String,
    pub refreshable: bool,
    pub loaded_at: DateTime<Utc>,
    pub property_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourcesResponse {
    pub refresh_count: u64,
    pub sources: Vec<SourceSummary>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Creates the management router.
pub fn router(refresher: Arc<ContextRefresher>) -> Router {
    Router::new()
        .route("/remote-config/refresh-history", get(refresh_history))
        .route("/remote-config/sources", get(sources))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(refresher)
}

async fn refresh_history(
    State(refresher): State<Arc<ContextRefresher>>,
) -> Json<Vec<RefreshRecord>> {
    Json(refresher.history().snapshot())
}

async fn sources(State(refresher): State<Arc<ContextRefresher>>) -> Json<SourcesResponse> {
    let context = refresher.context();
    let sources = context
        .cache()
        .list_all()
        .iter()
        .map(|layer| SourceSummary {
            data_id: layer.source_id().to_string(),
            group: layer.group().to_string(),
            refreshable: layer.is_refreshable(),
            loaded_at: layer.loaded_at(),
            property_count: layer.property_count(),
        })
        .collect();

    Json(SourcesResponse {
        refresh_count: context.refresh_count().get(),
        sources,
    })
}

async fn health(State(refresher): State<Arc<ContextRefresher>>) -> impl IntoResponse {
    if refresher.store().is_healthy() {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "UP".to_string(),
            }),
        )
    } else {
        tracing::warn!("Configuration store reports unhealthy");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "DOWN".to_string(),
            }),
        )
    }
}
