use axum::{extract::State, Json};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::routes::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: &'static str,
    /// Reachability keyed by source name
    pub connections: BTreeMap<String, bool>,
}

/// Health check endpoint reporting per-source connectivity
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections: BTreeMap<String, bool> = state
        .recommender
        .connectivity()
        .await
        .into_iter()
        .map(|(tag, reachable)| (tag.to_string(), reachable))
        .collect();

    let status = if connections.values().all(|ok| *ok) {
        "healthy"
    } else {
        tracing::warn!(connections = ?connections, "Graph source unreachable");
        "degraded"
    };

    Json(HealthResponse {
        success: true,
        status,
        connections,
    })
}
