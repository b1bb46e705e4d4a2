use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult, middleware::request_id::RequestId, models::SearchHit, routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub games: Vec<SearchHit>,
}

/// Handler for game name search
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchResponse>> {
    tracing::debug!(request_id = %request_id, query = %params.q, "Processing game search");

    let games = state.recommender.search_games(&params.q).await?;

    Ok(Json(SearchResponse {
        success: true,
        games,
    }))
}
