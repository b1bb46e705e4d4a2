use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    graph::GameSource,
    models::SearchHit,
};

/// Shortest query, in characters, that reaches the graph
pub const MIN_QUERY_CHARS: usize = 2;

/// Searches every source for game names containing `query`
///
/// The query is validated before any source is contacted, and each hit is
/// tagged with the source it came from.
pub async fn search_games(
    sources: &[Arc<dyn GameSource>],
    query: &str,
) -> AppResult<Vec<SearchHit>> {
    let query = query.trim();

    if query.is_empty() {
        return Err(AppError::InvalidInput(
            "Search parameter q is required".to_string(),
        ));
    }

    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Search query must be at least {} characters",
            MIN_QUERY_CHARS
        )));
    }

    let mut hits = Vec::new();
    for source in sources {
        let tag = source.tag();
        hits.extend(
            source
                .search_games(query)
                .await?
                .into_iter()
                .map(|name| SearchHit { name, source: tag }),
        );
    }

    tracing::info!(query = %query, hits = hits.len(), "Game search completed");

    Ok(hits)
}
