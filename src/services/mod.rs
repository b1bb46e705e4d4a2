use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    graph::{GameSource, GraphError},
    models::{AttributeMode, Recommendation, SearchHit, SourceTag},
};

pub mod category_index;
pub mod content;
pub mod preference;
pub mod ranker;
pub mod search;
pub mod similar_users;
pub mod social;

#[cfg(test)]
pub(crate) mod test_support;

pub use category_index::{CategoryIndex, IndexStore};

/// Degrades an auxiliary lookup failure to an empty signal
pub(crate) fn or_empty<T: Default>(
    result: Result<T, GraphError>,
    signal: &'static str,
    user_id: &str,
) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(user_id = %user_id, signal, error = %e, "Lookup failed, continuing without it");
        T::default()
    })
}

/// Entry point for every recommendation operation.
///
/// Owns the ordered list of graph sources and the live category index.
/// Construction via [`Recommender::initialize`] is the startup barrier: it only
/// succeeds once the index has been built.
pub struct Recommender {
    sources: Vec<Arc<dyn GameSource>>,
    index: Arc<IndexStore>,
    attribute_mode: AttributeMode,
}

impl Recommender {
    /// Builds the category index from `sources`; any failure is fatal
    pub async fn initialize(
        sources: Vec<Arc<dyn GameSource>>,
        attribute_mode: AttributeMode,
    ) -> AppResult<Self> {
        let index = CategoryIndex::build(&sources)
            .await
            .map_err(|e| AppError::Initialization(format!("category index: {}", e)))?;

        Ok(Self::with_index(sources, index, attribute_mode))
    }

    pub fn with_index(
        sources: Vec<Arc<dyn GameSource>>,
        index: CategoryIndex,
        attribute_mode: AttributeMode,
    ) -> Self {
        Self {
            sources,
            index: Arc::new(IndexStore::new(index)),
            attribute_mode,
        }
    }

    pub async fn recommend_by_game(
        &self,
        game_name: &str,
        limit: i64,
    ) -> AppResult<Vec<Recommendation>> {
        let index = self.index.load_full();
        content::recommend_by_game(&self.sources, &index, game_name, limit, self.attribute_mode)
            .await
    }

    pub async fn recommend_by_preferences(
        &self,
        user_id: &str,
        limit: i64,
    ) -> AppResult<Vec<Recommendation>> {
        let index = self.index.load_full();
        preference::recommend_by_preferences(&self.sources, &index, user_id, limit).await
    }

    pub async fn recommend_by_friends(
        &self,
        user_id: &str,
        limit: i64,
    ) -> AppResult<Vec<Recommendation>> {
        social::recommend_by_friends(&self.sources, user_id, limit).await
    }

    pub async fn recommend_by_similar_users(
        &self,
        user_id: &str,
        limit: i64,
    ) -> AppResult<Vec<Recommendation>> {
        similar_users::recommend_by_similar_users(&self.sources, user_id, limit).await
    }

    pub async fn search_games(&self, query: &str) -> AppResult<Vec<SearchHit>> {
        search::search_games(&self.sources, query).await
    }

    /// Connectivity of each source, in source order
    pub async fn connectivity(&self) -> Vec<(SourceTag, bool)> {
        let mut statuses = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            statuses.push((source.tag(), source.is_reachable().await));
        }
        statuses
    }

    /// Rebuilds the category index now; the previous snapshot stays on failure
    pub async fn reload_index(&self) -> bool {
        self.index.reload(&self.sources).await
    }

    /// Rebuilds the category index every `hours` in the background
    pub fn spawn_index_reload(&self, hours: u64) {
        self.index.spawn_reload_loop(self.sources.clone(), hours);
    }
}
