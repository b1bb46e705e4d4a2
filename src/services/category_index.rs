use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::graph::{GameSource, GraphError};
use crate::models::AttributeKind;

static NO_GAMES: BTreeSet<String> = BTreeSet::new();

/// Category value to game names, for each attribute kind.
///
/// Games from different sources are joined purely by exact name equality:
/// a game named identically in both graphs lands in the same set once.
#[derive(Debug, Clone)]
pub struct CategoryIndex {
    by_kind: HashMap<AttributeKind, HashMap<String, BTreeSet<String>>>,
    pub built_at: DateTime<Utc>,
}

impl Default for CategoryIndex {
    fn default() -> Self {
        Self {
            by_kind: HashMap::new(),
            built_at: Utc::now(),
        }
    }
}

impl CategoryIndex {
    /// Queries every source for every category kind it carries.
    /// Any failure aborts the whole build.
    pub async fn build(sources: &[Arc<dyn GameSource>]) -> Result<Self, GraphError> {
        let start = std::time::Instant::now();
        let mut index = Self::default();

        for source in sources {
            for kind in AttributeKind::ALL {
                let memberships = source.category_memberships(kind).await.map_err(|e| {
                    error!(source = %source.tag(), kind = %kind, error = %e, "Category query failed");
                    e
                })?;

                for membership in memberships {
                    index.insert(kind, &membership.value, &membership.game);
                }
            }
        }

        info!(
            genres = index.len_of(AttributeKind::Genre),
            platforms = index.len_of(AttributeKind::Platform),
            developers = index.len_of(AttributeKind::Developer),
            elapsed_ms = start.elapsed().as_millis(),
            built_at = %index.built_at,
            "Category index built"
        );

        Ok(index)
    }

    pub fn insert(&mut self, kind: AttributeKind, value: &str, game: &str) {
        self.by_kind
            .entry(kind)
            .or_default()
            .entry(value.to_string())
            .or_default()
            .insert(game.to_string());
    }

    /// Games carrying `value`; empty for unknown values
    pub fn games_with(&self, kind: AttributeKind, value: &str) -> &BTreeSet<String> {
        self.by_kind
            .get(&kind)
            .and_then(|values| values.get(value))
            .unwrap_or(&NO_GAMES)
    }

    pub fn games_with_genre(&self, genre: &str) -> &BTreeSet<String> {
        self.games_with(AttributeKind::Genre, genre)
    }

    pub fn games_with_platform(&self, platform: &str) -> &BTreeSet<String> {
        self.games_with(AttributeKind::Platform, platform)
    }

    pub fn games_with_developer(&self, developer: &str) -> &BTreeSet<String> {
        self.games_with(AttributeKind::Developer, developer)
    }

    /// Number of distinct values indexed for `kind`
    pub fn len_of(&self, kind: AttributeKind) -> usize {
        self.by_kind.get(&kind).map_or(0, HashMap::len)
    }
}

/// Holds the live index snapshot and swaps in rebuilt ones without locking readers.
pub struct IndexStore {
    inner: ArcSwap<CategoryIndex>,
    reloading: AtomicBool,
}

impl IndexStore {
    pub fn new(initial: CategoryIndex) -> Self {
        Self {
            inner: ArcSwap::new(Arc::new(initial)),
            reloading: AtomicBool::new(false),
        }
    }

    /// Snapshot for one request; stays consistent across a concurrent reload
    pub fn load_full(&self) -> Arc<CategoryIndex> {
        self.inner.load_full()
    }

    /// Rebuilds from the sources; keeps the current snapshot on failure.
    /// Returns whether a new snapshot was installed.
    pub async fn reload(&self, sources: &[Arc<dyn GameSource>]) -> bool {
        if self
            .reloading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Category index reload already in progress, skipping");
            return false;
        }

        let installed = match CategoryIndex::build(sources).await {
            Ok(index) => {
                let previous = self.inner.load().built_at;
                let built_at = index.built_at;
                self.inner.store(Arc::new(index));
                info!(%previous, %built_at, "Category index reloaded");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to rebuild category index, keeping stale data");
                false
            }
        };

        self.reloading.store(false, Ordering::SeqCst);
        installed
    }

    /// Spawn a background loop that rebuilds the index every `hours`.
    pub fn spawn_reload_loop(self: &Arc<Self>, sources: Vec<Arc<dyn GameSource>>, hours: u64) {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let interval = reload_interval(hours);
            loop {
                tokio::time::sleep(interval).await;
                store.reload(&sources).await;
            }
        });

        info!(interval_hours = hours, "Category index reload loop started");
    }
}

/// Sleep between rebuilds; saturates instead of overflowing on huge values
pub fn reload_interval(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}
