use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::{
    error::AppResult,
    graph::{GameSource, GraphError},
    models::{AttributeKind, Recommendation, RecommendationType},
    services::{
        category_index::CategoryIndex,
        or_empty,
        ranker::{result_cap, ScoreAccumulator},
    },
};

/// Points for each preferred genre a candidate carries
const GENRE_WEIGHT: u64 = 2;
/// Points for each preferred platform a candidate is available on
const PLATFORM_WEIGHT: u64 = 1;

/// Recommends unplayed games matching the genres and platforms of games the
/// user likes
///
/// Each of the three lookups degrades to an empty signal on failure.
pub async fn recommend_by_preferences(
    sources: &[Arc<dyn GameSource>],
    index: &CategoryIndex,
    user_id: &str,
    limit: i64,
) -> AppResult<Vec<Recommendation>> {
    let Some(cap) = result_cap(limit) else {
        return Ok(Vec::new());
    };

    let genres = or_empty(
        preferred_genres(sources, user_id).await,
        "preferred genres",
        user_id,
    );
    let platforms = or_empty(
        preferred_platforms(sources, user_id).await,
        "preferred platforms",
        user_id,
    );
    let owned = or_empty(owned_games(sources, user_id).await, "user games", user_id);

    tracing::debug!(
        user_id = %user_id,
        genres = genres.len(),
        platforms = platforms.len(),
        owned = owned.len(),
        "User preference signals collected"
    );

    let mut scores = ScoreAccumulator::new();
    accumulate(&mut scores, index, AttributeKind::Genre, &genres, &owned, GENRE_WEIGHT);
    accumulate(
        &mut scores,
        index,
        AttributeKind::Platform,
        &platforms,
        &owned,
        PLATFORM_WEIGHT,
    );

    let recommendations = scores.rank(cap, RecommendationType::Preference);

    tracing::info!(
        user_id = %user_id,
        count = recommendations.len(),
        "Generated preference recommendations"
    );

    Ok(recommendations)
}

fn accumulate(
    scores: &mut ScoreAccumulator,
    index: &CategoryIndex,
    kind: AttributeKind,
    values: &BTreeSet<String>,
    owned: &HashSet<String>,
    weight: u64,
) {
    for value in values {
        for game in index.games_with(kind, value) {
            if !owned.contains(game) {
                scores.add(game, game, weight);
            }
        }
    }
}

async fn preferred_genres(
    sources: &[Arc<dyn GameSource>],
    user_id: &str,
) -> Result<BTreeSet<String>, GraphError> {
    let mut genres = BTreeSet::new();
    for source in sources {
        genres.extend(source.liked_genres(user_id).await?);
    }
    Ok(genres)
}

async fn preferred_platforms(
    sources: &[Arc<dyn GameSource>],
    user_id: &str,
) -> Result<BTreeSet<String>, GraphError> {
    let mut platforms = BTreeSet::new();
    for source in sources {
        platforms.extend(source.liked_platforms(user_id).await?);
    }
    Ok(platforms)
}

/// Games the user played or liked, across every source
async fn owned_games(
    sources: &[Arc<dyn GameSource>],
    user_id: &str,
) -> Result<HashSet<String>, GraphError> {
    let mut games = HashSet::new();
    for source in sources {
        games.extend(source.user_games(user_id).await?);
    }
    Ok(games)
}
