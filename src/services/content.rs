use std::sync::Arc;

use crate::{
    error::AppResult,
    graph::GameSource,
    models::{AttributeMode, GameAttributes, Recommendation, RecommendationType},
    services::{
        category_index::CategoryIndex,
        ranker::{result_cap, ScoreAccumulator},
    },
};

/// Recommends games sharing categorical attributes with a seed game
///
/// The seed is looked up in each source in order; an unknown seed is a normal
/// outcome and yields an empty list. Every game sharing an attribute value
/// with the seed scores one point per shared value.
pub async fn recommend_by_game(
    sources: &[Arc<dyn GameSource>],
    index: &CategoryIndex,
    game_name: &str,
    limit: i64,
    mode: AttributeMode,
) -> AppResult<Vec<Recommendation>> {
    let Some(cap) = result_cap(limit) else {
        return Ok(Vec::new());
    };

    if !seed_exists(sources, game_name).await? {
        tracing::warn!(game_name = %game_name, "Seed game not found in any source");
        return Ok(Vec::new());
    }

    let attributes = discover_attributes(sources, game_name, mode).await?;
    tracing::debug!(
        game_name = %game_name,
        attributes = attributes.iter().count(),
        "Seed attributes discovered"
    );

    let scores = score_shared_attributes(index, game_name, &attributes);
    let recommendations = scores.rank(cap, RecommendationType::Content);

    tracing::info!(
        game_name = %game_name,
        count = recommendations.len(),
        "Generated content recommendations"
    );

    Ok(recommendations)
}

async fn seed_exists(sources: &[Arc<dyn GameSource>], game_name: &str) -> AppResult<bool> {
    for source in sources {
        if source.find_game(game_name).await?.is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Collects the seed's attributes from every source, in source order
async fn discover_attributes(
    sources: &[Arc<dyn GameSource>],
    game_name: &str,
    mode: AttributeMode,
) -> AppResult<GameAttributes> {
    let mut observations = Vec::new();
    for source in sources {
        observations.extend(source.game_attributes(game_name).await?);
    }
    Ok(GameAttributes::from_observations(observations, mode))
}

fn score_shared_attributes(
    index: &CategoryIndex,
    seed: &str,
    attributes: &GameAttributes,
) -> ScoreAccumulator {
    let mut scores = ScoreAccumulator::new();

    for (kind, value) in attributes.iter() {
        for game in index.games_with(kind, value) {
            if game != seed {
                scores.add(game, game, 1);
            }
        }
    }

    scores
}
