use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::AppResult,
    graph::GameSource,
    models::{Recommendation, RecommendationType},
    services::ranker::{result_cap, ScoreAccumulator},
};

/// Recommends games liked by users whose likes overlap the seed user's.
///
/// Each other user contributes their overlap size to every game they like
/// that the seed user has not played or liked.
pub async fn recommend_by_similar_users(
    sources: &[Arc<dyn GameSource>],
    user_id: &str,
    limit: i64,
) -> AppResult<Vec<Recommendation>> {
    let Some(cap) = result_cap(limit) else {
        return Ok(Vec::new());
    };

    let mut scores = ScoreAccumulator::new();
    let mut counted: HashSet<(String, String)> = HashSet::new();
    let mut neighbours: HashSet<String> = HashSet::new();

    for source in sources {
        for like in source.similar_user_likes(user_id).await? {
            if like.other_user == user_id || like.common_games == 0 {
                continue;
            }
            if !counted.insert((like.other_user.clone(), like.game.clone())) {
                continue;
            }
            scores.add(&like.game, &like.game, like.common_games);
            neighbours.insert(like.other_user);
        }
    }

    let recommendations = scores.rank(cap, RecommendationType::SimilarUsers);

    tracing::info!(
        user_id = %user_id,
        similar_users = neighbours.len(),
        count = recommendations.len(),
        "Generated similar-user recommendations"
    );

    Ok(recommendations)
}
