use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    error::AppResult,
    graph::{GameSource, GraphError},
    models::{ContactLike, Recommendation, RecommendationType},
    services::ranker::{result_cap, ScoreAccumulator},
};

/// Recommends games liked by the user's friends
///
/// Direct friends score one point per distinct friend. When that leaves fewer
/// than `limit` candidates, friends-of-friends are consulted and contribute
/// half their endorsement count, rounded down.
pub async fn recommend_by_friends(
    sources: &[Arc<dyn GameSource>],
    user_id: &str,
    limit: i64,
) -> AppResult<Vec<Recommendation>> {
    let Some(cap) = result_cap(limit) else {
        return Ok(Vec::new());
    };

    let mut scores = ScoreAccumulator::new();

    let mut direct = Vec::new();
    for source in sources {
        direct.extend(source.friend_likes(user_id).await?);
    }
    for (game, friends) in endorsements(direct) {
        scores.add(&game, &game, friends);
    }

    if scores.len() < cap {
        tracing::debug!(
            user_id = %user_id,
            candidates = scores.len(),
            cap,
            "Sparse direct-friend signal, widening to friends of friends"
        );

        match second_degree_likes(sources, user_id).await {
            Ok(likes) => widen(&mut scores, endorsements(likes), cap.saturating_mul(2)),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Friends-of-friends lookup failed");
            }
        }
    }

    let recommendations = scores.rank(cap, RecommendationType::Social);

    tracing::info!(
        user_id = %user_id,
        count = recommendations.len(),
        "Generated social recommendations"
    );

    Ok(recommendations)
}

async fn second_degree_likes(
    sources: &[Arc<dyn GameSource>],
    user_id: &str,
) -> Result<Vec<ContactLike>, GraphError> {
    let mut likes = Vec::new();
    for source in sources {
        likes.extend(source.friend_of_friend_likes(user_id).await?);
    }
    Ok(likes)
}

/// Distinct contacts per game, in first-seen game order
fn endorsements(likes: Vec<ContactLike>) -> Vec<(String, u64)> {
    let mut order: Vec<String> = Vec::new();
    let mut contacts: HashMap<String, HashSet<String>> = HashMap::new();

    for like in likes {
        let entry = contacts.entry(like.game.clone()).or_insert_with(|| {
            order.push(like.game.clone());
            HashSet::new()
        });
        entry.insert(like.contact);
    }

    order
        .into_iter()
        .map(|game| {
            let count = contacts.get(&game).map_or(0, HashSet::len) as u64;
            (game, count)
        })
        .collect()
}

/// Merges discounted second-degree endorsements, strongest first.
///
/// Once the working set holds `ceiling` games no new candidate is admitted;
/// games already present still receive their share.
fn widen(scores: &mut ScoreAccumulator, mut endorsed: Vec<(String, u64)>, ceiling: usize) {
    endorsed.sort_by(|a, b| b.1.cmp(&a.1));

    for (game, contacts) in endorsed {
        if !scores.contains(&game) && scores.len() >= ceiling {
            continue;
        }
        scores.add(&game, &game, contacts / 2);
    }
}
