use std::collections::HashMap;

use crate::models::{Recommendation, RecommendationType};

/// Converts a requested cap into a usable one; caps below 1 yield `None`
pub fn result_cap(limit: i64) -> Option<usize> {
    usize::try_from(limit).ok().filter(|&cap| cap >= 1)
}

/// Per-request candidate scores, remembering first-insertion order
#[derive(Debug, Default)]
pub struct ScoreAccumulator {
    order: Vec<String>,
    scores: HashMap<String, u64>,
    names: HashMap<String, String>,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `points` to a candidate, registering it on first sight even when
    /// `points` is zero
    pub fn add(&mut self, id: &str, name: &str, points: u64) {
        match self.scores.get_mut(id) {
            Some(score) => *score += points,
            None => {
                self.order.push(id.to_string());
                self.scores.insert(id.to_string(), points);
            }
        }
        self.names.insert(id.to_string(), name.to_string());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.scores.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn score(&self, id: &str) -> Option<u64> {
        self.scores.get(id).copied()
    }

    /// Orders by score descending, ties in insertion order, and keeps at most `cap`
    pub fn rank(self, cap: usize, kind: RecommendationType) -> Vec<Recommendation> {
        let Self {
            order,
            scores,
            mut names,
        } = self;

        let mut ranked: Vec<(String, u64)> = order
            .into_iter()
            .map(|id| {
                let score = scores.get(&id).copied().unwrap_or_default();
                (id, score)
            })
            .collect();

        // sort_by is stable, which preserves insertion order among equal scores
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(cap);

        ranked
            .into_iter()
            .map(|(id, score)| Recommendation {
                game_name: names.remove(&id).unwrap_or_else(|| id.clone()),
                game_id: id,
                score,
                recommendation_type: kind,
            })
            .collect()
    }
}
