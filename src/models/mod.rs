use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

/// Which scorer produced a recommendation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationType {
    Content,
    Preference,
    Social,
    SimilarUsers,
}

/// A single ranked game returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub game_id: String,
    pub game_name: String,
    pub score: u64,
    #[serde(rename = "type")]
    pub recommendation_type: RecommendationType,
}

/// Categorical attribute a game can be grouped by
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Genre,
    Platform,
    Developer,
}

impl AttributeKind {
    pub const ALL: [AttributeKind; 3] = [
        AttributeKind::Genre,
        AttributeKind::Platform,
        AttributeKind::Developer,
    ];

    /// Node label carrying this attribute in both graph schemas
    pub fn label(self) -> &'static str {
        match self {
            AttributeKind::Genre => "Genre",
            AttributeKind::Platform => "Platform",
            AttributeKind::Developer => "Developer",
        }
    }

    /// Relationship linking a game to this attribute
    pub fn relationship(self) -> &'static str {
        match self {
            AttributeKind::Genre => "BELONGS_TO_GENRE",
            AttributeKind::Platform => "AVAILABLE_ON",
            AttributeKind::Developer => "DEVELOPED_BY",
        }
    }

    /// Classifies a neighbor node by its labels
    pub fn from_labels(labels: &[String]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| labels.iter().any(|l| l == kind.label()))
    }
}

impl Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeKind::Genre => write!(f, "genre"),
            AttributeKind::Platform => write!(f, "platform"),
            AttributeKind::Developer => write!(f, "developer"),
        }
    }
}

/// How repeated neighbors of the same kind are folded during attribute discovery
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttributeMode {
    /// Every observed value is kept
    #[default]
    MultiValued,
    /// Only the last observed value per kind survives
    SingleValued,
}

/// Attributes discovered for a seed game
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameAttributes {
    values: BTreeMap<AttributeKind, BTreeSet<String>>,
}

impl GameAttributes {
    /// Folds observations, in the order they were seen, according to `mode`
    pub fn from_observations(
        observations: impl IntoIterator<Item = (AttributeKind, String)>,
        mode: AttributeMode,
    ) -> Self {
        let mut values: BTreeMap<AttributeKind, BTreeSet<String>> = BTreeMap::new();

        for (kind, value) in observations {
            let entry = values.entry(kind).or_default();
            if mode == AttributeMode::SingleValued {
                entry.clear();
            }
            entry.insert(value);
        }

        Self { values }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates `(kind, value)` pairs in kind order
    pub fn iter(&self) -> impl Iterator<Item = (AttributeKind, &str)> {
        self.values
            .iter()
            .flat_map(|(kind, set)| set.iter().map(move |v| (*kind, v.as_str())))
    }

    pub fn values_of(&self, kind: AttributeKind) -> Option<&BTreeSet<String>> {
        self.values.get(&kind)
    }
}

/// Identifies which graph a result came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    /// Sales graph: genres, platforms and the social graph
    Vgsales,
    /// Catalogue graph: genres and developers
    Videogames,
}

impl Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceTag::Vgsales => write!(f, "vgsales"),
            SourceTag::Videogames => write!(f, "videogames"),
        }
    }
}

/// A game belonging to a category value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMembership {
    pub value: String,
    pub game: String,
}

/// A game liked by a social contact of the seed user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactLike {
    pub contact: String,
    pub game: String,
}

/// A game liked by a user who shares `common_games` likes with the seed user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarUserLike {
    pub other_user: String,
    pub common_games: u64,
    pub game: String,
}

/// Game name matched by a free-text search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    pub name: String,
    pub source: SourceTag,
}
