use std::collections::{HashMap, HashSet};

use crate::graph::{GameSource, GraphError};
use crate::models::{
    AttributeKind, CategoryMembership, ContactLike, SimilarUserLike, SourceTag,
};

/// In-memory [`GameSource`] for scorer tests
#[derive(Default)]
pub struct FakeSource {
    tag: Option<SourceTag>,
    memberships: Vec<(AttributeKind, CategoryMembership)>,
    games: Vec<String>,
    attributes: HashMap<String, Vec<(AttributeKind, String)>>,
    liked_genres: HashMap<String, Vec<String>>,
    liked_platforms: HashMap<String, Vec<String>>,
    user_games: HashMap<String, Vec<String>>,
    friend_likes: HashMap<String, Vec<ContactLike>>,
    fof_likes: HashMap<String, Vec<ContactLike>>,
    similar: HashMap<String, Vec<SimilarUserLike>>,
    failing: HashSet<&'static str>,
    reachable: bool,
}

impl FakeSource {
    pub fn new(tag: SourceTag) -> Self {
        Self {
            tag: Some(tag),
            reachable: true,
            ..Self::default()
        }
    }

    pub fn membership(mut self, kind: AttributeKind, value: &str, game: &str) -> Self {
        self.memberships.push((
            kind,
            CategoryMembership {
                value: value.to_string(),
                game: game.to_string(),
            },
        ));
        self
    }

    pub fn game(mut self, name: &str, attributes: &[(AttributeKind, &str)]) -> Self {
        self.games.push(name.to_string());
        self.attributes.insert(
            name.to_string(),
            attributes
                .iter()
                .map(|(k, v)| (*k, v.to_string()))
                .collect(),
        );
        self
    }

    pub fn likes_genres(mut self, user: &str, genres: &[&str]) -> Self {
        self.liked_genres
            .insert(user.to_string(), to_strings(genres));
        self
    }

    pub fn likes_platforms(mut self, user: &str, platforms: &[&str]) -> Self {
        self.liked_platforms
            .insert(user.to_string(), to_strings(platforms));
        self
    }

    pub fn owns(mut self, user: &str, games: &[&str]) -> Self {
        self.user_games.insert(user.to_string(), to_strings(games));
        self
    }

    pub fn friend_likes(mut self, user: &str, likes: &[(&str, &str)]) -> Self {
        self.friend_likes.insert(user.to_string(), to_likes(likes));
        self
    }

    pub fn fof_likes(mut self, user: &str, likes: &[(&str, &str)]) -> Self {
        self.fof_likes.insert(user.to_string(), to_likes(likes));
        self
    }

    pub fn similar(mut self, user: &str, likes: &[(&str, u64, &str)]) -> Self {
        self.similar.insert(
            user.to_string(),
            likes
                .iter()
                .map(|(other, common, game)| SimilarUserLike {
                    other_user: other.to_string(),
                    common_games: *common,
                    game: game.to_string(),
                })
                .collect(),
        );
        self
    }

    /// Makes the named operation fail with a query error
    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.insert(operation);
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    fn check(&self, operation: &'static str) -> Result<(), GraphError> {
        if self.failing.contains(operation) {
            Err(GraphError::Query(format!("{} unavailable", operation)))
        } else {
            Ok(())
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn to_likes(likes: &[(&str, &str)]) -> Vec<ContactLike> {
    likes
        .iter()
        .map(|(contact, game)| ContactLike {
            contact: contact.to_string(),
            game: game.to_string(),
        })
        .collect()
}

#[async_trait::async_trait]
impl GameSource for FakeSource {
    fn tag(&self) -> SourceTag {
        self.tag.unwrap_or(SourceTag::Vgsales)
    }

    async fn category_memberships(
        &self,
        kind: AttributeKind,
    ) -> Result<Vec<CategoryMembership>, GraphError> {
        self.check("category_memberships")?;
        Ok(self
            .memberships
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.clone())
            .collect())
    }

    async fn find_game(&self, name: &str) -> Result<Option<String>, GraphError> {
        self.check("find_game")?;
        Ok(self.games.iter().find(|g| *g == name).cloned())
    }

    async fn game_attributes(
        &self,
        name: &str,
    ) -> Result<Vec<(AttributeKind, String)>, GraphError> {
        self.check("game_attributes")?;
        Ok(self.attributes.get(name).cloned().unwrap_or_default())
    }

    async fn liked_genres(&self, user_id: &str) -> Result<Vec<String>, GraphError> {
        self.check("liked_genres")?;
        Ok(self.liked_genres.get(user_id).cloned().unwrap_or_default())
    }

    async fn liked_platforms(&self, user_id: &str) -> Result<Vec<String>, GraphError> {
        self.check("liked_platforms")?;
        Ok(self.liked_platforms.get(user_id).cloned().unwrap_or_default())
    }

    async fn user_games(&self, user_id: &str) -> Result<Vec<String>, GraphError> {
        self.check("user_games")?;
        Ok(self.user_games.get(user_id).cloned().unwrap_or_default())
    }

    async fn friend_likes(&self, user_id: &str) -> Result<Vec<ContactLike>, GraphError> {
        self.check("friend_likes")?;
        Ok(self.friend_likes.get(user_id).cloned().unwrap_or_default())
    }

    async fn friend_of_friend_likes(
        &self,
        user_id: &str,
    ) -> Result<Vec<ContactLike>, GraphError> {
        self.check("friend_of_friend_likes")?;
        Ok(self.fof_likes.get(user_id).cloned().unwrap_or_default())
    }

    async fn similar_user_likes(
        &self,
        user_id: &str,
    ) -> Result<Vec<SimilarUserLike>, GraphError> {
        self.check("similar_user_likes")?;
        Ok(self.similar.get(user_id).cloned().unwrap_or_default())
    }

    async fn search_games(&self, query: &str) -> Result<Vec<String>, GraphError> {
        self.check("search_games")?;
        let needle = query.to_lowercase();
        Ok(self
            .games
            .iter()
            .filter(|g| g.to_lowercase().contains(&needle))
            .take(10)
            .cloned()
            .collect())
    }

    async fn is_reachable(&self) -> bool {
        self.reachable
    }
}
