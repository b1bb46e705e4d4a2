/// Per-schema adapters
///
/// Both graphs describe the same domain with different labels and property
/// names. A [`SourceSchema`] records those differences and the capabilities
/// each graph has; [`CypherSource`] renders fixed templates from it and maps
/// rows into canonical shapes. Scorers only ever see [`GameSource`].
use std::sync::Arc;

use super::{ColumnKind, GraphError, GraphGateway, GraphQuery, GraphRow};
use crate::models::{AttributeKind, CategoryMembership, ContactLike, SimilarUserLike, SourceTag};

/// Canonical view of one graph data source
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GameSource: Send + Sync {
    fn tag(&self) -> SourceTag;

    /// Every `(value, game)` pair for one category kind
    async fn category_memberships(
        &self,
        kind: AttributeKind,
    ) -> Result<Vec<CategoryMembership>, GraphError>;

    /// Exact, case-sensitive lookup by name
    async fn find_game(&self, name: &str) -> Result<Option<String>, GraphError>;

    /// Categorical neighbors of a game, in the order the source returned them
    async fn game_attributes(&self, name: &str)
        -> Result<Vec<(AttributeKind, String)>, GraphError>;

    async fn liked_genres(&self, user_id: &str) -> Result<Vec<String>, GraphError>;

    async fn liked_platforms(&self, user_id: &str) -> Result<Vec<String>, GraphError>;

    /// Games the user has played or liked
    async fn user_games(&self, user_id: &str) -> Result<Vec<String>, GraphError>;

    /// Games liked by direct friends and not yet played or liked by the user
    async fn friend_likes(&self, user_id: &str) -> Result<Vec<ContactLike>, GraphError>;

    /// Games liked by second-degree contacts who are not direct friends
    async fn friend_of_friend_likes(&self, user_id: &str)
        -> Result<Vec<ContactLike>, GraphError>;

    /// Games liked by users who share at least one liked game with the user
    async fn similar_user_likes(&self, user_id: &str)
        -> Result<Vec<SimilarUserLike>, GraphError>;

    /// Case-insensitive name containment search
    async fn search_games(&self, query: &str) -> Result<Vec<String>, GraphError>;

    async fn is_reachable(&self) -> bool;
}

/// Labels, property names and capabilities of one graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSchema {
    pub tag: SourceTag,
    pub game_label: &'static str,
    pub name_field: &'static str,
    /// Category kinds indexed from and discovered in this graph
    pub categories: &'static [AttributeKind],
    /// Whether users in this graph carry FRIENDS_WITH edges
    pub social: bool,
}

impl SourceSchema {
    /// Sales graph: `(:VideoGame {Name})` with genres, platforms and users
    pub fn vgsales() -> Self {
        Self {
            tag: SourceTag::Vgsales,
            game_label: "VideoGame",
            name_field: "Name",
            categories: &[AttributeKind::Genre, AttributeKind::Platform],
            social: true,
        }
    }

    /// Catalogue graph: `(:Videojuego {nombre})` with developers
    pub fn videogames() -> Self {
        Self {
            tag: SourceTag::Videogames,
            game_label: "Videojuego",
            name_field: "nombre",
            categories: &[AttributeKind::Developer],
            social: false,
        }
    }

    pub fn has_category(&self, kind: AttributeKind) -> bool {
        self.categories.contains(&kind)
    }

    fn memberships_query(&self, kind: AttributeKind) -> GraphQuery {
        GraphQuery::new(format!(
            "MATCH (game:{label})-[:{rel}]->(attr:{attr}) \
             RETURN game.{name} AS gameName, attr.name AS value",
            label = self.game_label,
            name = self.name_field,
            rel = kind.relationship(),
            attr = kind.label(),
        ))
        .column("gameName", ColumnKind::Text)
        .column("value", ColumnKind::Text)
    }

    fn find_game_query(&self, game_name: &str) -> GraphQuery {
        GraphQuery::new(format!(
            "MATCH (game:{label} {{{name}: $name}}) RETURN game.{name} AS gameName LIMIT 1",
            label = self.game_label,
            name = self.name_field,
        ))
        .param("name", game_name)
        .column("gameName", ColumnKind::Text)
    }

    fn attributes_query(&self, game_name: &str) -> GraphQuery {
        GraphQuery::new(format!(
            "MATCH (game:{label} {{{name}: $name}})-[]-(attr) \
             RETURN labels(attr) AS labels, attr.name AS value",
            label = self.game_label,
            name = self.name_field,
        ))
        .param("name", game_name)
        .column("labels", ColumnKind::TextList)
        .column("value", ColumnKind::Text)
    }

    fn liked_category_query(&self, user_id: &str, kind: AttributeKind) -> GraphQuery {
        GraphQuery::new(format!(
            "MATCH (user:User {{id: $userId}})-[:LIKES]->(game:{label})-[:{rel}]->(attr:{attr}) \
             RETURN DISTINCT attr.name AS value",
            label = self.game_label,
            rel = kind.relationship(),
            attr = kind.label(),
        ))
        .param("userId", user_id)
        .column("value", ColumnKind::Text)
    }

    fn user_games_query(&self, user_id: &str) -> GraphQuery {
        GraphQuery::new(format!(
            "MATCH (user:User {{id: $userId}})-[:PLAYED|LIKES]->(game:{label}) \
             RETURN DISTINCT game.{name} AS gameName",
            label = self.game_label,
            name = self.name_field,
        ))
        .param("userId", user_id)
        .column("gameName", ColumnKind::Text)
    }

    fn friend_likes_query(&self, user_id: &str) -> GraphQuery {
        GraphQuery::new(format!(
            "MATCH (user:User {{id: $userId}})-[:FRIENDS_WITH]->(friend:User)-[:LIKES]->(game:{label}) \
             WHERE NOT (user)-[:PLAYED|LIKES]->(game) \
             RETURN DISTINCT friend.id AS contact, game.{name} AS gameName \
             ORDER BY gameName, contact",
            label = self.game_label,
            name = self.name_field,
        ))
        .param("userId", user_id)
        .column("contact", ColumnKind::Text)
        .column("gameName", ColumnKind::Text)
    }

    fn friend_of_friend_likes_query(&self, user_id: &str) -> GraphQuery {
        GraphQuery::new(format!(
            "MATCH (user:User {{id: $userId}})-[:FRIENDS_WITH]->(:User)-[:FRIENDS_WITH]->(fof:User) \
             WHERE NOT (user)-[:FRIENDS_WITH]->(fof) AND user <> fof \
             WITH DISTINCT user, fof \
             MATCH (fof)-[:LIKES]->(game:{label}) \
             WHERE NOT (user)-[:PLAYED|LIKES]->(game) \
             RETURN DISTINCT fof.id AS contact, game.{name} AS gameName \
             ORDER BY gameName, contact",
            label = self.game_label,
            name = self.name_field,
        ))
        .param("userId", user_id)
        .column("contact", ColumnKind::Text)
        .column("gameName", ColumnKind::Text)
    }

    fn similar_user_likes_query(&self, user_id: &str) -> GraphQuery {
        GraphQuery::new(format!(
            "MATCH (user:User {{id: $userId}})-[:LIKES]->(shared:{label})<-[:LIKES]-(other:User) \
             WHERE user <> other \
             WITH user, other, count(DISTINCT shared) AS commonGames \
             MATCH (other)-[:LIKES]->(rec:{label}) \
             WHERE NOT (user)-[:PLAYED|LIKES]->(rec) \
             RETURN other.id AS otherUser, commonGames, rec.{name} AS gameName \
             ORDER BY commonGames DESC, otherUser, gameName",
            label = self.game_label,
            name = self.name_field,
        ))
        .param("userId", user_id)
        .column("otherUser", ColumnKind::Text)
        .column("commonGames", ColumnKind::Integer)
        .column("gameName", ColumnKind::Text)
    }

    fn search_query(&self, text: &str) -> GraphQuery {
        GraphQuery::new(format!(
            "MATCH (game:{label}) WHERE toLower(game.{name}) CONTAINS toLower($query) \
             RETURN game.{name} AS name LIMIT 10",
            label = self.game_label,
            name = self.name_field,
        ))
        .param("query", text)
        .column("name", ColumnKind::Text)
    }
}

/// [`GameSource`] over any [`GraphGateway`] speaking Cypher
#[derive(Clone)]
pub struct CypherSource {
    schema: SourceSchema,
    gateway: Arc<dyn GraphGateway>,
}

impl CypherSource {
    pub fn new(schema: SourceSchema, gateway: Arc<dyn GraphGateway>) -> Self {
        Self { schema, gateway }
    }

    /// Runs a query and keeps the text column `field` of every row that has one
    async fn texts(&self, query: GraphQuery, field: &str) -> Result<Vec<String>, GraphError> {
        let rows = self.gateway.execute(&query).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.text(field).map(String::from))
            .collect())
    }

    async fn contact_likes(&self, query: GraphQuery) -> Result<Vec<ContactLike>, GraphError> {
        let rows = self.gateway.execute(&query).await?;
        Ok(rows.iter().filter_map(contact_like).collect())
    }
}

fn contact_like(row: &GraphRow) -> Option<ContactLike> {
    Some(ContactLike {
        contact: row.text("contact")?.to_string(),
        game: row.text("gameName")?.to_string(),
    })
}

#[async_trait::async_trait]
impl GameSource for CypherSource {
    fn tag(&self) -> SourceTag {
        self.schema.tag
    }

    async fn category_memberships(
        &self,
        kind: AttributeKind,
    ) -> Result<Vec<CategoryMembership>, GraphError> {
        if !self.schema.has_category(kind) {
            return Ok(Vec::new());
        }

        let rows = self.gateway.execute(&self.schema.memberships_query(kind)).await?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                Some(CategoryMembership {
                    value: row.text("value")?.to_string(),
                    game: row.text("gameName")?.to_string(),
                })
            })
            .collect())
    }

    async fn find_game(&self, name: &str) -> Result<Option<String>, GraphError> {
        let found = self
            .texts(self.schema.find_game_query(name), "gameName")
            .await?;
        Ok(found.into_iter().next())
    }

    async fn game_attributes(
        &self,
        name: &str,
    ) -> Result<Vec<(AttributeKind, String)>, GraphError> {
        let rows = self.gateway.execute(&self.schema.attributes_query(name)).await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let kind = AttributeKind::from_labels(row.text_list("labels"))?;
                if !self.schema.has_category(kind) {
                    return None;
                }
                Some((kind, row.text("value").unwrap_or_default().to_string()))
            })
            .collect())
    }

    async fn liked_genres(&self, user_id: &str) -> Result<Vec<String>, GraphError> {
        let query = self
            .schema
            .liked_category_query(user_id, AttributeKind::Genre);
        self.texts(query, "value").await
    }

    async fn liked_platforms(&self, user_id: &str) -> Result<Vec<String>, GraphError> {
        if !self.schema.has_category(AttributeKind::Platform) {
            return Ok(Vec::new());
        }
        let query = self
            .schema
            .liked_category_query(user_id, AttributeKind::Platform);
        self.texts(query, "value").await
    }

    async fn user_games(&self, user_id: &str) -> Result<Vec<String>, GraphError> {
        self.texts(self.schema.user_games_query(user_id), "gameName")
            .await
    }

    async fn friend_likes(&self, user_id: &str) -> Result<Vec<ContactLike>, GraphError> {
        if !self.schema.social {
            return Ok(Vec::new());
        }
        self.contact_likes(self.schema.friend_likes_query(user_id))
            .await
    }

    async fn friend_of_friend_likes(
        &self,
        user_id: &str,
    ) -> Result<Vec<ContactLike>, GraphError> {
        if !self.schema.social {
            return Ok(Vec::new());
        }
        self.contact_likes(self.schema.friend_of_friend_likes_query(user_id))
            .await
    }

    async fn similar_user_likes(
        &self,
        user_id: &str,
    ) -> Result<Vec<SimilarUserLike>, GraphError> {
        if !self.schema.social {
            return Ok(Vec::new());
        }

        let rows = self
            .gateway
            .execute(&self.schema.similar_user_likes_query(user_id))
            .await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                Some(SimilarUserLike {
                    other_user: row.text("otherUser")?.to_string(),
                    common_games: u64::try_from(row.integer("commonGames")?).ok()?,
                    game: row.text("gameName")?.to_string(),
                })
            })
            .collect())
    }

    async fn search_games(&self, query: &str) -> Result<Vec<String>, GraphError> {
        self.texts(self.schema.search_query(query), "name").await
    }

    async fn is_reachable(&self) -> bool {
        self.gateway.test_connectivity().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphValue, MockGraphGateway};

    fn text(s: &str) -> GraphValue {
        GraphValue::Text(s.to_string())
    }

    fn source(schema: SourceSchema, gateway: MockGraphGateway) -> CypherSource {
        CypherSource::new(schema, Arc::new(gateway))
    }

    #[tokio::test]
    async fn test_memberships_use_schema_names() {
        let mut gateway = MockGraphGateway::new();
        gateway
            .expect_execute()
            .withf(|q| {
                q.cypher.contains("(game:Videojuego)-[:DEVELOPED_BY]->(attr:Developer)")
                    && q.cypher.contains("game.nombre AS gameName")
            })
            .times(1)
            .returning(|_| {
                Ok(vec![
                    GraphRow::new()
                        .with("gameName", text("Halo"))
                        .with("value", text("Bungie")),
                    GraphRow::new()
                        .with("gameName", GraphValue::Null)
                        .with("value", text("Bungie")),
                ])
            });

        let memberships = source(SourceSchema::videogames(), gateway)
            .category_memberships(AttributeKind::Developer)
            .await
            .unwrap();

        assert_eq!(
            memberships,
            vec![CategoryMembership {
                value: "Bungie".to_string(),
                game: "Halo".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_capability_skips_query() {
        let mut gateway = MockGraphGateway::new();
        gateway.expect_execute().never();
        let videogames = source(SourceSchema::videogames(), gateway);

        assert!(videogames
            .category_memberships(AttributeKind::Platform)
            .await
            .unwrap()
            .is_empty());
        assert!(videogames.liked_platforms("u1").await.unwrap().is_empty());
        assert!(videogames.friend_likes("u1").await.unwrap().is_empty());
        assert!(videogames.similar_user_likes("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_input_is_bound_not_spliced() {
        let mut gateway = MockGraphGateway::new();
        gateway
            .expect_execute()
            .withf(|q| {
                !q.cypher.contains("Zelda'")
                    && q.params == vec![("name", "Zelda' OR 1=1".to_string())]
            })
            .times(1)
            .returning(|_| Ok(vec![]));

        let found = source(SourceSchema::vgsales(), gateway)
            .find_game("Zelda' OR 1=1")
            .await
            .unwrap();

        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_attributes_classified_by_label_and_capability() {
        let mut gateway = MockGraphGateway::new();
        gateway.expect_execute().times(1).returning(|_| {
            Ok(vec![
                GraphRow::new()
                    .with("labels", GraphValue::TextList(vec!["Genre".into()]))
                    .with("value", text("RPG")),
                GraphRow::new()
                    .with("labels", GraphValue::TextList(vec!["Platform".into()]))
                    .with("value", text("SNES")),
                GraphRow::new()
                    .with("labels", GraphValue::TextList(vec!["Developer".into()]))
                    .with("value", text("Square")),
                GraphRow::new()
                    .with("labels", GraphValue::TextList(vec!["User".into()]))
                    .with("value", GraphValue::Null),
            ])
        });

        let attrs = source(SourceSchema::vgsales(), gateway)
            .game_attributes("Chrono Trigger")
            .await
            .unwrap();

        assert_eq!(
            attrs,
            vec![
                (AttributeKind::Genre, "RPG".to_string()),
                (AttributeKind::Platform, "SNES".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_similar_user_rows_decoded() {
        let mut gateway = MockGraphGateway::new();
        gateway.expect_execute().times(1).returning(|_| {
            Ok(vec![
                GraphRow::new()
                    .with("otherUser", text("u2"))
                    .with("commonGames", GraphValue::Integer(2))
                    .with("gameName", text("Doom")),
                GraphRow::new()
                    .with("otherUser", text("u3"))
                    .with("commonGames", GraphValue::Integer(-1))
                    .with("gameName", text("Quake")),
            ])
        });

        let likes = source(SourceSchema::vgsales(), gateway)
            .similar_user_likes("u1")
            .await
            .unwrap();

        assert_eq!(likes.len(), 1);
        assert_eq!(likes[0].other_user, "u2");
        assert_eq!(likes[0].common_games, 2);
    }

    #[tokio::test]
    async fn test_gateway_errors_propagate() {
        let mut gateway = MockGraphGateway::new();
        gateway
            .expect_execute()
            .returning(|_| Err(GraphError::Query("timeout".into())));

        let result = source(SourceSchema::vgsales(), gateway)
            .search_games("zel")
            .await;

        assert!(matches!(result, Err(GraphError::Query(_))));
    }
}
