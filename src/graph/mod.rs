/// Graph query gateway abstraction
///
/// The recommendation core never talks to a driver directly. It issues fixed
/// query templates through a [`GraphGateway`] and reads back rows of named,
/// typed columns. [`source`] adapts each graph schema to the canonical shapes
/// the scorers consume.
use std::collections::HashMap;

pub mod neo4j;
pub mod source;

pub use neo4j::Neo4jGateway;
pub use source::{CypherSource, GameSource, SourceSchema};

/// Errors raised by the graph layer
#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("unexpected value in column `{0}`")]
    Decode(String),
}

impl From<neo4rs::Error> for GraphError {
    fn from(e: neo4rs::Error) -> Self {
        GraphError::Query(e.to_string())
    }
}

/// Declared type of a returned column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    TextList,
}

/// A parameterized query template plus the columns it returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQuery {
    pub cypher: String,
    pub params: Vec<(&'static str, String)>,
    pub columns: Vec<(&'static str, ColumnKind)>,
}

impl GraphQuery {
    pub fn new(cypher: impl Into<String>) -> Self {
        Self {
            cypher: cypher.into(),
            params: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Binds a string parameter
    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    pub fn column(mut self, name: &'static str, kind: ColumnKind) -> Self {
        self.columns.push((name, kind));
        self
    }
}

/// A single returned value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphValue {
    Null,
    Text(String),
    Integer(i64),
    TextList(Vec<String>),
}

/// One result row: field name to value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphRow {
    fields: HashMap<String, GraphValue>,
}

impl GraphRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: GraphValue) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: GraphValue) {
        self.fields.insert(field.to_string(), value);
    }

    /// Text value; `None` for null, missing or non-text fields
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(GraphValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self, field: &str) -> Option<i64> {
        match self.fields.get(field) {
            Some(GraphValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn text_list(&self, field: &str) -> &[String] {
        match self.fields.get(field) {
            Some(GraphValue::TextList(items)) => items,
            _ => &[],
        }
    }
}

/// Executes parameterized queries against one graph data source
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GraphGateway: Send + Sync {
    /// Runs `query` and returns every row.
    ///
    /// Only the template's own parameters are bound; caller-supplied text is
    /// never spliced into the Cypher string.
    async fn execute(&self, query: &GraphQuery) -> Result<Vec<GraphRow>, GraphError>;

    /// Round-trips a trivial query; `false` on any failure
    async fn test_connectivity(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder_collects_params_and_columns() {
        let query = GraphQuery::new("MATCH (n) RETURN n.name AS name")
            .param("userId", "u1")
            .column("name", ColumnKind::Text);

        assert_eq!(query.params, vec![("userId", "u1".to_string())]);
        assert_eq!(query.columns, vec![("name", ColumnKind::Text)]);
    }

    #[test]
    fn test_row_accessors_ignore_mismatched_kinds() {
        let row = GraphRow::new()
            .with("name", GraphValue::Text("Halo".into()))
            .with("count", GraphValue::Integer(4))
            .with("labels", GraphValue::TextList(vec!["Genre".into()]))
            .with("missing", GraphValue::Null);

        assert_eq!(row.text("name"), Some("Halo"));
        assert_eq!(row.integer("count"), Some(4));
        assert_eq!(row.text_list("labels"), ["Genre".to_string()]);
        assert_eq!(row.text("count"), None);
        assert_eq!(row.text("missing"), None);
        assert!(row.text_list("name").is_empty());
    }
}
