use neo4rs::{query, ConfigBuilder, Graph, Row};

use super::{ColumnKind, GraphError, GraphGateway, GraphQuery, GraphRow, GraphValue};

/// Gateway backed by a Neo4j database over bolt
#[derive(Clone)]
pub struct Neo4jGateway {
    graph: Graph,
    uri: String,
}

impl Neo4jGateway {
    /// Connect to Neo4j with the given credentials.
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, GraphError> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .fetch_size(500)
            .max_connections(10)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %uri, "Connected to Neo4j");

        Ok(Self {
            graph,
            uri: uri.to_string(),
        })
    }
}

fn decode_row(row: &Row, columns: &[(&'static str, ColumnKind)]) -> Result<GraphRow, GraphError> {
    let mut decoded = GraphRow::new();

    for &(name, kind) in columns {
        let value = match kind {
            ColumnKind::Text => row
                .get::<Option<String>>(name)
                .map(|v| v.map_or(GraphValue::Null, GraphValue::Text)),
            ColumnKind::Integer => row
                .get::<Option<i64>>(name)
                .map(|v| v.map_or(GraphValue::Null, GraphValue::Integer)),
            ColumnKind::TextList => row
                .get::<Option<Vec<String>>>(name)
                .map(|v| v.map_or(GraphValue::Null, GraphValue::TextList)),
        }
        .map_err(|_| GraphError::Decode(name.to_string()))?;

        decoded.insert(name, value);
    }

    Ok(decoded)
}

#[async_trait::async_trait]
impl GraphGateway for Neo4jGateway {
    async fn execute(&self, graph_query: &GraphQuery) -> Result<Vec<GraphRow>, GraphError> {
        let mut q = query(&graph_query.cypher);
        for (key, value) in &graph_query.params {
            q = q.param(key, value.as_str());
        }

        let mut stream = self.graph.execute(q).await.map_err(|e| {
            tracing::error!(uri = %self.uri, error = %e, "Graph query failed");
            GraphError::from(e)
        })?;

        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(decode_row(&row, &graph_query.columns)?);
        }

        tracing::debug!(uri = %self.uri, rows = rows.len(), "Graph query completed");

        Ok(rows)
    }

    async fn test_connectivity(&self) -> bool {
        match self.graph.execute(query("RETURN 1 AS ok")).await {
            Ok(mut stream) => match stream.next().await {
                Ok(Some(_)) => true,
                Ok(None) => false,
                Err(e) => {
                    tracing::error!(uri = %self.uri, error = %e, "Connectivity probe failed");
                    false
                }
            },
            Err(e) => {
                tracing::error!(uri = %self.uri, error = %e, "Connectivity probe failed");
                false
            }
        }
    }
}
