use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::engine::filters::{FilterOperator, MetadataFilters};
use crate::models::document::{Node, NodeWithScore, DOC_ID_KEY};
use crate::store::{query_terms, NodeStore, StoreError};

#[derive(Debug, FromRow)]
struct NodeRow {
    id: Uuid,
    doc_id: String,
    position: i32,
    text: String,
    metadata: Value,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ScoredNodeRow {
    #[sqlx(flatten)]
    node: NodeRow,
    hits: i64,
}

impl From<NodeRow> for Node {
    fn from(row: NodeRow) -> Self {
        let metadata = match row.metadata {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Node {
            id: row.id,
            doc_id: row.doc_id,
            position: row.position,
            text: row.text,
            metadata,
            created_at: row.created_at,
        }
    }
}

/// Postgres-backed node store over the `document_nodes` table.
#[derive(Clone)]
pub struct PgNodeStore {
    pool: PgPool,
}

impl PgNodeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NodeStore for PgNodeStore {
    async fn add_nodes(&self, nodes: &[Node]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for node in nodes {
            sqlx::query(
                r#"
                INSERT INTO document_nodes (id, doc_id, position, text, metadata, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(node.id)
            .bind(&node.doc_id)
            .bind(node.position)
            .bind(&node.text)
            .bind(Value::Object(node.metadata.clone()))
            .bind(node.created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        debug!("Indexed {} nodes", nodes.len());
        Ok(())
    }

    async fn retrieve(
        &self,
        filters: Option<&MetadataFilters>,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<NodeWithScore>, StoreError> {
        let terms: Vec<String> = query_terms(query).into_iter().collect();
        let term_count = terms.len();

        let mut sql = retrieval_query(filters, terms, top_k);
        let rows: Vec<ScoredNodeRow> = sql
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;
        debug!("Retrieved {} nodes from Postgres", rows.len());

        Ok(rows
            .into_iter()
            .map(|row| {
                let score = if term_count == 0 {
                    0.0
                } else {
                    row.hits as f32 / term_count as f32
                };
                NodeWithScore {
                    node: row.node.into(),
                    score: Some(score),
                }
            })
            .collect())
    }
}

/// Scores and ranks nodes in Postgres so every matching row is a candidate.
///
/// `hits` counts query terms found among the node's lower-cased alphanumeric
/// tokens, mirroring `score_node`. Ties fall back to document order.
fn retrieval_query(
    filters: Option<&MetadataFilters>,
    terms: Vec<String>,
    top_k: usize,
) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(
        "SELECT id, doc_id, position, text, metadata, created_at, \
         (SELECT COUNT(*) FROM unnest(",
    );
    query.push_bind(terms);
    query.push(
        "::text[]) AS term \
         WHERE term = ANY(regexp_split_to_array(lower(text), '[^[:alnum:]]+'))) AS hits \
         FROM document_nodes WHERE 1=1",
    );

    for filter in filters.map(|f| f.filters.as_slice()).unwrap_or_default() {
        match filter.operator {
            FilterOperator::In if filter.key == DOC_ID_KEY => {
                query.push(" AND doc_id = ANY(");
                query.push_bind(filter.value.clone());
                query.push(")");
            }
            FilterOperator::In => {
                query.push(" AND metadata->>");
                query.push_bind(filter.key.clone());
                query.push(" = ANY(");
                query.push_bind(filter.value.clone());
                query.push(")");
            }
        }
    }

    query.push(" ORDER BY hits DESC, created_at, doc_id, position LIMIT ");
    query.push_bind(i64::try_from(top_k).unwrap_or(i64::MAX));
    query
}
