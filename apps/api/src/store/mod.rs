//! Node stores, where chunks of uploaded files are indexed and retrieved from.
//!
//! `AppState` never sees a store directly: the file service writes to it and the
//! chat engine reads from it, both through `Arc<dyn NodeStore>`.

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::engine::filters::MetadataFilters;
use crate::models::document::{Node, NodeWithScore};

pub mod memory;
pub mod postgres;

pub use memory::MemoryNodeStore;
pub use postgres::PgNodeStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait NodeStore: Send + Sync {
    async fn add_nodes(&self, nodes: &[Node]) -> Result<(), StoreError>;

    /// Returns at most `top_k` nodes accepted by `filters`, best match first.
    async fn retrieve(
        &self,
        filters: Option<&MetadataFilters>,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<NodeWithScore>, StoreError>;
}

/// Lower-cased alphanumeric terms of at least two characters.
pub fn query_terms(query: &str) -> HashSet<String> {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

/// Fraction of distinct query terms present in `text`.
pub fn score_node(terms: &HashSet<String>, text: &str) -> f32 {
    if terms.is_empty() {
        return 0.0;
    }
    let node_terms = query_terms(text);
    let hits = terms.iter().filter(|t| node_terms.contains(*t)).count();
    hits as f32 / terms.len() as f32
}

/// Scores candidates against `query` and keeps the best `top_k`.
/// The sort is stable, so equally scored nodes keep their document order.
pub(crate) fn rank_nodes<I>(candidates: I, query: &str, top_k: usize) -> Vec<NodeWithScore>
where
    I: IntoIterator<Item = Node>,
{
    let terms = query_terms(query);
    let mut scored: Vec<NodeWithScore> = candidates
        .into_iter()
        .map(|node| {
            let score = score_node(&terms, &node.text);
            NodeWithScore {
                node,
                score: Some(score),
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        let (a, b) = (a.score.unwrap_or(0.0), b.score.unwrap_or(0.0));
        b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(top_k);
    scored
}
