use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::engine::filters::MetadataFilters;
use crate::models::document::{Node, NodeWithScore};
use crate::store::{rank_nodes, NodeStore, StoreError};

/// Process-local node store. Used when no `DATABASE_URL` is configured; contents
/// are lost on restart.
#[derive(Default)]
pub struct MemoryNodeStore {
    nodes: RwLock<Vec<Node>>,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    async fn add_nodes(&self, nodes: &[Node]) -> Result<(), StoreError> {
        self.nodes.write().await.extend_from_slice(nodes);
        Ok(())
    }

    async fn retrieve(
        &self,
        filters: Option<&MetadataFilters>,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<NodeWithScore>, StoreError> {
        let nodes = self.nodes.read().await;
        let candidates = nodes
            .iter()
            .filter(|node| filters.map_or(true, |f| f.matches(&node.metadata)))
            .cloned();
        Ok(rank_nodes(candidates, query, top_k))
    }
}
