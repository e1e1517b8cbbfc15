//! Chat engine: retrieval-augmented answering over indexed uploads.
//!
//! Handlers obtain an engine from the `ChatEngineFactory` held in `AppState`,
//! scoped to an optional `MetadataFilters`, and ask it a single prompt.

use async_trait::async_trait;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::models::document::NodeWithScore;
use crate::store::StoreError;

pub mod filters;
pub mod prompts;
pub mod retrieval;

pub use filters::MetadataFilters;
pub use retrieval::RetrievalChatEngineFactory;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] StoreError),

    #[error("{0}")]
    Llm(#[from] LlmError),

    #[error("language model returned an empty response")]
    EmptyResponse,

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

/// Generated answer plus the nodes it was grounded on.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub response: String,
    pub source_nodes: Vec<NodeWithScore>,
}

#[async_trait]
pub trait ChatEngine: Send + Sync {
    async fn achat(&self, message: &str) -> Result<ChatResponse, EngineError>;
}

/// Builds chat engines scoped to a retrieval filter. `None` searches all documents.
///
/// Carried in `AppState` as `Arc<dyn ChatEngineFactory>`.
pub trait ChatEngineFactory: Send + Sync {
    fn get_chat_engine(
        &self,
        filters: Option<MetadataFilters>,
    ) -> Result<Box<dyn ChatEngine>, EngineError>;
}
