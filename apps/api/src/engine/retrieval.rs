use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::engine::filters::MetadataFilters;
use crate::engine::prompts::{
    fill_template, CONTEXT_CHAT_SYSTEM, CONTEXT_PROMPT_TEMPLATE, NO_CONTEXT,
};
use crate::engine::{ChatEngine, ChatEngineFactory, ChatResponse, EngineError};
use crate::llm_client::LlmClient;
use crate::models::document::{NodeWithScore, FILE_NAME_KEY};
use crate::store::NodeStore;

/// Hands out a fresh `RetrievalChatEngine` per request; engines share the
/// store and LLM client.
#[derive(Clone)]
pub struct RetrievalChatEngineFactory {
    store: Arc<dyn NodeStore>,
    llm: LlmClient,
    top_k: usize,
}

impl RetrievalChatEngineFactory {
    pub fn new(store: Arc<dyn NodeStore>, llm: LlmClient, top_k: usize) -> Self {
        Self { store, llm, top_k }
    }
}

impl ChatEngineFactory for RetrievalChatEngineFactory {
    fn get_chat_engine(
        &self,
        filters: Option<MetadataFilters>,
    ) -> Result<Box<dyn ChatEngine>, EngineError> {
        Ok(Box::new(RetrievalChatEngine {
            store: Arc::clone(&self.store),
            llm: self.llm.clone(),
            filters,
            top_k: self.top_k,
        }))
    }
}

pub struct RetrievalChatEngine {
    store: Arc<dyn NodeStore>,
    llm: LlmClient,
    filters: Option<MetadataFilters>,
    top_k: usize,
}

#[async_trait]
impl ChatEngine for RetrievalChatEngine {
    async fn achat(&self, message: &str) -> Result<ChatResponse, EngineError> {
        let source_nodes = self
            .store
            .retrieve(self.filters.as_ref(), message, self.top_k)
            .await?;
        info!(
            "Retrieved {} nodes (filtered: {})",
            source_nodes.len(),
            self.filters.is_some()
        );

        let context = render_context(&source_nodes);
        let prompt = fill_template(
            CONTEXT_PROMPT_TEMPLATE,
            &[("context", context.as_str()), ("question", message)],
        );

        let response = self.llm.call(&prompt, CONTEXT_CHAT_SYSTEM).await?;
        let text = response
            .text()
            .filter(|t| !t.trim().is_empty())
            .ok_or(EngineError::EmptyResponse)?;
        debug!("Chat answer: {} chars from {}", text.len(), self.llm.model());

        Ok(ChatResponse {
            response: text,
            source_nodes,
        })
    }
}

/// Numbered excerpts, each headed by the file it came from.
fn render_context(nodes: &[NodeWithScore]) -> String {
    if nodes.is_empty() {
        return NO_CONTEXT.to_string();
    }
    nodes
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let file_name = n
                .node
                .metadata
                .get(FILE_NAME_KEY)
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            format!("[{}] {}\n{}", i + 1, file_name, n.node.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
