use std::sync::Arc;

use crate::config::Config;
use crate::engine::ChatEngineFactory;
use crate::ingestion::FileService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Stores and indexes uploads. Default: `LocalFileService`.
    pub file_service: Arc<dyn FileService>,
    /// Builds filter-scoped chat engines. Default: `RetrievalChatEngineFactory`.
    pub chat_engines: Arc<dyn ChatEngineFactory>,
}
