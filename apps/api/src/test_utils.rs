//! Shared fixtures for handler tests: mock collaborators and a JSON request helper.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{Map, Value};
use tower::ServiceExt;

use crate::config::Config;
use crate::engine::{ChatEngine, ChatEngineFactory, ChatResponse, EngineError, MetadataFilters};
use crate::ingestion::{FileService, IngestError};
use crate::models::document::DocumentFile;
use crate::routes::build_router;
use crate::state::AppState;

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("ANTHROPIC_API_KEY", "test-key"),
        ("STORAGE_DIR", "/tmp/resume-api-tests"),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

pub fn sample_document(id: &str) -> DocumentFile {
    DocumentFile {
        id: id.to_string(),
        name: format!("cv_{id}.pdf"),
        file_type: "pdf".to_string(),
        size: 1234,
        url: Some(format!("/api/files/output/uploaded/cv_{id}.pdf")),
        refs: vec!["node-1".to_string(), "node-2".to_string()],
        path: None,
    }
}

/// Records every call; replies with a fixed document or an error.
pub struct MockFileService {
    pub calls: Mutex<Vec<(String, String, Map<String, Value>)>>,
    fail_with: Option<fn() -> IngestError>,
}

impl MockFileService {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_with: None,
        })
    }

    pub fn failing(make_error: fn() -> IngestError) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_with: Some(make_error),
        })
    }
}

#[async_trait]
impl FileService for MockFileService {
    async fn process_private_file(
        &self,
        name: &str,
        base64: &str,
        params: Map<String, Value>,
    ) -> Result<DocumentFile, IngestError> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), base64.to_string(), params));
        match self.fail_with {
            Some(make_error) => Err(make_error()),
            None => Ok(sample_document("doc-1")),
        }
    }
}

/// Records the filters each engine was built with and the prompts it was asked.
pub struct MockChatEngineFactory {
    pub filters: Mutex<Vec<Option<MetadataFilters>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
    reply: Result<ChatResponse, String>,
}

impl MockChatEngineFactory {
    pub fn answering(response: ChatResponse) -> Arc<Self> {
        Arc::new(Self {
            filters: Mutex::new(Vec::new()),
            prompts: Arc::new(Mutex::new(Vec::new())),
            reply: Ok(response),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            filters: Mutex::new(Vec::new()),
            prompts: Arc::new(Mutex::new(Vec::new())),
            reply: Err(message.to_string()),
        })
    }
}

impl ChatEngineFactory for MockChatEngineFactory {
    fn get_chat_engine(
        &self,
        filters: Option<MetadataFilters>,
    ) -> Result<Box<dyn ChatEngine>, EngineError> {
        self.filters.lock().unwrap().push(filters);
        Ok(Box::new(MockChatEngine {
            prompts: Arc::clone(&self.prompts),
            reply: self.reply.clone(),
        }))
    }
}

struct MockChatEngine {
    prompts: Arc<Mutex<Vec<String>>>,
    reply: Result<ChatResponse, String>,
}

#[async_trait]
impl ChatEngine for MockChatEngine {
    async fn achat(&self, message: &str) -> Result<ChatResponse, EngineError> {
        self.prompts.lock().unwrap().push(message.to_string());
        self.reply
            .clone()
            .map_err(|message| EngineError::Internal(anyhow::anyhow!(message)))
    }
}

pub fn test_router(
    file_service: Arc<dyn FileService>,
    chat_engines: Arc<dyn ChatEngineFactory>,
) -> Router {
    build_router(AppState {
        config: test_config(),
        file_service,
        chat_engines,
    })
}

/// POSTs `body` as JSON and returns the status and decoded JSON response.
pub async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
