//! File ingestion: turns a base64 upload into a stored file plus indexed nodes.
//!
//! Flow: decode → detect type → extract text → write raw file → chunk → index.
//! Handlers depend on the `FileService` trait only; `LocalFileService` is the
//! production implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::document::{
    file_url, DocumentFile, Node, DOC_ID_KEY, FILE_NAME_KEY, PRIVATE_KEY,
};
use crate::store::{NodeStore, StoreError};

pub mod chunker;
pub mod decode;
pub mod loader;

use chunker::chunk_text;
use decode::decode_upload;
use loader::{extract_text, FileKind};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid base64 content: {0}")]
    Decode(String),

    #[error("file content is empty")]
    EmptyContent,

    #[error("file of {size} bytes exceeds the {max} byte upload limit")]
    TooLarge { size: usize, max: usize },

    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("failed to extract text from {file}: {reason}")]
    Extraction { file: String, reason: String },

    #[error("no text could be extracted from {0}")]
    EmptyDocument(String),

    #[error("failed to store file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to index file: {0}")]
    Store(#[from] StoreError),
}

#[async_trait]
pub trait FileService: Send + Sync {
    /// Stores and indexes a user-uploaded file. `params` becomes node metadata.
    async fn process_private_file(
        &self,
        name: &str,
        base64: &str,
        params: Map<String, Value>,
    ) -> Result<DocumentFile, IngestError>;
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub upload_dir: PathBuf,
    pub file_server_url_prefix: Option<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub max_upload_bytes: usize,
}

/// Stores raw uploads on local disk and indexes their text in a `NodeStore`.
pub struct LocalFileService {
    store: Arc<dyn NodeStore>,
    config: IngestConfig,
}

impl LocalFileService {
    pub fn new(store: Arc<dyn NodeStore>, config: IngestConfig) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl FileService for LocalFileService {
    async fn process_private_file(
        &self,
        name: &str,
        base64: &str,
        params: Map<String, Value>,
    ) -> Result<DocumentFile, IngestError> {
        let decoded = decode_upload(base64)?;
        let size = decoded.bytes.len();
        if size > self.config.max_upload_bytes {
            return Err(IngestError::TooLarge {
                size,
                max: self.config.max_upload_bytes,
            });
        }

        let kind = detect_kind(name, decoded.mime.as_deref())?;
        let id = Uuid::new_v4().to_string();
        let stored_name = stored_file_name(name, &id, kind);

        let text = extract_text(kind, decoded.bytes.clone(), name).await?;

        tokio::fs::create_dir_all(&self.config.upload_dir).await?;
        let path = self.config.upload_dir.join(&stored_name);
        tokio::fs::write(&path, &decoded.bytes).await?;

        let mut metadata = params;
        metadata.insert(FILE_NAME_KEY.to_string(), Value::String(stored_name.clone()));
        metadata.insert(DOC_ID_KEY.to_string(), Value::String(id.clone()));
        metadata.insert(PRIVATE_KEY.to_string(), Value::String("true".to_string()));

        let created_at = Utc::now();
        let nodes: Vec<Node> = chunk_text(&text, self.config.chunk_size, self.config.chunk_overlap)
            .into_iter()
            .enumerate()
            .map(|(position, chunk)| Node {
                id: Uuid::new_v4(),
                doc_id: id.clone(),
                position: position as i32,
                text: chunk,
                metadata: metadata.clone(),
                created_at,
            })
            .collect();

        if let Err(e) = self.store.add_nodes(&nodes).await {
            // An unindexed file must not stay reachable through the file server.
            if let Err(io) = tokio::fs::remove_file(&path).await {
                warn!("Failed to remove unindexed upload {}: {io}", path.display());
            }
            return Err(e.into());
        }

        info!(
            "Ingested {} as {} ({} bytes, {} nodes)",
            name,
            stored_name,
            size,
            nodes.len()
        );

        Ok(DocumentFile {
            url: self
                .config
                .file_server_url_prefix
                .as_deref()
                .map(|prefix| file_url(prefix, &stored_name, true)),
            id,
            name: stored_name,
            file_type: kind.extension().to_string(),
            size: size as u64,
            refs: nodes.iter().map(|n| n.id.to_string()).collect(),
            path: Some(path),
        })
    }
}

/// File type from the name's extension, falling back to the data-URL MIME type.
fn detect_kind(name: &str, mime: Option<&str>) -> Result<FileKind, IngestError> {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty());

    match extension {
        Some(ext) => FileKind::from_extension(ext)
            .ok_or_else(|| IngestError::UnsupportedType(ext.to_string())),
        None => mime
            .and_then(FileKind::from_mime)
            .ok_or_else(|| IngestError::UnsupportedType(mime.unwrap_or("unknown").to_string())),
    }
}

/// `<sanitized stem>_<id>.<ext>`. Only alphanumerics, `-` and `_` survive in the stem.
fn stored_file_name(name: &str, id: &str, kind: FileKind) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let sanitized: String = stem
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let sanitized = if sanitized.is_empty() { "file".to_string() } else { sanitized };
    format!("{sanitized}_{id}.{}", kind.extension())
}
