use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Metadata key holding the id of the file a node was cut from.
pub const DOC_ID_KEY: &str = "doc_id";
/// Metadata key holding the stored file name.
pub const FILE_NAME_KEY: &str = "file_name";
/// Metadata key marking nodes of user-uploaded (private) files.
pub const PRIVATE_KEY: &str = "private";

/// Descriptor of an ingested upload, returned to the client as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentFile {
    pub id: String,
    /// Stored file name: `<stem>_<id>.<ext>`.
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub size: u64,
    pub url: Option<String>,
    /// Ids of the nodes indexed for this file.
    pub refs: Vec<String>,
    /// Server-side location of the raw file. Never serialized.
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

/// One indexed chunk of an uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: Uuid,
    pub doc_id: String,
    pub position: i32,
    pub text: String,
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

/// A node returned by retrieval together with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeWithScore {
    pub node: Node,
    pub score: Option<f32>,
}

/// Public URL of a stored file. Private uploads live under `output/uploaded`,
/// everything else under `data`.
pub fn file_url(prefix: &str, file_name: &str, private: bool) -> String {
    if private {
        format!("{prefix}/output/uploaded/{file_name}")
    } else {
        format!("{prefix}/data/{file_name}")
    }
}
