use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::document::{file_url, NodeWithScore, FILE_NAME_KEY, PRIVATE_KEY};

// ────────────────────────────────────────────────────────────────────────────
// Requests
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ResumeUploadRequest {
    pub base64: String,
    pub name: String,
    pub company: String,
    pub position: String,
    /// Free-form caller metadata. Anything but a JSON object is ignored.
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResumeAnalysisRequest {
    pub company: String,
    pub position: String,
    #[serde(rename = "fileIds")]
    pub file_ids: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Responses
// ────────────────────────────────────────────────────────────────────────────

/// Chat roles shared with the frontend; the API itself only answers as `Assistant`.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

/// A document fragment that contributed to a generated answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceNode {
    pub id: String,
    pub metadata: Map<String, Value>,
    pub score: Option<f32>,
    pub text: String,
    pub url: Option<String>,
}

impl SourceNode {
    pub fn from_source_node(source: &NodeWithScore, url_prefix: Option<&str>) -> Self {
        let metadata = &source.node.metadata;
        Self {
            id: source.node.id.to_string(),
            metadata: metadata.clone(),
            score: source.score,
            text: source.node.text.clone(),
            url: url_prefix.and_then(|prefix| source_url(prefix, metadata)),
        }
    }

    pub fn from_source_nodes(sources: &[NodeWithScore], url_prefix: Option<&str>) -> Vec<Self> {
        sources
            .iter()
            .map(|s| Self::from_source_node(s, url_prefix))
            .collect()
    }
}

fn source_url(prefix: &str, metadata: &Map<String, Value>) -> Option<String> {
    let file_name = metadata.get(FILE_NAME_KEY)?.as_str()?;
    let private = matches!(metadata.get(PRIVATE_KEY), Some(Value::String(s)) if s == "true")
        || matches!(metadata.get(PRIVATE_KEY), Some(Value::Bool(true)));
    Some(file_url(prefix, file_name, private))
}

/// Response envelope of the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub result: Message,
    pub nodes: Vec<SourceNode>,
}
