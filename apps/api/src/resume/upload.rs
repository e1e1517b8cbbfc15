use axum::{extract::State, Json};
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::document::DocumentFile;
use crate::resume::models::ResumeUploadRequest;
use crate::state::AppState;

/// Merges caller params with the resume context. The fixed keys are applied
/// last and always win.
pub fn merge_resume_params(
    params: Option<Value>,
    company: &str,
    position: &str,
) -> Map<String, Value> {
    let mut merged = match params {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    merged.insert("is_resume".to_string(), Value::Bool(true));
    merged.insert("company".to_string(), Value::String(company.to_string()));
    merged.insert("position".to_string(), Value::String(position.to_string()));
    merged
}

/// POST /api/chat/upload-resume
///
/// Uploads a base64 resume from the chat UI and returns the ingested document.
pub async fn upload_resume(
    State(state): State<AppState>,
    Json(request): Json<ResumeUploadRequest>,
) -> Result<Json<DocumentFile>, AppError> {
    info!(
        "Processing resume: {} for {} at {}",
        request.name, request.position, request.company
    );

    let params = merge_resume_params(request.params, &request.company, &request.position);

    let document = state
        .file_service
        .process_private_file(&request.name, &request.base64, params)
        .await
        .map_err(|e| {
            error!("Error processing resume {}: {e:?}", request.name);
            AppError::ResumeProcessing(e)
        })?;

    Ok(Json(document))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::engine::ChatResponse;
    use crate::ingestion::IngestError;
    use crate::test_utils::{post_json, test_router, MockChatEngineFactory, MockFileService};

    const UPLOAD_URI: &str = "/api/chat/upload-resume";

    fn idle_engines() -> std::sync::Arc<MockChatEngineFactory> {
        MockChatEngineFactory::answering(ChatResponse {
            response: String::new(),
            source_nodes: Vec::new(),
        })
    }

    #[test]
    fn test_merge_sets_resume_flag() {
        let merged = merge_resume_params(None, "Acme", "Engineer");
        assert_eq!(merged.get("is_resume"), Some(&json!(true)));
        assert_eq!(merged.get("company"), Some(&json!("Acme")));
        assert_eq!(merged.get("position"), Some(&json!("Engineer")));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_merge_fixed_keys_override_caller_params() {
        let params = json!({
            "is_resume": false,
            "company": "Spoofed",
            "position": "CEO",
            "source": "chat-ui"
        });
        let merged = merge_resume_params(Some(params), "Acme", "Engineer");
        assert_eq!(merged.get("is_resume"), Some(&json!(true)));
        assert_eq!(merged.get("company"), Some(&json!("Acme")));
        assert_eq!(merged.get("position"), Some(&json!("Engineer")));
        assert_eq!(merged.get("source"), Some(&json!("chat-ui")));
    }

    #[test]
    fn test_merge_ignores_non_object_params() {
        let merged = merge_resume_params(Some(json!(["x"])), "Acme", "Engineer");
        assert_eq!(merged.len(), 3);
        let merged = merge_resume_params(Some(Value::Null), "Acme", "Engineer");
        assert_eq!(merged.len(), 3);
    }

    #[tokio::test]
    async fn test_upload_delegates_and_returns_descriptor_unchanged() {
        let files = MockFileService::succeeding();
        let router = test_router(files.clone(), idle_engines());

        let (status, body) = post_json(
            router,
            UPLOAD_URI,
            json!({
                "base64": "aGVsbG8=",
                "name": "cv.pdf",
                "company": "Acme",
                "position": "Engineer",
                "params": {"company": "Other", "lang": "en"}
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "id": "doc-1",
                "name": "cv_doc-1.pdf",
                "type": "pdf",
                "size": 1234,
                "url": "/api/files/output/uploaded/cv_doc-1.pdf",
                "refs": ["node-1", "node-2"]
            })
        );

        let calls = files.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (name, base64, params) = &calls[0];
        assert_eq!(name, "cv.pdf");
        assert_eq!(base64, "aGVsbG8=");
        assert_eq!(params.get("is_resume"), Some(&json!(true)));
        assert_eq!(params.get("company"), Some(&json!("Acme")));
        assert_eq!(params.get("position"), Some(&json!("Engineer")));
        assert_eq!(params.get("lang"), Some(&json!("en")));
    }

    #[tokio::test]
    async fn test_upload_failure_masks_error_detail() {
        let files = MockFileService::failing(|| {
            IngestError::Decode("Invalid symbol 37, offset 0. secret-path".to_string())
        });
        let router = test_router(files, idle_engines());

        let (status, body) = post_json(
            router,
            UPLOAD_URI,
            json!({
                "base64": "%%%",
                "name": "cv.pdf",
                "company": "Acme",
                "position": "Engineer"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"detail": "Error processing resume"}));
    }

    #[tokio::test]
    async fn test_upload_rejects_missing_fields() {
        let files = MockFileService::succeeding();
        let router = test_router(files.clone(), idle_engines());

        let (status, _) = post_json(router, UPLOAD_URI, json!({"name": "cv.pdf"})).await;

        assert!(status.is_client_error());
        assert!(files.calls.lock().unwrap().is_empty());
    }
}
