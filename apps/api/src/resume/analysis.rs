use axum::{extract::State, Json};
use tracing::{error, info};

use crate::engine::{EngineError, MetadataFilters};
use crate::errors::AppError;
use crate::resume::models::{
    AnalysisResult, Message, MessageRole, ResumeAnalysisRequest, SourceNode,
};
use crate::resume::prompts::build_analysis_prompt;
use crate::state::AppState;

/// POST /api/chat/resume/analyze
///
/// Analyzes how well the uploaded resume(s) fit the target company and position.
/// Retrieval is limited to `fileIds`; an empty list searches all documents.
pub async fn analyze_resume(
    State(state): State<AppState>,
    Json(request): Json<ResumeAnalysisRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    run_analysis(&state, &request).await.map(Json).map_err(|e| {
        error!("Error analyzing resume: {e:?}");
        AppError::Analysis(e)
    })
}

async fn run_analysis(
    state: &AppState,
    request: &ResumeAnalysisRequest,
) -> Result<AnalysisResult, EngineError> {
    let prompt = build_analysis_prompt(&request.company, &request.position);
    let filters = MetadataFilters::doc_ids(&request.file_ids);

    info!(
        "Analyzing resume for {} at {} ({} files)",
        request.position,
        request.company,
        request.file_ids.len()
    );

    let chat_engine = state.chat_engines.get_chat_engine(filters)?;
    let response = chat_engine.achat(&prompt).await?;

    Ok(AnalysisResult {
        result: Message {
            role: MessageRole::Assistant,
            content: response.response,
        },
        nodes: SourceNode::from_source_nodes(
            &response.source_nodes,
            state.config.file_server_url_prefix.as_deref(),
        ),
    })
}
