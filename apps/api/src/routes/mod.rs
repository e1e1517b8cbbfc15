pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::resume::{analysis, upload};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.request_body_limit();
    // Mounted where `file_url` points: `<prefix>/output/uploaded` and `<prefix>/data`.
    let mount = state.config.file_mount_path();
    let uploaded_files = ServeDir::new(state.config.upload_dir());
    let data_files = ServeDir::new(state.config.data_dir());

    Router::new()
        .route("/health", get(health::health_handler))
        // Resume API
        .route("/api/chat/upload-resume", post(upload::upload_resume))
        .route("/api/chat/resume/analyze", post(analysis::analyze_resume))
        .nest_service(&format!("{mount}/output/uploaded"), uploaded_files)
        .nest_service(&format!("{mount}/data"), data_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
