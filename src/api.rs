// src/api.rs
//! Dashboard-facing HTTP surface: a read query over the store and a
//! fire-and-forget scrape trigger. Rendering lives elsewhere; this only
//! serves JSON.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::pipeline::Pipeline;
use crate::store::{JobStore, StoredPosting};

#[derive(Clone)]
pub struct AppState {
    pub store: JobStore,
    pub pipeline: Arc<Pipeline>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/jobs", get(list_jobs))
        .route("/api/scrape", post(trigger_scrape))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredPosting>>, (StatusCode, String)> {
    match state.store.recent().await {
        Ok(rows) => Ok(Json(rows)),
        Err(e) => {
            tracing::error!(error = ?e, "reading stored postings failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to read postings".to_string(),
            ))
        }
    }
}

#[derive(serde::Serialize)]
struct ScrapeAck {
    success: bool,
    message: String,
}

/// Kick off a run in the background and acknowledge immediately; completion
/// is observable via /api/jobs or the logs, not via this response.
async fn trigger_scrape(State(state): State<AppState>) -> Json<ScrapeAck> {
    let pipeline = state.pipeline.clone();
    tokio::spawn(async move {
        let found = pipeline.run_scheduled().await;
        tracing::info!(found = found.len(), "manual scrape finished");
    });

    Json(ScrapeAck {
        success: true,
        message: "Scrape started in background. Check back in a few minutes.".to_string(),
    })
}
