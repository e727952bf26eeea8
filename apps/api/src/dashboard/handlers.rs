//! Axum route handlers for the dashboard. All of these sit behind the
//! session route guard.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::dashboard::board::{Application, BoardTab, DraftUpdate, ResumeOption, RESUME_OPTIONS};
use crate::dashboard::feeds::{self, InterviewPrep, NotificationFeed, Statistics};
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BoardQuery {
    #[serde(default)]
    pub tab: BoardTab,
}

#[derive(Debug, Serialize)]
pub struct BoardCounts {
    pub drafts: usize,
    pub submitted: usize,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub tab: BoardTab,
    pub applications: Vec<Application>,
    pub counts: BoardCounts,
    pub resumes: &'static [ResumeOption],
}

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub success: bool,
    pub application: Application,
}

/// GET /dashboard/statistics
pub async fn handle_statistics() -> Json<Statistics> {
    Json(feeds::statistics())
}

/// GET /dashboard/notifications
pub async fn handle_notifications() -> Json<NotificationFeed> {
    Json(feeds::notifications())
}

/// GET /dashboard/interview-prep
pub async fn handle_interview_prep() -> Json<InterviewPrep> {
    Json(feeds::interview_prep())
}

/// GET /dashboard/applications?tab=drafts|submitted
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Query(query): Query<BoardQuery>,
) -> Json<BoardResponse> {
    let applications = state.board.list(query.tab).await;
    let (drafts, submitted) = state.board.counts().await;
    Json(BoardResponse {
        tab: query.tab,
        applications,
        counts: BoardCounts { drafts, submitted },
        resumes: RESUME_OPTIONS,
    })
}

/// PUT /dashboard/applications/:id
pub async fn handle_save_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(update): AppJson<DraftUpdate>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let application = state.board.save_draft(&id, update).await?;
    Ok(Json(ApplicationResponse {
        success: true,
        application,
    }))
}

/// POST /dashboard/applications/:id/submit
pub async fn handle_submit_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApplicationResponse>, AppError> {
    let today = Local::now().date_naive();
    let application = state.board.submit(&id, today).await?;
    tracing::info!("Application {id} marked as submitted");
    Ok(Json(ApplicationResponse {
        success: true,
        application,
    }))
}

/// DELETE /dashboard/applications/:id
pub async fn handle_delete_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.board.delete_draft(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
