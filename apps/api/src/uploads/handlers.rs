//! Axum route handlers for resume and profile-image uploads.

use axum::{
    extract::{Multipart, State},
    Json,
};
use anyhow::anyhow;
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::profile::{Profile, ProfileFile};
use crate::profile::require_user_id;
use crate::state::AppState;
use crate::uploads::validation::{blob_key, validate_upload, UploadKind};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ProfileImageResponse {
    pub success: bool,
    pub url: String,
    pub profile: Profile,
}

#[derive(Debug, Serialize)]
pub struct ResumeUploadResponse {
    pub success: bool,
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResumeRequest {
    pub filename: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResumeResponse {
    pub success: bool,
    pub message: String,
}

struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    bytes: Bytes,
}

struct UploadForm {
    user_id: String,
    file: UploadedFile,
}

/// Collects `userId` and the file field from a multipart body, in any order.
/// Unrelated fields are skipped.
async fn read_upload_form(
    multipart: &mut Multipart,
    kind: UploadKind,
) -> Result<UploadForm, AppError> {
    let mut user_id = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "userId" {
            user_id = Some(field.text().await?);
        } else if name == kind.field_name() {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            // Browsers send an empty, unnamed part when no file was picked.
            if !(bytes.is_empty() && filename.is_empty()) {
                file = Some(UploadedFile {
                    filename,
                    content_type,
                    bytes,
                });
            }
        } else {
            debug!("Skipping multipart field '{name}'");
        }
    }

    let user_id = require_user_id(user_id.as_deref())?;
    let file = file.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    Ok(UploadForm { user_id, file })
}

/// Validates and stores the file; returns its public URL.
async fn store_upload(
    state: &AppState,
    kind: UploadKind,
    form: &UploadForm,
) -> Result<String, AppError> {
    let file = &form.file;
    let content_type = validate_upload(
        kind,
        &file.filename,
        file.content_type.as_deref(),
        file.bytes.len(),
        state.config.max_upload_bytes,
    )?;
    let key = blob_key(
        kind,
        &form.user_id,
        Utc::now().timestamp_millis(),
        &file.filename,
    );
    state.blobs.put(&key, file.bytes.clone(), &content_type).await
}

/// Best-effort removal of a blob the profile no longer references.
async fn discard_blob(state: &AppState, url: &str, user_id: &str) {
    match state.blobs.delete(url).await {
        Ok(true) => debug!("Removed replaced blob {url} for user {user_id}"),
        Ok(false) => debug!("Blob URL {url} is not managed here; nothing to remove"),
        Err(e) => warn!("Replaced blob removal failed for user {user_id}: {e}"),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/upload-profile-image (multipart: `image`, `userId`)
pub async fn handle_upload_profile_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProfileImageResponse>, AppError> {
    let form = read_upload_form(&mut multipart, UploadKind::ProfileImage).await?;
    let url = store_upload(&state, UploadKind::ProfileImage, &form).await?;

    let swap = state
        .profiles
        .swap_file(&form.user_id, ProfileFile::Image, Some(url.clone()))
        .await?;
    if let Some(old) = swap.orphaned(ProfileFile::Image) {
        discard_blob(&state, old, &form.user_id).await;
    }
    let profile = swap
        .profile
        .ok_or_else(|| anyhow!("profile for {} missing after image upload", form.user_id))?;
    info!("Profile image updated for user {}", form.user_id);

    Ok(Json(ProfileImageResponse {
        success: true,
        url,
        profile,
    }))
}

/// POST /api/upload-resume (multipart: `resume`, `userId`)
///
/// Stores the file and records its URL as the profile's `resumeUrl`.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeUploadResponse>, AppError> {
    let form = read_upload_form(&mut multipart, UploadKind::Resume).await?;
    let url = store_upload(&state, UploadKind::Resume, &form).await?;

    let swap = state
        .profiles
        .swap_file(&form.user_id, ProfileFile::Resume, Some(url.clone()))
        .await?;
    if let Some(old) = swap.orphaned(ProfileFile::Resume) {
        discard_blob(&state, old, &form.user_id).await;
    }
    info!("Resume '{}' uploaded for user {}", form.file.filename, form.user_id);

    Ok(Json(ResumeUploadResponse {
        success: true,
        url,
        filename: form.file.filename,
    }))
}

/// DELETE /api/delete-resume
///
/// Clears `resumeUrl` and removes the blob it pointed at. Blob removal is
/// best-effort: a failure is logged and the request still succeeds.
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    body: Option<AppJson<DeleteResumeRequest>>,
) -> Result<Json<DeleteResumeResponse>, AppError> {
    let req = body.map(|AppJson(req)| req).unwrap_or_default();
    let filename = req.filename.as_deref().map(str::trim).unwrap_or_default();
    let user_id = req.user_id.as_deref().map(str::trim).unwrap_or_default();
    if filename.is_empty() || user_id.is_empty() {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }

    // The URL to remove is read under the same lock that clears it, so a
    // resume uploaded concurrently is never the one deleted.
    let swap = state
        .profiles
        .swap_file(user_id, ProfileFile::Resume, None)
        .await?;
    match swap.orphaned(ProfileFile::Resume) {
        Some(url) => match state.blobs.delete(url).await {
            Ok(true) => info!("Resume {filename} deleted for user {user_id}"),
            Ok(false) => debug!("Resume URL {url} is not managed here; nothing to remove"),
            Err(e) => warn!("Resume blob removal failed for user {user_id}: {e}"),
        },
        None => debug!("User {user_id} had no stored resume"),
    }

    Ok(Json(DeleteResumeResponse {
        success: true,
        message: "Resume deleted successfully".to_string(),
    }))
}
