//! Axum route handlers for the profile API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::models::profile::{Profile, ProfileEntry};
use crate::profile::patch::SaveProfileRequest;
use crate::profile::require_user_id;
use crate::profile::sections::{
    new_entry_id, EntryChange, ProfileSection, SectionEntry, SectionUpdate,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GetProfileResponse {
    pub profile: Option<Profile>,
}

#[derive(Debug, Serialize)]
pub struct SaveProfileResponse {
    pub success: bool,
    pub profile: Profile,
}

#[derive(Debug, Serialize)]
pub struct SectionResponse {
    pub section: ProfileSection,
    pub data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSaveRequest {
    pub user_id: Option<String>,
    pub data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySaveRequest {
    pub user_id: Option<String>,
    pub entry: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySaveResponse {
    pub success: bool,
    pub entry_id: String,
    pub profile: Profile,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/get-profile?userId=
///
/// An unknown user yields `{ "profile": null }`, not an error.
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<GetProfileResponse>, AppError> {
    let user_id = require_user_id(params.user_id.as_deref())?;
    let profile = state.profiles.find(&user_id).await?;
    Ok(Json(GetProfileResponse { profile }))
}

/// POST /api/save-profile
///
/// Upserts by `userId`. Fields missing from the body keep their stored value.
pub async fn handle_save_profile(
    State(state): State<AppState>,
    AppJson(req): AppJson<SaveProfileRequest>,
) -> Result<Json<SaveProfileResponse>, AppError> {
    let (user_id, patch) = req.into_patch()?;
    if patch.is_empty() {
        debug!("save-profile for user {user_id} carries no fields; ensuring document exists");
    }
    let touched = patch.touched();
    let profile = state.profiles.update(&user_id, patch.into()).await?;
    info!("save-profile for user {user_id} wrote {touched:?}");
    Ok(Json(SaveProfileResponse {
        success: true,
        profile,
    }))
}

/// GET /api/profile/:section?userId=
pub async fn handle_get_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SectionResponse>, AppError> {
    let section: ProfileSection = section.parse()?;
    let user_id = require_user_id(params.user_id.as_deref())?;
    let profile = state
        .profiles
        .find(&user_id)
        .await?
        .unwrap_or_else(|| Profile::new(&user_id));
    Ok(Json(SectionResponse {
        section,
        data: section.view(&profile),
    }))
}

/// PUT /api/profile/:section
///
/// Replaces one section's slice of the profile and nothing else.
pub async fn handle_save_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
    AppJson(req): AppJson<SectionSaveRequest>,
) -> Result<Json<SaveProfileResponse>, AppError> {
    let section: ProfileSection = section.parse()?;
    let user_id = require_user_id(req.user_id.as_deref())?;
    let patch = SectionUpdate::parse(section, req.data)?.into_patch()?;
    let profile = state.profiles.update(&user_id, patch.into()).await?;
    info!("Saved {section} section for user {user_id}");
    Ok(Json(SaveProfileResponse {
        success: true,
        profile,
    }))
}

/// POST /api/profile/:section/entries
///
/// Adds one education/experience/skill-category entry, or replaces the entry
/// with the same id.
pub async fn handle_save_entry(
    State(state): State<AppState>,
    Path(section): Path<String>,
    AppJson(req): AppJson<EntrySaveRequest>,
) -> Result<Json<EntrySaveResponse>, AppError> {
    let section: ProfileSection = section.parse()?;
    let user_id = require_user_id(req.user_id.as_deref())?;
    let mut entry = SectionEntry::parse(section, req.entry)?;
    let entry_id = ensure_entry_id(&mut entry);

    let profile = state
        .profiles
        .update(&user_id, EntryChange::Upsert(entry).into())
        .await?;
    info!("Saved {section} entry {entry_id} for user {user_id}");
    Ok(Json(EntrySaveResponse {
        success: true,
        entry_id,
        profile,
    }))
}

/// DELETE /api/profile/:section/entries/:entry_id?userId=
pub async fn handle_delete_entry(
    State(state): State<AppState>,
    Path((section, entry_id)): Path<(String, String)>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SaveProfileResponse>, AppError> {
    let section: ProfileSection = section.parse()?;
    let user_id = require_user_id(params.user_id.as_deref())?;
    let change = EntryChange::Remove {
        section,
        id: entry_id.clone(),
    };
    let profile = state.profiles.update(&user_id, change.into()).await?;
    info!("Removed {section} entry {entry_id} for user {user_id}");
    Ok(Json(SaveProfileResponse {
        success: true,
        profile,
    }))
}

fn ensure_entry_id(entry: &mut SectionEntry) -> String {
    let target: &mut dyn ProfileEntry = match entry {
        SectionEntry::Education(e) => e,
        SectionEntry::Experience(e) => e,
        SectionEntry::SkillCategory(c) => c,
    };
    if target.entry_id().trim().is_empty() {
        target.set_entry_id(new_entry_id());
    }
    target.entry_id().to_string()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::json;

    use crate::testing::{json_request, send, TestApp};

    #[tokio::test]
    async fn test_get_profile_unknown_user_returns_null() {
        let app = TestApp::new();
        let (status, body) = send(
            app.router(),
            json_request(Method::GET, "/api/get-profile?userId=nobody", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "profile": null }));
    }

    #[tokio::test]
    async fn test_get_profile_without_user_id_is_400() {
        let app = TestApp::new();
        let (status, body) = send(
            app.router(),
            json_request(Method::GET, "/api/get-profile", None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "User ID required");
    }

    #[tokio::test]
    async fn test_save_then_get_round_trip() {
        let app = TestApp::new();
        let (status, body) = send(
            app.router(),
            json_request(
                Method::POST,
                "/api/save-profile",
                Some(json!({
                    "userId": "u1",
                    "about": "Backend engineer",
                    "personalInfo": [
                        { "label": "Full Name", "value": "Asha Rao" },
                        { "label": "Email", "value": "asha@example.com" }
                    ],
                    "education": [{ "id": "ed1", "institute": "IIT Madras" }]
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["profile"]["fullName"], "Asha Rao");

        let (_, body) = send(
            app.router(),
            json_request(Method::GET, "/api/get-profile?userId=u1", None),
        )
        .await;
        assert_eq!(body["profile"]["summary"], "Backend engineer");
        assert_eq!(body["profile"]["education"][0]["institute"], "IIT Madras");
    }

    #[tokio::test]
    async fn test_resume_save_keeps_education_experience_skills() {
        let app = TestApp::new();
        send(
            app.router(),
            json_request(
                Method::POST,
                "/api/save-profile",
                Some(json!({
                    "userId": "u1",
                    "education": [{ "id": "ed1", "institute": "BITS" }],
                    "experience": [{ "id": "ex1", "title": "SDE" }],
                    "skills": [{ "id": "c1", "name": "Languages", "skills": [{ "id": "s1", "name": "Go" }] }]
                })),
            ),
        )
        .await;

        let (status, body) = send(
            app.router(),
            json_request(
                Method::POST,
                "/api/save-profile",
                Some(json!({ "userId": "u1", "resumeUrl": "https://blob.test/resumes/cv.pdf" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let profile = &body["profile"];
        assert_eq!(profile["resumeUrl"], "https://blob.test/resumes/cv.pdf");
        assert_eq!(profile["education"].as_array().unwrap().len(), 1);
        assert_eq!(profile["experience"].as_array().unwrap().len(), 1);
        assert_eq!(profile["skills"][0]["skills"][0]["name"], "Go");
    }

    #[tokio::test]
    async fn test_save_section_rejects_unknown_section() {
        let app = TestApp::new();
        let (status, _) = send(
            app.router(),
            json_request(
                Method::PUT,
                "/api/profile/hobbies",
                Some(json!({ "userId": "u1", "data": [] })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_skills_section_save_and_view() {
        let app = TestApp::new();
        let (status, _) = send(
            app.router(),
            json_request(
                Method::PUT,
                "/api/profile/skills",
                Some(json!({
                    "userId": "u1",
                    "data": [{ "name": "Cloud", "skills": [{ "name": "AWS" }] }]
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(
            app.router(),
            json_request(Method::GET, "/api/profile/skills?userId=u1", None),
        )
        .await;
        assert_eq!(body["section"], "skills");
        assert_eq!(body["data"][0]["name"], "Cloud");
        assert!(!body["data"][0]["id"].as_str().unwrap().is_empty());
        assert!(!body["data"][0]["skills"][0]["id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_personal_info_section_requires_email() {
        let app = TestApp::new();
        let (status, body) = send(
            app.router(),
            json_request(
                Method::PUT,
                "/api/profile/personal-info",
                Some(json!({
                    "userId": "u1",
                    "data": { "personalInfo": [{ "label": "Full Name", "value": "Asha" }] }
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Email is required");
    }

    #[tokio::test]
    async fn test_entry_add_then_delete() {
        let app = TestApp::new();
        let (status, body) = send(
            app.router(),
            json_request(
                Method::POST,
                "/api/profile/experience/entries",
                Some(json!({ "userId": "u1", "entry": { "title": "SRE", "company": "Acme" } })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let entry_id = body["entryId"].as_str().unwrap().to_string();
        assert_eq!(body["profile"]["experience"][0]["id"], entry_id.as_str());

        let uri = format!("/api/profile/experience/entries/{entry_id}?userId=u1");
        let (status, body) = send(app.router(), json_request(Method::DELETE, &uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["profile"]["experience"].as_array().unwrap().is_empty());

        let (status, _) = send(app.router(), json_request(Method::DELETE, &uri, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_entry_upsert_replaces_existing() {
        let app = TestApp::new();
        for degree in ["BSc", "MSc"] {
            send(
                app.router(),
                json_request(
                    Method::POST,
                    "/api/profile/education/entries",
                    Some(json!({ "userId": "u1", "entry": { "id": "ed1", "degree": degree } })),
                ),
            )
            .await;
        }
        let profile = app.profiles.snapshot("u1").unwrap();
        assert_eq!(profile.education.len(), 1);
        assert_eq!(profile.education[0].degree, "MSc");
    }

    #[tokio::test]
    async fn test_mistyped_body_gets_json_error_envelope() {
        let app = TestApp::new();
        let (status, body) = send(
            app.router(),
            json_request(Method::POST, "/api/save-profile", Some(json!({ "userId": 42 }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].is_string());
        assert!(app.profiles.snapshot("42").is_none());
    }

    #[tokio::test]
    async fn test_body_without_json_content_type_is_400() {
        let app = TestApp::new();
        let req = Request::builder()
            .method(Method::PUT)
            .uri("/api/profile/education")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(r#"{"userId":"u1","data":[]}"#))
            .unwrap();
        let (status, body) = send(app.router(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
