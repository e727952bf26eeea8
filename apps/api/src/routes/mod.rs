pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::auth::guard::route_guard;
use crate::dashboard::handlers as dashboard;
use crate::profile::handlers as profile;
use crate::state::AppState;
use crate::uploads::handlers as uploads;

/// Headroom for multipart framing and the `userId` field on top of the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD;

    let upload_routes = Router::new()
        .route(
            "/api/upload-profile-image",
            post(uploads::handle_upload_profile_image),
        )
        .route("/api/upload-resume", post(uploads::handle_upload_resume))
        .layer(DefaultBodyLimit::max(upload_limit));

    Router::new()
        .route("/health", get(health::health_handler))
        // Profile document API
        .route("/api/get-profile", get(profile::handle_get_profile))
        .route("/api/save-profile", post(profile::handle_save_profile))
        .route("/api/delete-resume", delete(uploads::handle_delete_resume))
        // Section and entry-level updates
        .route(
            "/api/profile/:section",
            get(profile::handle_get_section).put(profile::handle_save_section),
        )
        .route(
            "/api/profile/:section/entries",
            post(profile::handle_save_entry),
        )
        .route(
            "/api/profile/:section/entries/:entry_id",
            delete(profile::handle_delete_entry),
        )
        // Dashboard (session required)
        .route("/dashboard/statistics", get(dashboard::handle_statistics))
        .route(
            "/dashboard/notifications",
            get(dashboard::handle_notifications),
        )
        .route(
            "/dashboard/interview-prep",
            get(dashboard::handle_interview_prep),
        )
        .route(
            "/dashboard/applications",
            get(dashboard::handle_list_applications),
        )
        .route(
            "/dashboard/applications/:id",
            put(dashboard::handle_save_draft).delete(dashboard::handle_delete_draft),
        )
        .route(
            "/dashboard/applications/:id/submit",
            post(dashboard::handle_submit_application),
        )
        .merge(upload_routes)
        .layer(middleware::from_fn(route_guard))
        .with_state(state)
}
