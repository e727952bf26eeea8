//! Session route guard. Authentication itself is handled by the external auth
//! service; the guard only checks whether its session cookie is present.

use axum::{
    extract::Request,
    http::{header::COOKIE, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

pub const SESSION_COOKIE: &str = "better-auth.session_token";
/// Name the auth service uses when serving over HTTPS.
pub const SECURE_SESSION_COOKIE: &str = "__Secure-better-auth.session_token";

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin,
    RedirectToDashboard,
}

/// Returns the session token from any `Cookie` header, if one is set.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| {
            (*name == SESSION_COOKIE || *name == SECURE_SESSION_COOKIE) && !value.is_empty()
        })
        .map(|(_, value)| value.to_string())
}

pub fn is_protected(path: &str) -> bool {
    path == DASHBOARD_PATH || path.starts_with("/dashboard/")
}

pub fn is_auth_page(path: &str) -> bool {
    path == LOGIN_PATH || path == "/register"
}

pub fn decide(path: &str, has_session: bool) -> GuardDecision {
    if is_protected(path) && !has_session {
        GuardDecision::RedirectToLogin
    } else if is_auth_page(path) && has_session {
        GuardDecision::RedirectToDashboard
    } else {
        GuardDecision::Allow
    }
}

/// Middleware applying `decide` with temporary (307) redirects.
pub async fn route_guard(req: Request, next: Next) -> Response {
    let has_session = session_token(req.headers()).is_some();
    match decide(req.uri().path(), has_session) {
        GuardDecision::Allow => next.run(req).await,
        GuardDecision::RedirectToLogin => {
            debug!("No session for {}; redirecting to login", req.uri().path());
            Redirect::temporary(LOGIN_PATH).into_response()
        }
        GuardDecision::RedirectToDashboard => {
            debug!("Session present on {}; redirecting to dashboard", req.uri().path());
            Redirect::temporary(DASHBOARD_PATH).into_response()
        }
    }
}
