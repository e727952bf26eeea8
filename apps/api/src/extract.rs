use axum::extract::FromRequest;

use crate::errors::AppError;

/// `axum::Json` whose rejections render through `AppError`, so a missing or
/// malformed body gets the same `{error:{code,message}}` shape as every other
/// failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
