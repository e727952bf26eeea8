//! In-memory stores and request helpers for router-level tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use bytes::Bytes;
use serde_json::Value;
use tower::ServiceExt;

use crate::config::{Config, DEFAULT_MAX_UPLOAD_BYTES};
use crate::dashboard::board::ApplicationBoard;
use crate::errors::AppError;
use crate::models::profile::{Profile, ProfileFile};
use crate::profile::store::{FileSwap, ProfileMutation, ProfileStore};
use crate::routes::build_router;
use crate::state::AppState;
use crate::uploads::blob::{key_under_base, BlobStore};

pub const BLOB_BASE: &str = "http://blob.test/bucket";
const BOUNDARY: &str = "----hirepilot-test-boundary";

#[derive(Default)]
pub struct MemoryProfileStore {
    docs: Mutex<HashMap<String, Profile>>,
}

impl MemoryProfileStore {
    pub fn snapshot(&self, user_id: &str) -> Option<Profile> {
        self.docs.lock().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn find(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        Ok(self.snapshot(user_id))
    }

    async fn update(&self, user_id: &str, mutation: ProfileMutation) -> Result<Profile, AppError> {
        let mut docs = self.docs.lock().unwrap();
        let mut profile = docs
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Profile::new(user_id));
        mutation.apply(&mut profile)?;
        profile.user_id = user_id.to_string();
        docs.insert(user_id.to_string(), profile.clone());
        Ok(profile)
    }

    async fn swap_file(
        &self,
        user_id: &str,
        file: ProfileFile,
        url: Option<String>,
    ) -> Result<FileSwap, AppError> {
        let mut docs = self.docs.lock().unwrap();
        if url.is_some() && !docs.contains_key(user_id) {
            docs.insert(user_id.to_string(), Profile::new(user_id));
        }
        let Some(profile) = docs.get_mut(user_id) else {
            return Ok(FileSwap {
                previous: None,
                profile: None,
            });
        };
        let previous = std::mem::replace(file.slot(profile), url);
        Ok(FileSwap {
            previous,
            profile: Some(profile.clone()),
        })
    }
}

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    fail_deletes: AtomicBool,
}

impl MemoryBlobStore {
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn contains(&self, url: &str) -> bool {
        key_under_base(BLOB_BASE, url)
            .is_some_and(|key| self.objects.lock().unwrap().contains_key(&key))
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, AppError> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(format!("{BLOB_BASE}/{key}"))
    }

    async fn delete(&self, url: &str) -> Result<bool, AppError> {
        let Some(key) = key_under_base(BLOB_BASE, url) else {
            return Ok(false);
        };
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Storage("delete refused".to_string()));
        }
        Ok(self.objects.lock().unwrap().remove(&key).is_some())
    }
}

pub fn test_config(max_upload_bytes: usize) -> Config {
    Config {
        database_url: "postgres://localhost/hirepilot_test".to_string(),
        s3_bucket: "bucket".to_string(),
        s3_endpoint: "http://blob.test".to_string(),
        s3_region: "us-east-1".to_string(),
        s3_public_url: BLOB_BASE.to_string(),
        aws_access_key_id: "test".to_string(),
        aws_secret_access_key: "test".to_string(),
        cors_origins: vec!["http://localhost:3000".to_string()],
        max_upload_bytes,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

pub struct TestApp {
    pub profiles: Arc<MemoryProfileStore>,
    pub blobs: Arc<MemoryBlobStore>,
    state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_upload_limit(DEFAULT_MAX_UPLOAD_BYTES)
    }

    pub fn with_upload_limit(max_upload_bytes: usize) -> Self {
        let profiles = Arc::new(MemoryProfileStore::default());
        let blobs = Arc::new(MemoryBlobStore::default());
        let state = AppState {
            profiles: profiles.clone(),
            blobs: blobs.clone(),
            board: Arc::new(ApplicationBoard::seeded()),
            config: test_config(max_upload_bytes),
        };
        TestApp {
            profiles,
            blobs,
            state,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn raw(&self, req: Request<Body>) -> Response {
        self.router().oneshot(req).await.unwrap()
    }
}

/// Sends one request and decodes the JSON body (`Null` when empty).
pub async fn send(router: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

pub fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn with_session(mut req: Request<Body>) -> Request<Body> {
    req.headers_mut().insert(
        header::COOKIE,
        "better-auth.session_token=test-session".parse().unwrap(),
    );
    req
}

pub struct MultipartPart {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

impl MultipartPart {
    pub fn text(name: &str, value: &str) -> Self {
        MultipartPart {
            name: name.to_string(),
            filename: None,
            content_type: None,
            data: value.as_bytes().to_vec(),
        }
    }

    pub fn file(name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        MultipartPart {
            name: name.to_string(),
            filename: Some(filename.to_string()),
            content_type: Some(content_type.to_string()),
            data: data.to_vec(),
        }
    }
}

pub fn multipart_request(uri: &str, parts: Vec<MultipartPart>) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(filename) = &part.filename {
            disposition.push_str(&format!("; filename=\"{filename}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(ct) = &part.content_type {
            body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
