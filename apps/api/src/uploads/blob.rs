//! Blob storage for resumes and avatars. The profile only ever stores the
//! public URL returned by `put`.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores the bytes under `key` and returns the public URL.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, AppError>;

    /// Removes the blob behind a URL previously returned by `put`.
    /// Returns `false` without touching storage when the URL is not one of ours.
    async fn delete(&self, url: &str) -> Result<bool, AppError>;
}

/// S3-compatible store (MinIO locally, S3 in production).
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base: String,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base: String) -> Self {
        S3BlobStore {
            client,
            bucket,
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for_key(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }

    pub fn key_for_url(&self, url: &str) -> Option<String> {
        key_under_base(&self.public_base, url)
    }
}

pub(crate) fn key_under_base(base: &str, url: &str) -> Option<String> {
    let key = url.strip_prefix(base)?.strip_prefix('/')?;
    let key = key.split(['?', '#']).next().unwrap_or_default();
    (!key.is_empty()).then(|| key.to_string())
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, AppError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Uploaded {size} bytes to s3://{}/{}", self.bucket, key);
        Ok(self.url_for_key(key))
    }

    async fn delete(&self, url: &str) -> Result<bool, AppError> {
        let Some(key) = self.key_for_url(url) else {
            return Ok(false);
        };
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 delete failed: {e}")))?;

        info!("Deleted s3://{}/{}", self.bucket, key);
        Ok(true)
    }
}
