use std::sync::Arc;

use crate::config::Config;
use crate::dashboard::board::ApplicationBoard;
use crate::profile::store::ProfileStore;
use crate::uploads::blob::BlobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Profile documents. Default: `PgProfileStore`.
    pub profiles: Arc<dyn ProfileStore>,
    /// Resume and avatar binaries. Default: `S3BlobStore`.
    pub blobs: Arc<dyn BlobStore>,
    pub board: Arc<ApplicationBoard>,
    pub config: Config,
}
