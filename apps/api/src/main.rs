mod auth;
mod config;
mod dashboard;
mod db;
mod errors;
mod extract;
mod models;
mod profile;
mod routes;
mod state;
mod uploads;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::dashboard::board::ApplicationBoard;
use crate::db::create_pool;
use crate::profile::store::PgProfileStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::uploads::blob::S3BlobStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_PKG_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HirePilot API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (profile documents)
    let db = create_pool(&config.database_url).await?;

    // Initialize S3 / MinIO (resumes and avatars)
    let s3 = build_s3_client(&config).await;
    info!(
        "S3 client initialized (bucket: {}, public base: {})",
        config.s3_bucket, config.s3_public_url
    );

    let state = AppState {
        profiles: Arc::new(PgProfileStore::new(db)),
        blobs: Arc::new(S3BlobStore::new(
            s3,
            config.s3_bucket.clone(),
            config.s3_public_url.clone(),
        )),
        board: Arc::new(ApplicationBoard::seeded()),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(&config)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}; is the port already in use?"))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "hirepilot-static",
    );

    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.s3_region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // MinIO serves buckets under the path, not as subdomains.
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

/// CORS for the web client: configured origins only, with cookies.
fn build_cors(config: &Config) -> Result<CorsLayer> {
    let origins = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}
