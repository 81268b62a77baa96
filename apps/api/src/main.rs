mod account;
mod config;
mod cv;
mod db;
mod errors;
mod interview;
mod models;
mod report;
mod routes;
mod session;
mod state;
mod workflow_client;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::interview::ownership::PgInterviewOwnership;
use crate::routes::build_router;
use crate::session::finisher::WorkflowFinishSink;
use crate::session::SessionRegistry;
use crate::state::AppState;
use crate::workflow_client::WorkflowClient;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL (migrations run on connect)
    let db = create_pool(&config.database_url).await?;

    // S3 / MinIO for original CV files
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Workflow service
    let workflow = WorkflowClient::new(
        config.workflow_base_url.clone(),
        Duration::from_secs(config.workflow_timeout_secs),
    )?;
    if workflow.is_configured() {
        info!("Workflow client initialized");
    } else {
        warn!("WORKFLOW_BASE_URL is not set; interview routes will answer 503");
    }

    let state = AppState {
        interviews: Arc::new(PgInterviewOwnership(db.clone())),
        db,
        s3,
        finish_sink: Arc::new(WorkflowFinishSink(workflow.clone())),
        workflow,
        config: config.clone(),
        sessions: SessionRegistry::new(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web app's domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
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
        "interview-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
