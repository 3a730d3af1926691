mod config;
mod entities;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use crate::config::Config;
use crate::middleware::auth::JwtVerifier;
use crate::routes::create_routes;
use crate::services::ingest::{IngestService, IngestSettings, THUMBNAIL_STAGING_DIR};
use crate::services::probe::FfprobeProbe;
use crate::services::s3::S3Service;
use crate::services::staging::StagedArtifact;
use crate::services::transcoder::FfmpegTranscoder;
use crate::services::video_store::SeaOrmVideoStore;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "video-blob-kit", version, about = "Video ingestion, fast-start transcoding and S3 publishing")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Apply migrations and start the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("video_blob_kit=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let db = Database::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => Ok(()),
        Command::Serve => serve(config, db).await,
    }
}

async fn serve(config: Config, db: DatabaseConnection) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&config.assets_root).await?;
    tokio::fs::create_dir_all(&config.temp_dir).await?;
    let staging_dir = config.assets_root.join(THUMBNAIL_STAGING_DIR);
    let swept = StagedArtifact::sweep(&staging_dir).await?;
    if swept > 0 {
        tracing::warn!(count = swept, dir = %staging_dir.display(), "Removed leftover staged thumbnails");
    }

    let objects = S3Service::new(&config).await;
    tracing::info!(bucket = %objects.bucket_name, base_url = %config.store_base_url(), "Object store configured");

    let ingest = IngestService::new(
        Arc::new(SeaOrmVideoStore::new(db)),
        Arc::new(objects),
        Arc::new(FfmpegTranscoder::new(config.ffmpeg_path.clone(), config.tool_timeout)),
        Arc::new(FfprobeProbe::new(config.ffprobe_path.clone(), config.tool_timeout)),
        IngestSettings::from(&config),
    );
    let state = AppState::new(ingest, JwtVerifier::new(&config.jwt_secret));
    let app = create_routes(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
