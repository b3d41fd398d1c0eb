//! Cabinet server: wires the crates together and runs the HTTP API, the
//! thumbnail worker or the migrations.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use cabinet_api::{AppState, build_router};
use cabinet_cache::CacheManager;
use cabinet_core::config::AppConfig;
use cabinet_core::error::AppError;
use cabinet_core::traits::{ContentStore, JobPublisher};
use cabinet_database::{FileRecordStore, FileRepository, JobRepository, MetadataDb};
use cabinet_storage::{LocalStorageProvider, ThumbnailGenerator};
use cabinet_worker::jobs::ThumbnailJobHandler;
use cabinet_worker::{JobExecutor, JobQueue, WorkQueue, WorkerRunner};

#[derive(Debug, Parser)]
#[command(name = "cabinet", version, about = "File storage backend")]
struct Cli {
    /// Configuration directory holding `default.toml` and overlays.
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// Environment overlay to load (`config/<env>.toml`).
    #[arg(long, default_value = "development")]
    env: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (and the embedded worker when enabled). The default.
    Serve,
    /// Run only the thumbnail worker.
    Worker,
    /// Apply pending database migrations and exit.
    Migrate,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load_from(&cli.config_dir, &cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Worker => worker(config).await,
        Command::Migrate => migrate(config).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Cabinet exited with an error");
        std::process::exit(1);
    }
}

/// Initialize tracing. `RUST_LOG` takes precedence over the configured level.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Backing stores shared by the server and the worker.
struct Infrastructure {
    db: MetadataDb,
    store: Arc<dyn FileRecordStore>,
    content: Arc<dyn ContentStore>,
    queue: Arc<JobQueue>,
}

async fn connect(config: &AppConfig) -> Result<Infrastructure, AppError> {
    tracing::info!("Connecting to database...");
    let db = MetadataDb::connect(&config.database).await?;
    cabinet_database::migration::run_migrations(db.pool()).await?;

    tracing::info!(root = %config.storage.folder_path, "Initializing content store...");
    let content: Arc<dyn ContentStore> =
        Arc::new(LocalStorageProvider::new(&config.storage.folder_path).await?);

    let store: Arc<dyn FileRecordStore> = Arc::new(FileRepository::new(db.pool().clone()));
    let queue = Arc::new(JobQueue::new(
        Arc::new(JobRepository::new(db.pool().clone())),
        config.worker.queue.clone(),
        worker_id(),
    ));

    Ok(Infrastructure {
        db,
        store,
        content,
        queue,
    })
}

/// Host name plus a random suffix, so restarts are distinguishable in the jobs table.
fn worker_id() -> String {
    let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "cabinet".to_string());
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{host}-{}", &suffix[..8])
}

fn build_worker(config: &AppConfig, infra: &Infrastructure) -> WorkerRunner {
    let mut executor = JobExecutor::new();
    executor.register(Arc::new(ThumbnailJobHandler::new(
        Arc::clone(&infra.store),
        ThumbnailGenerator::new(Arc::clone(&infra.content)),
    )));

    let queue: Arc<dyn WorkQueue> = infra.queue.clone();
    WorkerRunner::new(queue, Arc::new(executor), config.worker.clone())
}

async fn serve(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Cabinet v{}", env!("CARGO_PKG_VERSION"));

    let infra = connect(&config).await?;

    tracing::info!(provider = %config.cache.provider, "Initializing credential store...");
    let cache = Arc::new(CacheManager::new(&config.cache).await?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker_handle = if config.worker.enabled {
        let runner = build_worker(&config, &infra);
        let cancel = shutdown_rx.clone();
        tracing::info!(worker_id = %infra.queue.worker_id(), "Embedded worker started");
        Some(tokio::spawn(async move { runner.run(cancel).await }))
    } else {
        tracing::info!("Embedded worker disabled");
        None
    };

    let publisher: Arc<dyn JobPublisher> = infra.queue.clone();
    let state = AppState::new(
        config.clone(),
        Arc::clone(&infra.store),
        Arc::clone(&infra.content),
        cache,
        publisher,
    );
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(%addr, "Cabinet listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(handle) = worker_handle {
        let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
        if tokio::time::timeout(grace, handle).await.is_err() {
            tracing::warn!("Worker did not stop within the grace period");
        }
    }

    infra.db.close().await;
    tracing::info!("Cabinet shut down gracefully");
    Ok(())
}

async fn worker(config: AppConfig) -> Result<(), AppError> {
    let infra = connect(&config).await?;
    let runner = build_worker(&config, &infra);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, draining jobs...");
        let _ = shutdown_tx.send(true);
    });

    tracing::info!(worker_id = %infra.queue.worker_id(), "Worker started");
    runner.run(shutdown_rx).await;

    infra.db.close().await;
    Ok(())
}

async fn migrate(config: AppConfig) -> Result<(), AppError> {
    let db = MetadataDb::connect(&config.database).await?;
    cabinet_database::migration::run_migrations(db.pool()).await?;
    db.close().await;
    tracing::info!("Migrations applied");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
