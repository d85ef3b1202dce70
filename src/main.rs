//! ShareMirror Server. Mirrors remote share trees into PostgreSQL.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::sync::watch;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use sharemirror_core::config::AppConfig;
use sharemirror_core::error::AppError;
use sharemirror_database::DatabasePool;
use sharemirror_database::repositories::{LocationRepository, PathNodeRepository};
use sharemirror_remote::MountedShareConnector;
use sharemirror_service::MirrorService;
use sharemirror_worker::{CronScheduler, JobQueue, WorkerRunner};

#[tokio::main]
async fn main() {
    let env = std::env::var("SHAREMIRROR_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!("Configuration loaded (env: {})", env);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
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
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ShareMirror v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    sharemirror_database::migration::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");

    // ── Step 2: Repositories and share access ────────────────────
    let location_repo = Arc::new(LocationRepository::new(db.pool().clone()));
    let node_repo = Arc::new(PathNodeRepository::new(db.pool().clone()));
    let connector = Arc::new(MountedShareConnector::new(
        &config.remote.mount_root,
        config.remote.port,
    ));
    tracing::info!("Shares resolved under '{}'", config.remote.mount_root);

    // ── Step 3: Sync engine ──────────────────────────────────────
    let mirror = Arc::new(MirrorService::new(
        location_repo,
        node_repo,
        connector,
        config.remote.clone(),
    ));

    // ── Step 4: Shutdown channel, worker and scheduler ───────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let (jobs, worker_handle, scheduler) = if config.worker.enabled {
        let queue = Arc::new(JobQueue::new(config.worker.max_attempts));
        let executor = Arc::new(sharemirror_worker::jobs::sync_executor(
            Arc::clone(&mirror),
            Arc::clone(&queue),
        ));
        let runner = WorkerRunner::new(Arc::clone(&queue), executor, &config.worker);

        let scheduler = CronScheduler::new(Arc::clone(&queue), &config.worker).await?;
        scheduler.register_default_tasks().await?;
        scheduler.start().await?;

        let worker_cancel = shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            runner.run(worker_cancel).await;
        });

        tracing::info!("Background worker started");
        (Some(queue), Some(handle), Some(scheduler))
    } else {
        tracing::info!("Background worker disabled");
        (None, None, None)
    };

    // ── Step 5: Build and start HTTP server ──────────────────────
    let app = sharemirror_api::build_router(sharemirror_api::AppState::new(
        Arc::clone(&mirror),
        jobs,
    ));

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("ShareMirror listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 6: Drain background work ────────────────────────────
    if let Some(scheduler) = scheduler {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!("Scheduler shutdown failed: {}", e);
        }
    }
    if let Some(handle) = worker_handle {
        if let Err(e) = handle.await {
            tracing::warn!("Worker task ended abnormally: {}", e);
        }
    }

    db.close().await;
    tracing::info!("ShareMirror stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
