mod core;
mod features;
mod modules;
mod shared;

use crate::core::app::{build_router, AppServices, RequestLimits};
use crate::core::config::Config;
use crate::core::metrics::Metrics;
use crate::core::{database, logging};
use crate::features::files::{FileService, PgFileRepository};
use crate::features::health::{HealthService, PgHealthRepository};
use crate::modules::storage::S3Client;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    logging::init(&config.logging)?;

    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );
    tracing::info!(
        "Configuration loaded successfully (environment: {})",
        config.app.environment
    );

    // Create database (if missing) and connection pool
    let pool = database::connect_with_database_creation(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    let metrics = Arc::new(Metrics::new(&config.metrics));

    // Initialize S3 client for storage
    let s3_client = Arc::new(
        S3Client::new(&config.storage)
            .map_err(|e| anyhow::anyhow!("Failed to initialize S3 client: {}", e))?,
    );
    s3_client
        .ensure_bucket_exists()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to ensure S3 bucket exists: {}", e))?;
    tracing::info!("S3 client initialized for bucket: {}", s3_client.bucket_name());

    let file_service = Arc::new(FileService::new(
        Arc::new(PgFileRepository::new(pool.clone())),
        s3_client,
        Arc::clone(&metrics),
        config.storage.key_prefix.clone(),
        config.app.max_upload_size,
    ));
    tracing::info!("File service initialized");

    let health_service = Arc::new(HealthService::new(
        Arc::new(PgHealthRepository::new(pool.clone())),
        Arc::clone(&metrics),
    ));
    tracing::info!("Health service initialized");

    let app = build_router(AppServices {
        file_service,
        health_service,
        metrics,
        limits: RequestLimits {
            max_upload_size: config.app.max_upload_size,
            max_request_body_size: config.app.max_request_body_size,
        },
    });

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("OpenAPI document at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
