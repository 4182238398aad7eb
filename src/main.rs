//! Storefront -- e-commerce administrative backend.
//!
//! Startup is idempotent: the admin account is (re)seeded from config
//! on every boot, and the SQLite schema is created if missing.
//! SIGTERM/SIGINT handlers only stop accepting connections and wait for
//! in-flight requests before exiting.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

/// Command-line arguments for the Storefront server.
#[derive(Parser, Debug)]
#[command(
    name = "storefront",
    version,
    about = "E-commerce administrative backend"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "storefront.example.yaml")]
    config: String,

    /// Override the bind address (host:port).
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing / logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("Loading configuration from {}", cli.config);
    let config = storefront::config::load_config(&cli.config)?;

    let bind_addr = cli
        .bind
        .unwrap_or_else(|| format!("{}:{}", config.server.host, config.server.port));

    // Initialize Prometheus metrics recorder and register metric descriptions.
    storefront::metrics::init_metrics();
    storefront::metrics::describe_metrics();
    info!("Prometheus metrics initialized");

    // Initialize the document store based on config.
    let store: Arc<dyn storefront::store::DocumentStore> = match config.database.backend.as_str() {
        "memory" => {
            info!("In-memory document store initialized");
            Arc::new(storefront::store::MemoryStore::new())
        }
        _ => {
            let db_path = &config.database.path;
            // Ensure parent directory exists for the SQLite file.
            if let Some(parent) = std::path::Path::new(db_path).parent() {
                std::fs::create_dir_all(parent)?;
            }
            let sqlite = storefront::store::SqliteStore::new(db_path)?;
            info!("SQLite document store initialized at {}", db_path);
            Arc::new(sqlite)
        }
    };

    // Seed the admin account from config (idempotent on every startup).
    let now = storefront::store::store::now_rfc3339();
    store
        .seed_admin(storefront::store::AdminRecord {
            id: uuid::Uuid::new_v4().to_string(),
            username: config.auth.admin_username.clone(),
            password_hash: storefront::auth::hash_password(&config.auth.admin_password)?,
            created_at: now.clone(),
            updated_at: now,
        })
        .await?;
    info!("Admin account '{}' seeded", config.auth.admin_username);

    // Initialize the media backend based on config.
    let media: Arc<dyn storefront::media::MediaStorage> = match config.media.backend.as_str() {
        "memory" => {
            info!("In-memory media backend initialized");
            Arc::new(storefront::media::MemoryMediaBackend::new())
        }
        _ => {
            if config.media.endpoint.is_empty() {
                anyhow::bail!("media.backend is 'http' but media.endpoint is not set");
            }
            let backend = storefront::media::HttpMediaBackend::new(
                config.media.endpoint.clone(),
                config.media.api_key.clone(),
                config.media.folder.clone(),
            )?;
            info!(
                "HTTP media backend initialized: endpoint={} folder='{}'",
                config.media.endpoint, config.media.folder
            );
            Arc::new(backend)
        }
    };

    // Generative-AI client.
    let model: Arc<dyn storefront::ai::TextModel> = Arc::new(storefront::ai::GeminiClient::new(
        config.ai.endpoint.clone(),
        config.ai.api_key.clone(),
        config.ai.model.clone(),
    )?);
    info!("Generative model client initialized: model={}", config.ai.model);

    // Build AppState.
    let state = Arc::new(storefront::AppState {
        config: config.clone(),
        store,
        media,
        model,
    });

    let app = storefront::server::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Storefront listening on {}", bind_addr);

    // Graceful shutdown: on SIGTERM/SIGINT, stop accepting new connections
    // and wait for in-flight requests to complete before exiting.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Storefront shut down");

    Ok(())
}

/// Wait for SIGTERM or SIGINT (Ctrl+C), then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}
