//! calico-server - Radio Calico song API
//!
//! Serves the songs API (listing, detail, votes, plays, cover art) and,
//! when configured, the static frontend.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use calico_common::config::TomlConfig;
use calico_server::services::CoverArtResolver;
use calico_server::{build_router, AppState, ServerInfo};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for calico-server
///
/// Each flag falls back to its environment variable, then to the TOML file,
/// then to the built-in default.
#[derive(Parser, Debug)]
#[command(name = "calico-server")]
#[command(about = "Radio Calico song API server")]
#[command(version)]
struct Args {
    /// TOML configuration file (default: <config dir>/calico/config.toml)
    #[arg(short, long, env = "CALICO_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "CALICO_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "CALICO_BIND")]
    bind: Option<String>,

    /// sqlx connection string for the songs database
    #[arg(short, long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Directory of frontend files served at /
    #[arg(short, long, env = "CALICO_STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

impl Args {
    /// Overlay command-line/environment values on the file configuration
    fn apply(self, mut config: TomlConfig) -> TomlConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = self.bind {
            config.bind_address = bind;
        }
        if let Some(database_url) = self.database_url {
            config.database_url = database_url;
        }
        if let Some(static_dir) = self.static_dir {
            config.static_dir = Some(static_dir);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.config.clone();

    // Config comes before tracing: its log level feeds the filter
    let file_config = TomlConfig::load_or_default(config_path.as_deref())
        .context("Failed to load configuration")?;
    let config = args.apply(file_config);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("calico_server={0},calico_common={0},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Radio Calico server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Environment: {}", config.environment);
    info!("Database: {}", database_display_name(&config.database_url));

    let pool = calico_common::db::init_database_pool(&config.database_url, config.max_connections)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Connected to database");

    let resolver = CoverArtResolver::new(&config.cover_art)
        .context("Failed to initialize cover art resolver")?;

    if let Some(dir) = &config.static_dir {
        info!("Serving static files from {}", dir.display());
    }

    let state = AppState::new(
        pool,
        resolver,
        ServerInfo {
            environment: config.environment.clone(),
            port: config.port,
            database: database_display_name(&config.database_url),
        },
    )
    .with_static_dir(config.static_dir.clone());
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_address, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Database name safe to show to users: file name without query string
fn database_display_name(database_url: &str) -> String {
    let without_scheme = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let path = without_scheme.split('?').next().unwrap_or_default();

    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "unknown".to_string(),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
