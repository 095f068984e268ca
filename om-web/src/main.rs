//! om-web - OpenMedicaid site server
//!
//! Loads the pre-computed dataset once, then serves pages, the RSS feed,
//! the sitemap, the JSON API and raw dataset downloads.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use om_common::config::{CompiledDefaults, SiteConfig, TomlConfig};
use om_common::Dataset;
use om_web::{build_router, AppState};

/// Command-line arguments for om-web
#[derive(Parser, Debug)]
#[command(name = "om-web")]
#[command(about = "OpenMedicaid Medicaid Money Tracker site server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "OM_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "OM_HOST")]
    host: Option<String>,

    /// Directory holding the JSON fixtures
    #[arg(short, long, env = "OM_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Path to config.toml
    #[arg(short, long, env = "OM_CONFIG")]
    config: Option<PathBuf>,

    /// Absolute site URL used in the feed and sitemap
    #[arg(long, env = "OM_SITE_URL")]
    site_url: Option<String>,
}

fn log_filter(level: &str) -> String {
    format!("om_web={level},om_common={level},tower_http={level}")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise start at the default level and apply the
    // config file's level once it has been read
    let rust_log_set = std::env::var_os("RUST_LOG").is_some();
    let default_level = CompiledDefaults::default().log_level;
    let (filter, filter_handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter(&default_level).into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting OpenMedicaid site (om-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let toml = TomlConfig::load(args.config.as_deref());
    let config = SiteConfig::resolve(
        args.data_dir.as_deref(),
        args.site_url.as_deref(),
        args.host.as_deref(),
        args.port,
        &toml,
    );

    if !rust_log_set && config.log_level != default_level {
        if let Err(e) = filter_handle.reload(EnvFilter::new(log_filter(&config.log_level))) {
            warn!("Could not apply log level {:?}: {}", config.log_level, e);
        }
    }

    info!("Data directory: {}", config.data_dir.display());
    let data = Dataset::load(&config.data_dir)
        .with_context(|| format!("Failed to load dataset from {}", config.data_dir.display()))?;

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(data, config).context("Failed to compile page templates")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("om-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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
