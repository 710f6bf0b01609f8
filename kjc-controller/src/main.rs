//! KJ Controller (kjc-controller) - Main entry point

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use kjc_common::config::TomlConfig;
use kjc_controller::api::{self, AppContext};
use kjc_controller::config::{Config, Overrides};
use kjc_controller::engine::{EngineControl, EngineRole, VlcEngine};
use kjc_controller::resolver::{AssetResolver, DirectoryResolver};
use kjc_controller::{Controller, SharedState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for kjc-controller
#[derive(Parser, Debug)]
#[command(name = "kjc-controller")]
#[command(about = "Synchronized karaoke playback controller")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "KJC_PORT")]
    port: Option<u16>,

    /// Path to the TOML configuration file
    #[arg(short, long, env = "KJC_CONFIG")]
    config: Option<PathBuf>,

    /// Directory containing video files
    #[arg(short, long, env = "KJC_VIDEO_DIR")]
    video_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "KJC_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (toml, config_source) =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let config = Config::resolve(
        toml,
        Overrides {
            port: args.port,
            video_dir: args.video_dir,
            log_level: args.log_level,
        },
    );

    init_tracing(&config)?;

    info!(
        "Starting KJ Controller (kjc-controller) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => warn!("No config file found, using built-in defaults"),
    }
    info!("Video directory: {}", config.video_dir.display());
    info!("Master engine: {}", config.master.base_url());
    info!("Background engine: {}", config.background.base_url());

    let master: Arc<dyn EngineControl> = Arc::new(
        VlcEngine::new(EngineRole::Master, &config.master)
            .context("Failed to create master engine client")?,
    );
    let background: Arc<dyn EngineControl> = Arc::new(
        VlcEngine::new(EngineRole::Background, &config.background)
            .context("Failed to create background engine client")?,
    );
    let resolver: Arc<dyn AssetResolver> = Arc::new(DirectoryResolver::new(
        config.video_dir.clone(),
        config.video_extension.clone(),
    ));

    let state = Arc::new(SharedState::new(
        config.master.volume,
        config.background.volume,
        config.timing.sync_offset_ms,
        config.timing.max_abs_offset_ms,
    ));

    let controller = Controller::new(
        master,
        background,
        resolver,
        state,
        config.timings(),
        config.timing.fade_steps,
        config.background_track.clone(),
    );
    let monitor = controller.start();
    info!("Playback monitor started");

    api::run(AppContext { controller }, config.port, shutdown_signal())
        .await
        .context("HTTP server failed")?;

    monitor.abort();
    info!("Server shutdown complete");
    Ok(())
}

/// Console output always; a plain-text copy goes to `logging.file` when set
fn init_tracing(config: &Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "kjc_controller={level},kjc_common={level},tower_http=info",
            level = config.logging.level
        )
        .into()
    });

    let file_layer = match &config.logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
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
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
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
