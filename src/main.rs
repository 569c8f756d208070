use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::Path;
use tapestry_import::cli::{handle_command, Cli};
use tapestry_import::core::ConfigManager;
use tapestry_import::environment::{EnvironmentConfig, CONFIG_FILE};
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "tapestry_import=info,rocket=warn";

fn init_logging(log_path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open(log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigManager::load()?;
    init_logging(config.log_path())?;

    info!(
        "tapestry-import {} (environment: {})",
        env!("CARGO_PKG_VERSION"),
        EnvironmentConfig::get_environment()
    );
    if Path::new(CONFIG_FILE).exists() {
        info!("Configuration loaded from {}", CONFIG_FILE);
    } else {
        info!("{} not found, using built-in defaults", CONFIG_FILE);
    }
    info!("Directory API: {}", config.service.api_base_url);

    handle_command(cli, config).await
}
