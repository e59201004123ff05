//! Alert Mailer CLI
//!
//! Command-line interface for the meme stock alert email service.

use std::path::PathBuf;

use alert_mailer::{load_config, Config};
use clap::Parser;
use tracing::Level;

#[derive(Parser)]
#[command(name = "alert-mailer")]
#[command(about = "Email notification service for meme stock alerts")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP port (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, port={:?}, log_level={:?}",
        args.config,
        args.port,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    config.apply_env();

    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Starting alert mailer");
    tracing::debug!(
        "Notifications enabled={}, recipient={}, smtp={}:{}",
        config.notifications.enabled,
        config.notifications.email,
        config.notifications.smtp_config.host,
        config.notifications.smtp_config.port
    );

    alert_mailer::run(config).await?;

    Ok(())
}
