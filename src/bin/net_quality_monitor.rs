//! Net Quality Monitor Service
//!
//! Standalone binary running the periodic speed monitor and logging every
//! classification transition. Connectivity metadata comes from a static
//! wired profile (platform metadata sources live outside this crate), so
//! quality tracking here is driven by the socket probe.
//!
//! Usage:
//!   net_quality_monitor --config config.toml --log-level debug

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use netquality::{ConnectivityProfile, MonitorConfig, NetQualityService, StaticProfileSource};

#[derive(Parser, Debug)]
#[command(name = "net_quality_monitor")]
#[command(about = "Continuous internet connection quality monitoring")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Probe host override
    #[arg(long)]
    probe_host: Option<String>,

    /// Check interval override in seconds
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting net quality monitor");

    let mut config = if let Some(config_path) = &args.config {
        info!("Loading config from {}", config_path);
        let content = tokio::fs::read_to_string(config_path).await?;
        toml::from_str(&content)?
    } else {
        info!("Using default configuration");
        MonitorConfig::default()
    };
    if let Some(host) = args.probe_host {
        config.probe_host = host;
    }
    if let Some(secs) = args.interval_secs {
        config.check_interval = Duration::from_secs(secs);
    }
    info!(
        probe_host = %config.probe_host,
        interval = ?config.check_interval,
        "monitor configuration"
    );

    let source = Arc::new(StaticProfileSource::new(
        ConnectivityProfile::wired_unrestricted(),
    ));
    let mut service = NetQualityService::new(config, source);

    service.on_strength_changed(Box::new(|class| {
        info!(%class, "connection quality changed");
    }));
    service.on_availability_changed(Box::new(|available| {
        info!(available, "connectivity availability changed");
    }));

    service.start();

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    service.shutdown().await;

    Ok(())
}
