/* battmond-rs entrypoint: sets up tracing, loads the configuration, spawns the
 * monitor task, and serves the DBus status interface until shutdown. */
mod battery;
mod config;
mod dbus;
mod error;
mod monitor;
mod profile;
mod status;
mod transport;

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = PathBuf::from(
        std::env::var("BATTMOND_CONFIG")
            .unwrap_or_else(|_| "battery_monitor_config.json".to_string()),
    );
    let config = config::MonitorConfig::load(&config_path);

    /* debug_mode lowers the default filter; RUST_LOG still wins */
    let default_filter = if config.debug_mode { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    info!("Starting battmond-rs version {}", env!("CARGO_PKG_VERSION"));

    /* A missing HID subsystem is the one startup-fatal condition */
    let transport = transport::HidTransport::new()?;

    let (handle, snapshot_rx) = monitor::spawn(Box::new(transport), config, config_path);

    dbus::run_server(handle, snapshot_rx).await?;

    Ok(())
}
