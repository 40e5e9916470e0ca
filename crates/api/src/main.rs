//! Focus Monitor - Main Entry Point

use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_logging(config.server.json_logs);

    info!("=== Focus Monitor v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        settings = %config.storage.settings_path.display(),
        "Loading configuration"
    );

    run_server(config).await?;

    Ok(())
}
