use std::sync::Arc;
use tracing::info;

use venue_pulse::config::Config;
use venue_pulse::engine::PulseEngine;
use venue_pulse::web::server::WebServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "venue_pulse=info".into()),
        )
        .init();

    info!("📍 venue-pulse v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "venue-pulse.toml".to_string());

    let config = Config::load(&config_path)?;
    info!("Config loaded from {}", config_path);

    let config = Arc::new(config);
    let engine = Arc::new(PulseEngine::new(config.clone()));

    let web = WebServer::new(engine, config);
    web.run().await
}
