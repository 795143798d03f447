//! Thermocast - live temperature readings over Server-Sent Events.
//!
//! POST readings to `/ingest`, watch them arrive on `/events`.

use clap::Parser;
use thermocast::config::Config;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("thermocast=info,tower_http=info")),
        )
        .init();

    let config = Config::parse();

    // Ctrl+C flips the watch; the server drains open streams and exits
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    })?;

    println!("🌡  Thermocast on http://{}", config.bind_addr());
    println!("   • POST /ingest  - Submit a reading ({} mode)", config.mode);
    println!("   • GET  /events  - Live readings (SSE)");
    println!("   • GET  /health  - Server status");

    thermocast::server::run(config, async move {
        let _ = shutdown_rx.wait_for(|stop| *stop).await;
    })
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}
