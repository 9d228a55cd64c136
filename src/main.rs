//! GrowAthlete binary entry point

use growathlete::{AppState, config};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber from `[logging]`
fn init_tracing(logging: &config::LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter_directive()));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}

/// Application entry point
///
/// # Setup
/// 1. Load configuration from file and environment
/// 2. Initialize tracing and metrics
/// 3. Initialize AppState (database, admin bootstrap, reconcile)
/// 4. Serve the router until the process is stopped
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // No subscriber exists yet, so a bad config is reported by the returned error
    let config = config::AppConfig::load()?;

    init_tracing(&config.logging);
    growathlete::metrics::init_metrics();
    tracing::info!("Starting GrowAthlete...");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(
        %addr,
        database = %config.database.path.display(),
        exact_counts = config.graph.exact_counts,
        log_level = %config.logging.level,
        "Configuration loaded"
    );

    let state = AppState::new(config).await?;
    let app = growathlete::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
