//! Activity Indexer Main Entry Point
//!
//! Pages every subscribed event stream of the configured contracts, enriches
//! the transactions and prints the user's activity timeline as JSON.

use activity_indexer::{Dependencies, IndexerConfig, IndexingError};
use dotenv::dotenv;
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), IndexingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("activity_indexer=info,activity_indexer_pipeline=info")
    });

    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| IndexingError::Tracing(e.to_string()))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .pretty(),
            )
            .try_init()
            .map_err(|e| IndexingError::Tracing(e.to_string()))?;
    }

    info!(
        service_name = "activity-indexer",
        service_version = env!("CARGO_PKG_VERSION"),
        json,
        "Tracing initialized"
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    info!("Starting Activity Indexer");

    let config = IndexerConfig::from_env().inspect_err(|e| error!(error = %e, "Invalid configuration"))?;
    let mut deps = Dependencies::new(&config).inspect_err(|e| error!(error = %e, "Failed to initialize dependencies"))?;

    let engine = &mut deps.engine;
    for _ in 0..deps.max_pages {
        if !engine.has_more() {
            break;
        }
        engine.on_load_more().await;
    }

    let snapshot = engine.snapshot();
    if let Some(message) = &snapshot.error {
        warn!(error = %message, "Timeline is incomplete");
    }
    info!(
        activities = snapshot.activities.len(),
        days = snapshot.grouped_activities.len(),
        has_more = snapshot.pagination.has_more,
        "Timeline computed"
    );

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
