//! Leda index reconciler.
//!
//! Loads every item from the index, reports items whose status and price
//! disagree, and prints the summary the marketplace front page is built
//! from. Exits with status 1 when any violation is found.

use leda_marketplace::http::HttpItemService;
use leda_marketplace::selection::Cost;
use leda_marketplace::services::ItemService;
use leda_marketplace::store::actions;
use leda_marketplace::{Config, Store};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Leda reconciler");

    let config = Config::load("leda").unwrap_or_else(|e| {
        warn!(error = %e, "Falling back to default configuration");
        Config::default()
    });
    info!(index = %config.index_url, "Configuration loaded");

    let index = HttpItemService::new(&config)?;
    let mut store = Store::new(&config);

    let items = actions::find_all(&mut store, &index).await?;
    info!(count = items.len(), "Items loaded");

    let violations: Vec<_> = items
        .iter()
        .filter_map(|item| item.check_invariant().err())
        .collect();
    for violation in &violations {
        warn!(error = %violation, "Status invariant violated");
    }

    info!(
        cheapest = ?store.costed_item(Cost::Cheapest),
        most_expensive = ?store.costed_item(Cost::Expensive),
        "Price extremes"
    );
    for item in store.newest() {
        info!(item_id = %item.item_id, name = %item.name, status = ?item.status, "Newest");
    }

    let history = index.find_all_history().await?;
    info!(entries = history.len(), "History loaded");

    if !violations.is_empty() {
        warn!(count = violations.len(), "Reconciliation found violations");
        std::process::exit(1);
    }

    info!("Index is consistent");
    Ok(())
}
