use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use bandbook::config::AppConfig;
use bandbook::db;
use bandbook::state::AppState;
use bandbook::store::storage::SqliteStorage;
use bandbook::store::BookingStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    let storage = SqliteStorage::new(Arc::new(Mutex::new(conn)));
    let store = BookingStore::new(Box::new(storage));

    let state = Arc::new(AppState {
        store,
        config: config.clone(),
    });

    let app = bandbook::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
