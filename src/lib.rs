pub mod api;
pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

pub use error::{CoreError, ErrorKind};
pub use logic::{QueryEngine, ResourceRegistry};

// Export all model types
pub use model::*;

// Export store types
pub use store::{PostgresStore, RecordStore};
#[cfg(any(test, feature = "test-support"))]
pub use store::MemoryStore;

use std::sync::Arc;

/// Assemble the application router around `store`.
pub fn build_app<S: RecordStore + 'static>(config: &config::AppConfig, store: Arc<S>) -> anyhow::Result<axum::Router> {
    let registry = ResourceRegistry::new(&config.pagination, &config.database.schema)?;
    let prefix = config.api_prefix();
    let engine = Arc::new(QueryEngine::new(registry, store, &config.pagination, prefix.clone()));

    Ok(routes::create_router(&prefix).with_state(engine))
}

/// Load configuration, connect to PostgreSQL and serve until shutdown.
pub async fn run_server(config: config::AppConfig) -> anyhow::Result<()> {
    use axum::serve;
    use tokio::net::TcpListener;

    let database_url = config.database_url();
    let store = PostgresStore::new(&database_url, config.database.max_connections.unwrap_or(20)).await?;
    let app = build_app(&config, Arc::new(store))?;

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("Rear Differential API listening on http://{}{}", bind_address, config.api_prefix());

    serve(listener, app).await?;

    Ok(())
}
