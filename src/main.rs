use env_logger::Builder;
use log::LevelFilter;
use rear_diff::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    let level = config.logging.level.parse().unwrap_or(LevelFilter::Info);
    Builder::new()
        .filter_level(level)
        .filter_module("sqlx", LevelFilter::Warn) // Suppress sqlx Debug logs
        .init();

    log::info!(
        "Configuration loaded: server={}:{}, schema={}",
        config.server.host,
        config.server.port,
        config.database.schema
    );

    rear_diff::run_server(config).await
}
