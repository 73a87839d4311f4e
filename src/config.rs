use serde::{Deserialize, Serialize};

/// Process configuration, loaded once at startup and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub pagination: PaginationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub connection_string: Option<String>,
    pub max_connections: Option<u32>,
    /// Schema holding the training, media and prediction tables
    pub schema: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Path prefix for every route and for pagination links
    pub prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_limit: i64,
    pub max_limit: i64,
    pub media_max_limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            api: ApiConfig::default(),
            pagination: PaginationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            max_connections: Some(20),
            schema: "atp".to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: "/rear-diff".to_string(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 100,
            max_limit: 100,
            media_max_limit: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional `config` file and
    /// `REAR_DIFF_*` environment variables, in that order of precedence.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        config = config.add_source(config::File::with_name("config").required(false));

        config = config.add_source(
            config::Environment::with_prefix("REAR_DIFF")
                .separator("__")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// Database URL from config, `DATABASE_URL`, or the `PGSQL_*` variables.
    pub fn database_url(&self) -> String {
        if let Some(connection_string) = &self.database.connection_string {
            return connection_string.clone();
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            return url;
        }

        let var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.to_string());
        format!(
            "postgres://{}:{}@{}:{}/{}",
            urlencoding::encode(&var("PGSQL_USER", "postgres")),
            urlencoding::encode(&var("PGSQL_PASSWORD", "")),
            var("PGSQL_HOST", "localhost"),
            var("PGSQL_PORT", "5432"),
            var("PGSQL_NAME", "postgres"),
        )
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Route prefix without a trailing slash; empty when serving at the root.
    pub fn api_prefix(&self) -> String {
        self.api.prefix.trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_deployed_service() {
        let config = AppConfig::default();
        assert_eq!(config.server_address(), "0.0.0.0:8000");
        assert_eq!(config.database.schema, "atp");
        assert_eq!(config.pagination.default_limit, 100);
        assert_eq!(config.pagination.media_max_limit, 1000);
        assert_eq!(config.api_prefix(), "/rear-diff");
    }

    #[test]
    fn explicit_connection_string_wins() {
        let mut config = AppConfig::default();
        config.database.connection_string = Some("postgres://u:p@db:5432/atp".to_string());
        assert_eq!(config.database_url(), "postgres://u:p@db:5432/atp");
    }

    #[test]
    fn trailing_slash_is_dropped_from_prefix() {
        let mut config = AppConfig::default();
        config.api.prefix = "/api/".to_string();
        assert_eq!(config.api_prefix(), "/api");
        config.api.prefix = "/".to_string();
        assert_eq!(config.api_prefix(), "");
    }
}
