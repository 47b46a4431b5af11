use serde::Deserialize;

use crate::domain::chunking::ChunkingConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub chunking: ChunkingConfig,
    /// Required only by commands that read stored items
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/knowledge".to_string(),
            max_connections: 5,
            connect_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Database settings, or a configuration error naming the missing keys
    pub fn database(&self) -> Result<&DatabaseConfig, crate::domain::DomainError> {
        self.database.as_ref().ok_or_else(|| {
            crate::domain::DomainError::configuration(
                "database settings are required (set APP__DATABASE__URL)",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.chunking.min_clean_chars, 80);
        assert!(config.database.is_none());
        assert!(config.database().is_err());
    }

    #[test]
    fn test_partial_sources_fill_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("logging.format", "json")
            .unwrap()
            .set_override("chunking.min_clean_chars", 120)
            .unwrap()
            .set_override("database.url", "postgres://db/knowledge")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.chunking.min_clean_chars, 120);
        assert_eq!(config.chunking.min_clean_tokens_est, 20);

        let database = config.database().unwrap();
        assert_eq!(database.url, "postgres://db/knowledge");
        assert_eq!(database.max_connections, 5);
    }
}
