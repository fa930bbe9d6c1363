use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use service_core::config::Config as CoreConfig;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct FeesConfig {
    pub common: CoreConfig,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl FeesConfig {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let port = env::var("FEES_SERVICE_PORT")
            .unwrap_or_else(|_| "3006".to_string())
            .parse()?;

        let url = env::var("FEES_DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("FEES_DATABASE_URL must be set"))?;
        let max_connections = env::var("FEES_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?;
        let min_connections = env::var("FEES_DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()?;

        let log_level = env::var("FEES_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let otlp_endpoint = env::var("FEES_OTLP_ENDPOINT").ok();

        Ok(Self {
            common: CoreConfig { port },
            service_name: "fees-service".to_string(),
            log_level,
            otlp_endpoint,
            database: DatabaseConfig {
                url,
                max_connections,
                min_connections,
            },
        })
    }
}
