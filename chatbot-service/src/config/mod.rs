use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Service settings, read from the environment by [`ChatbotConfig::load`].
#[derive(Debug, Clone)]
pub struct ChatbotConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub log_level: String,
    /// OTLP collector for span export; logs only when unset.
    pub otlp_endpoint: Option<String>,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl StoreConfig {
    /// Mongo connection settings, if both the URL and database name are present.
    pub fn mongo_settings(&self) -> Option<(&str, &str)> {
        match (&self.url, &self.database) {
            (Some(url), Some(database)) => Some((url.as_str(), database.as_str())),
            _ => None,
        }
    }
}

impl ChatbotConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;
        let is_prod = environment == Environment::Prod;

        let backend: StoreBackend = get_env("STORE_BACKEND", Some("mongo"), false)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        // Outside prod a missing database leaves the store unconfigured;
        // the endpoints report that instead of refusing to start.
        let mongo_required = is_prod && backend == StoreBackend::Mongo;

        Ok(ChatbotConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("chatbot-service"), false)?,
            log_level: get_env("LOG_LEVEL", Some("info"), false)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            store: StoreConfig {
                backend,
                url: get_optional_env("DATABASE_URL", mongo_required)?,
                database: get_optional_env("DATABASE_NAME", mongo_required)?,
            },
        })
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Dev),
            "prod" | "production" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

fn get_optional_env(key: &str, required: bool) -> Result<Option<String>, AppError> {
    match env::var(key) {
        Ok(val) if !val.is_empty() => Ok(Some(val)),
        _ if required => Err(AppError::ConfigError(anyhow::anyhow!(format!(
            "{} is required in production but not set",
            key
        )))),
        _ => Ok(None),
    }
}
