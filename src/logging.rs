use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::errors::EngineError;

/// Filter used when `RUST_LOG` is unset: engine logs at info, everything
/// else at warn.
pub const DEFAULT_LOG_FILTER: &str = "warn,portfolio_index=info";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            loki_enabled: std::env::var("LOKI_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            loki_url: std::env::var("LOKI_URL").ok(),
            service_name: std::env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "portfolio-index".to_string()),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.loki_enabled && self.loki_url.is_none() {
            return Err(EngineError::Config(
                "LOKI_ENABLED is true but LOKI_URL is not set".to_string(),
            ));
        }
        tracing_subscriber::EnvFilter::try_new(&self.log_level)
            .map_err(|e| EngineError::Config(format!("RUST_LOG '{}': {}", self.log_level, e)))?;
        Ok(())
    }
}

/// Installs the global subscriber. Called once by
/// [`bootstrap`](crate::config::bootstrap); needs a tokio runtime when Loki
/// shipping is enabled.
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    #[cfg(feature = "loki")]
    {
        if config.loki_enabled {
            if let Some(loki_url) = config.loki_url.clone() {
                return init_with_loki(config, &loki_url);
            }
        }
    }

    init_console_only(config)
}

fn init_console_only(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    tracing::info!("📊 Console logging initialized for {}", config.service_name);
    Ok(())
}

#[cfg(feature = "loki")]
fn init_with_loki(config: LoggingConfig, loki_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let url = url::Url::parse(loki_url)?;

    let (loki_layer, task) = tracing_loki::builder()
        .label("service", &config.service_name)?
        .label("environment", &config.environment)?
        .build_url(url)?;

    // Ships buffered log lines to Loki in the background
    tokio::spawn(task);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .with(loki_layer)
        .try_init()?;

    tracing::info!("✅ Loki logging initialized at {}", loki_url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(loki_enabled: bool, loki_url: Option<&str>) -> LoggingConfig {
        LoggingConfig {
            loki_enabled,
            loki_url: loki_url.map(str::to_string),
            service_name: "portfolio-index".to_string(),
            environment: "test".to_string(),
            log_level: "debug".to_string(),
        }
    }

    #[test]
    fn test_validate_rejects_loki_without_url() {
        assert!(config(true, None).validate().is_err());
    }

    #[test]
    fn test_validate_accepts_console_only() {
        assert!(config(false, None).validate().is_ok());
        assert!(config(true, Some("http://localhost:3100")).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_malformed_filter() {
        let mut bad = config(false, None);
        bad.log_level = "portfolio_index=[".to_string();
        assert!(matches!(bad.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_init_logging_rejects_invalid_config() {
        assert!(init_logging(config(true, None)).is_err());
    }
}
