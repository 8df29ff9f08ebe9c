use std::str::FromStr;

use tracing::info;

use crate::errors::EngineError;
use crate::logging::{init_logging, LoggingConfig};
use crate::models::{SortBy, WeightBy};

/// Tunables for index generation, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Value the index starts at when a request doesn't name one
    pub starting_balance: f64,
    /// How many candidates to request from the market-data provider
    pub candidate_limit: usize,
    /// How many assets an index holds when a request doesn't say
    pub default_count: usize,
    pub history_days: i64,
    pub sort_by: SortBy,
    pub weight_by: WeightBy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_balance: 1.0,
            candidate_limit: 100,
            default_count: 10,
            history_days: 365,
            sort_by: SortBy::default(),
            weight_by: WeightBy::default(),
        }
    }
}

impl EngineConfig {
    /// Loads `.env` if present, then reads the environment.
    pub fn load() -> Result<Self, EngineError> {
        dotenvy::dotenv().ok();
        let config = Self::from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, EngineError> {
        let defaults = Self::default();
        Ok(Self {
            starting_balance: env_or("INDEX_STARTING_BALANCE", defaults.starting_balance)?,
            candidate_limit: env_or("INDEX_CANDIDATE_LIMIT", defaults.candidate_limit)?,
            default_count: env_or("INDEX_ASSET_COUNT", defaults.default_count)?,
            history_days: env_or("INDEX_HISTORY_DAYS", defaults.history_days)?,
            sort_by: env_or("INDEX_SORT_BY", defaults.sort_by)?,
            weight_by: env_or("INDEX_WEIGHT_BY", defaults.weight_by)?,
        })
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.starting_balance.is_finite() && self.starting_balance > 0.0) {
            return Err(EngineError::Config(format!(
                "INDEX_STARTING_BALANCE must be positive, got {}",
                self.starting_balance
            )));
        }
        if self.default_count == 0 || self.candidate_limit == 0 {
            return Err(EngineError::Config(
                "INDEX_ASSET_COUNT and INDEX_CANDIDATE_LIMIT must be at least 1".to_string(),
            ));
        }
        if self.default_count > self.candidate_limit {
            return Err(EngineError::Config(format!(
                "INDEX_ASSET_COUNT ({}) exceeds INDEX_CANDIDATE_LIMIT ({})",
                self.default_count, self.candidate_limit
            )));
        }
        if self.history_days <= 0 {
            return Err(EngineError::Config(
                "INDEX_HISTORY_DAYS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Start-up for a host process: load `.env`, install logging, then read and
/// validate the engine config.
pub fn bootstrap() -> Result<EngineConfig, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_logging(LoggingConfig::from_env())?;

    let config = EngineConfig::load()?;
    info!(
        "⚙️ Index engine ready: {} candidates, {} assets, {} days, {} x {}",
        config.candidate_limit,
        config.default_count,
        config.history_days,
        config.sort_by,
        config.weight_by
    );
    Ok(config)
}

fn env_or<T>(key: &str, default: T) -> Result<T, EngineError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| EngineError::Config(format!("{}: {}", key, e))),
        Err(_) => Ok(default),
    }
}
