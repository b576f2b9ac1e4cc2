//! Pool settings applied to every tenant pool. Loaded from `DB_POOL_*` env vars or built in code.

use crate::error::{AppError, ConfigError};
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PoolSettings {
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub min_connections: u32,
    /// Unset keeps the pooling library's own default.
    #[serde(default)]
    pub acquire_timeout_secs: Option<u64>,
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,
    /// Open one connection when a manager is created instead of on first query.
    #[serde(default)]
    pub eager_connect: bool,
}

fn default_max_connections() -> u32 {
    10
}

impl Default for PoolSettings {
    fn default() -> Self {
        PoolSettings {
            max_connections: default_max_connections(),
            min_connections: 0,
            acquire_timeout_secs: None,
            idle_timeout_secs: None,
            eager_connect: false,
        }
    }
}

impl PoolSettings {
    /// Read `DB_POOL_MAX_CONNECTIONS`, `DB_POOL_MIN_CONNECTIONS`, `DB_POOL_ACQUIRE_TIMEOUT_SECS`,
    /// `DB_POOL_IDLE_TIMEOUT_SECS` and `DB_POOL_EAGER_CONNECT`. Loads `.env` first when present.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let settings: PoolSettings = envy::prefixed("DB_POOL_")
            .from_iter(vars)
            .map_err(|e| ConfigError::Env(format!("pool settings: {}", e)))?;
        Ok(settings)
    }

    pub(crate) fn pool_options(&self) -> PgPoolOptions {
        let mut opts = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections);
        if let Some(secs) = self.acquire_timeout_secs {
            opts = opts.acquire_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.idle_timeout_secs {
            opts = opts.idle_timeout(Duration::from_secs(secs));
        }
        opts
    }
}
