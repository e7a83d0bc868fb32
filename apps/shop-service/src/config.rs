//! Shop service configuration module.
//!
//! Configuration is layered, later sources overriding earlier ones:
//!
//! ```text
//! built-in defaults
//!      │
//!      ▼
//! TOML file   ($COINSHOP_CONFIG, or ./coinshop.toml if present)
//!      │
//!      ▼
//! environment (COINSHOP__AUTH__JWT_SECRET=..., COINSHOP__LOG__ENV=prod, ...)
//! ```

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Environment, File};
use serde::{Deserialize, Serialize};

use coinshop_core::validation::validate_starting_balance;
use coinshop_core::{Catalog, Coins, ValidationError};
use coinshop_db::DbConfig;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "COINSHOP_CONFIG";

/// Default secret for local development.
/// In production this MUST be overridden.
const DEV_JWT_SECRET: &str = "coinshop-dev-secret-change-in-production";

/// Shop service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub log: LogConfig,

    /// Item → price table replacing the default catalog.
    #[serde(default)]
    pub catalog: Option<BTreeMap<String, i64>>,
}

/// Ledger store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite database file
    pub path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// How long a writer waits for the database lock
    pub busy_timeout_ms: u64,
}

/// Identity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// HS256 signing secret
    pub jwt_secret: String,

    /// Token lifetime in seconds
    pub token_ttl_secs: i64,

    /// Coins granted to a newly registered user
    pub starting_balance: i64,

    /// Register unknown usernames on their first login
    pub auto_register: bool,
}

/// Deployment environment, selecting the log format and level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogEnv {
    /// Human-readable text, debug level
    Local,
    /// JSON, debug level
    Dev,
    /// JSON, info level
    Prod,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub env: LogEnv,

    /// Forces JSON on or off regardless of `env`.
    #[serde(default)]
    pub json: Option<bool>,
}

impl LogConfig {
    pub fn use_json(&self) -> bool {
        self.json.unwrap_or(self.env != LogEnv::Local)
    }

    /// Filter used when `RUST_LOG` is not set.
    pub fn default_filter(&self) -> &'static str {
        match self.env {
            LogEnv::Local | LogEnv::Dev => "debug,sqlx=warn",
            LogEnv::Prod => "info,sqlx=warn",
        }
    }
}

impl ShopConfig {
    /// Loads configuration from `$COINSHOP_CONFIG` (or `./coinshop.toml`)
    /// and the environment, then validates it.
    pub fn load() -> Result<Self, ConfigError> {
        let file = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Self::load_from(file.as_deref())
    }

    /// Like [`load`](Self::load) with an explicit file. A given file must
    /// exist; without one, `./coinshop.toml` is read only if present.
    pub fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            // Database defaults
            .set_default("database.path", "coinshop.db")?
            .set_default("database.max_connections", 5)?
            .set_default("database.busy_timeout_ms", 5000)?
            // Auth defaults
            .set_default("auth.jwt_secret", DEV_JWT_SECRET)?
            .set_default("auth.token_ttl_secs", 3600)?
            .set_default("auth.starting_balance", coinshop_core::DEFAULT_STARTING_BALANCE.amount())?
            .set_default("auth.auto_register", true)?
            // Logging defaults
            .set_default("log.env", "local")?;

        builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("coinshop").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("COINSHOP")
                .separator("__")
                .try_parsing(true),
        );

        let config: ShopConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the type system can't.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue("auth.jwt_secret".to_string()));
        }

        if self.auth.token_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue("auth.token_ttl_secs".to_string()));
        }

        validate_starting_balance(Coins::new(self.auth.starting_balance))
            .map_err(|_| ConfigError::InvalidValue("auth.starting_balance".to_string()))?;

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue("database.max_connections".to_string()));
        }

        self.build_catalog()?;
        Ok(())
    }

    /// The configured catalog, or the default one.
    pub fn build_catalog(&self) -> Result<Catalog, ConfigError> {
        match &self.catalog {
            Some(prices) => Ok(Catalog::from_prices(
                prices.iter().map(|(name, price)| (name.clone(), *price)),
            )?),
            None => Ok(Catalog::default()),
        }
    }

    /// Ledger store configuration derived from the `database` section.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database.path.clone())
            .max_connections(self.database.max_connections)
            .busy_timeout(Duration::from_millis(self.database.busy_timeout_ms))
    }

    pub fn starting_balance(&self) -> Coins {
        Coins::new(self.auth.starting_balance)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid catalog: {0}")]
    Catalog(#[from] ValidationError),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
