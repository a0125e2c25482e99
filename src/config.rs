use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::core::DEFAULT_MATCH_THRESHOLD;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub catalog: CatalogSettings,
    pub scorer: ScorerSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// PostgreSQL URL, or `memory` for the in-process store
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

impl DatabaseSettings {
    pub fn is_memory(&self) -> bool {
        self.url.eq_ignore_ascii_case("memory")
    }
}

/// External listing store and profile source
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    #[serde(default = "default_catalog_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_catalog_timeout_secs() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct ScorerSettings {
    pub url: String,
    #[serde(default = "default_scorer_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_scorer_timeout_ms() -> u64 { 3000 }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Interval of the pending-swipe sweep; no sweep runs when unset
    pub reconcile_interval_secs: Option<u64>,
    #[serde(default = "default_reconcile_batch_size")]
    pub reconcile_batch_size: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            reconcile_interval_secs: None,
            reconcile_batch_size: default_reconcile_batch_size(),
        }
    }
}

fn default_threshold() -> f64 { DEFAULT_MATCH_THRESHOLD }
fn default_reconcile_batch_size() -> usize { 50 }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SWIPE_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SWIPE__SERVER__PORT -> server.port
            .add_source(prefixed_env())
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(prefixed_env())
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }
}

impl LoggingSettings {
    pub fn is_pretty(&self) -> bool {
        self.format.eq_ignore_ascii_case("pretty")
    }
}

fn prefixed_env() -> Environment {
    Environment::with_prefix("SWIPE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Conventional variables that win over the prefixed ones
///
/// `DATABASE_URL` is the name sqlx tooling expects; `SWIPE_JWT_SECRET` keeps
/// the secret out of config files. `LOG_LEVEL` and `LOG_FORMAT` override the
/// `[logging]` table.
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    const OVERRIDES: [(&str, &str); 4] = [
        ("DATABASE_URL", "database.url"),
        ("SWIPE_JWT_SECRET", "auth.jwt_secret"),
        ("LOG_LEVEL", "logging.level"),
        ("LOG_FORMAT", "logging.format"),
    ];

    let mut builder = Config::builder().add_source(settings);

    for (var, key) in OVERRIDES {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
