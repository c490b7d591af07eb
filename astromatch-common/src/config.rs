//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from a small TOML file. Every field has a
//! built-in default so a missing file never prevents startup. Secrets may be
//! supplied through environment variables instead of the file.
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `ASTROMATCH_ROOT_FOLDER` environment variable
//! 3. TOML `root_folder` key
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fmt;
use std::time::Duration;

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "ASTROMATCH_ROOT_FOLDER";

/// Upstream compatibility service (reports, PDFs, sinks, access checks)
pub const DEFAULT_API_BASE: &str = "https://web-production-37fb.up.railway.app/api/compatibility";

/// Nominatim-compatible geocoding service
pub const DEFAULT_GEOCODING_BASE: &str = "https://nominatim.openstreetmap.org";

/// Stripe REST API
pub const DEFAULT_STRIPE_BASE: &str = "https://api.stripe.com";

/// Local database file name inside the root folder
pub const DATABASE_FILE: &str = "astromatch.db";

/// Bootstrap configuration loaded from TOML file
///
/// These settings cannot change during runtime. The service must restart
/// to pick up changes to the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Address the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Root folder holding the local database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Base URL of the upstream compatibility API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// API key sent as `X-API-Key` to protected upstream routes
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the geocoding service
    #[serde(default = "default_geocoding_base")]
    pub geocoding_base: String,

    /// Base URL of the payment provider API
    #[serde(default = "default_stripe_base")]
    pub stripe_base: String,

    /// Payment provider secret key
    #[serde(default)]
    pub stripe_secret_key: Option<String>,

    /// Fixed price identifier; when absent an inline price is used
    #[serde(default)]
    pub stripe_price_id: Option<String>,

    /// Public origin used to build checkout return URLs
    #[serde(default = "default_public_origin")]
    pub public_origin: String,

    /// Timeout applied to every upstream HTTP call, in seconds
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_port() -> u16 {
    5730
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_geocoding_base() -> String {
    DEFAULT_GEOCODING_BASE.to_string()
}

fn default_stripe_base() -> String {
    DEFAULT_STRIPE_BASE.to_string()
}

fn default_public_origin() -> String {
    format!("http://127.0.0.1:{}", default_port())
}

fn default_upstream_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            root_folder: None,
            api_base: default_api_base(),
            api_key: None,
            geocoding_base: default_geocoding_base(),
            stripe_base: default_stripe_base(),
            stripe_secret_key: None,
            stripe_price_id: None,
            public_origin: default_public_origin(),
            upstream_timeout_secs: default_upstream_timeout_secs(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Where a loaded configuration came from
///
/// Loading runs before logging is set up, so callers report it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => f.write_str("built-in defaults"),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration
    ///
    /// An explicit path must exist and parse. Without one, the platform
    /// config file is used when present; otherwise built-in defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Cannot read {}: {}", path.display(), e))
            })?;
            let config = Self::from_toml_str(&content)?;
            return Ok((config, ConfigSource::File(path.to_path_buf())));
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)?;
                let config = Self::from_toml_str(&content)?;
                Ok((config, ConfigSource::File(path)))
            }
            _ => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    /// Apply secret overrides from the environment
    ///
    /// `STRIPE_SECRET_KEY`, `STRIPE_PRICE_ID` and `ASTROMATCH_API_KEY` win
    /// over values from the file when set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Some(value) = non_empty_env("STRIPE_SECRET_KEY") {
            self.stripe_secret_key = Some(value);
        }
        if let Some(value) = non_empty_env("STRIPE_PRICE_ID") {
            self.stripe_price_id = Some(value);
        }
        if let Some(value) = non_empty_env("ASTROMATCH_API_KEY") {
            self.api_key = Some(value);
        }
    }

    /// Timeout for upstream HTTP calls
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs.max(1))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve the root folder following the documented priority order
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Some(path) = non_empty_env(ROOT_FOLDER_ENV) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Path of the local database inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Platform config file location (`<config_dir>/astromatch/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("astromatch").join("config.toml"))
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("astromatch"))
        .unwrap_or_else(|| PathBuf::from("./astromatch_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_keys_missing() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.port, 5730);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.upstream_timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
        assert!(config.stripe_secret_key.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            port = 8080
            stripe_price_id = "price_123"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.stripe_price_id.as_deref(), Some("price_123"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.geocoding_base, DEFAULT_GEOCODING_BASE);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_timeout_never_zero() {
        let config = TomlConfig {
            upstream_timeout_secs: 0,
            ..TomlConfig::default()
        };
        assert_eq!(config.upstream_timeout(), Duration::from_secs(1));
    }
}
