//! Configuration loading using Figment
//!
//! Configuration is layered:
//! 1. built-in defaults (localhost:3040, 5 s connect, 30 s I/O, 2048-byte reads)
//! 2. a TOML file, `skyx.toml` by default
//! 3. environment variables prefixed with `SKYX_`, nested with `__`
//!    (e.g. `SKYX_CONNECTION__HOST=observatory.local`)
//!
//! # Example
//! ```no_run
//! use skyx_remote::config::SkyxConfig;
//!
//! let config = SkyxConfig::load()?;
//! let conn = config.connection.build()?;
//! println!("TheSkyX at {}", conn.endpoint());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use skyx_core::transport::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_HOST, DEFAULT_IO_TIMEOUT_MS, DEFAULT_MAX_RESPONSE_BYTES,
    DEFAULT_PORT,
};
use skyx_core::{AppResult, Endpoint, SkyxConnection, SkyxError, TransportSettings};
use std::path::Path;
use std::time::Duration;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "skyx.toml";

/// Smallest accepted reply read bound
pub const MIN_RESPONSE_BYTES: usize = 64;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkyxConfig {
    /// TheSkyX server endpoint and transport limits
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Endpoint and transport limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Host running TheSkyX
    #[serde(default = "default_host")]
    pub host: String,
    /// TheSkyX TCP server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Connect timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Write/read timeout in milliseconds
    #[serde(default = "default_io_timeout")]
    pub io_timeout_ms: u64,
    /// Bound for the single reply read
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format (pretty, compact, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_io_timeout() -> u64 {
    DEFAULT_IO_TIMEOUT_MS
}

fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout(),
            io_timeout_ms: default_io_timeout(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ConnectionConfig {
    /// Endpoint described by this configuration
    pub fn endpoint(&self) -> AppResult<Endpoint> {
        Endpoint::new(self.host.clone(), self.port)
    }

    /// Timeouts and read bound described by this configuration
    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings::default()
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms))
            .with_io_timeout(Duration::from_millis(self.io_timeout_ms))
            .with_max_response_bytes(self.max_response_bytes)
    }

    /// Build a connection handle from this configuration
    pub fn build(&self) -> AppResult<SkyxConnection> {
        Ok(SkyxConnection::with_settings(
            self.endpoint()?,
            self.transport_settings(),
        ))
    }
}

impl SkyxConfig {
    /// Load configuration from `skyx.toml` and environment variables
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file path
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, figment::Error> {
        Self::figment(path).extract()
    }

    /// The provider stack used by [`load_from`](Self::load_from)
    pub fn figment<P: AsRef<Path>>(path: P) -> Figment {
        Figment::from(Serialized::defaults(SkyxConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("SKYX_").split("__"))
    }

    /// Render as TOML, in the layout accepted by [`load_from`](Self::load_from)
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> AppResult<()> {
        self.connection.endpoint()?;

        if self.connection.connect_timeout_ms == 0 || self.connection.io_timeout_ms == 0 {
            return Err(SkyxError::InvalidConfiguration(
                "timeouts must be greater than zero".into(),
            ));
        }

        if self.connection.max_response_bytes < MIN_RESPONSE_BYTES {
            return Err(SkyxError::InvalidConfiguration(format!(
                "max_response_bytes {} is below the minimum of {}",
                self.connection.max_response_bytes, MIN_RESPONSE_BYTES
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(SkyxError::InvalidConfiguration(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            )));
        }

        let valid_formats = ["pretty", "compact", "json"];
        if !valid_formats.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(SkyxError::InvalidConfiguration(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_formats.join(", ")
            )));
        }

        Ok(())
    }
}
