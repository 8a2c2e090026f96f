//! Dashboard configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `SMSWATCH_`-prefixed environment variables. CLI flags are applied
//! on top by the binary.

use std::path::Path;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

/// Default gateway endpoint when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:7777/smsgateway";

/// Theme selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Pick dark or light from the terminal background.
    #[default]
    Auto,
    Dark,
    Light,
}

/// Resolved dashboard settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Gateway base endpoint.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Skip TLS verification (self-signed gateway certificates).
    pub accept_invalid_certs: bool,
    /// Optional pre-established session cookie, e.g. "session_id=...".
    pub session_cookie: Option<String>,
    /// Theme selection.
    pub theme: ThemeMode,
}

impl Settings {
    /// Load settings from defaults, an optional file, and the environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("endpoint", DEFAULT_ENDPOINT)?
            .set_default("timeout_secs", 10_i64)?
            .set_default("accept_invalid_certs", false)?
            .set_default("theme", "auto")?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(Environment::with_prefix("SMSWATCH").try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 10,
            accept_invalid_certs: false,
            session_cookie: None,
            theme: ThemeMode::Auto,
        }
    }
}
