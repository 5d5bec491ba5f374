use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

use crate::constants::DEFAULT_GEOCODER_URL;
use crate::error::{Result, ScraperError};

/// Config file read when no explicit path is given and the file exists
pub const DEFAULT_CONFIG_PATH: &str = "shootings_scraper.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub geocoder: GeocoderConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_GEOCODER_URL.to_string(),
            timeout_secs: 10,
            user_agent: format!("shootings_scraper/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: String,
    pub file_name: String,
    /// Filter used when RUST_LOG is unset
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
            file_name: "shootings_scraper.log".to_string(),
            default_filter: "shootings_scraper=info".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the TOML file, then `STS_*` environment overrides.
    ///
    /// An explicit `path` must exist; without one the default file is read
    /// only if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(url) = env_var("STS_GEOCODER_URL")? {
            self.geocoder.base_url = url;
        }
        if let Some(timeout) = env_var("STS_GEOCODER_TIMEOUT_SECS")? {
            self.geocoder.timeout_secs = timeout.parse().map_err(|_| {
                ScraperError::Config(format!("STS_GEOCODER_TIMEOUT_SECS is not a number: {}", timeout))
            })?;
        }
        if let Some(enabled) = env_var("STS_GEOCODER_ENABLED")? {
            self.geocoder.enabled = parse_bool(&enabled).ok_or_else(|| {
                ScraperError::Config(format!("STS_GEOCODER_ENABLED is not a boolean: {}", enabled))
            })?;
        }
        if let Some(dir) = env_var("STS_LOG_DIR")? {
            self.logging.dir = dir;
        }
        Ok(())
    }
}

/// Unset variables are `None`; non-unicode values are an error
fn env_var(name: &str) -> Result<Option<String>> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ScraperError::Env(e)),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
