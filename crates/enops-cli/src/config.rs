//! Optional `enops.toml` configuration.
//!
//! Every field has a default, so an empty file (or no file) is valid.
//! Command-line flags override what is set here.

use anyhow::{anyhow, Context, Result};
use enops_auth::AuthMode;
use enops_core::schema::DEFAULT_REGION;
use enops_forecast::{DEFAULT_INPUT, DEFAULT_OUTPUT_DIR};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "enops.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EnopsConfig {
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastConfig {
    #[serde(default = "default_input")]
    pub input: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_region")]
    pub default_region: String,
    /// Fixed seed for every run; unset means a fresh seed each time.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_max_input_age_days")]
    pub max_input_age_days: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output_dir: default_output_dir(),
            default_region: default_region(),
            seed: None,
            max_input_age_days: default_max_input_age_days(),
        }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from(DEFAULT_INPUT)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_max_input_age_days() -> u64 {
    7
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Also append log lines to this file
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

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,
}

impl EnopsConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("parsing enops config")
    }

    pub fn log_level(&self) -> Result<tracing::Level> {
        self.logging
            .level
            .parse()
            .map_err(|_| anyhow!("invalid log level '{}' in config", self.logging.level))
    }
}

/// Load `explicit` if given (it must exist), else `./enops.toml` if present,
/// else the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<EnopsConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !fallback.is_file() {
                return Ok(EnopsConfig::default());
            }
            fallback
        }
    };
    let text =
        fs::read_to_string(&path).with_context(|| format!("reading config {}", path.display()))?;
    EnopsConfig::from_toml(&text).with_context(|| format!("in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EnopsConfig::from_toml("").unwrap();
        assert_eq!(config, EnopsConfig::default());
        assert_eq!(config.forecast.input, PathBuf::from("fact_energy_market.parquet"));
        assert_eq!(config.forecast.output_dir, PathBuf::from("data"));
        assert_eq!(config.auth.mode, AuthMode::Demo);
        assert_eq!(config.log_level().unwrap(), tracing::Level::INFO);
    }

    #[test]
    fn test_partial_sections() {
        let config = EnopsConfig::from_toml(
            r#"
[forecast]
output_dir = "reports"
seed = 42

[logging]
level = "debug"
file = "enops.log"

[auth]
mode = "oauth"
"#,
        )
        .unwrap();
        assert_eq!(config.forecast.output_dir, PathBuf::from("reports"));
        assert_eq!(config.forecast.seed, Some(42));
        assert_eq!(config.forecast.default_region, "NSW1");
        assert_eq!(config.logging.file, Some(PathBuf::from("enops.log")));
        assert_eq!(config.log_level().unwrap(), tracing::Level::DEBUG);
        assert_eq!(config.auth.mode, AuthMode::OAuth);
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        assert!(load_config(Some(Path::new("/no/such/enops.toml"))).is_err());
    }

    #[test]
    fn test_bad_log_level() {
        let config = EnopsConfig::from_toml("[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(config.log_level().is_err());
    }
}
