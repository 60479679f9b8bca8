//! Configuration loading and output folder resolution
//!
//! Settings come from four tiers, highest priority first:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! A missing config file at the default location is not an error: the tools
//! log a warning and continue with compiled defaults. A config file named
//! explicitly on the command line must exist.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the output folder
pub const OUTPUT_DIR_ENV: &str = "CONGRESS_OUTPUT_DIR";

/// Environment variable carrying the Congress.gov API key
pub const API_KEY_ENV: &str = "CONGRESS_API_KEY";

/// Application directory name under the platform config dir
const APP_DIR: &str = "congress-ingest";

/// TOML configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder for snapshots and checkpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Congress.gov API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Fetch tuning section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Minimum spacing between upstream requests
    pub rate_limit_ms: u64,
    /// Attempts per request before giving up
    pub max_retries: u32,
    /// Concurrent detail requests per partition
    pub workers: usize,
    /// Congresses covered by a full run
    pub congresses: Vec<u32>,
    /// Inclusive date window, `YYYY-MM-DD`
    pub start_date: String,
    pub end_date: String,
    /// Write an in-progress snapshot after this many records within a partition
    pub snapshot_every: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            rate_limit_ms: 750,
            max_retries: 3,
            workers: 4,
            congresses: vec![116, 117, 118, 119],
            start_date: "2020-01-01".to_string(),
            end_date: "2026-12-31".to_string(),
            snapshot_every: 25,
        }
    }
}

impl FetchConfig {
    /// Check internal consistency (dates parse, window non-empty, counts > 0)
    pub fn validate(&self) -> Result<()> {
        let start = crate::time::parse_iso_date(&self.start_date).ok_or_else(|| {
            Error::Config(format!("Invalid start_date: {}", self.start_date))
        })?;
        let end = crate::time::parse_iso_date(&self.end_date)
            .ok_or_else(|| Error::Config(format!("Invalid end_date: {}", self.end_date)))?;
        if start > end {
            return Err(Error::Config(format!(
                "start_date {} is after end_date {}",
                self.start_date, self.end_date
            )));
        }
        if self.max_retries == 0 {
            return Err(Error::Config("max_retries must be at least 1".to_string()));
        }
        if self.workers == 0 {
            return Err(Error::Config("workers must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Default config file location (`~/.config/congress-ingest/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Load the TOML config.
///
/// With `explicit = Some(path)` the file must exist and parse. Without it the
/// default location is tried and a missing file yields defaults.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(p) => {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p.to_path_buf()
        }
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            Some(p) => {
                debug!("No config file at {}, using defaults", p.display());
                return Ok(TomlConfig::default());
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
    config.fetch.validate()?;

    debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Resolve the output folder: CLI → `CONGRESS_OUTPUT_DIR` → TOML → current dir
pub fn resolve_output_dir(cli_arg: Option<&Path>, toml: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(OUTPUT_DIR_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml.output_dir {
        return path.clone();
    }

    PathBuf::from(".")
}

/// Whether an API key looks usable (non-empty after trimming)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Write the config file atomically.
///
/// On Unix the file is restricted to 0600 since it may carry an API key.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

    crate::fs::write_atomic(path, content.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_defaults_validate() {
        let fetch = FetchConfig::default();
        assert_eq!(fetch.rate_limit_ms, 750);
        assert_eq!(fetch.congresses, vec![116, 117, 118, 119]);
        assert!(fetch.validate().is_ok());
    }

    #[test]
    fn test_fetch_rejects_inverted_window() {
        let fetch = FetchConfig {
            start_date: "2026-01-01".to_string(),
            end_date: "2020-01-01".to_string(),
            ..Default::default()
        };
        assert!(matches!(fetch.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            api_key = "abc"

            [fetch]
            workers = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.fetch.workers, 2);
        assert_eq!(config.fetch.max_retries, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc123"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }
}
