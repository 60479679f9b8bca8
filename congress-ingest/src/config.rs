//! Configuration resolution for congress-ingest
//!
//! Builds one [`IngestConfig`] at startup from CLI → ENV → TOML → defaults
//! and passes it down to the fetch sources. Nothing reads configuration
//! after this point.

use crate::utils::RetryPolicy;
use crate::workflow::FetchOptions;
use congress_common::config::{
    is_valid_key, load_toml_config, resolve_output_dir, write_toml_config, FetchConfig,
    TomlConfig, API_KEY_ENV,
};
use congress_common::time::{millis_to_duration, parse_iso_date};
use congress_common::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Shared low-rate key accepted by api.congress.gov
pub const DEMO_KEY: &str = "DEMO_KEY";

/// Resolve the Congress.gov API key
///
/// **Priority:** ENV → TOML → `DEMO_KEY`
pub fn resolve_api_key(toml_config: &TomlConfig) -> String {
    let env_key = std::env::var(API_KEY_ENV)
        .ok()
        .filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .api_key
        .as_ref()
        .filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "API key found in both {} and the config file. Using the environment (highest priority).",
            API_KEY_ENV
        );
    }

    if let Some(key) = env_key {
        info!("API key loaded from environment variable");
        return key.trim().to_string();
    }

    if let Some(key) = toml_key {
        info!("API key loaded from TOML config");
        return key.trim().to_string();
    }

    warn!(
        "No API key configured; falling back to {} (heavily rate limited). Set {} or api_key in the config file.",
        DEMO_KEY, API_KEY_ENV
    );
    DEMO_KEY.to_string()
}

/// Store an API key in the config file at `path`.
///
/// Other settings already in the file are kept; a missing file is created
/// with defaults.
pub fn save_api_key(key: &str, path: &Path) -> Result<()> {
    if !is_valid_key(key) {
        return Err(Error::InvalidInput("API key is empty".to_string()));
    }

    let mut config = if path.exists() {
        load_toml_config(Some(path))?
    } else {
        TomlConfig::default()
    };
    config.api_key = Some(key.trim().to_string());

    write_toml_config(&config, path)?;
    info!(path = %path.display(), "API key saved to config file");
    Ok(())
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    pub api_key: String,
    pub output_dir: PathBuf,
    pub fetch: FetchConfig,
}

impl IngestConfig {
    pub fn resolve(cli_output_dir: Option<&Path>, toml_config: &TomlConfig) -> Self {
        Self {
            api_key: resolve_api_key(toml_config),
            output_dir: resolve_output_dir(cli_output_dir, toml_config),
            fetch: toml_config.fetch.clone(),
        }
    }

    pub fn request_spacing(&self) -> Duration {
        millis_to_duration(self.fetch.rate_limit_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default().with_max_attempts(self.fetch.max_retries)
    }

    /// An explicit path is used as given; otherwise `default_name` inside the
    /// output folder
    pub fn output_path(&self, explicit: Option<&Path>, default_name: &str) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => self.output_dir.join(default_name),
        }
    }

    /// Source options for a fetch. `congress` narrows the run to one congress.
    pub fn fetch_options(
        &self,
        congress: Option<u32>,
        fast: bool,
        sample: Option<usize>,
    ) -> Result<FetchOptions> {
        self.fetch.validate()?;
        let start = parse_iso_date(&self.fetch.start_date).ok_or_else(|| {
            Error::Config(format!("Invalid start_date: {}", self.fetch.start_date))
        })?;
        let end = parse_iso_date(&self.fetch.end_date)
            .ok_or_else(|| Error::Config(format!("Invalid end_date: {}", self.fetch.end_date)))?;

        let congresses = match congress {
            Some(c) => vec![c],
            None => self.fetch.congresses.clone(),
        };

        let mut options = FetchOptions::new(congresses, start, end);
        options.fast = fast;
        options.sample = sample;
        options.workers = self.fetch.workers;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_key_beats_toml() {
        std::env::set_var(API_KEY_ENV, "env-key");
        let toml = TomlConfig {
            api_key: Some("toml-key".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&toml), "env-key");
        std::env::remove_var(API_KEY_ENV);
    }

    #[test]
    #[serial]
    fn test_blank_keys_fall_back_to_demo() {
        std::env::set_var(API_KEY_ENV, "   ");
        let toml = TomlConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&toml), DEMO_KEY);
        std::env::remove_var(API_KEY_ENV);
    }

    #[test]
    #[serial]
    fn test_toml_key_used_without_env() {
        std::env::remove_var(API_KEY_ENV);
        let toml = TomlConfig {
            api_key: Some("toml-key".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&toml), "toml-key");
    }

    #[test]
    #[serial]
    fn test_fetch_options_single_congress() {
        let config = IngestConfig::resolve(Some(Path::new("/tmp/out")), &TomlConfig::default());
        let options = config.fetch_options(Some(118), true, Some(3)).unwrap();

        assert_eq!(options.congresses, vec![118]);
        assert!(options.fast);
        assert_eq!(options.sample, Some(3));
        assert_eq!(
            config.output_path(None, "x.yaml"),
            PathBuf::from("/tmp/out/x.yaml")
        );
        assert_eq!(config.retry_policy().max_attempts, 3);
    }

    #[test]
    #[serial]
    fn test_saved_key_is_loaded_back() {
        std::env::remove_var(API_KEY_ENV);
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[fetch]\nworkers = 8\n").unwrap();

        save_api_key("  saved-key ", &path).unwrap();

        let toml = load_toml_config(Some(&path)).unwrap();
        assert_eq!(resolve_api_key(&toml), "saved-key");
        assert_eq!(toml.fetch.workers, 8);
    }

    #[test]
    fn test_blank_key_is_not_saved() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        assert!(matches!(
            save_api_key("   ", &path),
            Err(Error::InvalidInput(_))
        ));
        assert!(!path.exists());
    }
}
