//! This module provides functionality for loading and handling the application's configuration.
//!
//! It defines the `SwapConfig` struct, which holds the configuration parameters,
//! and a `load_config` function to load the configuration from a file.
//!
//! Every field has a default, so a partial (or absent) file is fine.
//!
//! # Examples
//!
//! Loading the configuration from a file:
//!
//! ```no_run
//! use synonym_swap::config::{SwapConfig, load_config};
//!
//! let config_file_path = "/path/to/config.yaml";
//! let config: SwapConfig = load_config(config_file_path).unwrap();
//! println!("{:?}", config);
//! ```

use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use tracing::*;

use crate::error::Result;
use crate::harness::DEFAULT_GRACE_PERIOD;

/// Represents the application's configuration.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct SwapConfig {
    /// Where substituted text and synonym tables are written.
    pub output_path: PathBuf,

    /// Log every substitution and every vocabulary miss.
    pub debug: bool,

    /// Resolve every token instead of only vocabulary words.
    pub resolve_everything: bool,

    /// Seconds to wait for cancelled tasks before giving up on them.
    pub grace_period_secs: u64,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("./out.txt"),
            debug: false,
            resolve_everything: false,
            grace_period_secs: DEFAULT_GRACE_PERIOD.as_secs(),
        }
    }
}

impl SwapConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    /// Whether `simplify` only replaces vocabulary words, once the CLI's
    /// `--all` flag is merged in. When this is true a word list is required.
    pub fn restricts_to_vocabulary(&self, all: bool) -> bool {
        !(all || self.resolve_everything)
    }
}

/// Loads the application's configuration from a YAML file.
///
/// # Errors
/// - [`SwapError::Io`](crate::error::SwapError::Io) if the file cannot be read.
/// - [`SwapError::Config`](crate::error::SwapError::Config) if it is not valid YAML
///   for [`SwapConfig`].
pub fn load_config(file: &str) -> Result<SwapConfig> {
    debug!("Loading config: {:?}", file);
    let content = fs::read_to_string(file)?;
    let config: SwapConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_valid_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
output_path: "/tmp/swapped.txt"
debug: true
resolve_everything: true
grace_period_secs: 5
"#
        )
        .unwrap();

        let config = load_config(temp_file.path().to_str().unwrap());

        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.output_path, PathBuf::from("/tmp/swapped.txt"));
        assert!(config.debug);
        assert!(config.resolve_everything);
        assert_eq!(config.grace_period(), Duration::from_secs(5));
    }

    #[test]
    fn test_load_config_partial_file_uses_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "debug: true").unwrap();

        let config = load_config(temp_file.path().to_str().unwrap()).unwrap();
        assert!(config.debug);
        assert_eq!(config.output_path, PathBuf::from("./out.txt"));
        assert_eq!(config.grace_period_secs, 60);
    }

    #[test]
    fn test_resolve_everything_lifts_vocabulary_requirement() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "resolve_everything: true").unwrap();
        let config = load_config(temp_file.path().to_str().unwrap()).unwrap();
        assert!(!config.restricts_to_vocabulary(false));

        let defaults = SwapConfig::default();
        assert!(defaults.restricts_to_vocabulary(false));
        assert!(!defaults.restricts_to_vocabulary(true));
    }

    #[test]
    fn test_load_config_invalid_file() {
        let config = load_config("non/existent/path");
        assert!(config.is_err());
    }

    #[test]
    fn test_load_config_invalid_format() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"invalid: config: format"#).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap());
        assert!(config.is_err());
    }
}
