//! Configuration management for bundlerpack
//!
//! Settings are loaded from environment variables with sensible defaults.
//!
//! # Environment Variables
//!
//! - `BUNDLERPACK_LOG_LEVEL`: Logging level - default: "info"
//! - `BUNDLERPACK_LOG_JSON`: Emit diagnostics as JSON (true|false) - default: "false"
//! - `BUNDLERPACK_DEFAULT_VERSION`: Version installed when nothing requests one - default: "*"
//! - `BUNDLERPACK_VERSION_TABLE`: YAML file mapping `MAJOR.MINOR` to full versions,
//!   replacing the built-in table - default: unset
//! - `BUNDLERPACK_LAYERS_DIR`: Directory layers are created in - default: system temp dir +
//!   "bundlerpack-layers"
//!
//! # Example
//!
//! ```no_run
//! use bundlerpack::BundlerpackConfig;
//!
//! let config = BundlerpackConfig::default();
//! config.validate().expect("Invalid configuration");
//!
//! let shimmer = config.shimmer().expect("Unreadable version table");
//! assert_eq!(shimmer.shim("2.1.4").unwrap(), "2.1.4");
//! ```

use crate::shim::{VersionShimmer, VersionTable};
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_JSON: bool = false;
const DEFAULT_VERSION: &str = "*";
const DEFAULT_LAYERS_DIR_NAME: &str = "bundlerpack-layers";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to load version table: {0:#}")]
    VersionTable(anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlerpackConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit diagnostics as JSON
    pub log_json: bool,

    /// Version installed when no plan entry names one
    pub default_version: String,

    /// Replacement short-form table
    pub version_table: Option<PathBuf>,

    /// Directory layers are created in
    pub layers_dir: PathBuf,
}

impl Default for BundlerpackConfig {
    /// Loads from `BUNDLERPACK_*` environment variables, falling back to defaults
    fn default() -> Self {
        let log_level = env::var("BUNDLERPACK_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let log_json = env::var("BUNDLERPACK_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(DEFAULT_LOG_JSON);

        let default_version = env::var("BUNDLERPACK_DEFAULT_VERSION")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());

        let version_table = env::var("BUNDLERPACK_VERSION_TABLE")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let layers_dir = env::var("BUNDLERPACK_LAYERS_DIR")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join(DEFAULT_LAYERS_DIR_NAME));

        Self {
            log_level,
            log_json,
            default_version,
            version_table,
            layers_dir,
        }
    }
}

impl BundlerpackConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` for an unknown log level or a
    /// default version the configured shimmer cannot shim, and
    /// `ConfigError::VersionTable` when the table file cannot be loaded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        if let Err(e) = self.shimmer()?.shim(&self.default_version) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid default version: {}",
                e
            )));
        }

        Ok(())
    }

    /// Builds a shimmer over the configured table, or the built-in one
    pub fn shimmer(&self) -> Result<VersionShimmer, ConfigError> {
        let table = match &self.version_table {
            Some(path) => VersionTable::from_file(path).map_err(ConfigError::VersionTable)?,
            None => VersionTable::default(),
        };
        Ok(VersionShimmer::new(table))
    }
}

impl fmt::Display for BundlerpackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bundlerpack Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Log JSON: {}", self.log_json)?;
        writeln!(f, "  Default Version: {}", self.default_version)?;
        match &self.version_table {
            Some(path) => writeln!(f, "  Version Table: {}", path.display())?,
            None => writeln!(f, "  Version Table: built-in")?,
        }
        writeln!(f, "  Layers Dir: {}", self.layers_dir.display())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn config() -> BundlerpackConfig {
        BundlerpackConfig {
            log_level: "info".to_string(),
            log_json: false,
            default_version: "*".to_string(),
            version_table: None,
            layers_dir: PathBuf::from("/layers"),
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = vec![
            EnvGuard::unset("BUNDLERPACK_LOG_LEVEL"),
            EnvGuard::unset("BUNDLERPACK_LOG_JSON"),
            EnvGuard::unset("BUNDLERPACK_DEFAULT_VERSION"),
            EnvGuard::unset("BUNDLERPACK_VERSION_TABLE"),
            EnvGuard::unset("BUNDLERPACK_LAYERS_DIR"),
        ];

        let config = BundlerpackConfig::default();

        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(!config.log_json);
        assert_eq!(config.default_version, DEFAULT_VERSION);
        assert_eq!(config.version_table, None);
        assert!(config.layers_dir.ends_with(DEFAULT_LAYERS_DIR_NAME));
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("BUNDLERPACK_LOG_LEVEL", "DEBUG"),
            EnvGuard::set("BUNDLERPACK_LOG_JSON", "true"),
            EnvGuard::set("BUNDLERPACK_DEFAULT_VERSION", "2.1"),
            EnvGuard::set("BUNDLERPACK_VERSION_TABLE", "/etc/bundler-versions.yml"),
            EnvGuard::set("BUNDLERPACK_LAYERS_DIR", "/layers/bundlerpack"),
        ];

        let config = BundlerpackConfig::default();

        assert_eq!(config.log_level, "debug");
        assert!(config.log_json);
        assert_eq!(config.default_version, "2.1");
        assert_eq!(
            config.version_table,
            Some(PathBuf::from("/etc/bundler-versions.yml"))
        );
        assert_eq!(config.layers_dir, PathBuf::from("/layers/bundlerpack"));
    }

    #[test]
    fn test_configuration_validation_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_configuration_validation_invalid_log_level() {
        let mut config = config();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_configuration_validation_invalid_default_version() {
        let mut config = config();
        config.default_version = "latest".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_configuration_validation_default_missing_from_table() {
        let mut config = config();
        config.default_version = "9.9".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed(_)));
        assert!(err.to_string().contains("9.9"));

        config.default_version = "2.1".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_configuration_validation_uses_custom_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("versions.yml");
        fs::write(&path, "\"2.6\": 2.6.2\n").unwrap();

        let mut config = config();
        config.version_table = Some(path);
        config.default_version = "2.6".to_string();
        assert!(config.validate().is_ok());

        config.default_version = "2.1".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shimmer_uses_builtin_table() {
        let shimmer = config().shimmer().unwrap();
        assert_eq!(shimmer.shim("2.1").unwrap(), "2.1.4");
    }

    #[test]
    fn test_shimmer_loads_table_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("versions.yml");
        fs::write(&path, "\"2.6\": 2.6.2\n").unwrap();

        let mut config = config();
        config.version_table = Some(path);

        let shimmer = config.shimmer().unwrap();
        assert_eq!(shimmer.shim("2.6").unwrap(), "2.6.2");
        assert!(shimmer.shim("2.1").is_err());
    }

    #[test]
    fn test_shimmer_missing_table_file() {
        let mut config = config();
        config.version_table = Some(PathBuf::from("/nonexistent/versions.yml"));

        let err = config.shimmer().unwrap_err();
        assert!(matches!(err, ConfigError::VersionTable(_)));
        assert!(err.to_string().contains("/nonexistent/versions.yml"));
    }

    #[test]
    fn test_config_display() {
        let display = format!("{}", config());
        assert!(display.contains("Bundlerpack Configuration:"));
        assert!(display.contains("Version Table: built-in"));
    }
}
