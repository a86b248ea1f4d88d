//! Configuration Loader
//!
//! Layers built-in defaults, an optional TOML file and `PRIMESCAN_*`
//! environment variables into a validated [`PrimeScanConfig`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::error::{ConfigResult, ConfigurationError};
use super::PrimeScanConfig;
use crate::constants::ENV_PREFIX;

#[derive(Debug)]
pub struct ConfigManager {
    config: PrimeScanConfig,
    environment: String,
    config_file: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration, reading `config_file` when given.
    pub fn load(config_file: Option<&Path>) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_with_env(config_file, &Self::detect_environment())
    }

    /// Load configuration with an explicit environment name, without
    /// consulting `PRIMESCAN_ENV`.
    pub fn load_with_env(
        config_file: Option<&Path>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = config_file {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .ignore_empty(true),
        );

        let source_name = config_file
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "environment".to_string());
        let config: PrimeScanConfig = builder
            .build()
            .map_err(|e| ConfigurationError::load_error(source_name, e))?
            .try_deserialize()
            .map_err(ConfigurationError::deserialize_error)?;

        config.validate()?;

        info!(
            environment = %environment,
            worker_count = config.worker_count,
            batch_size = config.batch_size,
            confidence = config.confidence,
            checkpoint_path = %config.checkpoint_path.display(),
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_file: config_file.map(Path::to_path_buf),
        }))
    }

    /// Wrap an already built configuration, validating it.
    pub fn from_config(config: PrimeScanConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            environment: Self::detect_environment(),
            config_file: None,
        }))
    }

    pub fn config(&self) -> &PrimeScanConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Current environment from `PRIMESCAN_ENV`, defaulting to development.
    pub fn detect_environment() -> String {
        std::env::var(format!("{ENV_PREFIX}_ENV")).unwrap_or_else(|_| "development".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "worker_count = 3").unwrap();
        writeln!(file, "batch_size = 250").unwrap();
        writeln!(file, "checkpoint_path = \"out/primes.csv\"").unwrap();

        let manager = ConfigManager::load_with_env(Some(file.path()), "test").unwrap();
        let config = manager.config();
        assert_eq!(config.worker_count, 3);
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.confidence, 20);
        assert_eq!(config.checkpoint_path, PathBuf::from("out/primes.csv"));
        assert_eq!(manager.environment(), "test");
        assert_eq!(manager.config_file(), Some(file.path()));
    }

    #[test]
    fn test_invalid_file_values_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "worker_count = 0").unwrap();

        let err = ConfigManager::load_with_env(Some(file.path()), "test").unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err =
            ConfigManager::load_with_env(Some(Path::new("/nonexistent/primescan.toml")), "test")
                .unwrap_err();
        assert!(matches!(err, ConfigurationError::LoadError { .. }));
    }

    #[test]
    fn test_from_config_validates() {
        assert!(ConfigManager::from_config(PrimeScanConfig::default()).is_ok());
        let bad = PrimeScanConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(ConfigManager::from_config(bad).is_err());
    }
}
