// src/core/config_manager.rs
//! Unified configuration: profile file plus environment overrides

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::environment::EnvironmentConfig;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: EnvironmentConfig,
    pub service: ServiceConfig,
}

/// Settings for talking to the directory backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub api_base_url: String,
    pub timeout: Option<Duration>,
}

impl ConfigManager {
    /// Load all configurations
    pub fn load() -> Result<Self> {
        let environment = EnvironmentConfig::load()?;
        Self::from_environment(environment, |key| std::env::var(key).ok())
    }

    /// Apply `TAPESTRY_*` overrides on top of a loaded profile.
    pub fn from_environment<F>(mut environment: EnvironmentConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TAPESTRY_API_URL") {
            environment.api_base_url = url;
        }
        if let Some(port) = lookup("TAPESTRY_PORT") {
            environment.port = port
                .parse::<u16>()
                .with_context(|| format!("TAPESTRY_PORT must be a valid port number: {}", port))?;
        }
        if let Some(path) = lookup("TAPESTRY_LOG_PATH") {
            environment.log_path = PathBuf::from(path);
        }

        let service = ServiceConfig {
            api_base_url: environment.api_base_url.clone(),
            timeout: environment.request_timeout_seconds.map(Duration::from_secs),
        };

        Ok(Self {
            environment,
            service,
        })
    }

    pub fn port(&self) -> u16 {
        self.environment.port
    }

    pub fn log_path(&self) -> &PathBuf {
        &self.environment.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_loading_emits_no_events() {
        // main installs the subscriber from the loaded config; events before that are lost
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let dir = tempfile::tempdir().unwrap();

        tracing::subscriber::with_default(subscriber, || {
            let environment =
                EnvironmentConfig::load_from_file(&dir.path().join("missing.yaml"), "local")
                    .unwrap();
            ConfigManager::from_environment(
                environment,
                lookup(&[("TAPESTRY_API_URL", "https://directory.example")]),
            )
            .unwrap();
        });

        assert!(captured.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = ConfigManager::from_environment(EnvironmentConfig::default(), lookup(&[]))
            .unwrap();
        assert_eq!(config.service.api_base_url, "http://127.0.0.1:5000");
        assert_eq!(config.service.timeout, None);
        assert_eq!(config.port(), 8010);
    }

    #[test]
    fn test_env_overrides() {
        let environment = EnvironmentConfig {
            request_timeout_seconds: Some(15),
            ..EnvironmentConfig::default()
        };
        let config = ConfigManager::from_environment(
            environment,
            lookup(&[
                ("TAPESTRY_API_URL", "https://directory.example"),
                ("TAPESTRY_PORT", "9090"),
                ("TAPESTRY_LOG_PATH", "/tmp/other.log"),
            ]),
        )
        .unwrap();

        assert_eq!(config.service.api_base_url, "https://directory.example");
        assert_eq!(config.service.timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.port(), 9090);
        assert_eq!(config.log_path(), &PathBuf::from("/tmp/other.log"));
    }

    #[test]
    fn test_invalid_port() {
        let err = ConfigManager::from_environment(
            EnvironmentConfig::default(),
            lookup(&[("TAPESTRY_PORT", "eighty")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("TAPESTRY_PORT"));
    }
}
