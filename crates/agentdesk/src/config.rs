use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::errors::ClientResult;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Backend reachable without the front-end proxy. Prompt-tool registration
    /// falls back to it when every proxied endpoint variant fails.
    #[serde(default)]
    pub direct_base_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            direct_base_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ApiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
}

impl Settings {
    /// Defaults layered with `AGENTDESK_*` environment variables.
    pub fn new() -> ClientResult<Self> {
        Self::load(None)
    }

    /// Defaults, then the given file, then `AGENTDESK_*` environment variables.
    pub fn from_file(path: &Path) -> ClientResult<Self> {
        Self::load(Some(path))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }

    fn load(path: Option<&Path>) -> ClientResult<Self> {
        let mut builder = Config::builder()
            .set_default("api.base_url", default_base_url())?
            .set_default("api.request_timeout_secs", default_request_timeout_secs())?
            .set_default("api.connect_timeout_secs", default_connect_timeout_secs())?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("AGENTDESK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        tracing::debug!(base_url = %settings.api.base_url, "loaded settings");
        Ok(settings)
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::io::Write;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("AGENTDESK_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();

        let settings = Settings::new().unwrap();
        assert_eq!(settings.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(settings.api.direct_base_url, None);
        assert_eq!(settings.api.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.api.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("AGENTDESK_API__BASE_URL", "http://localhost:3000");
        env::set_var("AGENTDESK_API__DIRECT_BASE_URL", "http://127.0.0.1:8000");
        env::set_var("AGENTDESK_API__REQUEST_TIMEOUT_SECS", "5");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.api.base_url, "http://localhost:3000");
        assert_eq!(
            settings.api.direct_base_url.as_deref(),
            Some("http://127.0.0.1:8000")
        );
        assert_eq!(settings.api.request_timeout_secs, 5);

        clean_env();
    }

    #[test]
    #[serial]
    fn test_file_then_environment() {
        clean_env();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"http://files.example:9000\"\nconnect_timeout_secs = 2"
        )
        .unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.api.base_url, "http://files.example:9000");
        assert_eq!(settings.api.connect_timeout_secs, 2);
        assert_eq!(settings.api.request_timeout_secs, 30);

        env::set_var("AGENTDESK_API__BASE_URL", "http://env.example");
        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.api.base_url, "http://env.example");

        clean_env();
    }

    #[test]
    #[serial]
    fn test_missing_file_is_an_error() {
        clean_env();
        let result = Settings::from_file(Path::new("/nonexistent/agentdesk.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_with_base_url() {
        let settings = Settings::default().with_base_url("http://other:1");
        assert_eq!(settings.api.base_url, "http://other:1");
    }
}
