use crate::{ConsoleError, Result, log_debug, log_warn, navigation::MenuOption};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const API_URL_ENV: &str = "VIRT_CONSOLE_API_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Root the `/v1/...` endpoints hang off
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout; unset means requests wait for the server indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub start_view: MenuOption,
    #[serde(default = "default_true")]
    pub show_event_log: bool,
    #[serde(default = "default_max_recorded_errors")]
    pub max_recorded_errors: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            start_view: MenuOption::default(),
            show_event_log: true,
            max_recorded_errors: default_max_recorded_errors(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_recorded_errors() -> usize {
    32
}

impl ConsoleConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_str(&contents)
    }

    pub fn from_str(contents: &str) -> Result<Self> {
        let config: ConsoleConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("virt-console").join("config.toml"))
    }

    /// An explicit path must exist. Without one, the per-user config file is
    /// read when present and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => {
                log_debug!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            Some(path) => {
                log_debug!("No configuration at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => {
                log_warn!("Could not resolve a config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn with_api_override(mut self, base_url: Option<String>) -> Result<Self> {
        if let Some(base_url) = base_url {
            self.api.base_url = base_url;
            self.validate()?;
        }
        Ok(self)
    }

    /// Applies `VIRT_CONSOLE_API_URL` when set.
    pub fn with_env_override(self) -> Result<Self> {
        let from_env = std::env::var(API_URL_ENV).ok().filter(|v| !v.trim().is_empty());
        self.with_api_override(from_env)
    }

    fn validate(&self) -> Result<()> {
        let base = self.api.base_url.trim();
        if base.is_empty() {
            return Err(ConsoleError::ConfigError("api.base_url is empty".to_string()));
        }
        url::Url::parse(base).map_err(|err| {
            ConsoleError::ConfigError(format!("api.base_url '{}' is not a URL: {}", base, err))
        })?;
        if self.ui.max_recorded_errors == 0 {
            return Err(ConsoleError::InvalidConfig);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parsing() {
        let toml_str = r#"
[api]
base_url = "http://virt.lab:9000"
timeout_secs = 15

[ui]
start_view = "virtual_machines"
show_event_log = false
"#;

        let config = ConsoleConfig::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "http://virt.lab:9000");
        assert_eq!(config.api.timeout_secs, Some(15));
        assert_eq!(config.ui.start_view, MenuOption::VirtualMachines);
        assert!(!config.ui.show_event_log);
        assert_eq!(config.ui.max_recorded_errors, 32);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = ConsoleConfig::from_str("").unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.api.timeout_secs, None);
        assert_eq!(config.ui.start_view, MenuOption::Overview);
        assert!(config.ui.show_event_log);
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = ConsoleConfig::from_str("[api]\nbase_url = \"not a url\"\n").unwrap_err();
        assert!(matches!(err, ConsoleError::ConfigError(_)));
    }

    #[test]
    fn api_override_replaces_base_url() {
        let config = ConsoleConfig::default()
            .with_api_override(Some("https://api.internal".to_string()))
            .unwrap();
        assert_eq!(config.api.base_url, "https://api.internal");

        let untouched = ConsoleConfig::default().with_api_override(None).unwrap();
        assert_eq!(untouched.api.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ConsoleConfig::default();
        config.api.timeout_secs = Some(5);
        config.ui.start_view = MenuOption::Images;
        config.save_to_file(&path).unwrap();

        let loaded = ConsoleConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.api.timeout_secs, Some(5));
        assert_eq!(loaded.ui.start_view, MenuOption::Images);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            ConsoleConfig::load(Some(&missing)),
            Err(ConsoleError::IoError(_))
        ));
    }
}
