use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

pub const CONFIG_DIRECTORY_NAME: &str = "sypha";
pub const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_DISCOVERY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Applies to model discovery only; chat requests have no client-side
    /// timeout.
    #[serde(default = "default_discovery_timeout_secs")]
    pub discovery_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            discovery_timeout_secs: default_discovery_timeout_secs(),
        }
    }
}

impl AppConfig {
    pub fn normalized(mut self) -> Self {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if self.base_url.is_empty() {
            self.base_url = default_base_url();
        }
        if self.discovery_timeout_secs == 0 {
            self.discovery_timeout_secs = default_discovery_timeout_secs();
        }
        self
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_discovery_timeout_secs() -> u64 {
    DEFAULT_DISCOVERY_TIMEOUT_SECS
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("failed to create config directory {path}"))]
    CreateConfigDirectory {
        stage: &'static str,
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("failed to write config file {path}"))]
    WriteConfigFile {
        stage: &'static str,
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize config"))]
    SerializeConfig {
        stage: &'static str,
        source: serde_json::Error,
    },
}

/// Lock-free shared configuration with disk persistence.
pub struct ConfigStore {
    config: Arc<ArcSwap<AppConfig>>,
    config_path: PathBuf,
}

impl ConfigStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(CONFIG_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".sypha"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(CONFIG_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let config = Self::load_from_disk(&config_path);
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    /// Reads config, layering the file (when present) over defaults.
    /// A missing or malformed file degrades to defaults with a warning.
    fn load_from_disk(config_path: &PathBuf) -> AppConfig {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Json::file(config_path));

        match figment.extract::<AppConfig>() {
            Ok(config) => config.normalized(),
            Err(error) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %error,
                    "failed to load config; using defaults"
                );
                AppConfig::default()
            }
        }
    }

    pub fn config(&self) -> Arc<AppConfig> {
        self.config.load_full()
    }

    pub fn update(&self, config: AppConfig) {
        self.config.store(Arc::new(config.normalized()));
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let config = self.config();

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context(CreateConfigDirectorySnafu {
                stage: "save-config",
                path: parent.display().to_string(),
            })?;
        }

        let payload = serde_json::to_string_pretty(config.as_ref())
            .context(SerializeConfigSnafu { stage: "save-config" })?;
        std::fs::write(&self.config_path, payload).context(WriteConfigFileSnafu {
            stage: "save-config",
            path: self.config_path.display().to_string(),
        })
    }
}
