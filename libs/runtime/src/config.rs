use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main application configuration with strongly-typed global sections
/// and a flexible per-module configuration bag.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Core application configuration.
    pub app: AppSection,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
    /// Per-module configuration bag: module_name → arbitrary JSON/YAML value.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppSection {
    /// Will be normalized to an absolute path; empty means the platform
    /// default (`$HOME/.feedscope`).
    pub home_dir: String,
    /// Grace period for background tasks on shutdown.
    #[serde(default = "default_stop_timeout_sec")]
    pub stop_timeout_sec: u64,
}

fn default_stop_timeout_sec() -> u64 {
    5
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            stop_timeout_sec: default_stop_timeout_sec(),
        }
    }
}

/// Logging configuration - maps subsystem names to their logging settings.
/// Key "default" is the catch-all for logs that don't match explicit subsystems.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String, // "info", "debug", "error", "off"
    #[serde(default)]
    pub file: String, // "logs/feedscope.log"; empty disables the file
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_size_mb: Option<u64>, // Max size of the file in MB
}

/// Create a default logging configuration.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/feedscope.log".to_string(),
            file_level: "debug".to_string(),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            logging: Some(default_logging_config()),
            modules: HashMap::new(),
        }
    }
}

/// Typed extraction failure for a module's config bag entry.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config for module '{module}': {source}")]
    Invalid {
        module: String,
        #[source]
        source: serde_json::Error,
    },
}

impl AppConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment variables.
    /// Also normalizes `app.home_dir` into an absolute path and creates the directory.
    pub fn load_layered(config_path: Option<&Path>) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        // Start from a minimal base where optional sections are None, so they
        // remain None unless explicitly provided by YAML/ENV.
        let base = AppConfig {
            app: AppSection::default(),
            logging: None,
            modules: HashMap::new(),
        };

        let mut figment = Figment::new().merge(Serialized::defaults(base));
        if let Some(path) = config_path {
            figment = figment.merge(Yaml::file(path));
        }
        // Example: FEEDSCOPE__APP__STOP_TIMEOUT_SEC=10 maps to app.stop_timeout_sec
        let figment = figment.merge(Env::prefixed("FEEDSCOPE__").split("__"));

        let mut config: AppConfig = figment
            .extract()
            .with_context(|| "Failed to extract config from figment".to_string())?;

        normalize_home_dir_inplace(&mut config.app).context("Failed to resolve app.home_dir")?;

        Ok(config)
    }

    /// Absolute home directory; valid after `load_layered`.
    pub fn home_dir(&self) -> PathBuf {
        PathBuf::from(&self.app.home_dir)
    }

    /// Decode one module's entry from the config bag; absent means defaults.
    pub fn module_config<T>(&self, module_name: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default,
    {
        match self.modules.get(module_name) {
            Some(value) => {
                serde_json::from_value(value.clone()).map_err(|source| ConfigError::Invalid {
                    module: module_name.to_string(),
                    source,
                })
            }
            None => Ok(T::default()),
        }
    }
}

/// Resolve `app.home_dir` into an absolute path and create it.
fn normalize_home_dir_inplace(app: &mut AppSection) -> Result<()> {
    let dir = if app.home_dir.trim().is_empty() {
        default_home_dir()?
    } else {
        let p = PathBuf::from(&app.home_dir);
        if p.is_relative() {
            std::env::current_dir()?.join(p)
        } else {
            p
        }
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create home dir {}", dir.display()))?;
    app.home_dir = dir.to_string_lossy().into_owned();
    Ok(())
}

fn default_home_dir() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(home.join(".feedscope"))
}
