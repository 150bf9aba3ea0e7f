//! Ambient platform layer for the feedscope apps: layered configuration
//! (defaults → YAML → environment) and tracing initialization.

pub mod config;
pub mod logging;

pub use config::{
    default_logging_config, AppConfig, AppSection, ConfigError, LoggingConfig, Section,
};
pub use logging::{apply_verbosity, init_logging_from_config};
