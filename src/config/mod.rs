pub mod loader;

use serde::Deserialize;
use std::path::PathBuf;

use crate::logging::{LogFormat, LoggingConfig};

pub use loader::{load_definitions, ConfigLoader};

// Configuration file name looked up next to the working directory
pub const CONFIG_FILE_NAME: &str = "ioc-wire.toml";

/// Container configuration file
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ContainerConfig {
    pub container: ContainerSection,
    pub logging: LoggingSection,
}

/// `[container]` section
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ContainerSection {
    /// Definition files (TOML or JSON), loaded in order; later entries replace earlier ones
    pub definitions: Vec<PathBuf>,
    /// Where `compile_container` writes the generated source
    pub compiled_output: Option<PathBuf>,
    /// Return lazy proxies for definitions marked `lazy`
    pub lazy_proxies: bool,
}

/// `[logging]` section
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
    /// Colored output for the pretty and compact formats
    pub ansi: bool,
    pub show_target: bool,
    pub show_thread_ids: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            ansi: true,
            show_target: true,
            show_thread_ids: false,
        }
    }
}

impl LoggingSection {
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig::default()
            .with_level_name(&self.level)
            .with_format(self.format)
            .with_ansi(self.ansi)
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids)
    }
}
