use std::{
    fs,
    path::{Path, PathBuf},
};

use super::ContainerConfig;
use crate::definition::RawDefinition;
use crate::errors::ConfigError;

/// Configuration loader responsible for locating and parsing config files
pub struct ConfigLoader {
    base_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader resolving relative paths against the working directory
    pub fn new() -> Self {
        Self { base_path: None }
    }

    /// Create a config loader with custom base path (for testing)
    pub fn with_base_path(base_path: PathBuf) -> Self {
        Self {
            base_path: Some(base_path),
        }
    }

    /// Load the container configuration; definition and output paths are
    /// resolved relative to the config file's directory
    pub fn load(&self, path: &str) -> Result<ContainerConfig, ConfigError> {
        let config_path = self.resolve_path(path);
        let content = read_file(&config_path)?;
        let mut config: ContainerConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::TomlParse(display(&config_path), e))?;

        let base_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.container.definitions = config
            .container
            .definitions
            .iter()
            .map(|definition| relative_to(&base_dir, definition))
            .collect();
        config.container.compiled_output = config
            .container
            .compiled_output
            .as_ref()
            .map(|output| relative_to(&base_dir, output));

        tracing::debug!(
            path = %config_path.display(),
            definitions = config.container.definitions.len(),
            "container configuration loaded"
        );
        Ok(config)
    }

    /// Resolve a path with tilde expansion and base path override
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        match &self.base_path {
            // For testing: use custom base path
            Some(base_path) => base_path.join(path.trim_start_matches("~/")),
            None => PathBuf::from(shellexpand::tilde(path).as_ref()),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a definitions file: a table of `id -> definition mapping`, in file order.
/// The format follows the file extension (`.toml` or `.json`).
pub fn load_definitions(path: impl AsRef<Path>) -> Result<Vec<(String, RawDefinition)>, ConfigError> {
    let path = path.as_ref();
    let content = read_file(path)?;

    let document: serde_json::Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => {
            let table: toml::Table =
                toml::from_str(&content).map_err(|e| ConfigError::TomlParse(display(path), e))?;
            serde_json::to_value(table)
                .map_err(|e| ConfigError::JsonParse(display(path), e))?
        }
        Some("json") => {
            serde_json::from_str(&content).map_err(|e| ConfigError::JsonParse(display(path), e))?
        }
        _ => return Err(ConfigError::UnsupportedFormat(display(path))),
    };

    let serde_json::Value::Object(entries) = document else {
        return Err(ConfigError::NotATable(display(path)));
    };

    Ok(entries
        .into_iter()
        .map(|(id, definition)| (id, RawDefinition::Data(definition)))
        .collect())
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|e| ConfigError::FileRead(display(path), e))
}

fn relative_to(base_dir: &Path, path: &Path) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
    if expanded.is_absolute() {
        expanded
    } else {
        base_dir.join(expanded)
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
