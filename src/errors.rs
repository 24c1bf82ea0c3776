use thiserror::Error;

use crate::value::BoxError;

/// Errors raised while registering, resolving or compiling container entries.
///
/// Wrapping variants keep the cause as `source()` and also append it to their
/// message, so a single `to_string()` shows the whole causal chain.
#[derive(Debug, Error)]
pub enum ContainerError {
    // --- configuration ---
    #[error("{0}")]
    Configuration(String),
    #[error("Identifier of entry should not be empty string")]
    EmptyIdentifier,

    // --- lookup ---
    #[error("Requested a non-existent container entry `{0}`")]
    NotFound(String),

    // --- resolution ---
    #[error("Please provide definition for argument `{parameter}`")]
    UnresolvableParameter { parameter: String, target: String },
    #[error("{target} accepts {expected} arguments, but {given} were defined")]
    RedundantArguments {
        target: String,
        expected: usize,
        given: usize,
    },
    #[error("Definition `{id}` has non-existent method `{class}::{method}`")]
    UndefinedMethod {
        id: String,
        class: String,
        method: String,
    },
    #[error("Definition `{id}` has private method `{class}::{method}`")]
    PrivateMethod {
        id: String,
        class: String,
        method: String,
    },
    #[error("Definition of entry `{0}` has empty class name")]
    EmptyClassName(String),
    #[error("Definition of entry `{id}` refers to unknown class `{class}`")]
    UnknownClass { id: String, class: String },
    #[error("Unable to resolve argument `{parameter}`: {source}")]
    Argument {
        parameter: String,
        #[source]
        source: Box<ContainerError>,
    },
    #[error("Unable to invoke arguments to {target}: {source}")]
    Invocation {
        target: String,
        #[source]
        source: Box<ContainerError>,
    },
    #[error("{target} failed: {source}")]
    Callback {
        target: String,
        #[source]
        source: BoxError,
    },

    // --- top level, one per failing entry ---
    #[error("Unable to create instance of entry `{id}`: {source}")]
    Creation {
        id: String,
        #[source]
        source: Box<ContainerError>,
    },
    #[error("Unable to compile definition `{id}`: {source}")]
    Compilation {
        id: String,
        #[source]
        source: Box<ContainerError>,
    },
    #[error("{0} is not statically referenceable")]
    NotCompilable(String),

    // --- misc ---
    #[error("Type cast failed: expected {expected}, got {actual}")]
    TypeCastFailed { expected: String, actual: String },
    #[error("Container has already been dropped")]
    ContainerDropped,
    #[error("I/O error while {0}: {1}")]
    Io(String, #[source] std::io::Error),
}

impl ContainerError {
    pub fn configuration(message: impl Into<String>) -> Self {
        ContainerError::Configuration(message.into())
    }

    pub fn callback(target: impl Into<String>, source: BoxError) -> Self {
        ContainerError::Callback {
            target: target.into(),
            source,
        }
    }

    /// True when the requested entry simply is not registered, as opposed to
    /// being registered but broken.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContainerError::NotFound(_))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ContainerError::Configuration(_) | ContainerError::EmptyIdentifier
        )
    }

    /// Innermost container error of a wrapped chain.
    pub fn root_cause(&self) -> &ContainerError {
        match self {
            ContainerError::Argument { source, .. }
            | ContainerError::Invocation { source, .. }
            | ContainerError::Creation { source, .. }
            | ContainerError::Compilation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ContainerError>;

/// Errors raised while loading configuration and definition files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Failed to parse JSON from file '{0}': {1}")]
    JsonParse(String, #[source] serde_json::Error),
    #[error("Definitions file '{0}' must contain a table of entries")]
    NotATable(String),
    #[error("Unsupported definitions format for file '{0}'")]
    UnsupportedFormat(String),
}
