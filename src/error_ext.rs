//! Error reporting helpers shared by the library and the CLI
//!
//! - walk the `source()` chain of any error
//! - log an error together with its causes
//! - suggest a fix for the common container failures
//! - render the chain as one line without repeating causes

use tracing::error;

use crate::errors::{ConfigError, ContainerError};

/// Extension trait for error diagnostics
pub trait ErrorChainExt {
    /// Log the error and each of its causes
    fn log_error(&self);

    /// Get error chain for detailed diagnostics, outermost first
    fn error_chain(&self) -> Vec<String>;

    /// Get suggested action for the error
    fn suggested_action(&self) -> Option<String> {
        None
    }

    /// One-line message; causes already spelled out by their parent's message are skipped
    fn summary(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        for message in self.error_chain() {
            if !parts.last().is_some_and(|previous| previous.contains(&message)) {
                parts.push(message);
            }
        }
        parts.join(": ")
    }
}

fn chain_of(err: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut current = err.source();
    while let Some(cause) = current {
        chain.push(cause.to_string());
        current = cause.source();
    }
    chain
}

fn log_chain(chain: &[String]) {
    if let Some((head, causes)) = chain.split_first() {
        error!("Error: {}", head);
        for cause in causes {
            error!("  Caused by: {}", cause);
        }
    }
}

impl ErrorChainExt for ContainerError {
    fn log_error(&self) {
        log_chain(&self.error_chain());
    }

    fn error_chain(&self) -> Vec<String> {
        chain_of(self)
    }

    fn suggested_action(&self) -> Option<String> {
        match self.root_cause() {
            ContainerError::NotFound(id) => {
                Some(format!("Register a definition for `{}` or set an instance", id))
            }
            ContainerError::UnresolvableParameter { parameter, .. } => Some(format!(
                "Provide `{}` in the definition's args, or register an entry for its declared type",
                parameter
            )),
            ContainerError::UnknownClass { class, .. } => {
                Some(format!("Register a class descriptor for `{}`", class))
            }
            ContainerError::NotCompilable(_) => Some(
                "Use named functions (`Factory::named`, `with_path`) for entries that are compiled"
                    .to_string(),
            ),
            other if other.is_configuration() => {
                Some("Check the syntax of the definition".to_string())
            }
            _ => None,
        }
    }
}

impl ErrorChainExt for ConfigError {
    fn log_error(&self) {
        log_chain(&self.error_chain());
    }

    fn error_chain(&self) -> Vec<String> {
        chain_of(self)
    }

    fn suggested_action(&self) -> Option<String> {
        match self {
            ConfigError::FileRead(path, _) => Some(format!("Ensure '{}' exists and is readable", path)),
            ConfigError::UnsupportedFormat(_) => {
                Some("Use a .toml or .json definitions file".to_string())
            }
            _ => None,
        }
    }
}

impl ErrorChainExt for anyhow::Error {
    fn log_error(&self) {
        log_chain(&self.error_chain());
    }

    fn error_chain(&self) -> Vec<String> {
        self.chain().map(|e| e.to_string()).collect()
    }

    fn suggested_action(&self) -> Option<String> {
        self.chain().find_map(|cause| {
            cause
                .downcast_ref::<ContainerError>()
                .and_then(ErrorChainExt::suggested_action)
                .or_else(|| {
                    cause
                        .downcast_ref::<ConfigError>()
                        .and_then(ErrorChainExt::suggested_action)
                })
        })
    }
}
