//! Error types for config-tree.
//!
//! Uses thiserror for derive macros. Schema-authoring mistakes
//! (`Definition`) are kept apart from failures caused by configuration data
//! (`InvalidType`, `InvalidConfiguration`, `DuplicateKey`,
//! `ForbiddenOverwrite`). `UnsetKey` is an internal control signal that the
//! nearest array node turns into key removal.

use thiserror::Error;

use crate::loader::LoadError;

/// Boxed cause attached to wrapped validation failures.
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for schema construction and configuration processing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The schema itself is wrong (incompatible builder options, enum
    /// without values, duplicate child names, ...). Never caused by data.
    #[error("{0}")]
    Definition(String),

    /// A value's shape does not match its declared node type.
    #[error("{message}")]
    InvalidType { path: String, message: String },

    /// A value is present but violates a constraint.
    #[error("{message}")]
    InvalidConfiguration {
        path: String,
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    /// Two prototype entries resolved to the same key.
    #[error("{message}")]
    DuplicateKey { path: String, message: String },

    /// A merge was attempted on a node that cannot be overwritten.
    #[error("{message}")]
    ForbiddenOverwrite { path: String, message: String },

    /// Internal signal: remove this key from the containing array node.
    #[error("{message}")]
    UnsetKey { path: String, message: String },

    /// The finalized configuration could not be decoded into a typed value.
    #[error("failed to decode configuration at {path}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A configuration resource could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A programming-contract violation, e.g. merging values that were not
    /// normalized first.
    #[error("{0}")]
    Runtime(String),
}

impl ConfigError {
    pub(crate) fn definition(message: impl Into<String>) -> Self {
        ConfigError::Definition(message.into())
    }

    pub(crate) fn invalid_type(path: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidType {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid(path: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidConfiguration {
            path: path.to_string(),
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn invalid_with_source(
        path: &str,
        message: impl Into<String>,
        source: BoxedCause,
    ) -> Self {
        ConfigError::InvalidConfiguration {
            path: path.to_string(),
            message: message.into(),
            source: Some(source),
        }
    }

    pub(crate) fn duplicate_key(path: &str, message: impl Into<String>) -> Self {
        ConfigError::DuplicateKey {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn forbidden_overwrite(path: &str, message: impl Into<String>) -> Self {
        ConfigError::ForbiddenOverwrite {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn unset_key(path: &str, message: impl Into<String>) -> Self {
        ConfigError::UnsetKey {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn runtime(message: impl Into<String>) -> Self {
        ConfigError::Runtime(message.into())
    }

    /// The configuration path the error is attributed to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidType { path, .. }
            | ConfigError::InvalidConfiguration { path, .. }
            | ConfigError::DuplicateKey { path, .. }
            | ConfigError::ForbiddenOverwrite { path, .. }
            | ConfigError::UnsetKey { path, .. }
            | ConfigError::Decode { path, .. } => Some(path),
            ConfigError::Definition(_) | ConfigError::Load(_) | ConfigError::Runtime(_) => None,
        }
    }

    /// Whether the error is an invalid-configuration failure, including the
    /// type, duplicate-key and forbidden-overwrite refinements.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(
            self,
            ConfigError::InvalidType { .. }
                | ConfigError::InvalidConfiguration { .. }
                | ConfigError::DuplicateKey { .. }
                | ConfigError::ForbiddenOverwrite { .. }
        )
    }

    /// Whether the error is a schema-authoring mistake.
    pub fn is_definition_error(&self) -> bool {
        matches!(self, ConfigError::Definition(_))
    }

    /// Whether the error is the internal unset-key signal.
    pub fn is_unset_key(&self) -> bool {
        matches!(self, ConfigError::UnsetKey { .. })
    }
}

/// Result type alias for config-tree operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_type_is_an_invalid_configuration() {
        let err = ConfigError::invalid_type("app.port", "bad type");
        assert!(err.is_invalid_configuration());
        assert!(!err.is_definition_error());
        assert_eq!(err.path(), Some("app.port"));
    }

    #[test]
    fn duplicate_key_and_forbidden_overwrite_are_invalid_configurations() {
        assert!(ConfigError::duplicate_key("a", "dup").is_invalid_configuration());
        assert!(ConfigError::forbidden_overwrite("a", "locked").is_invalid_configuration());
    }

    #[test]
    fn definition_error_has_no_path() {
        let err = ConfigError::definition("enum needs values");
        assert!(err.is_definition_error());
        assert!(!err.is_invalid_configuration());
        assert_eq!(err.path(), None);
    }

    #[test]
    fn unset_key_is_neither_definition_nor_invalid() {
        let err = ConfigError::unset_key("a.b", "Unsetting key");
        assert!(err.is_unset_key());
        assert!(!err.is_invalid_configuration());
        assert!(!err.is_definition_error());
    }

    #[test]
    fn wrapped_source_is_exposed() {
        use std::error::Error;

        let cause: BoxedCause = "port is reserved".into();
        let err = ConfigError::invalid_with_source("app.port", "Invalid configuration", cause);
        assert_eq!(err.to_string(), "Invalid configuration");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("port is reserved"));
    }

    #[test]
    fn error_messages_are_passed_through() {
        let err = ConfigError::runtime("merge() expects a normalized config array.");
        assert_eq!(err.to_string(), "merge() expects a normalized config array.");
    }
}
