//! Semantic error types for fluent-scenario.
//!
//! Conditions a caller might inspect (a rejected scenario description, a
//! missing context key, a bad configuration value) are semantic enums built
//! with `thiserror`. Failures raised inside step bodies are opaque
//! `eyre::Report`s: the runner reports them and hands them back untouched.

use std::sync::Arc;

use thiserror::Error;

/// Errors raised while constructing a scenario.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// The scenario description was empty or only whitespace.
    #[error("please explain your intent by documenting your scenario")]
    EmptyDescription,
}

/// Errors raised when reading from the named-value context store.
#[derive(Debug, Error)]
pub enum ContextError {
    /// No value has been stored under the requested key.
    #[error("context key '{key}' was not found")]
    KeyNotFound {
        /// The key that was requested.
        key: String,
    },

    /// A value exists under the key but was stored with a different type.
    #[error("context key '{key}' holds {found}, not {expected}")]
    TypeMismatch {
        /// The key that was requested.
        key: String,
        /// The type the caller asked for.
        expected: &'static str,
        /// The type the value was stored as.
        found: &'static str,
    },
}

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error while merging layers.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Top-level error type for fluent-scenario.
///
/// Step bodies that call fallible context lookups can use `?` directly: the
/// error converts into `eyre::Report` and surfaces from `play` as a step
/// failure.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// A scenario could not be constructed.
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// A context lookup failed.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A specialised `Result` type for fluent-scenario operations.
pub type Result<T> = std::result::Result<T, ScenarioError>;
