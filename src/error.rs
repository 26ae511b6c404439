//! Error handling for the Figure Forge application
//!
//! This module defines the crate-level error type and a Result alias for use
//! throughout the application. Subsystems keep their own error enums and
//! convert into [`ForgeError`] at the session and frontend boundary.

use thiserror::Error;

use crate::binding::BindingError;
use crate::drawable::DrawableError;
use crate::explorer::TreeError;
use crate::resolver::ResolveError;
use crate::schema::SchemaError;
use crate::scripting::PluginError;

/// Main error type for Figure Forge operations
#[derive(Error, Debug)]
pub enum ForgeError {
    /// Errors raised while loading or querying a schema
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Errors raised while resolving an attribute path
    #[error("{0}")]
    Resolve(#[from] ResolveError),

    /// Errors raised directly by a drawable object
    #[error("Object error: {0}")]
    Drawable(#[from] DrawableError),

    /// Errors raised while describing or applying properties
    #[error("{0}")]
    Binding(#[from] BindingError),

    /// Errors raised while building the explorer tree
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    /// Errors related to plugin scripts
    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to figure documents
    #[error("Document error: {0}")]
    Document(String),

    /// An operation needed a selected object but none is selected
    #[error("No object selected")]
    NoSelection,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ForgeError>,
    },
}

impl ForgeError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ForgeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for ForgeError {
    fn from(err: serde_json::Error) -> Self {
        ForgeError::Serialization(err.to_string())
    }
}

/// Result type alias for Figure Forge operations
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ForgeError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ForgeError::Config("Invalid plugin directory".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid plugin directory");
    }

    #[test]
    fn test_error_with_context() {
        let err = ForgeError::Document("unknown kind".to_string());
        let with_ctx = err.with_context("Failed to open figure");
        assert!(with_ctx.to_string().starts_with("Failed to open figure"));
        assert!(with_ctx.to_string().contains("unknown kind"));
    }

    #[test]
    fn test_result_ext_converts_subsystem_errors() {
        let res: std::result::Result<(), DrawableError> =
            Err(DrawableError::Failed("boom".to_string()));
        let err = res.context("Applying edit").unwrap_err();
        match err {
            ForgeError::WithContext { context, source } => {
                assert_eq!(context, "Applying edit");
                assert!(matches!(*source, ForgeError::Drawable(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
