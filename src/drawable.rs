//! The drawable object contract
//!
//! Every element of a figure graph (figure, axes, lines, text, spines, ...)
//! is reached by the editor through the [`Drawable`] trait. The trait is the
//! only thing the resolver, the tree builder and the binding surface know
//! about the plotting model.
//!
//! Attributes come in two shapes, see [`Attribute`]: plain fields that carry
//! a value, and methods that must be invoked through [`Drawable::invoke`].

use indexmap::IndexMap;
use std::sync::{Arc, Weak};
use thiserror::Error;

use crate::types::{Value, ValueMap};

/// Shared reference to a drawable object
pub type DrawableRef = Arc<dyn Drawable>;

/// Non-owning reference to a drawable object
pub type WeakDrawable = Weak<dyn Drawable>;

/// Result of looking up an attribute by name
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// A plain field holding a value
    Field(Value),
    /// An invocable method
    Method,
}

impl Attribute {
    pub fn is_method(&self) -> bool {
        matches!(self, Attribute::Method)
    }
}

/// Arguments passed to [`Drawable::invoke`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub named: ValueMap,
}

impl CallArgs {
    /// No arguments
    pub fn none() -> Self {
        Self::default()
    }

    /// A single positional argument
    pub fn positional(value: Value) -> Self {
        Self {
            positional: vec![value],
            named: IndexMap::new(),
        }
    }

    /// Named arguments only
    pub fn named(named: ValueMap) -> Self {
        Self {
            positional: Vec::new(),
            named,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

/// Errors raised by drawable objects
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrawableError {
    #[error("'{type_name}' object has no attribute '{name}'")]
    NoAttribute { type_name: String, name: String },

    #[error("'{type_name}.{name}' is not callable")]
    NotCallable { type_name: String, name: String },

    #[error("{0}")]
    Type(String),

    #[error("invalid value for '{name}': {message}")]
    InvalidValue { name: String, message: String },

    #[error("'{type_name}' does not support {operation}")]
    Unsupported { type_name: String, operation: String },

    #[error("{0}")]
    Failed(String),
}

/// A node of a figure object graph
///
/// Implementations guard their own state; all methods take `&self`.
pub trait Drawable: Send + Sync {
    /// Runtime type name, used for schema lookup and tree labels
    fn type_name(&self) -> String;

    /// User-facing label; empty when unset
    fn label(&self) -> Result<String, DrawableError>;

    /// Direct children in their natural order
    fn children(&self) -> Result<Vec<DrawableRef>, DrawableError>;

    /// Look up an attribute by name
    fn attribute(&self, name: &str) -> Result<Attribute, DrawableError>;

    /// Invoke a method attribute
    fn invoke(&self, name: &str, args: CallArgs) -> Result<Value, DrawableError>;

    /// Assign a plain field attribute
    fn assign(&self, name: &str, value: Value) -> Result<(), DrawableError>;

    /// Detach this object from its parent
    fn remove(&self) -> Result<(), DrawableError> {
        Err(DrawableError::Unsupported {
            type_name: self.type_name(),
            operation: "remove".to_string(),
        })
    }
}

/// Identity comparison of two drawable references
pub fn same_object(a: &DrawableRef, b: &DrawableRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// True when `weak` is still alive and refers to `target`
pub fn refers_to(weak: &WeakDrawable, target: &DrawableRef) -> bool {
    weak.upgrade()
        .map(|obj| same_object(&obj, target))
        .unwrap_or(false)
}

/// Short `Type 'label'` description for log messages
pub fn describe(obj: &DrawableRef) -> String {
    match obj.label() {
        Ok(label) if !label.is_empty() => format!("{} '{}'", obj.type_name(), label),
        _ => obj.type_name(),
    }
}
