//! Property schema store
//!
//! A schema maps a drawable's runtime type name to the ordered set of
//! properties the inspector shows for it. Each property declares a value kind
//! and the attribute paths used to read and write it.
//!
//! Schema documents (JSON or TOML) are validated eagerly: a malformed entry
//! fails the whole load with the offending type and property named, and a
//! failed reload keeps the previously loaded snapshot.
//!
//! # Example document
//!
//! ```json
//! {
//!     "Line2D": {
//!         "attributes": {
//!             "width": { "type": "float", "get": "get_linewidth", "set": "set_linewidth" }
//!         }
//!     }
//! }
//! ```

mod document;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::resolver::AttributePath;
use crate::types::ValueIndex;

/// The schema compiled into the binary
pub const BUILTIN_SCHEMA: &str = include_str!("builtin_schema.json");

// ==================== Errors ====================

/// Errors related to schema loading and lookup
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse schema: {0}")]
    Parse(String),

    #[error("Unsupported schema format for {0:?} (expected .json or .toml)")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid entry {type_name}.{property}: {reason}")]
    InvalidEntry {
        type_name: String,
        property: String,
        reason: String,
    },

    #[error("Type '{type_name}' declares no property '{property}'")]
    UnknownProperty { type_name: String, property: String },
}

// ==================== Kinds ====================

/// Value kind tag as written in schema documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    String,
    Multiline,
    Choice,
    Color,
    Tuple,
    Dict,
    Font,
}

impl ValueKind {
    pub const ALL: [ValueKind; 10] = [
        ValueKind::Bool,
        ValueKind::Int,
        ValueKind::Float,
        ValueKind::String,
        ValueKind::Multiline,
        ValueKind::Choice,
        ValueKind::Color,
        ValueKind::Tuple,
        ValueKind::Dict,
        ValueKind::Font,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Multiline => "multiline",
            ValueKind::Choice => "choice",
            ValueKind::Color => "color",
            ValueKind::Tuple => "tuple",
            ValueKind::Dict => "dict",
            ValueKind::Font => "font",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown value kind '{}'", s))
    }
}

/// Kind of a single component of a `tuple` or `dict` property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    String,
    Color,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::String => "string",
            ScalarKind::Color => "color",
        }
    }
}

impl FromStr for ScalarKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" => Ok(ScalarKind::Bool),
            "int" => Ok(ScalarKind::Int),
            "float" => Ok(ScalarKind::Float),
            "string" | "str" => Ok(ScalarKind::String),
            "color" => Ok(ScalarKind::Color),
            other => Err(format!("unknown component kind '{}'", other)),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully validated kind of a property, with its editor constraints
#[derive(Debug, Clone, PartialEq)]
pub enum KindSpec {
    Bool,
    Int,
    Float,
    String,
    Multiline,
    Font,
    Color,
    Choice { options: Vec<String> },
    Tuple { components: Vec<ScalarKind> },
    Dict { fields: Vec<(String, ScalarKind)> },
}

impl KindSpec {
    pub fn value_kind(&self) -> ValueKind {
        match self {
            KindSpec::Bool => ValueKind::Bool,
            KindSpec::Int => ValueKind::Int,
            KindSpec::Float => ValueKind::Float,
            KindSpec::String => ValueKind::String,
            KindSpec::Multiline => ValueKind::Multiline,
            KindSpec::Font => ValueKind::Font,
            KindSpec::Color => ValueKind::Color,
            KindSpec::Choice { .. } => ValueKind::Choice,
            KindSpec::Tuple { .. } => ValueKind::Tuple,
            KindSpec::Dict { .. } => ValueKind::Dict,
        }
    }

    /// Allowed options for `choice` kinds
    pub fn choices(&self) -> Option<&[String]> {
        match self {
            KindSpec::Choice { options } => Some(options),
            _ => None,
        }
    }
}

// ==================== Entries ====================

/// A single validated property declaration
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaEntry {
    pub name: String,
    pub kind: KindSpec,
    pub get: AttributePath,
    pub get_index: Option<ValueIndex>,
    /// Absent for read-only properties
    pub set: Option<AttributePath>,
    pub set_parameter: Option<String>,
}

impl SchemaEntry {
    pub fn is_read_only(&self) -> bool {
        self.set.is_none()
    }
}

/// Declared properties of one object type, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeSchema {
    properties: IndexMap<String, SchemaEntry>,
}

impl TypeSchema {
    pub fn properties(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.properties.values()
    }

    pub fn get(&self, property: &str) -> Option<&SchemaEntry> {
        self.properties.get(property)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

// ==================== Schema ====================

/// An immutable, validated schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    types: IndexMap<String, TypeSchema>,
}

impl Schema {
    /// Parse and validate the built-in schema
    pub fn builtin() -> Result<Self, SchemaError> {
        Self::from_json_str(BUILTIN_SCHEMA)
    }

    /// Parse and validate a JSON schema document
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let raw: document::RawDocument =
            serde_json::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))?;
        document::compile(raw)
    }

    /// Parse and validate a TOML schema document
    pub fn from_toml_str(text: &str) -> Result<Self, SchemaError> {
        let raw: document::RawDocument =
            toml::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))?;
        document::compile(raw)
    }

    /// Load a schema file, choosing the format by extension
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match extension.as_deref() {
            Some("json") => Self::from_json_str(&text),
            Some("toml") => Self::from_toml_str(&text),
            _ => Err(SchemaError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Load from a [`SchemaSource`]
    pub fn load(source: &SchemaSource) -> Result<Self, SchemaError> {
        match source {
            SchemaSource::Builtin => Self::builtin(),
            SchemaSource::File(path) => Self::from_file(path),
        }
    }

    pub(crate) fn from_types(types: IndexMap<String, TypeSchema>) -> Self {
        Self { types }
    }

    /// Declared properties of a type, `None` when the type is not in the schema
    pub fn type_schema(&self, type_name: &str) -> Option<&TypeSchema> {
        self.types.get(type_name)
    }

    /// Look up one property
    ///
    /// An undeclared type is not an error (`Ok(None)`); an undeclared
    /// property of a declared type is.
    pub fn lookup(
        &self,
        type_name: &str,
        property: &str,
    ) -> Result<Option<&SchemaEntry>, SchemaError> {
        let Some(ty) = self.types.get(type_name) else {
            return Ok(None);
        };
        ty.get(property)
            .map(Some)
            .ok_or_else(|| SchemaError::UnknownProperty {
                type_name: type_name.to_string(),
                property: property.to_string(),
            })
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Total number of declared properties across all types
    pub fn property_count(&self) -> usize {
        self.types.values().map(TypeSchema::len).sum()
    }
}

// ==================== Store ====================

/// Where a schema is loaded from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SchemaSource {
    #[default]
    Builtin,
    File(PathBuf),
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::Builtin => write!(f, "built-in schema"),
            SchemaSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Holds the current schema snapshot and its source
#[derive(Debug)]
pub struct SchemaStore {
    source: SchemaSource,
    current: Arc<Schema>,
    generation: u64,
}

impl SchemaStore {
    /// Load the initial snapshot from `source`
    pub fn load(source: SchemaSource) -> Result<Self, SchemaError> {
        let schema = Schema::load(&source)?;
        tracing::info!(
            "Loaded {} ({} types, {} properties)",
            source,
            schema.len(),
            schema.property_count()
        );
        Ok(Self {
            source,
            current: Arc::new(schema),
            generation: 0,
        })
    }

    /// Store wrapping an already validated schema
    pub fn with_schema(source: SchemaSource, schema: Schema) -> Self {
        Self {
            source,
            current: Arc::new(schema),
            generation: 0,
        }
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Arc<Schema> {
        Arc::clone(&self.current)
    }

    pub fn source(&self) -> &SchemaSource {
        &self.source
    }

    /// Number of successful reloads
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reload from the current source; on failure the old snapshot stays
    pub fn reload(&mut self) -> Result<Arc<Schema>, SchemaError> {
        let schema = Schema::load(&self.source).inspect_err(|e| {
            tracing::warn!("Schema reload from {} failed: {}", self.source, e);
        })?;
        self.current = Arc::new(schema);
        self.generation += 1;
        tracing::info!(
            "Reloaded {} ({} types, generation {})",
            self.source,
            self.current.len(),
            self.generation
        );
        Ok(self.snapshot())
    }

    /// Switch to a new source; on failure nothing changes
    pub fn set_source(&mut self, source: SchemaSource) -> Result<Arc<Schema>, SchemaError> {
        let schema = Schema::load(&source)?;
        tracing::info!("Switched schema source to {}", source);
        self.source = source;
        self.current = Arc::new(schema);
        self.generation += 1;
        Ok(self.snapshot())
    }
}
