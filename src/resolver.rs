//! Attribute path resolution
//!
//! Resolves dot-separated attribute paths such as `xaxis.label.get_text`
//! against a drawable object. Intermediate segments are fetched (invoking
//! methods with no arguments) and must yield objects; the last segment is
//! either read or used to apply a new value.
//!
//! Reads are tolerant of indexing a non-indexable value, or a sequence with a
//! key: the un-indexed value is returned and the mismatch is logged. Writes are strict: every error the
//! object raises is propagated to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::drawable::{Attribute, CallArgs, Drawable, DrawableError, DrawableRef};
use crate::types::{IndexError, Value, ValueIndex, ValueMap};

// ==================== Paths ====================

/// A validated, dot-separated attribute path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttributePath {
    segments: Vec<String>,
}

/// Errors produced while parsing an [`AttributePath`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("attribute path is empty")]
    Empty,

    #[error("attribute path '{path}' has an empty segment")]
    EmptySegment { path: String },

    #[error("attribute path '{path}' has invalid segment '{segment}'")]
    InvalidSegment { path: String, segment: String },
}

impl AttributePath {
    /// Parse a dot-separated path
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.trim().is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for segment in path.split('.') {
            if segment.is_empty() {
                return Err(PathError::EmptySegment {
                    path: path.to_string(),
                });
            }
            let valid = segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !segment.starts_with(|c: char| c.is_ascii_digit());
            if !valid {
                return Err(PathError::InvalidSegment {
                    path: path.to_string(),
                    segment: segment.to_string(),
                });
            }
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The final segment
    pub fn last(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// All segments except the last
    pub fn parents(&self) -> &[String] {
        &self.segments[..self.segments.len().saturating_sub(1)]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for AttributePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AttributePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AttributePath> for String {
    fn from(path: AttributePath) -> Self {
        path.to_string()
    }
}

// ==================== Errors ====================

/// Errors produced while resolving a path against an object
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// The object raised an error for a segment
    #[error("'{path}' failed at '{segment}': {source}")]
    Drawable {
        path: AttributePath,
        segment: String,
        #[source]
        source: DrawableError,
    },

    /// An intermediate segment produced something other than an object
    #[error("'{path}': '{segment}' produced {found}, not an object")]
    NotAnObject {
        path: AttributePath,
        segment: String,
        found: &'static str,
    },

    /// Indexing an indexable value failed
    #[error("'{path}{index}': {source}")]
    Index {
        path: AttributePath,
        index: ValueIndex,
        #[source]
        source: IndexError,
    },

    /// Named arguments were supplied for a plain field
    #[error("'{path}': '{segment}' is not callable and cannot take named arguments")]
    NamedArgsOnField { path: AttributePath, segment: String },
}

impl ResolveError {
    /// The error raised by the object, when there is one
    pub fn drawable_error(&self) -> Option<&DrawableError> {
        match self {
            ResolveError::Drawable { source, .. } => Some(source),
            _ => None,
        }
    }
}

type ResolveResult<T> = std::result::Result<T, ResolveError>;

// ==================== Resolution ====================

fn object_error(path: &AttributePath, segment: &str) -> impl FnOnce(DrawableError) -> ResolveError {
    let path = path.clone();
    let segment = segment.to_string();
    move |source| ResolveError::Drawable {
        path,
        segment,
        source,
    }
}

/// Fetch one attribute: field values are returned as-is, methods are invoked
/// with no arguments.
fn fetch(obj: &dyn Drawable, path: &AttributePath, segment: &str) -> ResolveResult<Value> {
    match obj.attribute(segment).map_err(object_error(path, segment))? {
        Attribute::Field(value) => Ok(value),
        Attribute::Method => obj
            .invoke(segment, CallArgs::none())
            .map_err(object_error(path, segment)),
    }
}

/// Walk every segment except the last, returning the object that owns the
/// final attribute.
fn traverse(root: &DrawableRef, path: &AttributePath) -> ResolveResult<DrawableRef> {
    let mut current = root.clone();
    for segment in path.parents() {
        current = match fetch(current.as_ref(), path, segment)? {
            Value::Object(obj) => obj,
            other => {
                return Err(ResolveError::NotAnObject {
                    path: path.clone(),
                    segment: segment.clone(),
                    found: other.kind_name(),
                })
            }
        };
    }
    Ok(current)
}

/// Read the value at `path`, optionally indexed
pub fn resolve_get(
    obj: &DrawableRef,
    path: &AttributePath,
    index: Option<&ValueIndex>,
) -> ResolveResult<Value> {
    let owner = traverse(obj, path)?;
    let value = fetch(owner.as_ref(), path, path.last())?;

    let Some(index) = index else {
        return Ok(value);
    };

    match value.index(index) {
        Ok(item) => Ok(item),
        Err(IndexError::NotIndexable { kind }) => {
            tracing::debug!(
                "'{}' produced a non-indexable {} value; ignoring index {}",
                path,
                kind,
                index
            );
            Ok(value)
        }
        Err(IndexError::WrongIndexType { kind, .. }) if !matches!(value, Value::Map(_)) => {
            tracing::debug!(
                "'{}' produced a {} that cannot take index {}; ignoring it",
                path,
                kind,
                index
            );
            Ok(value)
        }
        Err(source) => Err(ResolveError::Index {
            path: path.clone(),
            index: index.clone(),
            source,
        }),
    }
}

/// Apply `value` at `path`
///
/// A `Map` value becomes named arguments of a method call, any other value
/// is passed positionally to a method or assigned to a field.
pub fn resolve_set(obj: &DrawableRef, path: &AttributePath, value: Value) -> ResolveResult<()> {
    let owner = traverse(obj, path)?;
    let segment = path.last();
    let attribute = owner
        .attribute(segment)
        .map_err(object_error(path, segment))?;

    match (value, attribute) {
        (Value::Map(named), Attribute::Method) => {
            tracing::debug!("{}(**{:?})", path, named.keys().collect::<Vec<_>>());
            owner
                .invoke(segment, CallArgs::named(named))
                .map(|_| ())
                .map_err(object_error(path, segment))
        }
        (Value::Map(_), Attribute::Field(_)) => Err(ResolveError::NamedArgsOnField {
            path: path.clone(),
            segment: segment.to_string(),
        }),
        (value, Attribute::Method) => {
            tracing::debug!("{}({})", path, value);
            owner
                .invoke(segment, CallArgs::positional(value))
                .map(|_| ())
                .map_err(object_error(path, segment))
        }
        (value, Attribute::Field(_)) => {
            tracing::debug!("{} = {}", path, value);
            owner
                .assign(segment, value)
                .map_err(object_error(path, segment))
        }
    }
}

/// [`resolve_set`] with an optional fixed parameter name
///
/// With `Some(param)` the value is passed as the single named argument
/// `param = value`.
pub fn resolve_set_with(
    obj: &DrawableRef,
    path: &AttributePath,
    value: Value,
    parameter: Option<&str>,
) -> ResolveResult<()> {
    match parameter {
        Some(param) => {
            let mut named = ValueMap::new();
            named.insert(param.to_string(), value);
            resolve_set(obj, path, Value::Map(named))
        }
        None => resolve_set(obj, path, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use proptest::prelude::*;
    use std::sync::Arc;

    mock! {
        pub Obj {}
        impl Drawable for Obj {
            fn type_name(&self) -> String;
            fn label(&self) -> std::result::Result<String, DrawableError>;
            fn children(&self) -> std::result::Result<Vec<DrawableRef>, DrawableError>;
            fn attribute(&self, name: &str) -> std::result::Result<Attribute, DrawableError>;
            fn invoke(&self, name: &str, args: CallArgs) -> std::result::Result<Value, DrawableError>;
            fn assign(&self, name: &str, value: Value) -> std::result::Result<(), DrawableError>;
            fn remove(&self) -> std::result::Result<(), DrawableError>;
        }
    }

    fn path(s: &str) -> AttributePath {
        AttributePath::parse(s).unwrap()
    }

    fn missing(name: &str) -> DrawableError {
        DrawableError::NoAttribute {
            type_name: "Mock".into(),
            name: name.into(),
        }
    }

    #[test]
    fn test_path_parsing() {
        let p = path("xaxis.label.get_text");
        assert_eq!(p.len(), 3);
        assert_eq!(p.last(), "get_text");
        assert_eq!(p.parents(), &["xaxis".to_string(), "label".to_string()]);
        assert_eq!(p.to_string(), "xaxis.label.get_text");

        assert_eq!(AttributePath::parse(""), Err(PathError::Empty));
        assert!(matches!(
            AttributePath::parse("a..b"),
            Err(PathError::EmptySegment { .. })
        ));
        assert!(matches!(
            AttributePath::parse("a.b c"),
            Err(PathError::InvalidSegment { .. })
        ));
    }

    #[test]
    fn test_get_invokes_method() {
        let mut mock = MockObj::new();
        mock.expect_attribute()
            .returning(|name| match name {
                "get_linewidth" => Ok(Attribute::Method),
                other => Err(missing(other)),
            });
        mock.expect_invoke().times(1).returning(|name, args| {
            assert_eq!(name, "get_linewidth");
            assert!(args.is_empty());
            Ok(Value::Float(1.5))
        });
        let obj: DrawableRef = Arc::new(mock);

        let value = resolve_get(&obj, &path("get_linewidth"), None).unwrap();
        assert_eq!(value, Value::Float(1.5));
    }

    #[test]
    fn test_get_reads_field_without_invoking() {
        let mut mock = MockObj::new();
        mock.expect_attribute()
            .returning(|_| Ok(Attribute::Field(Value::Float(2.0))));
        mock.expect_invoke().never();
        let obj: DrawableRef = Arc::new(mock);

        assert_eq!(
            resolve_get(&obj, &path("zorder"), None).unwrap(),
            Value::Float(2.0)
        );
    }

    #[test]
    fn test_get_index_on_scalar_returns_value() {
        let mut mock = MockObj::new();
        mock.expect_attribute().returning(|_| Ok(Attribute::Method));
        mock.expect_invoke().returning(|_, _| Ok(Value::Int(5)));
        let obj: DrawableRef = Arc::new(mock);

        let value = resolve_get(&obj, &path("get_x"), Some(&ValueIndex::Position(0))).unwrap();
        assert_eq!(value, Value::Int(5));
    }

    #[test]
    fn test_get_key_on_tuple_returns_value() {
        let tuple = Value::Tuple(vec![Value::Int(10), Value::Int(20)]);
        let returned = tuple.clone();
        let mut mock = MockObj::new();
        mock.expect_attribute().returning(|_| Ok(Attribute::Method));
        mock.expect_invoke().returning(move |_, _| Ok(returned.clone()));
        let obj: DrawableRef = Arc::new(mock);

        let key = ValueIndex::Key("left".into());
        assert_eq!(resolve_get(&obj, &path("get_x"), Some(&key)).unwrap(), tuple);
    }

    #[test]
    fn test_get_position_on_map_fails() {
        let mut mock = MockObj::new();
        mock.expect_attribute().returning(|_| Ok(Attribute::Method));
        mock.expect_invoke()
            .returning(|_, _| Ok(Value::Map(ValueMap::new())));
        let obj: DrawableRef = Arc::new(mock);

        let err = resolve_get(&obj, &path("get_x"), Some(&ValueIndex::Position(0))).unwrap_err();
        assert!(matches!(err, ResolveError::Index { .. }));
    }

    #[test]
    fn test_get_index_out_of_range_fails() {
        let mut mock = MockObj::new();
        mock.expect_attribute().returning(|_| Ok(Attribute::Method));
        mock.expect_invoke()
            .returning(|_, _| Ok(Value::Tuple(vec![Value::Int(10), Value::Int(20)])));
        let obj: DrawableRef = Arc::new(mock);

        let err = resolve_get(&obj, &path("get_x"), Some(&ValueIndex::Position(5))).unwrap_err();
        assert!(matches!(err, ResolveError::Index { .. }));
    }

    #[test]
    fn test_intermediate_non_object_fails() {
        let mut mock = MockObj::new();
        mock.expect_attribute()
            .returning(|_| Ok(Attribute::Field(Value::Int(1))));
        let obj: DrawableRef = Arc::new(mock);

        let err = resolve_get(&obj, &path("zorder.get_text"), None).unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotAnObject {
                path: path("zorder.get_text"),
                segment: "zorder".into(),
                found: "int"
            }
        );
    }

    #[test]
    fn test_set_invokes_method_positionally() {
        let mut mock = MockObj::new();
        mock.expect_attribute().returning(|_| Ok(Attribute::Method));
        mock.expect_invoke().times(1).returning(|name, args| {
            assert_eq!(name, "set_linewidth");
            assert_eq!(args, CallArgs::positional(Value::Float(3.0)));
            Ok(Value::None)
        });
        mock.expect_assign().never();
        let obj: DrawableRef = Arc::new(mock);

        resolve_set(&obj, &path("set_linewidth"), Value::Float(3.0)).unwrap();
    }

    #[test]
    fn test_set_assigns_field() {
        let mut mock = MockObj::new();
        mock.expect_attribute()
            .returning(|_| Ok(Attribute::Field(Value::Float(2.0))));
        mock.expect_invoke().never();
        mock.expect_assign().times(1).returning(|name, value| {
            assert_eq!(name, "zorder");
            assert_eq!(value, Value::Float(4.0));
            Ok(())
        });
        let obj: DrawableRef = Arc::new(mock);

        resolve_set(&obj, &path("zorder"), Value::Float(4.0)).unwrap();
    }

    #[test]
    fn test_set_parameter_wraps_named_argument() {
        let mut mock = MockObj::new();
        mock.expect_attribute().returning(|_| Ok(Attribute::Method));
        mock.expect_invoke().times(1).returning(|name, args| {
            assert_eq!(name, "set_xscale");
            assert!(args.positional.is_empty());
            assert_eq!(args.named.len(), 1);
            assert_eq!(args.named.get("value"), Some(&Value::from("log")));
            Ok(Value::None)
        });
        let obj: DrawableRef = Arc::new(mock);

        resolve_set_with(&obj, &path("set_xscale"), Value::from("log"), Some("value")).unwrap();
    }

    #[test]
    fn test_set_map_on_field_is_rejected() {
        let mut mock = MockObj::new();
        mock.expect_attribute()
            .returning(|_| Ok(Attribute::Field(Value::None)));
        mock.expect_assign().never();
        let obj: DrawableRef = Arc::new(mock);

        let err = resolve_set_with(&obj, &path("zorder"), Value::Int(1), Some("z")).unwrap_err();
        assert!(matches!(err, ResolveError::NamedArgsOnField { .. }));
    }

    #[test]
    fn test_set_propagates_object_error() {
        let mut mock = MockObj::new();
        mock.expect_attribute().returning(|_| Ok(Attribute::Method));
        mock.expect_invoke()
            .returning(|_, _| Err(DrawableError::Type("bad value".into())));
        let obj: DrawableRef = Arc::new(mock);

        let err = resolve_set(&obj, &path("set_color"), Value::Int(1)).unwrap_err();
        assert_eq!(err.drawable_error(), Some(&DrawableError::Type("bad value".into())));
    }

    proptest! {
        #[test]
        fn prop_valid_paths_roundtrip(segments in prop::collection::vec("[a-z_][a-z0-9_]{0,8}", 1..5)) {
            let joined = segments.join(".");
            let parsed = AttributePath::parse(&joined).unwrap();
            prop_assert_eq!(parsed.segments(), segments.as_slice());
            prop_assert_eq!(parsed.to_string(), joined);
        }
    }
}
