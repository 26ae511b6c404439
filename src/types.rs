//! Core value types for Figure Forge
//!
//! This module contains the dynamic value model exchanged between the
//! editor core and drawable objects.
//!
//! # Main Types
//!
//! - [`Value`] - A dynamically typed attribute value (scalars, colors,
//!   tuples, keyed maps, and object references)
//! - [`Rgba`] - A normalized RGBA color with name/hex parsing
//! - [`ValueIndex`] - A position or key applied to a resolved value
//!
//! # Equality
//!
//! Scalar values compare by value. [`Value::Object`] compares by identity:
//! two object values are equal only when they refer to the same drawable.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::drawable::{same_object, DrawableRef};

/// Ordered keyed mapping used for named arguments and `dict` values
pub type ValueMap = IndexMap<String, Value>;

// ==================== Colors ====================

/// A normalized RGBA color (components in `0.0..=1.0`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Named colors understood by [`Rgba::parse`]
const NAMED_COLORS: &[(&str, &str)] = &[
    ("b", "#0000ff"),
    ("g", "#008000"),
    ("r", "#ff0000"),
    ("c", "#00bfbf"),
    ("m", "#bf00bf"),
    ("y", "#bfbf00"),
    ("k", "#000000"),
    ("w", "#ffffff"),
    ("black", "#000000"),
    ("white", "#ffffff"),
    ("red", "#ff0000"),
    ("green", "#008000"),
    ("blue", "#0000ff"),
    ("yellow", "#ffff00"),
    ("cyan", "#00ffff"),
    ("magenta", "#ff00ff"),
    ("orange", "#ffa500"),
    ("purple", "#800080"),
    ("brown", "#a52a2a"),
    ("pink", "#ffc0cb"),
    ("navy", "#000080"),
    ("olive", "#808000"),
    ("teal", "#008080"),
    ("gray", "#808080"),
    ("grey", "#808080"),
    ("lightgray", "#d3d3d3"),
    ("lightgrey", "#d3d3d3"),
    ("darkgray", "#a9a9a9"),
    ("darkgrey", "#a9a9a9"),
    ("tab:blue", "#1f77b4"),
    ("tab:orange", "#ff7f0e"),
    ("tab:green", "#2ca02c"),
    ("tab:red", "#d62728"),
    ("tab:purple", "#9467bd"),
    ("tab:brown", "#8c564b"),
    ("tab:pink", "#e377c2"),
    ("tab:gray", "#7f7f7f"),
    ("tab:olive", "#bcbd22"),
    ("tab:cyan", "#17becf"),
    ("C0", "#1f77b4"),
    ("C1", "#ff7f0e"),
    ("C2", "#2ca02c"),
    ("C3", "#d62728"),
    ("C4", "#9467bd"),
    ("C5", "#8c564b"),
    ("C6", "#e377c2"),
    ("C7", "#7f7f7f"),
    ("C8", "#bcbd22"),
    ("C9", "#17becf"),
];

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    /// The first color of the default property cycle (`C0`)
    pub const CYCLE_BLUE: Rgba = Rgba::new(0.121_568_63, 0.466_666_67, 0.705_882_4, 1.0);

    /// Create a color from normalized components
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from 8-bit components
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Parse a color name, `#rgb`, `#rrggbb`, `#rrggbbaa`, or `none`
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("none") {
            return Some(Self::TRANSPARENT);
        }

        if let Some(hex) = input.strip_prefix('#') {
            return Self::parse_hex(hex);
        }

        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == input || name.eq_ignore_ascii_case(input) && name.len() > 1)
            .and_then(|(_, hex)| Self::parse_hex(&hex[1..]))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut parts = hex.chars().map(|c| {
                    let digit = c.to_digit(16).unwrap_or(0) as u8;
                    digit * 17
                });
                let (r, g, b) = (parts.next()?, parts.next()?, parts.next()?);
                Some(Self::from_rgb8(r, g, b))
            }
            6 | 8 => {
                let r = byte(&hex[0..2])?;
                let g = byte(&hex[2..4])?;
                let b = byte(&hex[4..6])?;
                let a = if hex.len() == 8 { byte(&hex[6..8])? } else { 255 };
                let mut color = Self::from_rgb8(r, g, b);
                color.a = a as f32 / 255.0;
                Some(color)
            }
            _ => None,
        }
    }

    /// Build a color from 3 or 4 normalized components
    pub fn from_components(components: &[f64]) -> Option<Self> {
        if !(3..=4).contains(&components.len()) {
            return None;
        }
        if components.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return None;
        }
        let a = components.get(3).copied().unwrap_or(1.0);
        Some(Self::new(
            components[0] as f32,
            components[1] as f32,
            components[2] as f32,
            a as f32,
        ))
    }

    /// Components as an `[r, g, b, a]` array
    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Hex representation (`#rrggbb` when opaque, `#rrggbbaa` otherwise)
    pub fn to_hex(&self) -> String {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = (to_byte(self.r), to_byte(self.g), to_byte(self.b), to_byte(self.a));
        if a == 255 {
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ==================== Index ====================

/// Index applied to a resolved value: a sequence position or a mapping key
///
/// Negative positions count from the end of the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueIndex {
    Position(i64),
    Key(String),
}

impl fmt::Display for ValueIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueIndex::Position(p) => write!(f, "[{}]", p),
            ValueIndex::Key(k) => write!(f, "[{:?}]", k),
        }
    }
}

/// Why indexing a value failed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndexError {
    /// The value is not a sequence or mapping
    #[error("'{kind}' object is not subscriptable")]
    NotIndexable { kind: &'static str },

    /// Position outside the sequence
    #[error("index {position} out of range for length {len}")]
    OutOfRange { position: i64, len: usize },

    /// Key absent from the mapping
    #[error("key {key:?} not found")]
    MissingKey { key: String },

    /// A mapping indexed by position or a sequence indexed by key
    #[error("{kind} indices must be {expected}")]
    WrongIndexType {
        kind: &'static str,
        expected: &'static str,
    },
}

// ==================== Value ====================

/// A dynamically typed attribute value
#[derive(Clone, Default)]
pub enum Value {
    /// Absence of a value
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Color(Rgba),
    /// Ordered sequence
    Tuple(Vec<Value>),
    /// Ordered keyed mapping
    Map(ValueMap),
    /// Reference to a drawable object (identity semantics)
    Object(DrawableRef),
}

impl Value {
    /// Short name of the value's variant, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Color(_) => "color",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "dict",
            Value::Object(_) => "object",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    /// Numeric view of `Int` and `Float` values
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Color view; strings are parsed as color names or hex codes
    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Value::Color(c) => Some(*c),
            Value::Str(s) => Rgba::parse(s),
            Value::Tuple(items) => {
                let components: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
                components.and_then(|c| Rgba::from_components(&c))
            }
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&DrawableRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Numeric sequence view of a tuple
    pub fn as_f64_vec(&self) -> Option<Vec<f64>> {
        self.as_tuple()
            .and_then(|items| items.iter().map(Value::as_f64).collect())
    }

    /// True for values that support [`Value::index`]
    pub fn is_indexable(&self) -> bool {
        matches!(self, Value::Tuple(_) | Value::Map(_) | Value::Str(_))
    }

    /// Apply a position or key to this value
    pub fn index(&self, index: &ValueIndex) -> std::result::Result<Value, IndexError> {
        match (self, index) {
            (Value::Tuple(items), ValueIndex::Position(p)) => {
                let len = items.len();
                resolve_position(*p, len)
                    .map(|i| items[i].clone())
                    .ok_or(IndexError::OutOfRange { position: *p, len })
            }
            (Value::Str(s), ValueIndex::Position(p)) => {
                let chars: Vec<char> = s.chars().collect();
                let len = chars.len();
                resolve_position(*p, len)
                    .map(|i| Value::Str(chars[i].to_string()))
                    .ok_or(IndexError::OutOfRange { position: *p, len })
            }
            (Value::Map(map), ValueIndex::Key(k)) => map
                .get(k)
                .cloned()
                .ok_or_else(|| IndexError::MissingKey { key: k.clone() }),
            (Value::Map(_), ValueIndex::Position(_)) => Err(IndexError::WrongIndexType {
                kind: "dict",
                expected: "string keys",
            }),
            (Value::Tuple(_) | Value::Str(_), ValueIndex::Key(_)) => {
                Err(IndexError::WrongIndexType {
                    kind: self.kind_name(),
                    expected: "integers",
                })
            }
            (other, _) => Err(IndexError::NotIndexable {
                kind: other.kind_name(),
            }),
        }
    }
}

fn resolve_position(position: i64, len: usize) -> Option<usize> {
    let idx = if position < 0 {
        len as i64 + position
    } else {
        position
    };
    (idx >= 0 && (idx as usize) < len).then_some(idx as usize)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Color(a), Value::Color(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => same_object(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Int(v) => write!(f, "Int({})", v),
            Value::Float(v) => write!(f, "Float({})", v),
            Value::Str(v) => write!(f, "Str({:?})", v),
            Value::Color(c) => write!(f, "Color({})", c),
            Value::Tuple(items) => f.debug_tuple("Tuple").field(items).finish(),
            Value::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Value::Object(obj) => write!(f, "Object(<{} at {:p}>)", obj.type_name(), Arc::as_ptr(obj)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
            Value::Color(c) => write!(f, "{}", c),
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, item)?;
                }
                write!(f, "}}")
            }
            Value::Object(obj) => write!(f, "<{}>", obj.type_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Rgba> for Value {
    fn from(v: Rgba) -> Self {
        Value::Color(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Tuple(v)
    }
}

impl From<ValueMap> for Value {
    fn from(v: ValueMap) -> Self {
        Value::Map(v)
    }
}

impl From<DrawableRef> for Value {
    fn from(v: DrawableRef) -> Self {
        Value::Object(v)
    }
}

impl From<&[f64]> for Value {
    fn from(v: &[f64]) -> Self {
        Value::Tuple(v.iter().copied().map(Value::Float).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse_formats() {
        assert_eq!(Rgba::parse("#ff0000"), Some(Rgba::new(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(Rgba::parse("#f00"), Some(Rgba::new(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(Rgba::parse("none"), Some(Rgba::TRANSPARENT));
        assert_eq!(Rgba::parse("k"), Some(Rgba::BLACK));
        assert_eq!(Rgba::parse("White"), Some(Rgba::WHITE));
        assert!(Rgba::parse("#12345").is_none());
        assert!(Rgba::parse("not-a-color").is_none());
    }

    #[test]
    fn test_color_hex_roundtrip_with_alpha() {
        let color = Rgba::parse("#1f77b480").unwrap();
        assert_eq!(color.to_hex(), "#1f77b480");
        assert_eq!(Rgba::BLACK.to_hex(), "#000000");
    }

    #[test]
    fn test_color_from_components() {
        assert_eq!(
            Rgba::from_components(&[0.0, 1.0, 0.0]),
            Some(Rgba::new(0.0, 1.0, 0.0, 1.0))
        );
        assert!(Rgba::from_components(&[0.0, 1.0]).is_none());
        assert!(Rgba::from_components(&[0.0, 2.0, 0.0]).is_none());
    }

    #[test]
    fn test_index_tuple_positions() {
        let value = Value::Tuple(vec![Value::Int(10), Value::Int(20)]);
        assert_eq!(value.index(&ValueIndex::Position(0)), Ok(Value::Int(10)));
        assert_eq!(value.index(&ValueIndex::Position(-1)), Ok(Value::Int(20)));
        assert_eq!(
            value.index(&ValueIndex::Position(2)),
            Err(IndexError::OutOfRange { position: 2, len: 2 })
        );
    }

    #[test]
    fn test_index_map_keys() {
        let mut map = ValueMap::new();
        map.insert("marker".to_string(), Value::from("o"));
        let value = Value::Map(map);
        assert_eq!(
            value.index(&ValueIndex::Key("marker".into())),
            Ok(Value::from("o"))
        );
        assert!(matches!(
            value.index(&ValueIndex::Key("missing".into())),
            Err(IndexError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_index_scalar_is_not_indexable() {
        assert_eq!(
            Value::Int(5).index(&ValueIndex::Position(0)),
            Err(IndexError::NotIndexable { kind: "int" })
        );
        assert!(!Value::Float(1.0).is_indexable());
    }

    #[test]
    fn test_value_display() {
        let value = Value::Tuple(vec![Value::Float(1.5), Value::from("a")]);
        assert_eq!(value.to_string(), "(1.5, a)");
        assert_eq!(Value::None.to_string(), "None");
    }

    #[test]
    fn test_cross_type_values_are_not_equal() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Int(1).as_f64(), Value::Float(1.0).as_f64());
    }
}
