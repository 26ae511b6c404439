//! Figure documents
//!
//! A figure is saved as pretty-printed JSON mirroring the artist tree. Each
//! node records its kind, the slot it occupies in its parent (if any), its
//! properties and its children. Colors are written as `#rrggbbaa` strings and
//! coerced back by the model on load.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use super::{Artist, ArtistKind};
use crate::error::{ForgeError, Result, ResultExt};
use crate::types::Value;

/// Current document format version
pub const FORMAT_VERSION: u32 = 1;

/// File extension used by the editor's save dialog
pub const DOCUMENT_EXTENSION: &str = "forge";

/// A saved figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureDocument {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    pub root: ArtistDocument,
}

fn default_format_version() -> u32 {
    FORMAT_VERSION
}

/// One artist of a saved figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistDocument {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    #[serde(default)]
    pub properties: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub children: Vec<ArtistDocument>,
}

fn value_to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        Value::None | Value::Object(_) => Json::Null,
        Value::Bool(v) => Json::Bool(*v),
        Value::Int(v) => Json::from(*v),
        Value::Float(v) => serde_json::Number::from_f64(*v)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        Value::Str(s) => Json::String(s.clone()),
        Value::Color(c) => {
            let [r, g, b, a] = c.to_array().map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8);
            Json::String(format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a))
        }
        Value::Tuple(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Map(map) => Json::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect(),
        ),
    }
}

fn json_to_value(json: &serde_json::Value) -> Value {
    use serde_json::Value as Json;
    match json {
        Json::Null => Value::None,
        Json::Bool(v) => Value::Bool(*v),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::Str(s.clone()),
        Json::Array(items) => Value::Tuple(items.iter().map(json_to_value).collect()),
        Json::Object(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_value(v)))
                .collect(),
        ),
    }
}

impl ArtistDocument {
    fn capture(artist: &Artist, slot: Option<&str>) -> Self {
        let properties = artist
            .properties()
            .unwrap_or_default()
            .iter()
            .map(|(name, value)| (name.clone(), value_to_json(value)))
            .collect();
        let children = artist
            .child_artists()
            .iter()
            .map(|child| ArtistDocument::capture(child, artist.slot_of(child)))
            .collect();
        Self {
            kind: artist.kind().type_name().to_string(),
            slot: slot.map(str::to_string),
            properties,
            children,
        }
    }

    fn kind(&self) -> Result<ArtistKind> {
        self.kind.parse().map_err(ForgeError::Document)
    }

    fn apply_to(&self, artist: &Artist) -> Result<()> {
        for (name, json) in &self.properties {
            artist
                .set_property(name, json_to_value(json))
                .with_context(|| format!("{}.{}", self.kind, name))?;
        }

        for child in &self.children {
            let kind = child.kind()?;
            let slot = match &child.slot {
                Some(name) => Some(artist.kind().slot(name).map(|s| s.name).ok_or_else(|| {
                    ForgeError::Document(format!("{} has no slot '{}'", self.kind, name))
                })?),
                None => None,
            };

            // Built-in children already exist; fill them in place.
            let existing = match slot {
                Some(name) => artist.slot(name).filter(|a| a.kind() == kind),
                None if kind == ArtistKind::Spine => child
                    .properties
                    .get("label")
                    .and_then(|l| l.as_str())
                    .and_then(|side| artist.spine(side)),
                None => None,
            };

            match existing {
                Some(target) => child.apply_to(&target)?,
                None => {
                    let target = Artist::new(kind);
                    child.apply_to(&target)?;
                    artist.attach(target, slot);
                }
            }
        }
        Ok(())
    }
}

impl FigureDocument {
    /// Capture the current state of a figure
    pub fn capture(root: &Artist) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            root: ArtistDocument::capture(root, None),
        }
    }

    /// Build a fresh object graph from this document
    pub fn instantiate(&self) -> Result<Arc<Artist>> {
        if self.format_version > FORMAT_VERSION {
            return Err(ForgeError::Document(format!(
                "unsupported format version {}",
                self.format_version
            )));
        }
        let kind = self.root.kind()?;
        if kind != ArtistKind::Figure {
            return Err(ForgeError::Document(format!(
                "document root must be a Figure, found {}",
                kind
            )));
        }
        let root = Artist::new(kind);
        self.root.apply_to(&root)?;
        Ok(root)
    }
}

/// Save a figure as pretty JSON
pub fn save_figure(root: &Artist, path: &Path) -> Result<()> {
    let document = FigureDocument::capture(root);
    let text = serde_json::to_string_pretty(&document)?;
    std::fs::write(path, text)
        .map_err(ForgeError::from)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Saved figure to {:?}", path);
    Ok(())
}

/// Load a figure saved with [`save_figure`]
pub fn load_figure(path: &Path) -> Result<Arc<Artist>> {
    let text = std::fs::read_to_string(path)
        .map_err(ForgeError::from)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document: FigureDocument = serde_json::from_str(&text)
        .map_err(|e| ForgeError::Document(format!("{}: {}", path.display(), e)))?;
    let root = document.instantiate()?;
    tracing::info!("Loaded figure from {:?}", path);
    Ok(root)
}
