//! Property binding surface
//!
//! Turns a selected object into the ordered list of fields shown by the
//! property inspector, and turns an edited field back into a setter call.
//!
//! The surface is either empty or bound to one object. Binding always clears
//! and redescribes; there is no incremental diffing. After an edit the bound
//! object is described again so the inspector mirrors the object's actual
//! post-set state.

use std::sync::Arc;
use thiserror::Error;

use crate::drawable::{describe as describe_object, DrawableRef, WeakDrawable};
use crate::resolver::{resolve_get, resolve_set_with, ResolveError};
use crate::schema::{KindSpec, Schema, SchemaError};
use crate::types::Value;

/// Errors produced while applying an edit
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("No schema entries for type '{type_name}'")]
    UnknownType { type_name: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Property '{name}' of {type_name} is read-only")]
    ReadOnly { type_name: String, name: String },

    #[error("Setting {type_name}.{name} failed: {source}")]
    Apply {
        type_name: String,
        name: String,
        #[source]
        source: ResolveError,
    },

    #[error("The bound object no longer exists")]
    Stale,

    #[error("No object is bound")]
    Unbound,
}

/// One editable field
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyField {
    pub name: String,
    pub kind: KindSpec,
    pub value: Value,
    pub read_only: bool,
}

impl PropertyField {
    pub fn choices(&self) -> Option<&[String]> {
        self.kind.choices()
    }
}

/// A declared property whose getter failed
#[derive(Debug, Clone, PartialEq)]
pub struct UnavailableField {
    pub name: String,
    pub error: String,
}

/// Snapshot of an object's declared properties
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Description {
    pub type_name: String,
    pub fields: Vec<PropertyField>,
    pub unavailable: Vec<UnavailableField>,
}

impl Description {
    pub fn field(&self, name: &str) -> Option<&PropertyField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.unavailable.is_empty()
    }
}

/// Emitted after a successful edit
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChanged {
    pub name: String,
    pub value: Value,
}

/// Describe `obj` using the properties declared for its type
pub fn describe(schema: &Schema, obj: &DrawableRef) -> Description {
    let type_name = obj.type_name();
    let mut description = Description {
        type_name: type_name.clone(),
        ..Default::default()
    };

    let Some(type_schema) = schema.type_schema(&type_name) else {
        tracing::debug!("No schema for {}; nothing to edit", type_name);
        return description;
    };

    for entry in type_schema.properties() {
        match resolve_get(obj, &entry.get, entry.get_index.as_ref()) {
            Ok(value) => description.fields.push(PropertyField {
                name: entry.name.clone(),
                kind: entry.kind.clone(),
                value,
                read_only: entry.is_read_only(),
            }),
            Err(e) => {
                tracing::warn!("Skipping {}.{}: {}", type_name, entry.name, e);
                description.unavailable.push(UnavailableField {
                    name: entry.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    description
}

/// Apply `value` to the property `name` of `obj`
pub fn apply(
    schema: &Schema,
    obj: &DrawableRef,
    name: &str,
    value: Value,
) -> Result<PropertyChanged, BindingError> {
    let type_name = obj.type_name();
    let entry = schema
        .lookup(&type_name, name)?
        .ok_or_else(|| BindingError::UnknownType {
            type_name: type_name.clone(),
        })?;

    let Some(set) = &entry.set else {
        return Err(BindingError::ReadOnly {
            type_name,
            name: name.to_string(),
        });
    };

    resolve_set_with(obj, set, value.clone(), entry.set_parameter.as_deref()).map_err(
        |source| BindingError::Apply {
            type_name: type_name.clone(),
            name: name.to_string(),
            source,
        },
    )?;

    tracing::debug!("{}.{} = {}", describe_object(obj), name, value);
    Ok(PropertyChanged {
        name: name.to_string(),
        value,
    })
}

/// Binding state
#[derive(Default)]
enum BindingState {
    #[default]
    Empty,
    Bound {
        object: WeakDrawable,
        description: Description,
    },
}

/// The inspector's view of the selected object
#[derive(Default)]
pub struct BindingSurface {
    state: BindingState,
}

impl BindingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to `obj`, replacing any previous binding
    pub fn bind(&mut self, schema: &Schema, obj: &DrawableRef) {
        self.clear();
        let description = describe(schema, obj);
        self.state = BindingState::Bound {
            object: Arc::downgrade(obj),
            description,
        };
    }

    pub fn clear(&mut self) {
        self.state = BindingState::Empty;
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, BindingState::Bound { .. })
    }

    /// The bound object, if it is still alive
    pub fn object(&self) -> Option<DrawableRef> {
        match &self.state {
            BindingState::Bound { object, .. } => object.upgrade(),
            BindingState::Empty => None,
        }
    }

    /// The last description of the bound object
    pub fn description(&self) -> Option<&Description> {
        match &self.state {
            BindingState::Bound { description, .. } => Some(description),
            BindingState::Empty => None,
        }
    }

    fn live_object(&self) -> Result<DrawableRef, BindingError> {
        match &self.state {
            BindingState::Empty => Err(BindingError::Unbound),
            BindingState::Bound { object, .. } => object.upgrade().ok_or(BindingError::Stale),
        }
    }

    /// Describe the bound object again
    pub fn refresh(&mut self, schema: &Schema) -> Result<(), BindingError> {
        let obj = self.live_object()?;
        self.bind(schema, &obj);
        Ok(())
    }

    /// Apply an edit to the bound object, then redescribe it
    ///
    /// The object is redescribed whether or not the edit succeeds.
    pub fn apply(
        &mut self,
        schema: &Schema,
        name: &str,
        value: Value,
    ) -> Result<PropertyChanged, BindingError> {
        let obj = self.live_object()?;
        let result = apply(schema, &obj, name, value);
        self.bind(schema, &obj);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::Artist;

    const SCHEMA: &str = r#"{
        "Line2D": { "attributes": {
            "width": { "type": "float", "get": "get_linewidth", "set": "set_linewidth" },
            "broken": { "type": "float", "get": "get_thickness", "set": "set_thickness" },
            "style": { "type": "choice", "get": "get_linestyle", "set": "set_linestyle",
                       "value_options": ["-", "--"] },
            "xrange": { "type": "float", "get": "get_xdata", "get_index": 0 }
        }}
    }"#;

    fn line() -> DrawableRef {
        let fig = Artist::figure();
        let ax = fig.add_axes("a").unwrap();
        ax.plot(&[2.0, 3.0], &[0.0, 1.0]).unwrap()
    }

    #[test]
    fn test_describe_skips_failing_fields_in_order() {
        let schema = Schema::from_json_str(SCHEMA).unwrap();
        let obj = line();
        let description = describe(&schema, &obj);

        let names: Vec<_> = description.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["width", "style", "xrange"]);
        assert_eq!(description.unavailable.len(), 1);
        assert_eq!(description.unavailable[0].name, "broken");
        assert_eq!(description.field("xrange").unwrap().value, Value::Float(2.0));
        assert!(description.field("xrange").unwrap().read_only);
    }

    #[test]
    fn test_describe_unknown_type_is_empty() {
        let schema = Schema::from_json_str(SCHEMA).unwrap();
        let fig: DrawableRef = Artist::figure();
        let description = describe(&schema, &fig);
        assert_eq!(description.type_name, "Figure");
        assert!(description.is_empty());
    }

    #[test]
    fn test_apply_errors() {
        let schema = Schema::from_json_str(SCHEMA).unwrap();
        let obj = line();
        assert!(matches!(
            apply(&schema, &obj, "xrange", Value::Float(1.0)),
            Err(BindingError::ReadOnly { .. })
        ));
        assert!(matches!(
            apply(&schema, &obj, "height", Value::Float(1.0)),
            Err(BindingError::Schema(SchemaError::UnknownProperty { .. }))
        ));
        assert!(matches!(
            apply(&schema, &obj, "style", Value::from("wavy")),
            Err(BindingError::Apply { .. })
        ));
    }

    #[test]
    fn test_surface_apply_redescribes() {
        let schema = Schema::from_json_str(SCHEMA).unwrap();
        let obj = line();
        let mut surface = BindingSurface::new();
        surface.bind(&schema, &obj);

        let changed = surface.apply(&schema, "width", Value::Float(3.0)).unwrap();
        assert_eq!(changed.value, Value::Float(3.0));
        assert_eq!(
            surface.description().unwrap().field("width").unwrap().value,
            Value::Float(3.0)
        );
    }

    #[test]
    fn test_surface_stale_and_unbound() {
        let schema = Schema::from_json_str(SCHEMA).unwrap();
        let mut surface = BindingSurface::new();
        assert!(matches!(surface.refresh(&schema), Err(BindingError::Unbound)));

        let obj: DrawableRef = Artist::figure();
        surface.bind(&schema, &obj);
        drop(obj);
        assert!(matches!(surface.refresh(&schema), Err(BindingError::Stale)));
    }
}
