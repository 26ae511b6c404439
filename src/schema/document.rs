//! Raw schema documents and their validation into [`Schema`]

use indexmap::IndexMap;
use serde::Deserialize;
use std::str::FromStr;

use super::{KindSpec, ScalarKind, Schema, SchemaEntry, SchemaError, TypeSchema, ValueKind};
use crate::resolver::AttributePath;
use crate::types::ValueIndex;

/// Top level: type name -> type declaration
pub(super) type RawDocument = IndexMap<String, RawType>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawType {
    #[serde(default)]
    attributes: IndexMap<String, RawEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawEntry {
    #[serde(rename = "type")]
    kind: String,
    get: String,
    #[serde(default)]
    set: Option<String>,
    #[serde(default)]
    get_index: Option<ValueIndex>,
    #[serde(default)]
    set_parameter: Option<String>,
    #[serde(default)]
    value_options: Option<Vec<String>>,
    #[serde(default)]
    types: Option<RawComponents>,
}

/// `types` is a list for tuples and a mapping for dicts
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawComponents {
    Ordered(Vec<String>),
    Named(IndexMap<String, String>),
}

pub(super) fn compile(raw: RawDocument) -> Result<Schema, SchemaError> {
    let mut types = IndexMap::with_capacity(raw.len());
    for (type_name, raw_type) in raw {
        let mut properties = IndexMap::with_capacity(raw_type.attributes.len());
        for (property, entry) in raw_type.attributes {
            let compiled = compile_entry(&property, entry).map_err(|reason| {
                SchemaError::InvalidEntry {
                    type_name: type_name.clone(),
                    property: property.clone(),
                    reason,
                }
            })?;
            properties.insert(property, compiled);
        }
        types.insert(type_name, TypeSchema { properties });
    }
    Ok(Schema::from_types(types))
}

fn compile_entry(name: &str, raw: RawEntry) -> Result<SchemaEntry, String> {
    let value_kind = ValueKind::from_str(&raw.kind)?;
    let get = AttributePath::parse(&raw.get).map_err(|e| format!("get: {}", e))?;
    let set = raw
        .set
        .as_deref()
        .map(AttributePath::parse)
        .transpose()
        .map_err(|e| format!("set: {}", e))?;

    if let Some(param) = &raw.set_parameter {
        if param.trim().is_empty() {
            return Err("set_parameter must not be empty".to_string());
        }
        if set.is_none() {
            return Err("set_parameter given without a set path".to_string());
        }
    }

    if value_kind != ValueKind::Choice && raw.value_options.is_some() {
        return Err(format!("value_options is only valid for choice, not {}", value_kind));
    }
    if !matches!(value_kind, ValueKind::Tuple | ValueKind::Dict) && raw.types.is_some() {
        return Err(format!("types is only valid for tuple and dict, not {}", value_kind));
    }

    let kind = match value_kind {
        ValueKind::Bool => KindSpec::Bool,
        ValueKind::Int => KindSpec::Int,
        ValueKind::Float => KindSpec::Float,
        ValueKind::String => KindSpec::String,
        ValueKind::Multiline => KindSpec::Multiline,
        ValueKind::Font => KindSpec::Font,
        ValueKind::Color => KindSpec::Color,
        ValueKind::Choice => {
            let options = raw
                .value_options
                .filter(|o| !o.is_empty())
                .ok_or("choice requires a non-empty value_options list")?;
            KindSpec::Choice { options }
        }
        ValueKind::Tuple => match raw.types {
            Some(RawComponents::Ordered(list)) if !list.is_empty() => KindSpec::Tuple {
                components: list
                    .iter()
                    .map(|k| ScalarKind::from_str(k))
                    .collect::<Result<_, _>>()?,
            },
            Some(RawComponents::Named(_)) => {
                return Err("tuple types must be a list".to_string());
            }
            _ => return Err("tuple requires a non-empty types list".to_string()),
        },
        ValueKind::Dict => match raw.types {
            Some(RawComponents::Named(map)) if !map.is_empty() => KindSpec::Dict {
                fields: map
                    .into_iter()
                    .map(|(key, k)| ScalarKind::from_str(&k).map(|kind| (key, kind)))
                    .collect::<Result<_, _>>()?,
            },
            Some(RawComponents::Ordered(_)) => {
                return Err("dict types must be a mapping".to_string());
            }
            _ => return Err("dict requires a non-empty types mapping".to_string()),
        },
    };

    Ok(SchemaEntry {
        name: name.to_string(),
        kind,
        get,
        get_index: raw.get_index,
        set,
        set_parameter: raw.set_parameter,
    })
}
