//! Rhai engine configuration for figure plugins
//!
//! ## Script API
//!
//! The selected object is passed to `run(obj)` as a `Drawable`:
//!
//! - `obj.type_name()` - Runtime type name (`"Axes"`, `"Line2D"`, ...)
//! - `obj.label()` - Label string (empty when unset)
//! - `obj.children()` - Array of child `Drawable`s
//! - `obj.get(path)` / `obj.get(path, index)` - Resolve an attribute path
//! - `obj.set(path, value)` - Apply a value at an attribute path; a map value
//!   becomes named arguments
//! - `obj.invoke(name)` / `obj.invoke(name, #{ key: value })` - Invoke a method
//! - `obj.remove()` - Detach the object from its parent
//!
//! Colors are exchanged as hex strings, tuples as arrays and objects as
//! `Drawable` values. `print` and `debug` go to the application log.

use rhai::{Array, Dynamic, Engine, EvalAltResult, Map, FLOAT, INT};
use std::fmt;

use crate::drawable::{describe, CallArgs, DrawableRef};
use crate::resolver::{resolve_get, resolve_set, AttributePath};
use crate::types::{Value, ValueIndex, ValueMap};

type ScriptResult<T> = std::result::Result<T, Box<EvalAltResult>>;

/// A drawable as seen from scripts
#[derive(Clone)]
pub struct ScriptObject(pub DrawableRef);

impl fmt::Debug for ScriptObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Drawable({})", describe(&self.0))
    }
}

fn script_error(err: impl fmt::Display) -> Box<EvalAltResult> {
    err.to_string().into()
}

fn parse_path(path: &str) -> ScriptResult<AttributePath> {
    AttributePath::parse(path).map_err(script_error)
}

/// Convert a model value into a script value
pub fn value_to_dynamic(value: Value) -> Dynamic {
    match value {
        Value::None => Dynamic::UNIT,
        Value::Bool(v) => Dynamic::from(v),
        Value::Int(v) => Dynamic::from(v as INT),
        Value::Float(v) => Dynamic::from(v as FLOAT),
        Value::Str(s) => Dynamic::from(s),
        Value::Color(c) => Dynamic::from(c.to_hex()),
        Value::Tuple(items) => {
            Dynamic::from_array(items.into_iter().map(value_to_dynamic).collect())
        }
        Value::Map(map) => {
            let mut out = Map::new();
            for (key, item) in map {
                out.insert(key.into(), value_to_dynamic(item));
            }
            Dynamic::from_map(out)
        }
        Value::Object(obj) => Dynamic::from(ScriptObject(obj)),
    }
}

/// Convert a script value into a model value
pub fn dynamic_to_value(value: Dynamic) -> ScriptResult<Value> {
    if value.is_unit() {
        return Ok(Value::None);
    }
    if let Ok(v) = value.as_bool() {
        return Ok(Value::Bool(v));
    }
    if let Ok(v) = value.as_int() {
        return Ok(Value::Int(v));
    }
    if let Ok(v) = value.as_float() {
        return Ok(Value::Float(v));
    }
    if let Ok(c) = value.as_char() {
        return Ok(Value::Str(c.to_string()));
    }
    if value.is_string() {
        return value.into_string().map(Value::Str).map_err(script_error);
    }
    if value.is_array() {
        let items = value.into_array().map_err(script_error)?;
        return items
            .into_iter()
            .map(dynamic_to_value)
            .collect::<ScriptResult<Vec<_>>>()
            .map(Value::Tuple);
    }
    if value.is_map() {
        let map = value
            .try_cast::<Map>()
            .ok_or_else(|| script_error("expected a map"))?;
        let mut out = ValueMap::new();
        for (key, item) in map {
            out.insert(key.to_string(), dynamic_to_value(item)?);
        }
        return Ok(Value::Map(out));
    }
    let type_name = value.type_name();
    value
        .try_cast::<ScriptObject>()
        .map(|obj| Value::Object(obj.0))
        .ok_or_else(|| script_error(format!("unsupported script value of type {}", type_name)))
}

fn map_to_named(map: Map) -> ScriptResult<ValueMap> {
    let mut named = ValueMap::new();
    for (key, item) in map {
        named.insert(key.to_string(), dynamic_to_value(item)?);
    }
    Ok(named)
}

fn get_indexed(obj: &ScriptObject, path: &str, index: ValueIndex) -> ScriptResult<Dynamic> {
    resolve_get(&obj.0, &parse_path(path)?, Some(&index))
        .map(value_to_dynamic)
        .map_err(script_error)
}

/// Configure the Rhai engine with the drawable API and safety limits
pub(crate) fn configure_engine(engine: &mut Engine) {
    // Set safety limits
    engine.set_max_expr_depths(64, 64);
    engine.set_max_call_levels(32);
    engine.set_max_operations(200_000);
    engine.set_max_string_size(10_000);
    engine.set_max_array_size(10_000);
    engine.set_max_map_size(1_000);

    engine.on_print(|text| tracing::info!(target: "figure_forge::plugin", "{}", text));
    engine.on_debug(|text, source, pos| {
        tracing::debug!(
            target: "figure_forge::plugin",
            "{} @ {:?}: {}",
            source.unwrap_or("plugin"),
            pos,
            text
        )
    });

    engine.register_type_with_name::<ScriptObject>("Drawable");

    engine.register_fn("type_name", |obj: &mut ScriptObject| obj.0.type_name());
    engine.register_fn("to_string", |obj: &mut ScriptObject| describe(&obj.0));
    engine.register_fn("to_debug", |obj: &mut ScriptObject| format!("{:?}", obj));

    engine.register_fn("label", |obj: &mut ScriptObject| -> ScriptResult<String> {
        obj.0.label().map_err(script_error)
    });

    engine.register_fn("children", |obj: &mut ScriptObject| -> ScriptResult<Array> {
        obj.0
            .children()
            .map(|children| {
                children
                    .into_iter()
                    .map(|c| Dynamic::from(ScriptObject(c)))
                    .collect()
            })
            .map_err(script_error)
    });

    engine.register_fn(
        "get",
        |obj: &mut ScriptObject, path: &str| -> ScriptResult<Dynamic> {
            resolve_get(&obj.0, &parse_path(path)?, None)
                .map(value_to_dynamic)
                .map_err(script_error)
        },
    );
    engine.register_fn(
        "get",
        |obj: &mut ScriptObject, path: &str, index: INT| -> ScriptResult<Dynamic> {
            get_indexed(obj, path, ValueIndex::Position(index))
        },
    );
    engine.register_fn(
        "get",
        |obj: &mut ScriptObject, path: &str, key: &str| -> ScriptResult<Dynamic> {
            get_indexed(obj, path, ValueIndex::Key(key.to_string()))
        },
    );

    engine.register_fn(
        "set",
        |obj: &mut ScriptObject, path: &str, value: Dynamic| -> ScriptResult<()> {
            let value = dynamic_to_value(value)?;
            resolve_set(&obj.0, &parse_path(path)?, value).map_err(script_error)
        },
    );

    engine.register_fn(
        "invoke",
        |obj: &mut ScriptObject, name: &str| -> ScriptResult<Dynamic> {
            obj.0
                .invoke(name, CallArgs::none())
                .map(value_to_dynamic)
                .map_err(script_error)
        },
    );
    engine.register_fn(
        "invoke",
        |obj: &mut ScriptObject, name: &str, args: Map| -> ScriptResult<Dynamic> {
            let named = map_to_named(args)?;
            obj.0
                .invoke(name, CallArgs::named(named))
                .map(value_to_dynamic)
                .map_err(script_error)
        },
    );

    engine.register_fn("remove", |obj: &mut ScriptObject| -> ScriptResult<()> {
        obj.0.remove().map_err(script_error)
    });

    engine.register_fn("==", |a: &mut ScriptObject, b: ScriptObject| {
        crate::drawable::same_object(&a.0, &b.0)
    });
    engine.register_fn("!=", |a: &mut ScriptObject, b: ScriptObject| {
        !crate::drawable::same_object(&a.0, &b.0)
    });
}
