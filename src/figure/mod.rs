//! In-memory plotting model
//!
//! A small matplotlib-flavoured object graph: a [`Artist`] of kind
//! `Figure` owns `Axes`, which own lines, text, spines, axis objects and an
//! optional legend. Every artist implements [`Drawable`] with the usual
//! accessor protocol:
//!
//! - `get_<prop>()` / `set_<prop>(value)` for every property
//!   (`set_<prop>(**params)` when the property declares named parameters)
//! - plain fields for field-exposed properties such as `zorder`
//! - named child slots as fields (`title`, `xaxis`, `yaxis`, `label`,
//!   `legend_`) plus slot getters (`get_xaxis`, `get_legend`, ...)
//! - `get_children()`, `set(**kwargs)`, `properties()`, `remove()`
//!
//! Setters coerce and validate their input and raise [`DrawableError`] for
//! anything they cannot accept.

pub mod demo;
pub mod document;
pub mod kinds;

pub use demo::demo_figure;
pub use document::{load_figure, save_figure, FigureDocument};
pub use kinds::{ArtistKind, PropDef, PropType};

use indexmap::IndexMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use crate::drawable::{Attribute, CallArgs, Drawable, DrawableError, DrawableRef};
use crate::types::{Value, ValueMap};

/// Names of the four spines created with every `Axes`
pub const SPINE_NAMES: [&str; 4] = ["left", "right", "bottom", "top"];

#[derive(Clone)]
struct Child {
    slot: Option<&'static str>,
    artist: Arc<Artist>,
}

#[derive(Default)]
struct ArtistState {
    props: IndexMap<&'static str, Value>,
    children: Vec<Child>,
    parent: Weak<Artist>,
}

/// A node of the figure model
pub struct Artist {
    kind: ArtistKind,
    self_ref: Weak<Artist>,
    state: RwLock<ArtistState>,
}

impl std::fmt::Debug for Artist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artist")
            .field("kind", &self.kind)
            .field("label", &self.label_text())
            .finish()
    }
}

fn poisoned<T>(_: T) -> DrawableError {
    DrawableError::Failed("artist state lock poisoned".to_string())
}

impl Artist {
    /// Create an artist with default properties and its built-in children
    pub fn new(kind: ArtistKind) -> Arc<Self> {
        let props = kind
            .props()
            .iter()
            .map(|def| (def.name, def.default.to_value()))
            .collect();

        let artist = Arc::new_cyclic(|self_ref| Artist {
            kind,
            self_ref: self_ref.clone(),
            state: RwLock::new(ArtistState {
                props,
                ..Default::default()
            }),
        });

        if kind == ArtistKind::Axes {
            for name in SPINE_NAMES {
                let spine = Artist::new(ArtistKind::Spine);
                spine.store("label", Value::from(name));
                artist.attach(spine, None);
            }
        }
        for slot in kind.slots() {
            if let Some(child_kind) = slot.created {
                artist.attach(Artist::new(child_kind), Some(slot.name));
            }
        }

        artist
    }

    /// Create an empty figure
    pub fn figure() -> Arc<Self> {
        Self::new(ArtistKind::Figure)
    }

    pub fn kind(&self) -> ArtistKind {
        self.kind
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, ArtistState>, DrawableError> {
        self.state.read().map_err(poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ArtistState>, DrawableError> {
        self.state.write().map_err(poisoned)
    }

    fn no_attribute(&self, name: &str) -> DrawableError {
        DrawableError::NoAttribute {
            type_name: self.kind.type_name().to_string(),
            name: name.to_string(),
        }
    }

    fn require_kind(&self, kind: ArtistKind, operation: &str) -> Result<(), DrawableError> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(DrawableError::Unsupported {
                type_name: self.kind.type_name().to_string(),
                operation: operation.to_string(),
            })
        }
    }

    fn label_text(&self) -> String {
        self.property("label")
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    // ==================== Properties ====================

    /// Current value of a property
    pub fn property(&self, name: &str) -> Result<Value, DrawableError> {
        self.read()?
            .props
            .get(name)
            .cloned()
            .ok_or_else(|| self.no_attribute(name))
    }

    /// Coerce and store a property value, bypassing the read-only flag
    pub fn set_property(&self, name: &str, value: Value) -> Result<(), DrawableError> {
        let def = self.kind.prop(name).ok_or_else(|| self.no_attribute(name))?;
        let value = coerce(self.kind, def, value)?;
        self.write()?.props.insert(def.name, value);
        Ok(())
    }

    /// Store an already valid value; unknown names are ignored
    fn store(&self, name: &str, value: Value) {
        if let (Some(def), Ok(mut state)) = (self.kind.prop(name), self.state.write()) {
            state.props.insert(def.name, value);
        }
    }

    /// All properties in declaration order
    pub fn properties(&self) -> Result<ValueMap, DrawableError> {
        Ok(self
            .read()?
            .props
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect())
    }

    fn apply_setter(&self, def: &'static PropDef, args: CallArgs) -> Result<(), DrawableError> {
        let method = format!("set_{}", def.name);
        let value = match (args.positional.len(), args.named.len()) {
            (1, 0) => args.positional.into_iter().next().unwrap_or_default(),
            (0, n) if n > 0 => self.value_from_named(def, &method, &args.named)?,
            _ => {
                return Err(DrawableError::Type(format!(
                    "{}() takes exactly one argument",
                    method
                )))
            }
        };
        let value = coerce(self.kind, def, value)?;
        self.write()?.props.insert(def.name, value);
        Ok(())
    }

    /// Build a setter value from named parameters; with several parameters
    /// each one replaces a single component of the current tuple.
    fn value_from_named(
        &self,
        def: &PropDef,
        method: &str,
        named: &ValueMap,
    ) -> Result<Value, DrawableError> {
        if let Some(key) = named.keys().find(|k| !def.params.contains(&k.as_str())) {
            return Err(DrawableError::Type(format!(
                "{}() got an unexpected keyword argument '{}'",
                method, key
            )));
        }

        match def.params {
            [single] => Ok(named.get(*single).cloned().unwrap_or_default()),
            params => {
                let mut components = match self.property(def.name)? {
                    Value::Tuple(items) if items.len() == params.len() => items,
                    _ => vec![Value::None; params.len()],
                };
                for (slot, param) in components.iter_mut().zip(params.iter()) {
                    if let Some(value) = named.get(*param) {
                        *slot = value.clone();
                    }
                }
                if components.iter().any(Value::is_none) {
                    return Err(DrawableError::Type(format!(
                        "{}() missing required arguments {:?}",
                        method, params
                    )));
                }
                Ok(Value::Tuple(components))
            }
        }
    }

    /// Validate a batch of keyword properties, then store them all
    fn set_many(&self, method: &str, named: ValueMap) -> Result<(), DrawableError> {
        let mut validated = Vec::with_capacity(named.len());
        for (key, value) in named {
            let def = self
                .kind
                .prop(&key)
                .filter(|d| !d.read_only)
                .ok_or_else(|| {
                    DrawableError::Type(format!(
                        "{}.{}() got an unexpected keyword argument '{}'",
                        self.kind, method, key
                    ))
                })?;
            validated.push((def.name, coerce(self.kind, def, value)?));
        }

        let mut state = self.write()?;
        for (name, value) in validated {
            state.props.insert(name, value);
        }
        Ok(())
    }

    // ==================== Children ====================

    /// Attach `child` as the last child (or into `slot`, replacing the
    /// previous occupant)
    pub fn attach(&self, child: Arc<Artist>, slot: Option<&'static str>) {
        if let Ok(mut child_state) = child.state.write() {
            child_state.parent = self.self_ref.clone();
        }
        if let Ok(mut state) = self.state.write() {
            if let Some(name) = slot {
                state.children.retain(|c| c.slot != Some(name));
            }
            state.children.push(Child {
                slot,
                artist: child,
            });
        }
    }

    fn child_rank(&self, child: &Child) -> usize {
        match child.slot {
            Some(name) => {
                2 + self
                    .kind
                    .slots()
                    .iter()
                    .position(|s| s.name == name)
                    .unwrap_or_default()
            }
            None if child.artist.kind == ArtistKind::Spine => 1,
            None => 0,
        }
    }

    /// Children in display order: content first, then spines, then slots
    pub fn child_artists(&self) -> Vec<Arc<Artist>> {
        let Ok(state) = self.read() else {
            return Vec::new();
        };
        let mut children: Vec<&Child> = state.children.iter().collect();
        children.sort_by_key(|c| self.child_rank(c));
        let artists = children.into_iter().map(|c| c.artist.clone()).collect();
        artists
    }

    /// Children of one kind in display order
    pub fn children_of_kind(&self, kind: ArtistKind) -> Vec<Arc<Artist>> {
        self.child_artists()
            .into_iter()
            .filter(|c| c.kind == kind)
            .collect()
    }

    /// Occupant of a named slot
    pub fn slot(&self, name: &str) -> Option<Arc<Artist>> {
        self.read()
            .ok()?
            .children
            .iter()
            .find(|c| c.slot == Some(name))
            .map(|c| c.artist.clone())
    }

    /// Slot name under which `child` is attached, if any
    pub(crate) fn slot_of(&self, child: &Artist) -> Option<&'static str> {
        self.read()
            .ok()?
            .children
            .iter()
            .find(|c| std::ptr::eq(Arc::as_ptr(&c.artist), child))
            .and_then(|c| c.slot)
    }

    pub fn parent(&self) -> Option<Arc<Artist>> {
        self.read().ok()?.parent.upgrade()
    }

    /// The spine with the given side name
    pub fn spine(&self, side: &str) -> Option<Arc<Artist>> {
        self.children_of_kind(ArtistKind::Spine)
            .into_iter()
            .find(|s| s.label_text() == side)
    }

    fn detach(&self) -> Result<(), DrawableError> {
        if self.kind == ArtistKind::Figure {
            return Err(DrawableError::Unsupported {
                type_name: self.kind.type_name().to_string(),
                operation: "remove".to_string(),
            });
        }
        let parent = self
            .parent()
            .ok_or_else(|| DrawableError::Failed("artist is not attached to a parent".into()))?;
        parent
            .write()?
            .children
            .retain(|c| !std::ptr::eq(Arc::as_ptr(&c.artist), self));
        self.write()?.parent = Weak::new();
        Ok(())
    }

    // ==================== Builders ====================

    /// Add an `Axes` to a figure
    pub fn add_axes(&self, label: &str) -> Result<Arc<Artist>, DrawableError> {
        self.require_kind(ArtistKind::Figure, "add_axes")?;
        let axes = Artist::new(ArtistKind::Axes);
        axes.store("label", Value::from(label));
        self.attach(axes.clone(), None);
        Ok(axes)
    }

    /// Add a line to an `Axes` and rescale its limits to the data
    pub fn plot(&self, xs: &[f64], ys: &[f64]) -> Result<Arc<Artist>, DrawableError> {
        self.require_kind(ArtistKind::Axes, "plot")?;
        let line = Artist::new(ArtistKind::Line2D);
        line.store("xdata", Value::from(xs));
        line.store("ydata", Value::from(ys));
        self.attach(line.clone(), None);
        self.autoscale();
        Ok(line)
    }

    /// Add a text artist to an `Axes`
    pub fn add_text(&self, x: f64, y: f64, s: &str) -> Result<Arc<Artist>, DrawableError> {
        self.require_kind(ArtistKind::Axes, "text")?;
        let text = Artist::new(ArtistKind::Text);
        text.store("position", Value::from(&[x, y][..]));
        text.store("text", Value::from(s));
        self.attach(text.clone(), None);
        Ok(text)
    }

    /// Create or replace the legend of an `Axes`
    pub fn add_legend(&self) -> Result<Arc<Artist>, DrawableError> {
        self.require_kind(ArtistKind::Axes, "legend")?;
        let legend = Artist::new(ArtistKind::Legend);
        self.attach(legend.clone(), Some("legend_"));
        Ok(legend)
    }

    /// Recompute data intervals, limits and ticks of an `Axes` from its lines
    pub fn autoscale(&self) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for line in self.children_of_kind(ArtistKind::Line2D) {
            xs.extend(line.property("xdata").ok().and_then(|v| v.as_f64_vec()).unwrap_or_default());
            ys.extend(line.property("ydata").ok().and_then(|v| v.as_f64_vec()).unwrap_or_default());
        }

        for (values, lim, axis) in [(xs, "xlim", "xaxis"), (ys, "ylim", "yaxis")] {
            let Some((lo, hi)) = data_range(&values) else {
                continue;
            };
            let margin = if hi > lo { (hi - lo) * 0.05 } else { 0.5 };
            self.store(lim, Value::from(&[lo - margin, hi + margin][..]));
            if let Some(axis) = self.slot(axis) {
                axis.store("data_interval", Value::from(&[lo, hi][..]));
                axis.store("ticks", Value::from(nice_ticks(lo - margin, hi + margin).as_slice()));
            }
        }
    }

    fn build_with(&self, artist: Arc<Artist>, method: &str, named: ValueMap) -> Result<Value, DrawableError> {
        artist.set_many(method, named)?;
        let obj: DrawableRef = artist;
        Ok(Value::Object(obj))
    }

    fn call_extra(&self, name: &str, args: CallArgs) -> Result<Value, DrawableError> {
        let only_named = |args: &CallArgs| {
            if args.positional.is_empty() {
                Ok(())
            } else {
                Err(DrawableError::Type(format!(
                    "{}.{}() takes keyword arguments only",
                    self.kind, name
                )))
            }
        };

        match name {
            "get_children" => Ok(Value::Tuple(
                self.child_artists()
                    .into_iter()
                    .map(|c| Value::Object(c as DrawableRef))
                    .collect(),
            )),
            "properties" => Ok(Value::Map(self.properties()?)),
            "set" => {
                only_named(&args)?;
                self.set_many("set", args.named).map(|_| Value::None)
            }
            "remove" => self.detach().map(|_| Value::None),
            "get_lines" => Ok(objects(self.children_of_kind(ArtistKind::Line2D))),
            // An axis answers with the axes it belongs to
            "get_axes" if matches!(self.kind, ArtistKind::XAxis | ArtistKind::YAxis) => {
                Ok(self.parent().map_or(Value::None, |p| Value::Object(p as DrawableRef)))
            }
            "get_axes" => Ok(objects(self.children_of_kind(ArtistKind::Axes))),
            "legend" => {
                only_named(&args)?;
                // Validate on a detached legend first so a bad keyword leaves
                // the axes untouched.
                let legend = Artist::new(ArtistKind::Legend);
                let value = self.build_with(legend.clone(), "legend", args.named)?;
                self.attach(legend, Some("legend_"));
                Ok(value)
            }
            "text" => {
                let mut named = args.named;
                let mut positional = args.positional.into_iter();
                let mut take = |key: &str| named.shift_remove(key).or_else(|| positional.next());
                let (x, y, s) = (take("x"), take("y"), take("s"));
                let (Some(x), Some(y), Some(s)) = (
                    x.as_ref().and_then(Value::as_f64),
                    y.as_ref().and_then(Value::as_f64),
                    s.as_ref().and_then(|v| v.as_str().map(str::to_string)),
                ) else {
                    return Err(DrawableError::Type(
                        "Axes.text() requires x, y and s".to_string(),
                    ));
                };
                let text = Artist::new(ArtistKind::Text);
                text.store("position", Value::from(&[x, y][..]));
                text.store("text", Value::from(s));
                let value = self.build_with(text.clone(), "text", named)?;
                self.attach(text, None);
                Ok(value)
            }
            "plot" => {
                only_named(&args)?;
                let mut named = args.named;
                let xdata = named.shift_remove("xdata").unwrap_or_default();
                let ydata = named.shift_remove("ydata").unwrap_or_default();
                let line = Artist::new(ArtistKind::Line2D);
                line.set_property("xdata", xdata)?;
                line.set_property("ydata", ydata)?;
                let value = self.build_with(line.clone(), "plot", named)?;
                self.attach(line, None);
                self.autoscale();
                Ok(value)
            }
            _ => Err(self.no_attribute(name)),
        }
    }
}

fn objects(artists: Vec<Arc<Artist>>) -> Value {
    Value::Tuple(
        artists
            .into_iter()
            .map(|a| Value::Object(a as DrawableRef))
            .collect(),
    )
}

fn data_range(values: &[f64]) -> Option<(f64, f64)> {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    (lo <= hi).then_some((lo, hi))
}

/// Evenly spaced round tick locations covering `lo..=hi`
pub fn nice_ticks(lo: f64, hi: f64) -> Vec<f64> {
    if hi <= lo || !lo.is_finite() || !hi.is_finite() {
        return vec![lo];
    }
    let raw = (hi - lo) / 5.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(raw);

    let mut ticks = Vec::new();
    let mut tick = (lo / step).ceil() * step;
    while tick <= hi + step * 1e-9 {
        ticks.push((tick / step).round() * step);
        tick += step;
    }
    ticks
}

/// Convert `value` into the representation stored for `def`
pub(crate) fn coerce(kind: ArtistKind, def: &PropDef, value: Value) -> Result<Value, DrawableError> {
    let wrong_type = |expected: &str, value: &Value| {
        DrawableError::Type(format!(
            "{}.set_{}() expects {}, got {}",
            kind,
            def.name,
            expected,
            value.kind_name()
        ))
    };
    let invalid = |message: String| DrawableError::InvalidValue {
        name: def.name.to_string(),
        message,
    };

    if value.is_none() {
        return if def.nullable {
            Ok(Value::None)
        } else {
            Err(wrong_type("a value", &value))
        };
    }

    match def.ty {
        PropType::Bool => value
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| wrong_type("bool", &value)),
        PropType::Int => value
            .as_int()
            .map(Value::Int)
            .ok_or_else(|| wrong_type("int", &value)),
        PropType::Float => match value.as_f64() {
            Some(v) if v.is_finite() => Ok(Value::Float(v)),
            Some(v) => Err(invalid(format!("{} is not finite", v))),
            None => Err(wrong_type("float", &value)),
        },
        PropType::Str => match value {
            Value::Str(s) => Ok(Value::Str(s)),
            other => Err(wrong_type("str", &other)),
        },
        PropType::Color => match value.as_color() {
            Some(color) => Ok(Value::Color(color)),
            None if matches!(value, Value::Str(_) | Value::Tuple(_)) => {
                Err(invalid(format!("'{}' is not a valid color", value)))
            }
            None => Err(wrong_type("color", &value)),
        },
        PropType::Choice(options) => match value {
            Value::Str(s) if options.contains(&s.as_str()) => Ok(Value::Str(s)),
            Value::Str(s) => Err(invalid(format!("'{}' is not one of {:?}", s, options))),
            other => Err(wrong_type("str", &other)),
        },
        PropType::Floats(len) => {
            let items = value
                .as_f64_vec()
                .ok_or_else(|| wrong_type("a sequence of numbers", &value))?;
            match len {
                Some(n) if items.len() != n => {
                    Err(invalid(format!("expected {} values, got {}", n, items.len())))
                }
                _ => Ok(Value::from(items.as_slice())),
            }
        }
    }
}

impl Drawable for Artist {
    fn type_name(&self) -> String {
        self.kind.type_name().to_string()
    }

    fn label(&self) -> Result<String, DrawableError> {
        Ok(self.property("label")?.as_str().unwrap_or_default().to_string())
    }

    fn children(&self) -> Result<Vec<DrawableRef>, DrawableError> {
        // Propagate a poisoned lock instead of reporting no children.
        drop(self.read()?);
        Ok(self
            .child_artists()
            .into_iter()
            .map(|c| c as DrawableRef)
            .collect())
    }

    fn attribute(&self, name: &str) -> Result<Attribute, DrawableError> {
        if let Some(prop) = name.strip_prefix("get_") {
            if self.kind.prop(prop).is_some() {
                return Ok(Attribute::Method);
            }
        }
        if let Some(prop) = name.strip_prefix("set_") {
            if self.kind.prop(prop).is_some_and(|d| !d.read_only) {
                return Ok(Attribute::Method);
            }
        }
        if self.kind.slots().iter().any(|s| s.getter == Some(name))
            || self.kind.extra_methods().contains(&name)
        {
            return Ok(Attribute::Method);
        }
        if self.kind.slot(name).is_some() {
            let value = self
                .slot(name)
                .map(|a| Value::Object(a as DrawableRef))
                .unwrap_or_default();
            return Ok(Attribute::Field(value));
        }
        match self.kind.prop(name) {
            Some(def) if def.field => Ok(Attribute::Field(self.property(name)?)),
            _ => Err(self.no_attribute(name)),
        }
    }

    fn invoke(&self, name: &str, args: CallArgs) -> Result<Value, DrawableError> {
        if let Some(prop) = name.strip_prefix("get_") {
            if let Some(def) = self.kind.prop(prop) {
                if !args.is_empty() {
                    return Err(DrawableError::Type(format!("{}() takes no arguments", name)));
                }
                return self.property(def.name);
            }
        }
        if let Some(prop) = name.strip_prefix("set_") {
            if let Some(def) = self.kind.prop(prop).filter(|d| !d.read_only) {
                return self.apply_setter(def, args).map(|_| Value::None);
            }
        }
        if let Some(slot) = self.kind.slots().iter().find(|s| s.getter == Some(name)) {
            return Ok(self
                .slot(slot.name)
                .map(|a| Value::Object(a as DrawableRef))
                .unwrap_or_default());
        }
        if self.kind.extra_methods().contains(&name) {
            return self.call_extra(name, args);
        }

        match self.attribute(name) {
            Ok(Attribute::Field(_)) => Err(DrawableError::NotCallable {
                type_name: self.type_name(),
                name: name.to_string(),
            }),
            Ok(Attribute::Method) => Err(self.no_attribute(name)),
            Err(e) => Err(e),
        }
    }

    fn assign(&self, name: &str, value: Value) -> Result<(), DrawableError> {
        match self.attribute(name)? {
            Attribute::Field(_) if self.kind.slot(name).is_none() => self.set_property(name, value),
            _ => Err(DrawableError::Type(format!(
                "cannot assign to '{}.{}'",
                self.kind, name
            ))),
        }
    }

    fn remove(&self) -> Result<(), DrawableError> {
        self.detach()
    }
}
