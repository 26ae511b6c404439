//! Stub drawables that record every call made on them

use std::sync::{Arc, Mutex};

use figure_forge::drawable::{Attribute, CallArgs, Drawable, DrawableError, DrawableRef};
use figure_forge::types::{Value, ValueMap};

/// One recorded interaction with a stub
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Invoke { name: String, args: CallArgs },
    Assign { name: String, value: Value },
    Remove,
}

/// A drawable whose attributes are plain data
///
/// - `fields` are exposed as field attributes
/// - `props` are exposed as `get_<name>` / `set_<name>` methods
/// - getters listed in `failing` raise an error
pub struct StubObject {
    type_name: String,
    label: String,
    children: Mutex<Vec<DrawableRef>>,
    fields: Mutex<ValueMap>,
    props: Mutex<ValueMap>,
    failing: Vec<String>,
    calls: Mutex<Vec<Call>>,
}

impl StubObject {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn invocations(&self, name: &str) -> Vec<CallArgs> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Invoke { name: n, args } if n == name => Some(args),
                _ => None,
            })
            .collect()
    }

    pub fn prop(&self, name: &str) -> Option<Value> {
        self.props.lock().unwrap().get(name).cloned()
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        self.fields.lock().unwrap().get(name).cloned()
    }

    pub fn add_child(&self, child: DrawableRef) {
        self.children.lock().unwrap().push(child);
    }

    pub fn insert_child(&self, index: usize, child: DrawableRef) {
        self.children.lock().unwrap().insert(index, child);
    }

    fn missing(&self, name: &str) -> DrawableError {
        DrawableError::NoAttribute {
            type_name: self.type_name.clone(),
            name: name.to_string(),
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Drawable for StubObject {
    fn type_name(&self) -> String {
        self.type_name.clone()
    }

    fn label(&self) -> Result<String, DrawableError> {
        Ok(self.label.clone())
    }

    fn children(&self) -> Result<Vec<DrawableRef>, DrawableError> {
        Ok(self.children.lock().unwrap().clone())
    }

    fn attribute(&self, name: &str) -> Result<Attribute, DrawableError> {
        if let Some(value) = self.fields.lock().unwrap().get(name) {
            return Ok(Attribute::Field(value.clone()));
        }
        let props = self.props.lock().unwrap();
        let is_accessor = name
            .strip_prefix("get_")
            .or_else(|| name.strip_prefix("set_"))
            .is_some_and(|prop| props.contains_key(prop));
        if is_accessor {
            Ok(Attribute::Method)
        } else {
            Err(self.missing(name))
        }
    }

    fn invoke(&self, name: &str, args: CallArgs) -> Result<Value, DrawableError> {
        self.record(Call::Invoke {
            name: name.to_string(),
            args: args.clone(),
        });

        if let Some(prop) = name.strip_prefix("get_") {
            if self.failing.iter().any(|f| f == name) {
                return Err(DrawableError::Failed(format!("{} is broken", name)));
            }
            return self.prop(prop).ok_or_else(|| self.missing(name));
        }

        if let Some(prop) = name.strip_prefix("set_") {
            let value = args
                .positional
                .first()
                .cloned()
                .or_else(|| args.named.values().next().cloned())
                .ok_or_else(|| DrawableError::Type(format!("{}() missing a value", name)))?;
            let mut props = self.props.lock().unwrap();
            let slot = props.get_mut(prop).ok_or_else(|| self.missing(name))?;
            *slot = value;
            return Ok(Value::None);
        }

        Err(self.missing(name))
    }

    fn assign(&self, name: &str, value: Value) -> Result<(), DrawableError> {
        self.record(Call::Assign {
            name: name.to_string(),
            value: value.clone(),
        });
        let mut fields = self.fields.lock().unwrap();
        let slot = fields.get_mut(name).ok_or_else(|| self.missing(name))?;
        *slot = value;
        Ok(())
    }

    fn remove(&self) -> Result<(), DrawableError> {
        self.record(Call::Remove);
        Ok(())
    }
}

/// Builder for [`StubObject`]s
pub struct StubBuilder {
    type_name: String,
    label: String,
    children: Vec<DrawableRef>,
    fields: ValueMap,
    props: ValueMap,
    failing: Vec<String>,
}

impl StubBuilder {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            label: String::new(),
            children: Vec::new(),
            fields: ValueMap::new(),
            props: ValueMap::new(),
            failing: Vec::new(),
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn prop(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.props.insert(name.to_string(), value.into());
        self
    }

    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Expose `child` both as a child and as the field `name`
    pub fn slot(mut self, name: &str, child: DrawableRef) -> Self {
        self.fields.insert(name.to_string(), Value::Object(child.clone()));
        self.children.push(child);
        self
    }

    pub fn child(mut self, child: DrawableRef) -> Self {
        self.children.push(child);
        self
    }

    /// Make the getter `name` raise
    pub fn failing(mut self, name: &str) -> Self {
        self.failing.push(name.to_string());
        self
    }

    pub fn build(self) -> Arc<StubObject> {
        Arc::new(StubObject {
            type_name: self.type_name,
            label: self.label,
            children: Mutex::new(self.children),
            fields: Mutex::new(self.fields),
            props: Mutex::new(self.props),
            failing: self.failing,
            calls: Mutex::new(Vec::new()),
        })
    }
}

/// Upcast a stub to a drawable reference
pub fn drawable(stub: &Arc<StubObject>) -> DrawableRef {
    stub.clone()
}
