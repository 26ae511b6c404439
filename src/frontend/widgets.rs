//! Property editor widgets
//!
//! One editor per property kind. Each editor works on a local copy of the
//! field value and returns the new value once the user commits an edit;
//! nothing is written back to the object from here.
//!
//! Text editors keep their in-progress text in [`EditBuffers`] and commit
//! when they lose focus.

use std::collections::HashMap;

use egui::{Color32, Response, Ui, Widget};

use crate::binding::PropertyField;
use crate::schema::{KindSpec, ScalarKind};
use crate::types::{Rgba, Value, ValueMap};

/// Font families offered by the font editor
pub const FONT_FAMILIES: &[&str] = &[
    "sans-serif",
    "serif",
    "monospace",
    "cursive",
    "fantasy",
    "DejaVu Sans",
    "DejaVu Serif",
    "DejaVu Sans Mono",
    "Liberation Sans",
    "Helvetica",
    "Arial",
    "Times New Roman",
    "Courier New",
];

/// In-progress text of text editors, keyed by editor id
#[derive(Debug, Default)]
pub struct EditBuffers {
    text: HashMap<String, String>,
}

impl EditBuffers {
    pub fn clear(&mut self) {
        self.text.clear();
    }

    fn entry(&mut self, key: &str, current: impl FnOnce() -> String) -> &mut String {
        self.text.entry(key.to_string()).or_insert_with(current)
    }

    fn take(&mut self, key: &str) -> Option<String> {
        self.text.remove(key)
    }
}

/// A small colored square
pub struct ColorSwatch {
    color: Color32,
    size: f32,
}

impl ColorSwatch {
    pub fn new(color: Rgba) -> Self {
        Self {
            color: to_color32(color),
            size: 12.0,
        }
    }
}

impl Widget for ColorSwatch {
    fn ui(self, ui: &mut Ui) -> Response {
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(self.size, self.size), egui::Sense::hover());
        ui.painter().rect_filled(rect, 2.0, self.color);
        response
    }
}

pub fn to_color32(color: Rgba) -> Color32 {
    let [r, g, b, a] = color.to_array().map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8);
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Short single-line rendering of a value for read-only display
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Float(v) => format!("{:.4}", v)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string(),
        Value::Tuple(items) if items.len() > 6 => format!("({} items)", items.len()),
        other => other.to_string(),
    }
}

/// Split `value` into one value per component, padding with defaults
pub fn tuple_components(value: &Value, kinds: &[ScalarKind]) -> Vec<Value> {
    let items = value.as_tuple().unwrap_or_default();
    kinds
        .iter()
        .enumerate()
        .map(|(i, kind)| match items.get(i) {
            Some(item) if !item.is_none() => item.clone(),
            _ => scalar_default(*kind),
        })
        .collect()
}

fn scalar_default(kind: ScalarKind) -> Value {
    match kind {
        ScalarKind::Bool => Value::Bool(false),
        ScalarKind::Int => Value::Int(0),
        ScalarKind::Float => Value::Float(0.0),
        ScalarKind::String => Value::Str(String::new()),
        ScalarKind::Color => Value::Color(Rgba::BLACK),
    }
}

/// Render the editor for `field`; returns the committed value, if any
pub fn property_editor(ui: &mut Ui, field: &PropertyField, buffers: &mut EditBuffers) -> Option<Value> {
    if field.read_only {
        ui.label(egui::RichText::new(format_value(&field.value)).monospace())
            .on_hover_text("Read-only");
        return None;
    }

    let id = field.name.as_str();
    match &field.kind {
        KindSpec::Bool => bool_editor(ui, &field.value),
        KindSpec::Int => int_editor(ui, &field.value),
        KindSpec::Float => float_editor(ui, &field.value),
        KindSpec::String => text_editor(ui, id, &field.value, buffers, false),
        KindSpec::Multiline => text_editor(ui, id, &field.value, buffers, true),
        KindSpec::Font => {
            let options: Vec<String> = FONT_FAMILIES.iter().map(|f| f.to_string()).collect();
            combo_editor(ui, id, &field.value, &options)
        }
        KindSpec::Color => color_editor(ui, &field.value),
        KindSpec::Choice { options } => combo_editor(ui, id, &field.value, options),
        KindSpec::Tuple { components } => tuple_editor(ui, id, &field.value, components, buffers),
        KindSpec::Dict { fields } => dict_editor(ui, id, &field.value, fields, buffers),
    }
}

fn scalar_editor(
    ui: &mut Ui,
    id: &str,
    kind: ScalarKind,
    value: &Value,
    buffers: &mut EditBuffers,
) -> Option<Value> {
    match kind {
        ScalarKind::Bool => bool_editor(ui, value),
        ScalarKind::Int => int_editor(ui, value),
        ScalarKind::Float => float_editor(ui, value),
        ScalarKind::String => text_editor(ui, id, value, buffers, false),
        ScalarKind::Color => color_editor(ui, value),
    }
}

fn bool_editor(ui: &mut Ui, value: &Value) -> Option<Value> {
    let mut checked = value.as_bool().unwrap_or(false);
    ui.checkbox(&mut checked, "")
        .changed()
        .then_some(Value::Bool(checked))
}

fn int_editor(ui: &mut Ui, value: &Value) -> Option<Value> {
    let mut v = value.as_int().unwrap_or(0);
    ui.add(egui::DragValue::new(&mut v).speed(0.2))
        .changed()
        .then_some(Value::Int(v))
}

fn float_editor(ui: &mut Ui, value: &Value) -> Option<Value> {
    let mut v = value.as_f64().unwrap_or(0.0);
    let speed = (v.abs() * 0.01).max(0.01);
    ui.add(egui::DragValue::new(&mut v).speed(speed).max_decimals(4))
        .changed()
        .then_some(Value::Float(v))
}

fn text_editor(
    ui: &mut Ui,
    id: &str,
    value: &Value,
    buffers: &mut EditBuffers,
    multiline: bool,
) -> Option<Value> {
    let current = || value.as_str().map(str::to_string).unwrap_or_default();
    let text = buffers.entry(id, current);
    let response = if multiline {
        ui.add(egui::TextEdit::multiline(text).desired_rows(3))
    } else {
        ui.text_edit_singleline(text)
    };

    if response.lost_focus() {
        let text = buffers.take(id)?;
        if value.as_str() != Some(text.as_str()) {
            return Some(Value::Str(text));
        }
    }
    None
}

fn combo_editor(ui: &mut Ui, id: &str, value: &Value, options: &[String]) -> Option<Value> {
    let current = value.as_str().map(str::to_string).unwrap_or_default();
    let mut selected = current.clone();
    egui::ComboBox::from_id_salt(("combo", id))
        .selected_text(&current)
        .show_ui(ui, |ui| {
            if !current.is_empty() && !options.contains(&current) {
                ui.selectable_value(&mut selected, current.clone(), &current);
            }
            for option in options {
                ui.selectable_value(&mut selected, option.clone(), option);
            }
        });
    (selected != current).then_some(Value::Str(selected))
}

fn color_editor(ui: &mut Ui, value: &Value) -> Option<Value> {
    let mut rgba = value.as_color().unwrap_or(Rgba::BLACK).to_array();
    let response = ui.color_edit_button_rgba_unmultiplied(&mut rgba);
    let [r, g, b, a] = rgba;
    response
        .on_hover_text(value.to_string())
        .changed()
        .then_some(Value::Color(Rgba::new(r, g, b, a)))
}

fn tuple_editor(
    ui: &mut Ui,
    id: &str,
    value: &Value,
    kinds: &[ScalarKind],
    buffers: &mut EditBuffers,
) -> Option<Value> {
    let mut components = tuple_components(value, kinds);
    let mut changed = false;
    ui.horizontal(|ui| {
        for (i, kind) in kinds.iter().enumerate() {
            let key = format!("{}[{}]", id, i);
            if let Some(new) = scalar_editor(ui, &key, *kind, &components[i], buffers) {
                components[i] = new;
                changed = true;
            }
        }
    });
    changed.then_some(Value::Tuple(components))
}

fn dict_editor(
    ui: &mut Ui,
    id: &str,
    value: &Value,
    fields: &[(String, ScalarKind)],
    buffers: &mut EditBuffers,
) -> Option<Value> {
    let current = value.as_map().cloned().unwrap_or_default();
    let mut edited: ValueMap = fields
        .iter()
        .map(|(name, kind)| {
            let v = current
                .get(name)
                .filter(|v| !v.is_none())
                .cloned()
                .unwrap_or_else(|| scalar_default(*kind));
            (name.clone(), v)
        })
        .collect();

    let mut changed = false;
    ui.vertical(|ui| {
        for (name, kind) in fields {
            ui.horizontal(|ui| {
                ui.label(name);
                let key = format!("{}.{}", id, name);
                let Some(slot) = edited.get_mut(name) else {
                    return;
                };
                if let Some(new) = scalar_editor(ui, &key, *kind, slot, buffers) {
                    *slot = new;
                    changed = true;
                }
            });
        }
    });
    changed.then_some(Value::Map(edited))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_components_pads_missing() {
        let kinds = [ScalarKind::Float, ScalarKind::Float];
        assert_eq!(
            tuple_components(&Value::None, &kinds),
            vec![Value::Float(0.0), Value::Float(0.0)]
        );
        assert_eq!(
            tuple_components(&Value::from(&[1.0, 2.0, 3.0][..]), &kinds),
            vec![Value::Float(1.0), Value::Float(2.0)]
        );
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&Value::Float(1.5)), "1.5");
        assert_eq!(format_value(&Value::Float(2.0)), "2");
        let long = Value::from(&[0.0; 10][..]);
        assert_eq!(format_value(&long), "(10 items)");
    }

    #[test]
    fn test_color32_conversion() {
        assert_eq!(to_color32(Rgba::WHITE), Color32::WHITE);
    }

    #[test]
    fn test_buffers_keep_text_until_taken() {
        let mut buffers = EditBuffers::default();
        buffers.entry("title", || "a".into()).push('b');
        assert_eq!(buffers.entry("title", || "ignored".into()).as_str(), "ab");
        assert_eq!(buffers.take("title").as_deref(), Some("ab"));
        assert!(buffers.take("title").is_none());
    }
}
