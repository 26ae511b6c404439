//! Property Inspector pane
//!
//! Renders the binding surface: one row per described field with an editor
//! for its kind, followed by the declared properties whose getters failed.

use egui::{Color32, Ui};

use crate::binding::Description;
use crate::frontend::pane_trait::Pane;
use crate::frontend::state::{AppAction, SharedState};
use crate::frontend::widgets::{property_editor, EditBuffers};
use crate::frontend::workspace::PaneKind;

/// State for the inspector pane
#[derive(Default)]
pub struct InspectorPaneState {
    buffers: EditBuffers,
    /// Description the buffers were filled from
    shown: Option<Description>,
}

/// Render the inspector pane
pub fn render(state: &mut InspectorPaneState, shared: &SharedState<'_>, ui: &mut Ui) -> Vec<AppAction> {
    let mut actions = Vec::new();

    let Some(description) = shared.session.binding().description() else {
        state.buffers.clear();
        state.shown = None;
        ui.colored_label(Color32::GRAY, "Select an object in the Figure Explorer");
        return actions;
    };

    if state.shown.as_ref() != Some(description) {
        state.buffers.clear();
        state.shown = Some(description.clone());
    }

    ui.horizontal(|ui| {
        ui.heading(&description.type_name);
        if let Some(node) = shared
            .session
            .selected_node()
            .and_then(|id| shared.session.tree().node(id))
        {
            ui.label(egui::RichText::new(&node.label).weak());
        }
    });
    ui.separator();

    if description.is_empty() {
        ui.colored_label(Color32::GRAY, "No editable properties for this type");
        return actions;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("inspector_grid")
                .num_columns(2)
                .striped(true)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    for field in &description.fields {
                        ui.label(&field.name)
                            .on_hover_text(field.kind.value_kind().to_string());
                        if let Some(value) = property_editor(ui, field, &mut state.buffers) {
                            actions.push(AppAction::ApplyEdit {
                                name: field.name.clone(),
                                value,
                            });
                        }
                        ui.end_row();
                    }

                    for missing in &description.unavailable {
                        ui.colored_label(Color32::GRAY, &missing.name);
                        ui.colored_label(Color32::from_rgb(200, 120, 60), "unavailable")
                            .on_hover_text(&missing.error);
                        ui.end_row();
                    }
                });
        });

    actions
}

impl Pane for InspectorPaneState {
    fn kind(&self) -> PaneKind {
        PaneKind::Inspector
    }

    fn render(&mut self, shared: &SharedState, ui: &mut Ui) -> Vec<AppAction> {
        render(self, shared, ui)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
