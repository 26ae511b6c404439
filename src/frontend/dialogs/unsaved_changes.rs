//! Unsaved changes confirmation dialog
//!
//! Shown before an action that would replace or close a figure with unsaved
//! edits.

use super::{Dialog, DialogAction, DialogState, DialogWindowConfig};
use crate::frontend::state::AppAction;
use egui::Ui;

/// State for the unsaved changes dialog
#[derive(Debug, Default)]
pub struct UnsavedChangesState {
    /// The action to run once the user agrees
    pub pending: Option<AppAction>,
}

impl DialogState for UnsavedChangesState {
    fn reset(&mut self) {
        self.pending = None;
    }

    fn is_valid(&self) -> bool {
        self.pending.is_some()
    }
}

impl UnsavedChangesState {
    pub fn with_action(action: AppAction) -> Self {
        Self {
            pending: Some(action),
        }
    }
}

#[derive(Debug, Clone)]
pub enum UnsavedChangesAction {
    /// Save first, then run the pending action
    SaveThen(AppAction),
    /// Drop the edits and run the pending action
    Discard(AppAction),
}

pub struct UnsavedChangesContext<'a> {
    /// Title of the figure being edited
    pub title: &'a str,
}

pub struct UnsavedChangesDialog;

impl Dialog for UnsavedChangesDialog {
    type State = UnsavedChangesState;
    type Action = UnsavedChangesAction;
    type Context<'a> = UnsavedChangesContext<'a>;

    fn title(_state: &Self::State) -> &'static str {
        "Unsaved Changes"
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::centered_modal(360.0)
    }

    fn render(
        state: &mut Self::State,
        ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        if !state.is_valid() {
            return DialogAction::Close;
        }

        ui.label(format!("\"{}\" has unsaved changes.", ctx.title.trim_end_matches('*')));
        ui.label("Do you want to save them first?");

        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                if let Some(action) = state.pending.take() {
                    return DialogAction::CloseWithAction(UnsavedChangesAction::SaveThen(action));
                }
            }
            if ui.button("Discard").clicked() {
                if let Some(action) = state.pending.take() {
                    return DialogAction::CloseWithAction(UnsavedChangesAction::Discard(action));
                }
            }
            if ui.button("Cancel").clicked() {
                return DialogAction::Close;
            }
            DialogAction::None
        })
        .inner
    }
}
