//! Confirmation shown after a plugin template was written

use std::path::PathBuf;

use egui::Ui;

use super::{Dialog, DialogAction, DialogState, DialogWindowConfig};

#[derive(Debug, Default)]
pub struct NewPluginState {
    /// The file that was created
    pub path: Option<PathBuf>,
}

impl NewPluginState {
    pub fn created(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }
}

impl DialogState for NewPluginState {}

pub struct NewPluginContext;

pub struct NewPluginDialog;

impl Dialog for NewPluginDialog {
    type State = NewPluginState;
    type Action = ();
    type Context<'a> = NewPluginContext;

    fn title(_state: &Self::State) -> &'static str {
        "New Plugin Created"
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::centered_modal(420.0)
    }

    fn render(
        state: &mut Self::State,
        _ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        let Some(path) = &state.path else {
            return DialogAction::Close;
        };
        let path = path.display().to_string();

        ui.label("New plugin created at:");
        ui.monospace(&path);
        ui.label(
            egui::RichText::new("Edit it, then use Plugins > Reload Plugins to pick up changes.")
                .small()
                .weak(),
        );
        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("Copy Path").clicked() {
                ui.ctx().copy_text(path.clone());
                return DialogAction::Close;
            }
            if ui.button("OK").clicked() {
                return DialogAction::Close;
            }
            DialogAction::None
        })
        .inner
    }
}
