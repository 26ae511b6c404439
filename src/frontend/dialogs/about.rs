//! About dialog

use egui::Ui;

use super::{Dialog, DialogAction, DialogState, DialogWindowConfig};
use crate::scripting::PluginEngine;
use crate::session::EditingSession;

#[derive(Debug, Default)]
pub struct AboutState;

impl DialogState for AboutState {}

/// Data shown in the dialog
pub struct AboutContext<'a> {
    pub session: &'a EditingSession,
    pub plugins: &'a PluginEngine,
}

pub struct AboutDialog;

impl Dialog for AboutDialog {
    type State = AboutState;
    type Action = ();
    type Context<'a> = AboutContext<'a>;

    fn title(_state: &Self::State) -> &'static str {
        "About Figure Forge"
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::centered_modal(340.0)
    }

    fn render(
        _state: &mut Self::State,
        ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        ui.vertical_centered(|ui| {
            ui.heading("Figure Forge");
            ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
            ui.add_space(4.0);
            ui.label("Interactive property editor for plotting object graphs");
        });

        ui.separator();

        let schema = ctx.session.schema();
        egui::Grid::new("about_grid")
            .num_columns(2)
            .spacing([10.0, 4.0])
            .show(ui, |ui| {
                ui.label("Schema:");
                ui.label(ctx.session.schema_store().source().to_string());
                ui.end_row();

                ui.label("Types:");
                ui.label(format!(
                    "{} ({} properties)",
                    schema.len(),
                    schema.property_count()
                ));
                ui.end_row();

                ui.label("Plugins:");
                ui.label(ctx.plugins.plugins().len().to_string());
                ui.end_row();

                ui.label("Objects:");
                ui.label(ctx.session.tree().len().to_string());
                ui.end_row();
            });

        ui.separator();
        ui.vertical_centered(|ui| {
            if ui.button("Close").clicked() {
                return DialogAction::Close;
            }
            DialogAction::None
        })
        .inner
    }
}
