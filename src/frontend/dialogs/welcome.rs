//! Welcome dialog shown at startup

use egui::Ui;

use super::{Dialog, DialogAction, DialogState, DialogWindowConfig};

#[derive(Debug, Default)]
pub struct WelcomeState;

impl DialogState for WelcomeState {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WelcomeAction {
    /// Closed; carries the "show at startup" choice
    Dismiss { show_at_startup: bool },
}

pub struct WelcomeDialog;

impl Dialog for WelcomeDialog {
    type State = WelcomeState;
    type Action = WelcomeAction;
    /// The startup preference, edited in place
    type Context<'a> = &'a mut bool;

    fn title(_state: &Self::State) -> &'static str {
        "Welcome to Figure Forge"
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::centered_modal(380.0)
    }

    fn render(
        _state: &mut Self::State,
        show_at_startup: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        ui.label(format!("Figure Forge {}", env!("CARGO_PKG_VERSION")));
        ui.add_space(4.0);
        ui.label("Edit the properties of a plotted figure object by object.");
        ui.add_space(6.0);

        for (step, text) in [
            ("1.", "Pick an object in the Figure Explorer."),
            ("2.", "Change its properties in the Property Inspector."),
            ("3.", "Run plugins on it from the Plugins menu."),
        ] {
            ui.horizontal(|ui| {
                ui.strong(step);
                ui.label(text);
            });
        }

        ui.add_space(6.0);
        ui.checkbox(show_at_startup, "Show this dialog at startup");
        ui.separator();

        if ui.button("Close").clicked() {
            return DialogAction::CloseWithAction(WelcomeAction::Dismiss {
                show_at_startup: *show_at_startup,
            });
        }
        DialogAction::None
    }
}
