//! Preferences dialog
//!
//! App-wide settings: appearance, logging, and where schemas and plugins are
//! loaded from.

use std::path::PathBuf;

use egui::Ui;

use crate::config::AppState;
use crate::frontend::dialogs::{Dialog, DialogAction, DialogState, DialogWindowConfig};

/// State for the preferences dialog
#[derive(Debug, Clone, PartialEq)]
pub struct PreferencesState {
    pub dark_mode: bool,
    pub font_scale: f32,
    pub debug_mode: bool,
    /// Plugin directory; empty means the default
    pub plugin_dir: String,
    /// Schema file; empty means the built-in schema
    pub schema_override: String,
}

impl Default for PreferencesState {
    fn default() -> Self {
        Self::from_app_state(&AppState::default())
    }
}

impl PreferencesState {
    /// Create from the current app state
    pub fn from_app_state(app_state: &AppState) -> Self {
        let path_text = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };
        Self {
            dark_mode: app_state.ui_preferences.dark_mode,
            font_scale: app_state.ui_preferences.font_scale,
            debug_mode: app_state.debug_mode,
            plugin_dir: path_text(&app_state.plugin_dir),
            schema_override: path_text(&app_state.schema_override),
        }
    }

    /// Write the edited values into `app_state`
    pub fn apply_to(&self, app_state: &mut AppState) {
        let optional_path = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| PathBuf::from(s))
        };
        app_state.ui_preferences.dark_mode = self.dark_mode;
        app_state.ui_preferences.font_scale = self.font_scale;
        app_state.debug_mode = self.debug_mode;
        app_state.plugin_dir = optional_path(&self.plugin_dir);
        app_state.schema_override = optional_path(&self.schema_override);
    }
}

impl DialogState for PreferencesState {}

/// Actions produced by the preferences dialog
#[derive(Debug, Clone)]
pub enum PreferencesAction {
    Apply(PreferencesState),
}

pub struct PreferencesContext;

pub struct PreferencesDialog;

fn path_row(ui: &mut Ui, label: &str, text: &mut String, pick_folder: bool) {
    ui.label(format!("{}:", label));
    ui.horizontal(|ui| {
        ui.add(egui::TextEdit::singleline(text).desired_width(220.0));
        if ui.button("Browse...").clicked() {
            let dialog = rfd::FileDialog::new();
            let picked = if pick_folder {
                dialog.pick_folder()
            } else {
                dialog
                    .add_filter("Schema", &["json", "toml"])
                    .pick_file()
            };
            if let Some(path) = picked {
                *text = path.display().to_string();
            }
        }
    });
    ui.end_row();
}

impl Dialog for PreferencesDialog {
    type State = PreferencesState;
    type Action = PreferencesAction;
    type Context<'a> = PreferencesContext;

    fn title(_state: &Self::State) -> &'static str {
        "Preferences"
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig {
            default_width: 460.0,
            ..Default::default()
        }
    }

    fn render(
        state: &mut Self::State,
        _ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        ui.heading("Appearance");
        ui.add_space(4.0);

        egui::Grid::new("prefs_appearance_grid")
            .num_columns(2)
            .spacing([10.0, 8.0])
            .show(ui, |ui| {
                ui.label("Dark mode:");
                ui.checkbox(&mut state.dark_mode, "");
                ui.end_row();

                ui.label("Font scale:");
                ui.add(egui::Slider::new(&mut state.font_scale, 0.5..=2.0).step_by(0.1));
                ui.end_row();

                ui.label("Debug logging:");
                ui.checkbox(&mut state.debug_mode, "");
                ui.end_row();
            });

        ui.add_space(8.0);

        ui.heading("Sources");
        ui.add_space(4.0);

        egui::Grid::new("prefs_sources_grid")
            .num_columns(2)
            .spacing([10.0, 8.0])
            .show(ui, |ui| {
                path_row(ui, "Plugin directory", &mut state.plugin_dir, true);
                path_row(ui, "Schema file", &mut state.schema_override, false);
            });
        ui.label(
            egui::RichText::new("Leave empty to use the defaults. Font scale applies on restart.")
                .small()
                .weak(),
        );

        ui.add_space(8.0);
        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Apply").clicked() {
                return DialogAction::CloseWithAction(PreferencesAction::Apply(state.clone()));
            }
            if ui.button("Cancel").clicked() {
                return DialogAction::Close;
            }
            DialogAction::None
        })
        .inner
    }
}
