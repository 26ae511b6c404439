//! Frontend module for egui UI
//!
//! This module provides the desktop editor built on eframe/egui.
//!
//! # Architecture
//!
//! The frontend uses an egui_dock workspace where every UI element is a pane:
//! the figure explorer, the property inspector and the preview. Panes borrow
//! the session through [`SharedState`] and return [`AppAction`]s, which
//! [`ForgeApp`] applies to the [`EditingSession`] after the frame's panes have
//! rendered. Panes never mutate the figure themselves.
//!
//! # Main Types
//!
//! - [`ForgeApp`] - Main application state implementing [`eframe::App`]
//! - [`Workspace`] - Dock state and pane management
//!
//! # Submodules
//!
//! - `workspace` - Dock workspace, tab viewer, default layout
//! - `panes` - Individual pane render functions
//! - `dialogs` - Welcome, about, preferences, new-plugin and unsaved-changes dialogs
//! - `widgets` - Property editors and small custom widgets

pub mod dialogs;
pub mod pane_registry;
pub mod pane_trait;
pub mod panes;
pub mod state;
pub mod widgets;
pub mod workspace;

pub use state::{AppAction, DialogId, SharedState};
pub use workspace::Workspace;

use std::path::PathBuf;

use egui::{Align2, Color32};
use indexmap::IndexMap;

use dialogs::{
    show_dialog, AboutContext, AboutDialog, AboutState, NewPluginContext, NewPluginDialog,
    NewPluginState, PreferencesAction, PreferencesContext, PreferencesDialog, PreferencesState,
    UnsavedChangesAction, UnsavedChangesContext, UnsavedChangesDialog, UnsavedChangesState,
    WelcomeAction, WelcomeDialog, WelcomeState,
};
use workspace::tab_viewer::WorkspaceTabViewer;

use crate::config::AppState;
use crate::error::Result;
use crate::figure::{demo_figure, document::DOCUMENT_EXTENSION};
use crate::logging::LogHandle;
use crate::schema::{SchemaSource, SchemaStore};
use crate::scripting::{create_template, PluginEngine};
use crate::session::{EditingSession, SessionEvent};

/// Entry of the Plugins menu
#[derive(Debug, Clone, PartialEq)]
pub struct PluginMenuItem {
    pub id: String,
    pub name: String,
    pub tooltip: Option<String>,
}

/// Plugins grouped by submenu, in load order; `None` is the top level
pub fn plugin_menu(plugins: &PluginEngine) -> IndexMap<Option<String>, Vec<PluginMenuItem>> {
    let mut groups: IndexMap<Option<String>, Vec<PluginMenuItem>> = IndexMap::new();
    for plugin in plugins.plugins() {
        groups
            .entry(plugin.submenu().map(str::to_string))
            .or_default()
            .push(PluginMenuItem {
                id: plugin.id().to_string(),
                name: plugin.name().to_string(),
                tooltip: plugin.tooltip().map(str::to_string),
            });
    }
    groups
}

/// Actions that throw away the current figure
fn discards_figure(action: &AppAction) -> bool {
    matches!(
        action,
        AppAction::NewFigure | AppAction::OpenFigureDialog | AppAction::OpenFigure(_) | AppAction::Quit
    )
}

/// Where the schema is loaded from for the given app state
pub fn schema_source(app_state: &AppState) -> SchemaSource {
    match &app_state.schema_override {
        Some(path) => SchemaSource::File(path.clone()),
        None => SchemaSource::Builtin,
    }
}

/// Plugin engine with the built-ins plus the configured directory
pub fn load_plugins(app_state: &AppState) -> PluginEngine {
    let mut engine = PluginEngine::new();
    if let Some(dir) = app_state.effective_plugin_dir() {
        if dir.is_dir() {
            let errors = engine.load_directory(&dir);
            if !errors.is_empty() {
                tracing::warn!("{} plugin(s) in {:?} failed to load", errors.len(), dir);
            }
        } else {
            tracing::debug!("Plugin directory {:?} does not exist", dir);
        }
    }
    engine
}

/// Main application state
pub struct ForgeApp {
    session: EditingSession,
    plugins: PluginEngine,
    app_state: AppState,
    log: Option<LogHandle>,
    workspace: Workspace,

    last_error: Option<String>,
    /// Set once the user agreed to close with unsaved changes
    allow_close: bool,
    window_title: String,

    welcome_open: bool,
    welcome_state: WelcomeState,
    about_open: bool,
    about_state: AboutState,
    preferences_open: bool,
    preferences_state: PreferencesState,
    unsaved_open: bool,
    unsaved_state: UnsavedChangesState,
    new_plugin_open: bool,
    new_plugin_state: NewPluginState,
}

impl ForgeApp {
    /// Create the application for an eframe context
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        app_state: AppState,
        log: Option<LogHandle>,
        initial_path: Option<PathBuf>,
    ) -> Result<Self> {
        let mut style = (*cc.egui_ctx.style()).clone();
        style.text_styles.iter_mut().for_each(|(_, font_id)| {
            font_id.size *= app_state.ui_preferences.font_scale;
        });
        cc.egui_ctx.set_style(style);

        Self::from_state(app_state, log, initial_path)
    }

    /// Create the application state without a UI context
    pub fn from_state(
        app_state: AppState,
        log: Option<LogHandle>,
        initial_path: Option<PathBuf>,
    ) -> Result<Self> {
        let mut last_error = None;

        let store = match SchemaStore::load(schema_source(&app_state)) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!("Falling back to the built-in schema: {}", e);
                last_error = Some(format!("Failed to load schema: {}", e));
                SchemaStore::load(SchemaSource::Builtin)?
            }
        };

        let plugins = load_plugins(&app_state);
        tracing::info!("{} plugins available", plugins.plugins().len());
        let welcome_open = app_state.ui_preferences.show_welcome;

        let mut session = EditingSession::new(demo_figure()?, store)?;
        if let Some(path) = initial_path {
            if let Err(e) = session.open_figure(&path) {
                tracing::error!("Failed to open {:?}: {}", path, e);
                last_error = Some(format!("Failed to open {}: {}", path.display(), e));
            }
        }

        Ok(Self {
            session,
            plugins,
            app_state,
            log,
            workspace: Workspace::new(),
            last_error,
            allow_close: false,
            window_title: String::new(),
            welcome_open,
            welcome_state: WelcomeState,
            about_open: false,
            about_state: AboutState,
            preferences_open: false,
            preferences_state: PreferencesState::default(),
            unsaved_open: false,
            unsaved_state: UnsavedChangesState::default(),
            new_plugin_open: false,
            new_plugin_state: NewPluginState::default(),
        })
    }

    pub fn session(&self) -> &EditingSession {
        &self.session
    }

    pub fn app_state(&self) -> &AppState {
        &self.app_state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// True while the welcome dialog is showing
    pub fn is_welcome_open(&self) -> bool {
        self.welcome_open
    }

    fn report(&mut self, message: String) {
        tracing::error!("{}", message);
        self.last_error = Some(message);
    }

    /// Apply an action, asking first if it would drop unsaved edits
    pub fn handle_action(&mut self, ctx: &egui::Context, action: AppAction) {
        if discards_figure(&action) && self.session.is_dirty() {
            self.unsaved_state = UnsavedChangesState::with_action(action);
            self.unsaved_open = true;
            return;
        }
        self.perform(ctx, action);
    }

    fn perform(&mut self, ctx: &egui::Context, action: AppAction) {
        match action {
            AppAction::NewFigure => {
                if let Err(e) = self.session.new_figure() {
                    self.report(format!("Failed to create a figure: {}", e));
                }
            }
            AppAction::OpenFigureDialog => {
                if let Some(path) = rfd::FileDialog::new()
                    .set_title("Open Figure")
                    .add_filter("Figure", &[DOCUMENT_EXTENSION, "json"])
                    .pick_file()
                {
                    self.perform(ctx, AppAction::OpenFigure(path));
                }
            }
            AppAction::OpenFigure(path) => match self.session.open_figure(&path) {
                Ok(()) => {
                    tracing::info!("Opened {:?}", path);
                    self.app_state.add_recent_file(&path);
                    self.app_state.last_figure_path = Some(path);
                }
                Err(e) => {
                    if !path.exists() {
                        self.app_state.remove_recent_file(&path);
                    }
                    self.report(format!("Failed to open {}: {}", path.display(), e));
                }
            },
            AppAction::SaveFigure => {
                self.save(false);
            }
            AppAction::SaveFigureAs => {
                self.save(true);
            }
            AppAction::Quit => {
                self.allow_close = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }

            AppAction::SelectNode(id) => {
                if let Err(e) = self.session.select_node(id) {
                    self.report(format!("Cannot select object: {}", e));
                }
            }
            AppAction::ApplyEdit { name, value } => {
                if let Err(e) = self.session.apply_edit(&name, value) {
                    self.last_error = Some(format!("Cannot set '{}': {}", name, e));
                }
            }
            AppAction::DeleteSelected => {
                if let Err(e) = self.session.delete_selected() {
                    self.report(format!("Cannot delete: {}", e));
                }
            }
            AppAction::ReloadSchema => {
                if let Err(e) = self.session.reload_schema() {
                    self.report(format!("Failed to reload schema: {}", e));
                }
            }
            AppAction::RunPlugin(id) => {
                if let Err(e) = self.session.run_plugin(&self.plugins, &id) {
                    self.last_error = Some(format!("Plugin failed: {}", e));
                }
            }
            AppAction::NewPlugin => {
                if let Err(message) = self.new_plugin() {
                    self.report(message);
                }
            }
            AppAction::ReloadPlugins => {
                self.plugins = load_plugins(&self.app_state);
                tracing::info!("{} plugins available", self.plugins.plugins().len());
            }

            AppAction::SetDarkMode(dark) => {
                self.app_state.ui_preferences.dark_mode = dark;
                apply_visuals(ctx, dark);
            }
            AppAction::SetDebugLogging(debug) => {
                self.app_state.debug_mode = debug;
                if let Some(log) = &self.log {
                    log.set_debug(debug);
                }
            }

            AppAction::OpenDialog(DialogId::Welcome) => {
                self.welcome_open = true;
            }
            AppAction::OpenDialog(DialogId::About) => {
                self.about_open = true;
            }
            AppAction::OpenDialog(DialogId::Preferences) => {
                self.preferences_state = PreferencesState::from_app_state(&self.app_state);
                self.preferences_open = true;
            }
            AppAction::ShowError(message) => {
                self.last_error = Some(message);
            }

            AppAction::OpenPane(kind) => self.workspace.open_pane(kind),
            AppAction::ClosePane(id) => self.workspace.remove_pane(id),
        }
    }

    /// Write a plugin template, reload plugins and show where it went
    pub fn new_plugin(&mut self) -> std::result::Result<PathBuf, String> {
        let dir = self
            .app_state
            .effective_plugin_dir()
            .ok_or_else(|| "No plugin directory is configured".to_string())?;
        let path = create_template(&dir).map_err(|e| format!("Failed to create plugin: {}", e))?;

        self.plugins = load_plugins(&self.app_state);
        self.new_plugin_state = NewPluginState::created(path.clone());
        self.new_plugin_open = true;
        Ok(path)
    }

    /// Save the figure, asking for a path when needed; true on success
    fn save(&mut self, save_as: bool) -> bool {
        let path = if save_as || self.session.path().is_none() {
            let picked = rfd::FileDialog::new()
                .set_title("Save Figure")
                .add_filter("Figure", &[DOCUMENT_EXTENSION, "json"])
                .set_file_name(format!("figure.{}", DOCUMENT_EXTENSION))
                .save_file();
            match picked {
                Some(path) => Some(path),
                None => return false,
            }
        } else {
            None
        };

        match self.session.save_figure(path.as_deref()) {
            Ok(path) => {
                tracing::info!("Saved figure to {:?}", path);
                true
            }
            Err(e) => {
                self.report(format!("Failed to save figure: {}", e));
                false
            }
        }
    }

    fn apply_preferences(&mut self, ctx: &egui::Context, prefs: PreferencesState) {
        let before = self.app_state.clone();
        prefs.apply_to(&mut self.app_state);

        if before.ui_preferences.dark_mode != self.app_state.ui_preferences.dark_mode {
            apply_visuals(ctx, self.app_state.ui_preferences.dark_mode);
        }
        if before.debug_mode != self.app_state.debug_mode {
            if let Some(log) = &self.log {
                log.set_debug(self.app_state.debug_mode);
            }
        }
        if before.plugin_dir != self.app_state.plugin_dir {
            self.plugins = load_plugins(&self.app_state);
        }
        if before.schema_override != self.app_state.schema_override {
            if let Err(e) = self.session.set_schema_source(schema_source(&self.app_state)) {
                self.report(format!("Failed to load schema: {}", e));
            }
        }

        if let Err(e) = self.app_state.save() {
            tracing::warn!("Failed to save app state: {}", e);
        }
    }

    fn process_session_events(&mut self) {
        for event in self.session.drain_events() {
            tracing::trace!("Session event: {:?}", event);
            if let SessionEvent::Saved(path) = event {
                self.app_state.add_recent_file(&path);
                self.app_state.last_figure_path = Some(path);
            }
        }
    }

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        use egui::Key;

        if ctx.wants_keyboard_input() {
            return;
        }

        let mut actions = Vec::new();
        ctx.input(|i| {
            if i.modifiers.command_only() {
                if i.key_pressed(Key::S) {
                    actions.push(AppAction::SaveFigure);
                }
                if i.key_pressed(Key::O) {
                    actions.push(AppAction::OpenFigureDialog);
                }
                if i.key_pressed(Key::N) {
                    actions.push(AppAction::NewFigure);
                }
            }
            if i.key_pressed(Key::Delete) && !i.modifiers.any() {
                actions.push(AppAction::DeleteSelected);
            }
        });

        for action in actions {
            if matches!(action, AppAction::DeleteSelected) && self.session.selection().is_none() {
                continue;
            }
            self.handle_action(ctx, action);
        }
    }

    fn render_menu_bar(&self, ui: &mut egui::Ui) -> Vec<AppAction> {
        let mut actions = Vec::new();
        let has_selection = self.session.selection().is_some();

        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                for (label, action) in [
                    ("New", AppAction::NewFigure),
                    ("Open...", AppAction::OpenFigureDialog),
                ] {
                    if ui.button(label).clicked() {
                        actions.push(action);
                        ui.close();
                    }
                }

                ui.menu_button("Open Recent", |ui| {
                    if self.app_state.recent_files.is_empty() {
                        ui.label(egui::RichText::new("No recent files").weak());
                    }
                    for recent in &self.app_state.recent_files {
                        if ui
                            .button(recent.name.as_str())
                            .on_hover_text(recent.path.display().to_string())
                            .clicked()
                        {
                            actions.push(AppAction::OpenFigure(recent.path.clone()));
                            ui.close();
                        }
                    }
                });

                ui.separator();
                for (label, action) in [
                    ("Save", AppAction::SaveFigure),
                    ("Save As...", AppAction::SaveFigureAs),
                ] {
                    if ui.button(label).clicked() {
                        actions.push(action);
                        ui.close();
                    }
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    actions.push(AppAction::Quit);
                    ui.close();
                }
            });

            ui.menu_button("Edit", |ui| {
                if ui
                    .add_enabled(has_selection, egui::Button::new("Delete Item"))
                    .clicked()
                {
                    actions.push(AppAction::DeleteSelected);
                    ui.close();
                }
                if ui.button("Reload Schema").clicked() {
                    actions.push(AppAction::ReloadSchema);
                    ui.close();
                }
                ui.separator();
                if ui.button("Preferences...").clicked() {
                    actions.push(AppAction::OpenDialog(DialogId::Preferences));
                    ui.close();
                }
            });

            ui.menu_button("Plugins", |ui| {
                let groups = plugin_menu(&self.plugins);
                if groups.is_empty() {
                    ui.label(egui::RichText::new("No plugins loaded").weak());
                }
                let mut entry = |ui: &mut egui::Ui, item: &PluginMenuItem| {
                    let mut response = ui.add_enabled(has_selection, egui::Button::new(item.name.as_str()));
                    if let Some(tooltip) = &item.tooltip {
                        response = response.on_hover_text(tooltip);
                    }
                    if response.clicked() {
                        actions.push(AppAction::RunPlugin(item.id.clone()));
                        ui.close();
                    }
                };
                for (submenu, items) in &groups {
                    match submenu {
                        Some(name) => {
                            ui.menu_button(name.as_str(), |ui| {
                                for item in items {
                                    entry(ui, item);
                                }
                            });
                        }
                        None => {
                            for item in items {
                                entry(ui, item);
                            }
                        }
                    }
                }

                ui.separator();
                for (label, action) in [
                    ("New Plugin...", AppAction::NewPlugin),
                    ("Reload Plugins", AppAction::ReloadPlugins),
                ] {
                    if ui.button(label).clicked() {
                        actions.push(action);
                        ui.close();
                    }
                }
            });

            ui.menu_button("View", |ui| {
                let mut dark = self.app_state.ui_preferences.dark_mode;
                if ui.checkbox(&mut dark, "Dark Mode").changed() {
                    actions.push(AppAction::SetDarkMode(dark));
                }
                let mut debug = self.app_state.debug_mode;
                if ui.checkbox(&mut debug, "Debug Logging").changed() {
                    actions.push(AppAction::SetDebugLogging(debug));
                }

                ui.separator();

                for (kind, name) in self.workspace.pane_kinds() {
                    if ui.button(name).clicked() {
                        actions.push(AppAction::OpenPane(kind));
                        ui.close();
                    }
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("Welcome").clicked() {
                    actions.push(AppAction::OpenDialog(DialogId::Welcome));
                    ui.close();
                }
                if ui.button("About").clicked() {
                    actions.push(AppAction::OpenDialog(DialogId::About));
                    ui.close();
                }
            });
        });

        actions
    }

    fn render_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(self.session.title());
            ui.separator();
            match self
                .session
                .selected_node()
                .and_then(|id| self.session.tree().node(id))
            {
                Some(node) => ui.label(format!("Selected: {}", node.label)),
                None => ui.label(egui::RichText::new("Nothing selected").weak()),
            };

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!(
                    "Schema: {} (rev {})",
                    self.session.schema_store().source(),
                    self.session.schema_store().generation()
                ));
                if self.session.is_dirty() {
                    ui.colored_label(Color32::YELLOW, "Modified");
                }
            });
        });
    }

    fn render_error_window(&mut self, ctx: &egui::Context) {
        let Some(message) = self.last_error.clone() else {
            return;
        };

        let mut open = true;
        let mut dismissed = false;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_BOTTOM, [0.0, -40.0])
            .open(&mut open)
            .show(ctx, |ui| {
                ui.colored_label(Color32::from_rgb(220, 80, 80), &message);
                ui.add_space(4.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });

        if !open || dismissed {
            self.last_error = None;
        }
    }

    fn render_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(WelcomeAction::Dismiss { show_at_startup }) = show_dialog::<WelcomeDialog>(
            ctx,
            &mut self.welcome_open,
            &mut self.welcome_state,
            &mut self.app_state.ui_preferences.show_welcome,
        ) {
            self.app_state.ui_preferences.show_welcome = show_at_startup;
            if let Err(e) = self.app_state.save() {
                tracing::warn!("Failed to save app state: {}", e);
            }
        }

        let about_ctx = AboutContext {
            session: &self.session,
            plugins: &self.plugins,
        };
        show_dialog::<AboutDialog>(ctx, &mut self.about_open, &mut self.about_state, about_ctx);

        if let Some(PreferencesAction::Apply(prefs)) = show_dialog::<PreferencesDialog>(
            ctx,
            &mut self.preferences_open,
            &mut self.preferences_state,
            PreferencesContext,
        ) {
            self.apply_preferences(ctx, prefs);
        }

        show_dialog::<NewPluginDialog>(
            ctx,
            &mut self.new_plugin_open,
            &mut self.new_plugin_state,
            NewPluginContext,
        );

        let title = self.session.title();
        let unsaved_ctx = UnsavedChangesContext { title: &title };
        if let Some(action) = show_dialog::<UnsavedChangesDialog>(
            ctx,
            &mut self.unsaved_open,
            &mut self.unsaved_state,
            unsaved_ctx,
        ) {
            match action {
                UnsavedChangesAction::SaveThen(pending) => {
                    if self.save(false) {
                        self.perform(ctx, pending);
                    }
                }
                UnsavedChangesAction::Discard(pending) => self.perform(ctx, pending),
            }
        }
    }
}

fn apply_visuals(ctx: &egui::Context, dark: bool) {
    if dark {
        ctx.set_visuals(egui::Visuals::dark());
    } else {
        ctx.set_visuals(egui::Visuals::light());
    }
}

impl eframe::App for ForgeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested())
            && self.session.is_dirty()
            && !self.allow_close
        {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.handle_action(ctx, AppAction::Quit);
        }

        self.handle_keyboard_shortcuts(ctx);

        // Menu bar
        let menu_actions = egui::TopBottomPanel::top("menu_bar")
            .show(ctx, |ui| self.render_menu_bar(ui))
            .inner;
        for action in menu_actions {
            self.handle_action(ctx, action);
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| self.render_status_bar(ui));

        // Dock workspace
        {
            let mut viewer = WorkspaceTabViewer {
                shared: SharedState {
                    session: &self.session,
                    plugins: &self.plugins,
                    app_state: &self.app_state,
                },
                pane_states: &mut self.workspace.pane_states,
                pane_entries: &self.workspace.pane_entries,
                actions: Vec::new(),
            };

            egui_dock::DockArea::new(&mut self.workspace.dock_state)
                .style(egui_dock::Style::from_egui(ctx.style().as_ref()))
                .show(ctx, &mut viewer);

            let actions = viewer.actions;
            for action in actions {
                self.handle_action(ctx, action);
            }
        }

        self.render_dialogs(ctx);
        self.render_error_window(ctx);
        self.process_session_events();

        let title = format!("{} - Figure Forge", self.session.title());
        if title != self.window_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.window_title = title;
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.app_state.cleanup_missing_files();
        if let Err(e) = self.app_state.save() {
            tracing::warn!("Failed to save app state: {}", e);
        }
    }
}
