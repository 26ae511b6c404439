//! Shared state types for the frontend
//!
//! Panes receive `SharedState` via borrowing and return `AppAction`s instead
//! of mutating the session directly.

use std::path::PathBuf;

use crate::config::AppState;
use crate::explorer::NodeId;
use crate::scripting::PluginEngine;
use crate::session::EditingSession;
use crate::types::Value;

use super::workspace::{PaneId, PaneKind};

/// Shared state accessible by all panes (borrowed, not owned)
pub struct SharedState<'a> {
    pub session: &'a EditingSession,
    pub plugins: &'a PluginEngine,
    pub app_state: &'a AppState,
}

/// Actions that panes and menus can emit
#[derive(Debug, Clone)]
pub enum AppAction {
    // Files
    NewFigure,
    /// Ask for a file, then open it
    OpenFigureDialog,
    OpenFigure(PathBuf),
    /// Save to the current file, asking for one if there is none
    SaveFigure,
    SaveFigureAs,
    Quit,

    // Editing
    SelectNode(NodeId),
    ApplyEdit { name: String, value: Value },
    DeleteSelected,
    ReloadSchema,
    RunPlugin(String),
    /// Write a plugin template to the plugin directory
    NewPlugin,
    ReloadPlugins,

    // Preferences
    SetDarkMode(bool),
    SetDebugLogging(bool),

    // Dialogs
    OpenDialog(DialogId),
    ShowError(String),

    // Workspace
    OpenPane(PaneKind),
    ClosePane(PaneId),
}

/// Dialog identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogId {
    About,
    Preferences,
    Welcome,
}
