//! Modal-style dialogs
//!
//! A dialog is a zero-sized type implementing [`Dialog`]; its state lives in
//! the app next to an `open` flag and [`show_dialog`] draws it for one frame.

use egui::{Align2, Context, Ui};

/// What a dialog asks for after a frame
#[derive(Debug, Clone, Default)]
pub enum DialogAction<A> {
    #[default]
    None,
    Close,
    CloseWithAction(A),
}

/// Per-dialog state, reset whenever the dialog closes
pub trait DialogState: Default {
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// False when there is nothing meaningful to show
    fn is_valid(&self) -> bool {
        true
    }
}

/// Window placement of a dialog
#[derive(Debug, Clone)]
pub struct DialogWindowConfig {
    pub default_width: f32,
    pub resizable: bool,
    pub anchor: Option<(Align2, [f32; 2])>,
}

impl Default for DialogWindowConfig {
    fn default() -> Self {
        Self {
            default_width: 400.0,
            resizable: true,
            anchor: None,
        }
    }
}

impl DialogWindowConfig {
    /// Fixed-size window pinned to the screen center
    pub fn centered_modal(width: f32) -> Self {
        Self {
            default_width: width,
            resizable: false,
            anchor: Some((Align2::CENTER_CENTER, [0.0, 0.0])),
        }
    }
}

pub trait Dialog {
    type State: DialogState;
    type Action;
    /// Borrowed data the dialog reads while rendering
    type Context<'a>;

    fn title(state: &Self::State) -> &'static str;

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::default()
    }

    fn render(
        state: &mut Self::State,
        ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action>;
}

/// Draw `D` if `is_open`, returning the action it closed with
///
/// Closing, from a button or the window's title bar, clears `is_open` and
/// resets `state`.
pub fn show_dialog<D: Dialog>(
    ctx: &Context,
    is_open: &mut bool,
    state: &mut D::State,
    dialog_ctx: D::Context<'_>,
) -> Option<D::Action> {
    if !*is_open {
        return None;
    }

    let config = D::window_config();
    let mut window = egui::Window::new(D::title(state))
        .collapsible(false)
        .resizable(config.resizable)
        .default_width(config.default_width);
    if let Some((align, offset)) = config.anchor {
        window = window.anchor(align, offset);
    }

    let mut result = None;
    let mut close = false;
    let mut window_open = true;
    window.open(&mut window_open).show(ctx, |ui| {
        match D::render(state, dialog_ctx, ui) {
            DialogAction::None => {}
            DialogAction::Close => close = true,
            DialogAction::CloseWithAction(action) => {
                close = true;
                result = Some(action);
            }
        }
    });

    if close || !window_open {
        *is_open = false;
        state.reset();
    }
    result
}

pub mod about;
pub mod new_plugin;
pub mod preferences;
pub mod unsaved_changes;
pub mod welcome;

pub use about::{AboutContext, AboutDialog, AboutState};
pub use new_plugin::{NewPluginContext, NewPluginDialog, NewPluginState};
pub use preferences::{PreferencesAction, PreferencesContext, PreferencesDialog, PreferencesState};
pub use unsaved_changes::{
    UnsavedChangesAction, UnsavedChangesContext, UnsavedChangesDialog, UnsavedChangesState,
};
pub use welcome::{WelcomeAction, WelcomeDialog, WelcomeState};
