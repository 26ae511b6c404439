//! Figure Explorer pane - the object tree
//!
//! Shows the explorer tree with collapsible nodes. Clicking a node selects
//! its object. When the selection changes the path to it is expanded once.

use egui::collapsing_header::CollapsingState;
use egui::{Color32, Ui};

use crate::explorer::{ExplorerTree, NodeId};
use crate::frontend::pane_trait::Pane;
use crate::frontend::state::{AppAction, SharedState};
use crate::frontend::workspace::PaneKind;

/// State for the explorer pane
#[derive(Default)]
pub struct ExplorerPaneState {
    /// Case-insensitive label filter
    pub filter: String,
    /// Selection seen on the previous frame
    last_selected: Option<NodeId>,
}

/// True if `id` or any of its descendants matches `filter`
fn matches_filter(tree: &ExplorerTree, id: NodeId, filter: &str) -> bool {
    let Some(node) = tree.node(id) else {
        return false;
    };
    node.label.to_lowercase().contains(filter)
        || node
            .children
            .iter()
            .any(|child| matches_filter(tree, *child, filter))
}

struct TreeView<'a> {
    tree: &'a ExplorerTree,
    selected: Option<NodeId>,
    reveal: &'a [NodeId],
    filter: String,
    actions: Vec<AppAction>,
}

impl TreeView<'_> {
    fn node(&mut self, ui: &mut Ui, id: NodeId) {
        let Some(node) = self.tree.node(id) else {
            return;
        };
        if !self.filter.is_empty() && !matches_filter(self.tree, id, &self.filter) {
            return;
        }

        let is_selected = self.selected == Some(id);
        if node.children.is_empty() {
            if ui.selectable_label(is_selected, &node.label).clicked() {
                self.actions.push(AppAction::SelectNode(id));
            }
            return;
        }

        let mut state = CollapsingState::load_with_default_open(
            ui.ctx(),
            ui.make_persistent_id(("explorer_node", id.0)),
            node.depth < 1,
        );
        if self.reveal.contains(&id) || !self.filter.is_empty() {
            state.set_open(true);
        }

        let children = node.children.clone();
        state
            .show_header(ui, |ui| {
                if ui.selectable_label(is_selected, &node.label).clicked() {
                    self.actions.push(AppAction::SelectNode(id));
                }
            })
            .body(|ui| {
                for child in children {
                    self.node(ui, child);
                }
            });
    }
}

/// Render the explorer pane
pub fn render(state: &mut ExplorerPaneState, shared: &SharedState<'_>, ui: &mut Ui) -> Vec<AppAction> {
    let session = shared.session;
    let tree = session.tree();

    ui.horizontal(|ui| {
        ui.label("Filter:");
        ui.text_edit_singleline(&mut state.filter);
        if !state.filter.is_empty() && ui.small_button("✖").clicked() {
            state.filter.clear();
        }
    });
    ui.separator();

    let selected = session.selected_node();
    let reveal = if selected != state.last_selected {
        state.last_selected = selected;
        selected.map(|id| tree.ancestors(id)).unwrap_or_default()
    } else {
        Vec::new()
    };

    if tree.is_empty() {
        ui.colored_label(Color32::GRAY, "No figure");
        return Vec::new();
    }

    let mut view = TreeView {
        tree,
        selected,
        reveal: &reveal,
        filter: state.filter.to_lowercase(),
        actions: Vec::new(),
    };

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| view.node(ui, NodeId::ROOT));

    view.actions
}

impl Pane for ExplorerPaneState {
    fn kind(&self) -> PaneKind {
        PaneKind::Explorer
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
