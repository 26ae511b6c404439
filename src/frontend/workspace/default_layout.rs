//! Default workspace layout

use egui_dock::{DockState, NodeIndex};

use super::{PaneId, PaneKind, Workspace};

/// Build the default dock layout and return the DockState.
///
/// Layout:
/// ```text
/// ┌──────────────┬────────────────────────────────┐
/// │  Figure      │                                │
/// │  Explorer    │                                │
/// │──────────────│            Preview             │
/// │  Property    │                                │
/// │  Inspector   │                                │
/// └──────────────┴────────────────────────────────┘
/// ```
pub fn build_default_layout(workspace: &mut Workspace) -> DockState<PaneId> {
    let explorer = workspace.register_pane(PaneKind::Explorer);
    let inspector = workspace.register_pane(PaneKind::Inspector);
    let preview = workspace.register_pane(PaneKind::Preview);

    let mut dock = DockState::new(preview.into_iter().collect());

    if let Some(explorer) = explorer {
        let [_center, left] = dock
            .main_surface_mut()
            .split_left(NodeIndex::root(), 0.3, vec![explorer]);

        if let Some(inspector) = inspector {
            dock.main_surface_mut()
                .split_below(left, 0.45, vec![inspector]);
        }
    }

    dock
}
