//! Pane registry
//!
//! The single source of truth for pane kinds: display names and factory
//! functions. The View menu and pane creation are driven from this data.

use crate::frontend::pane_trait::Pane;
use crate::frontend::panes::{ExplorerPaneState, InspectorPaneState, PreviewPaneState};
use crate::frontend::workspace::PaneKind;

/// Metadata for a pane kind, including its factory function.
pub struct PaneKindInfo {
    pub kind: PaneKind,
    pub display_name: &'static str,
    pub factory: fn() -> Box<dyn Pane>,
}

/// Build the pane registry with all known pane kinds.
pub fn build_registry() -> Vec<PaneKindInfo> {
    vec![
        PaneKindInfo {
            kind: PaneKind::Explorer,
            display_name: "Figure Explorer",
            factory: || Box::new(ExplorerPaneState::default()),
        },
        PaneKindInfo {
            kind: PaneKind::Inspector,
            display_name: "Property Inspector",
            factory: || Box::new(InspectorPaneState::default()),
        },
        PaneKindInfo {
            kind: PaneKind::Preview,
            display_name: "Preview",
            factory: || Box::new(PreviewPaneState::default()),
        },
    ]
}
