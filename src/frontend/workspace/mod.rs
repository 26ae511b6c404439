//! Workspace module for dockable pane management
//!
//! Provides the core workspace types: PaneId, PaneKind, Workspace.
//! Uses egui_dock for drag-and-drop docking, tabs, and splits.

pub mod default_layout;
pub mod tab_viewer;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::frontend::pane_registry::{self, PaneKindInfo};
use crate::frontend::pane_trait::Pane;

/// Unique identifier for a pane instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaneId(pub u64);

static NEXT_PANE_ID: AtomicU64 = AtomicU64::new(1);

impl PaneId {
    pub fn next() -> Self {
        Self(NEXT_PANE_ID.fetch_add(1, Ordering::SeqCst))
    }
}

/// Kind of pane (used for dispatch and menu display)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaneKind {
    Explorer,
    Inspector,
    Preview,
}

/// Metadata entry for a pane
pub struct PaneEntry {
    pub id: PaneId,
    pub kind: PaneKind,
    pub title: String,
}

/// The workspace holds all dock state, pane data, and the pane registry.
pub struct Workspace {
    pub dock_state: egui_dock::DockState<PaneId>,
    pub pane_states: HashMap<PaneId, Box<dyn Pane>>,
    pub pane_entries: HashMap<PaneId, PaneEntry>,
    registry: Vec<PaneKindInfo>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Create a workspace with the default layout.
    pub fn new() -> Self {
        let mut workspace = Self {
            dock_state: egui_dock::DockState::new(vec![]),
            pane_states: HashMap::new(),
            pane_entries: HashMap::new(),
            registry: pane_registry::build_registry(),
        };
        workspace.dock_state = default_layout::build_default_layout(&mut workspace);
        workspace
    }

    fn info(&self, kind: PaneKind) -> Option<&PaneKindInfo> {
        self.registry.iter().find(|info| info.kind == kind)
    }

    /// Register a new pane and return its ID.
    pub fn register_pane(&mut self, kind: PaneKind) -> Option<PaneId> {
        let info = self.info(kind)?;
        let state = (info.factory)();
        let title = info.display_name.to_string();

        let id = PaneId::next();
        self.pane_states.insert(id, state);
        self.pane_entries.insert(id, PaneEntry { id, kind, title });
        Some(id)
    }

    /// Registered pane kinds in menu order.
    pub fn pane_kinds(&self) -> impl Iterator<Item = (PaneKind, &'static str)> + '_ {
        self.registry.iter().map(|info| (info.kind, info.display_name))
    }

    /// Find the pane of the given kind, if it is open.
    pub fn find_pane(&self, kind: PaneKind) -> Option<PaneId> {
        self.pane_entries
            .values()
            .find(|e| e.kind == kind)
            .map(|e| e.id)
    }

    /// Focus the pane of `kind`, creating it if it was closed.
    pub fn open_pane(&mut self, kind: PaneKind) {
        if let Some(id) = self.find_pane(kind) {
            if let Some(location) = self.dock_state.find_tab(&id) {
                self.dock_state.set_active_tab(location);
                return;
            }
        }
        if let Some(id) = self.register_pane(kind) {
            self.dock_state.push_to_first_leaf(id);
        }
    }

    /// Remove a pane by ID.
    pub fn remove_pane(&mut self, id: PaneId) {
        self.pane_states.remove(&id);
        self.pane_entries.remove(&id);
    }
}
