//! Editing session
//!
//! An [`EditingSession`] ties the core together for one open figure: the
//! artist root, the schema store, the explorer tree, the selection and the
//! binding surface that backs the property inspector.
//!
//! Everything runs on the caller's thread. Operations that change the figure
//! structure rebuild the explorer tree and restore the selection by object
//! identity; if the selected object no longer exists the selection is cleared.
//! Notable changes are queued as [`SessionEvent`]s for the UI to drain.

pub mod events;

pub use events::SessionEvent;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use crate::binding::{BindingSurface, PropertyChanged};
use crate::drawable::{describe, DrawableRef, WeakDrawable};
use crate::error::{ForgeError, Result, ResultExt};
use crate::explorer::{ExplorerTree, NodeId};
use crate::figure::{self, Artist};
use crate::schema::{Schema, SchemaSource, SchemaStore};
use crate::scripting::PluginEngine;
use crate::types::Value;

/// State of one open figure
pub struct EditingSession {
    figure: Arc<Artist>,
    schema: SchemaStore,
    tree: ExplorerTree,
    selection: Option<WeakDrawable>,
    selected_node: Option<NodeId>,
    binding: BindingSurface,
    dirty: bool,
    path: Option<PathBuf>,
    events: Vec<SessionEvent>,
}

impl EditingSession {
    /// Start editing `figure`
    pub fn new(figure: Arc<Artist>, schema: SchemaStore) -> Result<Self> {
        let root: DrawableRef = figure.clone();
        let tree = ExplorerTree::build(&root)?;
        Ok(Self {
            figure,
            schema,
            tree,
            selection: None,
            selected_node: None,
            binding: BindingSurface::new(),
            dirty: false,
            path: None,
            events: Vec::new(),
        })
    }

    // ==================== Accessors ====================

    pub fn figure(&self) -> &Arc<Artist> {
        &self.figure
    }

    pub fn tree(&self) -> &ExplorerTree {
        &self.tree
    }

    pub fn schema(&self) -> Arc<Schema> {
        self.schema.snapshot()
    }

    pub fn schema_store(&self) -> &SchemaStore {
        &self.schema
    }

    pub fn binding(&self) -> &BindingSurface {
        &self.binding
    }

    /// The selected object, if it still exists
    pub fn selection(&self) -> Option<DrawableRef> {
        self.selection.as_ref().and_then(Weak::upgrade)
    }

    pub fn selected_node(&self) -> Option<NodeId> {
        self.selected_node
    }

    /// Whether the figure has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Window title: file name plus an unsaved marker
    pub fn title(&self) -> String {
        let name = self
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());
        if self.dirty {
            format!("{}*", name)
        } else {
            name
        }
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // ==================== Selection ====================

    /// Select the object wrapped by an explorer node
    pub fn select_node(&mut self, id: NodeId) -> Result<()> {
        let obj = self
            .tree
            .node(id)
            .and_then(|node| node.object())
            .ok_or(ForgeError::NoSelection)?;
        self.bind(obj, Some(id));
        Ok(())
    }

    /// Select `obj` directly; its node is looked up in the current tree
    pub fn select_object(&mut self, obj: &DrawableRef) {
        let node = self.tree.restore(obj);
        self.bind(obj.clone(), node);
    }

    fn bind(&mut self, obj: DrawableRef, node: Option<NodeId>) {
        tracing::debug!("Selected {}", describe(&obj));
        self.binding.bind(&self.schema.snapshot(), &obj);
        self.selection = Some(Arc::downgrade(&obj));
        self.selected_node = node;
        self.events.push(SessionEvent::ObjectSelected(obj));
    }

    pub fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            self.events.push(SessionEvent::SelectionCleared);
        }
        self.selected_node = None;
        self.binding.clear();
    }

    // ==================== Editing ====================

    /// Apply an inspector edit to the selected object
    ///
    /// On success the figure is marked dirty and the tree is rebuilt so that
    /// changed labels show up. Failures are returned to the caller; values
    /// already applied by the object are not rolled back.
    pub fn apply_edit(&mut self, name: &str, value: Value) -> Result<PropertyChanged> {
        let schema = self.schema.snapshot();
        let changed = self.binding.apply(&schema, name, value).inspect_err(|e| {
            tracing::error!("Edit of '{}' failed: {}", name, e);
        })?;

        self.dirty = true;
        self.events.push(SessionEvent::PropertyChanged(changed.clone()));
        self.rebuild_tree()?;
        Ok(changed)
    }

    /// Rebuild the explorer tree and restore the selection by identity
    pub fn rebuild_tree(&mut self) -> Result<()> {
        let root: DrawableRef = self.figure.clone();
        self.tree = ExplorerTree::build(&root)?;
        self.events.push(SessionEvent::TreeRebuilt);

        let restored = self.selection().and_then(|obj| self.tree.restore(&obj));
        match restored {
            Some(id) => self.selected_node = Some(id),
            None if self.selection.is_some() => {
                tracing::debug!("Selection no longer in the figure; clearing it");
                self.clear_selection();
            }
            None => {}
        }
        tracing::info!("Rebuilt explorer tree ({} nodes)", self.tree.len());
        Ok(())
    }

    /// Reload the schema from its source and rebind the selection
    ///
    /// A failed reload keeps the previous schema.
    pub fn reload_schema(&mut self) -> Result<()> {
        self.schema.reload()?;
        self.after_schema_change();
        Ok(())
    }

    /// Load the schema from a different source
    pub fn set_schema_source(&mut self, source: SchemaSource) -> Result<()> {
        self.schema.set_source(source)?;
        self.after_schema_change();
        Ok(())
    }

    fn after_schema_change(&mut self) {
        self.events.push(SessionEvent::SchemaReloaded {
            generation: self.schema.generation(),
        });
        if let Some(obj) = self.selection() {
            let node = self.selected_node;
            self.bind(obj, node);
        }
    }

    /// Remove the selected object from the figure
    pub fn delete_selected(&mut self) -> Result<()> {
        let obj = self.selection().ok_or(ForgeError::NoSelection)?;
        obj.remove()
            .map_err(ForgeError::from)
            .with_context(|| format!("Cannot delete {}", describe(&obj)))?;
        tracing::info!("Deleted {}", describe(&obj));

        self.clear_selection();
        self.dirty = true;
        self.rebuild_tree()
    }

    /// Run a plugin on the selected object
    ///
    /// The figure is marked dirty and the tree rebuilt even when the plugin
    /// fails part way, since it may already have changed the figure.
    pub fn run_plugin(&mut self, engine: &PluginEngine, id: &str) -> Result<()> {
        let obj = self.selection().ok_or(ForgeError::NoSelection)?;
        let result = engine.run(id, &obj);

        self.dirty = true;
        self.rebuild_tree()?;
        if let Some(obj) = self.selection() {
            let node = self.selected_node;
            self.bind(obj, node);
        }

        result.map_err(|e| {
            tracing::error!("{}", e);
            ForgeError::from(e)
        })
    }

    // ==================== Figures ====================

    /// Start editing a different figure
    pub fn replace_figure(&mut self, figure: Arc<Artist>) -> Result<()> {
        let root: DrawableRef = figure.clone();
        let tree = ExplorerTree::build(&root)?;

        self.clear_selection();
        self.figure = figure;
        self.tree = tree;
        self.events.push(SessionEvent::FigureReplaced);
        self.events.push(SessionEvent::TreeRebuilt);
        Ok(())
    }

    /// Replace the figure with an empty one holding a single axes
    pub fn new_figure(&mut self) -> Result<()> {
        let fig = Artist::figure();
        fig.add_axes("Axes 1")?;
        self.replace_figure(fig)?;
        self.path = None;
        self.dirty = false;
        Ok(())
    }

    pub fn open_figure(&mut self, path: &Path) -> Result<()> {
        let fig = figure::load_figure(path)?;
        self.replace_figure(fig)?;
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    /// Save to `path`, or to the current file when `path` is `None`
    pub fn save_figure(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| self.path.clone())
            .ok_or_else(|| ForgeError::Document("No file chosen for this figure".to_string()))?;

        figure::save_figure(&self.figure, &path)?;
        self.path = Some(path.clone());
        self.dirty = false;
        self.events.push(SessionEvent::Saved(path.clone()));
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::ArtistKind;

    fn session() -> EditingSession {
        let fig = Artist::figure();
        let ax = fig.add_axes("main").unwrap();
        ax.plot(&[0.0, 1.0], &[0.0, 1.0]).unwrap();
        let store = SchemaStore::with_schema(SchemaSource::Builtin, Schema::builtin().unwrap());
        EditingSession::new(fig, store).unwrap()
    }

    fn line_node(session: &EditingSession) -> NodeId {
        session
            .tree()
            .iter()
            .find(|n| n.type_name == "Line2D")
            .map(|n| n.id)
            .unwrap()
    }

    #[test]
    fn test_select_binds_inspector() {
        let mut session = session();
        let id = line_node(&session);
        session.select_node(id).unwrap();

        assert_eq!(session.selected_node(), Some(id));
        let description = session.binding().description().unwrap();
        assert_eq!(description.type_name, "Line2D");
        assert!(description.field("width").is_some());
        assert!(matches!(
            session.drain_events().as_slice(),
            [SessionEvent::ObjectSelected(_)]
        ));
    }

    #[test]
    fn test_apply_edit_marks_dirty_and_keeps_selection() {
        let mut session = session();
        let id = line_node(&session);
        session.select_node(id).unwrap();
        session.drain_events();

        session.apply_edit("label", Value::from("signal")).unwrap();
        assert!(session.is_dirty());
        assert_eq!(session.title(), "Untitled*");

        let node = session.tree().node(session.selected_node().unwrap()).unwrap();
        assert_eq!(node.label, "Line2D - signal");
        assert!(session
            .drain_events()
            .iter()
            .any(|e| matches!(e, SessionEvent::PropertyChanged(c) if c.name == "label")));
    }

    #[test]
    fn test_failed_edit_is_not_announced() {
        let mut session = session();
        session.select_node(line_node(&session)).unwrap();
        session.drain_events();

        assert!(session.apply_edit("style", Value::from("wavy")).is_err());
        assert!(!session.is_dirty());
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_delete_selected_clears_selection() {
        let mut session = session();
        let before = session.tree().len();
        session.select_node(line_node(&session)).unwrap();
        session.delete_selected().unwrap();

        assert!(session.selection().is_none());
        assert!(session.binding().description().is_none());
        assert_eq!(session.tree().len(), before - 1);
        assert!(matches!(session.delete_selected(), Err(ForgeError::NoSelection)));
    }

    #[test]
    fn test_figure_root_cannot_be_deleted() {
        let mut session = session();
        session.select_node(NodeId::ROOT).unwrap();
        assert!(session.delete_selected().is_err());
        assert!(session.selection().is_some());
    }

    #[test]
    fn test_run_plugin_restores_selection() {
        let mut session = session();
        let axes_id = session
            .tree()
            .iter()
            .find(|n| n.type_name == "Axes")
            .map(|n| n.id)
            .unwrap();
        session.select_node(axes_id).unwrap();

        let engine = PluginEngine::new();
        session.run_plugin(&engine, "add_legend").unwrap();

        assert!(session.is_dirty());
        let selected = session.selected_node().unwrap();
        assert_eq!(session.tree().node(selected).unwrap().type_name, "Axes");
        let axes = session.figure().children_of_kind(ArtistKind::Axes);
        assert_eq!(axes[0].slot("legend_").map(|l| l.kind()), Some(ArtistKind::Legend));
    }

    #[test]
    fn test_save_requires_path_then_remembers_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session();
        assert!(matches!(session.save_figure(None), Err(ForgeError::Document(_))));

        let path = dir.path().join("saved.forge");
        session.save_figure(Some(&path)).unwrap();
        assert_eq!(session.path(), Some(path.as_path()));
        assert_eq!(session.title(), "saved.forge");

        session.new_figure().unwrap();
        assert!(session.path().is_none());
        session.open_figure(&path).unwrap();
        assert!(!session.is_dirty());
        assert_eq!(session.figure().children_of_kind(ArtistKind::Axes).len(), 1);
    }
}
