//! Notifications emitted by an editing session

use std::path::PathBuf;

use crate::binding::PropertyChanged;
use crate::drawable::{describe, DrawableRef};

/// Something the UI may want to react to
#[derive(Clone)]
pub enum SessionEvent {
    /// An object became the selection
    ObjectSelected(DrawableRef),
    /// The selection was cleared (explicitly or because the object vanished)
    SelectionCleared,
    /// A property edit succeeded
    PropertyChanged(PropertyChanged),
    /// The explorer tree was rebuilt
    TreeRebuilt,
    /// A different figure is being edited
    FigureReplaced,
    /// The schema snapshot was swapped
    SchemaReloaded { generation: u64 },
    Saved(PathBuf),
}

impl std::fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::ObjectSelected(obj) => {
                f.debug_tuple("ObjectSelected").field(&describe(obj)).finish()
            }
            SessionEvent::SelectionCleared => write!(f, "SelectionCleared"),
            SessionEvent::PropertyChanged(change) => {
                f.debug_tuple("PropertyChanged").field(change).finish()
            }
            SessionEvent::TreeRebuilt => write!(f, "TreeRebuilt"),
            SessionEvent::FigureReplaced => write!(f, "FigureReplaced"),
            SessionEvent::SchemaReloaded { generation } => f
                .debug_struct("SchemaReloaded")
                .field("generation", generation)
                .finish(),
            SessionEvent::Saved(path) => f.debug_tuple("Saved").field(path).finish(),
        }
    }
}
