//! Pane implementations for the dock workspace

pub mod explorer;
pub mod inspector;
pub mod preview;

pub use explorer::ExplorerPaneState;
pub use inspector::InspectorPaneState;
pub use preview::PreviewPaneState;
