//! # Figure Forge: interactive property editing for plotting object graphs
//!
//! Figure Forge opens a figure (a tree of plot objects), shows it as an
//! explorer tree, and lets the user edit the properties of the selected
//! object through editors generated from a declarative schema.
//!
//! ## Architecture
//!
//! - **Drawable**: the object protocol the editor works against ([`drawable`])
//! - **Resolver**: dotted/indexed attribute paths with getter/setter
//!   conventions ([`resolver`])
//! - **Schema**: per-type property declarations, loaded from JSON or TOML
//!   ([`schema`])
//! - **Explorer**: the object tree with weak back-references ([`explorer`])
//! - **Binding**: the property surface of one selected object ([`binding`])
//! - **Figure**: an in-memory plotting model and its documents ([`figure`])
//! - **Scripting**: rhai plugins run on the selected object ([`scripting`])
//! - **Session / Frontend**: the editing session and the eframe/egui app
//!
//! ## Configuration
//!
//! Application state (recent files, preferences, plugin directory, schema
//! override) is stored in the platform config directory under
//! `dev.figureforge.figure-forge`:
//!
//! - **Linux**: `~/.config/dev.figureforge.figure-forge/`
//! - **macOS**: `~/Library/Application Support/dev.figureforge.figure-forge/`
//! - **Windows**: `%APPDATA%\dev.figureforge.figure-forge\`
//!
//! ## Example
//!
//! ```no_run
//! use figure_forge::{
//!     binding::BindingSurface,
//!     drawable::DrawableRef,
//!     figure::demo_figure,
//!     schema::Schema,
//!     types::Value,
//! };
//!
//! fn main() -> figure_forge::Result<()> {
//!     let schema = Schema::builtin()?;
//!     let figure = demo_figure()?;
//!     let axes = figure.child_artists()[0].clone();
//!     let line: DrawableRef = axes.child_artists()[0].clone();
//!
//!     let mut surface = BindingSurface::new();
//!     surface.bind(&schema, &line);
//!     surface.apply(&schema, "width", Value::Float(3.0))?;
//!     Ok(())
//! }
//! ```

pub mod binding;
pub mod config;
pub mod drawable;
pub mod error;
pub mod explorer;
pub mod figure;
pub mod frontend;
pub mod logging;
pub mod resolver;
pub mod schema;
pub mod scripting;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use binding::{BindingSurface, Description, PropertyField};
pub use config::AppState;
pub use drawable::{Drawable, DrawableError, DrawableRef};
pub use error::{ForgeError, Result};
pub use explorer::{ExplorerTree, NodeId};
pub use figure::Artist;
pub use frontend::ForgeApp;
pub use schema::{Schema, SchemaSource, SchemaStore};
pub use scripting::PluginEngine;
pub use session::EditingSession;
pub use types::{Rgba, Value};
