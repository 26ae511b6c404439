//! Rhai plugins for figures
//!
//! A plugin is a Rhai script that defines `fn run(obj)`, where `obj` is the
//! object selected in the figure explorer. It may also define `fn name()`,
//! `fn tooltip()` and `fn submenu()` to control how it is listed in the
//! Plugins menu. See [`engine`] for the API available to scripts.
//!
//! ## Example
//!
//! Thicken every line of an axes:
//! ```rhai
//! fn name() { "Thicken Lines" }
//!
//! fn run(ax) {
//!     for line in ax.invoke("get_lines") {
//!         line.set("set_linewidth", line.get("get_linewidth") * 2.0);
//!     }
//! }
//! ```

pub mod builtin;
pub mod engine;

pub use engine::ScriptObject;

use rhai::{Dynamic, Engine, Scope, AST};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::drawable::DrawableRef;

/// Errors raised while loading or running plugins
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Failed to read plugin {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Plugin '{plugin}' failed to compile: {message}")]
    Compile { plugin: String, message: String },

    #[error("Plugin '{plugin}' does not define fn run(obj)")]
    MissingRun { plugin: String },

    #[error("Plugin '{plugin}' failed: {message}")]
    Runtime { plugin: String, message: String },

    #[error("No plugin with id '{0}'")]
    NotFound(String),
}

/// Where a plugin came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginOrigin {
    Builtin,
    File(PathBuf),
}

/// A compiled plugin
#[derive(Clone)]
pub struct Plugin {
    id: String,
    name: String,
    tooltip: Option<String>,
    submenu: Option<String>,
    origin: PluginOrigin,
    ast: AST,
}

impl Plugin {
    /// Stable identifier (built-in id or file stem)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Menu label
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn submenu(&self) -> Option<&str> {
        self.submenu.as_deref()
    }

    pub fn origin(&self) -> &PluginOrigin {
        &self.origin
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("submenu", &self.submenu)
            .field("origin", &self.origin)
            .finish()
    }
}

fn defines(ast: &AST, name: &str, arity: usize) -> bool {
    ast.iter_functions()
        .any(|f| f.name == name && f.params.len() == arity)
}

/// Rhai engine plus the loaded plugins
pub struct PluginEngine {
    engine: Engine,
    plugins: Vec<Plugin>,
}

impl Default for PluginEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginEngine {
    /// Create an engine with the built-in plugins loaded
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine::configure_engine(&mut engine);

        let mut this = Self {
            engine,
            plugins: Vec::new(),
        };
        for (id, source) in builtin::ALL {
            match this.compile(id, source, PluginOrigin::Builtin) {
                Ok(plugin) => this.plugins.push(plugin),
                Err(e) => tracing::error!("Built-in plugin {} is broken: {}", id, e),
            }
        }
        this
    }

    /// Compile a plugin and read its metadata
    pub fn compile(
        &self,
        id: &str,
        source: &str,
        origin: PluginOrigin,
    ) -> Result<Plugin, PluginError> {
        let ast = self
            .engine
            .compile(source)
            .map_err(|e| PluginError::Compile {
                plugin: id.to_string(),
                message: e.to_string(),
            })?;

        if !defines(&ast, "run", 1) {
            return Err(PluginError::MissingRun {
                plugin: id.to_string(),
            });
        }

        let name = self
            .metadata(&ast, "name")
            .unwrap_or_else(|| id.to_string());
        let tooltip = self.metadata(&ast, "tooltip");
        let submenu = self.metadata(&ast, "submenu");

        Ok(Plugin {
            id: id.to_string(),
            name,
            tooltip,
            submenu,
            origin,
            ast,
        })
    }

    fn metadata(&self, ast: &AST, function: &str) -> Option<String> {
        if !defines(ast, function, 0) {
            return None;
        }
        match self
            .engine
            .call_fn::<Dynamic>(&mut Scope::new(), ast, function, ())
        {
            Ok(value) => value.into_string().ok(),
            Err(e) => {
                tracing::warn!("Plugin metadata {}() failed: {}", function, e);
                None
            }
        }
    }

    /// Load every `*.rhai` file in `dir`
    ///
    /// Broken plugins are logged and skipped; their errors are returned.
    /// Plugins whose id is already loaded replace the earlier definition.
    pub fn load_directory(&mut self, dir: &Path) -> Vec<PluginError> {
        let mut errors = Vec::new();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Cannot read plugin directory {:?}: {}", dir, e);
                errors.push(PluginError::Io {
                    path: dir.to_path_buf(),
                    source: e,
                });
                return errors;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "rhai"))
            .collect();
        paths.sort();

        for path in paths {
            match self.load_file(&path) {
                Ok(plugin) => {
                    tracing::info!("Loaded plugin '{}' from {:?}", plugin.name, path);
                    self.insert(plugin);
                }
                Err(e) => {
                    tracing::warn!("Skipping plugin {:?}: {}", path, e);
                    errors.push(e);
                }
            }
        }
        errors
    }

    fn load_file(&self, path: &Path) -> Result<Plugin, PluginError> {
        let source = std::fs::read_to_string(path).map_err(|e| PluginError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.compile(&id, &source, PluginOrigin::File(path.to_path_buf()))
    }

    fn insert(&mut self, plugin: Plugin) {
        match self.plugins.iter_mut().find(|p| p.id == plugin.id) {
            Some(existing) => *existing = plugin,
            None => self.plugins.push(plugin),
        }
    }

    /// Loaded plugins in menu order
    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn find(&self, id: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.id == id)
    }

    /// Run the plugin `id` on `obj`
    pub fn run(&self, id: &str, obj: &DrawableRef) -> Result<(), PluginError> {
        let plugin = self
            .find(id)
            .ok_or_else(|| PluginError::NotFound(id.to_string()))?;

        tracing::info!("Running plugin '{}'", plugin.name);
        self.engine
            .call_fn::<Dynamic>(
                &mut Scope::new(),
                &plugin.ast,
                "run",
                (ScriptObject(obj.clone()),),
            )
            .map(|_| ())
            .map_err(|e| PluginError::Runtime {
                plugin: plugin.name.clone(),
                message: e.to_string(),
            })
    }
}

/// Starting point written by "New Plugin..."
pub const PLUGIN_TEMPLATE: &str = r#"// Shown in the Plugins menu
fn name() { "New Plugin" }
fn tooltip() { "Describe what the plugin does." }
fn submenu() { "Custom" }

// Called with the object selected in the figure explorer
fn run(obj) {
    print(`Running on ${obj.type_name()} '${obj.label()}'`);
}
"#;

/// Write [`PLUGIN_TEMPLATE`] to a fresh `new_plugin*.rhai` file in `dir`
///
/// Creates `dir` if needed and never overwrites an existing file.
pub fn create_template(dir: &Path) -> Result<PathBuf, PluginError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| PluginError::Io { path, source }
    };
    std::fs::create_dir_all(dir).map_err(io_error(dir))?;

    for n in 1u32.. {
        let file_name = match n {
            1 => "new_plugin.rhai".to_string(),
            n => format!("new_plugin_{}.rhai", n),
        };
        let path = dir.join(file_name);
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path);
        match file {
            Ok(mut file) => {
                use std::io::Write;
                file.write_all(PLUGIN_TEMPLATE.as_bytes())
                    .map_err(io_error(&path))?;
                tracing::info!("Created plugin template {:?}", path);
                return Ok(path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(io_error(&path)(e)),
        }
    }
    Err(PluginError::Io {
        path: dir.to_path_buf(),
        source: std::io::Error::other("no free plugin file name"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{Artist, ArtistKind};
    use crate::types::Value;
    use std::sync::Arc;

    fn axes_with_line() -> (Arc<Artist>, Arc<Artist>) {
        let fig = Artist::figure();
        let ax = fig.add_axes("main").unwrap();
        ax.plot(&[1.0, 2.0, 4.0], &[-1.0, 0.5, 3.0]).unwrap();
        (fig, ax)
    }

    #[test]
    fn test_builtins_compile_with_metadata() {
        let engine = PluginEngine::new();
        let names: Vec<_> = engine.plugins().iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            vec![
                "Toggle Spines",
                "Set Spine Bounds",
                "Add Legend",
                "Reduce Tick Limits",
                "Add Annotation",
                "Add Minor Data Ticks",
            ]
        );
        assert_eq!(engine.find("toggle_spines").unwrap().submenu(), Some("Spines"));
    }

    #[test]
    fn test_toggle_spines_on_axes() {
        let engine = PluginEngine::new();
        let (_fig, ax) = axes_with_line();
        let obj: DrawableRef = ax.clone();
        engine.run("toggle_spines", &obj).unwrap();

        assert_eq!(ax.spine("top").unwrap().property("visible"), Ok(Value::Bool(false)));
        assert_eq!(ax.spine("right").unwrap().property("visible"), Ok(Value::Bool(false)));
        assert_eq!(ax.spine("left").unwrap().property("visible"), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_toggle_spines_on_figure_reaches_every_axes() {
        let engine = PluginEngine::new();
        let fig = Artist::figure();
        let axes = [fig.add_axes("a").unwrap(), fig.add_axes("b").unwrap()];
        let obj: DrawableRef = fig.clone();
        engine.run("toggle_spines", &obj).unwrap();

        for ax in &axes {
            assert_eq!(ax.spine("top").unwrap().property("visible"), Ok(Value::Bool(false)));
            assert_eq!(ax.spine("right").unwrap().property("visible"), Ok(Value::Bool(false)));
            assert_eq!(ax.spine("bottom").unwrap().property("visible"), Ok(Value::Bool(true)));
        }
    }

    #[test]
    fn test_set_spine_bounds_uses_data_range() {
        let engine = PluginEngine::new();
        let (_fig, ax) = axes_with_line();
        let obj: DrawableRef = ax.clone();
        engine.run("set_spine_bounds", &obj).unwrap();

        assert_eq!(
            ax.spine("bottom").unwrap().property("bounds"),
            Ok(Value::from(&[1.0, 4.0][..]))
        );
        assert_eq!(
            ax.spine("left").unwrap().property("bounds"),
            Ok(Value::from(&[-1.0, 3.0][..]))
        );
    }

    #[test]
    fn test_add_legend() {
        let engine = PluginEngine::new();
        let (_fig, ax) = axes_with_line();
        let obj: DrawableRef = ax.clone();
        engine.run("add_legend", &obj).unwrap();
        assert_eq!(ax.slot("legend_").unwrap().kind(), ArtistKind::Legend);
    }

    #[test]
    fn test_reduce_tick_limits_pins_outer_ticks() {
        let engine = PluginEngine::new();
        let (_fig, ax) = axes_with_line();
        let obj: DrawableRef = ax.clone();
        engine.run("reduce_tick_limits", &obj).unwrap();

        let xaxis = ax.slot("xaxis").unwrap();
        let ticks = xaxis.property("ticks").unwrap().as_f64_vec().unwrap();
        assert_eq!(ticks.first(), Some(&1.0));
        assert_eq!(ticks.last(), Some(&4.0));
    }

    #[test]
    fn test_add_annotation_centers_text() {
        let engine = PluginEngine::new();
        let (_fig, ax) = axes_with_line();
        let before = ax.children_of_kind(ArtistKind::Text).len();
        let obj: DrawableRef = ax.clone();
        engine.run("add_annotation", &obj).unwrap();

        let texts = ax.children_of_kind(ArtistKind::Text);
        assert_eq!(texts.len(), before + 1);
        let note = texts
            .iter()
            .find(|t| t.property("text") == Ok(Value::from("Annotation")))
            .unwrap();

        let xlim = ax.property("xlim").unwrap().as_f64_vec().unwrap();
        let ylim = ax.property("ylim").unwrap().as_f64_vec().unwrap();
        assert_eq!(
            note.property("position"),
            Ok(Value::from(&[(xlim[0] + xlim[1]) / 2.0, (ylim[0] + ylim[1]) / 2.0][..]))
        );
    }

    #[test]
    fn test_add_minor_data_ticks() {
        let engine = PluginEngine::new();
        let (_fig, ax) = axes_with_line();
        ax.plot(&[4.0, 2.0], &[0.5, 7.0]).unwrap();
        let obj: DrawableRef = ax.clone();
        engine.run("add_minor_data_ticks", &obj).unwrap();

        let minor = |slot| {
            ax.slot(slot)
                .unwrap()
                .property("minor_ticks")
                .unwrap()
                .as_f64_vec()
                .unwrap()
        };
        assert_eq!(minor("xaxis"), vec![1.0, 2.0, 4.0]);
        assert_eq!(minor("yaxis"), vec![-1.0, 0.5, 3.0, 7.0]);
    }

    #[test]
    fn test_add_minor_data_ticks_on_single_axis() {
        let engine = PluginEngine::new();
        let (_fig, ax) = axes_with_line();
        let yaxis = ax.slot("yaxis").unwrap();
        let obj: DrawableRef = yaxis.clone();
        engine.run("add_minor_data_ticks", &obj).unwrap();

        assert_eq!(
            yaxis.property("minor_ticks").unwrap().as_f64_vec(),
            Some(vec![-1.0, 0.5, 3.0])
        );
        let xaxis = ax.slot("xaxis").unwrap();
        assert_eq!(xaxis.property("minor_ticks"), Ok(Value::Tuple(vec![])));

        let line: DrawableRef = ax.children_of_kind(ArtistKind::Line2D).remove(0);
        assert!(matches!(
            engine.run("add_minor_data_ticks", &line),
            Err(PluginError::Runtime { .. })
        ));
    }

    #[test]
    fn test_wrong_target_type_is_runtime_error() {
        let engine = PluginEngine::new();
        let fig: DrawableRef = Artist::figure();
        assert!(matches!(
            engine.run("add_legend", &fig),
            Err(PluginError::Runtime { .. })
        ));
        assert!(matches!(
            engine.run("missing", &fig),
            Err(PluginError::NotFound(_))
        ));
    }

    #[test]
    fn test_create_template_picks_unused_names() {
        let dir = tempfile::tempdir().unwrap();
        let plugins = dir.path().join("plugins");
        let first = create_template(&plugins).unwrap();
        let second = create_template(&plugins).unwrap();

        assert_eq!(first.file_name().unwrap(), "new_plugin.rhai");
        assert_eq!(second.file_name().unwrap(), "new_plugin_2.rhai");
        assert_eq!(std::fs::read_to_string(&first).unwrap(), PLUGIN_TEMPLATE);
    }

    #[test]
    fn test_template_loads_and_runs() {
        let dir = tempfile::tempdir().unwrap();
        create_template(dir.path()).unwrap();

        let mut engine = PluginEngine::new();
        assert!(engine.load_directory(dir.path()).is_empty());
        let plugin = engine.find("new_plugin").unwrap();
        assert_eq!(plugin.name(), "New Plugin");
        assert_eq!(plugin.submenu(), Some("Custom"));

        let fig: DrawableRef = Artist::figure();
        engine.run("new_plugin", &fig).unwrap();
    }

    #[test]
    fn test_load_directory_skips_broken_plugins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("relabel.rhai"),
            r#"fn name() { "Relabel" } fn run(obj) { obj.set("set_label", "renamed"); }"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.rhai"), "fn run(obj) {").unwrap();
        std::fs::write(dir.path().join("norun.rhai"), "fn name() { \"x\" }").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut engine = PluginEngine::new();
        let errors = engine.load_directory(dir.path());
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| matches!(e, PluginError::Compile { .. })));
        assert!(errors.iter().any(|e| matches!(e, PluginError::MissingRun { .. })));

        let plugin = engine.find("relabel").unwrap();
        assert_eq!(plugin.name(), "Relabel");
        assert!(plugin.tooltip().is_none());

        let fig = Artist::figure();
        let obj: DrawableRef = fig.clone();
        engine.run("relabel", &obj).unwrap();
        assert_eq!(fig.property("label"), Ok(Value::from("renamed")));
    }
}
