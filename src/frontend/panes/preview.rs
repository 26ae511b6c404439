//! Preview pane - live rendering of the edited figure with egui_plot
//!
//! Each Axes becomes one plot. Only lines are drawn; text placement, spines
//! and the full legend layout are approximated by the plot's own axes and
//! legend.

use egui::{Color32, Ui};
use egui_plot::{Corner, Legend, Line, LineStyle, MarkerShape, Plot, PlotBounds, PlotPoints, Points};

use crate::figure::{Artist, ArtistKind};
use crate::frontend::pane_trait::Pane;
use crate::frontend::state::{AppAction, SharedState};
use crate::frontend::widgets::to_color32;
use crate::frontend::workspace::PaneKind;
use crate::types::{Rgba, Value};

/// State for the preview pane
pub struct PreviewPaneState {
    pub show_grid: bool,
    /// Follow the axes limits instead of free zoom
    pub lock_to_limits: bool,
}

impl Default for PreviewPaneState {
    fn default() -> Self {
        Self {
            show_grid: true,
            lock_to_limits: true,
        }
    }
}

/// One line as it is drawn
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewLine {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub color: Rgba,
    pub width: f32,
    /// `None` draws markers only
    pub style: Option<LineStyle>,
    pub marker: Option<MarkerShape>,
}

/// One Axes as it is drawn
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewAxes {
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub xlim: Option<[f64; 2]>,
    pub ylim: Option<[f64; 2]>,
    pub grid: bool,
    pub legend: bool,
    pub lines: Vec<PreviewLine>,
}

fn text_of(owner: &Artist, slot: &str) -> String {
    owner
        .slot(slot)
        .and_then(|t| t.property("text").ok())
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn pair(value: Option<Value>) -> Option<[f64; 2]> {
    match value?.as_f64_vec()?.as_slice() {
        [lo, hi] => Some([*lo, *hi]),
        _ => None,
    }
}

fn line_style(style: &str) -> Option<LineStyle> {
    match style {
        "None" | "" | " " => None,
        "--" => Some(LineStyle::dashed_loose()),
        ":" => Some(LineStyle::dotted_dense()),
        "-." => Some(LineStyle::dashed_dense()),
        _ => Some(LineStyle::Solid),
    }
}

fn marker_shape(marker: &str) -> Option<MarkerShape> {
    match marker {
        "o" | "." => Some(MarkerShape::Circle),
        "s" => Some(MarkerShape::Square),
        "D" => Some(MarkerShape::Diamond),
        "^" => Some(MarkerShape::Up),
        "v" => Some(MarkerShape::Down),
        "x" => Some(MarkerShape::Cross),
        "+" => Some(MarkerShape::Plus),
        "*" => Some(MarkerShape::Asterisk),
        _ => None,
    }
}

fn preview_line(line: &Artist) -> Option<PreviewLine> {
    let prop = |name: &str| line.property(name).ok();
    if prop("visible").and_then(|v| v.as_bool()) == Some(false) {
        return None;
    }

    let xs = prop("xdata")?.as_f64_vec()?;
    let ys = prop("ydata")?.as_f64_vec()?;
    let points = xs
        .into_iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| [x, y])
        .collect();

    let mut color = prop("color").and_then(|v| v.as_color()).unwrap_or(Rgba::CYCLE_BLUE);
    if let Some(alpha) = prop("alpha").and_then(|v| v.as_f64()) {
        color.a *= alpha.clamp(0.0, 1.0) as f32;
    }

    Some(PreviewLine {
        name: prop("label")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default(),
        points,
        color,
        width: prop("linewidth").and_then(|v| v.as_f64()).unwrap_or(1.5) as f32,
        style: line_style(prop("linestyle").as_ref().and_then(Value::as_str).unwrap_or("-")),
        marker: marker_shape(prop("marker").as_ref().and_then(Value::as_str).unwrap_or("None")),
    })
}

/// Extract what the preview draws for one Axes
pub fn preview_axes(axes: &Artist) -> PreviewAxes {
    let axis_grid = |slot: &str| {
        axes.slot(slot)
            .and_then(|a| a.property("grid").ok())
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    };
    let legend_visible = axes
        .slot("legend_")
        .map(|l| l.property("visible").ok().and_then(|v| v.as_bool()).unwrap_or(true))
        .unwrap_or(false);

    PreviewAxes {
        title: text_of(axes, "title"),
        xlabel: axes.slot("xaxis").map(|a| text_of(&a, "label")).unwrap_or_default(),
        ylabel: axes.slot("yaxis").map(|a| text_of(&a, "label")).unwrap_or_default(),
        xlim: pair(axes.property("xlim").ok()),
        ylim: pair(axes.property("ylim").ok()),
        grid: axis_grid("xaxis") || axis_grid("yaxis"),
        legend: legend_visible,
        lines: axes
            .children_of_kind(ArtistKind::Line2D)
            .iter()
            .filter_map(|line| preview_line(line))
            .collect(),
    }
}

fn draw_axes(state: &PreviewPaneState, ui: &mut Ui, index: usize, axes: &PreviewAxes, height: f32) {
    if !axes.title.is_empty() {
        ui.vertical_centered(|ui| {
            ui.strong(&axes.title);
        });
    }

    let mut plot = Plot::new(("preview_axes", index))
        .height(height)
        .show_grid(state.show_grid || axes.grid)
        .x_axis_label(axes.xlabel.clone())
        .y_axis_label(axes.ylabel.clone());
    if axes.legend {
        plot = plot.legend(Legend::default().position(Corner::RightTop));
    }

    let bounds = match (axes.xlim, axes.ylim) {
        (Some(x), Some(y)) if state.lock_to_limits => Some(PlotBounds::from_min_max([x[0], y[0]], [x[1], y[1]])),
        _ => None,
    };

    plot.show(ui, |plot_ui| {
        if let Some(bounds) = bounds {
            plot_ui.set_plot_bounds(bounds);
        }
        for line in &axes.lines {
            let color: Color32 = to_color32(line.color);
            if let Some(style) = line.style {
                plot_ui.line(
                    Line::new(&line.name, PlotPoints::from(line.points.clone()))
                        .color(color)
                        .width(line.width)
                        .style(style),
                );
            }
            if let Some(shape) = line.marker {
                plot_ui.points(
                    Points::new(&line.name, PlotPoints::from(line.points.clone()))
                        .color(color)
                        .shape(shape)
                        .radius(line.width + 1.5),
                );
            } else if line.style.is_none() {
                plot_ui.points(
                    Points::new(&line.name, PlotPoints::from(line.points.clone()))
                        .color(color)
                        .radius(line.width.max(1.5)),
                );
            }
        }
    });
}

/// Render the preview pane
pub fn render(state: &mut PreviewPaneState, shared: &SharedState<'_>, ui: &mut Ui) -> Vec<AppAction> {
    ui.horizontal(|ui| {
        ui.checkbox(&mut state.show_grid, "Grid");
        ui.checkbox(&mut state.lock_to_limits, "Use axes limits");
    });
    ui.separator();

    let axes: Vec<PreviewAxes> = shared
        .session
        .figure()
        .children_of_kind(ArtistKind::Axes)
        .iter()
        .map(|a| preview_axes(a))
        .collect();

    if axes.is_empty() {
        ui.colored_label(Color32::GRAY, "The figure has no axes");
        return Vec::new();
    }

    let spacing = ui.spacing().item_spacing.y;
    let height = ((ui.available_height() - spacing * axes.len() as f32) / axes.len() as f32).max(160.0);
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (i, ax) in axes.iter().enumerate() {
                draw_axes(state, ui, i, ax, height);
            }
        });

    Vec::new()
}

impl Pane for PreviewPaneState {
    fn kind(&self) -> PaneKind {
        PaneKind::Preview
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_axes_collects_visible_lines() {
        let fig = Artist::figure();
        let ax = fig.add_axes("main").unwrap();
        let shown = ax.plot(&[0.0, 1.0, 2.0], &[1.0, f64::NAN, 3.0]).unwrap();
        shown.set_property("label", Value::from("data")).unwrap();
        shown.set_property("linestyle", Value::from("None")).unwrap();
        let hidden = ax.plot(&[0.0], &[0.0]).unwrap();
        hidden.set_property("visible", Value::Bool(false)).unwrap();

        let preview = preview_axes(&ax);
        assert_eq!(preview.lines.len(), 1);
        let line = &preview.lines[0];
        assert_eq!(line.name, "data");
        assert_eq!(line.points, vec![[0.0, 1.0], [2.0, 3.0]]);
        assert!(line.style.is_none());
        assert!(!preview.legend);
        assert!(preview.xlim.is_some());
    }

    #[test]
    fn test_legend_and_titles() {
        let fig = Artist::figure();
        let ax = fig.add_axes("main").unwrap();
        ax.slot("title").unwrap().set_property("text", Value::from("Signal")).unwrap();
        ax.add_legend().unwrap();

        let preview = preview_axes(&ax);
        assert_eq!(preview.title, "Signal");
        assert!(preview.legend);
    }

    #[test]
    fn test_style_and_marker_mapping() {
        assert_eq!(line_style("-"), Some(LineStyle::Solid));
        assert!(line_style("None").is_none());
        assert!(marker_shape("o").is_some());
        assert!(marker_shape("None").is_none());
    }
}
