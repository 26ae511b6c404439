//! The figure shown when the editor starts

use std::sync::Arc;

use super::{Artist, ArtistKind};
use crate::drawable::DrawableError;
use crate::types::Value;

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Deterministic pseudo-random samples in `0.0..1.0`
fn samples(seed: u64, n: usize) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        })
        .collect()
}

fn set_title(axes: &Artist, title: &str) -> Result<(), DrawableError> {
    if let Some(text) = axes.slot("title") {
        text.set_property("text", Value::from(title))?;
    }
    Ok(())
}

fn set_axis_label(axes: &Artist, axis: &str, label: &str) -> Result<(), DrawableError> {
    if let Some(text) = axes.slot(axis).and_then(|a| a.slot("label")) {
        text.set_property("text", Value::from(label))?;
    }
    Ok(())
}

fn hide_spines(axes: &Artist, sides: &[&str]) -> Result<(), DrawableError> {
    for side in sides {
        if let Some(spine) = axes.spine(side) {
            spine.set_property("visible", Value::Bool(false))?;
        }
    }
    Ok(())
}

/// Build the 2x2 demo figure
pub fn demo_figure() -> Result<Arc<Artist>, DrawableError> {
    let fig = Artist::figure();
    fig.set_property("label", Value::from("Demo"))?;

    let suptitle = Artist::new(ArtistKind::Text);
    suptitle.set_property("text", Value::from("Figure Forge Demo Figure"))?;
    suptitle.set_property("label", Value::from("suptitle"))?;
    suptitle.set_property("fontsize", Value::Float(16.0))?;
    suptitle.set_property("position", Value::from(&[0.5, 0.98][..]))?;
    suptitle.set_property("horizontalalignment", Value::from("center"))?;
    fig.attach(suptitle, None);

    // Line plot
    let ax = fig.add_axes("Line Plot")?;
    let xs = linspace(0.0, 10.0, 100);
    let ys: Vec<f64> = xs.iter().map(|x| x.sin()).collect();
    let line = ax.plot(&xs, &ys)?;
    line.set_property("marker", Value::from("o"))?;
    line.set_property("markersize", Value::Float(3.0))?;
    line.set_property("color", Value::from("b"))?;
    line.set_property("markerfacecolor", Value::from("b"))?;
    line.set_property("label", Value::from("sin(x)"))?;
    set_title(&ax, "Line Plot")?;
    set_axis_label(&ax, "xaxis", "x")?;
    set_axis_label(&ax, "yaxis", "sin(x)")?;
    ax.set_property("xscale", Value::from("symlog"))?;
    ax.add_legend()?;
    hide_spines(&ax, &["top", "right"])?;
    if let Some(spine) = ax.spine("bottom") {
        spine.set_property("bounds", Value::from(&[0.0, 10.0][..]))?;
    }
    if let Some(spine) = ax.spine("left") {
        spine.set_property("bounds", Value::from(&[-1.0, 1.0][..]))?;
    }

    // Scatter-like marker plot
    let ax = fig.add_axes("Scatter Plot")?;
    let xs = samples(7, 50);
    let ys = samples(11, 50);
    let points = ax.plot(&xs, &ys)?;
    points.set_property("linestyle", Value::from("None"))?;
    points.set_property("marker", Value::from("o"))?;
    points.set_property("alpha", Value::Float(0.6))?;
    points.set_property("color", Value::from("tab:orange"))?;
    points.set_property("markerfacecolor", Value::from("tab:orange"))?;
    points.set_property("label", Value::from("samples"))?;
    let note = ax.add_text(0.7, 0.7, "Example Annotation")?;
    note.set_property("label", Value::from("annotation"))?;
    set_title(&ax, "Scatter Plot")?;

    // Bar-like step plot
    let ax = fig.add_axes("Bar Chart")?;
    let bars = ax.plot(&[1.0, 2.0, 3.0, 4.0, 5.0], &[3.0, 7.0, 2.0, 5.0, 4.0])?;
    bars.set_property("drawstyle", Value::from("steps-mid"))?;
    bars.set_property("color", Value::from("tab:green"))?;
    bars.set_property("linewidth", Value::Float(2.0))?;
    bars.set_property("label", Value::from("counts"))?;
    set_title(&ax, "Bar Chart")?;
    if let Some(yaxis) = ax.slot("yaxis") {
        yaxis.set_property("grid", Value::Bool(true))?;
    }
    hide_spines(&ax, &["top", "right"])?;

    // Box-like plot: one whisker per series
    let ax = fig.add_axes("Box Plot")?;
    for (i, seed) in [3u64, 5, 9, 13].into_iter().enumerate() {
        let values = samples(seed, 20);
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let x = (i + 1) as f64;
        let whisker = ax.plot(&[x, x], &[lo, hi])?;
        whisker.set_property("color", Value::from("k"))?;
        whisker.set_property("linewidth", Value::Float(4.0))?;
        whisker.set_property("label", Value::from(format!("series {}", i + 1)))?;
    }
    set_title(&ax, "Box Plot")?;

    tracing::debug!("Built demo figure");
    Ok(fig)
}
