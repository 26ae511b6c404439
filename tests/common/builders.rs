//! Test data builders for figures and stub graphs

use std::sync::Arc;

use figure_forge::figure::Artist;
use figure_forge::types::Value;

use super::stubs::{StubBuilder, StubObject};

/// A stub line with the usual properties
pub fn stub_line(label: &str, width: f64) -> Arc<StubObject> {
    StubBuilder::new("Line2D")
        .label(label)
        .prop("label", label)
        .prop("linewidth", width)
        .prop("color", "#1f77b4")
        .field("zorder", 2.0)
        .build()
}

/// A stub axes with an x axis label and one line
pub struct StubAxes {
    pub axes: Arc<StubObject>,
    pub xaxis: Arc<StubObject>,
    pub xlabel: Arc<StubObject>,
    pub line: Arc<StubObject>,
}

pub fn stub_axes(title: &str) -> StubAxes {
    let xlabel = StubBuilder::new("Text").prop("text", "time").build();
    let xaxis = StubBuilder::new("XAxis").slot("label", xlabel.clone()).build();
    let line = stub_line("signal", 1.5);
    let axes = StubBuilder::new("Axes")
        .label(title)
        .child(line.clone())
        .slot("xaxis", xaxis.clone())
        .prop("xlim", Value::from(&[0.0, 10.0][..]))
        .prop("data_interval", Value::from(&[0.5, 9.5][..]))
        .build();
    StubAxes {
        axes,
        xaxis,
        xlabel,
        line,
    }
}

/// Builder for in-memory figures
pub struct FigureBuilder {
    axes: Vec<(String, Vec<Vec<(f64, f64)>>)>,
    legend: bool,
}

impl FigureBuilder {
    pub fn new() -> Self {
        Self {
            axes: Vec::new(),
            legend: false,
        }
    }

    /// Add an axes holding one line per entry of `lines`
    pub fn axes(mut self, label: &str, lines: Vec<Vec<(f64, f64)>>) -> Self {
        self.axes.push((label.to_string(), lines));
        self
    }

    pub fn with_legend(mut self) -> Self {
        self.legend = true;
        self
    }

    pub fn build(self) -> Arc<Artist> {
        let fig = Artist::figure();
        for (label, lines) in self.axes {
            let ax = fig.add_axes(&label).unwrap();
            for (i, points) in lines.into_iter().enumerate() {
                let (xs, ys): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();
                let line = ax.plot(&xs, &ys).unwrap();
                line.set_property("label", Value::from(format!("line {}", i)))
                    .unwrap();
            }
            if self.legend {
                ax.add_legend().unwrap();
            }
        }
        fig
    }
}

impl Default for FigureBuilder {
    fn default() -> Self {
        Self::new()
    }
}
