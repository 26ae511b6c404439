//! Static property tables for each artist kind

use std::fmt;
use std::str::FromStr;

use crate::types::{Rgba, Value};

/// The kinds of artist in the figure model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtistKind {
    Figure,
    Axes,
    Line2D,
    Text,
    Spine,
    XAxis,
    YAxis,
    Legend,
}

/// Value type accepted by a property setter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropType {
    Bool,
    Int,
    Float,
    Str,
    Color,
    Choice(&'static [&'static str]),
    /// Sequence of floats, optionally of fixed length
    Floats(Option<usize>),
}

/// Default value of a property
#[derive(Debug, Clone, Copy)]
pub enum PropDefault {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'static str),
    Color(Rgba),
    Floats(&'static [f64]),
}

impl PropDefault {
    pub fn to_value(self) -> Value {
        match self {
            PropDefault::None => Value::None,
            PropDefault::Bool(v) => Value::Bool(v),
            PropDefault::Int(v) => Value::Int(v),
            PropDefault::Float(v) => Value::Float(v),
            PropDefault::Str(v) => Value::Str(v.to_string()),
            PropDefault::Color(c) => Value::Color(c),
            PropDefault::Floats(v) => Value::from(v),
        }
    }
}

/// One property declaration
#[derive(Debug, Clone, Copy)]
pub struct PropDef {
    pub name: &'static str,
    pub ty: PropType,
    pub default: PropDefault,
    /// Named setter parameters; more than one means per-component updates
    pub params: &'static [&'static str],
    /// Also exposed as a plain field
    pub field: bool,
    /// No setter
    pub read_only: bool,
    /// `None` is an accepted value
    pub nullable: bool,
}

const fn prop(name: &'static str, ty: PropType, default: PropDefault) -> PropDef {
    PropDef {
        name,
        ty,
        default,
        params: &[],
        field: false,
        read_only: false,
        nullable: false,
    }
}

impl PropDef {
    const fn params(mut self, params: &'static [&'static str]) -> Self {
        self.params = params;
        self
    }

    const fn field(mut self) -> Self {
        self.field = true;
        self
    }

    const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A named child slot
#[derive(Debug, Clone, Copy)]
pub struct SlotDef {
    pub name: &'static str,
    /// Method returning the slot's content
    pub getter: Option<&'static str>,
    /// Kind created together with the owner; `None` for optional slots
    pub created: Option<ArtistKind>,
}

pub const LINESTYLES: &[&str] = &["-", "--", "-.", ":", "None"];
pub const DRAWSTYLES: &[&str] = &["default", "steps-pre", "steps-mid", "steps-post"];
pub const MARKERS: &[&str] = &["None", "o", ".", "s", "^", "v", "x", "+", "*", "D"];
pub const SCALES: &[&str] = &["linear", "log", "symlog", "logit"];
pub const FONT_WEIGHTS: &[&str] = &["normal", "bold", "light", "heavy"];
pub const FONT_STYLES: &[&str] = &["normal", "italic", "oblique"];
pub const ALIGNMENTS: &[&str] = &["left", "center", "right"];
pub const LEGEND_LOCATIONS: &[&str] = &[
    "best",
    "upper right",
    "upper left",
    "lower left",
    "lower right",
    "right",
    "center left",
    "center right",
    "lower center",
    "upper center",
    "center",
];

use PropDefault as D;
use PropType as T;

const FIGURE_PROPS: &[PropDef] = &[
    prop("facecolor", T::Color, D::Color(Rgba::WHITE)),
    prop("edgecolor", T::Color, D::Color(Rgba::WHITE)),
    prop("size_inches", T::Floats(Some(2)), D::Floats(&[6.4, 4.8])).params(&["w", "h"]),
    prop("dpi", T::Float, D::Float(100.0)),
    prop("linewidth", T::Float, D::Float(0.0)),
    prop("visible", T::Bool, D::Bool(true)),
    prop("label", T::Str, D::Str("")),
];

const AXES_PROPS: &[PropDef] = &[
    prop("facecolor", T::Color, D::Color(Rgba::WHITE)),
    prop("xlim", T::Floats(Some(2)), D::Floats(&[0.0, 1.0])).params(&["left", "right"]),
    prop("ylim", T::Floats(Some(2)), D::Floats(&[0.0, 1.0])).params(&["bottom", "top"]),
    prop("xscale", T::Choice(SCALES), D::Str("linear")).params(&["value"]),
    prop("yscale", T::Choice(SCALES), D::Str("linear")).params(&["value"]),
    prop("frame_on", T::Bool, D::Bool(true)),
    prop("axisbelow", T::Bool, D::Bool(true)),
    prop("visible", T::Bool, D::Bool(true)),
    prop("alpha", T::Float, D::Float(1.0)),
    prop("label", T::Str, D::Str("")),
    prop("zorder", T::Float, D::Float(0.0)).field(),
];

const LINE_PROPS: &[PropDef] = &[
    prop("xdata", T::Floats(None), D::Floats(&[])),
    prop("ydata", T::Floats(None), D::Floats(&[])),
    prop("linewidth", T::Float, D::Float(1.5)),
    prop("linestyle", T::Choice(LINESTYLES), D::Str("-")),
    prop("drawstyle", T::Choice(DRAWSTYLES), D::Str("default")),
    prop("color", T::Color, D::Color(Rgba::CYCLE_BLUE)),
    prop("marker", T::Choice(MARKERS), D::Str("None")),
    prop("markersize", T::Float, D::Float(6.0)),
    prop("markerfacecolor", T::Color, D::Color(Rgba::CYCLE_BLUE)),
    prop("visible", T::Bool, D::Bool(true)),
    prop("alpha", T::Float, D::Float(1.0)),
    prop("label", T::Str, D::Str("")),
    prop("zorder", T::Float, D::Float(2.0)).field(),
];

const TEXT_PROPS: &[PropDef] = &[
    prop("text", T::Str, D::Str("")).params(&["s"]),
    prop("fontsize", T::Float, D::Float(10.0)),
    prop("fontfamily", T::Str, D::Str("sans-serif")),
    prop("fontweight", T::Choice(FONT_WEIGHTS), D::Str("normal")),
    prop("fontstyle", T::Choice(FONT_STYLES), D::Str("normal")),
    prop("color", T::Color, D::Color(Rgba::BLACK)),
    prop("rotation", T::Float, D::Float(0.0)),
    prop("position", T::Floats(Some(2)), D::Floats(&[0.0, 0.0])).params(&["x", "y"]),
    prop("horizontalalignment", T::Choice(ALIGNMENTS), D::Str("left")),
    prop("visible", T::Bool, D::Bool(true)),
    prop("alpha", T::Float, D::Float(1.0)),
    prop("label", T::Str, D::Str("")),
    prop("zorder", T::Float, D::Float(3.0)).field(),
];

const SPINE_PROPS: &[PropDef] = &[
    prop("visible", T::Bool, D::Bool(true)),
    prop("linewidth", T::Float, D::Float(0.8)),
    prop("linestyle", T::Choice(LINESTYLES), D::Str("-")),
    prop("color", T::Color, D::Color(Rgba::BLACK)),
    prop("bounds", T::Floats(Some(2)), D::None)
        .params(&["low", "high"])
        .nullable(),
    prop("alpha", T::Float, D::Float(1.0)),
    prop("label", T::Str, D::Str("")),
    prop("zorder", T::Float, D::Float(2.5)).field(),
];

const XAXIS_PROPS: &[PropDef] = &[
    prop("visible", T::Bool, D::Bool(true)),
    prop("label_position", T::Choice(&["bottom", "top"]), D::Str("bottom")),
    prop("ticks", T::Floats(None), D::Floats(&[0.0, 0.2, 0.4, 0.6, 0.8, 1.0])),
    prop("minor_ticks", T::Floats(None), D::Floats(&[])),
    prop("ticklabel_size", T::Float, D::Float(10.0)),
    prop("grid", T::Bool, D::Bool(false)).params(&["visible"]),
    prop("inverted", T::Bool, D::Bool(false)),
    prop("data_interval", T::Floats(Some(2)), D::Floats(&[0.0, 1.0])).read_only(),
    prop("label", T::Str, D::Str("")),
];

const YAXIS_PROPS: &[PropDef] = &[
    prop("visible", T::Bool, D::Bool(true)),
    prop("label_position", T::Choice(&["left", "right"]), D::Str("left")),
    prop("ticks", T::Floats(None), D::Floats(&[0.0, 0.2, 0.4, 0.6, 0.8, 1.0])),
    prop("minor_ticks", T::Floats(None), D::Floats(&[])),
    prop("ticklabel_size", T::Float, D::Float(10.0)),
    prop("grid", T::Bool, D::Bool(false)).params(&["visible"]),
    prop("inverted", T::Bool, D::Bool(false)),
    prop("data_interval", T::Floats(Some(2)), D::Floats(&[0.0, 1.0])).read_only(),
    prop("label", T::Str, D::Str("")),
];

const LEGEND_PROPS: &[PropDef] = &[
    prop("loc", T::Choice(LEGEND_LOCATIONS), D::Str("best")),
    prop("title", T::Str, D::Str("")).params(&["title"]),
    prop("ncols", T::Int, D::Int(1)),
    prop("fontsize", T::Float, D::Float(10.0)),
    prop("frame_on", T::Bool, D::Bool(true)),
    prop("framealpha", T::Float, D::Float(0.8)),
    prop("facecolor", T::Color, D::Color(Rgba::WHITE)),
    prop("edgecolor", T::Color, D::Color(Rgba::new(0.8, 0.8, 0.8, 1.0))),
    prop("visible", T::Bool, D::Bool(true)),
    prop("label", T::Str, D::Str("")),
    prop("zorder", T::Float, D::Float(5.0)).field(),
];

const AXES_SLOTS: &[SlotDef] = &[
    SlotDef {
        name: "xaxis",
        getter: Some("get_xaxis"),
        created: Some(ArtistKind::XAxis),
    },
    SlotDef {
        name: "yaxis",
        getter: Some("get_yaxis"),
        created: Some(ArtistKind::YAxis),
    },
    SlotDef {
        name: "title",
        getter: None,
        created: Some(ArtistKind::Text),
    },
    SlotDef {
        name: "legend_",
        getter: Some("get_legend"),
        created: None,
    },
];

const AXIS_SLOTS: &[SlotDef] = &[SlotDef {
    name: "label",
    getter: None,
    created: Some(ArtistKind::Text),
}];

impl ArtistKind {
    pub const ALL: [ArtistKind; 8] = [
        ArtistKind::Figure,
        ArtistKind::Axes,
        ArtistKind::Line2D,
        ArtistKind::Text,
        ArtistKind::Spine,
        ArtistKind::XAxis,
        ArtistKind::YAxis,
        ArtistKind::Legend,
    ];

    pub fn type_name(&self) -> &'static str {
        match self {
            ArtistKind::Figure => "Figure",
            ArtistKind::Axes => "Axes",
            ArtistKind::Line2D => "Line2D",
            ArtistKind::Text => "Text",
            ArtistKind::Spine => "Spine",
            ArtistKind::XAxis => "XAxis",
            ArtistKind::YAxis => "YAxis",
            ArtistKind::Legend => "Legend",
        }
    }

    pub fn props(&self) -> &'static [PropDef] {
        match self {
            ArtistKind::Figure => FIGURE_PROPS,
            ArtistKind::Axes => AXES_PROPS,
            ArtistKind::Line2D => LINE_PROPS,
            ArtistKind::Text => TEXT_PROPS,
            ArtistKind::Spine => SPINE_PROPS,
            ArtistKind::XAxis => XAXIS_PROPS,
            ArtistKind::YAxis => YAXIS_PROPS,
            ArtistKind::Legend => LEGEND_PROPS,
        }
    }

    pub fn prop(&self, name: &str) -> Option<&'static PropDef> {
        self.props().iter().find(|p| p.name == name)
    }

    pub fn slots(&self) -> &'static [SlotDef] {
        match self {
            ArtistKind::Axes => AXES_SLOTS,
            ArtistKind::XAxis | ArtistKind::YAxis => AXIS_SLOTS,
            _ => &[],
        }
    }

    pub fn slot(&self, name: &str) -> Option<&'static SlotDef> {
        self.slots().iter().find(|s| s.name == name)
    }

    /// Methods beyond the per-property accessors
    pub fn extra_methods(&self) -> &'static [&'static str] {
        match self {
            ArtistKind::Figure => &["get_children", "set", "properties", "get_axes"],
            ArtistKind::Axes => &[
                "get_children",
                "set",
                "properties",
                "remove",
                "get_lines",
                "legend",
                "text",
                "plot",
            ],
            ArtistKind::XAxis | ArtistKind::YAxis => {
                &["get_children", "set", "properties", "remove", "get_axes"]
            }
            _ => &["get_children", "set", "properties", "remove"],
        }
    }
}

impl fmt::Display for ArtistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ArtistKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.type_name() == s)
            .ok_or_else(|| format!("unknown artist kind '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_label_and_visible() {
        for kind in ArtistKind::ALL {
            assert!(kind.prop("label").is_some(), "{kind} lacks label");
            assert!(kind.prop("visible").is_some(), "{kind} lacks visible");
        }
    }

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in ArtistKind::ALL {
            assert_eq!(kind.type_name().parse::<ArtistKind>(), Ok(kind));
        }
        assert!("Rectangle".parse::<ArtistKind>().is_err());
    }

    #[test]
    fn test_property_names_are_unique_per_kind() {
        for kind in ArtistKind::ALL {
            let mut names: Vec<_> = kind.props().iter().map(|p| p.name).collect();
            names.sort_unstable();
            let before = names.len();
            names.dedup();
            assert_eq!(before, names.len(), "{kind} has duplicate properties");
        }
    }
}
