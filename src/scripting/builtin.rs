//! Plugins shipped with the editor

/// Toggle the visibility of spines
pub const TOGGLE_SPINES: &str = r#"
fn name() { "Toggle Spines" }
fn tooltip() { "Toggle the visibility of the top and right spines, or of a single spine." }
fn submenu() { "Spines" }

fn toggle(spine) {
    spine.set("set_visible", !spine.get("get_visible"));
}

fn toggle_axes(ax) {
    for child in ax.children() {
        if child.type_name() == "Spine" {
            let side = child.label();
            if side == "top" || side == "right" {
                toggle(child);
            }
        }
    }
}

fn run(obj) {
    let kind = obj.type_name();
    if kind == "Spine" {
        toggle(obj);
    } else if kind == "Axes" {
        toggle_axes(obj);
    } else if kind == "Figure" {
        for ax in obj.invoke("get_axes") {
            toggle_axes(ax);
        }
    } else {
        throw `Invalid object type: ${kind}. Must be Figure, Axes or Spine.`;
    }
}
"#;

/// Clip the left and bottom spines to the data range
pub const SET_SPINE_BOUNDS: &str = r#"
fn name() { "Set Spine Bounds" }
fn tooltip() { "Set the bounds of the left and bottom spines to the range of the plotted data." }
fn submenu() { "Spines" }

fn run(ax) {
    if ax.type_name() != "Axes" {
        throw `Invalid object type: ${ax.type_name()}. Must be Axes.`;
    }

    let xs = [];
    let ys = [];
    for line in ax.invoke("get_lines") {
        xs += line.get("get_xdata");
        ys += line.get("get_ydata");
    }
    if xs.len() == 0 || ys.len() == 0 {
        print("No data to bound spines to");
        return;
    }

    let min_x = xs[0];
    let max_x = xs[0];
    for x in xs {
        if x < min_x { min_x = x; }
        if x > max_x { max_x = x; }
    }
    let min_y = ys[0];
    let max_y = ys[0];
    for y in ys {
        if y < min_y { min_y = y; }
        if y > max_y { max_y = y; }
    }

    for child in ax.children() {
        if child.type_name() == "Spine" {
            let side = child.label();
            if side == "left" {
                child.invoke("set_bounds", #{ low: min_y, high: max_y });
            } else if side == "bottom" {
                child.invoke("set_bounds", #{ low: min_x, high: max_x });
            }
        }
    }
}
"#;

/// Add a legend to an axes
pub const ADD_LEGEND: &str = r#"
fn name() { "Add Legend" }
fn tooltip() { "Add a legend to the selected axes." }
fn submenu() { "Legends" }

fn run(ax) {
    if ax.type_name() != "Axes" {
        throw `Invalid object type: ${ax.type_name()}. Must be Axes.`;
    }
    ax.invoke("legend", #{ loc: "best", frame_on: true });
}
"#;

/// Move the outer ticks onto the data limits
pub const REDUCE_TICK_LIMITS: &str = r#"
fn name() { "Reduce Tick Limits" }
fn tooltip() { "Move the first and last ticks onto the data limits." }
fn submenu() { "Ticks" }

fn update_ticks(axis) {
    let interval = axis.get("get_data_interval");
    let ticks = axis.get("get_ticks");
    if ticks.len() < 2 {
        axis.set("set_ticks", interval);
        return;
    }

    let spacing = abs(ticks[1] - ticks[0]);
    ticks[0] = interval[0];
    ticks[-1] = interval[1];

    if ticks.len() > 2 && abs(ticks[1] - ticks[0]) < spacing / 3.0 {
        ticks.remove(1);
    }
    if ticks.len() > 2 && abs(ticks[-1] - ticks[-2]) < spacing / 3.0 {
        ticks.remove(ticks.len() - 2);
    }
    axis.set("set_ticks", ticks);
}

fn run(obj) {
    let kind = obj.type_name();
    if kind == "XAxis" || kind == "YAxis" {
        update_ticks(obj);
    } else if kind == "Axes" {
        update_ticks(obj.get("xaxis"));
        update_ticks(obj.get("yaxis"));
    } else {
        throw `Invalid object type: ${kind}. Must be Axes, XAxis or YAxis.`;
    }
}
"#;

/// Drop a text annotation in the middle of an axes
pub const ADD_ANNOTATION: &str = r#"
fn name() { "Add Annotation" }
fn tooltip() { "Add an annotation to an axes." }
fn submenu() { "Annotations" }

fn run(ax) {
    if ax.type_name() != "Axes" {
        throw `Invalid object type: ${ax.type_name()}. Must be Axes.`;
    }
    let xlim = ax.get("get_xlim");
    let ylim = ax.get("get_ylim");
    ax.invoke("text", #{
        x: (xlim[0] + xlim[1]) / 2.0,
        y: (ylim[0] + ylim[1]) / 2.0,
        s: "Annotation"
    });
}
"#;

/// Put a minor tick on every distinct data coordinate
pub const ADD_MINOR_DATA_TICKS: &str = r#"
fn name() { "Add Minor Data Ticks" }
fn tooltip() { "Add minor ticks for each data point." }
fn submenu() { "Ticks" }

fn unique_data(ax, getter) {
    let values = [];
    for line in ax.invoke("get_lines") {
        values += line.get(getter);
    }
    values.sort();

    let unique = [];
    for v in values {
        if unique.len() == 0 || unique[-1] != v {
            unique.push(v);
        }
    }
    unique
}

fn run(obj) {
    let kind = obj.type_name();
    if kind == "Axes" {
        obj.get("xaxis").set("set_minor_ticks", unique_data(obj, "get_xdata"));
        obj.get("yaxis").set("set_minor_ticks", unique_data(obj, "get_ydata"));
    } else if kind == "XAxis" {
        obj.set("set_minor_ticks", unique_data(obj.invoke("get_axes"), "get_xdata"));
    } else if kind == "YAxis" {
        obj.set("set_minor_ticks", unique_data(obj.invoke("get_axes"), "get_ydata"));
    } else {
        throw `Invalid object type: ${kind}. Must be Axes or Axis.`;
    }
}
"#;

/// All built-in plugins as `(id, source)` pairs
pub const ALL: [(&str, &str); 6] = [
    ("toggle_spines", TOGGLE_SPINES),
    ("set_spine_bounds", SET_SPINE_BOUNDS),
    ("add_legend", ADD_LEGEND),
    ("reduce_tick_limits", REDUCE_TICK_LIMITS),
    ("add_annotation", ADD_ANNOTATION),
    ("add_minor_data_ticks", ADD_MINOR_DATA_TICKS),
];
