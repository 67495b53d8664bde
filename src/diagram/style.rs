//! draw.io style strings for nodes, connectors and module containers.
//!
//! Every property resolves on its own: the element's override first, then the
//! matching theme entry, then the theme's fallback entry, then a literal.

use std::fmt::Display;

use crate::diagram::classify::Category;
use crate::diagram::types::{Edge, Meta, Module, StyleOverrides};
use crate::theme::{ConnectorStyle, NodeStyle, Theme};

const FONT_FAMILY: &str = "Inter, sans-serif";

const NODE_FILL: &str = "#DBEAFE";
const NODE_STROKE: &str = "#2563EB";
const NODE_STROKE_WIDTH: f64 = 1.5;
const NODE_FONT_COLOR: &str = "#1E293B";
const NODE_FONT_SIZE: f64 = 13.0;

const EDGE_STROKE: &str = "#1E293B";
const EDGE_STROKE_WIDTH: f64 = 2.0;
const EDGE_DASH_PATTERN: &str = "6 4";
const EDGE_END_ARROW: &str = "block";

const MODULE_FILL: &str = "#F8FAFC";
const MODULE_STROKE: &str = "#E2E8F0";
const MODULE_STROKE_WIDTH: f64 = 1.0;
const MODULE_ROUNDED: f64 = 12.0;
const MODULE_FONT_COLOR: &str = "#1E293B";
const MODULE_FONT_SIZE: f64 = 14.0;
const MODULE_FONT_WEIGHT: u32 = 600;
const MODULE_DASH_PATTERN: &str = "8 4";

/// Accumulates `key=value;` pairs in insertion order.
#[derive(Debug, Default)]
struct StyleString {
    out: String,
}

impl StyleString {
    fn flag(mut self, raw: &str) -> Self {
        self.out.push_str(raw);
        self.out.push(';');
        self
    }

    fn set(mut self, key: &str, value: impl Display) -> Self {
        self.out.push_str(key);
        self.out.push('=');
        self.out.push_str(&value.to_string());
        self.out.push(';');
        self
    }

    fn set_if(self, cond: bool, key: &str, value: impl Display) -> Self {
        if cond { self.set(key, value) } else { self }
    }

    fn finish(self) -> String {
        self.out
    }
}

/// The override, else the first theme entry that sets the property.
fn resolve<S, T>(own: Option<T>, entries: [Option<&S>; 2], get: impl Fn(&S) -> Option<T>) -> Option<T> {
    own.or_else(|| entries.into_iter().flatten().find_map(get))
}

/// Style for a node of the given category.
pub fn node_style(category: Category, overrides: Option<&StyleOverrides>, theme: &Theme) -> String {
    let entries = [theme.node_entry(category.name()), theme.node_default()];

    let fill = resolve(overrides.and_then(|o| o.fill_color.clone()), entries, |s: &NodeStyle| {
        s.fill_color.clone()
    })
    .unwrap_or_else(|| NODE_FILL.to_string());
    let stroke = resolve(overrides.and_then(|o| o.stroke_color.clone()), entries, |s: &NodeStyle| {
        s.stroke_color.clone()
    })
    .unwrap_or_else(|| NODE_STROKE.to_string());
    let font_color = resolve(overrides.and_then(|o| o.font_color.clone()), entries, |s: &NodeStyle| {
        s.font_color.clone()
    })
    .unwrap_or_else(|| NODE_FONT_COLOR.to_string());
    let stroke_width = resolve(overrides.and_then(|o| o.stroke_width), entries, |s: &NodeStyle| {
        s.stroke_width
    })
    .unwrap_or(NODE_STROKE_WIDTH);
    let font_size = resolve(overrides.and_then(|o| o.font_size), entries, |s: &NodeStyle| {
        s.font_size
    })
    .unwrap_or(NODE_FONT_SIZE);

    StyleString::default()
        .flag(category.shape_style())
        .set("html", 1)
        .set("whiteSpace", "wrap")
        .set("fillColor", fill)
        .set("strokeColor", stroke)
        .set("strokeWidth", stroke_width)
        .set("fontColor", font_color)
        .set("fontSize", font_size)
        .set("fontFamily", theme.font_family().unwrap_or(FONT_FAMILY))
        .set("verticalAlign", "middle")
        .set("align", "center")
        .finish()
}

/// Style for an edge. Untyped edges use the `primary` connector.
pub fn connector_style(edge: &Edge, meta: &Meta, theme: &Theme) -> String {
    let kind = edge.kind.as_deref().unwrap_or("primary");
    let entries = [theme.connector_entry(kind), theme.connector_entry("primary")];
    let overrides = edge.style.as_ref();

    let stroke = resolve(
        overrides.and_then(|o| o.stroke_color.clone()),
        entries,
        |c: &ConnectorStyle| c.stroke_color.clone(),
    )
    .unwrap_or_else(|| EDGE_STROKE.to_string());
    let stroke_width = resolve(
        overrides.and_then(|o| o.stroke_width),
        entries,
        |c: &ConnectorStyle| c.stroke_width,
    )
    .unwrap_or(EDGE_STROKE_WIDTH);
    let dashed = resolve(overrides.and_then(|o| o.dashed), entries, |c: &ConnectorStyle| {
        c.dashed
    })
    .unwrap_or(false);
    let dash_pattern = resolve(
        overrides.and_then(|o| o.dash_pattern.clone()),
        entries,
        |c: &ConnectorStyle| c.dash_pattern.clone(),
    )
    .unwrap_or_else(|| EDGE_DASH_PATTERN.to_string());
    let end_arrow = resolve(
        overrides.and_then(|o| o.end_arrow.clone()),
        entries,
        |c: &ConnectorStyle| c.end_arrow.clone(),
    )
    .unwrap_or_else(|| EDGE_END_ARROW.to_string());
    let end_fill = resolve(overrides.and_then(|o| o.end_fill), entries, |c: &ConnectorStyle| {
        c.end_fill
    })
    .unwrap_or(true);

    StyleString::default()
        .set("edgeStyle", "orthogonalEdgeStyle")
        .set("rounded", u8::from(meta.rounded_routing()))
        .set("orthogonalLoop", 1)
        .set("jettySize", "auto")
        .set("html", 1)
        .set("strokeColor", stroke)
        .set("strokeWidth", stroke_width)
        .set("endArrow", end_arrow)
        .set("endFill", u8::from(end_fill))
        .set_if(dashed, "dashed", 1)
        .set_if(dashed, "dashPattern", dash_pattern)
        .set("jumpStyle", "arc")
        .set("jumpSize", 8)
        .finish()
}

/// Style for a module container. The label sits top-left inside the box.
pub fn module_style(module: &Module, theme: &Theme) -> String {
    let base = &theme.module;
    let overrides = module.style.as_ref();

    let fill = overrides
        .and_then(|o| o.fill_color.as_deref())
        .or(module.color.as_deref())
        .or(base.fill_color.as_deref())
        .unwrap_or(MODULE_FILL);
    let stroke = overrides
        .and_then(|o| o.stroke_color.as_deref())
        .or(base.stroke_color.as_deref())
        .unwrap_or(MODULE_STROKE);
    let stroke_width = overrides
        .and_then(|o| o.stroke_width)
        .or(base.stroke_width)
        .unwrap_or(MODULE_STROKE_WIDTH);
    let font_color = overrides
        .and_then(|o| o.font_color.as_deref())
        .or(base.label_font_color.as_deref())
        .unwrap_or(MODULE_FONT_COLOR);
    let font_size = overrides
        .and_then(|o| o.font_size)
        .or(base.label_font_size)
        .unwrap_or(MODULE_FONT_SIZE);
    let dashed = overrides
        .and_then(|o| o.dashed)
        .or(base.dashed)
        .unwrap_or(false);
    let dash_pattern = overrides
        .and_then(|o| o.dash_pattern.as_deref())
        .or(base.dash_pattern.as_deref())
        .unwrap_or(MODULE_DASH_PATTERN);
    let arc = base.rounded.unwrap_or(MODULE_ROUNDED).min(20.0);
    let bold = base.label_font_weight.unwrap_or(MODULE_FONT_WEIGHT) >= 600;

    StyleString::default()
        .set("rounded", 1)
        .set("arcSize", arc)
        .set("html", 1)
        .set("whiteSpace", "wrap")
        .set("fillColor", fill)
        .set("strokeColor", stroke)
        .set("strokeWidth", stroke_width)
        .set("fontColor", font_color)
        .set("fontSize", font_size)
        .set_if(bold, "fontStyle", 1)
        .set("verticalAlign", "top")
        .set("align", "left")
        .set("spacingLeft", 12)
        .set("spacingTop", 10)
        .set_if(dashed, "dashed", 1)
        .set_if(dashed, "dashPattern", dash_pattern)
        .finish()
}
