//! mxGraphModel assembly and serialization.

use std::collections::HashMap;

use log::debug;

use crate::diagram::classify::classify;
use crate::diagram::layout::{Layout, Rect};
use crate::diagram::style::{connector_style, module_style, node_style};
use crate::diagram::types::Specification;
use crate::error::Error;
use crate::math::{LabelOptions, prepare_label};
use crate::theme::Theme;
use crate::xml::escape_attr;

const ROOT_ID: u32 = 0;
const LAYER_ID: u32 = 1;
const FIRST_ID: u32 = 2;

/// One `mxCell`. Values are stored already escaped for attribute use.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// A node or a module container. `data_id` is the specification id,
    /// written as `data-id`.
    Vertex {
        id: u32,
        parent: u32,
        data_id: String,
        value: String,
        style: String,
        geometry: Rect,
    },
    Edge {
        id: u32,
        source: u32,
        target: u32,
        style: String,
    },
    /// A label attached to the middle of an edge.
    EdgeLabel {
        id: u32,
        parent: u32,
        value: String,
        style: String,
    },
}

impl Cell {
    pub fn id(&self) -> u32 {
        match self {
            Cell::Vertex { id, .. } | Cell::Edge { id, .. } | Cell::EdgeLabel { id, .. } => *id,
        }
    }
}

/// A built diagram, ready to serialize.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub page_width: f64,
    pub page_height: f64,
    pub grid_size: f64,
    pub background: String,
    /// In allocation order, excluding the two sentinel cells.
    pub cells: Vec<Cell>,
}

struct IdAllocator(u32);

impl IdAllocator {
    fn next(&mut self) -> u32 {
        let id = self.0;
        self.0 += 1;
        id
    }
}

fn label(text: &str) -> Result<String, Error> {
    prepare_label(text, LabelOptions::default()).map_err(|err| Error::label(text, err))
}

/// Turns a laid-out specification into cells.
///
/// Containers come first, then nodes, then edges, each in source order. Edges
/// whose endpoints do not resolve are skipped. Any label that fails
/// sanitization aborts the whole build.
pub fn build(spec: &Specification, theme: &Theme, layout: &Layout) -> Result<Document, Error> {
    let mut ids = IdAllocator(FIRST_ID);
    let mut cells = Vec::new();

    let mut containers: HashMap<&str, (u32, Rect)> = HashMap::new();
    for (bucket, rect) in &layout.modules {
        let Some(module) = bucket.module_id().and_then(|id| spec.module(id)) else {
            continue;
        };
        let id = ids.next();
        cells.push(Cell::Vertex {
            id,
            parent: LAYER_ID,
            data_id: module.id.clone(),
            value: label(module.display_label())?,
            style: module_style(module, theme),
            geometry: *rect,
        });
        containers.insert(module.id.as_str(), (id, *rect));
    }

    let mut node_ids: HashMap<&str, u32> = HashMap::new();
    for node in &spec.nodes {
        let Some(rect) = layout.nodes.get(&node.id) else {
            continue;
        };
        let category = classify(&node.label, node.kind.as_deref());
        let container = node.module.as_deref().and_then(|m| containers.get(m));
        let (parent, geometry) = match container {
            Some((container_id, outer)) => (
                *container_id,
                Rect::new(rect.x - outer.x, rect.y - outer.y, rect.width, rect.height),
            ),
            None => (LAYER_ID, *rect),
        };

        let id = ids.next();
        cells.push(Cell::Vertex {
            id,
            parent,
            data_id: node.id.clone(),
            value: label(&node.label)?,
            style: node_style(category, node.style.as_ref(), theme),
            geometry,
        });
        node_ids.insert(node.id.as_str(), id);
    }

    let label_style = format!(
        "edgeLabel;html=1;align=center;verticalAlign=middle;fontSize={};fontColor={};",
        theme.label_font_size(),
        theme.text_muted()
    );

    for edge in &spec.edges {
        let (Some(&source), Some(&target)) = (
            node_ids.get(edge.from.as_str()),
            node_ids.get(edge.to.as_str()),
        ) else {
            debug!(from = edge.from.as_str(), to = edge.to.as_str(); "Dropping edge with unresolved endpoint");
            continue;
        };

        let id = ids.next();
        cells.push(Cell::Edge {
            id,
            source,
            target,
            style: connector_style(edge, &spec.meta, theme),
        });

        if let Some(text) = edge.label.as_deref()
            && !text.is_empty()
        {
            cells.push(Cell::EdgeLabel {
                id: ids.next(),
                parent: id,
                value: label(text)?,
                style: label_style.clone(),
            });
        }
    }

    let (page_width, page_height) = layout.canvas_size(theme.grid_size());
    Ok(Document {
        page_width,
        page_height,
        grid_size: theme.grid_size(),
        background: theme.background().to_string(),
        cells,
    })
}

impl Document {
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            r#"<mxGraphModel dx="1120" dy="720" grid="1" gridSize="{}" guides="1" tooltips="1" connect="1" arrows="1" fold="1" page="1" pageScale="1" pageWidth="{}" pageHeight="{}" math="1" background="{}">"#,
            self.grid_size,
            self.page_width,
            self.page_height,
            escape_attr(&self.background)
        ));
        out.push_str("\n  <root>\n");
        out.push_str(&format!("    <mxCell id=\"{ROOT_ID}\"/>\n"));
        out.push_str(&format!("    <mxCell id=\"{LAYER_ID}\" parent=\"{ROOT_ID}\"/>\n"));

        for cell in &self.cells {
            match cell {
                Cell::Vertex {
                    id,
                    parent,
                    data_id,
                    value,
                    style,
                    geometry: g,
                } => {
                    out.push_str(&format!(
                        "    <mxCell id=\"{id}\" value=\"{value}\" style=\"{}\" vertex=\"1\" parent=\"{parent}\" data-id=\"{}\">\n",
                        escape_attr(style),
                        escape_attr(data_id)
                    ));
                    out.push_str(&format!(
                        "      <mxGeometry x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" as=\"geometry\"/>\n",
                        g.x, g.y, g.width, g.height
                    ));
                    out.push_str("    </mxCell>\n");
                }
                Cell::Edge {
                    id,
                    source,
                    target,
                    style,
                } => {
                    out.push_str(&format!(
                        "    <mxCell id=\"{id}\" value=\"\" style=\"{}\" edge=\"1\" parent=\"{LAYER_ID}\" source=\"{source}\" target=\"{target}\">\n",
                        escape_attr(style)
                    ));
                    out.push_str("      <mxGeometry relative=\"1\" as=\"geometry\"/>\n");
                    out.push_str("    </mxCell>\n");
                }
                Cell::EdgeLabel {
                    id,
                    parent,
                    value,
                    style,
                } => {
                    out.push_str(&format!(
                        "    <mxCell id=\"{id}\" value=\"{value}\" style=\"{}\" vertex=\"1\" connectable=\"0\" parent=\"{parent}\">\n",
                        escape_attr(style)
                    ));
                    out.push_str("      <mxGeometry x=\"0\" relative=\"1\" as=\"geometry\">\n");
                    out.push_str("        <mxPoint as=\"offset\"/>\n");
                    out.push_str("      </mxGeometry>\n");
                    out.push_str("    </mxCell>\n");
                }
            }
        }

        out.push_str("  </root>\n</mxGraphModel>\n");
        out
    }
}
