use std::collections::HashSet;

use serde::Deserialize;

use crate::error::Error;

/// Placement strategy requested by `meta.layout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    /// Modules side by side, members stacked top to bottom.
    Horizontal,
    /// Modules stacked, members side by side.
    Vertical,
    /// Modules ignored; fixed four-column grid.
    Grid,
}

/// A complete diagram description.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Specification {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub modules: Vec<Module>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Meta {
    pub theme: Option<String>,
    pub layout: Option<String>,
    pub routing: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub module: Option<String>,
    /// Size preset name such as `small` or `tensor_md`.
    pub size: Option<String>,
    pub style: Option<StyleOverrides>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub label: Option<String>,
    pub style: Option<StyleOverrides>,
    /// Set by the tagged-section reader; reserved, not used for styling.
    #[serde(skip)]
    pub t_shaped: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Module {
    pub id: String,
    pub label: Option<String>,
    pub color: Option<String>,
    pub style: Option<StyleOverrides>,
}

/// Per-element style overrides. Each property wins over every theme entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleOverrides {
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<f64>,
    pub font_color: Option<String>,
    pub font_size: Option<f64>,
    pub dashed: Option<bool>,
    pub dash_pattern: Option<String>,
    pub end_arrow: Option<String>,
    pub end_fill: Option<bool>,
}

impl Meta {
    pub fn layout_kind(&self) -> LayoutKind {
        match self.layout.as_deref() {
            None | Some("horizontal") => LayoutKind::Horizontal,
            Some("vertical") => LayoutKind::Vertical,
            Some(_) => LayoutKind::Grid,
        }
    }

    pub fn rounded_routing(&self) -> bool {
        self.routing.as_deref() == Some("rounded")
    }
}

impl Specification {
    /// Checks the invariants the pipeline relies on: at least one node and
    /// unique node and module ids.
    pub fn validate(&self) -> Result<(), Error> {
        if self.nodes.is_empty() {
            return Err(Error::NoNodes);
        }

        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(Error::DuplicateId {
                    kind: "node",
                    id: node.id.clone(),
                });
            }
        }

        seen.clear();
        for module in &self.modules {
            if !seen.insert(module.id.as_str()) {
                return Err(Error::DuplicateId {
                    kind: "module",
                    id: module.id.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: None,
            module: None,
            size: None,
            style: None,
        }
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_style(mut self, style: StyleOverrides) -> Self {
        self.style = Some(style);
        self
    }
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind: None,
            label: None,
            style: None,
            t_shaped: false,
        }
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_style(mut self, style: StyleOverrides) -> Self {
        self.style = Some(style);
        self
    }
}

impl Module {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: Some(label.into()),
            color: None,
            style: None,
        }
    }

    pub fn with_style(mut self, style: StyleOverrides) -> Self {
        self.style = Some(style);
        self
    }

    /// Falls back to the id when no label is given.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_kind_defaults_to_horizontal() {
        let meta = Meta::default();
        assert_eq!(meta.layout_kind(), LayoutKind::Horizontal);

        let meta = Meta {
            layout: Some("hierarchical".to_string()),
            ..Meta::default()
        };
        assert_eq!(meta.layout_kind(), LayoutKind::Grid);
    }

    #[test]
    fn validate_requires_nodes() {
        assert!(matches!(
            Specification::default().validate(),
            Err(Error::NoNodes)
        ));
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let spec = Specification {
            nodes: vec![Node::new("n1", "A"), Node::new("n1", "B")],
            ..Specification::default()
        };
        assert!(matches!(
            spec.validate(),
            Err(Error::DuplicateId { kind: "node", .. })
        ));

        let spec = Specification {
            nodes: vec![Node::new("n1", "A")],
            modules: vec![Module::new("m", "One"), Module::new("m", "Two")],
            ..Specification::default()
        };
        assert!(matches!(
            spec.validate(),
            Err(Error::DuplicateId { kind: "module", .. })
        ));
    }

    #[test]
    fn deserializes_camel_case_overrides() {
        let node: Node = serde_json::from_str(
            r##"{"id":"n1","label":"Custom","type":"database","style":{"fillColor":"#FF0000","strokeWidth":3}}"##,
        )
        .unwrap();
        assert_eq!(node.kind.as_deref(), Some("database"));
        let style = node.style.unwrap();
        assert_eq!(style.fill_color.as_deref(), Some("#FF0000"));
        assert_eq!(style.stroke_width, Some(3.0));
    }
}
