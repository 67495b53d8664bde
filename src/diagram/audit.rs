use std::fmt;

use crate::diagram::types::Specification;

const MAX_NODES: usize = 30;
const WARN_NODES: usize = 20;
const MAX_EDGES: usize = 50;
const WARN_EDGES: usize = 30;
const WARN_MODULES: usize = 5;
const MAX_LABEL_CHARS: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        })
    }
}

impl From<Level> for log::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Info => log::Level::Info,
            Level::Warning => log::Level::Warn,
            Level::Error => log::Level::Error,
        }
    }
}

/// Advisory result of [`audit`]. Findings never stop compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub level: Level,
    pub message: String,
}

impl Finding {
    fn new(level: Level, message: String) -> Self {
        Self { level, message }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}

/// Flags diagrams that are likely to be hard to read.
pub fn audit(spec: &Specification) -> Vec<Finding> {
    let mut findings = Vec::new();

    let nodes = spec.nodes.len();
    if nodes > MAX_NODES {
        findings.push(Finding::new(
            Level::Error,
            format!("Too many nodes ({nodes}). Consider splitting into sub-diagrams."),
        ));
    } else if nodes > WARN_NODES {
        findings.push(Finding::new(
            Level::Warning,
            format!("Many nodes ({nodes}). Consider splitting for clarity."),
        ));
    }

    let edges = spec.edges.len();
    if edges > MAX_EDGES {
        findings.push(Finding::new(
            Level::Error,
            format!("Too many edges ({edges}). Consider hierarchical layout."),
        ));
    } else if edges > WARN_EDGES {
        findings.push(Finding::new(
            Level::Warning,
            format!("Many edges ({edges}). Consider simplifying."),
        ));
    }

    let modules = spec.modules.len();
    if modules > WARN_MODULES {
        findings.push(Finding::new(
            Level::Warning,
            format!("Many modules ({modules}). Consider zoom layers."),
        ));
    }

    for node in &spec.nodes {
        let chars = node.label.chars().count();
        if chars > MAX_LABEL_CHARS {
            findings.push(Finding::new(
                Level::Info,
                format!(
                    "Node \"{}\" label is long ({chars} chars). Consider abbreviation.",
                    node.id
                ),
            ));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::types::{Edge, Module, Node};

    fn nodes(n: usize) -> Vec<Node> {
        (0..n).map(|i| Node::new(format!("n{i}"), "Short")).collect()
    }

    #[test]
    fn levels_map_onto_log_levels() {
        assert_eq!(log::Level::from(Level::Info), log::Level::Info);
        assert_eq!(log::Level::from(Level::Warning), log::Level::Warn);
        assert_eq!(log::Level::from(Level::Error), log::Level::Error);
    }

    #[test]
    fn small_diagram_is_clean() {
        let spec = Specification {
            nodes: nodes(3),
            ..Specification::default()
        };
        assert!(audit(&spec).is_empty());
    }

    #[test]
    fn node_thresholds() {
        let spec = Specification {
            nodes: nodes(35),
            ..Specification::default()
        };
        let findings = audit(&spec);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].level, Level::Error);
        assert!(findings[0].message.contains("Too many nodes (35)"));

        let spec = Specification {
            nodes: nodes(21),
            ..Specification::default()
        };
        assert_eq!(audit(&spec)[0].level, Level::Warning);

        let spec = Specification {
            nodes: nodes(20),
            ..Specification::default()
        };
        assert!(audit(&spec).is_empty());
    }

    #[test]
    fn edge_and_module_thresholds() {
        let spec = Specification {
            nodes: nodes(2),
            edges: (0..31).map(|_| Edge::new("n0", "n1")).collect(),
            modules: (0..6).map(|i| Module::new(format!("m{i}"), "M")).collect(),
            ..Specification::default()
        };
        let findings = audit(&spec);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].to_string(), "warning: Many edges (31). Consider simplifying.");
        assert_eq!(findings[1].message, "Many modules (6). Consider zoom layers.");

        let spec = Specification {
            nodes: nodes(2),
            edges: (0..51).map(|_| Edge::new("n0", "n1")).collect(),
            ..Specification::default()
        };
        assert_eq!(audit(&spec)[0].level, Level::Error);
    }

    #[test]
    fn long_labels_count_characters() {
        let spec = Specification {
            nodes: vec![
                Node::new("ok", "数据预处理模块"),
                Node::new("long", "Authentication Service"),
            ],
            ..Specification::default()
        };
        let findings = audit(&spec);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].level, Level::Info);
        assert_eq!(
            findings[0].message,
            "Node \"long\" label is long (22 chars). Consider abbreviation."
        );
    }
}
