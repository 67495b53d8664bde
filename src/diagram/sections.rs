//! Reader for lettered-section design documents.
//!
//! A section starts on a line beginning with a letter `A`–`H` and whitespace.
//! Section A describes the overall layout, B lists modules, C lists nodes and
//! D lists edges. Other sections are ignored.
//!
//! ```text
//! B 模块
//! 模块1：数据预处理
//! C 节点
//! 模块1-步骤1
//! ID: N1
//! Label: Raw Input
//! D 连线
//! N1 -> N2；虚线
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::diagram::source::SpecSource;
use crate::diagram::types::{Edge, Meta, Module, Node, Specification, StyleOverrides};
use crate::error::Error;

static SECTION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-H])\s+").expect("valid section pattern"));

static MODULE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(模块|Module)\s*(\d+)\s*[:：]\s*(.+)$").expect("valid module pattern")
});

static STEP_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(模块|Module)\s*(\d+)\s*[-—]\s*(步骤|Step)\s*\d+").expect("valid step pattern")
});

static ID_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^ID\s*:\s*(N\d+)\s*$").expect("valid id pattern"));

static LABEL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Label\s*:\s*(.+)\s*$").expect("valid label pattern"));

static EDGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(N\d+)\s*(?:→|->|➡|⇒)\s*(N\d+)\s*[;；]?(.*)$").expect("valid edge pattern")
});

/// Reads the lettered-section format into a [`Specification`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionSource;

impl SpecSource for SectionSource {
    fn read(&self, text: &str) -> Result<Specification, Error> {
        if text.trim().is_empty() {
            return Err(Error::EmptySource);
        }

        let sections = split_sections(text);
        let section = |key: char| sections.get(&key).map(String::as_str).unwrap_or("");

        let mut modules = parse_modules(section('B'));
        let nodes = parse_nodes(section('C'))?;
        let edges = parse_edges(section('D'));

        for node in &nodes {
            if let Some(id) = node.module.as_deref()
                && !modules.iter().any(|m| m.id == id)
            {
                let number = id.trim_start_matches('M');
                modules.push(Module::new(id, format!("Module {number}")));
            }
        }

        debug!(
            modules = modules.len(),
            nodes = nodes.len(),
            edges = edges.len();
            "Parsed sectioned specification"
        );

        Ok(Specification {
            meta: Meta {
                layout: Some(layout_hint(section('A')).to_string()),
                ..Meta::default()
            },
            nodes,
            edges,
            modules,
        })
    }
}

/// Collects section bodies by letter. The text after the letter on the
/// opening line belongs to the section; a repeated letter replaces the
/// earlier body.
fn split_sections(text: &str) -> HashMap<char, String> {
    let mut sections = HashMap::new();
    let mut current: Option<(char, Vec<&str>)> = None;

    for line in text.lines() {
        if let Some(caps) = SECTION_START.captures(line) {
            if let Some((key, body)) = current.take() {
                sections.insert(key, body.join("\n").trim().to_string());
            }
            let key = caps[1].chars().next().unwrap_or('A');
            current = Some((key, vec![&line[caps[0].len()..]]));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((key, body)) = current {
        sections.insert(key, body.join("\n").trim().to_string());
    }

    sections
}

fn layout_hint(section: &str) -> &'static str {
    let lower = section.to_lowercase();
    if lower.contains("vertical") || lower.contains("top to bottom") || section.contains("上→下")
    {
        "vertical"
    } else {
        "horizontal"
    }
}

fn module_id(number: &str) -> String {
    format!("M{number}")
}

fn parse_modules(section: &str) -> Vec<Module> {
    section
        .lines()
        .filter_map(|line| MODULE_LINE.captures(line.trim()))
        .map(|caps| Module::new(module_id(&caps[2]), caps[3].trim()))
        .collect()
}

fn parse_nodes(section: &str) -> Result<Vec<Node>, Error> {
    if section.trim().is_empty() {
        return Err(Error::MissingNodeSection);
    }

    let lines: Vec<&str> = section.lines().map(str::trim).collect();
    let mut nodes = Vec::new();
    // Nodes ahead of the first step header belong to module 1.
    let mut current_module = module_id("1");
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        i += 1;

        if let Some(caps) = STEP_HEADER.captures(line) {
            current_module = module_id(&caps[2]);
            continue;
        }

        let Some(id) = ID_LINE.captures(line) else {
            continue;
        };
        // The label must sit on the very next line.
        let Some(label) = lines.get(i).and_then(|next| LABEL_LINE.captures(next)) else {
            continue;
        };

        let mut node = Node::new(&id[1], label[1].trim());
        node.module = Some(current_module.clone());
        nodes.push(node);
        i += 1;
    }

    if nodes.is_empty() {
        return Err(Error::NoParsedNodes);
    }
    Ok(nodes)
}

fn parse_edges(section: &str) -> Vec<Edge> {
    section
        .lines()
        .filter_map(|line| EDGE_LINE.captures(line.trim()))
        .map(|caps| {
            let rest = caps[3].to_lowercase();
            let mut edge = Edge::new(&caps[1], &caps[2]).with_type("primary");
            if rest.contains("虚线") || rest.contains("dashed") {
                edge = edge.with_style(StyleOverrides {
                    dashed: Some(true),
                    ..StyleOverrides::default()
                });
            }
            edge.t_shaped = rest.contains("t形线") || rest.contains("t-shaped");
            edge
        })
        .collect()
}
